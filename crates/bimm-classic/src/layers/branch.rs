//! # Branch-Concatenate
//!
//! A [`BranchSet`] applies sibling [`Pipeline`]s to the same input,
//! and concatenates their outputs along the channel axis.
//!
//! [`BranchSetConfig::output_shape`] requires every branch to produce
//! the same spatial resolution; the output channel count is the sum of
//! the branch channel counts.

use crate::errors::{NetworkError, NetworkResult};
use crate::layers::pipeline::{Pipeline, PipelineConfig};
use crate::shape::FeatureShape;
use bimm_contracts::assert_shape_contract_periodically;
use burn::config::Config;
use burn::module::Module;
use burn::prelude::{Backend, Tensor};

/// [`BranchSet`] Configuration.
#[derive(Config, Debug)]
pub struct BranchSetConfig {
    /// The sibling branches, in concatenation order.
    pub branches: Vec<PipelineConfig>,
}

impl From<Vec<PipelineConfig>> for BranchSetConfig {
    fn from(branches: Vec<PipelineConfig>) -> Self {
        Self { branches }
    }
}

impl BranchSetConfig {
    /// Infer the output shape of every branch.
    ///
    /// Errors are scoped as ``branch[idx]``.
    pub fn branch_shapes(
        &self,
        input: FeatureShape,
    ) -> NetworkResult<Vec<FeatureShape>> {
        if self.branches.is_empty() {
            return Err(NetworkError::configuration(
                "",
                "a branch set requires at least one branch",
            ));
        }
        self.branches
            .iter()
            .enumerate()
            .map(|(idx, branch)| {
                branch
                    .output_shape(input)
                    .map_err(|err| err.within(&format!("branch[{idx}]")))
            })
            .collect()
    }

    /// Infer the concatenated output shape.
    pub fn output_shape(
        &self,
        input: FeatureShape,
    ) -> NetworkResult<FeatureShape> {
        let shapes = self.branch_shapes(input)?;
        let resolution = shapes[0].resolution();
        for (idx, shape) in shapes.iter().enumerate().skip(1) {
            if shape.resolution() != resolution {
                return Err(NetworkError::shape_mismatch(
                    format!("branch[{idx}]"),
                    format!("resolution {resolution:?} (from branch[0])"),
                    format!("resolution {:?}", shape.resolution()),
                ));
            }
        }
        let channels = shapes.iter().map(|shape| shape.channels).sum();
        Ok(FeatureShape::from_resolution(channels, resolution))
    }

    /// Initialize a [`BranchSet`].
    ///
    /// # Panics
    ///
    /// If there are no branches.
    pub fn init<B: Backend>(
        &self,
        device: &B::Device,
    ) -> BranchSet<B> {
        assert!(
            !self.branches.is_empty(),
            "a branch set requires at least one branch"
        );
        BranchSet {
            branches: self
                .branches
                .iter()
                .map(|branch| branch.init(device))
                .collect(),
        }
    }
}

/// Parallel branches, concatenated on the channel axis.
#[derive(Module, Debug)]
pub struct BranchSet<B: Backend> {
    /// Internal branches.
    pub branches: Vec<Pipeline<B>>,
}

impl<B: Backend> BranchSet<B> {
    /// The number of branches.
    pub fn len(&self) -> usize {
        self.branches.len()
    }

    /// Check if the branch set is empty.
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Forward Pass.
    ///
    /// # Arguments
    ///
    /// - `input`: a ``[batch, in_channels, height, width]`` tensor.
    ///
    /// # Returns
    ///
    /// A ``[batch, sum(branch_channels), out_height, out_width]`` tensor.
    pub fn forward(
        &self,
        input: Tensor<B, 4>,
    ) -> Tensor<B, 4> {
        let outputs: Vec<Tensor<B, 4>> = self
            .branches
            .iter()
            .map(|branch| branch.forward(input.clone()))
            .collect();

        let Some((first, rest)) = outputs.split_first() else {
            panic!("a branch set requires at least one branch");
        };
        let [batch, _, out_height, out_width] = first.dims();
        for branch in rest {
            assert_shape_contract_periodically!(
                ["batch", "channels", "out_height", "out_width"],
                branch,
                &[
                    ("batch", batch),
                    ("out_height", out_height),
                    ("out_width", out_width)
                ],
            );
        }

        Tensor::cat(outputs, 1)
    }
}
