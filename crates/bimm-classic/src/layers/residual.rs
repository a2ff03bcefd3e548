//! # Residual-Add
//!
//! A [`ResidualUnit`] computes ``act(main(x) + shortcut(x))``.
//!
//! The shortcut is either [`Shortcut::Identity`], or a
//! [`Shortcut::Projection`] pipeline which maps the input to the
//! shape of the main pipeline output.

use crate::errors::{NetworkError, NetworkResult};
use crate::layers::activation::{Activation, ActivationConfig};
use crate::layers::pipeline::{Pipeline, PipelineConfig};
use crate::shape::FeatureShape;
use bimm_contracts::{assert_shape_contract_periodically, unpack_shape_contract};
use burn::config::Config;
use burn::module::Module;
use burn::prelude::{Backend, Tensor};

/// [`Shortcut`] Configuration.
#[derive(Config, Debug)]
pub enum ShortcutConfig {
    /// Pass the input through unchanged.
    Identity,

    /// Project the input through a pipeline.
    Projection(PipelineConfig),
}

impl Default for ShortcutConfig {
    fn default() -> Self {
        Self::Identity
    }
}

impl From<PipelineConfig> for ShortcutConfig {
    fn from(config: PipelineConfig) -> Self {
        Self::Projection(config)
    }
}

impl ShortcutConfig {
    /// Infer the shortcut output shape.
    pub fn output_shape(
        &self,
        input: FeatureShape,
    ) -> NetworkResult<FeatureShape> {
        match self {
            ShortcutConfig::Identity => Ok(input),
            ShortcutConfig::Projection(pipeline) => pipeline.output_shape(input),
        }
    }

    /// Initialize a [`Shortcut`].
    pub fn init<B: Backend>(
        &self,
        device: &B::Device,
    ) -> Shortcut<B> {
        match self {
            ShortcutConfig::Identity => Shortcut::Identity(Identity),
            ShortcutConfig::Projection(pipeline) => Shortcut::Projection(pipeline.init(device)),
        }
    }
}

/// Identity layer.
#[derive(Module, Clone, Debug, Default)]
pub struct Identity;

impl Identity {
    /// Forward pass; returns the input.
    pub fn forward<B: Backend, const D: usize>(
        &self,
        input: Tensor<B, D>,
    ) -> Tensor<B, D> {
        input
    }
}

/// Residual shortcut path.
#[derive(Module, Debug)]
pub enum Shortcut<B: Backend> {
    /// Identity shortcut.
    Identity(Identity),

    /// Projection shortcut.
    Projection(Pipeline<B>),
}

impl<B: Backend> Shortcut<B> {
    /// Forward pass.
    pub fn forward(
        &self,
        input: Tensor<B, 4>,
    ) -> Tensor<B, 4> {
        match self {
            Shortcut::Identity(layer) => layer.forward(input),
            Shortcut::Projection(pipeline) => pipeline.forward(input),
        }
    }

    /// Is this an identity shortcut?
    pub fn is_identity(&self) -> bool {
        matches!(self, Shortcut::Identity(_))
    }
}

/// [`ResidualUnit`] Configuration.
#[derive(Config, Debug)]
pub struct ResidualUnitConfig {
    /// The main pipeline.
    pub main: PipelineConfig,

    /// The shortcut path.
    #[config(default = "ShortcutConfig::Identity")]
    pub shortcut: ShortcutConfig,

    /// The activation applied after the sum.
    #[config(default = "ActivationConfig::Relu")]
    pub activation: ActivationConfig,
}

impl ResidualUnitConfig {
    /// Infer the output shape.
    ///
    /// Both paths must produce identical shapes.
    pub fn output_shape(
        &self,
        input: FeatureShape,
    ) -> NetworkResult<FeatureShape> {
        let main = self
            .main
            .output_shape(input)
            .map_err(|err| err.within("main"))?;
        let shortcut = self
            .shortcut
            .output_shape(input)
            .map_err(|err| err.within("shortcut"))?;
        if main != shortcut {
            return Err(NetworkError::shape_mismatch(
                "shortcut",
                format!("{main} (main output)"),
                shortcut,
            ));
        }
        Ok(main)
    }

    /// Initialize a [`ResidualUnit`].
    pub fn init<B: Backend>(
        &self,
        device: &B::Device,
    ) -> ResidualUnit<B> {
        ResidualUnit {
            main: self.main.init(device),
            shortcut: self.shortcut.init(device),
            act: self.activation.init(),
        }
    }
}

/// Residual unit: ``act(main(x) + shortcut(x))``.
#[derive(Module, Debug)]
pub struct ResidualUnit<B: Backend> {
    /// Main pipeline.
    pub main: Pipeline<B>,

    /// Shortcut path.
    pub shortcut: Shortcut<B>,

    /// Post-sum activation.
    pub act: Activation,
}

impl<B: Backend> ResidualUnit<B> {
    /// Forward Pass.
    ///
    /// # Arguments
    ///
    /// - `input`: a ``[batch, in_channels, in_height, in_width]`` tensor.
    ///
    /// # Returns
    ///
    /// A ``[batch, out_channels, out_height, out_width]`` tensor.
    pub fn forward(
        &self,
        input: Tensor<B, 4>,
    ) -> Tensor<B, 4> {
        let batch = input.dims()[0];

        let identity = self.shortcut.forward(input.clone());
        let x = self.main.forward(input);

        let [out_channels, out_height, out_width] = unpack_shape_contract!(
            ["batch", "out_channels", "out_height", "out_width"],
            &x,
            &["out_channels", "out_height", "out_width"],
            &[("batch", batch)],
        );
        assert_shape_contract_periodically!(
            ["batch", "out_channels", "out_height", "out_width"],
            &identity,
            &[
                ("batch", batch),
                ("out_channels", out_channels),
                ("out_height", out_height),
                ("out_width", out_width)
            ],
        );

        self.act.forward(x + identity)
    }
}
