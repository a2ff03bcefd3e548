//! # Pipeline
//!
//! A [`Pipeline`] applies a sequence of [`Layer`]s in order.
//!
//! [`PipelineConfig`] implements [`Config`], validates the shape chain
//! with [`PipelineConfig::output_shape`], and provides
//! [`PipelineConfig::init`] to initialize a [`Pipeline`].

use crate::errors::NetworkResult;
use crate::layers::layer::{Layer, LayerSpec};
use crate::shape::FeatureShape;
use burn::config::Config;
use burn::module::Module;
use burn::prelude::{Backend, Tensor};

/// [`Pipeline`] Configuration.
#[derive(Config, Debug)]
pub struct PipelineConfig {
    /// The layers, in application order.
    pub layers: Vec<LayerSpec>,
}

impl From<Vec<LayerSpec>> for PipelineConfig {
    fn from(layers: Vec<LayerSpec>) -> Self {
        Self { layers }
    }
}

impl PipelineConfig {
    /// The number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Check if the pipeline is empty.
    ///
    /// An empty pipeline is the identity.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Append the layers of another pipeline.
    pub fn then<P>(
        self,
        other: P,
    ) -> Self
    where
        P: Into<PipelineConfig>,
    {
        let mut layers = self.layers;
        layers.extend(other.into().layers);
        Self { layers }
    }

    /// Infer the output shape, checking each link of the chain.
    ///
    /// Errors are scoped as ``layers[idx]``.
    pub fn output_shape(
        &self,
        input: FeatureShape,
    ) -> NetworkResult<FeatureShape> {
        self.layers
            .iter()
            .enumerate()
            .try_fold(input, |shape, (idx, layer)| {
                layer.output_shape(&format!("layers[{idx}]"), shape)
            })
    }

    /// Initialize a [`Pipeline`].
    pub fn init<B: Backend>(
        &self,
        device: &B::Device,
    ) -> Pipeline<B> {
        Pipeline {
            layers: self.layers.iter().map(|layer| layer.init(device)).collect(),
        }
    }
}

/// Sequential image-stage pipeline.
#[derive(Module, Debug)]
pub struct Pipeline<B: Backend> {
    /// Internal layers.
    pub layers: Vec<Layer<B>>,
}

impl<B: Backend> Pipeline<B> {
    /// The number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Check if the pipeline is empty.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Forward pass.
    pub fn forward(
        &self,
        input: Tensor<B, 4>,
    ) -> Tensor<B, 4> {
        self.layers.iter().fold(input, |x, layer| layer.forward(x))
    }
}
