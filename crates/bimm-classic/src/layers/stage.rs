//! # Image Stages
//!
//! [`StageSpec`] is the closed set of image-stage compositions:
//! a plain [`Pipeline`], a [`BranchSet`], or a [`ResidualUnit`].

use crate::errors::NetworkResult;
use crate::layers::branch::{BranchSet, BranchSetConfig};
use crate::layers::layer::LayerSpec;
use crate::layers::pipeline::{Pipeline, PipelineConfig};
use crate::layers::residual::{ResidualUnit, ResidualUnitConfig};
use crate::shape::FeatureShape;
use burn::config::Config;
use burn::module::Module;
use burn::prelude::{Backend, Tensor};

/// Image stage configuration.
#[derive(Config, Debug)]
pub enum StageSpec {
    /// Sequential layers.
    Pipeline(PipelineConfig),

    /// Branch-concatenate.
    Branch(BranchSetConfig),

    /// Residual-add.
    Residual(ResidualUnitConfig),
}

impl From<PipelineConfig> for StageSpec {
    fn from(config: PipelineConfig) -> Self {
        Self::Pipeline(config)
    }
}

impl From<Vec<LayerSpec>> for StageSpec {
    fn from(layers: Vec<LayerSpec>) -> Self {
        Self::Pipeline(layers.into())
    }
}

impl From<BranchSetConfig> for StageSpec {
    fn from(config: BranchSetConfig) -> Self {
        Self::Branch(config)
    }
}

impl From<ResidualUnitConfig> for StageSpec {
    fn from(config: ResidualUnitConfig) -> Self {
        Self::Residual(config)
    }
}

impl StageSpec {
    /// Short kind name, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            StageSpec::Pipeline(_) => "pipeline",
            StageSpec::Branch(_) => "branch",
            StageSpec::Residual(_) => "residual",
        }
    }

    /// Infer the output shape.
    pub fn output_shape(
        &self,
        input: FeatureShape,
    ) -> NetworkResult<FeatureShape> {
        match self {
            StageSpec::Pipeline(config) => config.output_shape(input),
            StageSpec::Branch(config) => config.output_shape(input),
            StageSpec::Residual(config) => config.output_shape(input),
        }
    }

    /// Initialize a [`Stage`].
    pub fn init<B: Backend>(
        &self,
        device: &B::Device,
    ) -> Stage<B> {
        match self {
            StageSpec::Pipeline(config) => Stage::Pipeline(config.init(device)),
            StageSpec::Branch(config) => Stage::Branch(config.init(device)),
            StageSpec::Residual(config) => Stage::Residual(config.init(device)),
        }
    }
}

/// Image stage.
#[derive(Module, Debug)]
pub enum Stage<B: Backend> {
    /// [`Pipeline`] stage.
    Pipeline(Pipeline<B>),

    /// [`BranchSet`] stage.
    Branch(BranchSet<B>),

    /// [`ResidualUnit`] stage.
    Residual(ResidualUnit<B>),
}

impl<B: Backend> Stage<B> {
    /// Forward pass.
    pub fn forward(
        &self,
        input: Tensor<B, 4>,
    ) -> Tensor<B, 4> {
        match self {
            Stage::Pipeline(stage) => stage.forward(input),
            Stage::Branch(stage) => stage.forward(input),
            Stage::Residual(stage) => stage.forward(input),
        }
    }
}
