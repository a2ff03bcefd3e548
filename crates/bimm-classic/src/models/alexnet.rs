//! # `AlexNet`
//!
//! An `AlexNet` variant for single-channel images; the first conv uses a
//! 20x20 kernel with stride 2 in place of the canonical 11x11/4.
//!
//! For a 128x128 input the conv stack produces ``[256, 6, 6]``,
//! which the head flattens to 9216 features.

use crate::layers::activation::ActivationConfig;
use crate::layers::dense::DenseHeadConfig;
use crate::layers::pipeline::PipelineConfig;
use crate::models::classifier::{ClassifierConfig, ClassifierStructure};
use burn::config::Config;
use burn::nn::conv::Conv2dConfig;
use burn::nn::pool::MaxPool2dConfig;
use burn::nn::{DropoutConfig, LinearConfig, PaddingConfig2d};

/// Flattened width of the final conv stage: ``256 * 6 * 6``.
pub const ALEXNET_HEAD_FEATURES: usize = 256 * 6 * 6;

/// [`AlexNet`](ClassifierStructure) Config.
#[derive(Config, Debug)]
pub struct AlexNetConfig {
    /// Input channels.
    #[config(default = 1)]
    pub in_channels: usize,

    /// Declared input ``[height, width]``.
    #[config(default = "[128, 128]")]
    pub input_resolution: [usize; 2],

    /// Number of output classes.
    #[config(default = 20)]
    pub num_classes: usize,

    /// Head dropout probability.
    #[config(default = "0.5")]
    pub dropout: f64,
}

impl ClassifierStructure for AlexNetConfig {
    fn name(&self) -> &'static str {
        "alexnet"
    }

    fn to_classifier(&self) -> ClassifierConfig {
        let pool = || MaxPool2dConfig::new([3, 3]).with_strides([2, 2]);
        let conv3x3 = |in_channels, out_channels| {
            Conv2dConfig::new([in_channels, out_channels], [3, 3])
                .with_padding(PaddingConfig2d::Explicit(1, 1))
        };

        let convs = PipelineConfig::new(vec![
            Conv2dConfig::new([self.in_channels, 96], [20, 20])
                .with_stride([2, 2])
                .into(),
            ActivationConfig::Relu.into(),
            pool().into(),
            Conv2dConfig::new([96, 256], [5, 5])
                .with_padding(PaddingConfig2d::Explicit(2, 2))
                .into(),
            ActivationConfig::Relu.into(),
            pool().into(),
            conv3x3(256, 384).into(),
            ActivationConfig::Relu.into(),
            conv3x3(384, 384).into(),
            ActivationConfig::Relu.into(),
            conv3x3(384, 256).into(),
            ActivationConfig::Relu.into(),
            pool().into(),
        ]);

        let head = DenseHeadConfig::new(vec![
            DropoutConfig::new(self.dropout).into(),
            LinearConfig::new(ALEXNET_HEAD_FEATURES, 4096).into(),
            ActivationConfig::Relu.into(),
            DropoutConfig::new(self.dropout).into(),
            LinearConfig::new(4096, 4096).into(),
            ActivationConfig::Relu.into(),
            LinearConfig::new(4096, self.num_classes).into(),
        ]);

        ClassifierConfig::new(
            self.in_channels,
            self.input_resolution,
            vec![convs.into()],
            head,
        )
    }
}
