//! # VGG16
//!
//! Five blocks of ``(conv 3x3 pad 1, batch-norm, relu) x {2, 3}``.
//!
//! Blocks 2 through 5 each end in a 2x2 max-pool; block 1 ends in a
//! single bare 17x17 conv which shrinks 128x128 to 112x112 in one step.
//!
//! | stage     | 128x128 input      |
//! |-----------|--------------------|
//! | stages[0] | ``[64, 112, 112]`` |
//! | stages[1] | ``[128, 56, 56]``  |
//! | stages[2] | ``[256, 28, 28]``  |
//! | stages[3] | ``[512, 14, 14]``  |
//! | stages[4] | ``[512, 7, 7]``    |

use crate::layers::activation::ActivationConfig;
use crate::layers::dense::DenseHeadConfig;
use crate::layers::layer::LayerSpec;
use crate::layers::pipeline::PipelineConfig;
use crate::models::classifier::{ClassifierConfig, ClassifierStructure};
use burn::config::Config;
use burn::nn::conv::Conv2dConfig;
use burn::nn::pool::MaxPool2dConfig;
use burn::nn::{BatchNormConfig, DropoutConfig, LinearConfig, PaddingConfig2d};

/// Flattened width of the final block: ``512 * 7 * 7``.
pub const VGG16_HEAD_FEATURES: usize = 512 * 7 * 7;

/// ``conv 3x3 pad 1 -> batch-norm -> relu``.
fn conv_bn_relu(
    in_channels: usize,
    out_channels: usize,
) -> Vec<LayerSpec> {
    vec![
        Conv2dConfig::new([in_channels, out_channels], [3, 3])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .into(),
        BatchNormConfig::new(out_channels).into(),
        ActivationConfig::Relu.into(),
    ]
}

/// A pooled VGG block: ``depth`` conv units, then a 2x2 max-pool.
fn pooled_block(
    in_channels: usize,
    out_channels: usize,
    depth: usize,
) -> PipelineConfig {
    let mut layers = conv_bn_relu(in_channels, out_channels);
    for _ in 1..depth {
        layers.extend(conv_bn_relu(out_channels, out_channels));
    }
    layers.push(MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).into());
    layers.into()
}

/// [`VGG16`](ClassifierStructure) Config.
#[derive(Config, Debug)]
pub struct Vgg16Config {
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

impl ClassifierStructure for Vgg16Config {
    fn name(&self) -> &'static str {
        "vgg16"
    }

    fn to_classifier(&self) -> ClassifierConfig {
        let mut block1 = conv_bn_relu(self.in_channels, 64);
        block1.extend(conv_bn_relu(64, 64));
        block1.push(Conv2dConfig::new([64, 64], [17, 17]).into());

        let stages = vec![
            PipelineConfig::new(block1),
            pooled_block(64, 128, 2),
            pooled_block(128, 256, 3),
            pooled_block(256, 512, 3),
            pooled_block(512, 512, 3),
        ];

        let head = DenseHeadConfig::new(vec![
            DropoutConfig::new(self.dropout).into(),
            LinearConfig::new(VGG16_HEAD_FEATURES, 4096).into(),
            ActivationConfig::Relu.into(),
            LinearConfig::new(4096, 4096).into(),
            ActivationConfig::Relu.into(),
            LinearConfig::new(4096, 1000).into(),
            ActivationConfig::Relu.into(),
            LinearConfig::new(1000, 256).into(),
            LinearConfig::new(256, self.num_classes).into(),
        ]);

        ClassifierConfig::new(
            self.in_channels,
            self.input_resolution,
            stages.into_iter().map(Into::into).collect(),
            head,
        )
    }
}
