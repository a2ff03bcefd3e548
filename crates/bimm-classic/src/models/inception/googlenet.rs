//! # `GoogleNet`
//!
//! ```text
//! stem:   conv 17x17 (64) -> relu -> max-pool 3/2 pad 1
//!         -> conv 1x1 (64) -> conv 3x3 pad 1 (192) -> max-pool 3/2 pad 1
//! block1: inception x2 (192 -> 256 -> 480) -> max-pool 3/2 pad 1
//! block2: inception x5 (480 -> 512 -> 512 -> 512 -> 528 -> 832) -> max-pool 3/2 pad 1
//! block3: inception x2 (832 -> 832 -> 1024)
//! tail:   adaptive avg-pool 1x1 -> flatten -> dropout -> linear (1024 -> classes)
//! ```

use crate::layers::activation::ActivationConfig;
use crate::layers::dense::DenseHeadConfig;
use crate::layers::layer::LayerSpec;
use crate::layers::pipeline::PipelineConfig;
use crate::layers::stage::StageSpec;
use crate::models::classifier::{ClassifierConfig, ClassifierStructure};
use crate::models::inception::inception::InceptionConfig;
use burn::config::Config;
use burn::nn::conv::Conv2dConfig;
use burn::nn::pool::{AdaptiveAvgPool2dConfig, MaxPool2dConfig};
use burn::nn::{DropoutConfig, LinearConfig, PaddingConfig2d};

/// Inception widths, as
/// ``(in_channels, ch1x1, ch3x3red, ch3x3, ch5x5red, ch5x5, pool_proj)``.
type InceptionWidths = [usize; 7];

const BLOCK1: [InceptionWidths; 2] = [
    [192, 64, 96, 128, 16, 32, 32],
    [256, 128, 128, 192, 32, 96, 64],
];

const BLOCK2: [InceptionWidths; 5] = [
    [480, 192, 96, 208, 16, 48, 64],
    [512, 160, 112, 224, 24, 64, 64],
    [512, 128, 128, 256, 24, 64, 64],
    [512, 112, 144, 288, 32, 64, 64],
    [528, 256, 160, 320, 32, 128, 128],
];

const BLOCK3: [InceptionWidths; 2] = [
    [832, 256, 160, 320, 32, 128, 128],
    [832, 384, 192, 384, 48, 128, 128],
];

/// Width of the final inception block, and of the head input.
pub const GOOGLENET_HEAD_FEATURES: usize = 1024;

fn inception(widths: &InceptionWidths) -> InceptionConfig {
    let [in_channels, ch1x1, ch3x3red, ch3x3, ch5x5red, ch5x5, pool_proj] = *widths;
    InceptionConfig::new(
        in_channels,
        ch1x1,
        ch3x3red,
        ch3x3,
        ch5x5red,
        ch5x5,
        pool_proj,
    )
}

fn downsample() -> LayerSpec {
    MaxPool2dConfig::new([3, 3])
        .with_strides([2, 2])
        .with_padding(PaddingConfig2d::Explicit(1, 1))
        .into()
}

/// The three inception blocks, in order.
pub fn googlenet_blocks() -> [Vec<InceptionConfig>; 3] {
    [
        BLOCK1.iter().map(inception).collect(),
        BLOCK2.iter().map(inception).collect(),
        BLOCK3.iter().map(inception).collect(),
    ]
}

/// [`GoogleNet`](ClassifierStructure) Config.
#[derive(Config, Debug)]
pub struct GoogleNetConfig {
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

impl ClassifierStructure for GoogleNetConfig {
    fn name(&self) -> &'static str {
        "googlenet"
    }

    fn to_classifier(&self) -> ClassifierConfig {
        let stem = PipelineConfig::new(vec![
            Conv2dConfig::new([self.in_channels, 64], [17, 17]).into(),
            ActivationConfig::Relu.into(),
            downsample(),
            Conv2dConfig::new([64, 64], [1, 1]).into(),
            Conv2dConfig::new([64, 192], [3, 3])
                .with_padding(PaddingConfig2d::Explicit(1, 1))
                .into(),
            downsample(),
        ]);

        let [block1, block2, block3] = googlenet_blocks();

        let mut stages: Vec<StageSpec> = vec![stem.into()];
        stages.extend(block1.into_iter().map(StageSpec::from));
        stages.push(vec![downsample()].into());
        stages.extend(block2.into_iter().map(StageSpec::from));
        stages.push(vec![downsample()].into());
        stages.extend(block3.into_iter().map(StageSpec::from));
        stages.push(
            PipelineConfig::new(vec![AdaptiveAvgPool2dConfig::new([1, 1]).into()]).into(),
        );

        let head = DenseHeadConfig::new(vec![
            DropoutConfig::new(self.dropout).into(),
            LinearConfig::new(GOOGLENET_HEAD_FEATURES, self.num_classes).into(),
        ]);

        ClassifierConfig::new(self.in_channels, self.input_resolution, stages, head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::NetworkError;
    use crate::models::classifier::Classifier;
    use crate::shape::FeatureShape;
    use burn::backend::NdArray;
    use burn::prelude::Tensor;

    #[test]
    fn test_channel_chain() {
        let mut channels = vec![192];
        for block in googlenet_blocks() {
            for module in block {
                assert_eq!(module.in_channels, *channels.last().unwrap());
                channels.push(module.out_channels());
            }
        }
        assert_eq!(
            channels,
            vec![192, 256, 480, 512, 512, 512, 528, 832, 832, 1024]
        );
    }

    #[test]
    fn test_head_receives_1024() {
        let shapes = GoogleNetConfig::new().try_infer().unwrap();
        assert_eq!(shapes.stages.len(), 13);
        assert_eq!(shapes.stages[0], FeatureShape::new(192, 28, 28));
        assert_eq!(shapes.stages[3], FeatureShape::new(480, 14, 14));
        assert_eq!(shapes.stages[9], FeatureShape::new(832, 7, 7));
        assert_eq!(shapes.stages[11], FeatureShape::new(1024, 7, 7));
        assert_eq!(shapes.flat_features, GOOGLENET_HEAD_FEATURES);
        assert_eq!(shapes.num_classes, 20);
    }

    #[test]
    fn test_broken_chain_names_the_module() {
        let mut config = GoogleNetConfig::new().to_classifier();
        config.stages[2] = InceptionConfig::new(480, 128, 128, 192, 32, 96, 64).into();
        let err = config.try_validate().unwrap_err();
        assert!(matches!(err, NetworkError::ShapeMismatch { .. }));
        assert_eq!(err.stage(), "stages[2].branch[0].layers[0]");
    }

    #[test]
    fn test_forward() {
        type B = NdArray<f32>;
        let device = Default::default();

        let model: Classifier<B> = GoogleNetConfig::new().init(&device);
        assert_eq!(model.head_in_features(), 1024);

        for batch in [1, 2] {
            let output = model.forward(Tensor::ones([batch, 1, 128, 128], &device));
            assert_eq!(output.dims(), [batch, 20]);
        }
    }
}
