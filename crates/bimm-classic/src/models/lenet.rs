//! # `LeNet`
//!
//! A compact sigmoid `LeNet` for single-channel images.
//!
//! | stage     | layers                                                   | 128x128 input  |
//! |-----------|----------------------------------------------------------|----------------|
//! | stages[0] | conv 10x10/2, sigmoid, max-pool 2/2                      | ``[10, 30, 30]`` |
//! | stages[1] | conv 5x5, sigmoid, max-pool 2/2                          | ``[20, 13, 13]`` |
//! | stages[2] | conv 4x4, sigmoid, max-pool 2/2                          | ``[20, 5, 5]``   |
//! | stages[3] | conv 3x3 pad 1, sigmoid                                  | ``[20, 5, 5]``   |
//! | head      | dropout, 500 -> 100, sigmoid, 100 -> 60, sigmoid, 60 -> classes |        |

use crate::layers::activation::ActivationConfig;
use crate::layers::dense::DenseHeadConfig;
use crate::layers::pipeline::PipelineConfig;
use crate::models::classifier::{ClassifierConfig, ClassifierStructure};
use burn::config::Config;
use burn::nn::conv::Conv2dConfig;
use burn::nn::pool::MaxPool2dConfig;
use burn::nn::{DropoutConfig, LinearConfig, PaddingConfig2d};

/// Flattened width of the final conv stage: ``5 * 5 * 20``.
pub const LENET_HEAD_FEATURES: usize = 5 * 5 * 20;

/// [`LeNet`](ClassifierStructure) Config.
#[derive(Config, Debug)]
pub struct LeNetConfig {
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

impl ClassifierStructure for LeNetConfig {
    fn name(&self) -> &'static str {
        "lenet"
    }

    fn to_classifier(&self) -> ClassifierConfig {
        let pool = || MaxPool2dConfig::new([2, 2]).with_strides([2, 2]);
        let sigmoid = || ActivationConfig::Sigmoid;

        let stages = vec![
            PipelineConfig::new(vec![
                Conv2dConfig::new([self.in_channels, 10], [10, 10])
                    .with_stride([2, 2])
                    .into(),
                sigmoid().into(),
                pool().into(),
            ]),
            PipelineConfig::new(vec![
                Conv2dConfig::new([10, 20], [5, 5]).into(),
                sigmoid().into(),
                pool().into(),
            ]),
            PipelineConfig::new(vec![
                Conv2dConfig::new([20, 20], [4, 4]).into(),
                sigmoid().into(),
                pool().into(),
            ]),
            PipelineConfig::new(vec![
                Conv2dConfig::new([20, 20], [3, 3])
                    .with_padding(PaddingConfig2d::Explicit(1, 1))
                    .into(),
                sigmoid().into(),
            ]),
        ];

        let head = DenseHeadConfig::new(vec![
            DropoutConfig::new(self.dropout).into(),
            LinearConfig::new(LENET_HEAD_FEATURES, 100).into(),
            sigmoid().into(),
            LinearConfig::new(100, 60).into(),
            sigmoid().into(),
            LinearConfig::new(60, self.num_classes).into(),
        ]);

        ClassifierConfig::new(
            self.in_channels,
            self.input_resolution,
            stages.into_iter().map(Into::into).collect(),
            head,
        )
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
    fn test_flat_width_is_500() {
        let shapes = LeNetConfig::new().try_infer().unwrap();
        assert_eq!(
            shapes.stages,
            vec![
                FeatureShape::new(10, 30, 30),
                FeatureShape::new(20, 13, 13),
                FeatureShape::new(20, 5, 5),
                FeatureShape::new(20, 5, 5),
            ]
        );
        assert_eq!(shapes.flat_features, 500);
        assert_eq!(shapes.num_classes, 20);
    }

    #[test]
    fn test_32x32_cannot_reach_head() {
        // 32 -> conv 10/2 -> 12 -> pool -> 6 -> conv 5 -> 2 -> pool -> 1 -> conv 4: no fit.
        let err = LeNetConfig::new()
            .with_input_resolution([32, 32])
            .try_validate()
            .unwrap_err();
        assert_eq!(err.stage(), "lenet.stages[2].layers[0]");
        assert!(matches!(err, NetworkError::Configuration { .. }));
    }

    #[test]
    fn test_off_size_input_is_head_mismatch() {
        let err = LeNetConfig::new()
            .with_input_resolution([160, 160])
            .try_validate()
            .unwrap_err();
        assert_eq!(
            err,
            NetworkError::shape_mismatch(
                "lenet.head.layers[1]",
                "500 input features",
                "980 input features"
            )
        );
    }

    #[test]
    fn test_forward() {
        type B = NdArray<f32>;
        let device = Default::default();

        let model: Classifier<B> = LeNetConfig::new().init(&device);
        assert_eq!(model.head_in_features(), LENET_HEAD_FEATURES);

        for batch in [1, 3] {
            let output = model.forward(Tensor::ones([batch, 1, 128, 128], &device));
            assert_eq!(output.dims(), [batch, 20]);
        }
    }
}
