//! # Bottleneck Residual Unit
//!
//! [`BottleneckConfig`] describes the `ResNet` bottleneck unit:
//!
//! ```text
//! main:     conv 1x1 -> bn -> relu -> conv 3x3 -> bn -> relu -> conv 1x1 (x4) -> bn
//! shortcut: identity, or conv 1x1 (stride = strides[1]) -> bn when `first`
//! output:   relu(main(x) + shortcut(x))
//! ```
//!
//! The unit lowers to a [`ResidualUnitConfig`]; [`BottleneckConfig::init`]
//! produces the corresponding [`ResidualUnit`].

use crate::errors::{NetworkError, NetworkResult};
use crate::layers::activation::ActivationConfig;
use crate::layers::pipeline::PipelineConfig;
use crate::layers::residual::{ResidualUnit, ResidualUnitConfig, ShortcutConfig};
use crate::shape::FeatureShape;
use burn::config::Config;
use burn::nn::conv::Conv2dConfig;
use burn::nn::{BatchNormConfig, PaddingConfig2d};
use burn::prelude::Backend;

/// Channel expansion of the final 1x1 conv.
pub const BOTTLENECK_EXPANSION: usize = 4;

/// [`Bottleneck`](ResidualUnit) Config.
#[derive(Config, Debug)]
pub struct BottleneckConfig {
    /// Input channels.
    pub in_channels: usize,

    /// Width of the inner 3x3 conv; the unit emits ``out_channels * 4``.
    pub out_channels: usize,

    /// Strides of the three main-path convs.
    #[config(default = "[1, 1, 1]")]
    pub strides: [usize; 3],

    /// Paddings of the three main-path convs.
    #[config(default = "[0, 1, 0]")]
    pub paddings: [usize; 3],

    /// Whether the shortcut projects the input (first unit of a group).
    #[config(default = false)]
    pub first: bool,
}

impl BottleneckConfig {
    /// The channel expansion factor.
    pub fn expansion(&self) -> usize {
        BOTTLENECK_EXPANSION
    }

    /// The number of output channels.
    ///
    /// ``out_planes = out_channels * expansion``
    pub fn out_planes(&self) -> usize {
        self.out_channels * self.expansion()
    }

    /// Check the channel bookkeeping.
    ///
    /// Without a projection shortcut, the input must already be
    /// ``out_planes`` wide.
    pub fn try_validate(&self) -> NetworkResult<()> {
        if self.in_channels == 0 || self.out_channels == 0 {
            return Err(NetworkError::configuration(
                "",
                format!(
                    "bottleneck channels must be positive, got {} -> {}",
                    self.in_channels, self.out_channels
                ),
            ));
        }
        if !self.first && self.in_channels != self.out_planes() {
            return Err(NetworkError::shape_mismatch(
                "shortcut",
                format!("{} input channels (identity shortcut)", self.out_planes()),
                format!("{} input channels", self.in_channels),
            ));
        }
        Ok(())
    }

    /// Lower to a [`ResidualUnitConfig`].
    pub fn to_residual(&self) -> ResidualUnitConfig {
        let width = self.out_channels;
        let out_planes = self.out_planes();
        let [s0, s1, s2] = self.strides;
        let [p0, p1, p2] = self.paddings;

        let main = PipelineConfig::new(vec![
            Conv2dConfig::new([self.in_channels, width], [1, 1])
                .with_stride([s0, s0])
                .with_padding(PaddingConfig2d::Explicit(p0, p0))
                .into(),
            BatchNormConfig::new(width).into(),
            ActivationConfig::Relu.into(),
            Conv2dConfig::new([width, width], [3, 3])
                .with_stride([s1, s1])
                .with_padding(PaddingConfig2d::Explicit(p1, p1))
                .into(),
            BatchNormConfig::new(width).into(),
            ActivationConfig::Relu.into(),
            Conv2dConfig::new([width, out_planes], [1, 1])
                .with_stride([s2, s2])
                .with_padding(PaddingConfig2d::Explicit(p2, p2))
                .into(),
            BatchNormConfig::new(out_planes).into(),
        ]);

        let shortcut = if self.first {
            ShortcutConfig::Projection(PipelineConfig::new(vec![
                Conv2dConfig::new([self.in_channels, out_planes], [1, 1])
                    .with_stride([s1, s1])
                    .into(),
                BatchNormConfig::new(out_planes).into(),
            ]))
        } else {
            ShortcutConfig::Identity
        };

        ResidualUnitConfig::new(main)
            .with_shortcut(shortcut)
            .with_activation(ActivationConfig::Relu)
    }

    /// Infer the output shape.
    pub fn output_shape(
        &self,
        input: FeatureShape,
    ) -> NetworkResult<FeatureShape> {
        self.try_validate()?;
        self.to_residual().output_shape(input)
    }

    /// Initialize a [`ResidualUnit`].
    ///
    /// # Panics
    ///
    /// If the config is invalid.
    pub fn init<B: Backend>(
        &self,
        device: &B::Device,
    ) -> ResidualUnit<B> {
        if let Err(err) = self.try_validate() {
            panic!("{err}");
        }
        self.to_residual().init(device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::prelude::Tensor;
    use proptest::prelude::*;

    #[test]
    fn test_config_defaults() {
        let config = BottleneckConfig::new(64, 64);
        assert_eq!(config.strides, [1, 1, 1]);
        assert_eq!(config.paddings, [0, 1, 0]);
        assert!(!config.first);
        assert_eq!(config.expansion(), 4);
        assert_eq!(config.out_planes(), 256);
    }

    #[test]
    fn test_identity_requires_matching_channels() {
        let err = BottleneckConfig::new(64, 64).try_validate().unwrap_err();
        assert_eq!(
            err,
            NetworkError::shape_mismatch(
                "shortcut",
                "256 input channels (identity shortcut)",
                "64 input channels"
            )
        );

        assert!(BottleneckConfig::new(256, 64).try_validate().is_ok());
        assert!(
            BottleneckConfig::new(64, 64)
                .with_first(true)
                .try_validate()
                .is_ok()
        );
    }

    #[test]
    fn test_zero_channels() {
        let err = BottleneckConfig::new(0, 4)
            .with_first(true)
            .try_validate()
            .unwrap_err();
        assert!(matches!(err, NetworkError::Configuration { .. }));
    }

    #[test]
    fn test_strided_projection() {
        let config = BottleneckConfig::new(256, 128)
            .with_strides([1, 2, 1])
            .with_first(true);
        assert_eq!(
            config.output_shape(FeatureShape::new(256, 56, 56)),
            Ok(FeatureShape::new(512, 28, 28))
        );
    }

    #[test]
    fn test_strided_identity_is_rejected() {
        // Channels line up, but the identity shortcut cannot follow the stride.
        let err = BottleneckConfig::new(16, 4)
            .with_strides([1, 2, 1])
            .output_shape(FeatureShape::new(16, 8, 8))
            .unwrap_err();
        assert!(matches!(err, NetworkError::ShapeMismatch { .. }));
        assert_eq!(err.stage(), "shortcut");
    }

    #[test]
    fn test_forward() {
        type B = NdArray<f32>;
        let device = Default::default();

        let config = BottleneckConfig::new(3, 2)
            .with_strides([1, 2, 1])
            .with_first(true);
        let unit: ResidualUnit<B> = config.init(&device);
        assert!(!unit.shortcut.is_identity());

        let output = unit.forward(Tensor::ones([2, 3, 9, 9], &device));
        assert_eq!(output.dims(), [2, 8, 5, 5]);

        let unit: ResidualUnit<B> = BottleneckConfig::new(8, 2).init(&device);
        assert!(unit.shortcut.is_identity());
        let output = unit.forward(output);
        assert_eq!(output.dims(), [2, 8, 5, 5]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn projected_unit_emits_out_planes(
            in_channels in 1usize..128,
            out_channels in 1usize..128,
            stride in 1usize..4,
            size in 4usize..32,
        ) {
            let config = BottleneckConfig::new(in_channels, out_channels)
                .with_strides([1, stride, 1])
                .with_first(true);
            let shape = config
                .output_shape(FeatureShape::new(in_channels, size, size))
                .unwrap();
            let expected = (size - 1) / stride + 1;
            prop_assert_eq!(shape, FeatureShape::new(out_channels * 4, expected, expected));
        }

        #[test]
        fn identity_unit_validates_iff_widths_match(
            in_channels in 1usize..512,
            out_channels in 1usize..128,
        ) {
            let config = BottleneckConfig::new(in_channels, out_channels);
            prop_assert_eq!(
                config.try_validate().is_ok(),
                in_channels == out_channels * 4
            );
        }
    }
}
