//! # Leaf Image-Stage Layers
//!
//! [`LayerSpec`] is the closed set of leaf operators which act on
//! ``[batch, channels, height, width]`` tensors; each variant carries its
//! own shape-inference rule in [`LayerSpec::output_shape`].
//!
//! [`LayerSpec::init`] builds the matching [`Layer`] module.

use crate::errors::{NetworkError, NetworkResult};
use crate::layers::activation::{Activation, ActivationConfig};
use crate::shape::{FeatureShape, window_output_resolution};
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::pool::{
    AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, AvgPool2d, AvgPool2dConfig, MaxPool2d,
    MaxPool2dConfig,
};
use burn::nn::{BatchNorm, BatchNormConfig};
use burn::prelude::{Backend, Config, Module, Tensor};

/// Leaf layer configuration.
#[derive(Config)]
pub enum LayerSpec {
    /// 2D convolution.
    Conv(Conv2dConfig),

    /// Per-channel batch normalization.
    Norm(BatchNormConfig),

    /// Elementwise activation.
    Act(ActivationConfig),

    /// Max pooling.
    MaxPool(MaxPool2dConfig),

    /// Average pooling.
    AvgPool(AvgPool2dConfig),

    /// Adaptive average pooling to a fixed output resolution.
    AdaptiveAvgPool(AdaptiveAvgPool2dConfig),
}

// burn 0.18 does not implement `Debug` for `AdaptiveAvgPool2dConfig`, so this
// mirrors the derived output by hand.
impl core::fmt::Debug for LayerSpec {
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        match self {
            Self::Conv(config) => f.debug_tuple("Conv").field(config).finish(),
            Self::Norm(config) => f.debug_tuple("Norm").field(config).finish(),
            Self::Act(config) => f.debug_tuple("Act").field(config).finish(),
            Self::MaxPool(config) => f.debug_tuple("MaxPool").field(config).finish(),
            Self::AvgPool(config) => f.debug_tuple("AvgPool").field(config).finish(),
            Self::AdaptiveAvgPool(config) => f
                .debug_tuple("AdaptiveAvgPool")
                .field(&format_args!(
                    "AdaptiveAvgPool2dConfig {{ output_size: {:?} }}",
                    config.output_size
                ))
                .finish(),
        }
    }
}

impl From<Conv2dConfig> for LayerSpec {
    fn from(config: Conv2dConfig) -> Self {
        Self::Conv(config)
    }
}

impl From<BatchNormConfig> for LayerSpec {
    fn from(config: BatchNormConfig) -> Self {
        Self::Norm(config)
    }
}

impl From<ActivationConfig> for LayerSpec {
    fn from(config: ActivationConfig) -> Self {
        Self::Act(config)
    }
}

impl From<MaxPool2dConfig> for LayerSpec {
    fn from(config: MaxPool2dConfig) -> Self {
        Self::MaxPool(config)
    }
}

impl From<AvgPool2dConfig> for LayerSpec {
    fn from(config: AvgPool2dConfig) -> Self {
        Self::AvgPool(config)
    }
}

impl From<AdaptiveAvgPool2dConfig> for LayerSpec {
    fn from(config: AdaptiveAvgPool2dConfig) -> Self {
        Self::AdaptiveAvgPool(config)
    }
}

impl LayerSpec {
    /// Short kind name, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            LayerSpec::Conv(_) => "conv",
            LayerSpec::Norm(_) => "norm",
            LayerSpec::Act(_) => "act",
            LayerSpec::MaxPool(_) => "max_pool",
            LayerSpec::AvgPool(_) => "avg_pool",
            LayerSpec::AdaptiveAvgPool(_) => "adaptive_avg_pool",
        }
    }

    /// Infer the output shape of this layer.
    ///
    /// # Arguments
    ///
    /// - `stage`: the stage name, used in errors.
    /// - `input`: the input ``[channels, height, width]``.
    ///
    /// # Returns
    ///
    /// The output ``[channels, height, width]``, or an error naming `stage`.
    pub fn output_shape(
        &self,
        stage: &str,
        input: FeatureShape,
    ) -> NetworkResult<FeatureShape> {
        match self {
            LayerSpec::Conv(conv) => {
                let [in_channels, out_channels] = conv.channels;
                if in_channels == 0 || out_channels == 0 {
                    return Err(NetworkError::configuration(
                        stage,
                        format!("conv channels must be positive, got {:?}", conv.channels),
                    ));
                }
                if conv.groups == 0
                    || in_channels % conv.groups != 0
                    || out_channels % conv.groups != 0
                {
                    return Err(NetworkError::configuration(
                        stage,
                        format!(
                            "conv groups ({}) must divide channels {:?}",
                            conv.groups, conv.channels
                        ),
                    ));
                }
                if input.channels != in_channels {
                    return Err(NetworkError::shape_mismatch(
                        stage,
                        format!("{in_channels} input channels"),
                        format!("{} input channels", input.channels),
                    ));
                }
                let [height, width] = window_output_resolution(
                    stage,
                    input.resolution(),
                    conv.kernel_size,
                    conv.stride,
                    &conv.padding,
                    conv.dilation,
                )?;
                Ok(FeatureShape::new(out_channels, height, width))
            }
            LayerSpec::Norm(norm) => {
                if norm.num_features != input.channels {
                    return Err(NetworkError::shape_mismatch(
                        stage,
                        format!("{} norm features", norm.num_features),
                        format!("{} input channels", input.channels),
                    ));
                }
                Ok(input)
            }
            LayerSpec::Act(_) => Ok(input),
            LayerSpec::MaxPool(pool) => {
                let [height, width] = window_output_resolution(
                    stage,
                    input.resolution(),
                    pool.kernel_size,
                    pool.strides,
                    &pool.padding,
                    pool.dilation,
                )?;
                Ok(FeatureShape::new(input.channels, height, width))
            }
            LayerSpec::AvgPool(pool) => {
                let [height, width] = window_output_resolution(
                    stage,
                    input.resolution(),
                    pool.kernel_size,
                    pool.strides,
                    &pool.padding,
                    [1, 1],
                )?;
                Ok(FeatureShape::new(input.channels, height, width))
            }
            LayerSpec::AdaptiveAvgPool(pool) => {
                if pool.output_size.contains(&0) {
                    return Err(NetworkError::configuration(
                        stage,
                        format!(
                            "adaptive pool output size must be positive, got {:?}",
                            pool.output_size
                        ),
                    ));
                }
                Ok(FeatureShape::from_resolution(
                    input.channels,
                    pool.output_size,
                ))
            }
        }
    }

    /// Initialize a [`Layer`].
    pub fn init<B: Backend>(
        &self,
        device: &B::Device,
    ) -> Layer<B> {
        match self {
            LayerSpec::Conv(config) => Layer::Conv(config.init(device)),
            LayerSpec::Norm(config) => Layer::Norm(config.init(device)),
            LayerSpec::Act(config) => Layer::Act(config.init()),
            LayerSpec::MaxPool(config) => Layer::MaxPool(config.init()),
            LayerSpec::AvgPool(config) => Layer::AvgPool(config.init()),
            LayerSpec::AdaptiveAvgPool(config) => Layer::AdaptiveAvgPool(config.init()),
        }
    }
}

/// Leaf image-stage layer.
///
/// Maps ``[batch, in_channels, in_height, in_width]`` to
/// ``[batch, out_channels, out_height, out_width]``.
#[derive(Module, Debug)]
pub enum Layer<B: Backend> {
    /// [`Conv2d`] layer.
    Conv(Conv2d<B>),

    /// [`BatchNorm`] layer.
    Norm(BatchNorm<B, 2>),

    /// [`Activation`] layer.
    Act(Activation),

    /// [`MaxPool2d`] layer.
    MaxPool(MaxPool2d),

    /// [`AvgPool2d`] layer.
    AvgPool(AvgPool2d),

    /// [`AdaptiveAvgPool2d`] layer.
    AdaptiveAvgPool(AdaptiveAvgPool2d),
}

impl<B: Backend> Layer<B> {
    /// Forward pass.
    pub fn forward(
        &self,
        input: Tensor<B, 4>,
    ) -> Tensor<B, 4> {
        match self {
            Layer::Conv(layer) => layer.forward(input),
            Layer::Norm(layer) => layer.forward(input),
            Layer::Act(layer) => layer.forward(input),
            Layer::MaxPool(layer) => layer.forward(input),
            Layer::AvgPool(layer) => layer.forward(input),
            Layer::AdaptiveAvgPool(layer) => layer.forward(input),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::nn::PaddingConfig2d;

    #[test]
    fn test_conv_output_shape() {
        let spec: LayerSpec = Conv2dConfig::new([1, 10], [10, 10])
            .with_stride([2, 2])
            .into();
        let out = spec
            .output_shape("conv", FeatureShape::new(1, 128, 128))
            .unwrap();
        assert_eq!(out, FeatureShape::new(10, 60, 60));
    }

    #[test]
    fn test_conv_channel_mismatch() {
        let spec: LayerSpec = Conv2dConfig::new([3, 10], [3, 3]).into();
        let err = spec
            .output_shape("stem.layers[0]", FeatureShape::new(1, 8, 8))
            .unwrap_err();
        assert_eq!(
            err,
            NetworkError::shape_mismatch(
                "stem.layers[0]",
                "3 input channels",
                "1 input channels"
            )
        );
    }

    #[test]
    fn test_zero_channels_is_configuration_error() {
        let spec: LayerSpec = Conv2dConfig::new([1, 0], [3, 3]).into();
        let err = spec
            .output_shape("conv", FeatureShape::new(1, 8, 8))
            .unwrap_err();
        assert!(matches!(err, NetworkError::Configuration { .. }));
    }

    #[test]
    fn test_norm_features_mismatch() {
        let spec: LayerSpec = BatchNormConfig::new(64).into();
        assert!(spec.output_shape("bn", FeatureShape::new(64, 3, 3)).is_ok());
        let err = spec
            .output_shape("bn", FeatureShape::new(32, 3, 3))
            .unwrap_err();
        assert!(matches!(err, NetworkError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_pool_output_shapes() {
        let input = FeatureShape::new(4, 13, 13);

        let max: LayerSpec = MaxPool2dConfig::new([3, 3]).with_strides([2, 2]).into();
        assert_eq!(
            max.output_shape("max", input).unwrap(),
            FeatureShape::new(4, 6, 6)
        );

        let avg: LayerSpec = AvgPool2dConfig::new([3, 3])
            .with_strides([1, 1])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .into();
        assert_eq!(avg.output_shape("avg", input).unwrap(), input);

        let adaptive: LayerSpec = AdaptiveAvgPool2dConfig::new([1, 1]).into();
        assert_eq!(
            adaptive.output_shape("gap", input).unwrap(),
            FeatureShape::new(4, 1, 1)
        );
    }

    #[test]
    fn test_forward_agrees_with_inference() {
        type B = NdArray<f32>;
        let device = Default::default();

        let specs: Vec<LayerSpec> = vec![
            Conv2dConfig::new([2, 5], [3, 3])
                .with_stride([2, 2])
                .with_padding(PaddingConfig2d::Explicit(1, 1))
                .into(),
            BatchNormConfig::new(5).into(),
            ActivationConfig::Relu.into(),
            MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).into(),
            AdaptiveAvgPool2dConfig::new([1, 1]).into(),
        ];

        let mut shape = FeatureShape::new(2, 17, 11);
        let mut x: Tensor<B, 4> = Tensor::ones([3, 2, 17, 11], &device);
        for spec in &specs {
            shape = spec.output_shape(spec.kind(), shape).unwrap();
            x = spec.init::<B>(&device).forward(x);
            assert_eq!(x.dims(), [3, shape.channels, shape.height, shape.width]);
        }
    }
}
