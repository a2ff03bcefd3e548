//! # `BasicConv2d`
//!
//! ``conv -> relu``, with no normalization.

use crate::layers::activation::ActivationConfig;
use crate::layers::layer::LayerSpec;
use crate::layers::pipeline::{Pipeline, PipelineConfig};
use burn::config::Config;
use burn::nn::PaddingConfig2d;
use burn::nn::conv::Conv2dConfig;
use burn::prelude::Backend;

/// `BasicConv2d` Config.
#[derive(Config, Debug)]
pub struct BasicConv2dConfig {
    /// Input channels.
    pub in_channels: usize,

    /// Output channels.
    pub out_channels: usize,

    /// Square kernel size.
    #[config(default = 1)]
    pub kernel_size: usize,

    /// Stride.
    #[config(default = 1)]
    pub stride: usize,

    /// Symmetric zero padding.
    #[config(default = 0)]
    pub padding: usize,
}

impl BasicConv2dConfig {
    /// Lower to ``[conv, relu]``.
    pub fn to_layers(&self) -> Vec<LayerSpec> {
        let k = self.kernel_size;
        vec![
            Conv2dConfig::new([self.in_channels, self.out_channels], [k, k])
                .with_stride([self.stride, self.stride])
                .with_padding(PaddingConfig2d::Explicit(self.padding, self.padding))
                .into(),
            ActivationConfig::Relu.into(),
        ]
    }

    /// Initialize the ``[conv, relu]`` [`Pipeline`].
    pub fn init<B: Backend>(
        &self,
        device: &B::Device,
    ) -> Pipeline<B> {
        PipelineConfig::from(self.clone()).init(device)
    }
}

impl From<BasicConv2dConfig> for PipelineConfig {
    fn from(config: BasicConv2dConfig) -> Self {
        config.to_layers().into()
    }
}

/// Chain ``BasicConv2d`` units into one pipeline.
pub fn basic_conv_chain<I>(units: I) -> PipelineConfig
where
    I: IntoIterator<Item = BasicConv2dConfig>,
{
    units
        .into_iter()
        .flat_map(|unit| unit.to_layers())
        .collect::<Vec<_>>()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::FeatureShape;
    use burn::backend::NdArray;
    use burn::prelude::Tensor;

    #[test]
    fn test_lowering() {
        let config = BasicConv2dConfig::new(4, 8)
            .with_kernel_size(3)
            .with_padding(1);
        let layers = config.to_layers();
        assert_eq!(layers.len(), 2);
        assert!(matches!(&layers[0], LayerSpec::Conv(conv) if conv.kernel_size == [3, 3]));
        assert!(matches!(&layers[1], LayerSpec::Act(ActivationConfig::Relu)));

        let pipeline: PipelineConfig = config.into();
        assert_eq!(
            pipeline.output_shape(FeatureShape::new(4, 10, 10)),
            Ok(FeatureShape::new(8, 10, 10))
        );
    }

    #[test]
    fn test_chain() {
        let chain = basic_conv_chain([
            BasicConv2dConfig::new(4, 2),
            BasicConv2dConfig::new(2, 6).with_kernel_size(5),
        ]);
        assert_eq!(chain.len(), 4);
        assert_eq!(
            chain.output_shape(FeatureShape::new(4, 9, 9)),
            Ok(FeatureShape::new(6, 5, 5))
        );
    }

    #[test]
    fn test_forward_is_non_negative() {
        type B = NdArray<f32>;
        let device = Default::default();

        let unit: Pipeline<B> = BasicConv2dConfig::new(2, 3).init(&device);
        let output = unit.forward(Tensor::random(
            [2, 2, 5, 5],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        ));
        assert_eq!(output.dims(), [2, 3, 5, 5]);
        let min = output.min().into_scalar();
        assert!(min >= 0.0);
    }
}
