//! # `EfficientNet` Placeholder
//!
//! [`EfficientNet`] has no layers; its forward pass is the identity.
//! It is not a [`ClassifierStructure`](crate::models::classifier::ClassifierStructure).

use burn::config::Config;
use burn::module::Module;
use burn::prelude::{Backend, Tensor};

/// [`EfficientNet`] Config.
#[derive(Config, Debug)]
pub struct EfficientNetConfig {}

impl EfficientNetConfig {
    /// Initialize an [`EfficientNet`].
    pub fn init(&self) -> EfficientNet {
        EfficientNet
    }
}

/// Identity placeholder network.
#[derive(Module, Clone, Debug, Default)]
pub struct EfficientNet;

impl EfficientNet {
    /// Forward pass; returns the input unchanged.
    pub fn forward<B: Backend, const D: usize>(
        &self,
        input: Tensor<B, D>,
    ) -> Tensor<B, D> {
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::Distribution;

    #[test]
    fn test_identity() {
        type B = NdArray<f32>;
        let device = Default::default();

        let model = EfficientNetConfig::new().init();

        let input: Tensor<B, 4> = Tensor::random([2, 1, 8, 8], Distribution::Default, &device);
        model
            .forward(input.clone())
            .to_data()
            .assert_eq(&input.to_data(), true);

        let input: Tensor<B, 2> = Tensor::random([3, 20], Distribution::Default, &device);
        model
            .forward(input.clone())
            .to_data()
            .assert_eq(&input.to_data(), true);
    }
}
