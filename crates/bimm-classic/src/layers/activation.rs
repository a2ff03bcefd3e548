//! # Activation Layer Wrapper
use burn::nn::{Relu, Sigmoid};
use burn::prelude::{Backend, Config, Module, Tensor};

/// [`Activation`] Configuration.
#[derive(Config, Debug)]
pub enum ActivationConfig {
    /// [`Relu`] activation layer.
    Relu,

    /// [`Sigmoid`] activation layer.
    Sigmoid,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self::Relu
    }
}

impl ActivationConfig {
    /// Initialize a wrapped activation layer.
    pub fn init(&self) -> Activation {
        match self {
            ActivationConfig::Relu => Activation::Relu(Relu),
            ActivationConfig::Sigmoid => Activation::Sigmoid(Sigmoid),
        }
    }
}

/// Activation Layer Wrapper.
///
/// Stateless, and shape preserving for any tensor rank.
#[derive(Module, Clone, Debug)]
pub enum Activation {
    /// [`Relu`] activation layer.
    Relu(Relu),

    /// [`Sigmoid`] activation layer.
    Sigmoid(Sigmoid),
}

impl Activation {
    /// Forward pass.
    pub fn forward<B: Backend, const D: usize>(
        &self,
        input: Tensor<B, D>,
    ) -> Tensor<B, D> {
        match self {
            Activation::Relu(layer) => layer.forward(input),
            Activation::Sigmoid(layer) => layer.forward(input),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    fn make_input<B: Backend>(device: &B::Device) -> Tensor<B, 2> {
        Tensor::from_data([[-1.0, -0.5, 0.0], [1.0, 0.5, 0.0]], device)
    }

    #[test]
    fn test_relu() {
        let device = Default::default();
        let input = make_input::<TestBackend>(&device);
        let expected = Relu.forward(input.clone());

        let act = ActivationConfig::Relu.init();
        act.forward(input)
            .to_data()
            .assert_eq(&expected.to_data(), true);
    }

    #[test]
    fn test_sigmoid() {
        let device = Default::default();
        let input = make_input::<TestBackend>(&device);
        let expected = Sigmoid.forward(input.clone());

        let act = ActivationConfig::Sigmoid.init();
        act.forward(input)
            .to_data()
            .assert_eq(&expected.to_data(), true);
    }

    #[test]
    fn test_default_is_relu() {
        assert!(matches!(ActivationConfig::default(), ActivationConfig::Relu));
    }
}
