//! # Dense Head
//!
//! The [`DenseHead`] is the flattened output stage of a classifier:
//! a sequence of [`Linear`], [`Dropout`] and [`Activation`] layers
//! over ``[batch, features]`` tensors.
//!
//! [`Dropout`] is only active on autodiff backends (training mode).

use crate::errors::{NetworkError, NetworkResult};
use crate::layers::activation::{Activation, ActivationConfig};
use bimm_contracts::{assert_shape_contract_periodically, unpack_shape_contract};
use burn::config::Config;
use burn::module::Module;
use burn::nn::{Dropout, DropoutConfig, Linear, LinearConfig};
use burn::prelude::{Backend, Tensor};

/// Dense layer configuration.
#[derive(Config, Debug)]
pub enum DenseSpec {
    /// Fully connected affine layer.
    Linear(LinearConfig),

    /// Dropout regularization.
    Dropout(DropoutConfig),

    /// Elementwise activation.
    Act(ActivationConfig),
}

impl From<LinearConfig> for DenseSpec {
    fn from(config: LinearConfig) -> Self {
        Self::Linear(config)
    }
}

impl From<DropoutConfig> for DenseSpec {
    fn from(config: DropoutConfig) -> Self {
        Self::Dropout(config)
    }
}

impl From<ActivationConfig> for DenseSpec {
    fn from(config: ActivationConfig) -> Self {
        Self::Act(config)
    }
}

impl DenseSpec {
    /// Infer the output feature count.
    pub fn output_features(
        &self,
        stage: &str,
        in_features: usize,
    ) -> NetworkResult<usize> {
        match self {
            DenseSpec::Linear(linear) => {
                if linear.d_input == 0 || linear.d_output == 0 {
                    return Err(NetworkError::configuration(
                        stage,
                        format!(
                            "linear features must be positive, got {} -> {}",
                            linear.d_input, linear.d_output
                        ),
                    ));
                }
                if linear.d_input != in_features {
                    return Err(NetworkError::shape_mismatch(
                        stage,
                        format!("{} input features", linear.d_input),
                        format!("{in_features} input features"),
                    ));
                }
                Ok(linear.d_output)
            }
            DenseSpec::Dropout(dropout) => {
                if !(0.0..1.0).contains(&dropout.prob) {
                    return Err(NetworkError::configuration(
                        stage,
                        format!("dropout probability must be in [0, 1), got {}", dropout.prob),
                    ));
                }
                Ok(in_features)
            }
            DenseSpec::Act(_) => Ok(in_features),
        }
    }

    /// Initialize a [`DenseLayer`].
    pub fn init<B: Backend>(
        &self,
        device: &B::Device,
    ) -> DenseLayer<B> {
        match self {
            DenseSpec::Linear(config) => DenseLayer::Linear(config.init(device)),
            DenseSpec::Dropout(config) => DenseLayer::Dropout(config.init()),
            DenseSpec::Act(config) => DenseLayer::Act(config.init()),
        }
    }
}

/// Dense layer.
#[derive(Module, Debug)]
pub enum DenseLayer<B: Backend> {
    /// [`Linear`] layer.
    Linear(Linear<B>),

    /// [`Dropout`] layer.
    Dropout(Dropout),

    /// [`Activation`] layer.
    Act(Activation),
}

impl<B: Backend> DenseLayer<B> {
    /// Forward pass.
    pub fn forward(
        &self,
        input: Tensor<B, 2>,
    ) -> Tensor<B, 2> {
        match self {
            DenseLayer::Linear(layer) => layer.forward(input),
            DenseLayer::Dropout(layer) => layer.forward(input),
            DenseLayer::Act(layer) => layer.forward(input),
        }
    }
}

/// [`DenseHead`] Configuration.
#[derive(Config, Debug)]
pub struct DenseHeadConfig {
    /// The layers, in application order.
    pub layers: Vec<DenseSpec>,
}

impl From<Vec<DenseSpec>> for DenseHeadConfig {
    fn from(layers: Vec<DenseSpec>) -> Self {
        Self { layers }
    }
}

impl DenseHeadConfig {
    /// The input width declared by the first [`Linear`] layer.
    pub fn in_features(&self) -> Option<usize> {
        self.layers.iter().find_map(|layer| match layer {
            DenseSpec::Linear(linear) => Some(linear.d_input),
            _ => None,
        })
    }

    /// Infer the output feature count.
    ///
    /// Errors are scoped as ``layers[idx]``.
    pub fn output_features(
        &self,
        in_features: usize,
    ) -> NetworkResult<usize> {
        if self.in_features().is_none() {
            return Err(NetworkError::configuration(
                "",
                "a dense head requires at least one linear layer",
            ));
        }
        self.layers
            .iter()
            .enumerate()
            .try_fold(in_features, |features, (idx, layer)| {
                layer.output_features(&format!("layers[{idx}]"), features)
            })
    }

    /// Initialize a [`DenseHead`].
    ///
    /// # Panics
    ///
    /// If there is no [`Linear`] layer.
    pub fn init<B: Backend>(
        &self,
        device: &B::Device,
    ) -> DenseHead<B> {
        assert!(
            self.in_features().is_some(),
            "a dense head requires at least one linear layer"
        );
        DenseHead {
            layers: self.layers.iter().map(|layer| layer.init(device)).collect(),
        }
    }
}

/// Sequential dense pipeline.
#[derive(Module, Debug)]
pub struct DenseHead<B: Backend> {
    /// Internal layers.
    pub layers: Vec<DenseLayer<B>>,
}

impl<B: Backend> DenseHead<B> {
    /// The input width of the first [`Linear`] layer.
    pub fn in_features(&self) -> usize {
        self.layers
            .iter()
            .find_map(|layer| match layer {
                DenseLayer::Linear(linear) => Some(linear.weight.dims()[0]),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// The output width of the last [`Linear`] layer.
    pub fn out_features(&self) -> usize {
        self.layers
            .iter()
            .rev()
            .find_map(|layer| match layer {
                DenseLayer::Linear(linear) => Some(linear.weight.dims()[1]),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// Forward Pass.
    ///
    /// # Arguments
    ///
    /// - `input`: a ``[batch, in_features]`` tensor.
    ///
    /// # Returns
    ///
    /// A ``[batch, out_features]`` tensor.
    pub fn forward(
        &self,
        input: Tensor<B, 2>,
    ) -> Tensor<B, 2> {
        let [batch] = unpack_shape_contract!(
            ["batch", "in_features"],
            &input,
            &["batch"],
            &[("in_features", self.in_features())],
        );

        let x = self.layers.iter().fold(input, |x, layer| layer.forward(x));

        assert_shape_contract_periodically!(
            ["batch", "out_features"],
            &x,
            &[("batch", batch), ("out_features", self.out_features())],
        );
        x
    }
}
