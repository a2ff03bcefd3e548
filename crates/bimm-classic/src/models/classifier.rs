//! # Image Classifier
//!
//! A [`Classifier`] is the common shape of every network in this crate:
//!
//! ```text
//! [batch, in_channels, height, width]
//!   -> stages[0] -> ... -> stages[n-1]
//!   -> flatten
//!   -> head
//! [batch, num_classes]
//! ```
//!
//! [`ClassifierConfig`] carries the declared input shape, so the whole
//! stage chain and the flatten/head boundary are checked symbolically
//! by [`ClassifierConfig::try_validate`] before any parameter is allocated.

use crate::errors::{NetworkError, NetworkResult};
use crate::layers::dense::{DenseHead, DenseHeadConfig};
use crate::layers::stage::{Stage, StageSpec};
use crate::shape::FeatureShape;
use bimm_contracts::unpack_shape_contract;
use burn::config::Config;
use burn::module::Module;
use burn::prelude::{Backend, Tensor};

/// Inferred shapes of a [`ClassifierConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierShapes {
    /// The declared input shape.
    pub input: FeatureShape,

    /// The output shape of each stage.
    pub stages: Vec<FeatureShape>,

    /// The flattened width entering the head.
    pub flat_features: usize,

    /// The output width of the head.
    pub num_classes: usize,
}

/// A named network architecture which lowers to a [`ClassifierConfig`].
///
/// The provided methods scope errors with the architecture name.
pub trait ClassifierStructure {
    /// The architecture name.
    fn name(&self) -> &'static str;

    /// Lower to the generic classifier structure.
    fn to_classifier(&self) -> ClassifierConfig;

    /// Architecture-level checks which precede lowering.
    fn check_structure(&self) -> NetworkResult<()> {
        Ok(())
    }

    /// Infer every shape in the network.
    fn try_infer(&self) -> NetworkResult<ClassifierShapes> {
        self.check_structure()
            .and_then(|_| self.to_classifier().try_infer())
            .map_err(|err| err.within(self.name()))
    }

    /// Check if the config is valid.
    fn try_validate(&self) -> NetworkResult<()> {
        self.try_infer().map(|_| ())
    }

    /// Validate, then initialize a [`Classifier`].
    fn try_init<B: Backend>(
        &self,
        device: &B::Device,
    ) -> NetworkResult<Classifier<B>> {
        self.check_structure()
            .and_then(|_| self.to_classifier().try_init(device))
            .map_err(|err| err.within(self.name()))
    }

    /// Initialize a [`Classifier`].
    ///
    /// # Panics
    ///
    /// If the config is invalid.
    fn init<B: Backend>(
        &self,
        device: &B::Device,
    ) -> Classifier<B> {
        match self.try_init(device) {
            Ok(model) => model,
            Err(err) => panic!("{err}"),
        }
    }
}

/// [`Classifier`] Configuration.
#[derive(Config, Debug)]
pub struct ClassifierConfig {
    /// Input channels.
    pub in_channels: usize,

    /// Declared input ``[height, width]``.
    pub input_resolution: [usize; 2],

    /// Image stages, in application order.
    pub stages: Vec<StageSpec>,

    /// Flattened output head.
    pub head: DenseHeadConfig,
}

impl ClassifierConfig {
    /// The declared ``[channels, height, width]`` input shape.
    pub fn input_shape(&self) -> FeatureShape {
        FeatureShape::from_resolution(self.in_channels, self.input_resolution)
    }

    /// Infer every shape in the network.
    ///
    /// Errors are scoped as ``stages[idx]`` or ``head``.
    pub fn try_infer(&self) -> NetworkResult<ClassifierShapes> {
        let input = self.input_shape();
        if input.dims().contains(&0) {
            return Err(NetworkError::configuration(
                "input",
                format!("input shape must be positive, got {input}"),
            ));
        }

        let mut stages = Vec::with_capacity(self.stages.len());
        let mut shape = input;
        for (idx, stage) in self.stages.iter().enumerate() {
            shape = stage
                .output_shape(shape)
                .map_err(|err| err.within(&format!("stages[{idx}]")))?;
            tracing::debug!(stage = idx, kind = stage.kind(), shape = %shape, "inferred stage shape");
            stages.push(shape);
        }

        let flat_features = shape.flat_features();
        let num_classes = self
            .head
            .output_features(flat_features)
            .map_err(|err| err.within("head"))?;

        Ok(ClassifierShapes {
            input,
            stages,
            flat_features,
            num_classes,
        })
    }

    /// Check if the config is valid.
    pub fn try_validate(&self) -> NetworkResult<()> {
        self.try_infer().map(|_| ())
    }

    /// Validate, then initialize a [`Classifier`].
    #[tracing::instrument(skip_all, fields(stages = self.stages.len()))]
    pub fn try_init<B: Backend>(
        &self,
        device: &B::Device,
    ) -> NetworkResult<Classifier<B>> {
        let shapes = self.try_infer()?;
        tracing::debug!(
            input = %shapes.input,
            flat_features = shapes.flat_features,
            num_classes = shapes.num_classes,
            "initializing classifier"
        );

        Ok(Classifier {
            in_channels: self.in_channels,
            input_height: self.input_resolution[0],
            input_width: self.input_resolution[1],
            stages: self.stages.iter().map(|stage| stage.init(device)).collect(),
            head: self.head.init(device),
        })
    }

    /// Initialize a [`Classifier`].
    ///
    /// # Panics
    ///
    /// If the config is invalid.
    pub fn init<B: Backend>(
        &self,
        device: &B::Device,
    ) -> Classifier<B> {
        match self.try_init(device) {
            Ok(model) => model,
            Err(err) => panic!("{err}"),
        }
    }
}

/// Image classifier.
#[derive(Module, Debug)]
pub struct Classifier<B: Backend> {
    /// Expected input channels.
    pub in_channels: usize,

    /// Declared input height.
    pub input_height: usize,

    /// Declared input width.
    pub input_width: usize,

    /// Image stages.
    pub stages: Vec<Stage<B>>,

    /// Flattened output head.
    pub head: DenseHead<B>,
}

impl<B: Backend> Classifier<B> {
    /// The declared ``[channels, height, width]`` input shape.
    pub fn input_shape(&self) -> FeatureShape {
        FeatureShape::new(self.in_channels, self.input_height, self.input_width)
    }

    /// The number of image stages.
    pub fn num_stages(&self) -> usize {
        self.stages.len()
    }

    /// The flattened width expected by the head.
    pub fn head_in_features(&self) -> usize {
        self.head.in_features()
    }

    /// The number of output classes.
    pub fn num_classes(&self) -> usize {
        self.head.out_features()
    }

    /// Forward Pass.
    ///
    /// # Arguments
    ///
    /// - `input`: a ``[batch, in_channels, height, width]`` tensor.
    ///
    /// # Returns
    ///
    /// A ``[batch, num_classes]`` logits tensor.
    pub fn forward(
        &self,
        input: Tensor<B, 4>,
    ) -> Tensor<B, 2> {
        let [batch] = unpack_shape_contract!(
            ["batch", "in_channels", "height", "width"],
            &input,
            &["batch"],
            &[("in_channels", self.in_channels)],
        );

        let x = self.stages.iter().fold(input, |x, stage| stage.forward(x));

        // [batch, channels, height, width] -> [batch, channels * height * width]
        let x: Tensor<B, 2> = x.flatten(1, 3);

        let x = self.head.forward(x);
        debug_assert_eq!(x.dims()[0], batch);
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::activation::ActivationConfig;
    use crate::layers::pipeline::PipelineConfig;
    use burn::backend::{Autodiff, NdArray};
    use burn::module::AutodiffModule;
    use burn::nn::conv::Conv2dConfig;
    use burn::nn::pool::MaxPool2dConfig;
    use burn::nn::{DropoutConfig, LinearConfig};
    use burn::tensor::Distribution;

    fn tiny(resolution: [usize; 2]) -> ClassifierConfig {
        ClassifierConfig::new(
            1,
            resolution,
            vec![
                PipelineConfig::new(vec![
                    Conv2dConfig::new([1, 2], [3, 3]).into(),
                    ActivationConfig::Relu.into(),
                    MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).into(),
                ])
                .into(),
            ],
            DenseHeadConfig::new(vec![LinearConfig::new(2 * 4 * 4, 3).into()]),
        )
    }

    #[test]
    fn test_try_infer() {
        let shapes = tiny([10, 10]).try_infer().unwrap();
        assert_eq!(shapes.input, FeatureShape::new(1, 10, 10));
        assert_eq!(shapes.stages, vec![FeatureShape::new(2, 4, 4)]);
        assert_eq!(shapes.flat_features, 32);
        assert_eq!(shapes.num_classes, 3);
    }

    #[test]
    fn test_flatten_mismatch_is_reported_at_head() {
        let err = tiny([12, 12]).try_validate().unwrap_err();
        assert_eq!(
            err,
            NetworkError::shape_mismatch(
                "head.layers[0]",
                "32 input features",
                "50 input features"
            )
        );
    }

    #[test]
    #[should_panic(expected = "head.layers[0]")]
    fn test_init_panics_on_invalid() {
        type B = NdArray<f32>;
        let device = Default::default();
        let _model: Classifier<B> = tiny([12, 12]).init(&device);
    }

    #[test]
    fn test_zero_input_resolution() {
        let err = tiny([0, 10]).try_validate().unwrap_err();
        assert_eq!(err.stage(), "input");
    }

    #[test]
    fn test_forward() {
        type B = NdArray<f32>;
        let device = Default::default();

        let model: Classifier<B> = tiny([10, 10]).try_init(&device).unwrap();
        assert_eq!(model.input_shape(), FeatureShape::new(1, 10, 10));
        assert_eq!(model.num_stages(), 1);
        assert_eq!(model.head_in_features(), 32);
        assert_eq!(model.num_classes(), 3);

        let output = model.forward(Tensor::ones([5, 1, 10, 10], &device));
        assert_eq!(output.dims(), [5, 3]);
    }

    /// ``tiny`` with a dropout head.
    fn tiny_dropout() -> ClassifierConfig {
        let mut config = tiny([10, 10]);
        config.head = DenseHeadConfig::new(vec![
            DropoutConfig::new(0.5).into(),
            LinearConfig::new(2 * 4 * 4, 3).into(),
        ]);
        config
    }

    #[test]
    fn test_identical_records_are_deterministic() {
        type B = NdArray<f32>;
        let device = Default::default();

        let config = tiny_dropout();
        let a: Classifier<B> = config.init(&device);
        let b: Classifier<B> = config.init::<B>(&device).load_record(a.clone().into_record());

        let input: Tensor<B, 4> =
            Tensor::random([4, 1, 10, 10], Distribution::Default, &device);
        a.forward(input.clone())
            .to_data()
            .assert_eq(&b.forward(input).to_data(), true);
    }

    #[test]
    fn test_mode_switch() {
        type I = NdArray<f32>;
        type B = Autodiff<I>;
        let device = Default::default();

        let input: Tensor<I, 4> =
            Tensor::random([4, 1, 10, 10], Distribution::Default, &device);

        // Without dropout or norm, both modes compute the same function.
        let train: Classifier<B> = tiny([10, 10]).init(&device);
        let infer: Classifier<I> = train.valid();
        train
            .forward(Tensor::from_inner(input.clone()))
            .inner()
            .to_data()
            .assert_eq(&infer.forward(input.clone()).to_data(), true);

        // Dropout only acts in training mode.
        let train: Classifier<B> = tiny_dropout().init(&device);
        let infer: Classifier<I> = train.valid();
        let expected = infer.forward(input.clone()).to_data();
        infer
            .forward(input.clone())
            .to_data()
            .assert_eq(&expected, true);
        let trained = train.forward(Tensor::from_inner(input)).inner().to_data();
        assert_ne!(trained, expected);
    }

    #[test]
    #[should_panic]
    fn test_forward_wrong_channels() {
        type B = NdArray<f32>;
        let device = Default::default();

        let model: Classifier<B> = tiny([10, 10]).init(&device);
        model.forward(Tensor::ones([1, 3, 10, 10], &device));
    }
}
