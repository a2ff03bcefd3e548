//! # Classifier Networks
//!
//! Every network lowers to a [`classifier::ClassifierConfig`] through
//! [`classifier::ClassifierStructure`], except the
//! [`efficientnet::EfficientNet`] placeholder.

pub mod alexnet;
pub mod architecture;
pub mod classifier;
pub mod efficientnet;
pub mod inception;
pub mod lenet;
pub mod resnet;
pub mod vgg;
