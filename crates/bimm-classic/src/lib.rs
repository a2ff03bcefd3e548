#![warn(missing_docs)]
//!# bimm-classic - Classic Image Classifiers for Burn
//!
//! Every network maps a ``[batch, 1, H, W]`` image batch to ``[batch, 20]``
//! logits. Configs infer every stage shape symbolically, so a broken
//! channel chain or a flatten/head width disagreement is reported as a
//! [`errors::NetworkError`] before any parameter is allocated.
//!
//! ## Notable Components
//!
//! * [`errors`] - construction errors, scoped by dotted stage path.
//! * [`shape`] - symbolic ``[channels, height, width]`` shapes.
//! * [`layers`] - leaf layers and the composite stages.
//!   * [`layers::pipeline`] - sequential layers.
//!   * [`layers::branch`] - branch-concatenate.
//!   * [`layers::residual`] - residual-add.
//!   * [`layers::dense`] - the flattened output head.
//! * [`models`] - complete networks.
//!   * [`models::lenet`], [`models::alexnet`], [`models::vgg`]
//!   * [`models::resnet`] - `Bottleneck` and `ResNet50`.
//!   * [`models::inception`] - `InceptionA`, `Inception` and `GoogleNet`.
//!   * [`models::efficientnet`] - identity placeholder.
//!   * [`models::architecture`] - select a network by name.

/// Test-only macro import.
#[cfg(test)]
#[allow(unused_imports)]
#[macro_use]
extern crate hamcrest;

pub mod errors;
pub mod layers;
pub mod models;
pub mod shape;
