//! # Inception Modules
//!
//! Branch-concatenate modules built from [`basic_conv::BasicConv2dConfig`]
//! units, and the `GoogleNet` classifier.

pub mod basic_conv;
pub mod googlenet;
#[allow(clippy::module_inception)]
pub mod inception;
pub mod inception_a;
