//! Composable layers, with construction-time shape inference.
//!
//! * [`layer`] - leaf image-stage operators.
//! * [`pipeline`] - sequential layers.
//! * [`branch`] - branch-concatenate.
//! * [`residual`] - residual-add.
//! * [`stage`] - the closed set of image stages.
//! * [`dense`] - the flattened dense head.
pub mod activation;
pub mod branch;
pub mod dense;
pub mod layer;
pub mod pipeline;
pub mod residual;
pub mod stage;
