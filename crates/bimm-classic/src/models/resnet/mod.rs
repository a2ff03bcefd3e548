//! # `ResNet`

pub mod bottleneck;
pub mod resnet50;
