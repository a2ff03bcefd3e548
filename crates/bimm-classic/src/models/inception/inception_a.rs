//! # `InceptionA`
//!
//! A fixed-width Inception module producing 88 channels:
//!
//! | branch | layers                                   | channels |
//! |--------|------------------------------------------|----------|
//! | 0      | 1x1                                      | 16       |
//! | 1      | 1x1 (16) -> 5x5 pad 2                    | 24       |
//! | 2      | 1x1 (16) -> 3x3 pad 1 (24) -> 3x3 pad 1  | 24       |
//! | 3      | avg-pool 3/1 pad 1 -> 1x1                | 24       |
//!
//! Every conv is a [`BasicConv2dConfig`].

use crate::layers::branch::{BranchSet, BranchSetConfig};
use crate::layers::pipeline::PipelineConfig;
use crate::layers::stage::StageSpec;
use crate::models::inception::basic_conv::{BasicConv2dConfig, basic_conv_chain};
use burn::config::Config;
use burn::nn::PaddingConfig2d;
use burn::nn::pool::AvgPool2dConfig;
use burn::prelude::Backend;

/// Output width of every [`InceptionAConfig`].
pub const INCEPTION_A_OUT_CHANNELS: usize = 16 + 24 + 24 + 24;

/// `InceptionA` Config.
#[derive(Config, Debug)]
pub struct InceptionAConfig {
    /// Input channels.
    pub in_channels: usize,
}

impl InceptionAConfig {
    /// The concatenated output width.
    pub fn out_channels(&self) -> usize {
        INCEPTION_A_OUT_CHANNELS
    }

    /// Lower to a [`BranchSetConfig`].
    pub fn to_branch_set(&self) -> BranchSetConfig {
        let in_channels = self.in_channels;
        let pool = PipelineConfig::new(vec![
            AvgPool2dConfig::new([3, 3])
                .with_strides([1, 1])
                .with_padding(PaddingConfig2d::Explicit(1, 1))
                .into(),
        ]);

        BranchSetConfig::new(vec![
            BasicConv2dConfig::new(in_channels, 16).into(),
            basic_conv_chain([
                BasicConv2dConfig::new(in_channels, 16),
                BasicConv2dConfig::new(16, 24)
                    .with_kernel_size(5)
                    .with_padding(2),
            ]),
            basic_conv_chain([
                BasicConv2dConfig::new(in_channels, 16),
                BasicConv2dConfig::new(16, 24)
                    .with_kernel_size(3)
                    .with_padding(1),
                BasicConv2dConfig::new(24, 24)
                    .with_kernel_size(3)
                    .with_padding(1),
            ]),
            pool.then(BasicConv2dConfig::new(in_channels, 24)),
        ])
    }

    /// Initialize a [`BranchSet`].
    pub fn init<B: Backend>(
        &self,
        device: &B::Device,
    ) -> BranchSet<B> {
        self.to_branch_set().init(device)
    }
}

impl From<InceptionAConfig> for StageSpec {
    fn from(config: InceptionAConfig) -> Self {
        config.to_branch_set().into()
    }
}
