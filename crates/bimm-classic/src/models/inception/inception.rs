//! # `GoogleNet` Inception Module
//!
//! Four [`BasicConv2dConfig`] branches over one input:
//!
//! | branch | layers                        | channels    |
//! |--------|-------------------------------|-------------|
//! | 0      | 1x1                           | `ch1x1`     |
//! | 1      | 1x1 -> 3x3 pad 1              | `ch3x3`     |
//! | 2      | 1x1 -> 5x5 pad 2              | `ch5x5`     |
//! | 3      | max-pool 3/1 pad 1 -> 1x1     | `pool_proj` |

use crate::layers::branch::{BranchSet, BranchSetConfig};
use crate::layers::pipeline::PipelineConfig;
use crate::layers::stage::StageSpec;
use crate::models::inception::basic_conv::{BasicConv2dConfig, basic_conv_chain};
use burn::config::Config;
use burn::nn::PaddingConfig2d;
use burn::nn::pool::MaxPool2dConfig;
use burn::prelude::Backend;

/// `Inception` Config.
#[derive(Config, Debug)]
pub struct InceptionConfig {
    /// Input channels.
    pub in_channels: usize,

    /// 1x1 branch width.
    pub ch1x1: usize,

    /// 3x3 branch reduction width.
    pub ch3x3red: usize,

    /// 3x3 branch width.
    pub ch3x3: usize,

    /// 5x5 branch reduction width.
    pub ch5x5red: usize,

    /// 5x5 branch width.
    pub ch5x5: usize,

    /// Pool branch projection width.
    pub pool_proj: usize,
}

impl InceptionConfig {
    /// The concatenated output width.
    pub fn out_channels(&self) -> usize {
        self.ch1x1 + self.ch3x3 + self.ch5x5 + self.pool_proj
    }

    /// Lower to a [`BranchSetConfig`].
    pub fn to_branch_set(&self) -> BranchSetConfig {
        let pool = PipelineConfig::new(vec![
            MaxPool2dConfig::new([3, 3])
                .with_strides([1, 1])
                .with_padding(PaddingConfig2d::Explicit(1, 1))
                .into(),
        ]);

        BranchSetConfig::new(vec![
            BasicConv2dConfig::new(self.in_channels, self.ch1x1).into(),
            basic_conv_chain([
                BasicConv2dConfig::new(self.in_channels, self.ch3x3red),
                BasicConv2dConfig::new(self.ch3x3red, self.ch3x3)
                    .with_kernel_size(3)
                    .with_padding(1),
            ]),
            basic_conv_chain([
                BasicConv2dConfig::new(self.in_channels, self.ch5x5red),
                BasicConv2dConfig::new(self.ch5x5red, self.ch5x5)
                    .with_kernel_size(5)
                    .with_padding(2),
            ]),
            pool.then(BasicConv2dConfig::new(self.in_channels, self.pool_proj)),
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

impl From<InceptionConfig> for StageSpec {
    fn from(config: InceptionConfig) -> Self {
        config.to_branch_set().into()
    }
}
