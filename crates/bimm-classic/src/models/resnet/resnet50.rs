//! # `ResNet50`
//!
//! ```text
//! stem:   conv 17x17 (1 -> 64) -> bn -> max-pool 2/2
//! groups: 3, 4, 6, 3 bottleneck units; 64 -> 256 -> 512 -> 1024 -> 2048
//! tail:   adaptive avg-pool 1x1 -> flatten -> head
//! ```
//!
//! Each [`BottleneckGroupConfig`] is lowered by [`build_group`], a pure
//! fold from the current channel count to the group's units.

use crate::errors::{NetworkError, NetworkResult};
use crate::layers::activation::ActivationConfig;
use crate::layers::dense::DenseHeadConfig;
use crate::layers::pipeline::PipelineConfig;
use crate::layers::stage::StageSpec;
use crate::models::classifier::{ClassifierConfig, ClassifierStructure};
use crate::models::resnet::bottleneck::{BOTTLENECK_EXPANSION, BottleneckConfig};
use burn::config::Config;
use burn::nn::conv::Conv2dConfig;
use burn::nn::pool::{AdaptiveAvgPool2dConfig, MaxPool2dConfig};
use burn::nn::{BatchNormConfig, DropoutConfig, LinearConfig};

/// Output channels of the stem.
pub const RESNET_STEM_CHANNELS: usize = 64;

/// A group of bottleneck units sharing one ``out_channels``.
///
/// Unit ``i`` uses ``strides[i]`` and ``paddings[i]``.
#[derive(Config, Debug)]
pub struct BottleneckGroupConfig {
    /// Per-unit main-path strides.
    pub strides: Vec<[usize; 3]>,

    /// Per-unit main-path paddings.
    pub paddings: Vec<[usize; 3]>,

    /// Inner width of each unit.
    pub out_channels: usize,
}

impl BottleneckGroupConfig {
    /// A group of ``num_blocks`` units where only the first uses
    /// ``first_strides``; every unit uses ``[0, 1, 0]`` padding.
    pub fn uniform(
        num_blocks: usize,
        first_strides: [usize; 3],
        out_channels: usize,
    ) -> Self {
        let strides = (0..num_blocks)
            .map(|b| if b == 0 { first_strides } else { [1, 1, 1] })
            .collect();
        Self::new(strides, vec![[0, 1, 0]; num_blocks], out_channels)
    }

    /// The number of units.
    pub fn len(&self) -> usize {
        self.strides.len()
    }

    /// Check if the group is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The output channels of the group.
    pub fn out_planes(&self) -> usize {
        self.out_channels * BOTTLENECK_EXPANSION
    }

    /// Check if the config is valid.
    pub fn try_validate(&self) -> NetworkResult<()> {
        if self.is_empty() {
            return Err(NetworkError::configuration(
                "",
                "a bottleneck group requires at least one unit",
            ));
        }
        if self.strides.len() != self.paddings.len() {
            return Err(NetworkError::configuration(
                "",
                format!(
                    "{} stride triples but {} padding triples",
                    self.strides.len(),
                    self.paddings.len()
                ),
            ));
        }
        Ok(())
    }
}

/// The ``3, 4, 6, 3`` `ResNet50` group layout.
pub fn resnet50_groups() -> Vec<BottleneckGroupConfig> {
    vec![
        BottleneckGroupConfig::uniform(3, [1, 1, 1], 64),
        BottleneckGroupConfig::uniform(4, [1, 2, 1], 128),
        BottleneckGroupConfig::uniform(6, [1, 2, 1], 256),
        BottleneckGroupConfig::uniform(3, [1, 2, 1], 512),
    ]
}

/// Lower one group, given the channels flowing into it.
///
/// Only the first unit projects its shortcut.
///
/// # Returns
///
/// ``(group.out_planes(), units)``
pub fn build_group(
    current_channels: usize,
    group: &BottleneckGroupConfig,
) -> (usize, Vec<BottleneckConfig>) {
    let out_planes = group.out_planes();
    let units = group
        .strides
        .iter()
        .zip(&group.paddings)
        .enumerate()
        .map(|(idx, (&strides, &paddings))| {
            let in_channels = if idx == 0 {
                current_channels
            } else {
                out_planes
            };
            BottleneckConfig::new(in_channels, group.out_channels)
                .with_strides(strides)
                .with_paddings(paddings)
                .with_first(idx == 0)
        })
        .collect();
    (out_planes, units)
}

/// Fold [`build_group`] across groups, starting from ``in_channels``.
///
/// # Returns
///
/// ``(out_channels, units per group)``
pub fn build_groups(
    in_channels: usize,
    groups: &[BottleneckGroupConfig],
) -> (usize, Vec<Vec<BottleneckConfig>>) {
    groups
        .iter()
        .fold((in_channels, Vec::new()), |(channels, mut built), group| {
            let (channels, units) = build_group(channels, group);
            built.push(units);
            (channels, built)
        })
}

/// [`ResNet50`](ClassifierStructure) Config.
#[derive(Config, Debug)]
pub struct ResNet50Config {
    /// Input channels.
    #[config(default = 1)]
    pub in_channels: usize,

    /// Declared input ``[height, width]``.
    #[config(default = "[128, 128]")]
    pub input_resolution: [usize; 2],

    /// Number of output classes.
    #[config(default = 20)]
    pub num_classes: usize,

    /// Head dropout probability.
    #[config(default = "0.5")]
    pub dropout: f64,

    /// Bottleneck groups.
    #[config(default = "resnet50_groups()")]
    pub groups: Vec<BottleneckGroupConfig>,
}

impl ClassifierStructure for ResNet50Config {
    fn name(&self) -> &'static str {
        "resnet50"
    }

    fn check_structure(&self) -> NetworkResult<()> {
        let (_, built) = build_groups(RESNET_STEM_CHANNELS, &self.groups);
        for (g, (group, units)) in self.groups.iter().zip(&built).enumerate() {
            group
                .try_validate()
                .map_err(|err| err.within(&format!("groups[{g}]")))?;
            for (b, unit) in units.iter().enumerate() {
                unit.try_validate()
                    .map_err(|err| err.within(&format!("groups[{g}].blocks[{b}]")))?;
            }
        }
        Ok(())
    }

    fn to_classifier(&self) -> ClassifierConfig {
        let stem = PipelineConfig::new(vec![
            Conv2dConfig::new([self.in_channels, RESNET_STEM_CHANNELS], [17, 17]).into(),
            BatchNormConfig::new(RESNET_STEM_CHANNELS).into(),
            MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).into(),
        ]);

        let (out_channels, built) = build_groups(RESNET_STEM_CHANNELS, &self.groups);

        let mut stages: Vec<StageSpec> = vec![stem.into()];
        stages.extend(
            built
                .iter()
                .flatten()
                .map(|unit| StageSpec::Residual(unit.to_residual())),
        );
        stages.push(
            PipelineConfig::new(vec![AdaptiveAvgPool2dConfig::new([1, 1]).into()]).into(),
        );

        let head = DenseHeadConfig::new(vec![
            DropoutConfig::new(self.dropout).into(),
            LinearConfig::new(out_channels, 1000).into(),
            ActivationConfig::Relu.into(),
            LinearConfig::new(1000, 256).into(),
            LinearConfig::new(256, self.num_classes).into(),
        ]);

        ClassifierConfig::new(self.in_channels, self.input_resolution, stages, head)
    }
}
