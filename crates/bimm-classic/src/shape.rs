//! # Symbolic Shape Inference
//!
//! [`FeatureShape`] tracks the ``[channels, height, width]`` of an image-stage
//! tensor (the batch dimension is free), so that every network can be checked
//! at construction time without allocating a tensor.
//!
//! The window arithmetic follows the ``conv`` / ``pool`` output size rule:
//!
//! ```text
//! out_size = floor( ((in_size + 2*padding - dilation*(kernel_size-1) - 1) / stride) + 1 )
//! ```

use crate::errors::{NetworkError, NetworkResult};
use burn::nn::PaddingConfig2d;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The ``[channels, height, width]`` shape of a single image-stage sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureShape {
    /// Size of the channel axis.
    pub channels: usize,
    /// Spatial height.
    pub height: usize,
    /// Spatial width.
    pub width: usize,
}

impl FeatureShape {
    /// Create a new shape.
    pub fn new(
        channels: usize,
        height: usize,
        width: usize,
    ) -> Self {
        Self {
            channels,
            height,
            width,
        }
    }

    /// Build a shape from a channel count and a ``[height, width]`` resolution.
    pub fn from_resolution(
        channels: usize,
        resolution: [usize; 2],
    ) -> Self {
        Self::new(channels, resolution[0], resolution[1])
    }

    /// The ``[height, width]`` resolution.
    pub fn resolution(&self) -> [usize; 2] {
        [self.height, self.width]
    }

    /// Replace the channel count.
    pub fn with_channels(
        self,
        channels: usize,
    ) -> Self {
        Self { channels, ..self }
    }

    /// The number of features after flattening ``[channels, height, width]``.
    pub fn flat_features(&self) -> usize {
        self.channels * self.height * self.width
    }

    /// As ``[channels, height, width]``.
    pub fn dims(&self) -> [usize; 3] {
        [self.channels, self.height, self.width]
    }
}

impl fmt::Display for FeatureShape {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.channels, self.height, self.width)
    }
}

impl From<[usize; 3]> for FeatureShape {
    fn from(dims: [usize; 3]) -> Self {
        Self::new(dims[0], dims[1], dims[2])
    }
}

/// Predict the output size of a 1D sliding window (conv or pool).
///
/// # Arguments
///
/// - `input_size`: The input dimension size.
/// - `kernel_size`: The window size, must be > 0.
/// - `stride`: The window stride, must be > 0.
/// - `padding`: Padding added evenly to both sides of the input.
/// - `dilation`: The window dilation, must be > 0.
///
/// # Returns
///
/// `Some(size)`; or `None` when the window does not fit in the padded input.
pub fn maybe_window_output_size(
    input_size: usize,
    kernel_size: usize,
    stride: usize,
    padding: usize,
    dilation: usize,
) -> Option<usize> {
    if input_size == 0 || kernel_size == 0 || stride == 0 || dilation == 0 {
        return None;
    }
    let effective_size = input_size + 2 * padding;
    let kernel_width = 1 + dilation * (kernel_size - 1);
    if effective_size < kernel_width {
        return None;
    }
    Some((effective_size - kernel_width) / stride + 1)
}

/// Predict the output resolution of a 2D sliding window.
///
/// # Arguments
///
/// - `stage`: stage name, for errors.
/// - `input`: ``[height, width]``.
/// - `kernel_size`, `stride`, `dilation`: per-axis window parameters.
/// - `padding`: the burn padding policy.
///
/// # Returns
///
/// ``[out_height, out_width]``; or a [`NetworkError::Configuration`] when
/// the parameters are degenerate or the window does not fit.
pub fn window_output_resolution(
    stage: &str,
    input: [usize; 2],
    kernel_size: [usize; 2],
    stride: [usize; 2],
    padding: &PaddingConfig2d,
    dilation: [usize; 2],
) -> NetworkResult<[usize; 2]> {
    for (name, values) in [
        ("kernel_size", kernel_size),
        ("stride", stride),
        ("dilation", dilation),
    ] {
        if values.contains(&0) {
            return Err(NetworkError::configuration(
                stage,
                format!("{name} must be positive, got {values:?}"),
            ));
        }
    }

    let padding = match padding {
        PaddingConfig2d::Valid => [0, 0],
        PaddingConfig2d::Explicit(h, w) => [*h, *w],
        PaddingConfig2d::Same => {
            if stride != [1, 1] || kernel_size.iter().any(|k| k % 2 == 0) {
                return Err(NetworkError::configuration(
                    stage,
                    format!(
                        "same padding requires stride [1, 1] and odd kernels, got stride {stride:?} and kernel {kernel_size:?}"
                    ),
                ));
            }
            return Ok(input);
        }
    };

    let mut output = [0; 2];
    for axis in 0..2 {
        output[axis] = maybe_window_output_size(
            input[axis],
            kernel_size[axis],
            stride[axis],
            padding[axis],
            dilation[axis],
        )
        .ok_or_else(|| {
            NetworkError::configuration(
                stage,
                format!(
                    "window (kernel {kernel_size:?}, stride {stride:?}, padding {padding:?}, dilation {dilation:?}) does not fit input resolution {input:?}"
                ),
            )
        })?;
    }
    Ok(output)
}
