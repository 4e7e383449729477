//! This module defines the data structures passed through the delay filter: delay patches,
//! the validated frequency axis and the filter output.

use crate::config::OutputDomain;
use crate::error::{DelayFilterError, Result};
use ndarray::{Array1, Array2};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// A window in delay space targeted for suppression.
///
/// # Fields
/// - `center`: Center of the window, in reciprocal frequency units.
/// - `width`: Half-width of the window. In discrete mode every delay bin with
///   `|delay - center| <= width` is suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelayPatch {
    pub center: f64,
    pub width: f64,
}

impl DelayPatch {
    pub fn new(center: f64, width: f64) -> Self {
        DelayPatch { center, width }
    }

    /// Builds a patch list from parallel sequences of centers and widths.
    pub fn from_lists(centers: &[f64], widths: &[f64]) -> Result<Vec<DelayPatch>> {
        if centers.len() != widths.len() {
            return Err(DelayFilterError::PatchListMismatch {
                centers: centers.len(),
                widths: widths.len(),
            });
        }
        Ok(centers
            .iter()
            .zip(widths.iter())
            .map(|(&center, &width)| DelayPatch::new(center, width))
            .collect())
    }
}

/// Returns the channel spacing `df = f[1] - f[0]` of a uniformly spaced frequency axis.
///
/// The filter matrix is built on the grid `(i - nf/2) * df` and only depends on channel
/// differences, so an offset axis is fine but every spacing has to match `df` within
/// `rtol`. Non-finite frequencies fail the check.
pub fn channel_spacing(frequencies: &Array1<f64>, rtol: f64) -> Result<f64> {
    let nf = frequencies.len();
    if nf == 0 {
        return Err(DelayFilterError::EmptyFrequencyAxis);
    }
    if nf < 2 {
        return Err(DelayFilterError::TooFewChannels(nf));
    }
    let df = frequencies[1] - frequencies[0];
    if df == 0.0 || !df.is_finite() {
        return Err(DelayFilterError::InvalidSpacing(df));
    }
    for (index, pair) in frequencies.windows(2).into_iter().enumerate() {
        let spacing = pair[1] - pair[0];
        if !((spacing - df).abs() <= rtol * df.abs()) {
            return Err(DelayFilterError::NonUniformAxis { index, spacing, df });
        }
    }
    Ok(df)
}

/// Indices of the flagged channels, in ascending order.
pub fn flagged_indices(flags: &[bool]) -> Vec<usize> {
    flags
        .iter()
        .enumerate()
        .filter_map(|(i, &flagged)| flagged.then_some(i))
        .collect()
}

pub(crate) fn check_length(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(DelayFilterError::LengthMismatch {
            what,
            expected,
            actual,
        })
    }
}

/// Result of a single delay filter run.
///
/// # Fields
/// - `axis`: Frequencies (frequency output) or delays (delay output).
/// - `values`: Filtered values on `axis`.
/// - `domain`: Which of the two the result is in.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutput {
    pub axis: Array1<f64>,
    pub values: Array1<Complex64>,
    pub domain: OutputDomain,
}

/// Result of filtering many spectra that share one frequency axis.
///
/// `values` holds one filtered spectrum per row of the input.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutput {
    pub axis: Array1<f64>,
    pub values: Array2<Complex64>,
    pub domain: OutputDomain,
}
