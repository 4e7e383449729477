//! This module provides the tapering windows applied before the delay transform, the
//! `WindowGenerator` capability the pipeline resolves window names through, and small helpers
//! for the delay domain (normalized sinc, FFT shift and delay axes).
//!
//! All windows are periodic (DFT-even): a window of length `n` is the symmetric window of
//! length `n + 1` without its last sample, the convention of `scipy.signal.get_window`.

use crate::error::{DelayFilterError, Result};
use ndarray::Array1;
use std::f64::consts::PI;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Enum representing the tapering windows supported by [`NamedWindows`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TaperWindow {
    /// Rectangular window, all ones
    Boxcar,
    /// Triangular window without zero end points
    Triangle,
    /// Triangular window with zero end points
    Bartlett,
    /// Hann window
    Hann,
    /// Hamming window
    Hamming,
    /// Original Blackman window
    Blackman,
    /// Minimum 4-term Blackman-Harris window
    BlackmanHarris,
    /// Nuttall window
    Nuttall,
    /// FlatTop
    FlatTop,
    /// Sine window
    Cosine,
}

impl Display for TaperWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TaperWindow::Boxcar => write!(f, "boxcar"),
            TaperWindow::Triangle => write!(f, "triang"),
            TaperWindow::Bartlett => write!(f, "bartlett"),
            TaperWindow::Hann => write!(f, "hann"),
            TaperWindow::Hamming => write!(f, "hamming"),
            TaperWindow::Blackman => write!(f, "blackman"),
            TaperWindow::BlackmanHarris => write!(f, "blackmanharris"),
            TaperWindow::Nuttall => write!(f, "nuttall"),
            TaperWindow::FlatTop => write!(f, "flattop"),
            TaperWindow::Cosine => write!(f, "cosine"),
        }
    }
}

impl FromStr for TaperWindow {
    type Err = DelayFilterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "boxcar" | "box" | "ones" | "rect" | "rectangular" => Ok(TaperWindow::Boxcar),
            "triang" | "triangle" | "tri" => Ok(TaperWindow::Triangle),
            "bartlett" | "bart" | "brt" => Ok(TaperWindow::Bartlett),
            "hann" | "han" | "hanning" => Ok(TaperWindow::Hann),
            "hamming" | "hamm" | "ham" => Ok(TaperWindow::Hamming),
            "blackman" | "black" | "blk" => Ok(TaperWindow::Blackman),
            "blackmanharris" | "blackharr" | "bkh" => Ok(TaperWindow::BlackmanHarris),
            "nuttall" | "nutl" | "nut" => Ok(TaperWindow::Nuttall),
            "flattop" | "flat" | "flt" => Ok(TaperWindow::FlatTop),
            "cosine" | "halfcosine" => Ok(TaperWindow::Cosine),
            _ => Err(DelayFilterError::UnknownWindow(s.to_string())),
        }
    }
}

impl TaperWindow {
    /// Computes the periodic window of length `n`.
    pub fn generate(&self, n: usize) -> Array1<f64> {
        if n == 0 {
            return Array1::zeros(0);
        }
        // symmetric window of length m = n + 1, last sample dropped
        let m = n + 1;
        match self {
            TaperWindow::Boxcar => Array1::ones(n),
            TaperWindow::Triangle => {
                let mut w = triangle(m);
                w.truncate(n);
                Array1::from(w)
            }
            TaperWindow::Bartlett => {
                let half = (m - 1) as f64 / 2.0;
                Array1::from_shape_fn(n, |k| 1.0 - (k as f64 - half).abs() / half)
            }
            TaperWindow::Hann => general_cosine(n, &[0.5, 0.5]),
            TaperWindow::Hamming => general_cosine(n, &[0.54, 0.46]),
            TaperWindow::Blackman => general_cosine(n, &[0.42, 0.5, 0.08]),
            TaperWindow::BlackmanHarris => {
                general_cosine(n, &[0.35875, 0.48829, 0.14128, 0.01168])
            }
            TaperWindow::Nuttall => general_cosine(n, &[0.3635819, 0.4891775, 0.1365995, 0.0106411]),
            TaperWindow::FlatTop => general_cosine(
                n,
                &[
                    0.21557895,
                    0.41663158,
                    0.277263158,
                    0.083578947,
                    0.006947368,
                ],
            ),
            TaperWindow::Cosine => {
                Array1::from_shape_fn(n, |k| (PI * (k as f64 + 0.5) / m as f64).sin())
            }
        }
    }
}

/// Weighted sum of cosine terms with alternating signs, evaluated on the periodic grid
/// `2 pi k / n`.
fn general_cosine(n: usize, coefficients: &[f64]) -> Array1<f64> {
    Array1::from_shape_fn(n, |k| {
        let phase = 2.0 * PI * k as f64 / n as f64;
        coefficients
            .iter()
            .enumerate()
            .map(|(j, a)| {
                let sign = if j % 2 == 0 { 1.0 } else { -1.0 };
                sign * a * (j as f64 * phase).cos()
            })
            .sum()
    })
}

/// Symmetric triangular window of length `m` with non-zero end points.
fn triangle(m: usize) -> Vec<f64> {
    let half: Vec<f64> = (1..=(m + 1) / 2)
        .map(|k| {
            if m % 2 == 0 {
                (2 * k - 1) as f64 / m as f64
            } else {
                2.0 * k as f64 / (m + 1) as f64
            }
        })
        .collect();
    let mut w = half.clone();
    if m % 2 == 0 {
        w.extend(half.iter().rev());
    } else {
        w.extend(half.iter().rev().skip(1));
    }
    w
}

/// Maps a window name and a length to a real-valued tapering window.
///
/// This is the only collaborator the pipeline depends on for tapering. [`NamedWindows`]
/// covers the common windows; any closure `Fn(&str, usize) -> Result<Array1<f64>>` can be
/// injected instead.
pub trait WindowGenerator: Send + Sync {
    fn generate(&self, name: &str, len: usize) -> Result<Array1<f64>>;
}

/// Default window generator backed by [`TaperWindow`].
#[derive(Debug, Default, Clone, Copy)]
pub struct NamedWindows;

impl WindowGenerator for NamedWindows {
    fn generate(&self, name: &str, len: usize) -> Result<Array1<f64>> {
        Ok(name.parse::<TaperWindow>()?.generate(len))
    }
}

impl<F> WindowGenerator for F
where
    F: Fn(&str, usize) -> Result<Array1<f64>> + Send + Sync,
{
    fn generate(&self, name: &str, len: usize) -> Result<Array1<f64>> {
        self(name, len)
    }
}

/// Scales a taper in place so that the mean of its squared values is one.
pub fn normalize_power(taper: &mut Array1<f64>, name: &str) -> Result<()> {
    let mean_square = taper.mapv(|t| t * t).mean().unwrap_or(0.0);
    if mean_square <= 0.0 || !mean_square.is_finite() {
        return Err(DelayFilterError::DegenerateTaper(name.to_string()));
    }
    let norm = mean_square.sqrt();
    taper.mapv_inplace(|t| t / norm);
    Ok(())
}

/// Normalized sinc, `sin(pi x) / (pi x)` with `sinc(0) = 1`.
pub fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        let px = PI * x;
        px.sin() / px
    }
}

/// Moves the zero-frequency bin to the center of the sequence, like `numpy.fft.fftshift`.
pub fn fft_shift<T: Clone>(values: &Array1<T>) -> Array1<T> {
    let mut shifted = values.to_vec();
    shifted.rotate_right(values.len() / 2);
    Array1::from(shifted)
}

/// Delay bins of the discrete transform in ascending order, `fftshift(fftfreq(nf, df))`.
pub fn shifted_delay_bins(nf: usize, df: f64) -> Array1<f64> {
    let scale = 1.0 / (nf as f64 * df);
    let first = -((nf / 2) as f64);
    Array1::from_shape_fn(nf, |k| (first + k as f64) * scale)
}

/// Delay axis of the pipeline output, `arange(-nf/2, nf/2) / (df * nf)`.
///
/// For odd `nf` the samples sit half a bin off the integer delay bins produced by
/// [`fft_shift`].
pub fn delay_axis(nf: usize, df: f64) -> Array1<f64> {
    let scale = 1.0 / (nf as f64 * df);
    let half = nf as f64 / 2.0;
    Array1::from_shape_fn(nf, |k| (k as f64 - half) * scale)
}
