//! Construction of the linear filter matrix that suppresses delay patches.
//!
//! The matrix is built in two steps. First an "inverse filter" is formed that is large for
//! signals inside the delay patches and close to one elsewhere, either from the closed form
//! of a rectangular delay window (continuous mode) or from a diagonal in the discrete delay
//! basis (discrete mode). Flagged channels are then zeroed and the result is pseudo-inverted,
//! which leaves a near-zero response inside the patches.

use crate::data::{flagged_indices, DelayPatch};
use crate::error::{DelayFilterError, Result};
use crate::linalg::masked_pseudo_inverse;
use crate::math_tools::{shifted_delay_bins, sinc};
use ndarray::{Array1, Array2, Axis, Zip};
use num_complex::Complex64;
use std::f64::consts::PI;

/// Square complex operator applied to a spectrum before the forward transform.
pub type FilterMatrix = Array2<Complex64>;

/// Inputs of a filter matrix build.
///
/// # Fields
/// - `nf`: Number of channels.
/// - `df`: Channel spacing. The matrix is built on the grid `(i - nf/2) * df`.
/// - `patches`: Delay windows to suppress.
/// - `filter_factor`: Suppression factor of the patches.
/// - `flags`: One entry per channel, `true` excludes the channel.
/// - `zero_flags`: Zero the rows and columns of flagged channels.
/// - `discrete`: Build from a diagonal in the discrete delay basis.
/// - `pinv_rcond`: Relative singular value cutoff of the pseudo-inverse.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterMatrixParams {
    pub nf: usize,
    pub df: f64,
    pub patches: Vec<DelayPatch>,
    pub filter_factor: f64,
    pub flags: Vec<bool>,
    pub zero_flags: bool,
    pub discrete: bool,
    pub pinv_rcond: Option<f64>,
}

impl FilterMatrixParams {
    /// Parameters for `nf` unflagged channels in continuous mode.
    pub fn new(nf: usize, df: f64, patches: Vec<DelayPatch>, filter_factor: f64) -> Self {
        FilterMatrixParams {
            nf,
            df,
            patches,
            filter_factor,
            flags: vec![false; nf],
            zero_flags: false,
            discrete: false,
            pinv_rcond: None,
        }
    }

    pub fn with_flags(mut self, flags: Vec<bool>, zero_flags: bool) -> Self {
        self.flags = flags;
        self.zero_flags = zero_flags;
        self
    }

    pub fn with_discrete(mut self, discrete: bool) -> Self {
        self.discrete = discrete;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.nf == 0 {
            return Err(DelayFilterError::EmptyFrequencyAxis);
        }
        if self.flags.len() != self.nf {
            return Err(DelayFilterError::LengthMismatch {
                what: "flags",
                expected: self.nf,
                actual: self.flags.len(),
            });
        }
        if self.df == 0.0 || !self.df.is_finite() {
            return Err(DelayFilterError::InvalidSpacing(self.df));
        }
        if let Some(patch) = self
            .patches
            .iter()
            .find(|p| !p.center.is_finite() || !p.width.is_finite())
        {
            return Err(DelayFilterError::NonFinitePatch {
                center: patch.center,
                width: patch.width,
            });
        }
        if self.discrete {
            if let Some(patch) = self.patches.iter().find(|p| !(p.width > 0.0)) {
                return Err(DelayFilterError::InvalidPatchWidth(patch.width));
            }
        }
        Ok(())
    }
}

/// Builds the filter matrix for `params`.
///
/// This always does the full computation; use [`crate::FilterMatrixCache`] to reuse
/// matrices across calls.
pub fn build_filter_matrix(params: &FilterMatrixParams) -> Result<FilterMatrix> {
    let inverse = inverse_filter(params)?;

    let keep: Vec<usize> = if params.zero_flags {
        (0..params.nf).filter(|&i| !params.flags[i]).collect()
    } else {
        (0..params.nf).collect()
    };
    let pinv = masked_pseudo_inverse(&inverse, &keep, params.pinv_rcond)?;

    log::debug!(
        "built {} filter matrix: nf = {}, {} patches, {} flagged, rank {}/{}, condition {:.3e}",
        if params.discrete { "discrete" } else { "continuous" },
        params.nf,
        params.patches.len(),
        params.nf - keep.len(),
        pinv.rank,
        pinv.dimension,
        pinv.condition
    );
    if pinv.is_rank_deficient() {
        log::warn!(
            "filter matrix is rank deficient (rank {} of {} unflagged channels, condition {:.3e}); \
             check that the delay patches fit inside the delay range of {:.3e}",
            pinv.rank,
            pinv.dimension,
            pinv.condition,
            0.5 / params.df.abs()
        );
    }

    Ok(pinv.matrix)
}

/// The matrix that is pseudo-inverted to obtain the filter, with flagged rows and columns
/// already zeroed when `zero_flags` is set.
pub fn inverse_filter(params: &FilterMatrixParams) -> Result<Array2<Complex64>> {
    params.validate()?;

    let mut inverse = if params.discrete {
        discrete_inverse_filter(params.nf, params.df, &params.patches, params.filter_factor)
    } else {
        continuous_inverse_filter(params.nf, params.df, &params.patches, params.filter_factor)
    };
    if params.zero_flags {
        zero_flagged(&mut inverse, &params.flags);
    }
    Ok(inverse)
}

/// `I + sum_p sinc(2 dF w_p) exp(-2 pi i dF c_p) / filter_factor` with `dF[i, j] = f_j - f_i`.
///
/// A patch centred on `+c` suppresses the tone `exp(2 pi i f c)`, which the forward FFT
/// places at delay `+c`. A filter factor that is not positive, NaN included, leaves the identity.
fn continuous_inverse_filter(
    nf: usize,
    df: f64,
    patches: &[DelayPatch],
    filter_factor: f64,
) -> Array2<Complex64> {
    let half = nf as f64 / 2.0;
    let freqs = Array1::from_shape_fn(nf, |i| (i as f64 - half) * df);
    let mut inverse = Array2::<Complex64>::eye(nf);
    if !(filter_factor > 0.0) {
        return inverse;
    }

    Zip::indexed(&mut inverse).par_for_each(|(i, j), value| {
        let delta = freqs[j] - freqs[i];
        for patch in patches {
            let envelope = sinc(2.0 * delta * patch.width) / filter_factor;
            *value += Complex64::from_polar(envelope, -2.0 * PI * delta * patch.center);
        }
    });
    inverse
}

/// `F diag(d) F^H` where `d` is `filter_factor` plus `1 / (2 w)` on every delay bin inside a
/// patch and `F[i, j] = exp(2 pi i a_i a_j / nf)` with `a = arange(-nf/2, nf/2)`.
fn discrete_inverse_filter(
    nf: usize,
    df: f64,
    patches: &[DelayPatch],
    filter_factor: f64,
) -> Array2<Complex64> {
    let delays = shifted_delay_bins(nf, df);
    let mut diagonal = Array1::from_elem(nf, Complex64::new(filter_factor, 0.0));
    for patch in patches {
        Zip::from(&mut diagonal).and(&delays).for_each(|d, &delay| {
            if (delay - patch.center).abs() <= patch.width {
                *d += 1.0 / (2.0 * patch.width);
            }
        });
    }

    let half = nf as f64 / 2.0;
    let mut ft = Array2::<Complex64>::zeros((nf, nf));
    Zip::indexed(&mut ft).par_for_each(|(i, j), value| {
        let (a, b) = (i as f64 - half, j as f64 - half);
        *value = Complex64::from_polar(1.0, 2.0 * PI * a * b / nf as f64);
    });

    let scaled = &ft * &diagonal.insert_axis(Axis(0));
    let ft_adjoint = ft.t().mapv(|z| z.conj());
    scaled.dot(&ft_adjoint)
}

/// Zeroes the rows and columns of all flagged channels.
pub(crate) fn zero_flagged(matrix: &mut Array2<Complex64>, flags: &[bool]) {
    for i in flagged_indices(flags) {
        matrix.row_mut(i).fill(Complex64::new(0.0, 0.0));
        matrix.column_mut(i).fill(Complex64::new(0.0, 0.0));
    }
}
