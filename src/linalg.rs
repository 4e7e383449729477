//! Moore-Penrose pseudo-inverse of complex square matrices.
//!
//! The filter matrices are stored as `ndarray` arrays; the decomposition itself is done with
//! `nalgebra`'s SVD.

use crate::error::{DelayFilterError, Result};
use nalgebra::{DMatrix, SVD};
use ndarray::Array2;
use num_complex::Complex64;

/// A pseudo-inverse together with the diagnostics of its decomposition.
///
/// # Fields
/// - `matrix`: The pseudo-inverse, same shape as the input.
/// - `rank`: Number of singular values above the cutoff.
/// - `dimension`: Size of the block that was decomposed.
/// - `condition`: Ratio of the largest to the smallest retained singular value.
#[derive(Debug, Clone)]
pub struct PseudoInverse {
    pub matrix: Array2<Complex64>,
    pub rank: usize,
    pub dimension: usize,
    pub condition: f64,
}

impl PseudoInverse {
    pub fn is_rank_deficient(&self) -> bool {
        self.rank < self.dimension
    }
}

/// Pseudo-inverse of the block of `matrix` spanned by the rows and columns in `keep`.
///
/// Rows and columns not listed in `keep` are treated as zero and stay zero in the result,
/// which is exactly the pseudo-inverse of a matrix whose excluded rows and columns are zero.
/// Singular values at or below `rcond * sigma_max` are discarded; without `rcond` the cutoff
/// is `nf * f64::EPSILON` where `nf` is the size of `matrix`, not of the decomposed block.
/// Non-finite entries in the block and an SVD that does not converge within `100 * n`
/// iterations are reported as [`DelayFilterError::PseudoInverse`].
pub fn masked_pseudo_inverse(
    matrix: &Array2<Complex64>,
    keep: &[usize],
    rcond: Option<f64>,
) -> Result<PseudoInverse> {
    let nf = matrix.nrows();
    let n = keep.len();
    let mut output = Array2::<Complex64>::zeros((nf, nf));
    if n == 0 {
        return Ok(PseudoInverse {
            matrix: output,
            rank: 0,
            dimension: 0,
            condition: 1.0,
        });
    }

    let block = DMatrix::from_fn(n, n, |r, c| matrix[[keep[r], keep[c]]]);
    if block.iter().any(|z| !z.re.is_finite() || !z.im.is_finite()) {
        return Err(DelayFilterError::PseudoInverse(
            "matrix has non-finite entries".into(),
        ));
    }
    let svd = SVD::try_new(block, true, true, f64::EPSILON, 100 * n).ok_or_else(|| {
        DelayFilterError::PseudoInverse("singular value decomposition did not converge".into())
    })?;

    let sigma_max = svd.singular_values.iter().cloned().fold(0.0, f64::max);
    let cutoff = rcond.unwrap_or(nf as f64 * f64::EPSILON) * sigma_max;
    let retained: Vec<f64> = svd
        .singular_values
        .iter()
        .cloned()
        .filter(|s| *s > cutoff)
        .collect();
    let rank = retained.len();
    let sigma_min = retained.iter().cloned().fold(f64::INFINITY, f64::min);
    let condition = if rank > 0 {
        sigma_max / sigma_min
    } else {
        f64::INFINITY
    };

    let inverse = svd
        .pseudo_inverse(cutoff)
        .map_err(|e| DelayFilterError::PseudoInverse(e.to_string()))?;

    for (r, &i) in keep.iter().enumerate() {
        for (c, &j) in keep.iter().enumerate() {
            output[[i, j]] = inverse[(r, c)];
        }
    }

    Ok(PseudoInverse {
        matrix: output,
        rank,
        dimension: n,
        condition,
    })
}
