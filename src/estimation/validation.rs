//! estimation::validation — eager input guards for the estimators.
//!
//! Purpose
//! -------
//! Centralize the shape, length, and sample-size checks that every
//! estimator performs before touching the data, so that failures are
//! reported the same way regardless of which routine was called.
//!
//! Key behaviors
//! -------------
//! - Reject paired series of unequal length and series shorter than the
//!   minimum sample size.
//! - Reject sample matrices with no columns or too few rows.
//! - Optionally reject non-finite values (see [`CovOptions`]).
//! - Check that a supplied partial estimate `(n, mean, cov)` is a square,
//!   symmetric `p×p` matrix with a length-`p` mean and a positive count.
//!
//! Invariants & assumptions
//! ------------------------
//! - All guards run before any arithmetic; a successful return means the
//!   estimator can proceed without further shape checks.
//! - Guards never allocate beyond what an error value needs.
//!
//! Testing notes
//! -------------
//! - Unit tests cover each error branch and the success path of every
//!   guard.
use crate::{
    estimation::{
        errors::{CovError, CovResult},
        options::CovOptions,
    },
    utils::approx_eq,
};
use ndarray::{Array1, Array2, ArrayBase, Data, Ix2};

/// Minimum number of observations for a sample (co)variance.
pub const MIN_SAMPLES: usize = 2;

/// Validate a pair of series for the pairwise covariance estimator.
///
/// Parameters
/// ----------
/// - `x1`, `x2`: `&[f64]`
///   Paired observations; must have equal length `n ≥ 2`.
/// - `opts`: `&CovOptions`
///   When `check_finite` is set, every value must be finite.
///
/// Errors
/// ------
/// - `CovError::DimensionMismatch`
///   `x1.len() != x2.len()`.
/// - `CovError::InsufficientSamples`
///   `n < 2`.
/// - `CovError::NonFiniteData`
///   A NaN/±∞ was found and `check_finite` is set. The index refers to the
///   position in the series (the first series is scanned first).
pub fn validate_paired(x1: &[f64], x2: &[f64], opts: &CovOptions) -> CovResult<()> {
    if x1.len() != x2.len() {
        return Err(CovError::DimensionMismatch { expected: x1.len(), found: x2.len(), index: None });
    }
    if x1.len() < MIN_SAMPLES {
        return Err(CovError::InsufficientSamples { n: x1.len(), min: MIN_SAMPLES });
    }
    if opts.check_finite {
        check_finite(x1.iter().copied())?;
        check_finite(x2.iter().copied())?;
    }
    Ok(())
}

/// Validate an `n×p` sample matrix.
///
/// Parameters
/// ----------
/// - `samples`: `n×p` matrix, rows are observations.
/// - `min_rows`: minimum accepted `n` (2 for a covariance, 1 for a partial
///   estimate).
/// - `opts`: finiteness policy.
///
/// Errors
/// ------
/// - `CovError::ShapeMismatch` if `p == 0`.
/// - `CovError::InsufficientSamples` if `n < min_rows`.
/// - `CovError::NonFiniteData` if `check_finite` is set and a value is not
///   finite; the index is the row-major flat position.
pub fn validate_samples<S>(
    samples: &ArrayBase<S, Ix2>, min_rows: usize, opts: &CovOptions,
) -> CovResult<()>
where
    S: Data<Elem = f64>,
{
    if samples.ncols() == 0 {
        return Err(CovError::ShapeMismatch { reason: "sample matrix has no columns", index: None });
    }
    if samples.nrows() < min_rows {
        return Err(CovError::InsufficientSamples { n: samples.nrows(), min: min_rows });
    }
    if opts.check_finite {
        check_finite(samples.iter().copied())?;
    }
    Ok(())
}

/// Validate that every row has exactly `p` entries.
///
/// Errors
/// ------
/// - `CovError::ShapeMismatch` if `p == 0`.
/// - `CovError::DimensionMismatch { expected: p, found, index: Some(row) }`
///   for the first ragged row.
pub fn validate_rows(rows: &[Vec<f64>], p: usize) -> CovResult<()> {
    if p == 0 {
        return Err(CovError::ShapeMismatch { reason: "declared zero columns", index: None });
    }
    match rows.iter().position(|row| row.len() != p) {
        Some(idx) => {
            Err(CovError::DimensionMismatch { expected: p, found: rows[idx].len(), index: Some(idx) })
        }
        None => Ok(()),
    }
}

/// Validate one partial estimate `(n, mean, cov)` before it is merged.
///
/// Parameters
/// ----------
/// - `index`: position of the estimate in the caller's list (reported in
///   errors).
/// - `n`: partition sample count; must be at least 1.
/// - `mean`: partition mean vector of length `p`.
/// - `cov`: partition covariance matrix, `p×p` and symmetric.
/// - `symmetry_tol`: relative tolerance for `cov[i, j]` vs `cov[j, i]`.
///
/// Errors
/// ------
/// - `CovError::InvalidSampleCount` if `n == 0`.
/// - `CovError::ShapeMismatch` if `cov` is empty or not square.
/// - `CovError::DimensionMismatch` if `mean.len() != p`.
/// - `CovError::NotSymmetric` for the first off-diagonal pair outside
///   tolerance (scanning the upper triangle row by row).
///
/// Notes
/// -----
/// - NaN entries are not reported as asymmetric; they propagate into the
///   combined result.
pub fn validate_estimate(
    index: usize, n: usize, mean: &Array1<f64>, cov: &Array2<f64>, symmetry_tol: f64,
) -> CovResult<()> {
    if n == 0 {
        return Err(CovError::InvalidSampleCount { index, value: 0.0 });
    }
    let (rows, cols) = cov.dim();
    if rows != cols {
        return Err(CovError::ShapeMismatch {
            reason: "covariance matrix is not square",
            index: Some(index),
        });
    }
    if rows == 0 {
        return Err(CovError::ShapeMismatch { reason: "covariance matrix is empty", index: Some(index) });
    }
    if mean.len() != rows {
        return Err(CovError::DimensionMismatch {
            expected: rows,
            found: mean.len(),
            index: Some(index),
        });
    }
    for row in 0..rows {
        for col in (row + 1)..cols {
            let value = cov[[row, col]];
            let mirror = cov[[col, row]];
            if !approx_eq(value, mirror, symmetry_tol) {
                return Err(CovError::NotSymmetric { index, row, col, value, mirror });
            }
        }
    }
    Ok(())
}

/// Return the first non-finite value as `CovError::NonFiniteData`.
pub fn check_finite<I>(values: I) -> CovResult<()>
where
    I: IntoIterator<Item = f64>,
{
    for (index, value) in values.into_iter().enumerate() {
        if !value.is_finite() {
            return Err(CovError::NonFiniteData { index, value });
        }
    }
    Ok(())
}
