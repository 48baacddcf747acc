//! combine::validation — alignment checks for combiner inputs.
//!
//! Purpose
//! -------
//! Guard the combiner entry points before any partial estimate is built:
//! list lengths must agree, all partials must share one dimension, sample
//! counts must be positive integers, and the union must hold at least two
//! observations.
//!
//! Conventions
//! -----------
//! - Per-matrix checks (square, symmetric, mean length) live in
//!   [`crate::estimation::validation::validate_estimate`]; this module only
//!   checks properties of the collection.
use crate::estimation::{
    errors::{CovError, CovResult},
    partial::PartialCovariance,
    validation::MIN_SAMPLES,
};

/// Check that matrices, means, and counts line up one-to-one.
///
/// Errors
/// ------
/// - `CovError::ShapeMismatch` if there are no matrices, or if the number
///   of counts or mean vectors differs from the number of matrices.
pub fn validate_alignment(n_covs: usize, n_means: usize, n_counts: usize) -> CovResult<()> {
    if n_covs == 0 {
        return Err(CovError::ShapeMismatch { reason: "no partial estimates supplied", index: None });
    }
    if n_counts != n_covs {
        return Err(CovError::ShapeMismatch {
            reason: "number of sample counts does not match number of covariance matrices",
            index: None,
        });
    }
    if n_means != n_covs {
        return Err(CovError::ShapeMismatch {
            reason: "number of mean vectors does not match number of covariance matrices",
            index: None,
        });
    }
    Ok(())
}

/// Check that a list of dimensions is non-empty and constant, returning `p`.
///
/// Errors
/// ------
/// - `CovError::ShapeMismatch` if `dims` is empty.
/// - `CovError::DimensionMismatch { expected: dims[0], found, index }` for
///   the first partial with a different dimension.
pub fn validate_common_dim<I>(dims: I) -> CovResult<usize>
where
    I: IntoIterator<Item = usize>,
{
    let mut dims = dims.into_iter();
    let p = dims.next().ok_or(CovError::ShapeMismatch {
        reason: "no partial estimates supplied",
        index: None,
    })?;
    match dims.enumerate().find(|&(_, d)| d != p) {
        Some((pos, found)) => {
            Err(CovError::DimensionMismatch { expected: p, found, index: Some(pos + 1) })
        }
        None => Ok(p),
    }
}

/// Largest count accepted from `f64`; above 2^53 consecutive integers are
/// no longer representable.
pub const MAX_EXACT_COUNT: f64 = 9_007_199_254_740_992.0;

/// Check the union holds enough observations for a sample covariance.
///
/// Errors
/// ------
/// - `CovError::CountOverflow { index }` if adding count `index` overflows
///   `usize`.
/// - `CovError::InsufficientSamples` if `Σ n_k < 2`.
pub fn validate_total<I>(counts: I) -> CovResult<usize>
where
    I: IntoIterator<Item = usize>,
{
    let mut total = 0_usize;
    for (index, n) in counts.into_iter().enumerate() {
        total = total.checked_add(n).ok_or(CovError::CountOverflow { index })?;
    }
    if total < MIN_SAMPLES {
        return Err(CovError::InsufficientSamples { n: total, min: MIN_SAMPLES });
    }
    Ok(total)
}

/// Run collection-level checks on already-built partials.
///
/// Errors
/// ------
/// - See [`validate_common_dim`] and [`validate_total`].
pub fn validate_partials(parts: &[PartialCovariance]) -> CovResult<usize> {
    let p = validate_common_dim(parts.iter().map(PartialCovariance::dim))?;
    validate_total(parts.iter().map(PartialCovariance::count))?;
    Ok(p)
}

/// Convert a floating-point sample count to `usize`.
///
/// Errors
/// ------
/// - `CovError::InvalidSampleCount` if `value` is non-finite, below 1, has
///   a fractional part, or exceeds [`MAX_EXACT_COUNT`].
pub fn validate_sample_count(index: usize, value: f64) -> CovResult<usize> {
    if !value.is_finite() || !(1.0..=MAX_EXACT_COUNT).contains(&value) || value.fract() != 0.0 {
        return Err(CovError::InvalidSampleCount { index, value });
    }
    Ok(value as usize)
}
