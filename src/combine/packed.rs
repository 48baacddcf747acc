//! combine::packed — flat row encoding of partial estimates.
//!
//! Purpose
//! -------
//! Exchange partial covariance estimates as one dense matrix, which is the
//! form most convenient to ship between workers or store as a table: each
//! row holds one partition as `[mean (p) | covariance row-major (p²)]`, and
//! the sample counts travel alongside as floating-point values.
//!
//! Conventions
//! -----------
//! - A packed matrix has shape `k × (p + p²)`; `p` is recovered from the
//!   column count and must be at least 1.
//! - Counts are `f64` because they usually arrive from the same numeric
//!   table as the estimates; they must be finite positive integers.
//! - A partition with `n = 1` packs a zero covariance block, and its block
//!   is ignored on the way back in.
use crate::{
    combine::{
        merge::combine_partials,
        options::CombineOptions,
        validation::validate_sample_count,
    },
    estimation::{
        errors::{CovError, CovResult},
        partial::PartialCovariance,
        validation::{MIN_SAMPLES, validate_estimate},
    },
};
use ndarray::{Array1, Array2, ArrayBase, Data, Ix2, s};

/// Recover `p` from a packed column count `p + p²`.
///
/// Errors
/// ------
/// - `CovError::ShapeMismatch` if `ncols` is not of the form `p + p²` with
///   `p ≥ 1`.
pub fn packed_dim(ncols: usize) -> CovResult<usize> {
    let guess = ((1.0 + 4.0 * ncols as f64).sqrt() - 1.0) / 2.0;
    let base = guess.round() as usize;
    (base.saturating_sub(1)..=base + 1)
        .find(|&p| p >= 1 && p.checked_mul(p + 1) == Some(ncols))
        .ok_or(CovError::ShapeMismatch {
            reason: "packed column count is not of the form p + p^2",
            index: None,
        })
}

/// Encode partials as packed rows plus their counts.
///
/// Errors
/// ------
/// - `CovError::ShapeMismatch` if `parts` is empty.
/// - `CovError::DimensionMismatch` if the partials disagree on `p`.
pub fn pack_estimates(parts: &[PartialCovariance]) -> CovResult<(Array2<f64>, Vec<f64>)> {
    let first = parts.first().ok_or(CovError::ShapeMismatch {
        reason: "no partial estimates supplied",
        index: None,
    })?;
    let p = first.dim();
    let mut packed = Array2::<f64>::zeros((parts.len(), p + p * p));
    let mut ns = Vec::with_capacity(parts.len());

    for (index, part) in parts.iter().enumerate() {
        if part.dim() != p {
            return Err(CovError::DimensionMismatch {
                expected: p,
                found: part.dim(),
                index: Some(index),
            });
        }
        let mut row = packed.row_mut(index);
        row.slice_mut(s![..p]).assign(part.mean());
        if part.count() >= MIN_SAMPLES {
            let cov = part.covariance()?;
            for (dst, &src) in row.slice_mut(s![p..]).iter_mut().zip(cov.iter()) {
                *dst = src;
            }
        }
        ns.push(part.count() as f64);
    }
    Ok((packed, ns))
}

/// Decode packed rows into partial estimates.
///
/// Every row is validated (count, symmetry) before any partial is built.
///
/// Errors
/// ------
/// - `CovError::ShapeMismatch` if there are no rows, `ns.len()` differs from
///   the row count, or the column count is not `p + p²`.
/// - `CovError::InvalidSampleCount` for a count that is not a finite
///   positive integer no larger than 2^53.
/// - `CovError::NotSymmetric` if a covariance block fails the symmetry
///   check at `symmetry_tol`.
pub fn unpack_estimates<S>(
    mn_covs: &ArrayBase<S, Ix2>, ns: &[f64], symmetry_tol: f64,
) -> CovResult<Vec<PartialCovariance>>
where
    S: Data<Elem = f64>,
{
    if mn_covs.nrows() == 0 {
        return Err(CovError::ShapeMismatch { reason: "no partial estimates supplied", index: None });
    }
    if ns.len() != mn_covs.nrows() {
        return Err(CovError::ShapeMismatch {
            reason: "number of sample counts does not match number of packed rows",
            index: None,
        });
    }
    let p = packed_dim(mn_covs.ncols())?;

    let mut decoded = Vec::with_capacity(ns.len());
    for (index, (row, &n)) in mn_covs.rows().into_iter().zip(ns).enumerate() {
        let n = validate_sample_count(index, n)?;
        let mean: Array1<f64> = row.slice(s![..p]).to_owned();
        let cov = Array2::from_shape_fn((p, p), |(i, j)| row[p + i * p + j]);
        validate_estimate(index, n, &mean, &cov, symmetry_tol)?;
        decoded.push((n, mean, cov));
    }

    Ok(decoded
        .into_iter()
        .map(|(n, mean, cov)| PartialCovariance::from_validated_covariance(n, mean, cov))
        .collect())
}

/// Combine packed partition estimates into one covariance matrix.
///
/// Parameters
/// ----------
/// - `mn_covs`: `k × (p + p²)` matrix, one `[mean | covariance]` row per
///   partition.
/// - `ns`: length-`k` partition sample counts.
/// - `opts`: combiner settings.
///
/// Returns
/// -------
/// `CovResult<Array2<f64>>`
///   The `p×p` sample covariance of the union of all partitions.
///
/// Errors
/// ------
/// - See [`unpack_estimates`]; additionally
///   `CovError::InsufficientSamples` if `Σ n_k < 2`.
///
/// Examples
/// --------
/// ```rust
/// # use ndarray::array;
/// # use rust_covariance::combine::{options::CombineOptions, packed::combine_packed_estimates};
/// // p = 1: columns are [mean, var]
/// let packed = array![[5.0, 4.0], [9.0, 4.0]];
/// let s = combine_packed_estimates(&packed, &[3.0, 3.0], &CombineOptions::default()).unwrap();
/// assert!((s[[0, 0]] - 8.0).abs() < 1e-12);
/// ```
pub fn combine_packed_estimates<S>(
    mn_covs: &ArrayBase<S, Ix2>, ns: &[f64], opts: &CombineOptions,
) -> CovResult<Array2<f64>>
where
    S: Data<Elem = f64>,
{
    let parts = unpack_estimates(mn_covs, ns, opts.symmetry_tol)?;
    combine_partials(&parts, opts)?.covariance()
}
