//! combine::grouped — per-group partial estimates from labelled rows.
//!
//! Purpose
//! -------
//! Split a sample matrix by an integer label per row (batch, plate, shard)
//! and compute one [`PartialCovariance`] per label. The partials can be
//! inspected individually or combined into the covariance of the full
//! matrix, which is the same result a direct two-pass computation gives.
//!
//! Key behaviors
//! -------------
//! - [`partials_by_group`] returns the partials keyed by label in ascending
//!   order.
//! - [`grouped_covariance`] combines them with [`combine_partials`].
//! - With the `parallel` feature, groups are reduced on the rayon thread
//!   pool; results are identical because each group is computed
//!   independently and the map is ordered by label.
use crate::{
    combine::{merge::combine_partials, options::CombineOptions},
    estimation::{
        errors::{CovError, CovResult},
        options::CovOptions,
        partial::PartialCovariance,
        validation::validate_samples,
    },
};
use ndarray::{Array2, ArrayBase, ArrayView2, Axis, Data, Ix2};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Per-label partial estimates.
///
/// Parameters
/// ----------
/// - `samples`: `n×p` matrix, rows are samples.
/// - `labels`: length-`n` group label for each row.
///
/// Errors
/// ------
/// - `CovError::DimensionMismatch` if `labels.len() != n`.
/// - `CovError::InsufficientSamples` if the matrix has no rows.
/// - `CovError::ShapeMismatch` if it has no columns.
pub fn partials_by_group<S>(
    samples: &ArrayBase<S, Ix2>, labels: &[usize],
) -> CovResult<BTreeMap<usize, PartialCovariance>>
where
    S: Data<Elem = f64>,
{
    if labels.len() != samples.nrows() {
        return Err(CovError::DimensionMismatch {
            expected: samples.nrows(),
            found: labels.len(),
            index: None,
        });
    }
    validate_samples(samples, 1, &CovOptions::default())?;

    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (row, &label) in labels.iter().enumerate() {
        groups.entry(label).or_default().push(row);
    }

    reduce_groups(samples.view(), groups)
}

/// Covariance of the full matrix assembled from per-label partials.
///
/// Errors
/// ------
/// - As [`partials_by_group`], plus `CovError::InsufficientSamples` if the
///   matrix has fewer than 2 rows.
///
/// Examples
/// --------
/// ```rust
/// # use ndarray::array;
/// # use rust_covariance::combine::{grouped::grouped_covariance, options::CombineOptions};
/// let x = array![[1.0], [2.0], [3.0], [4.0]];
/// let s = grouped_covariance(&x, &[0, 1, 0, 1], &CombineOptions::default()).unwrap();
/// assert!((s[[0, 0]] - 5.0 / 3.0).abs() < 1e-12);
/// ```
pub fn grouped_covariance<S>(
    samples: &ArrayBase<S, Ix2>, labels: &[usize], opts: &CombineOptions,
) -> CovResult<Array2<f64>>
where
    S: Data<Elem = f64>,
{
    let parts: Vec<PartialCovariance> = partials_by_group(samples, labels)?.into_values().collect();
    combine_partials(&parts, opts)?.covariance()
}

#[cfg(not(feature = "parallel"))]
fn reduce_groups(
    samples: ArrayView2<'_, f64>, groups: BTreeMap<usize, Vec<usize>>,
) -> CovResult<BTreeMap<usize, PartialCovariance>> {
    groups
        .into_iter()
        .map(|(label, rows)| {
            let part = PartialCovariance::from_samples(&samples.select(Axis(0), &rows))?;
            Ok((label, part))
        })
        .collect()
}

#[cfg(feature = "parallel")]
fn reduce_groups(
    samples: ArrayView2<'_, f64>, groups: BTreeMap<usize, Vec<usize>>,
) -> CovResult<BTreeMap<usize, PartialCovariance>> {
    groups
        .into_par_iter()
        .map(|(label, rows)| {
            let part = PartialCovariance::from_samples(&samples.select(Axis(0), &rows))?;
            Ok((label, part))
        })
        .collect()
}
