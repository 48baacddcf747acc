//! estimation::two_pass — two-pass covariance matrix of many variables.
//!
//! Purpose
//! -------
//! Build the `p×p` sample covariance matrix of an `n×p` sample matrix
//! (rows = observations, columns = variables) with the classic two-pass
//! scheme:
//!
//! ```text
//! pass 1:  m_j    = (1/n) Σ_r X[r, j]
//! pass 2:  S[i,j] = Σ_r (X[r,i] − m_i)(X[r,j] − m_j) / (n − 1),   i ≤ j
//! ```
//!
//! Centering before forming products keeps the result accurate for columns
//! with large or shifted values, at the cost of a second traversal.
//!
//! Key behaviors
//! -------------
//! - [`two_pass_multi_covar`] returns the sample covariance matrix.
//! - [`column_means`] and [`centered_comoment`] expose the two passes
//!   separately; partial estimates and the chunked accumulator reuse them.
//! - [`sample_matrix_from_rows`] turns row vectors into a sample matrix
//!   while rejecting ragged rows against a declared `p`.
//!
//! Invariants & assumptions
//! ------------------------
//! - The result is exactly symmetric: each unordered pair `(i, j)` is
//!   computed once and mirrored.
//! - `S[j, j]` is the sample variance of column `j`.
//! - Requires `n ≥ 2` and `p ≥ 1`; validation happens before any pass.
//!
//! Testing notes
//! -------------
//! - Unit tests compare against per-column reference variances and
//!   covariances, check exact symmetry, large-offset stability, and the
//!   ragged-row path of [`sample_matrix_from_rows`].
use crate::estimation::{
    errors::{CovError, CovResult},
    options::CovOptions,
    validation::{MIN_SAMPLES, validate_rows, validate_samples},
};
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix2};

/// Sample covariance matrix via two passes over the data.
///
/// Parameters
/// ----------
/// - `samples`: `n×p` matrix (owned array or view), `n ≥ 2`, `p ≥ 1`.
///
/// Returns
/// -------
/// `CovResult<Array2<f64>>`
///   Symmetric `p×p` matrix with `S[i, j]` the sample covariance of
///   columns `i` and `j`.
///
/// Errors
/// ------
/// - `CovError::InsufficientSamples` if `n < 2`.
/// - `CovError::ShapeMismatch` if `p == 0`.
///
/// Examples
/// --------
/// ```rust
/// # use ndarray::array;
/// # use rust_covariance::estimation::two_pass::two_pass_multi_covar;
/// let x = array![[1.0, 2.0], [2.0, 4.0], [3.0, 6.0], [4.0, 8.0]];
/// let s = two_pass_multi_covar(&x).unwrap();
/// assert!((s[[0, 1]] - 10.0 / 3.0).abs() < 1e-12);
/// assert_eq!(s[[0, 1]], s[[1, 0]]);
/// ```
pub fn two_pass_multi_covar<S>(samples: &ArrayBase<S, Ix2>) -> CovResult<Array2<f64>>
where
    S: Data<Elem = f64>,
{
    two_pass_multi_covar_with(samples, &CovOptions::default())
}

/// [`two_pass_multi_covar`] with explicit [`CovOptions`].
///
/// Errors
/// ------
/// - As [`two_pass_multi_covar`], plus `CovError::NonFiniteData` when
///   `opts.check_finite` is set.
pub fn two_pass_multi_covar_with<S>(
    samples: &ArrayBase<S, Ix2>, opts: &CovOptions,
) -> CovResult<Array2<f64>>
where
    S: Data<Elem = f64>,
{
    validate_samples(samples, MIN_SAMPLES, opts)?;
    let n = samples.nrows();

    let means = column_means(samples)?;
    let mut cov = centered_comoment(samples, &means)?;
    cov /= (n - 1) as f64;

    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        slog::info!(crate::utils::logger(), "two-pass covariance";
            "n" => n, "p" => samples.ncols());
    }

    Ok(cov)
}

/// Pass 1: column means of an `n×p` matrix.
///
/// Errors
/// ------
/// - `CovError::InsufficientSamples { n: 0, min: 1 }` if the matrix has no
///   rows.
pub fn column_means<S>(samples: &ArrayBase<S, Ix2>) -> CovResult<Array1<f64>>
where
    S: Data<Elem = f64>,
{
    samples.mean_axis(Axis(0)).ok_or(CovError::InsufficientSamples { n: 0, min: 1 })
}

/// Pass 2: centered cross-product (co-moment) matrix.
///
/// Returns `M[i, j] = Σ_r (X[r,i] − m_i)(X[r,j] − m_j)`, computed for
/// `i ≤ j` and mirrored. Dividing by `n − 1` yields the sample covariance.
///
/// Errors
/// ------
/// - `CovError::DimensionMismatch { expected: p, found: means.len() }` if
///   the mean vector does not have one entry per column.
pub fn centered_comoment<S>(
    samples: &ArrayBase<S, Ix2>, means: &Array1<f64>,
) -> CovResult<Array2<f64>>
where
    S: Data<Elem = f64>,
{
    let p = samples.ncols();
    if means.len() != p {
        return Err(CovError::DimensionMismatch { expected: p, found: means.len(), index: None });
    }
    let centered = samples - means;
    let mut comoment = Array2::<f64>::zeros((p, p));
    for i in 0..p {
        let col_i = centered.column(i);
        for j in i..p {
            let value = col_i.dot(&centered.column(j));
            comoment[[i, j]] = value;
            comoment[[j, i]] = value;
        }
    }
    Ok(comoment)
}

/// Build an `n×p` sample matrix from row vectors, checking every row
/// against the declared `p`.
///
/// Errors
/// ------
/// - `CovError::ShapeMismatch` if `p == 0`.
/// - `CovError::DimensionMismatch { expected: p, found, index: Some(row) }`
///   for the first row whose length differs from `p`.
///
/// Examples
/// --------
/// ```rust
/// # use rust_covariance::estimation::two_pass::sample_matrix_from_rows;
/// let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
/// let x = sample_matrix_from_rows(&rows, 2).unwrap();
/// assert_eq!(x.dim(), (2, 2));
/// assert!(sample_matrix_from_rows(&[vec![1.0], vec![1.0, 2.0]], 1).is_err());
/// ```
pub fn sample_matrix_from_rows(rows: &[Vec<f64>], p: usize) -> CovResult<Array2<f64>> {
    validate_rows(rows, p)?;
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((rows.len(), p), flat).map_err(|e| CovError::Anyhow(e.to_string()))
}
