//! estimation::partial — per-partition covariance estimates.
//!
//! Purpose
//! -------
//! Represent the sufficient statistics of one data partition,
//! `(n, mean, M)` with `M = Σ (x − x̄)(x − x̄)ᵀ` the co-moment matrix, so
//! that partitions computed independently can later be merged into the
//! covariance of their union without revisiting raw data.
//!
//! Key behaviors
//! -------------
//! - [`PartialCovariance::from_samples`] runs the two-pass estimator on a
//!   partition and keeps the co-moment instead of dividing it.
//! - [`PartialCovariance::from_covariance`] accepts an externally computed
//!   `(n, mean, cov)` triple after validating its shape and symmetry.
//! - [`PartialCovariance::merge`] combines two partials (see
//!   [`crate::combine::merge`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - `n ≥ 1`, `mean.len() == p`, and `comoment` is an exactly symmetric
//!   `p×p` matrix with a non-negative diagonal for real data.
//! - A single-observation partition has a zero co-moment; its covariance
//!   is undefined but it still contributes its mean and count to a merge.
//!
//! Conventions
//! -----------
//! - Storing `M` rather than `cov` avoids re-scaling by `n − 1` at every
//!   merge step and keeps `n = 1` partitions representable.
use crate::{
    combine::merge::merge_pair,
    estimation::{
        errors::{CovError, CovResult},
        options::CovOptions,
        two_pass::{centered_comoment, column_means},
        validation::{MIN_SAMPLES, validate_estimate, validate_samples},
    },
};
use ndarray::{Array1, Array2, ArrayBase, Data, Ix2};

/// PartialCovariance — sufficient statistics `(n, mean, co-moment)` of one
/// partition.
///
/// Examples
/// --------
/// ```rust
/// # use ndarray::array;
/// # use rust_covariance::estimation::partial::PartialCovariance;
/// let a = PartialCovariance::from_samples(&array![[1.0], [3.0]]).unwrap();
/// let b = PartialCovariance::from_samples(&array![[5.0], [7.0]]).unwrap();
/// let ab = a.merge(&b).unwrap();
/// assert_eq!(ab.count(), 4);
/// assert!((ab.covariance().unwrap()[[0, 0]] - 20.0 / 3.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PartialCovariance {
    n: usize,
    mean: Array1<f64>,
    comoment: Array2<f64>,
}

impl PartialCovariance {
    /// Sufficient statistics of an `n×p` partition (`n ≥ 1`, `p ≥ 1`).
    ///
    /// Errors
    /// ------
    /// - `CovError::InsufficientSamples` if the partition has no rows.
    /// - `CovError::ShapeMismatch` if it has no columns.
    pub fn from_samples<S>(samples: &ArrayBase<S, Ix2>) -> CovResult<Self>
    where
        S: Data<Elem = f64>,
    {
        validate_samples(samples, 1, &CovOptions::default())?;
        let mean = column_means(samples)?;
        let comoment = centered_comoment(samples, &mean)?;
        Ok(Self { n: samples.nrows(), mean, comoment })
    }

    /// Partial estimate from a partition's count, mean, and sample
    /// covariance.
    ///
    /// Parameters
    /// ----------
    /// - `n`: partition sample count, `n ≥ 1`.
    /// - `mean`: length-`p` mean vector.
    /// - `cov`: `p×p` sample covariance (denominator `n − 1`). Ignored when
    ///   `n == 1`.
    /// - `symmetry_tol`: relative tolerance for the symmetry check.
    ///
    /// Errors
    /// ------
    /// - See [`validate_estimate`].
    pub fn from_covariance(
        n: usize, mean: Array1<f64>, cov: Array2<f64>, symmetry_tol: f64,
    ) -> CovResult<Self> {
        Self::from_covariance_at(0, n, mean, cov, symmetry_tol)
    }

    /// [`from_covariance`](Self::from_covariance) reporting `index` in errors.
    pub(crate) fn from_covariance_at(
        index: usize, n: usize, mean: Array1<f64>, cov: Array2<f64>, symmetry_tol: f64,
    ) -> CovResult<Self> {
        validate_estimate(index, n, &mean, &cov, symmetry_tol)?;
        Ok(Self::from_validated_covariance(n, mean, cov))
    }

    /// Build from a triple that already passed [`validate_estimate`].
    pub(crate) fn from_validated_covariance(n: usize, mean: Array1<f64>, cov: Array2<f64>) -> Self {
        let p = mean.len();
        let comoment = if n > 1 { symmetrize(cov * (n - 1) as f64) } else { Array2::zeros((p, p)) };
        Self { n, mean, comoment }
    }

    /// Assemble from already-consistent parts.
    pub(crate) fn from_moments(n: usize, mean: Array1<f64>, comoment: Array2<f64>) -> Self {
        Self { n, mean, comoment }
    }

    /// Merge with a partial computed on disjoint data.
    ///
    /// Errors
    /// ------
    /// - `CovError::DimensionMismatch` if the two partials differ in `p`.
    pub fn merge(&self, other: &PartialCovariance) -> CovResult<Self> {
        merge_pair(self, other)
    }

    /// Number of observations.
    pub fn count(&self) -> usize {
        self.n
    }

    /// Number of variables `p`.
    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    /// Mean vector.
    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    /// Co-moment matrix `Σ (x − x̄)(x − x̄)ᵀ`.
    pub fn comoment(&self) -> &Array2<f64> {
        &self.comoment
    }

    /// Sample covariance matrix `M / (n − 1)`.
    ///
    /// Errors
    /// ------
    /// - `CovError::InsufficientSamples` if `n < 2`.
    pub fn covariance(&self) -> CovResult<Array2<f64>> {
        if self.n < MIN_SAMPLES {
            return Err(CovError::InsufficientSamples { n: self.n, min: MIN_SAMPLES });
        }
        Ok(&self.comoment / (self.n - 1) as f64)
    }
}

// Copy the upper triangle onto the lower one so stored co-moments are
// exactly symmetric even when the input was only symmetric within tolerance.
fn symmetrize(mut m: Array2<f64>) -> Array2<f64> {
    let p = m.nrows();
    for i in 0..p {
        for j in (i + 1)..p {
            m[[j, i]] = m[[i, j]];
        }
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::two_pass::two_pass_multi_covar;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Construction from samples and from (n, mean, cov), including the
    //   single-observation case.
    // - Consistency of `covariance()` with the two-pass estimator.
    // - Symmetrization of inputs that are only symmetric within tolerance.
    //
    // They intentionally DO NOT cover:
    // - The merge algebra; see `combine::merge`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify `from_samples` keeps count, means, and a co-moment whose
    // scaled value equals the two-pass covariance.
    //
    // Given
    // -----
    // - A 4×2 matrix.
    //
    // Expect
    // ------
    // - `count = 4`, means equal column means, `covariance()` equals
    //   `two_pass_multi_covar`.
    fn from_samples_matches_two_pass() {
        // Arrange
        let x = array![[1.0, 10.0], [2.0, 7.0], [4.0, 8.0], [5.0, 3.0]];

        // Act
        let part = PartialCovariance::from_samples(&x).unwrap();
        let direct = two_pass_multi_covar(&x).unwrap();

        // Assert
        assert_eq!(part.count(), 4);
        assert_eq!(part.dim(), 2);
        assert_eq!(part.mean(), &array![3.0, 7.0]);
        assert_eq!(part.covariance().unwrap(), direct);
    }

    #[test]
    // Purpose
    // -------
    // Check the single-observation partition.
    //
    // Given
    // -----
    // - A 1×3 matrix, and the same row given as `(1, mean, NaN cov)`.
    //
    // Expect
    // ------
    // - Zero co-moment in both cases; `covariance()` is an error.
    fn single_observation_partition_has_zero_comoment() {
        // Arrange
        let x = array![[1.0, 2.0, 3.0]];
        let nan_cov = Array2::from_elem((3, 3), f64::NAN);

        // Act
        let from_rows = PartialCovariance::from_samples(&x).unwrap();
        let from_cov =
            PartialCovariance::from_covariance(1, array![1.0, 2.0, 3.0], nan_cov, 1e-9).unwrap();

        // Assert
        assert_eq!(from_rows.comoment(), &Array2::<f64>::zeros((3, 3)));
        assert_eq!(from_rows, from_cov);
        assert_eq!(from_rows.covariance(), Err(CovError::InsufficientSamples { n: 1, min: 2 }));
    }

    #[test]
    // Purpose
    // -------
    // Ensure `from_covariance` scales by `n − 1` and stores an exactly
    // symmetric co-moment.
    //
    // Given
    // -----
    // - `n = 3` and a covariance symmetric only to 1e-12.
    //
    // Expect
    // ------
    // - `M = 2 · cov` with the lower triangle copied from the upper one.
    fn from_covariance_scales_and_symmetrizes() {
        // Arrange
        let cov = array![[4.0, 1.0], [1.0 + 1e-12, 9.0]];

        // Act
        let part = PartialCovariance::from_covariance(3, array![0.0, 1.0], cov, 1e-9).unwrap();

        // Assert
        let m = part.comoment();
        assert_eq!(m[[0, 1]], m[[1, 0]]);
        assert_relative_eq!(m[[0, 0]], 8.0);
        assert_relative_eq!(m[[0, 1]], 2.0);
        assert_relative_eq!(part.covariance().unwrap()[[1, 1]], 9.0);
    }

    #[test]
    // Purpose
    // -------
    // Check that invalid triples are rejected.
    //
    // Given
    // -----
    // - Zero count; mismatched mean length; empty samples.
    //
    // Expect
    // ------
    // - `InvalidSampleCount`, `DimensionMismatch`, `InsufficientSamples`.
    fn invalid_inputs_are_rejected() {
        // Arrange
        let cov = array![[1.0, 0.0], [0.0, 1.0]];

        // Act / Assert
        assert!(matches!(
            PartialCovariance::from_covariance(0, array![0.0, 0.0], cov.clone(), 1e-9),
            Err(CovError::InvalidSampleCount { index: 0, .. })
        ));
        assert!(matches!(
            PartialCovariance::from_covariance(5, array![0.0], cov, 1e-9),
            Err(CovError::DimensionMismatch { expected: 2, found: 1, .. })
        ));
        assert_eq!(
            PartialCovariance::from_samples(&Array2::<f64>::zeros((0, 2))),
            Err(CovError::InsufficientSamples { n: 0, min: 1 })
        );
    }
}
