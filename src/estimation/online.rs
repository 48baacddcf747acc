//! estimation::online — single-pass covariance of two paired series.
//!
//! Purpose
//! -------
//! Compute the sample covariance of two equal-length series in one
//! streaming pass, without holding centered copies of the data. The
//! estimator keeps running means and a running co-moment
//!
//! ```text
//! C_k = Σ_{i ≤ k} (x_i − x̄_k)(y_i − ȳ_k)
//! ```
//!
//! updated per observation with Welford's scheme:
//!
//! ```text
//! dx   = x_k − x̄_{k−1}
//! x̄_k  = x̄_{k−1} + dx / k
//! ȳ_k  = ȳ_{k−1} + (y_k − ȳ_{k−1}) / k
//! C_k  = C_{k−1} + dx · (y_k − ȳ_k)
//! ```
//!
//! The sample covariance is `C_n / (n − 1)`.
//!
//! Key behaviors
//! -------------
//! - [`online_covar`] / [`online_covar_with`] compute the covariance of two
//!   slices after eager validation.
//! - [`OnlineCovariance`] exposes the accumulator itself so callers can feed
//!   observations as they arrive and merge accumulators built on disjoint
//!   chunks (Chan et al. pairwise update).
//!
//! Invariants & assumptions
//! ------------------------
//! - The co-moment update never forms `Σxy − n·x̄·ȳ`, so large common
//!   offsets in the data do not cause catastrophic cancellation.
//! - A series with fewer than 2 observations is an error, not NaN.
//! - NaN/±∞ inputs propagate into the result unless
//!   [`CovOptions::check_finite`] is set.
//!
//! Testing notes
//! -------------
//! - Unit tests check the worked example `[1,2,3,4]` vs `[2,4,6,8]`,
//!   symmetry, agreement with the variance for `cov(x, x)`, stability
//!   under a 1e9 offset, and that merging chunk accumulators equals a
//!   single pass.
use crate::estimation::{
    errors::{CovError, CovResult},
    options::CovOptions,
    validation::{MIN_SAMPLES, validate_paired},
};

/// OnlineCovariance — streaming co-moment accumulator for two variables.
///
/// Fields
/// ------
/// - `n`: number of pairs seen.
/// - `mean_x`, `mean_y`: running means.
/// - `comoment`: running `Σ (x − x̄)(y − ȳ)`.
///
/// Invariants
/// ----------
/// - With `n == 0` all fields are zero.
/// - `comoment` equals `(n − 1)` times the sample covariance of the
///   observations pushed so far.
///
/// Examples
/// --------
/// ```rust
/// # use rust_covariance::estimation::online::OnlineCovariance;
/// let mut acc = OnlineCovariance::new();
/// for (x, y) in [(1.0, 2.0), (2.0, 4.0), (3.0, 6.0), (4.0, 8.0)] {
///     acc.push(x, y);
/// }
/// assert!((acc.covariance().unwrap() - 10.0 / 3.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OnlineCovariance {
    n: usize,
    mean_x: f64,
    mean_y: f64,
    comoment: f64,
}

impl OnlineCovariance {
    /// Empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one paired observation.
    pub fn push(&mut self, x: f64, y: f64) {
        self.n += 1;
        let k = self.n as f64;
        let dx = x - self.mean_x;
        self.mean_x += dx / k;
        self.mean_y += (y - self.mean_y) / k;
        self.comoment += dx * (y - self.mean_y);
    }

    /// Feed two paired slices.
    ///
    /// Errors
    /// ------
    /// - `CovError::DimensionMismatch` if the slices differ in length. The
    ///   accumulator is left untouched in that case.
    pub fn extend(&mut self, x1: &[f64], x2: &[f64]) -> CovResult<()> {
        if x1.len() != x2.len() {
            return Err(CovError::DimensionMismatch {
                expected: x1.len(),
                found: x2.len(),
                index: None,
            });
        }
        for (&x, &y) in x1.iter().zip(x2) {
            self.push(x, y);
        }
        Ok(())
    }

    /// Fold another accumulator built on disjoint data into this one.
    ///
    /// Notes
    /// -----
    /// - Uses the pairwise update
    ///   `C = C_a + C_b + (x̄_b − x̄_a)(ȳ_b − ȳ_a) · n_a n_b / n`.
    /// - Merging an empty accumulator on either side is exact.
    pub fn merge(&mut self, other: &OnlineCovariance) {
        if other.n == 0 {
            return;
        }
        if self.n == 0 {
            *self = *other;
            return;
        }
        let na = self.n as f64;
        let nb = other.n as f64;
        let n = na + nb;
        let dx = other.mean_x - self.mean_x;
        let dy = other.mean_y - self.mean_y;

        self.comoment += other.comoment + dx * dy * na * nb / n;
        self.mean_x += dx * nb / n;
        self.mean_y += dy * nb / n;
        self.n += other.n;
    }

    /// Number of pairs seen.
    pub fn count(&self) -> usize {
        self.n
    }

    /// Running mean of the first variable.
    pub fn mean_x(&self) -> f64 {
        self.mean_x
    }

    /// Running mean of the second variable.
    pub fn mean_y(&self) -> f64 {
        self.mean_y
    }

    /// Running co-moment `Σ (x − x̄)(y − ȳ)`.
    pub fn comoment(&self) -> f64 {
        self.comoment
    }

    /// Sample covariance (denominator `n − 1`).
    ///
    /// Errors
    /// ------
    /// - `CovError::InsufficientSamples` if fewer than 2 pairs were seen.
    pub fn covariance(&self) -> CovResult<f64> {
        if self.n < MIN_SAMPLES {
            return Err(CovError::InsufficientSamples { n: self.n, min: MIN_SAMPLES });
        }
        Ok(self.comoment / (self.n - 1) as f64)
    }

    /// Population covariance (denominator `n`).
    ///
    /// Errors
    /// ------
    /// - `CovError::InsufficientSamples` if no pairs were seen.
    pub fn population_covariance(&self) -> CovResult<f64> {
        if self.n == 0 {
            return Err(CovError::InsufficientSamples { n: 0, min: 1 });
        }
        Ok(self.comoment / self.n as f64)
    }
}

/// Sample covariance of two paired series in a single streaming pass.
///
/// Parameters
/// ----------
/// - `x1`: `&[f64]`
///   First series, length `n ≥ 2`.
/// - `x2`: `&[f64]`
///   Second series, same length as `x1`.
///
/// Returns
/// -------
/// `CovResult<f64>`
///   `Σ(x1 − x̄1)(x2 − x̄2) / (n − 1)`.
///
/// Errors
/// ------
/// - `CovError::DimensionMismatch` if the lengths differ.
/// - `CovError::InsufficientSamples` if `n < 2`.
///
/// Examples
/// --------
/// ```rust
/// # use rust_covariance::estimation::online::online_covar;
/// let cov = online_covar(&[1.0, 2.0, 3.0, 4.0], &[2.0, 4.0, 6.0, 8.0]).unwrap();
/// assert!((cov - 10.0 / 3.0).abs() < 1e-12);
/// ```
pub fn online_covar(x1: &[f64], x2: &[f64]) -> CovResult<f64> {
    online_covar_with(x1, x2, &CovOptions::default())
}

/// [`online_covar`] with explicit [`CovOptions`].
///
/// Errors
/// ------
/// - As [`online_covar`], plus `CovError::NonFiniteData` when
///   `opts.check_finite` is set and an input is NaN/±∞.
pub fn online_covar_with(x1: &[f64], x2: &[f64], opts: &CovOptions) -> CovResult<f64> {
    validate_paired(x1, x2, opts)?;

    let mut acc = OnlineCovariance::new();
    acc.extend(x1, x2)?;

    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        slog::info!(crate::utils::logger(), "online covariance";
            "n" => acc.count(), "mean_x" => acc.mean_x(), "mean_y" => acc.mean_y());
    }

    acc.covariance()
}
