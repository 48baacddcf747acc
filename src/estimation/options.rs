//! estimation::options — configuration for single-partition estimators.
//!
//! Purpose
//! -------
//! Hold the small set of switches shared by the pairwise and two-pass
//! estimators. Options are passed explicitly to the `*_with` entry points;
//! the plain entry points use [`CovOptions::default`].
//!
//! Conventions
//! -----------
//! - Non-finite data propagates into results unless `check_finite` is set,
//!   in which case the first NaN/±∞ is reported as
//!   [`CovError::NonFiniteData`](crate::estimation::errors::CovError::NonFiniteData).
//! - `verbose` only has an effect when the crate is built with the
//!   `obs_slog` feature.

/// CovOptions — switches for covariance estimation on one partition.
///
/// Fields
/// ------
/// - `check_finite`: `bool`
///   Reject NaN/±∞ inputs up front instead of letting them flow into the
///   result.
/// - `verbose`: `bool`
///   Emit structured log records for each call (requires `obs_slog`).
///
/// Notes
/// -----
/// - The default leaves both switches off, matching the behavior of the
///   plain [`online_covar`](crate::estimation::online::online_covar) and
///   [`two_pass_multi_covar`](crate::estimation::two_pass::two_pass_multi_covar)
///   entry points.
///
/// Examples
/// --------
/// ```rust
/// # use rust_covariance::estimation::options::CovOptions;
/// let opts = CovOptions::new(true, false);
/// assert!(opts.check_finite);
/// assert_eq!(CovOptions::default(), CovOptions::new(false, false));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CovOptions {
    /// Reject non-finite observations before computing anything.
    pub check_finite: bool,
    /// Log each estimation call when `obs_slog` is enabled.
    pub verbose: bool,
}

impl CovOptions {
    /// Construct options from explicit settings. Never fails.
    pub fn new(check_finite: bool, verbose: bool) -> CovOptions {
        CovOptions { check_finite, verbose }
    }
}
