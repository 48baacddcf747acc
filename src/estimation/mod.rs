//! estimation — single-dataset covariance estimators and their inputs.
//!
//! Purpose
//! -------
//! Collect the estimators that turn raw observations into covariances: a
//! single-pass pairwise estimator for two series, a two-pass estimator for
//! the full `p×p` matrix, a chunked streaming accumulator, and the
//! per-partition [`PartialCovariance`] value consumed by
//! [`crate::combine`]. Shared validation, options, and the crate-wide
//! error type also live here.
//!
//! Key behaviors
//! -------------
//! - [`online_covar`] and [`OnlineCovariance`] compute `cov(x1, x2)` with
//!   Welford co-moment updates.
//! - [`two_pass_multi_covar`] computes the sample covariance matrix of an
//!   `n×p` sample matrix (rows are samples) with an exactly symmetric
//!   result.
//! - [`StreamingCovarianceMatrix`] accumulates the same matrix from rows or
//!   row chunks.
//! - [`PartialCovariance`] stores `(n, mean, co-moment)` for one partition.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every estimator validates its input before computing anything and
//!   reports failures through [`CovResult`]; none of them panic on
//!   user-facing input.
//! - Sample covariances use the `n − 1` denominator and need at least two
//!   observations.
//! - NaN/±∞ values propagate unless [`CovOptions::check_finite`] is set.
//!
//! Conventions
//! -----------
//! - Sample matrices are `ndarray` 2-D arrays with samples as rows; all
//!   matrix entry points accept owned arrays and views alike.
//! - Covariance outputs are `Array2<f64>` of shape `p×p`.
//!
//! Testing notes
//! -------------
//! - Each submodule carries unit tests; `statrs` serves as the reference
//!   implementation for variances and pairwise covariances.

pub mod errors;
pub mod online;
pub mod options;
pub mod partial;
pub mod streaming;
pub mod two_pass;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{CovError, CovResult};
pub use self::online::{OnlineCovariance, online_covar, online_covar_with};
pub use self::options::CovOptions;
pub use self::partial::PartialCovariance;
pub use self::streaming::StreamingCovarianceMatrix;
pub use self::two_pass::{
    column_means, sample_matrix_from_rows, two_pass_multi_covar, two_pass_multi_covar_with,
};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_covariance::estimation::prelude::*;
//
// to import the estimators in a single line.

pub mod prelude {
    pub use super::errors::{CovError, CovResult};
    pub use super::online::{OnlineCovariance, online_covar};
    pub use super::options::CovOptions;
    pub use super::partial::PartialCovariance;
    pub use super::streaming::StreamingCovarianceMatrix;
    pub use super::two_pass::two_pass_multi_covar;
}
