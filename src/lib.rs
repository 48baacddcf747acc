//! rust_covariance — streaming and distributed covariance estimation.
//!
//! Purpose
//! -------
//! Estimate sample covariances in ways that stay numerically stable and
//! scale to data that is streamed or partitioned: a one-pass estimator for
//! two series, a two-pass estimator for the full covariance matrix, a
//! chunked accumulator, and a combiner that merges per-partition estimates
//! into the covariance of the whole dataset without revisiting raw rows.
//!
//! Key behaviors
//! -------------
//! - [`estimation`] holds the single-dataset estimators
//!   ([`online_covar`](estimation::online_covar),
//!   [`two_pass_multi_covar`](estimation::two_pass_multi_covar),
//!   [`StreamingCovarianceMatrix`](estimation::StreamingCovarianceMatrix)),
//!   the [`PartialCovariance`](estimation::PartialCovariance) value, the
//!   shared validation layer, and the crate error type.
//! - [`combine`] merges partial estimates (typed, packed-row, or grouped by
//!   label) into one covariance matrix.
//!
//! Invariants & assumptions
//! ------------------------
//! - Sample covariances use the `n − 1` denominator; fewer than two
//!   observations is an error, never a silent NaN.
//! - Covariance matrices returned by any entry point are exactly
//!   symmetric.
//! - Every public operation is a pure function of its arguments. The only
//!   state lives in accumulators the caller owns.
//!
//! Conventions
//! -----------
//! - Sample matrices are `ndarray::Array2<f64>` (or views) with samples as
//!   rows and variables as columns.
//! - Failures are reported as [`CovError`](estimation::CovError) through
//!   [`CovResult`](estimation::CovResult), detected before any arithmetic.
//! - NaN and ±∞ inputs flow through to the output unless
//!   [`CovOptions::check_finite`](estimation::CovOptions::check_finite) is
//!   enabled.
//!
//! Features
//! --------
//! - `obs_slog`: structured logging of estimator and combiner steps via
//!   `slog` when the relevant options set `verbose`.
//! - `parallel`: compute per-group partials on the `rayon` thread pool.
//!
//! Downstream usage
//! ----------------
//! ```rust
//! use ndarray::array;
//! use rust_covariance::combine::prelude::*;
//! use rust_covariance::estimation::prelude::*;
//!
//! # fn main() -> CovResult<()> {
//! let left = array![[1.0, 2.0], [2.0, 4.5], [3.0, 5.5]];
//! let right = array![[4.0, 8.0], [5.0, 9.5]];
//! let parts = [PartialCovariance::from_samples(&left)?, PartialCovariance::from_samples(&right)?];
//! let combined = combine_partials(&parts, &CombineOptions::default())?.covariance()?;
//! assert_eq!(combined[[0, 1]], combined[[1, 0]]);
//! # Ok(())
//! # }
//! ```
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each module; `tests/` holds an end-to-end
//!   partition-and-combine pipeline test and `proptest` property tests for
//!   symmetry, associativity, and order independence.

pub mod combine;
pub mod estimation;
pub(crate) mod utils;
