//! combine — merging per-partition covariance estimates.
//!
//! Purpose
//! -------
//! Turn covariance estimates computed independently on disjoint partitions
//! of a dataset into the covariance of the whole dataset, without access
//! to the raw rows. The algebra is the Chan–Golub–LeVeque pairwise update
//! on `(n, mean, co-moment)` triples, applied as a left fold or as a
//! balanced tree.
//!
//! Key behaviors
//! -------------
//! - [`combine_cov_estimates`] takes per-partition covariance matrices,
//!   means, and counts.
//! - [`combine_partials`] reduces already-built
//!   [`PartialCovariance`](crate::estimation::PartialCovariance) values.
//! - [`combine_packed_estimates`] accepts the flat `[mean | covariance]`
//!   row layout with floating-point counts.
//! - [`grouped_covariance`] and [`partials_by_group`] split a labelled
//!   sample matrix into partials and combine them (in parallel with the
//!   `parallel` feature).
//!
//! Invariants & assumptions
//! ------------------------
//! - All inputs are validated before the first merge: list alignment,
//!   square and symmetric matrices, matching mean lengths, a common
//!   dimension, positive counts, and a total of at least two observations.
//! - Results are exactly symmetric, and independent of partition order
//!   and grouping up to floating-point rounding.
//!
//! Conventions
//! -----------
//! - Input covariances use the `n − 1` denominator. A single-observation
//!   partition contributes only its mean and count.
//! - Symmetry of supplied matrices is checked with the relative tolerance
//!   in [`CombineOptions::symmetry_tol`].
//!
//! Testing notes
//! -------------
//! - Unit tests in each submodule compare combined results with the
//!   two-pass estimator on the concatenated data; property tests under
//!   `tests/` check associativity and order independence on random
//!   partitions.

pub mod grouped;
pub mod merge;
pub mod options;
pub mod packed;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::grouped::{grouped_covariance, partials_by_group};
pub use self::merge::{combine_cov_estimates, combine_partials, merge_pair};
pub use self::options::{CombineOptions, CombineStrategy, DEFAULT_SYMMETRY_TOL};
pub use self::packed::{combine_packed_estimates, pack_estimates, unpack_estimates};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_covariance::combine::prelude::*;
//
// to import the combiner surface in a single line.

pub mod prelude {
    pub use super::grouped::grouped_covariance;
    pub use super::merge::{combine_cov_estimates, combine_partials};
    pub use super::options::{CombineOptions, CombineStrategy};
    pub use super::packed::combine_packed_estimates;
}
