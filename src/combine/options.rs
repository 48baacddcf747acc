//! combine::options — configuration for merging partial estimates.
//!
//! Purpose
//! -------
//! Collect the combiner's knobs in one value that callers thread through
//! [`combine_cov_estimates`](crate::combine::merge::combine_cov_estimates)
//! and friends: reduction shape, symmetry tolerance, and logging.

/// Default relative tolerance for symmetry checks on supplied matrices.
pub const DEFAULT_SYMMETRY_TOL: f64 = 1e-9;

/// CombineStrategy — order in which partial estimates are reduced.
///
/// Variants
/// --------
/// - `Sequential`
///   Left fold: `((p0 ⊕ p1) ⊕ p2) ⊕ …`.
/// - `Pairwise`
///   Balanced binary tree over the inputs in their given order. Rounding
///   error grows with `log k` rather than `k`, which matters for thousands
///   of small partitions.
///
/// Notes
/// -----
/// - Both strategies give the same result up to floating-point rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CombineStrategy {
    #[default]
    Sequential,
    Pairwise,
}

/// CombineOptions — settings for the covariance combiner.
///
/// Fields
/// ------
/// - `strategy`: [`CombineStrategy`]
///   Reduction order.
/// - `symmetry_tol`: `f64`
///   Relative tolerance used when checking that supplied covariance
///   matrices are symmetric: `|a − b| ≤ tol · max(1, |a|, |b|)`.
/// - `verbose`: `bool`
///   Log each merge step (requires the `obs_slog` feature).
///
/// Notes
/// -----
/// - `Default` is sequential reduction, `symmetry_tol = 1e-9`, quiet.
///
/// Examples
/// --------
/// ```rust
/// # use rust_covariance::combine::options::{CombineOptions, CombineStrategy};
/// let opts = CombineOptions::default();
/// assert_eq!(opts.strategy, CombineStrategy::Sequential);
/// let tree = CombineOptions::new(CombineStrategy::Pairwise, 1e-6, false);
/// assert_eq!(tree.symmetry_tol, 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombineOptions {
    /// Reduction order over partial estimates.
    pub strategy: CombineStrategy,
    /// Relative tolerance for input symmetry checks.
    pub symmetry_tol: f64,
    /// Log merge steps when `obs_slog` is enabled.
    pub verbose: bool,
}

impl CombineOptions {
    /// Construct options from explicit settings. Never fails; values are
    /// stored as given.
    pub fn new(strategy: CombineStrategy, symmetry_tol: f64, verbose: bool) -> CombineOptions {
        CombineOptions { strategy, symmetry_tol, verbose }
    }
}

impl Default for CombineOptions {
    fn default() -> Self {
        Self { strategy: CombineStrategy::Sequential, symmetry_tol: DEFAULT_SYMMETRY_TOL, verbose: false }
    }
}
