//! utils — crate-internal helpers shared across subtrees.
//!
//! With the `obs_slog` feature enabled this module owns the process-wide
//! `slog` logger used by estimators and combiners when their options ask for
//! verbose output. Records go to stderr through a non-blocking drain so
//! that logging never stalls a numeric loop.
//!
//! Without the feature the module only carries the floating-point helpers
//! below.

#[cfg(feature = "obs_slog")]
use std::sync::OnceLock;

/// Shared stderr logger, built on first use.
///
/// Notes
/// -----
/// - Uses `slog_term` full formatting behind an `slog_async` drain.
/// - Every record carries `crate = "rust_covariance"`.
#[cfg(feature = "obs_slog")]
pub(crate) fn logger() -> &'static slog::Logger {
    use slog::Drain;

    static LOGGER: OnceLock<slog::Logger> = OnceLock::new();
    LOGGER.get_or_init(|| {
        let decorator = slog_term::TermDecorator::new().stderr().build();
        let drain = slog_term::FullFormat::new(decorator).build().fuse();
        let drain = slog_async::Async::new(drain).build().fuse();
        slog::Logger::root(drain, slog::o!("crate" => "rust_covariance"))
    })
}

/// Relative closeness test used for symmetry checks.
///
/// Returns `true` when `|a − b| ≤ tol · max(1, |a|, |b|)`. The `max(1, ·)`
/// floor keeps the test meaningful for entries near zero. NaN on either
/// side compares as close so that NaN propagates instead of being reported
/// as asymmetry.
#[inline]
pub(crate) fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    let diff = (a - b).abs();
    diff.is_nan() || diff <= tol * 1.0_f64.max(a.abs()).max(b.abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Check the absolute floor near zero and the relative regime for
    // large magnitudes, plus NaN handling.
    //
    // Given
    // -----
    // - Pairs near zero, near 1e12, and involving NaN.
    //
    // Expect
    // ------
    // - Differences within `tol · max(1, |a|, |b|)` compare close.
    fn approx_eq_uses_relative_scale_with_unit_floor() {
        // Arrange
        let tol = 1e-9;

        // Act / Assert
        assert!(approx_eq(0.0, 5e-10, tol));
        assert!(!approx_eq(0.0, 5e-9, tol));
        assert!(approx_eq(1e12, 1e12 + 100.0, tol));
        assert!(!approx_eq(1e12, 1e12 + 1e4, tol));
        assert!(approx_eq(f64::NAN, 1.0, tol));
    }
}
