//! estimation::errors — shared error type for covariance estimation.
//!
//! Purpose
//! -------
//! Define [`CovError`], the single failure taxonomy used by every estimator
//! and combiner in this crate, together with the result alias
//! [`CovResult`]. Keeping one enum lets callers match on the kind of failure
//! (dimensions, sample size, shape) without caring which routine raised it.
//!
//! Key behaviors
//! -------------
//! - Group failures into the three families callers act on: dimension
//!   mismatches, insufficient samples, and combiner shape problems.
//! - Carry the offending sizes, indices, or values in each variant so that
//!   diagnostics are actionable without re-running the computation.
//! - Provide `Display` / `Error` implementations and an `anyhow` bridge for
//!   orchestration code that already works with `anyhow::Error`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every error is raised during up-front validation; no variant is
//!   produced after arithmetic on the data has started.
//! - `CovError` values are small and cheap to clone.
//!
//! Conventions
//! -----------
//! - `index` fields are 0-based and refer to the row, partition, or element
//!   that failed validation.
//! - Messages describe the violated constraint ("need at least 2 samples")
//!   rather than implementation details.
//!
//! Testing notes
//! -------------
//! - Unit tests below check that each variant's `Display` output embeds its
//!   payload. Raising paths are covered in the validation and estimator
//!   modules.

pub type CovResult<T> = Result<T, CovError>;

/// CovError — validation failures for covariance estimation and merging.
///
/// Variants
/// --------
/// - `DimensionMismatch { expected, found, index }`
///   Two inputs that must agree in length or column count do not. `index`
///   names the offending row or partition when there is one.
/// - `InsufficientSamples { n, min }`
///   Fewer than `min` observations were supplied where a sample
///   (co)variance is undefined.
/// - `ShapeMismatch { reason, index }`
///   Combiner inputs are misaligned (count of matrices vs. counts, empty
///   input, non-square matrix, malformed packed layout).
/// - `NotSymmetric { index, row, col, value, mirror }`
///   A partial covariance matrix differs from its transpose beyond the
///   configured tolerance.
/// - `InvalidSampleCount { index, value }`
///   A sample count is zero, negative, fractional, non-finite, or too large
///   to be represented exactly.
/// - `CountOverflow { index }`
///   Adding the count of partition `index` overflows the running total.
/// - `NonFiniteData { index, value }`
///   A NaN or ±∞ was found while finiteness checks were requested.
/// - `Anyhow(String)`
///   Passthrough for errors raised by orchestration code.
#[derive(Debug, Clone, PartialEq)]
pub enum CovError {
    // ---- Dimensions ----
    DimensionMismatch { expected: usize, found: usize, index: Option<usize> },

    // ---- Sample size ----
    InsufficientSamples { n: usize, min: usize },

    // ---- Combiner shape ----
    ShapeMismatch { reason: &'static str, index: Option<usize> },
    NotSymmetric { index: usize, row: usize, col: usize, value: f64, mirror: f64 },
    InvalidSampleCount { index: usize, value: f64 },
    CountOverflow { index: usize },

    // ---- Data ----
    NonFiniteData { index: usize, value: f64 },

    // ---- Anyhow catchall ----
    Anyhow(String),
}

impl std::error::Error for CovError {}

impl From<anyhow::Error> for CovError {
    fn from(err: anyhow::Error) -> Self {
        CovError::Anyhow(err.to_string())
    }
}

impl std::fmt::Display for CovError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Dimensions ----
            CovError::DimensionMismatch { expected, found, index: Some(idx) } => write!(
                f,
                "Covariance Error: dimension mismatch at index {idx} (expected {expected}, found {found})"
            ),
            CovError::DimensionMismatch { expected, found, index: None } => write!(
                f,
                "Covariance Error: dimension mismatch (expected {expected}, found {found})"
            ),

            // ---- Sample size ----
            CovError::InsufficientSamples { n, min } => write!(
                f,
                "Covariance Error: need at least {min} samples, got {n}"
            ),

            // ---- Combiner shape ----
            CovError::ShapeMismatch { reason, index: Some(idx) } => {
                write!(f, "Covariance Error: shape mismatch at index {idx}: {reason}")
            }
            CovError::ShapeMismatch { reason, index: None } => {
                write!(f, "Covariance Error: shape mismatch: {reason}")
            }
            CovError::NotSymmetric { index, row, col, value, mirror } => write!(
                f,
                "Covariance Error: matrix {index} is not symmetric at ({row}, {col}): {value} vs {mirror}"
            ),
            CovError::InvalidSampleCount { index, value } => write!(
                f,
                "Covariance Error: invalid sample count {value} at index {index}. Must be a positive integer."
            ),
            CovError::CountOverflow { index } => write!(
                f,
                "Covariance Error: total sample count overflows at index {index}"
            ),

            // ---- Data ----
            CovError::NonFiniteData { index, value } => write!(
                f,
                "Covariance Error: non-finite value {value} at index {index}"
            ),

            // ---- Anyhow catchall ----
            CovError::Anyhow(msg) => write!(f, "Covariance Error: {msg}"),
        }
    }
}
