//! estimation::streaming — chunked multivariate covariance accumulator.
//!
//! Purpose
//! -------
//! Accumulate the covariance matrix of a dataset that arrives as rows or
//! row chunks, so the whole `n×p` matrix never has to be held in memory.
//! Single rows use the multivariate Welford update
//!
//! ```text
//! n    ← n + 1
//! d    = x − x̄_old
//! x̄    ← x̄_old + d / n
//! M    ← M + d dᵀ · (n − 1) / n
//! ```
//!
//! and chunks are reduced with the two-pass estimator and folded in with
//! the pairwise merge from [`crate::combine::merge`].
//!
//! Invariants & assumptions
//! ------------------------
//! - `M` is exactly symmetric after every update.
//! - Every call validates its input before touching state, so a failed
//!   call leaves the accumulator unchanged.
use crate::{
    combine::merge::merge_moments,
    estimation::{
        errors::{CovError, CovResult},
        options::CovOptions,
        partial::PartialCovariance,
        validation::{MIN_SAMPLES, check_finite, validate_samples},
    },
};
use ndarray::{Array1, Array2, ArrayBase, Data, Ix2};

/// StreamingCovarianceMatrix — running `(n, mean, co-moment)` over `p`
/// variables.
///
/// Examples
/// --------
/// ```rust
/// # use ndarray::array;
/// # use rust_covariance::estimation::streaming::StreamingCovarianceMatrix;
/// let mut acc = StreamingCovarianceMatrix::new(2).unwrap();
/// acc.push_row(&[1.0, 2.0]).unwrap();
/// acc.push_chunk(&array![[2.0, 4.0], [3.0, 6.0], [4.0, 8.0]]).unwrap();
/// let s = acc.covariance().unwrap();
/// assert!((s[[0, 1]] - 10.0 / 3.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StreamingCovarianceMatrix {
    n: usize,
    mean: Array1<f64>,
    comoment: Array2<f64>,
    opts: CovOptions,
}

impl StreamingCovarianceMatrix {
    /// Empty accumulator over `p` variables with default options.
    ///
    /// Errors
    /// ------
    /// - `CovError::ShapeMismatch` if `p == 0`.
    pub fn new(p: usize) -> CovResult<Self> {
        Self::with_options(p, CovOptions::default())
    }

    /// Empty accumulator over `p` variables.
    ///
    /// With `opts.check_finite` set, rows containing NaN or ±∞ are rejected
    /// instead of being accumulated.
    pub fn with_options(p: usize, opts: CovOptions) -> CovResult<Self> {
        if p == 0 {
            return Err(CovError::ShapeMismatch {
                reason: "accumulator needs at least one variable",
                index: None,
            });
        }
        Ok(Self { n: 0, mean: Array1::zeros(p), comoment: Array2::zeros((p, p)), opts })
    }

    /// Add one observation.
    ///
    /// Errors
    /// ------
    /// - `CovError::DimensionMismatch` if `row.len() != p`.
    /// - `CovError::NonFiniteData` when `check_finite` is set.
    pub fn push_row(&mut self, row: &[f64]) -> CovResult<()> {
        let p = self.dim();
        if row.len() != p {
            return Err(CovError::DimensionMismatch { expected: p, found: row.len(), index: None });
        }
        if self.opts.check_finite {
            check_finite(row.iter().copied())?;
        }

        self.n += 1;
        let n = self.n as f64;
        let delta: Array1<f64> = row.iter().zip(self.mean.iter()).map(|(x, m)| x - m).collect();
        self.mean.scaled_add(1.0 / n, &delta);

        let weight = (n - 1.0) / n;
        for i in 0..p {
            for j in i..p {
                let inc = delta[i] * delta[j] * weight;
                self.comoment[[i, j]] += inc;
                if i != j {
                    self.comoment[[j, i]] += inc;
                }
            }
        }
        Ok(())
    }

    /// Add a block of observations (rows are samples).
    ///
    /// An empty chunk is accepted and changes nothing.
    ///
    /// Errors
    /// ------
    /// - `CovError::DimensionMismatch` if `chunk.ncols() != p`.
    /// - `CovError::NonFiniteData` when `check_finite` is set.
    pub fn push_chunk<S>(&mut self, chunk: &ArrayBase<S, Ix2>) -> CovResult<()>
    where
        S: Data<Elem = f64>,
    {
        let p = self.dim();
        if chunk.ncols() != p {
            return Err(CovError::DimensionMismatch {
                expected: p,
                found: chunk.ncols(),
                index: None,
            });
        }
        if chunk.nrows() == 0 {
            return Ok(());
        }
        validate_samples(chunk, 1, &self.opts)?;

        let part = PartialCovariance::from_samples(chunk)?;
        let (mean, comoment) = merge_moments(
            self.n,
            &self.mean,
            &self.comoment,
            part.count(),
            part.mean(),
            part.comoment(),
        );

        #[cfg(feature = "obs_slog")]
        if self.opts.verbose {
            slog::info!(crate::utils::logger(), "streaming chunk merged";
                "rows" => part.count(), "total" => self.n + part.count(), "p" => p);
        }

        self.n += part.count();
        self.mean = mean;
        self.comoment = comoment;
        Ok(())
    }

    /// Number of observations accumulated.
    pub fn count(&self) -> usize {
        self.n
    }

    /// Number of variables `p`.
    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    /// Running mean vector (zeros before the first observation).
    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    /// Sample covariance of everything pushed so far.
    ///
    /// Errors
    /// ------
    /// - `CovError::InsufficientSamples` if fewer than 2 rows were pushed.
    pub fn covariance(&self) -> CovResult<Array2<f64>> {
        if self.n < MIN_SAMPLES {
            return Err(CovError::InsufficientSamples { n: self.n, min: MIN_SAMPLES });
        }
        Ok(&self.comoment / (self.n - 1) as f64)
    }

    /// Convert into a [`PartialCovariance`] for use with the combiner.
    ///
    /// Errors
    /// ------
    /// - `CovError::InsufficientSamples` if nothing was pushed.
    pub fn into_partial(self) -> CovResult<PartialCovariance> {
        if self.n == 0 {
            return Err(CovError::InsufficientSamples { n: 0, min: 1 });
        }
        Ok(PartialCovariance::from_moments(self.n, self.mean, self.comoment))
    }
}
