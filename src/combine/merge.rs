//! combine::merge — parallel combination of partial covariance estimates.
//!
//! Purpose
//! -------
//! Merge sufficient statistics computed on disjoint partitions into the
//! statistics of their union, so that a covariance matrix can be computed
//! per batch (possibly on different threads or machines) and reduced
//! afterwards without revisiting raw data. The pairwise update is the
//! Chan–Golub–LeVeque combination, generalized to co-moment matrices:
//!
//! ```text
//! n     = n_a + n_b
//! δ     = x̄_b − x̄_a
//! x̄     = x̄_a + δ · n_b / n
//! M     = M_a + M_b + δ δᵀ · n_a n_b / n
//! cov   = M / (n − 1)
//! ```
//!
//! Written in terms of covariances this is the degrees-of-freedom weighted
//! average of the partial covariances plus the between-partition
//! correction `δ_i δ_j n_a n_b / n`, divided by `n − 1`.
//!
//! Key behaviors
//! -------------
//! - [`merge_pair`] merges two [`PartialCovariance`] values.
//! - [`combine_partials`] reduces any number of partials using the
//!   configured [`CombineStrategy`].
//! - [`combine_cov_estimates`] is the matrix-level entry point: per-partition
//!   covariance matrices, mean vectors, and counts in, combined covariance
//!   matrix out.
//!
//! Invariants & assumptions
//! ------------------------
//! - All validation (list alignment, per-matrix shape and symmetry,
//!   common dimension, total count ≥ 2) runs before the first merge.
//! - The merged co-moment is exactly symmetric: each pair `(i, j)` is
//!   computed once and mirrored.
//! - The reduction is associative and commutative up to floating-point
//!   rounding, so partition order does not change the result beyond
//!   round-off.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the two-partition worked example, equivalence with
//!   the two-pass estimator on the concatenated data, associativity, order
//!   independence, both reduction strategies, and the error paths.
use crate::{
    combine::{
        options::{CombineOptions, CombineStrategy},
        validation::{validate_alignment, validate_common_dim, validate_partials, validate_total},
    },
    estimation::{
        errors::{CovError, CovResult},
        partial::PartialCovariance,
        validation::validate_estimate,
    },
};
use ndarray::{Array1, Array2};

/// Merge two partial estimates computed on disjoint data.
///
/// Parameters
/// ----------
/// - `a`, `b`: [`PartialCovariance`] values over the same `p` variables.
///
/// Returns
/// -------
/// `CovResult<PartialCovariance>`
///   Statistics of the union: `n_a + n_b` observations, pooled mean, and
///   combined co-moment.
///
/// Errors
/// ------
/// - `CovError::DimensionMismatch` if `a.dim() != b.dim()`.
/// - `CovError::CountOverflow { index: 1 }` if `n_a + n_b` overflows
///   `usize`.
///
/// Examples
/// --------
/// ```rust
/// # use ndarray::array;
/// # use rust_covariance::combine::merge::merge_pair;
/// # use rust_covariance::estimation::partial::PartialCovariance;
/// // n = 3, mean = 5, var = 4  and  n = 3, mean = 9, var = 4
/// let a = PartialCovariance::from_covariance(3, array![5.0], array![[4.0]], 1e-9).unwrap();
/// let b = PartialCovariance::from_covariance(3, array![9.0], array![[4.0]], 1e-9).unwrap();
/// let ab = merge_pair(&a, &b).unwrap();
/// assert_eq!(ab.count(), 6);
/// assert_eq!(ab.mean()[0], 7.0);
/// assert!((ab.covariance().unwrap()[[0, 0]] - 8.0).abs() < 1e-12);
/// ```
pub fn merge_pair(a: &PartialCovariance, b: &PartialCovariance) -> CovResult<PartialCovariance> {
    if a.dim() != b.dim() {
        return Err(CovError::DimensionMismatch { expected: a.dim(), found: b.dim(), index: None });
    }
    let n = a.count().checked_add(b.count()).ok_or(CovError::CountOverflow { index: 1 })?;
    let (mean, comoment) =
        merge_moments(a.count(), a.mean(), a.comoment(), b.count(), b.mean(), b.comoment());
    Ok(PartialCovariance::from_moments(n, mean, comoment))
}

/// Reduce a list of partial estimates into one.
///
/// Parameters
/// ----------
/// - `parts`: `&[PartialCovariance]`
///   Non-empty list of partials over the same `p` variables.
/// - `opts`: `&CombineOptions`
///   Reduction strategy and logging.
///
/// Returns
/// -------
/// `CovResult<PartialCovariance>`
///   Statistics of the union of all partitions.
///
/// Errors
/// ------
/// - `CovError::ShapeMismatch` if `parts` is empty.
/// - `CovError::DimensionMismatch` if the partials disagree on `p`.
/// - `CovError::CountOverflow` if the total count overflows `usize`.
/// - `CovError::InsufficientSamples` if the total count is below 2.
pub fn combine_partials(
    parts: &[PartialCovariance], opts: &CombineOptions,
) -> CovResult<PartialCovariance> {
    validate_partials(parts)?;
    let (first, rest) = parts.split_first().ok_or(CovError::ShapeMismatch {
        reason: "no partial estimates supplied",
        index: None,
    })?;

    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        slog::info!(crate::utils::logger(), "combining partial covariances";
            "partitions" => parts.len(), "p" => first.dim(),
            "strategy" => format!("{:?}", opts.strategy));
    }

    match opts.strategy {
        CombineStrategy::Sequential => {
            rest.iter().try_fold(first.clone(), |acc, part| merge_step(&acc, part, opts))
        }
        CombineStrategy::Pairwise => reduce_pairwise(parts, opts),
    }
}

/// Combine per-partition covariance matrices into the covariance of the
/// union.
///
/// Parameters
/// ----------
/// - `covs`: `&[Array2<f64>]`
///   Per-partition `p×p` sample covariance matrices (denominator
///   `n_k − 1`). For a partition with `n_k = 1` the matrix is ignored.
/// - `means`: `&[Array1<f64>]`
///   Per-partition mean vectors, aligned with `covs`.
/// - `ns`: `&[usize]`
///   Per-partition sample counts, aligned with `covs`, each `≥ 1`.
/// - `opts`: `&CombineOptions`
///   Symmetry tolerance, reduction strategy, and logging.
///
/// Returns
/// -------
/// `CovResult<Array2<f64>>`
///   The `p×p` sample covariance of the concatenated partitions.
///
/// Errors
/// ------
/// - `CovError::ShapeMismatch` if the lists are empty or misaligned, or a
///   matrix is empty / not square.
/// - `CovError::NotSymmetric` if a matrix fails the symmetry check.
/// - `CovError::DimensionMismatch` if a mean vector does not match its
///   matrix, or partitions disagree on `p`.
/// - `CovError::InvalidSampleCount` if some `n_k == 0`.
/// - `CovError::InsufficientSamples` if `Σ n_k < 2`.
///
/// Examples
/// --------
/// ```rust
/// # use ndarray::array;
/// # use rust_covariance::combine::{merge::combine_cov_estimates, options::CombineOptions};
/// let covs = [array![[4.0]], array![[4.0]]];
/// let means = [array![5.0], array![9.0]];
/// let s = combine_cov_estimates(&covs, &means, &[3, 3], &CombineOptions::default()).unwrap();
/// assert!((s[[0, 0]] - 8.0).abs() < 1e-12);
/// ```
pub fn combine_cov_estimates(
    covs: &[Array2<f64>], means: &[Array1<f64>], ns: &[usize], opts: &CombineOptions,
) -> CovResult<Array2<f64>> {
    validate_alignment(covs.len(), means.len(), ns.len())?;
    for (index, ((cov, mean), &n)) in covs.iter().zip(means).zip(ns).enumerate() {
        validate_estimate(index, n, mean, cov, opts.symmetry_tol)?;
    }
    validate_common_dim(means.iter().map(Array1::len))?;
    validate_total(ns.iter().copied())?;

    let parts: Vec<PartialCovariance> = covs
        .iter()
        .zip(means)
        .zip(ns)
        .map(|((cov, mean), &n)| {
            PartialCovariance::from_validated_covariance(n, mean.clone(), cov.clone())
        })
        .collect();

    combine_partials(&parts, opts)?.covariance()
}

// ---- Helpers ----

/// Chan update on raw moments; shapes are assumed consistent.
///
/// With `n_a == 0` the result is `(x̄_b, M_b)` (and symmetrically for
/// `n_b == 0`) up to the mirroring of `M_b`'s upper triangle.
pub(crate) fn merge_moments(
    na: usize, mean_a: &Array1<f64>, m_a: &Array2<f64>, nb: usize, mean_b: &Array1<f64>,
    m_b: &Array2<f64>,
) -> (Array1<f64>, Array2<f64>) {
    let fa = na as f64;
    let fb = nb as f64;
    let n = fa + fb;
    let delta = mean_b - mean_a;
    let mean = mean_a + &(&delta * (fb / n));
    let weight = fa * fb / n;

    let p = mean.len();
    let mut comoment = Array2::<f64>::zeros((p, p));
    for i in 0..p {
        for j in i..p {
            let value = m_a[[i, j]] + m_b[[i, j]] + delta[i] * delta[j] * weight;
            comoment[[i, j]] = value;
            comoment[[j, i]] = value;
        }
    }
    (mean, comoment)
}

#[cfg_attr(not(feature = "obs_slog"), allow(unused_variables))]
fn merge_step(
    a: &PartialCovariance, b: &PartialCovariance, opts: &CombineOptions,
) -> CovResult<PartialCovariance> {
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        slog::info!(crate::utils::logger(), "merge step";
            "n_a" => a.count(), "n_b" => b.count());
    }
    merge_pair(a, b)
}

fn reduce_pairwise(
    parts: &[PartialCovariance], opts: &CombineOptions,
) -> CovResult<PartialCovariance> {
    if parts.len() == 1 {
        return Ok(parts[0].clone());
    }
    let mid = parts.len() / 2;
    let left = reduce_pairwise(&parts[..mid], opts)?;
    let right = reduce_pairwise(&parts[mid..], opts)?;
    merge_step(&left, &right, opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::two_pass::two_pass_multi_covar;
    use approx::assert_relative_eq;
    use ndarray::{array, s};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The two-partition worked example (n=3, mean=5/9, var=4 each).
    // - Equality with two-pass covariance over the concatenated rows.
    // - Associativity, order independence, and strategy equivalence.
    // - Error paths of `combine_cov_estimates` and `merge_pair`.
    // -------------------------------------------------------------------------

    const TOL: f64 = 1e-9;

    fn assert_matrices_close(a: &Array2<f64>, b: &Array2<f64>, tol: f64) {
        assert_eq!(a.shape(), b.shape(), "shape mismatch: {:?} vs {:?}", a.shape(), b.shape());
        for i in 0..a.nrows() {
            for j in 0..a.ncols() {
                assert_relative_eq!(a[[i, j]], b[[i, j]], epsilon = tol, max_relative = tol);
            }
        }
    }

    fn data() -> Array2<f64> {
        array![
            [1.0, 2.0, 0.5],
            [2.0, 1.5, -1.0],
            [4.0, 3.0, 2.0],
            [0.5, 0.0, 1.0],
            [3.0, 5.0, -0.5],
            [2.5, 2.5, 0.0],
            [6.0, 1.0, 3.5],
            [-1.0, 4.0, 1.5]
        ]
    }

    fn split(x: &Array2<f64>, cuts: &[usize]) -> Vec<PartialCovariance> {
        let mut bounds = vec![0];
        bounds.extend_from_slice(cuts);
        bounds.push(x.nrows());
        bounds
            .windows(2)
            .map(|w| PartialCovariance::from_samples(&x.slice(s![w[0]..w[1], ..])).unwrap())
            .collect()
    }

    #[test]
    // Purpose
    // -------
    // Check the worked single-variable example against direct data.
    //
    // Given
    // -----
    // - A = {3, 5, 7} (n=3, mean=5, var=4), B = {7, 9, 11} (n=3, mean=9,
    //   var=4).
    //
    // Expect
    // ------
    // - Combined variance `(2·4 + 2·4 + 3·3·16/6) / 5 = 8`, equal to the
    //   two-pass variance of {3, 5, 7, 7, 9, 11}.
    fn combine_matches_worked_example() {
        // Arrange
        let covs = [array![[4.0]], array![[4.0]]];
        let means = [array![5.0], array![9.0]];
        let direct = two_pass_multi_covar(&array![[3.0], [5.0], [7.0], [7.0], [9.0], [11.0]])
            .unwrap();

        // Act
        let combined =
            combine_cov_estimates(&covs, &means, &[3, 3], &CombineOptions::default()).unwrap();

        // Assert
        let expected = (2.0 * 4.0 + 2.0 * 4.0 + 3.0 * 3.0 * 16.0 / 6.0) / 5.0;
        assert_relative_eq!(combined[[0, 0]], expected, epsilon = 1e-12);
        assert_relative_eq!(combined[[0, 0]], direct[[0, 0]], epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Verify that combining row partitions reproduces the two-pass
    // covariance of the whole matrix, for both strategies.
    //
    // Given
    // -----
    // - An 8×3 matrix split into [0..3), [3..4), [4..8).
    //
    // Expect
    // ------
    // - Combined covariance ≈ `two_pass_multi_covar(x)` to 1e-9 relative,
    //   exactly symmetric.
    fn combine_partials_reproduces_full_two_pass() {
        // Arrange
        let x = data();
        let parts = split(&x, &[3, 4]);
        let direct = two_pass_multi_covar(&x).unwrap();

        for strategy in [CombineStrategy::Sequential, CombineStrategy::Pairwise] {
            let opts = CombineOptions::new(strategy, TOL, false);

            // Act
            let combined = combine_partials(&parts, &opts).unwrap();
            let cov = combined.covariance().unwrap();

            // Assert
            assert_eq!(combined.count(), 8);
            assert_matrices_close(&cov, &direct, TOL);
            for i in 0..3 {
                for j in 0..3 {
                    assert_eq!(cov[[i, j]].to_bits(), cov[[j, i]].to_bits());
                }
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Check associativity: (A ⊕ B) ⊕ C ≈ A ⊕ (B ⊕ C).
    //
    // Given
    // -----
    // - Three partitions of the test matrix.
    //
    // Expect
    // ------
    // - Means and covariances agree to 1e-12.
    fn merge_is_associative() {
        // Arrange
        let x = data();
        let parts = split(&x, &[2, 5]);
        let (a, b, c) = (&parts[0], &parts[1], &parts[2]);

        // Act
        let left = merge_pair(&merge_pair(a, b).unwrap(), c).unwrap();
        let right = merge_pair(a, &merge_pair(b, c).unwrap()).unwrap();

        // Assert
        assert_eq!(left.count(), right.count());
        for (l, r) in left.mean().iter().zip(right.mean().iter()) {
            assert_relative_eq!(l, r, epsilon = 1e-12);
        }
        assert_matrices_close(&left.covariance().unwrap(), &right.covariance().unwrap(), 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Ensure partition order does not change the combined covariance.
    //
    // Given
    // -----
    // - Four partitions combined in forward and reverse order.
    //
    // Expect
    // ------
    // - Results agree to 1e-12.
    fn combine_is_order_independent() {
        // Arrange
        let x = data();
        let parts = split(&x, &[1, 3, 6]);
        let mut reversed = parts.clone();
        reversed.reverse();
        let opts = CombineOptions::default();

        // Act
        let forward = combine_partials(&parts, &opts).unwrap().covariance().unwrap();
        let backward = combine_partials(&reversed, &opts).unwrap().covariance().unwrap();

        // Assert
        assert_matrices_close(&forward, &backward, 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Verify single-observation partitions contribute mean and count.
    //
    // Given
    // -----
    // - The test matrix split into eight one-row partitions, supplied as
    //   (n=1, row, NaN covariance).
    //
    // Expect
    // ------
    // - Combined covariance equals the two-pass result.
    fn combine_accepts_single_observation_partitions() {
        // Arrange
        let x = data();
        let covs: Vec<Array2<f64>> = (0..8).map(|_| Array2::from_elem((3, 3), f64::NAN)).collect();
        let means: Vec<Array1<f64>> = x.rows().into_iter().map(|r| r.to_owned()).collect();
        let ns = vec![1; 8];

        // Act
        let combined =
            combine_cov_estimates(&covs, &means, &ns, &CombineOptions::default()).unwrap();

        // Assert
        assert_matrices_close(&combined, &two_pass_multi_covar(&x).unwrap(), TOL);
    }

    #[test]
    // Purpose
    // -------
    // Walk the error paths of the matrix-level combiner.
    //
    // Given
    // -----
    // - Misaligned counts, asymmetric and non-square matrices, mismatched
    //   dimensions across partitions, zero count, and a total of one.
    //
    // Expect
    // ------
    // - The documented variant for each.
    fn combine_cov_estimates_error_paths() {
        // Arrange
        let opts = CombineOptions::default();
        let sym = array![[2.0, 0.5], [0.5, 1.0]];
        let skew = array![[2.0, 0.5], [0.7, 1.0]];
        let m2 = array![0.0, 0.0];

        // Act / Assert
        assert!(matches!(
            combine_cov_estimates(&[sym.clone(), sym.clone()], &[m2.clone(), m2.clone()], &[3], &opts),
            Err(CovError::ShapeMismatch { index: None, .. })
        ));
        assert!(matches!(
            combine_cov_estimates(&[sym.clone(), skew], &[m2.clone(), m2.clone()], &[3, 3], &opts),
            Err(CovError::NotSymmetric { index: 1, row: 0, col: 1, .. })
        ));
        assert!(matches!(
            combine_cov_estimates(
                &[sym.clone(), Array2::zeros((2, 3))],
                &[m2.clone(), m2.clone()],
                &[3, 3],
                &opts
            ),
            Err(CovError::ShapeMismatch { index: Some(1), .. })
        ));
        assert_eq!(
            combine_cov_estimates(
                &[sym.clone(), array![[1.0]]],
                &[m2.clone(), array![0.0]],
                &[3, 3],
                &opts
            ),
            Err(CovError::DimensionMismatch { expected: 2, found: 1, index: Some(1) })
        );
        assert!(matches!(
            combine_cov_estimates(&[sym.clone(), sym.clone()], &[m2.clone(), m2.clone()], &[3, 0], &opts),
            Err(CovError::InvalidSampleCount { index: 1, .. })
        ));
        assert_eq!(
            combine_cov_estimates(&[sym], &[m2], &[1], &opts),
            Err(CovError::InsufficientSamples { n: 1, min: 2 })
        );
        assert!(matches!(
            combine_cov_estimates(&[], &[], &[], &opts),
            Err(CovError::ShapeMismatch { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Ensure `merge_pair` rejects partials over different variable sets.
    //
    // Given
    // -----
    // - A 1-variable and a 2-variable partial.
    //
    // Expect
    // ------
    // - `DimensionMismatch { expected: 1, found: 2 }`.
    fn merge_pair_rejects_dimension_mismatch() {
        // Arrange
        let a = PartialCovariance::from_samples(&array![[1.0], [2.0]]).unwrap();
        let b = PartialCovariance::from_samples(&array![[1.0, 2.0], [3.0, 4.0]]).unwrap();

        // Act
        let result = merge_pair(&a, &b);

        // Assert
        assert_eq!(result, Err(CovError::DimensionMismatch { expected: 1, found: 2, index: None }));
    }

    #[test]
    // Purpose
    // -------
    // Check stability when every partition sits on a large common offset.
    //
    // Given
    // -----
    // - The test matrix shifted by 1e9, split into three partitions.
    //
    // Expect
    // ------
    // - Combined covariance equals the unshifted two-pass result to 1e-5.
    fn combine_is_stable_under_large_offset() {
        // Arrange
        let x = data();
        let shifted = &x + 1e9;
        let parts = split(&shifted, &[3, 5]);

        // Act
        let combined =
            combine_partials(&parts, &CombineOptions::default()).unwrap().covariance().unwrap();

        // Assert
        let direct = two_pass_multi_covar(&x).unwrap();
        for (a, b) in combined.iter().zip(direct.iter()) {
            assert!((a - b).abs() < 1e-5, "expected {b}, got {a}");
        }
    }

    #[test]
    // Purpose
    // -------
    // Ensure counts whose sum does not fit in `usize` fail with a typed
    // error instead of overflowing inside the merge.
    //
    // Given
    // -----
    // - Partitions with counts `usize::MAX` and 1, supplied as matrices and
    //   as already-built partials.
    //
    // Expect
    // ------
    // - `CountOverflow` from `combine_cov_estimates`, `combine_partials`
    //   (both strategies), and `merge_pair`.
    fn combine_rejects_total_count_overflow() {
        // Arrange
        let covs = [array![[1.0]], array![[1.0]]];
        let means = [array![0.0], array![1.0]];
        let huge = PartialCovariance::from_covariance(usize::MAX, array![0.0], array![[1.0]], TOL)
            .unwrap();
        let one = PartialCovariance::from_covariance(1, array![1.0], array![[0.0]], TOL).unwrap();

        // Act / Assert
        assert_eq!(
            combine_cov_estimates(&covs, &means, &[usize::MAX, 1], &CombineOptions::default()),
            Err(CovError::CountOverflow { index: 1 })
        );
        for strategy in [CombineStrategy::Sequential, CombineStrategy::Pairwise] {
            assert_eq!(
                combine_partials(
                    &[huge.clone(), one.clone()],
                    &CombineOptions::new(strategy, TOL, false)
                ),
                Err(CovError::CountOverflow { index: 1 })
            );
        }
        assert_eq!(merge_pair(&huge, &one), Err(CovError::CountOverflow { index: 1 }));
    }
}
