//! Singular value decomposition through the eigenvectors of AᵗA
//!
//! For an m×n matrix A with k = min(m, n):
//!
//! 1. AᵗA = V Λ Vᵗ by QR iteration ([`symmetric_eigen`]).
//! 2. σ_i = sqrt(|λ_i|) (the absolute value absorbs tiny negative rounding).
//! 3. Optionally σ_j ← ‖A v_j‖, see [`SvdConfig::refine_singular_values`].
//! 4. u_j = A v_j / σ_j for σ_j above a floor, then Gram-Schmidt on U.
//!
//! No bidiagonalization is involved. Solving uses a truncated
//! pseudo-inverse: components whose singular value falls below a relative
//! threshold are dropped instead of being divided by a near-zero number.

use crate::error::{LinalgError, Result};
use crate::matrix::{Matrix, Vector, ensure_len, gram, swap_columns, transpose};
use crate::spectral::eigen::{EigenConfig, symmetric_eigen};
use crate::traits::{LinearSolver, RealField};
use ndarray::{Array1, Array2, Axis};

/// Singular values at or below this floor get a zero left singular vector.
const SINGULAR_VALUE_FLOOR: f64 = 1e-14;

/// Default relative cut-off for the truncated pseudo-inverse, scaled by
/// max(S) · max(m, n).
pub const DEFAULT_TRUNCATION: f64 = 1e-10;

/// Singular values at or below this are treated as exact zeros by
/// [`SvdDecomposition::condition_number`].
pub const CONDITION_ZERO_TOLERANCE: f64 = 1e-12;

/// SVD configuration
#[derive(Debug, Clone)]
pub struct SvdConfig {
    /// Configuration of the inner eigen solve on AᵗA
    pub eigen: EigenConfig,
    /// Recompute each singular value as ‖A v_j‖ instead of sqrt(|λ_j|).
    ///
    /// Squaring A puts a floor of about sqrt(ε)·σ_max on the singular values
    /// that can be read from AᵗA; a null vector of A typically shows up as
    /// σ ≈ 1e-8·σ_max. The column norm of A v_j resolves it down to ε·σ_max.
    pub refine_singular_values: bool,
}

impl Default for SvdConfig {
    fn default() -> Self {
        Self {
            eigen: EigenConfig::default(),
            refine_singular_values: true,
        }
    }
}

impl SvdConfig {
    /// Plain eigen-based construction with a fixed number of QR sweeps
    pub fn fixed(iterations: usize) -> Self {
        Self {
            eigen: EigenConfig::fixed(iterations),
            refine_singular_values: false,
        }
    }
}

/// SVD result: A ≈ U · diag(S) · Vt
#[derive(Debug, Clone)]
pub struct SvdDecomposition<T: RealField> {
    /// Left singular vectors, m × k, orthonormal columns (zero columns for
    /// singular values below the floor)
    pub u: Matrix<T>,
    /// Singular values, length k, descending
    pub s: Vector<T>,
    /// Right singular vectors transposed, n × n (rows are vᵢᵗ)
    pub vt: Matrix<T>,
    /// QR sweeps used by the inner eigen solve
    pub iterations: usize,
}

impl<T: RealField> SvdDecomposition<T> {
    /// Number of rows of A
    pub fn num_rows(&self) -> usize {
        self.u.nrows()
    }

    /// Number of columns of A
    pub fn num_cols(&self) -> usize {
        self.vt.ncols()
    }

    /// Largest singular value (0 when there are none)
    pub fn max_singular_value(&self) -> T {
        self.s.iter().fold(T::zero(), |acc, &v| acc.max(v))
    }

    /// Absolute cut-off `max(S) · max(m, n) · relative_tolerance`
    pub fn threshold(&self, relative_tolerance: T) -> T {
        let dim = self.num_rows().max(self.num_cols());
        self.max_singular_value() * T::from_usize(dim) * relative_tolerance
    }

    /// Number of singular values above the default truncation threshold
    pub fn rank(&self) -> usize {
        let threshold = self.threshold(T::from_real(DEFAULT_TRUNCATION));
        self.s.iter().filter(|&&v| v > threshold).count()
    }

    /// σ_max / σ_min, `+∞` when the smallest singular value is zero.
    ///
    /// Singular values at or below [`CONDITION_ZERO_TOLERANCE`] count as
    /// zero, so any rank-deficient matrix reports an infinite condition
    /// number.
    pub fn condition_number(&self) -> T {
        if self.s.is_empty() {
            return T::infinity();
        }
        let sigma_max = self.max_singular_value();
        let sigma_min = self.s.iter().fold(T::infinity(), |acc, &v| acc.min(v));
        if sigma_min <= T::from_real(CONDITION_ZERO_TOLERANCE) {
            T::infinity()
        } else {
            sigma_max / sigma_min
        }
    }

    /// Solve Ax = f with the default truncation threshold
    pub fn solve(&self, f: &Vector<T>) -> Result<Vector<T>> {
        self.solve_truncated(f, T::from_real(DEFAULT_TRUNCATION))
    }

    /// Truncated pseudo-inverse solve.
    ///
    /// Components of Uᵗf whose singular value is at or below
    /// `max(S) · max(m, n) · relative_tolerance` are set to zero.
    pub fn solve_truncated(&self, f: &Vector<T>, relative_tolerance: T) -> Result<Vector<T>> {
        let m = self.num_rows();
        let n = self.num_cols();
        let k = self.s.len();
        ensure_len(f, m)?;

        // y = Uᵗ f
        let mut y: Vector<T> = Array1::zeros(k);
        for i in 0..k {
            let mut sum = T::zero();
            for j in 0..m {
                sum += self.u[[j, i]] * f[j];
            }
            y[i] = sum;
        }

        // y = diag(S)⁺ y
        let threshold = self.threshold(relative_tolerance);
        let mut dropped = 0;
        for i in 0..k {
            if self.s[i] > threshold {
                y[i] /= self.s[i];
            } else {
                y[i] = T::zero();
                dropped += 1;
            }
        }
        if dropped > 0 {
            log::debug!(
                "SVD solve: truncated {} of {} singular values below {:.3e}",
                dropped,
                k,
                threshold.to_real()
            );
        }

        // x = V y
        let mut x: Vector<T> = Array1::zeros(n);
        for i in 0..n {
            let mut sum = T::zero();
            for j in 0..k {
                sum += self.vt[[j, i]] * y[j];
            }
            x[i] = sum;
        }
        Ok(x)
    }

    /// U · diag(S) · Vt (m × n)
    pub fn reconstruct(&self) -> Matrix<T> {
        let k = self.s.len();
        let mut us = self.u.clone();
        for (j, mut col) in us.axis_iter_mut(Axis(1)).enumerate() {
            col.mapv_inplace(|v| v * self.s[j]);
        }
        us.dot(&self.vt.slice(ndarray::s![..k, ..]))
    }
}

impl<T: RealField> LinearSolver<T> for SvdDecomposition<T> {
    fn name(&self) -> &'static str {
        "SVD"
    }

    fn num_rows(&self) -> usize {
        SvdDecomposition::num_rows(self)
    }

    fn num_cols(&self) -> usize {
        SvdDecomposition::num_cols(self)
    }

    fn solve(&self, f: &Vector<T>) -> Result<Vector<T>> {
        SvdDecomposition::solve(self, f)
    }
}

/// Compute the SVD of an m×n matrix from the eigendecomposition of AᵗA
pub fn svd_decompose<T: RealField>(a: &Matrix<T>, config: &SvdConfig) -> Result<SvdDecomposition<T>> {
    let (m, n) = a.dim();
    if m == 0 || n == 0 {
        return Err(LinalgError::EmptyMatrix);
    }
    let k = m.min(n);

    let eig = symmetric_eigen(&gram(a), &config.eigen)?;
    let mut v = eig.vectors;
    let mut s: Vector<T> = Array1::from_iter((0..k).map(|i| eig.values[i].abs().sqrt()));

    // W = A V, column j is σ_j u_j
    let mut w = a.dot(&v);

    if config.refine_singular_values {
        for j in 0..k {
            s[j] = column_norm(&w, j);
        }
        // Refinement only moves values at rounding level, but keep the order
        for i in 0..k {
            for j in (i + 1)..k {
                if s[i] < s[j] {
                    s.swap(i, j);
                    swap_columns(&mut v, i, j);
                    swap_columns(&mut w, i, j);
                }
            }
        }
    }

    let floor = T::from_real(SINGULAR_VALUE_FLOOR);
    let mut u: Matrix<T> = Array2::zeros((m, k));
    for j in 0..k {
        if s[j] > floor {
            for i in 0..m {
                u[[i, j]] = w[[i, j]] / s[j];
            }
        }
    }
    orthonormalize_columns(&mut u, floor);

    Ok(SvdDecomposition {
        u,
        s,
        vt: transpose(&v),
        iterations: eig.iterations,
    })
}

/// Solve Ax = f through the truncated SVD pseudo-inverse
pub fn svd_solve<T: RealField>(a: &Matrix<T>, f: &Vector<T>) -> Result<Vector<T>> {
    ensure_len(f, a.nrows())?;
    svd_decompose(a, &SvdConfig::default())?.solve(f)
}

/// Modified Gram-Schmidt on the columns of `u`.
///
/// Projections onto the already processed columns are removed first and the
/// remainder is normalized; zero (or vanishing) columns stay zero.
fn orthonormalize_columns<T: RealField>(u: &mut Matrix<T>, floor: T) {
    let (m, k) = u.dim();
    for j in 0..k {
        for p in 0..j {
            let mut dot = T::zero();
            for i in 0..m {
                dot += u[[i, p]] * u[[i, j]];
            }
            for i in 0..m {
                let up = u[[i, p]];
                u[[i, j]] -= dot * up;
            }
        }

        let norm = column_norm(u, j);
        if norm > floor {
            for i in 0..m {
                u[[i, j]] /= norm;
            }
        } else {
            u.column_mut(j).fill(T::zero());
        }
    }
}

fn column_norm<T: RealField>(a: &Matrix<T>, j: usize) -> T {
    a.column(j).iter().fold(T::zero(), |acc, &v| acc + v * v).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::max_orthogonality_error;
    use crate::matrix::frobenius_norm;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn relative_reconstruction_error(a: &Matrix<f64>, svd: &SvdDecomposition<f64>) -> f64 {
        frobenius_norm(&(&svd.reconstruct() - a)) / frobenius_norm(a)
    }

    #[test]
    fn test_svd_diagonal() {
        let a = array![[3.0_f64, 0.0], [0.0, -5.0]];
        let svd = svd_decompose(&a, &SvdConfig::default()).unwrap();

        assert_relative_eq!(svd.s[0], 5.0, epsilon = 1e-12);
        assert_relative_eq!(svd.s[1], 3.0, epsilon = 1e-12);
        assert!(relative_reconstruction_error(&a, &svd) < 1e-12);
        assert_relative_eq!(svd.condition_number(), 5.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_svd_reconstruction_square() {
        let a = array![[100.0_f64, 4.0, 5.0], [4.0, 100.0, 6.0], [5.0, 6.0, 100.0]];
        let svd = svd_decompose(&a, &SvdConfig::default()).unwrap();

        assert!(relative_reconstruction_error(&a, &svd) < 1e-8);
        assert!(max_orthogonality_error(&svd.u) < 1e-10);
        assert!(max_orthogonality_error(&svd.vt) < 1e-10);
        for i in 1..3 {
            assert!(svd.s[i - 1] >= svd.s[i]);
        }
    }

    #[test]
    fn test_svd_rectangular_tall() {
        let a = array![[1.0_f64, 2.0, 0.0], [0.0, 1.0, 1.0], [1.0, 0.0, 1.0], [2.0, 1.0, 3.0]];
        let svd = svd_decompose(&a, &SvdConfig::default()).unwrap();

        assert_eq!(svd.u.dim(), (4, 3));
        assert_eq!(svd.s.len(), 3);
        assert_eq!(svd.vt.dim(), (3, 3));
        assert!(relative_reconstruction_error(&a, &svd) < 1e-8);
        assert_eq!(svd.rank(), 3);
    }

    #[test]
    fn test_svd_rectangular_wide() {
        let a = array![[1.0_f64, 0.0, 2.0], [0.0, 3.0, 0.0]];
        let svd = svd_decompose(&a, &SvdConfig::default()).unwrap();

        assert_eq!(svd.u.dim(), (2, 2));
        assert_eq!(svd.s.len(), 2);
        assert_eq!(svd.vt.dim(), (3, 3));
        assert_relative_eq!(svd.s[0], 3.0, epsilon = 1e-10);
        assert_relative_eq!(svd.s[1], 5.0_f64.sqrt(), epsilon = 1e-10);
        assert!(relative_reconstruction_error(&a, &svd) < 1e-8);

        // Minimum-norm solution of an underdetermined system
        let f = array![5.0_f64, 3.0];
        let x = svd.solve(&f).unwrap();
        let ax = a.dot(&x);
        assert_relative_eq!(ax[0], 5.0, epsilon = 1e-10);
        assert_relative_eq!(ax[1], 3.0, epsilon = 1e-10);
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-10);
        assert_relative_eq!(x[2], 2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_svd_rank_deficient_truncation() {
        // Repeated row: rank 2, null vector (-1, 5, -3)
        let a = array![[1.0_f64, 2.0, 3.0], [1.0, 2.0, 3.0], [4.0, 5.0, 7.0]];
        let svd = svd_decompose(&a, &SvdConfig::default()).unwrap();

        assert_eq!(svd.rank(), 2);
        assert!(svd.s[2] < 1e-12);
        assert!(svd.condition_number().is_infinite());

        let f = array![6.0_f64, 6.0, 16.0];
        let x = svd.solve(&f).unwrap();
        assert!(x.iter().all(|v| v.is_finite()));

        let null = array![-1.0_f64, 5.0, -3.0] / 35.0_f64.sqrt();
        assert!(x.dot(&null).abs() < 1e-10);
        let ax = a.dot(&x);
        for i in 0..3 {
            assert_relative_eq!(ax[i], f[i], epsilon = 1e-10);
        }
    }

    #[test]
    fn test_svd_without_refinement_keeps_sqrt_eigenvalues() {
        let a = array![[2.0_f64, 1.0], [1.0, 2.0]];
        let svd = svd_decompose(&a, &SvdConfig::fixed(50)).unwrap();
        assert_relative_eq!(svd.s[0], 3.0, epsilon = 1e-10);
        assert_relative_eq!(svd.s[1], 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_svd_clustered_singular_values() {
        let a = array![[1.0_f64, 1e-4], [1e-4, 1.0]];
        let svd = svd_decompose(&a, &SvdConfig::default()).expect("well-conditioned input");

        assert_relative_eq!(svd.s[0], 1.0 + 1e-4, epsilon = 1e-12);
        assert_relative_eq!(svd.s[1], 1.0 - 1e-4, epsilon = 1e-12);
        assert_relative_eq!(svd.condition_number(), 1.0001 / 0.9999, epsilon = 1e-10);
        assert!(relative_reconstruction_error(&a, &svd) < 1e-12);

        let x = svd_solve(&a, &array![1.0 + 1e-4, 1.0 + 1e-4]).unwrap();
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_svd_fixed_ten_sweeps_end_to_end() {
        let a = array![[100.0_f64, 4.0, 5.0], [4.0, 100.0, 6.0], [5.0, 6.0, 100.0]];
        let f = array![109.0_f64, 110.0, 111.0];

        let svd = svd_decompose(&a, &SvdConfig::fixed(10)).unwrap();
        assert_eq!(svd.iterations, 10);
        // Ten unshifted sweeps leave the close pair 96.13 / 93.82 mixed
        assert_relative_eq!(svd.s[0], 110.0446, max_relative = 1e-2);
        assert!(max_orthogonality_error(&svd.u) < 1e-12);

        let x = svd.solve(&f).unwrap();
        let err = (x - array![1.0, 1.0, 1.0]).mapv(f64::abs).fold(0.0_f64, |m, &v| m.max(v));
        assert!(err < 1e-2, "max error {:e}", err);

        // The converging default recovers the exact solution
        let x = svd_solve(&a, &f).unwrap();
        for v in x.iter() {
            assert_relative_eq!(*v, 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_svd_solve_dimension_mismatch() {
        let a = array![[1.0_f64, 0.0], [0.0, 1.0]];
        let err = svd_solve(&a, &array![1.0_f64, 2.0, 3.0]).unwrap_err();
        assert!(err.is_dimension_error());
    }

    #[test]
    fn test_orthonormalize_keeps_zero_columns() {
        let mut u = array![[1.0_f64, 0.0, 1.0], [0.0, 0.0, 1.0]];
        orthonormalize_columns(&mut u, 1e-14);
        assert_eq!(u.column(1).to_vec(), vec![0.0, 0.0]);
        assert_relative_eq!(u[[0, 2]], 0.0, epsilon = 1e-15);
        assert_relative_eq!(u[[1, 2]], 1.0, epsilon = 1e-15);
    }
}
