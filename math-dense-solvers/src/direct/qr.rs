//! Householder QR solver
//!
//! Computes A = QR for a square matrix with N−1 Householder reflections.
//! R starts as a copy of A and is reduced column by column; Q starts as the
//! identity and accumulates every reflector from the right, so both factors
//! are returned as independent owned matrices.

use crate::error::{LinalgError, Result};
use crate::matrix::{Matrix, Vector, ensure_len, ensure_square, identity};
use crate::traits::{LinearSolver, RealField};
use ndarray::Array1;

/// Sub-columns with a smaller norm are treated as already eliminated.
const COLUMN_NORM_TOLERANCE: f64 = 1e-12;

/// Diagonal entries of R smaller than this are reported as singular.
const DIAGONAL_TOLERANCE: f64 = 1e-30;

/// QR factorization result
#[derive(Debug, Clone)]
pub struct QrFactorization<T: RealField> {
    /// Orthogonal factor (QᵗQ = I up to rounding)
    pub q: Matrix<T>,
    /// Upper triangular factor
    pub r: Matrix<T>,
    /// Number of columns that were skipped because their sub-column vanished
    pub skipped_columns: usize,
}

impl<T: RealField> QrFactorization<T> {
    /// Matrix dimension
    pub fn n(&self) -> usize {
        self.r.nrows()
    }

    /// Solve Ax = f as Rx = Qᵗf
    pub fn solve(&self, f: &Vector<T>) -> Result<Vector<T>> {
        let n = self.n();
        ensure_len(f, n)?;

        // y = Qᵗ f (Q is orthogonal, so its transpose is its inverse)
        let mut y = Array1::zeros(n);
        for i in 0..n {
            let mut sum = T::zero();
            for j in 0..n {
                sum += self.q[[j, i]] * f[j];
            }
            y[i] = sum;
        }

        back_substitute(&self.r, &y)
    }

    /// Product QR, for checking the factorization
    pub fn reconstruct(&self) -> Matrix<T> {
        self.q.dot(&self.r)
    }
}

impl<T: RealField> LinearSolver<T> for QrFactorization<T> {
    fn name(&self) -> &'static str {
        "QR"
    }

    fn num_rows(&self) -> usize {
        self.n()
    }

    fn num_cols(&self) -> usize {
        self.n()
    }

    fn solve(&self, f: &Vector<T>) -> Result<Vector<T>> {
        QrFactorization::solve(self, f)
    }
}

/// Compute A = QR with Householder reflections.
///
/// For each column k < N−1 the reflector is built from the sub-column
/// R[k.., k]. The sign of `alpha` is chosen opposite to R[k][k] so that the
/// leading component of v never suffers cancellation.
pub fn householder_qr<T: RealField>(a: &Matrix<T>) -> Result<QrFactorization<T>> {
    householder_qr_with_tolerance(a, T::from_real(COLUMN_NORM_TOLERANCE))
}

/// Householder QR skipping sub-columns with norm below `column_tolerance`
/// (exactly zero sub-columns are always skipped)
pub(crate) fn householder_qr_with_tolerance<T: RealField>(
    a: &Matrix<T>,
    column_tolerance: T,
) -> Result<QrFactorization<T>> {
    let n = ensure_square(a)?;
    let mut q = identity::<T>(n);
    let mut r = a.clone();
    let mut v = Array1::<T>::zeros(n);
    let mut skipped_columns = 0;
    let two = T::from_real(2.0);

    for k in 0..n.saturating_sub(1) {
        let mut norm_sqr = T::zero();
        for i in k..n {
            norm_sqr += r[[i, k]] * r[[i, k]];
        }
        let norm = norm_sqr.sqrt();

        // Nothing to eliminate, and beta would divide by zero
        if norm < column_tolerance || norm == T::zero() {
            skipped_columns += 1;
            continue;
        }

        // alpha = -sign(r_kk) * norm
        let alpha = if r[[k, k]].is_sign_negative() {
            norm
        } else {
            -norm
        };

        let mut v_norm_sqr = T::zero();
        for i in k..n {
            v[i] = if i == k { r[[i, k]] - alpha } else { r[[i, k]] };
            v_norm_sqr += v[i] * v[i];
        }
        let beta = two / v_norm_sqr;

        // R <- (I - beta v vᵗ) R
        for j in k..n {
            let mut dot = T::zero();
            for i in k..n {
                dot += v[i] * r[[i, j]];
            }
            let scale = beta * dot;
            for i in k..n {
                r[[i, j]] -= scale * v[i];
            }
        }

        // Q <- Q (I - beta v vᵗ)
        for j in 0..n {
            let mut dot = T::zero();
            for i in k..n {
                dot += q[[j, i]] * v[i];
            }
            let scale = beta * dot;
            for i in k..n {
                q[[j, i]] -= scale * v[i];
            }
        }
    }

    if skipped_columns > 0 {
        log::debug!(
            "Householder QR: skipped {} of {} columns with vanishing sub-column",
            skipped_columns,
            n.saturating_sub(1)
        );
    }

    Ok(QrFactorization {
        q,
        r,
        skipped_columns,
    })
}

/// Solve Ax = f using Householder QR
pub fn qr_solve<T: RealField>(a: &Matrix<T>, f: &Vector<T>) -> Result<Vector<T>> {
    let n = ensure_square(a)?;
    ensure_len(f, n)?;
    householder_qr(a)?.solve(f)
}

/// Solve Rx = y for upper triangular R
fn back_substitute<T: RealField>(r: &Matrix<T>, y: &Vector<T>) -> Result<Vector<T>> {
    let n = r.nrows();
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= r[[i, j]] * x[j];
        }
        let r_ii = r[[i, i]];
        if r_ii.abs() < T::from_real(DIAGONAL_TOLERANCE) {
            return Err(LinalgError::SingularMatrix { index: i });
        }
        x[i] = sum / r_ii;
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::max_orthogonality_error;
    use approx::assert_relative_eq;
    use ndarray::{Array2, array};

    fn assert_upper_triangular(r: &Array2<f64>, tol: f64) {
        for i in 0..r.nrows() {
            for j in 0..i {
                assert!(
                    r[[i, j]].abs() < tol,
                    "R[{}][{}] = {:e} should vanish",
                    i,
                    j,
                    r[[i, j]]
                );
            }
        }
    }

    #[test]
    fn test_qr_factorization() {
        let a = array![[12.0_f64, -51.0, 4.0], [6.0, 167.0, -68.0], [-4.0, 24.0, -41.0]];
        let qr = householder_qr(&a).expect("QR should succeed");

        assert_upper_triangular(&qr.r, 1e-12);
        assert!(max_orthogonality_error(&qr.q) < 1e-12);

        let prod = qr.reconstruct();
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(prod[[i, j]], a[[i, j]], epsilon = 1e-10);
            }
        }

        // Textbook example: |R| diagonal is (14, 175, 35)
        assert_relative_eq!(qr.r[[0, 0]].abs(), 14.0, epsilon = 1e-10);
        assert_relative_eq!(qr.r[[1, 1]].abs(), 175.0, epsilon = 1e-10);
        assert_relative_eq!(qr.r[[2, 2]].abs(), 35.0, epsilon = 1e-10);
    }

    #[test]
    fn test_qr_solve() {
        let a = array![[4.0_f64, 1.0, 0.0], [1.0, 3.0, 1.0], [0.0, 1.0, 2.0]];
        let b = array![1.0_f64, 2.0, 3.0];

        let x = qr_solve(&a, &b).expect("QR solve should succeed");
        let ax = a.dot(&x);
        for i in 0..3 {
            assert_relative_eq!(ax[i], b[i], epsilon = 1e-10);
        }
    }

    #[test]
    fn test_qr_identity_is_reflected_only() {
        let a = identity::<f64>(4);
        let qr = householder_qr(&a).expect("QR should succeed");

        assert_eq!(qr.skipped_columns, 0);
        for i in 0..4 {
            assert_relative_eq!(qr.r[[i, i]].abs(), 1.0);
        }
        let x = qr.solve(&array![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(x, array![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_qr_skips_zero_column() {
        let a = array![[0.0_f64, 1.0, 2.0], [0.0, 3.0, 1.0], [0.0, 1.0, 5.0]];
        let qr = householder_qr(&a).expect("QR itself never fails on square input");

        assert_eq!(qr.skipped_columns, 1);
        assert!(max_orthogonality_error(&qr.q) < 1e-12);

        let err = qr.solve(&array![1.0, 1.0, 1.0]).unwrap_err();
        assert!(err.is_singular());
    }

    #[test]
    fn test_qr_shape_errors() {
        let rect = Array2::<f64>::zeros((3, 2));
        assert_eq!(
            householder_qr(&rect).unwrap_err(),
            LinalgError::NotSquare { rows: 3, cols: 2 }
        );

        let a = identity::<f64>(2);
        assert!(qr_solve(&a, &array![1.0]).unwrap_err().is_dimension_error());
    }

    #[test]
    fn test_qr_one_by_one() {
        let a = array![[-3.0_f64]];
        let qr = householder_qr(&a).expect("1x1 QR");
        assert_eq!(qr.q, array![[1.0]]);
        let x = qr.solve(&array![6.0]).unwrap();
        assert_relative_eq!(x[0], -2.0);
    }
}
