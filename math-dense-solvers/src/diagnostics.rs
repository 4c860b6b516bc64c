//! Accuracy and conditioning diagnostics
//!
//! These are what the benchmark harness reports next to each solve: the
//! relative error against a known exact solution, the relative residual and
//! the 2-norm condition number estimated from the singular values.

use crate::error::Result;
use crate::matrix::{Matrix, Vector, ensure_len, mat_vec, vector_norm};
use crate::spectral::{SvdConfig, svd_decompose};
use crate::traits::RealField;

/// Condition number σ_max / σ_min of `a`.
///
/// Uses [`svd_decompose`] with the default configuration. Singular values
/// at or below `1e-12` count as zero, so a rank-deficient matrix (for
/// example one with a zero row) returns `+∞`, as does an empty matrix.
pub fn condition_number<T: RealField>(a: &Matrix<T>) -> Result<T> {
    if a.is_empty() {
        return Ok(T::infinity());
    }
    let svd = svd_decompose(a, &SvdConfig::default())?;
    Ok(svd.condition_number())
}

/// Relative error ‖x − x_exact‖₂ / ‖x_exact‖₂.
///
/// Falls back to the absolute error when `x_exact` is the zero vector.
pub fn relative_error<T: RealField>(x: &Vector<T>, x_exact: &Vector<T>) -> Result<T> {
    ensure_len(x, x_exact.len())?;
    let diff = x - x_exact;
    let diff_norm = vector_norm(&diff);
    let exact_norm = vector_norm(x_exact);
    if exact_norm == T::zero() {
        Ok(diff_norm)
    } else {
        Ok(diff_norm / exact_norm)
    }
}

/// Relative residual ‖Ax − f‖₂ / ‖f‖₂ (absolute when f = 0)
pub fn relative_residual<T: RealField>(a: &Matrix<T>, x: &Vector<T>, f: &Vector<T>) -> Result<T> {
    let ax = mat_vec(a, x)?;
    ensure_len(f, ax.len())?;
    relative_error(&ax, f)
}

/// Largest entry of |QᵗQ − I|, i.e. how far the columns of `q` are from
/// orthonormal
pub fn max_orthogonality_error<T: RealField>(q: &Matrix<T>) -> T {
    let qtq = q.t().dot(q);
    let mut max_err = T::zero();
    for ((i, j), &v) in qtq.indexed_iter() {
        let target = if i == j { T::one() } else { T::zero() };
        max_err = max_err.max((v - target).abs());
    }
    max_err
}
