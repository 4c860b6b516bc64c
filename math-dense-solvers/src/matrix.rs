//! Dense matrix and vector helpers
//!
//! Matrices are plain row-major [`ndarray::Array2`] values and vectors are
//! [`ndarray::Array1`]. The helpers here check shapes and return
//! [`LinalgError`] instead of panicking.

use crate::error::{LinalgError, Result};
use crate::traits::RealField;
use ndarray::{Array1, Array2};

/// Dense matrix (rows × columns, row-major)
pub type Matrix<T> = Array2<T>;

/// Dense vector
pub type Vector<T> = Array1<T>;

/// Build a matrix from an ordered sequence of rows.
///
/// All rows must have the same length.
pub fn from_rows<T: RealField>(rows: &[Vec<T>]) -> Result<Matrix<T>> {
    let nrows = rows.len();
    let ncols = rows.first().map_or(0, Vec::len);
    if nrows == 0 || ncols == 0 {
        return Err(LinalgError::EmptyMatrix);
    }

    let mut a = Array2::zeros((nrows, ncols));
    for (i, row) in rows.iter().enumerate() {
        if row.len() != ncols {
            return Err(LinalgError::RaggedRows {
                row: i,
                expected: ncols,
                got: row.len(),
            });
        }
        for (j, &v) in row.iter().enumerate() {
            a[[i, j]] = v;
        }
    }
    Ok(a)
}

/// Identity matrix of size n
pub fn identity<T: RealField>(n: usize) -> Matrix<T> {
    Array2::from_shape_fn((n, n), |(i, j)| if i == j { T::one() } else { T::zero() })
}

/// Owned transpose
pub fn transpose<T: RealField>(a: &Matrix<T>) -> Matrix<T> {
    a.t().to_owned()
}

/// Matrix product C = A B
pub fn multiply<T: RealField>(a: &Matrix<T>, b: &Matrix<T>) -> Result<Matrix<T>> {
    if a.ncols() != b.nrows() {
        return Err(LinalgError::DimensionMismatch {
            expected: a.ncols(),
            got: b.nrows(),
        });
    }
    Ok(a.dot(b))
}

/// Matrix-vector product y = A x
pub fn mat_vec<T: RealField>(a: &Matrix<T>, x: &Vector<T>) -> Result<Vector<T>> {
    if a.ncols() != x.len() {
        return Err(LinalgError::DimensionMismatch {
            expected: a.ncols(),
            got: x.len(),
        });
    }
    Ok(a.dot(x))
}

/// Gram matrix AᵗA.
///
/// Only the upper triangle is accumulated and then mirrored, so the result
/// is exactly symmetric regardless of summation order.
pub fn gram<T: RealField>(a: &Matrix<T>) -> Matrix<T> {
    let n = a.ncols();
    let mut g = Array2::zeros((n, n));
    for i in 0..n {
        for j in i..n {
            let col_i = a.column(i);
            let col_j = a.column(j);
            let mut sum = T::zero();
            for (&x, &y) in col_i.iter().zip(col_j.iter()) {
                sum += x * y;
            }
            g[[i, j]] = sum;
            g[[j, i]] = sum;
        }
    }
    g
}

/// Check that `a` is a non-empty square matrix and return its dimension.
pub fn ensure_square<T>(a: &Matrix<T>) -> Result<usize> {
    let (rows, cols) = a.dim();
    if rows == 0 || cols == 0 {
        return Err(LinalgError::EmptyMatrix);
    }
    if rows != cols {
        return Err(LinalgError::NotSquare { rows, cols });
    }
    Ok(rows)
}

/// Check that a right-hand side has the expected length.
pub fn ensure_len<T>(f: &Vector<T>, expected: usize) -> Result<()> {
    if f.len() != expected {
        return Err(LinalgError::DimensionMismatch {
            expected,
            got: f.len(),
        });
    }
    Ok(())
}

/// Inner product Σ x_i y_i over the common length
#[inline]
pub(crate) fn dot<T: RealField>(x: &Vector<T>, y: &Vector<T>) -> T {
    debug_assert_eq!(x.len(), y.len());
    let mut sum = T::zero();
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        sum += xi * yi;
    }
    sum
}

/// Vector 2-norm
#[inline]
pub fn vector_norm<T: RealField>(x: &Vector<T>) -> T {
    dot(x, x).sqrt()
}

/// Frobenius norm of a matrix
#[inline]
pub fn frobenius_norm<T: RealField>(a: &Matrix<T>) -> T {
    a.iter().fold(T::zero(), |acc, &v| acc + v * v).sqrt()
}

/// Largest absolute entry (0 for an empty matrix)
pub fn max_abs<T: RealField>(a: &Matrix<T>) -> T {
    a.iter().fold(T::zero(), |acc, &v| acc.max(v.abs()))
}

/// Swap two columns in place
pub(crate) fn swap_columns<T: RealField>(a: &mut Matrix<T>, i: usize, j: usize) {
    if i == j {
        return;
    }
    for k in 0..a.nrows() {
        a.swap([k, i], [k, j]);
    }
}
