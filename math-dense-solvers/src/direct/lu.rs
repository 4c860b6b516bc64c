//! LU decomposition solver
//!
//! LU factorization with partial pivoting for dense square systems. L (unit
//! lower triangular, diagonal implicit) and U are packed into one matrix and
//! the row interchanges are recorded as a permutation vector.

use crate::error::{LinalgError, Result};
use crate::matrix::{Matrix, Vector, ensure_len, ensure_square};
use crate::traits::{LinearSolver, RealField};
use ndarray::Array1;

/// Pivots smaller than this in magnitude are reported as singular.
const PIVOT_TOLERANCE: f64 = 1e-30;

/// LU factorization result
///
/// `lu` holds L strictly below the diagonal and U on and above it.
/// `pivots[i]` is the original row that ended up in row `i`.
#[derive(Debug, Clone)]
pub struct LuFactorization<T: RealField> {
    /// Combined L and U matrices (L is unit lower triangular, stored below diagonal)
    pub lu: Matrix<T>,
    /// Row permutation: row i of `lu` comes from row `pivots[i]` of A
    pub pivots: Vec<usize>,
    /// Matrix dimension
    pub n: usize,
}

impl<T: RealField> LuFactorization<T> {
    /// Solve Ax = f using the pre-computed LU factorization
    pub fn solve(&self, f: &Vector<T>) -> Result<Vector<T>> {
        ensure_len(f, self.n)?;
        let n = self.n;

        // Apply the row permutation: b = P f
        let mut x: Vector<T> = Array1::from_iter(self.pivots.iter().map(|&p| f[p]));

        // Forward substitution: Ly = Pf
        for i in 0..n {
            let mut sum = x[i];
            for j in 0..i {
                sum -= self.lu[[i, j]] * x[j];
            }
            x[i] = sum;
        }

        // Backward substitution: Ux = y
        for i in (0..n).rev() {
            let mut sum = x[i];
            for j in (i + 1)..n {
                sum -= self.lu[[i, j]] * x[j];
            }
            let u_ii = self.lu[[i, i]];
            if u_ii.abs() < T::from_real(PIVOT_TOLERANCE) {
                return Err(LinalgError::SingularMatrix { index: i });
            }
            x[i] = sum / u_ii;
        }

        Ok(x)
    }

    /// Extract the unit lower triangular factor L
    pub fn l(&self) -> Matrix<T> {
        Matrix::from_shape_fn((self.n, self.n), |(i, j)| match i.cmp(&j) {
            std::cmp::Ordering::Greater => self.lu[[i, j]],
            std::cmp::Ordering::Equal => T::one(),
            std::cmp::Ordering::Less => T::zero(),
        })
    }

    /// Extract the upper triangular factor U
    pub fn u(&self) -> Matrix<T> {
        Matrix::from_shape_fn((self.n, self.n), |(i, j)| {
            if i <= j { self.lu[[i, j]] } else { T::zero() }
        })
    }

    /// Determinant of A, read off the U diagonal and the permutation parity
    pub fn determinant(&self) -> T {
        let mut det = (0..self.n).fold(T::one(), |acc, i| acc * self.lu[[i, i]]);
        if permutation_is_odd(&self.pivots) {
            det = -det;
        }
        det
    }
}

impl<T: RealField> LinearSolver<T> for LuFactorization<T> {
    fn name(&self) -> &'static str {
        "LU"
    }

    fn num_rows(&self) -> usize {
        self.n
    }

    fn num_cols(&self) -> usize {
        self.n
    }

    fn solve(&self, f: &Vector<T>) -> Result<Vector<T>> {
        LuFactorization::solve(self, f)
    }
}

/// Factorize `a` in place with partial pivoting and return the row permutation.
///
/// On return `a` holds L below the diagonal and U on and above it. The
/// permutation starts as the identity and is swapped in lock-step with the
/// rows of `a`.
pub fn lu_decompose_in_place<T: RealField>(a: &mut Matrix<T>) -> Result<Vec<usize>> {
    let n = ensure_square(a)?;
    let mut pivots: Vec<usize> = (0..n).collect();

    for k in 0..n {
        // Find pivot
        let mut max_val = a[[k, k]].abs();
        let mut max_row = k;
        for i in (k + 1)..n {
            let val = a[[i, k]].abs();
            if val > max_val {
                max_val = val;
                max_row = i;
            }
        }

        // Check for singularity
        if max_val < T::from_real(PIVOT_TOLERANCE) {
            return Err(LinalgError::SingularMatrix { index: k });
        }

        // Swap rows if needed
        if max_row != k {
            for j in 0..n {
                a.swap([k, j], [max_row, j]);
            }
            pivots.swap(k, max_row);
        }

        // Compute multipliers and eliminate
        let pivot = a[[k, k]];
        for i in (k + 1)..n {
            let mult = a[[i, k]] / pivot;
            a[[i, k]] = mult; // Store multiplier in L part

            for j in (k + 1)..n {
                let update = mult * a[[k, j]];
                a[[i, j]] -= update;
            }
        }
    }

    Ok(pivots)
}

/// Compute LU factorization with partial pivoting on a copy of `a`
pub fn lu_factorize<T: RealField>(a: &Matrix<T>) -> Result<LuFactorization<T>> {
    let mut lu = a.clone();
    let pivots = lu_decompose_in_place(&mut lu)?;
    let n = pivots.len();
    Ok(LuFactorization { lu, pivots, n })
}

/// Solve Ax = f using LU decomposition
///
/// This is a convenience function that combines factorization and solve.
pub fn lu_solve<T: RealField>(a: &Matrix<T>, f: &Vector<T>) -> Result<Vector<T>> {
    let n = ensure_square(a)?;
    ensure_len(f, n)?;
    lu_factorize(a)?.solve(f)
}

fn permutation_is_odd(perm: &[usize]) -> bool {
    let mut seen = vec![false; perm.len()];
    let mut transpositions = 0;
    for start in 0..perm.len() {
        if seen[start] {
            continue;
        }
        let mut len = 0;
        let mut j = start;
        while !seen[j] {
            seen[j] = true;
            j = perm[j];
            len += 1;
        }
        transpositions += len - 1;
    }
    transpositions % 2 == 1
}
