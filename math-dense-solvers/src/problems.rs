//! Test problems with a known exact solution
//!
//! Every generator produces a square matrix; [`right_hand_side`] returns the
//! row sums so that the exact solution is the all-ones vector.

use crate::matrix::{Matrix, Vector};
use crate::traits::RealField;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Which generator to use for a benchmark problem
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProblemKind {
    /// 100 on the diagonal, `1 + (i+1) + (j+1)` elsewhere
    #[default]
    DiagonallyDominant,
    /// `1 / (1 + 0.6 (i+1) + 2 (j+1))`, severely ill-conditioned
    HilbertLike,
    /// Uniform entries in [-1, 1] plus `n` on the diagonal
    Random {
        /// Generator seed
        seed: u64,
    },
}

impl ProblemKind {
    /// Build the n × n matrix for this problem
    pub fn matrix(&self, n: usize) -> Matrix<f64> {
        match *self {
            ProblemKind::DiagonallyDominant => diagonally_dominant_matrix(n),
            ProblemKind::HilbertLike => hilbert_like_matrix(n),
            ProblemKind::Random { seed } => random_diagonally_dominant(n, seed),
        }
    }

    /// Short label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            ProblemKind::DiagonallyDominant => "diagonally-dominant",
            ProblemKind::HilbertLike => "hilbert-like",
            ProblemKind::Random { .. } => "random",
        }
    }
}

/// Strictly diagonally dominant symmetric matrix
///
/// For n = 3 this is `[[100, 4, 5], [4, 100, 6], [5, 6, 100]]`.
pub fn diagonally_dominant_matrix<T: RealField>(n: usize) -> Matrix<T> {
    Array2::from_shape_fn((n, n), |(i, j)| {
        if i == j {
            T::from_real(100.0)
        } else {
            T::from_usize(1 + (i + 1) + (j + 1))
        }
    })
}

/// Hilbert-like matrix `a_ij = 1 / (1 + 0.6 (i+1) + 2 (j+1))`
pub fn hilbert_like_matrix<T: RealField>(n: usize) -> Matrix<T> {
    let row_step = T::from_real(0.6);
    let col_step = T::from_real(2.0);
    Array2::from_shape_fn((n, n), |(i, j)| {
        T::one() / (T::one() + row_step * T::from_usize(i + 1) + col_step * T::from_usize(j + 1))
    })
}

/// Matrix with entries drawn uniformly from [-1, 1)
pub fn random_matrix<R: Rng>(rows: usize, cols: usize, rng: &mut R) -> Matrix<f64> {
    Array2::from_shape_fn((rows, cols), |_| rng.random_range(-1.0..1.0))
}

/// Seeded random matrix made well-conditioned by adding `n` to the diagonal
pub fn random_diagonally_dominant(n: usize, seed: u64) -> Matrix<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut a = random_matrix(n, n, &mut rng);
    for i in 0..n {
        a[[i, i]] += n as f64;
    }
    a
}

/// Row sums of `a`, the right-hand side whose exact solution is all ones
pub fn right_hand_side<T: RealField>(a: &Matrix<T>) -> Vector<T> {
    Array1::from_iter(
        a.rows()
            .into_iter()
            .map(|row| row.iter().fold(T::zero(), |acc, &v| acc + v)),
    )
}

/// The all-ones exact solution matching [`right_hand_side`]
pub fn exact_solution<T: RealField>(n: usize) -> Vector<T> {
    Array1::from_elem(n, T::one())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_diagonally_dominant_3x3() {
        let a: Matrix<f64> = diagonally_dominant_matrix(3);
        assert_eq!(a, array![[100.0, 4.0, 5.0], [4.0, 100.0, 6.0], [5.0, 6.0, 100.0]]);
        assert_eq!(right_hand_side(&a), array![109.0, 110.0, 111.0]);
    }

    #[test]
    fn test_hilbert_like_entries() {
        let a: Matrix<f64> = hilbert_like_matrix(2);
        assert_relative_eq!(a[[0, 0]], 1.0 / 3.6);
        assert_relative_eq!(a[[1, 0]], 1.0 / 4.2);
        assert_relative_eq!(a[[0, 1]], 1.0 / 5.6);
    }

    #[test]
    fn test_random_is_reproducible() {
        let a = random_diagonally_dominant(6, 42);
        let b = random_diagonally_dominant(6, 42);
        let c = random_diagonally_dominant(6, 7);
        assert_eq!(a, b);
        assert_ne!(a, c);
        for i in 0..6 {
            let off: f64 = (0..6).filter(|&j| j != i).map(|j| a[[i, j]].abs()).sum();
            assert!(a[[i, i]] > off);
        }
    }

    #[test]
    fn test_problem_kind_serde() {
        let json = serde_json::to_string(&ProblemKind::HilbertLike).unwrap();
        assert_eq!(json, "\"hilbert-like\"");
        let parsed: ProblemKind = serde_json::from_str(r#"{"random":{"seed":3}}"#).unwrap();
        assert_eq!(parsed, ProblemKind::Random { seed: 3 });
        assert_eq!(ProblemKind::default().label(), "diagonally-dominant");
    }
}
