//! Error types for dense factorizations and solves.
//!
//! Shape problems are reported before any arithmetic happens. Numerical
//! failures are reported only where the algorithm can detect them cheaply:
//! exactly zero pivots, and eigenvalue iterations that were asked to converge
//! but did not.

use thiserror::Error;

/// Errors that can occur in the dense solver suite.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinalgError {
    /// The operation needs a square matrix.
    #[error("matrix must be square, got {rows}x{cols}")]
    NotSquare {
        /// Number of rows
        rows: usize,
        /// Number of columns
        cols: usize,
    },

    /// Operand lengths do not line up.
    #[error("matrix dimensions mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// The length required by the other operand
        expected: usize,
        /// The length actually supplied
        got: usize,
    },

    /// A row-by-row matrix literal has rows of different lengths.
    #[error("row {row} has {got} entries, expected {expected}")]
    RaggedRows {
        /// Index of the offending row
        row: usize,
        /// Length of the first row
        expected: usize,
        /// Length of the offending row
        got: usize,
    },

    /// The matrix has no entries.
    #[error("matrix is empty")]
    EmptyMatrix,

    /// A pivot (LU) or diagonal entry of R (QR) vanished.
    #[error("matrix is singular or nearly singular (zero pivot at index {index})")]
    SingularMatrix {
        /// Row/column index of the vanishing pivot
        index: usize,
    },

    /// The eigen solver was given a non-symmetric matrix.
    #[error("matrix is not symmetric: a[{row}][{col}] != a[{col}][{row}]")]
    NotSymmetric {
        /// Row of the first mismatching pair
        row: usize,
        /// Column of the first mismatching pair
        col: usize,
    },

    /// The QR iteration hit its iteration cap with off-diagonal mass left.
    #[error(
        "eigenvalue iteration did not converge after {iterations} iterations \
         (relative off-diagonal norm {residual:.3e})"
    )]
    EigenvalueNotConverged {
        /// Number of QR sweeps performed
        iterations: usize,
        /// Relative off-diagonal Frobenius norm after the last sweep
        residual: f64,
    },
}

/// A specialized `Result` type for the solver suite.
pub type Result<T> = std::result::Result<T, LinalgError>;

impl LinalgError {
    /// Returns `true` for any shape-related error.
    pub fn is_dimension_error(&self) -> bool {
        matches!(
            self,
            LinalgError::NotSquare { .. }
                | LinalgError::DimensionMismatch { .. }
                | LinalgError::RaggedRows { .. }
                | LinalgError::EmptyMatrix
        )
    }

    /// Returns `true` if a pivot or diagonal entry vanished.
    pub fn is_singular(&self) -> bool {
        matches!(self, LinalgError::SingularMatrix { .. })
    }

    /// Returns `true` if an iterative eigen solve stalled.
    pub fn is_convergence_error(&self) -> bool {
        matches!(self, LinalgError::EigenvalueNotConverged { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LinalgError::NotSquare { rows: 3, cols: 2 };
        assert_eq!(err.to_string(), "matrix must be square, got 3x2");
    }

    #[test]
    fn test_convergence_error_display() {
        let err = LinalgError::EigenvalueNotConverged {
            iterations: 10,
            residual: 0.25,
        };
        let msg = err.to_string();
        assert!(msg.contains("10 iterations"));
        assert!(msg.contains("2.500e-1"));
    }

    #[test]
    fn test_classification() {
        let shape = LinalgError::DimensionMismatch {
            expected: 3,
            got: 4,
        };
        let singular = LinalgError::SingularMatrix { index: 2 };

        assert!(shape.is_dimension_error());
        assert!(!shape.is_singular());
        assert!(singular.is_singular());
        assert!(!singular.is_dimension_error());
        assert!(LinalgError::EmptyMatrix.is_dimension_error());
    }
}
