//! Dense direct and spectral solvers for small to medium linear systems
//!
//! This crate solves Ax = f for dense real matrices stored as
//! [`ndarray::Array2`], and compares the methods on accuracy, conditioning
//! and run time.
//!
//! # Features
//!
//! - **Direct Solvers**: LU with partial pivoting, Householder QR
//! - **Spectral Solvers**: unshifted QR-iteration eigen solver for symmetric
//!   matrices, SVD built from the eigenpairs of AᵗA with a truncated
//!   pseudo-inverse solve
//! - **Diagnostics**: condition number, relative error and residual
//! - **Benchmark Harness**: timed runs over matrix sizes with JSON/CSV reports
//! - **Generic Scalar Types**: Works with f64 and f32
//!
//! # Example
//!
//! ```
//! use math_dense_solvers::{condition_number, lu_solve, qr_solve, relative_error};
//! use math_dense_solvers::problems::{diagonally_dominant_matrix, exact_solution, right_hand_side};
//!
//! let a = diagonally_dominant_matrix::<f64>(3);
//! let f = right_hand_side(&a);
//!
//! let x_lu = lu_solve(&a, &f)?;
//! let x_qr = qr_solve(&a, &f)?;
//! assert!(relative_error(&x_lu, &exact_solution(3))? < 1e-12);
//! assert!(relative_error(&x_qr, &x_lu)? < 1e-12);
//! assert!(condition_number(&a)? < 2.0);
//! # Ok::<(), math_dense_solvers::LinalgError>(())
//! ```

pub mod benchmark;
pub mod diagnostics;
pub mod direct;
pub mod error;
pub mod matrix;
pub mod problems;
pub mod spectral;
pub mod traits;

// Re-export main types
pub use error::{LinalgError, Result};
pub use matrix::{Matrix, Vector};
pub use traits::{LinearSolver, RealField};

// Re-export direct solvers
pub use direct::{LuFactorization, QrFactorization, householder_qr, lu_factorize, lu_solve, qr_solve};

// Re-export spectral solvers
pub use spectral::{
    EigenConfig, EigenDecomposition, SvdConfig, SvdDecomposition, svd_decompose, svd_solve,
    symmetric_eigen,
};

// Re-export diagnostics
pub use diagnostics::{condition_number, max_orthogonality_error, relative_error, relative_residual};
