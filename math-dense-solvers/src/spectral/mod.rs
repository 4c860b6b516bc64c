//! Spectral decompositions
//!
//! - [`symmetric_eigen`]: unshifted QR iteration for symmetric matrices
//! - [`svd_decompose`]: SVD built from the eigenpairs of AᵗA, with a
//!   truncated pseudo-inverse solve

mod eigen;
mod svd;

pub use eigen::{EigenConfig, EigenDecomposition, symmetric_eigen};
pub use svd::{
    CONDITION_ZERO_TOLERANCE, DEFAULT_TRUNCATION, SvdConfig, SvdDecomposition, svd_decompose,
    svd_solve,
};
