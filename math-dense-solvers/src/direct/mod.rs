//! Direct solvers for dense linear systems
//!
//! This module provides the two factorization-based solvers:
//! - [`lu_solve`]: LU decomposition with partial pivoting
//! - [`qr_solve`]: Householder QR

mod lu;
mod qr;

pub use lu::{LuFactorization, lu_decompose_in_place, lu_factorize, lu_solve};
pub use qr::{QrFactorization, householder_qr, qr_solve};
pub(crate) use qr::householder_qr_with_tolerance;
