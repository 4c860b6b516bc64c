//! Core traits for the dense solvers
//!
//! - [`RealField`]: scalar types the factorizations operate on
//! - [`LinearSolver`]: a factorized matrix that can solve `Ax = f`

use crate::error::Result;
use ndarray::Array1;
use num_traits::{Float, NumAssign};
use std::fmt::{Debug, Display, LowerExp};

/// Trait for real scalar types used by the factorizations.
///
/// Provided for `f64` (the default everywhere in this crate) and `f32`.
/// Algorithm constants are written as `f64` literals and converted with
/// [`RealField::from_real`].
pub trait RealField:
    Float + NumAssign + Debug + Display + LowerExp + Send + Sync + 'static
{
    /// Convert an `f64` constant into this type
    fn from_real(r: f64) -> Self;

    /// Widen to `f64` (for logging and reports)
    fn to_real(self) -> f64;

    /// Convert a count (matrix dimension) into this type
    fn from_usize(n: usize) -> Self {
        Self::from_real(n as f64)
    }
}

impl RealField for f64 {
    #[inline]
    fn from_real(r: f64) -> Self {
        r
    }

    #[inline]
    fn to_real(self) -> f64 {
        self
    }
}

impl RealField for f32 {
    #[inline]
    fn from_real(r: f64) -> Self {
        r as f32
    }

    #[inline]
    fn to_real(self) -> f64 {
        self as f64
    }
}

/// A factorized matrix that can be used to solve linear systems.
///
/// Implemented by [`LuFactorization`](crate::LuFactorization),
/// [`QrFactorization`](crate::QrFactorization) and
/// [`SvdDecomposition`](crate::SvdDecomposition).
pub trait LinearSolver<T: RealField> {
    /// Short human readable name of the method
    fn name(&self) -> &'static str;

    /// Number of rows of the factorized matrix (expected right-hand side length)
    fn num_rows(&self) -> usize;

    /// Number of columns of the factorized matrix (solution length)
    fn num_cols(&self) -> usize;

    /// Solve `A x = f`
    fn solve(&self, f: &Array1<T>) -> Result<Array1<T>>;
}
