//! Symmetric eigenvalue solver (QR iteration)
//!
//! Each sweep factors the current iterate `A_k = QR` with Householder QR and
//! replaces it with `RQ`, a similarity transform that drives a symmetric
//! matrix towards diagonal form. The running product of the `Q` factors
//! converges to the eigenvectors.
//!
//! Two modes are provided:
//!
//! - Converging (the default): each sweep is shifted by the Wilkinson shift
//!   of the trailing 2×2 block, and the trailing row is deflated once its
//!   coupling to the rest of the active block is negligible. Clustered and
//!   repeated eigenvalues converge in a handful of sweeps.
//! - Fixed ([`EigenConfig::fixed`]): plain unshifted `A ← RQ` for an exact
//!   number of sweeps. The coupling between λ_i > λ_j then decays like
//!   (λ_j/λ_i)^k, so close eigenvalues stay mixed.

use crate::direct::{householder_qr, householder_qr_with_tolerance};
use crate::error::{LinalgError, Result};
use crate::matrix::{
    Matrix, Vector, ensure_square, frobenius_norm, identity, max_abs, swap_columns,
};
use crate::traits::RealField;
use ndarray::{Array1, s};

/// Relative tolerance for the symmetry check on the input.
const SYMMETRY_TOLERANCE: f64 = 1e-10;

/// Eigen solver configuration
#[derive(Debug, Clone)]
pub struct EigenConfig {
    /// Maximum number of QR sweeps
    pub max_iterations: usize,
    /// Relative off-diagonal tolerance ‖offdiag(A_k)‖_F / ‖A‖_F. In the
    /// converging mode the off-diagonal mass dropped by all deflations
    /// together stays below it.
    pub tolerance: f64,
    /// Shift, deflate and fail if the tolerance is never reached. When
    /// false, exactly `max_iterations` unshifted sweeps are run and the
    /// result is accepted as is.
    pub check_convergence: bool,
    /// Log progress every N sweeps (0 = no output)
    pub print_interval: usize,
}

impl Default for EigenConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            tolerance: 1e-13,
            check_convergence: true,
            print_interval: 0,
        }
    }
}

impl EigenConfig {
    /// Run exactly `iterations` unshifted sweeps without any convergence test.
    ///
    /// The output is a deterministic function of the input, at the cost of
    /// accepting whatever off-diagonal mass is left.
    pub fn fixed(iterations: usize) -> Self {
        Self {
            max_iterations: iterations,
            tolerance: 0.0,
            check_convergence: false,
            print_interval: 0,
        }
    }
}

/// Eigen solver result
#[derive(Debug, Clone)]
pub struct EigenDecomposition<T: RealField> {
    /// Eigenvalues in descending order
    pub values: Vector<T>,
    /// Eigenvectors, column `j` belongs to `values[j]`
    pub vectors: Matrix<T>,
    /// Number of QR sweeps performed
    pub iterations: usize,
    /// Final relative off-diagonal norm
    pub residual: T,
    /// Whether the residual reached the configured tolerance
    pub converged: bool,
}

/// Compute eigenvalues and eigenvectors of a symmetric matrix by QR iteration.
///
/// Returns `EigenvalueNotConverged` only when `config.check_convergence` is
/// set; with [`EigenConfig::fixed`] the iterate after the last sweep is
/// always accepted.
pub fn symmetric_eigen<T: RealField>(
    a: &Matrix<T>,
    config: &EigenConfig,
) -> Result<EigenDecomposition<T>> {
    let n = ensure_square(a)?;
    check_symmetric(a)?;

    let (ak, mut vectors, iterations, residual) = if config.check_convergence {
        shifted_iteration(a, config)?
    } else {
        unshifted_iteration(a, config)?
    };
    let converged = residual <= T::from_real(config.tolerance);

    let mut values: Vector<T> = Array1::from_iter((0..n).map(|i| ak[[i, i]]));
    sort_descending(&mut values, &mut vectors);

    Ok(EigenDecomposition {
        values,
        vectors,
        iterations,
        residual,
        converged,
    })
}

type Iterate<T> = (Matrix<T>, Matrix<T>, usize, T);

/// Wilkinson-shifted QR sweeps with deflation of the trailing row
fn shifted_iteration<T: RealField>(a: &Matrix<T>, config: &EigenConfig) -> Result<Iterate<T>> {
    let n = a.nrows();
    let norm = frobenius_norm(a);
    // Every deflated row is counted twice (row and mirrored column)
    let threshold = T::from_real(config.tolerance) * norm / T::from_usize(2 * n).sqrt();

    let mut ak = a.clone();
    let mut vectors = identity::<T>(n);
    let mut dropped = T::zero();
    let mut active = n;
    let mut iterations = 0;

    while active > 1 {
        let last = active - 1;
        let coupling = (0..last)
            .fold(T::zero(), |acc, j| acc + ak[[last, j]] * ak[[last, j]])
            .sqrt();

        if coupling <= threshold {
            dropped += coupling * coupling;
            for j in 0..last {
                ak[[last, j]] = T::zero();
                ak[[j, last]] = T::zero();
            }
            active = last;
            continue;
        }

        if iterations == config.max_iterations {
            return Err(LinalgError::EigenvalueNotConverged {
                iterations,
                residual: relative_off_diagonal(&ak).to_real(),
            });
        }

        let shift = wilkinson_shift(&ak, active);
        let mut block = ak.slice(s![..active, ..active]).to_owned();
        for i in 0..active {
            block[[i, i]] -= shift;
        }
        // Skip only exactly vanishing columns: deflating blocks can sit far
        // below the absolute cut-off of `householder_qr`
        let qr = householder_qr_with_tolerance(&block, T::zero())?;
        let mut next = qr.r.dot(&qr.q);
        for i in 0..active {
            next[[i, i]] += shift;
        }
        symmetrize(&mut next);
        ak.slice_mut(s![..active, ..active]).assign(&next);

        let rotated = vectors.slice(s![.., ..active]).dot(&qr.q);
        vectors.slice_mut(s![.., ..active]).assign(&rotated);
        iterations += 1;

        if config.print_interval > 0 && iterations % config.print_interval == 0 {
            log::debug!(
                "QR iteration {}: {} of {} eigenvalues deflated, trailing coupling = {:.6e}",
                iterations,
                n - active,
                n,
                coupling.to_real()
            );
        }
    }

    let residual = if norm == T::zero() {
        T::zero()
    } else {
        (dropped * T::from_real(2.0)).sqrt() / norm
    };
    Ok((ak, vectors, iterations, residual))
}

/// Exactly `max_iterations` plain `A ← RQ` sweeps
fn unshifted_iteration<T: RealField>(a: &Matrix<T>, config: &EigenConfig) -> Result<Iterate<T>> {
    let n = a.nrows();
    let mut ak = a.clone();
    let mut vectors = identity::<T>(n);
    let mut residual = relative_off_diagonal(&ak);

    for iter in 0..config.max_iterations {
        let qr = householder_qr(&ak)?;
        ak = qr.r.dot(&qr.q);
        vectors = vectors.dot(&qr.q);
        residual = relative_off_diagonal(&ak);

        if config.print_interval > 0 && (iter + 1) % config.print_interval == 0 {
            log::debug!(
                "QR iteration {}: relative off-diagonal norm = {:.6e}",
                iter + 1,
                residual.to_real()
            );
        }
    }

    log::debug!(
        "QR iteration stopped after {} fixed sweeps, relative off-diagonal norm = {:.6e}",
        config.max_iterations,
        residual.to_real()
    );
    Ok((ak, vectors, config.max_iterations, residual))
}

/// Eigenvalue of the trailing 2×2 block of `a[..active, ..active]` closer
/// to its last diagonal entry
fn wilkinson_shift<T: RealField>(a: &Matrix<T>, active: usize) -> T {
    let p = a[[active - 2, active - 2]];
    let q = a[[active - 1, active - 1]];
    let b = a[[active - 1, active - 2]];
    if b == T::zero() {
        return q;
    }
    let d = (p - q) / T::from_real(2.0);
    let sign = if d >= T::zero() { T::one() } else { -T::one() };
    q - sign * b * b / (d.abs() + d.hypot(b))
}

/// Average out the rounding asymmetry of an `RQ` product
fn symmetrize<T: RealField>(a: &mut Matrix<T>) {
    let n = a.nrows();
    let half = T::from_real(0.5);
    for i in 0..n {
        for j in (i + 1)..n {
            let v = (a[[i, j]] + a[[j, i]]) * half;
            a[[i, j]] = v;
            a[[j, i]] = v;
        }
    }
}

/// ‖offdiag(A)‖_F / ‖A‖_F, zero for the zero matrix
fn relative_off_diagonal<T: RealField>(a: &Matrix<T>) -> T {
    let mut off = T::zero();
    let mut total = T::zero();
    for ((i, j), &v) in a.indexed_iter() {
        let sq = v * v;
        total += sq;
        if i != j {
            off += sq;
        }
    }
    if total == T::zero() {
        T::zero()
    } else {
        (off / total).sqrt()
    }
}

fn check_symmetric<T: RealField>(a: &Matrix<T>) -> Result<()> {
    let tol = T::from_real(SYMMETRY_TOLERANCE) * max_abs(a);
    let n = a.nrows();
    for i in 0..n {
        for j in (i + 1)..n {
            if (a[[i, j]] - a[[j, i]]).abs() > tol {
                return Err(LinalgError::NotSymmetric { row: i, col: j });
            }
        }
    }
    Ok(())
}

/// Exchange sort, largest first, swapping eigenvector columns alongside
fn sort_descending<T: RealField>(values: &mut Vector<T>, vectors: &mut Matrix<T>) {
    let n = values.len();
    for i in 0..n {
        for j in (i + 1)..n {
            if values[i] < values[j] {
                values.swap(i, j);
                swap_columns(vectors, i, j);
            }
        }
    }
}
