//! Accuracy of LU, QR and SVD on Hilbert-like matrices of growing size
//!
//! Usage:
//!     cargo run --example hilbert_conditioning --release

use math_dense_solvers::problems::{exact_solution, hilbert_like_matrix, right_hand_side};
use math_dense_solvers::{
    LinalgError, SvdConfig, condition_number, lu_solve, qr_solve, relative_error, svd_decompose,
};

fn main() -> Result<(), LinalgError> {
    env_logger::init();

    println!(
        "{:>4} | {:>10} | {:>10} | {:>10} | {:>10}",
        "N", "Cond", "LU", "QR", "SVD"
    );
    println!("{}", "-".repeat(56));

    for n in 3..=10 {
        let a = hilbert_like_matrix::<f64>(n);
        let f = right_hand_side(&a);
        let x_exact = exact_solution::<f64>(n);

        let cond = condition_number(&a)?;
        let lu = relative_error(&lu_solve(&a, &f)?, &x_exact)?;
        let qr = relative_error(&qr_solve(&a, &f)?, &x_exact)?;
        let svd = svd_decompose(&a, &SvdConfig::default())?;
        let svd_err = relative_error(&svd.solve(&f)?, &x_exact)?;

        println!(
            "{:>4} | {:>10.3e} | {:>10.3e} | {:>10.3e} | {:>10.3e}  (rank {})",
            n,
            cond,
            lu,
            qr,
            svd_err,
            svd.rank()
        );
    }

    Ok(())
}
