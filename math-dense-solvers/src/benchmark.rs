//! Timing harness for the dense solvers
//!
//! For each matrix size and method the harness builds the test problem,
//! factors and solves it `repetitions` times, and keeps the median wall time
//! together with the error against the known all-ones solution.

use crate::diagnostics::{relative_error, relative_residual};
use crate::direct::{householder_qr, lu_factorize};
use crate::error::Result as LinalgResult;
use crate::matrix::Matrix;
use crate::problems::{ProblemKind, exact_solution, right_hand_side};
use crate::spectral::{SvdConfig, svd_decompose};
use crate::traits::LinearSolver;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt::Write as FmtWrite;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

/// Solver method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// LU with partial pivoting
    Lu,
    /// Householder QR
    Qr,
    /// SVD via QR iteration on AᵗA, truncated pseudo-inverse solve
    Svd,
}

impl Method {
    /// All methods, in report order
    pub const ALL: [Method; 3] = [Method::Lu, Method::Qr, Method::Svd];

    /// Report label
    pub fn label(&self) -> &'static str {
        match self {
            Method::Lu => "LU",
            Method::Qr => "QR",
            Method::Svd => "SVD",
        }
    }

    /// Factorize `a` with this method
    pub fn factorize(
        &self,
        a: &Matrix<f64>,
        svd_config: &SvdConfig,
    ) -> LinalgResult<Box<dyn LinearSolver<f64>>> {
        Ok(match self {
            Method::Lu => Box::new(lu_factorize(a)?),
            Method::Qr => Box::new(householder_qr(a)?),
            Method::Svd => Box::new(svd_decompose(a, svd_config)?),
        })
    }
}

/// Benchmark configuration, loadable from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Matrix sizes to run
    pub sizes: Vec<usize>,
    /// Timed repetitions per (size, method); the median is reported
    pub repetitions: usize,
    /// Methods to run
    pub methods: Vec<Method>,
    /// Test problem generator
    pub problem: ProblemKind,
    /// Run the SVD eigen solve for exactly this many sweeps instead of
    /// iterating to convergence
    pub eigen_iterations: Option<usize>,
    /// Also report the condition number of each matrix (one extra SVD per size)
    pub compute_condition: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            sizes: vec![250, 500, 1000],
            repetitions: 5,
            methods: vec![Method::Lu, Method::Qr],
            problem: ProblemKind::DiagonallyDominant,
            eigen_iterations: None,
            compute_condition: false,
        }
    }
}

impl BenchmarkConfig {
    /// Load a configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: BenchmarkConfig = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Reject configurations that cannot produce a report
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.sizes.is_empty(), "at least one matrix size is required");
        anyhow::ensure!(
            self.sizes.iter().all(|&n| n > 0),
            "matrix sizes must be positive"
        );
        anyhow::ensure!(self.repetitions > 0, "repetitions must be at least 1");
        anyhow::ensure!(!self.methods.is_empty(), "at least one method is required");
        Ok(())
    }

    /// SVD configuration derived from `eigen_iterations`
    pub fn svd_config(&self) -> SvdConfig {
        match self.eigen_iterations {
            Some(iterations) => SvdConfig::fixed(iterations),
            None => SvdConfig::default(),
        }
    }
}

/// One row of the benchmark report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    /// Matrix size N
    pub size: usize,
    /// Problem label
    pub problem: String,
    /// Method label
    pub method: String,
    /// Median factor + solve time in milliseconds
    pub median_ms: f64,
    /// Relative error against the exact solution
    pub error: Option<f64>,
    /// Relative residual ‖Ax − f‖ / ‖f‖
    pub residual: Option<f64>,
    /// Condition number of the matrix, when requested
    pub condition: Option<f64>,
    /// Solver error, if the method failed
    pub failure: Option<String>,
}

/// Median of a set of timings (mean of the two middle values for even counts)
pub fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    }
}

/// Run every (size, method) combination of `config`
pub fn run_benchmark(config: &BenchmarkConfig) -> anyhow::Result<Vec<BenchmarkRecord>> {
    config.validate()?;
    let svd_config = config.svd_config();
    let mut records = Vec::with_capacity(config.sizes.len() * config.methods.len());

    for &n in &config.sizes {
        let a = config.problem.matrix(n);
        let f = right_hand_side(&a);
        let x_exact = exact_solution::<f64>(n);

        let condition = if config.compute_condition {
            match svd_decompose(&a, &svd_config) {
                Ok(svd) => Some(svd.condition_number()),
                Err(e) => {
                    log::warn!("N={}: condition number unavailable: {}", n, e);
                    None
                }
            }
        } else {
            None
        };

        for &method in &config.methods {
            log::info!("N={} {}: {} repetitions", n, method.label(), config.repetitions);
            let mut timings = Vec::with_capacity(config.repetitions);
            let mut outcome = None;

            for _ in 0..config.repetitions {
                let start = Instant::now();
                let result = method
                    .factorize(&a, &svd_config)
                    .and_then(|solver| solver.solve(&f));
                timings.push(start.elapsed().as_secs_f64() * 1000.0);
                let failed = result.is_err();
                outcome = Some(result);
                if failed {
                    break;
                }
            }

            let mut record = BenchmarkRecord {
                size: n,
                problem: config.problem.label().to_string(),
                method: method.label().to_string(),
                median_ms: median(&mut timings),
                error: None,
                residual: None,
                condition,
                failure: None,
            };
            match outcome {
                Some(Ok(x)) => {
                    record.error = Some(relative_error(&x, &x_exact)?);
                    record.residual = Some(relative_residual(&a, &x, &f)?);
                }
                Some(Err(e)) => {
                    log::warn!("N={} {} failed: {}", n, method.label(), e);
                    record.failure = Some(e.to_string());
                }
                None => {}
            }
            records.push(record);
        }
    }

    Ok(records)
}

/// Render the report as a fixed-width console table
pub fn format_table(records: &[BenchmarkRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>6} | {:<6} | {:>16} | {:>10} | {:>10} | {:>10}",
        "Size", "Method", "Median Time (ms)", "Error", "Residual", "Cond"
    );
    let _ = writeln!(out, "{}", "-".repeat(74));

    let mut last_size = None;
    for r in records {
        if last_size.is_some_and(|s| s != r.size) {
            let _ = writeln!(out, "{}", "-".repeat(74));
        }
        last_size = Some(r.size);

        let cond = r.condition.map_or_else(|| "-".to_string(), |c| format!("{:.3e}", c));
        match &r.failure {
            Some(msg) => {
                let _ = writeln!(
                    out,
                    "{:>6} | {:<6} | {:>16.3} | {}",
                    r.size, r.method, r.median_ms, msg
                );
            }
            None => {
                let _ = writeln!(
                    out,
                    "{:>6} | {:<6} | {:>16.3} | {:>10.3e} | {:>10.3e} | {:>10}",
                    r.size,
                    r.method,
                    r.median_ms,
                    r.error.unwrap_or(f64::NAN),
                    r.residual.unwrap_or(f64::NAN),
                    cond
                );
            }
        }
    }
    out
}

/// Print the report table to stdout
pub fn print_table(records: &[BenchmarkRecord]) {
    print!("{}", format_table(records));
}

/// Write the report as CSV
pub fn write_csv<W: Write>(records: &[BenchmarkRecord], mut writer: W) -> std::io::Result<()> {
    writeln!(writer, "size,problem,method,median_ms,error,residual,condition,failure")?;
    for r in records {
        writeln!(
            writer,
            "{},{},{},{},{},{},{},{}",
            r.size,
            r.problem,
            r.method,
            r.median_ms,
            optional(r.error),
            optional(r.residual),
            optional(r.condition),
            r.failure.as_deref().unwrap_or("").replace(',', ";")
        )?;
    }
    Ok(())
}

/// Save the report as pretty JSON
pub fn save_json(records: &[BenchmarkRecord], path: impl AsRef<Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json)?;
    Ok(())
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| format!("{:e}", v)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(methods: Vec<Method>, problem: ProblemKind) -> BenchmarkConfig {
        BenchmarkConfig {
            sizes: vec![3, 6],
            repetitions: 3,
            methods,
            problem,
            eigen_iterations: None,
            compute_condition: true,
        }
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&mut [5.0, 1.0, 3.0]), 3.0);
        assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), 2.5);
        assert!(median(&mut []).is_nan());
    }

    #[test]
    fn test_run_benchmark_all_methods() {
        let config = small_config(Method::ALL.to_vec(), ProblemKind::DiagonallyDominant);
        let records = run_benchmark(&config).expect("benchmark should run");

        assert_eq!(records.len(), 6);
        for r in &records {
            assert!(r.failure.is_none(), "{} failed: {:?}", r.method, r.failure);
            assert!(r.error.unwrap() < 1e-9, "{} error {:?}", r.method, r.error);
            assert!(r.residual.unwrap() < 1e-9);
            assert!(r.condition.unwrap() >= 1.0);
            assert!(r.median_ms >= 0.0);
        }
        assert_eq!(records[0].method, "LU");
        assert_eq!(records[2].method, "SVD");
        assert_eq!(records[3].size, 6);
    }

    #[test]
    fn test_svd_factorize_reports_non_convergence() {
        let mut svd_config = SvdConfig::default();
        svd_config.eigen.max_iterations = 1;
        let a = ProblemKind::DiagonallyDominant.matrix(4);
        let err = Method::Svd.factorize(&a, &svd_config).err().unwrap();
        assert!(err.is_convergence_error());

        // Fixed sweeps never fail
        let solver = Method::Svd.factorize(&a, &SvdConfig::fixed(1)).unwrap();
        assert_eq!(solver.name(), "SVD");
        assert_eq!(solver.num_rows(), 4);
    }

    #[test]
    fn test_svd_method_on_random_problem() {
        let config = BenchmarkConfig {
            sizes: vec![40],
            repetitions: 1,
            methods: vec![Method::Svd],
            problem: ProblemKind::Random { seed: 1 },
            eigen_iterations: None,
            compute_condition: true,
        };
        let records = run_benchmark(&config).unwrap();

        assert_eq!(records.len(), 1);
        assert!(records[0].failure.is_none(), "{:?}", records[0].failure);
        assert!(records[0].residual.unwrap() < 1e-6);
        assert!(records[0].condition.unwrap().is_finite());
    }

    #[test]
    fn test_config_validation() {
        let mut config = BenchmarkConfig::default();
        assert!(config.validate().is_ok());
        config.sizes.clear();
        assert!(config.validate().is_err());

        let config = BenchmarkConfig {
            repetitions: 0,
            ..Default::default()
        };
        assert!(run_benchmark(&config).is_err());
    }

    #[test]
    fn test_config_json_defaults() {
        let config: BenchmarkConfig =
            serde_json::from_str(r#"{"sizes": [10], "methods": ["svd"], "eigen_iterations": 10}"#)
                .unwrap();
        assert_eq!(config.sizes, vec![10]);
        assert_eq!(config.repetitions, 5);
        assert_eq!(config.methods, vec![Method::Svd]);
        assert_eq!(config.problem, ProblemKind::DiagonallyDominant);
        assert!(!config.svd_config().refine_singular_values);
        assert_eq!(config.svd_config().eigen.max_iterations, 10);
    }

    #[test]
    fn test_config_round_trip_file() {
        let dir = std::env::temp_dir().join(format!("slae-bench-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");

        let config = small_config(vec![Method::Qr], ProblemKind::Random { seed: 11 });
        config.save(&path).unwrap();
        let loaded = BenchmarkConfig::load(&path).unwrap();
        assert_eq!(loaded.methods, vec![Method::Qr]);
        assert_eq!(loaded.problem, ProblemKind::Random { seed: 11 });

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_csv_and_table_output() {
        let records = vec![
            BenchmarkRecord {
                size: 3,
                problem: "hilbert-like".to_string(),
                method: "LU".to_string(),
                median_ms: 0.5,
                error: Some(1e-10),
                residual: Some(2e-16),
                condition: None,
                failure: None,
            },
            BenchmarkRecord {
                size: 3,
                problem: "hilbert-like".to_string(),
                method: "QR".to_string(),
                median_ms: 0.7,
                error: None,
                residual: None,
                condition: None,
                failure: Some("matrix is singular, index 2".to_string()),
            },
        ];

        let mut buf = Vec::new();
        write_csv(&records, &mut buf).unwrap();
        let csv = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("size,problem,method"));
        assert_eq!(lines[1], "3,hilbert-like,LU,0.5,1e-10,2e-16,,");
        assert!(lines[2].ends_with("matrix is singular; index 2"));

        let table = format_table(&records);
        assert!(table.contains("Median Time (ms)"));
        assert!(table.contains("matrix is singular"));
    }
}
