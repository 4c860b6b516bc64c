//! Dense solver benchmark
//!
//! Times LU, QR and SVD on a generated test problem over a range of sizes
//! and reports the median time, relative error and residual of each method.
//!
//! Usage:
//!     cargo run --bin slae-bench --release -- --sizes 250,500,1000 --methods lu,qr
//!     cargo run --bin slae-bench --release -- --problem hilbert-like --sizes 5,8 --methods lu,qr,svd --condition

use clap::{Parser, ValueEnum};
use math_dense_solvers::benchmark::{
    BenchmarkConfig, Method, print_table, run_benchmark, save_json, write_csv,
};
use math_dense_solvers::problems::ProblemKind;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(
    name = "slae-bench",
    about = "Compare dense LU, QR and SVD solvers on accuracy and run time"
)]
struct Cli {
    /// JSON configuration file; command line options override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Comma separated matrix sizes
    #[arg(long, value_delimiter = ',')]
    sizes: Option<Vec<usize>>,

    /// Timed repetitions per size and method
    #[arg(long)]
    repetitions: Option<usize>,

    /// Comma separated solver methods
    #[arg(long, value_enum, value_delimiter = ',')]
    methods: Option<Vec<MethodChoice>>,

    /// Test problem
    #[arg(long, value_enum)]
    problem: Option<ProblemChoice>,

    /// Seed for the random problem
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Run the SVD eigen solve for a fixed number of sweeps
    #[arg(long)]
    eigen_iterations: Option<usize>,

    /// Also report the condition number of each matrix
    #[arg(long)]
    condition: bool,

    /// Write the report as JSON
    #[arg(long)]
    output_json: Option<PathBuf>,

    /// Write the report as CSV
    #[arg(long)]
    output_csv: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum MethodChoice {
    Lu,
    Qr,
    Svd,
}

impl From<MethodChoice> for Method {
    fn from(choice: MethodChoice) -> Self {
        match choice {
            MethodChoice::Lu => Method::Lu,
            MethodChoice::Qr => Method::Qr,
            MethodChoice::Svd => Method::Svd,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ProblemChoice {
    DiagonallyDominant,
    HilbertLike,
    Random,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<BenchmarkConfig> {
        let mut config = match &self.config {
            Some(path) => BenchmarkConfig::load(path)?,
            None => BenchmarkConfig::default(),
        };

        if let Some(sizes) = self.sizes {
            config.sizes = sizes;
        }
        if let Some(repetitions) = self.repetitions {
            config.repetitions = repetitions;
        }
        if let Some(methods) = self.methods {
            config.methods = methods.into_iter().map(Method::from).collect();
        }
        if let Some(problem) = self.problem {
            config.problem = match problem {
                ProblemChoice::DiagonallyDominant => ProblemKind::DiagonallyDominant,
                ProblemChoice::HilbertLike => ProblemKind::HilbertLike,
                ProblemChoice::Random => ProblemKind::Random { seed: self.seed },
            };
        }
        if self.eigen_iterations.is_some() {
            config.eigen_iterations = self.eigen_iterations;
        }
        if self.condition {
            config.compute_condition = true;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let output_json = cli.output_json.clone();
    let output_csv = cli.output_csv.clone();
    let config = cli.into_config()?;

    println!("Dense Solver Benchmark");
    println!("======================");
    println!(
        "problem: {}, sizes: {:?}, repetitions: {}",
        config.problem.label(),
        config.sizes,
        config.repetitions
    );
    println!();

    let start = Instant::now();
    let records = run_benchmark(&config)?;
    print_table(&records);
    println!("\nTotal time: {:.2} s", start.elapsed().as_secs_f64());

    if let Some(path) = output_json {
        save_json(&records, &path)?;
        println!("Results saved to {}", path.display());
    }
    if let Some(path) = output_csv {
        let file = File::create(&path)?;
        write_csv(&records, BufWriter::new(file))?;
        println!("Results saved to {}", path.display());
    }

    let failures = records.iter().filter(|r| r.failure.is_some()).count();
    if failures > 0 {
        log::warn!("{} of {} runs failed", failures, records.len());
    }

    Ok(())
}
