//! Command-line parsing for the `linfit` binary.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the regression/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::Scenario;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "linfit",
    version,
    about = "Linear least squares (OLS/WLS) with confidence and prediction intervals"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a CSV dataset, print the coefficient table and intervals, optionally export.
    Fit(FitArgs),
    /// Fit a seeded synthetic scenario with known coefficients.
    Demo(DemoArgs),
    /// Re-print a previously exported report JSON.
    Show(ShowArgs),
}

/// Options for fitting a CSV file.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Input CSV (header row required).
    #[arg(short = 'i', long, value_name = "CSV")]
    pub input: PathBuf,

    /// Response column.
    #[arg(short = 'y', long)]
    pub response: String,

    /// Predictor column (repeat for several predictors).
    #[arg(short = 'x', long = "predictor", required = true)]
    pub predictors: Vec<String>,

    /// Column of inverse-variance weights.
    #[arg(long, conflicts_with = "sigma")]
    pub weight: Option<String>,

    /// Column of per-observation standard deviations (weights are 1/σ²).
    #[arg(long)]
    pub sigma: Option<String>,

    /// Query point as comma-separated predictor values (repeatable).
    #[arg(short = 'q', long = "query", allow_hyphen_values = true)]
    pub queries: Vec<String>,

    /// Significance level α for two-sided intervals.
    #[arg(short = 'a', long, default_value_t = 0.05)]
    pub significance: f64,

    /// Export the fit report to JSON.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Options for the synthetic scenarios.
#[derive(Debug, Parser, Clone)]
pub struct DemoArgs {
    /// Which scenario to generate.
    #[arg(short = 's', long, value_enum, default_value_t = Scenario::Univariate)]
    pub scenario: Scenario,

    /// Random seed for sample generation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of samples (defaults to 100, or 1000 for `multivariate`).
    #[arg(short = 'n', long = "samples")]
    pub sample_count: Option<usize>,

    /// Noise standard deviation.
    #[arg(long, default_value_t = 3.5)]
    pub sigma: f64,

    /// Query point as comma-separated predictor values (repeatable).
    ///
    /// Defaults to the scenario's held-out point.
    #[arg(short = 'q', long = "query", allow_hyphen_values = true)]
    pub queries: Vec<String>,

    /// Significance level α for two-sided intervals.
    #[arg(short = 'a', long, default_value_t = 0.05)]
    pub significance: f64,

    /// Export the fit report to JSON.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Options for re-printing a saved report.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Report JSON produced by `linfit fit --export` or `linfit demo --export`.
    #[arg(long, value_name = "JSON")]
    pub report: PathBuf,
}
