//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - installs the log subscriber
//! - parses CLI arguments
//! - runs the fit pipeline on a CSV or a synthetic scenario
//! - prints reports and writes optional exports

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, DemoArgs, FitArgs, ShowArgs};
use crate::domain::{DemoConfig, FitConfig, FitReport, UncertaintyKind};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `linfit` binary.
pub fn run() -> Result<(), AppError> {
    init_tracing();
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Demo(args) => handle_demo(args),
        Command::Show(args) => handle_show(args),
    }
}

/// Log to stderr so report output on stdout stays clean; `RUST_LOG` overrides the `warn` default.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A second install (e.g. from tests) is harmless; keep the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args)?;
    let run = pipeline::run_fit(&config)?;

    if !run.dataset.row_errors.is_empty() {
        println!(
            "Rows: read={} used={} skipped={}\n",
            run.dataset.rows_read,
            run.dataset.rows_used(),
            run.dataset.row_errors.len()
        );
    }
    print_report(&run.output.report);

    if let Some(path) = &config.export {
        crate::io::export::write_report_json(path, &run.output.report)?;
    }
    Ok(())
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = demo_config_from_args(&args)?;
    let run = pipeline::run_demo(&config)?;

    print_report(&run.output.report);

    if let Some(path) = &config.export {
        crate::io::export::write_report_json(path, &run.output.report)?;
    }
    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let report = crate::io::export::read_report_json(&args.report)?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &FitReport) {
    println!("{}", crate::report::format_fit_summary(report));
    println!("{}", crate::report::format_predictions(&report.predictions));
}

pub fn fit_config_from_args(args: &FitArgs) -> Result<FitConfig, AppError> {
    let uncertainty = match (&args.weight, &args.sigma) {
        (Some(col), _) => Some((col.clone(), UncertaintyKind::Weight)),
        (None, Some(col)) => Some((col.clone(), UncertaintyKind::Sigma)),
        (None, None) => None,
    };

    Ok(FitConfig {
        csv_path: args.input.clone(),
        response: args.response.clone(),
        predictors: args.predictors.clone(),
        uncertainty,
        queries: parse_queries(&args.queries)?,
        significance: args.significance,
        export: args.export.clone(),
    })
}

pub fn demo_config_from_args(args: &DemoArgs) -> Result<DemoConfig, AppError> {
    Ok(DemoConfig {
        scenario: args.scenario,
        seed: args.seed,
        sample_count: args
            .sample_count
            .unwrap_or_else(|| args.scenario.default_sample_count()),
        noise_sigma: args.sigma,
        significance: args.significance,
        queries: parse_queries(&args.queries)?,
        export: args.export.clone(),
    })
}

/// Parse `--query` values: each is a comma-separated list of predictor values.
fn parse_queries(raw: &[String]) -> Result<Vec<Vec<f64>>, AppError> {
    raw.iter()
        .map(|q| {
            q.split(',')
                .map(|part| {
                    let part = part.trim();
                    part.parse::<f64>()
                        .map_err(|_| AppError::new(2, format!("Invalid query value '{part}' in '{q}'")))
                })
                .collect()
        })
        .collect()
}
