//! Shared "fit pipeline" logic used by the `fit` and `demo` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! columns -> design matrix -> fit -> coefficient table -> intervals -> report
//!
//! The commands differ only in where the columns come from (CSV vs seeded scenario).

use chrono::Utc;

use crate::data::{SampleData, generate_sample};
use crate::domain::{DemoConfig, FitConfig, FitReport, NamedCoefficient, PredictionRow, Scenario};
use crate::error::AppError;
use crate::estimate::estimate_batch;
use crate::fit::{FitResult, fit};
use crate::io::ingest::{Dataset, load_dataset};
use crate::math::{DesignMatrix, QueryPoint};
use crate::report::coefficient_names;

/// Columns and settings for one regression.
#[derive(Debug, Clone)]
pub struct RegressionInput<'a> {
    /// Where the data came from (CSV path or scenario name).
    pub source: String,
    pub predictor_names: &'a [String],
    /// Predictor columns, in the order of `predictor_names`.
    pub predictors: &'a [Vec<f64>],
    pub observations: &'a [f64],
    pub weights: Option<&'a [f64]>,
    /// Query points as predictor values (intercept excluded).
    pub queries: &'a [Vec<f64>],
    pub significance: f64,
    /// Generating coefficients, when known.
    pub truth: Option<Vec<f64>>,
}

/// The fitted model and its portable report.
#[derive(Debug, Clone)]
pub struct RegressionOutput {
    pub fit: FitResult,
    pub report: FitReport,
}

/// All computed outputs of a `linfit fit` run.
#[derive(Debug, Clone)]
pub struct FitRun {
    pub dataset: Dataset,
    pub output: RegressionOutput,
}

/// All computed outputs of a `linfit demo` run.
#[derive(Debug, Clone)]
pub struct DemoRun {
    pub sample: SampleData,
    pub output: RegressionOutput,
}

/// Fit, tabulate coefficients and estimate intervals at every query.
pub fn run_regression(input: RegressionInput<'_>) -> Result<RegressionOutput, AppError> {
    // 1) Design matrix (intercept + predictors).
    let design = DesignMatrix::build(input.predictors)?;

    // 2) Fit.
    let fitted = fit(&design, input.observations, input.weights)?;

    // 3) Coefficient table.
    let names = coefficient_names(input.predictor_names);
    let coefficients = fitted
        .coefficient_estimates(input.significance)?
        .into_iter()
        .zip(names)
        .map(|(estimate, name)| NamedCoefficient { name, estimate })
        .collect();

    // 4) Intervals at the query points.
    let points = input
        .queries
        .iter()
        .map(|q| design.query(q))
        .collect::<Result<Vec<QueryPoint>, _>>()?;
    let intervals = estimate_batch(&fitted, &points, input.significance)?;
    let predictions = input
        .queries
        .iter()
        .zip(intervals)
        .map(|(q, interval)| PredictionRow {
            predictors: q.clone(),
            interval,
        })
        .collect();

    tracing::info!(
        source = %input.source,
        samples = fitted.sample_count(),
        parameters = fitted.param_count(),
        queries = points.len(),
        "regression complete"
    );

    let report = FitReport {
        tool: "linfit".to_string(),
        generated: Utc::now(),
        source: input.source,
        samples: fitted.sample_count(),
        parameters: fitted.param_count(),
        degrees_of_freedom: fitted.degrees_of_freedom(),
        weighted: fitted.is_weighted(),
        residual_variance: fitted.residual_variance(),
        r_squared: fitted.r_squared(),
        rcond: fitted.rcond(),
        significance: input.significance,
        coefficients,
        predictions,
        truth: input.truth,
    };

    Ok(RegressionOutput { fit: fitted, report })
}

/// Load the CSV named by `config` and run the regression on it.
pub fn run_fit(config: &FitConfig) -> Result<FitRun, AppError> {
    let dataset = load_dataset(config)?;

    let output = run_regression(RegressionInput {
        source: config.csv_path.display().to_string(),
        predictor_names: &dataset.predictor_names,
        predictors: &dataset.predictors,
        observations: &dataset.observations,
        weights: dataset.weights.as_deref(),
        queries: &config.queries,
        significance: config.significance,
        truth: None,
    })?;

    Ok(FitRun { dataset, output })
}

/// Generate the seeded scenario named by `config` and run the regression on it.
///
/// Without explicit queries the scenario's held-out point is estimated.
pub fn run_demo(config: &DemoConfig) -> Result<DemoRun, AppError> {
    let sample = generate_sample(config)?;

    let names = scenario_predictor_names(config.scenario);
    let default_query = [sample.query.clone()];
    let queries: &[Vec<f64>] = if config.queries.is_empty() {
        &default_query
    } else {
        &config.queries
    };

    let output = run_regression(RegressionInput {
        source: format!("scenario:{}", config.scenario.display_name()),
        predictor_names: &names,
        predictors: &sample.predictors,
        observations: &sample.observations,
        weights: sample.weights.as_deref(),
        queries,
        significance: config.significance,
        truth: Some(sample.truth.clone()),
    })?;

    Ok(DemoRun { sample, output })
}

fn scenario_predictor_names(scenario: Scenario) -> Vec<String> {
    match scenario {
        Scenario::Univariate | Scenario::Heteroscedastic => vec!["x".to_string()],
        Scenario::Multivariate => (1..=3).map(|i| format!("x{i}")).collect(),
    }
}
