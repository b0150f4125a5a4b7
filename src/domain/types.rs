//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - returned from the regression core
//! - exported to JSON
//! - reloaded later for display

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Point estimate plus confidence and prediction half-widths at one query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntervalResult {
    /// Point prediction `q^T β`.
    pub estimate: f64,
    /// Half-width of the interval for the mean response.
    pub confidence_half_width: f64,
    /// Half-width of the interval for a new individual observation.
    pub prediction_half_width: f64,
    /// Significance level α the half-widths were computed at.
    pub significance: f64,
    /// Leverage `h = q^T (X^T W X)^{-1} q`.
    pub leverage: f64,
    /// Student-t critical value `t_{1 - α/2, n - p}`.
    pub critical_value: f64,
}

impl IntervalResult {
    /// Confidence level `1 - α`.
    pub fn confidence_level(&self) -> f64 {
        1.0 - self.significance
    }

    pub fn confidence_bounds(&self) -> (f64, f64) {
        (
            self.estimate - self.confidence_half_width,
            self.estimate + self.confidence_half_width,
        )
    }

    pub fn prediction_bounds(&self) -> (f64, f64) {
        (
            self.estimate - self.prediction_half_width,
            self.estimate + self.prediction_half_width,
        )
    }
}

/// One row of the coefficient table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoefficientEstimate {
    pub value: f64,
    pub std_error: f64,
    pub t_statistic: f64,
    /// Two-sided p-value for `H0: coefficient = 0`.
    pub p_value: f64,
    pub lower: f64,
    pub upper: f64,
}

/// A named coefficient for reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedCoefficient {
    pub name: String,
    #[serde(flatten)]
    pub estimate: CoefficientEstimate,
}

/// A query point and its intervals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRow {
    /// Predictor values (intercept term excluded).
    pub predictors: Vec<f64>,
    pub interval: IntervalResult,
}

/// Portable summary of a fit (JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    pub tool: String,
    pub generated: DateTime<Utc>,
    /// Where the data came from (CSV path or scenario name).
    pub source: String,
    pub samples: usize,
    pub parameters: usize,
    pub degrees_of_freedom: usize,
    pub weighted: bool,
    pub residual_variance: f64,
    pub r_squared: Option<f64>,
    pub rcond: f64,
    pub significance: f64,
    pub coefficients: Vec<NamedCoefficient>,
    pub predictions: Vec<PredictionRow>,
    /// Generating coefficients, when the data is synthetic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truth: Option<Vec<f64>>,
}

/// How the optional uncertainty column of a CSV is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UncertaintyKind {
    /// Column holds inverse-variance weights `w_i`.
    Weight,
    /// Column holds the standard deviation `σ_i`; weights are `1/σ_i²`.
    Sigma,
}

/// Synthetic data scenario for `linfit demo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    /// One predictor evenly spaced on [-30, 20].
    Univariate,
    /// Three uniformly drawn predictors.
    Multivariate,
    /// One predictor with per-observation noise levels, fitted with weights.
    Heteroscedastic,
}

impl Scenario {
    pub fn display_name(self) -> &'static str {
        match self {
            Scenario::Univariate => "univariate",
            Scenario::Multivariate => "multivariate",
            Scenario::Heteroscedastic => "heteroscedastic",
        }
    }

    /// Default number of samples for the scenario.
    pub fn default_sample_count(self) -> usize {
        match self {
            Scenario::Univariate | Scenario::Heteroscedastic => 100,
            Scenario::Multivariate => 1000,
        }
    }
}

/// Configuration of a `linfit fit` run on a CSV file.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub csv_path: PathBuf,
    pub response: String,
    pub predictors: Vec<String>,
    /// Optional uncertainty column and how to read it.
    pub uncertainty: Option<(String, UncertaintyKind)>,
    /// Query points as predictor values (intercept excluded).
    pub queries: Vec<Vec<f64>>,
    pub significance: f64,
    pub export: Option<PathBuf>,
}

/// Configuration of a `linfit demo` run.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub scenario: Scenario,
    pub seed: u64,
    pub sample_count: usize,
    /// Noise standard deviation (the mean level for the heteroscedastic scenario).
    pub noise_sigma: f64,
    pub significance: f64,
    /// Query points; when empty the scenario's default held-out point is used.
    pub queries: Vec<Vec<f64>>,
    pub export: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_bounds_are_symmetric() {
        let r = IntervalResult {
            estimate: 10.0,
            confidence_half_width: 1.5,
            prediction_half_width: 4.0,
            significance: 0.05,
            leverage: 0.1,
            critical_value: 2.0,
        };
        assert_eq!(r.confidence_bounds(), (8.5, 11.5));
        assert_eq!(r.prediction_bounds(), (6.0, 14.0));
        assert!((r.confidence_level() - 0.95).abs() < 1e-12);
    }
}
