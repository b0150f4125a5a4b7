//! Seeded synthetic regression data.
//!
//! Every scenario draws from a known linear model so fits can be checked
//! against the generating coefficients:
//!
//! - `univariate`: `y = 10.7 - 5.3 x + ε`, x evenly spaced on [-30, 20]
//! - `multivariate`: `y = 10.7 - 5.3 x1 + 0.3 x2 + 50 x3 + ε`, x drawn uniformly
//! - `heteroscedastic`: the univariate line with a different noise level per
//!   observation, reported as inverse-variance weights

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{DemoConfig, Scenario};
use crate::error::AppError;

/// Intercept shared by all scenarios.
pub const TRUE_INTERCEPT: f64 = 10.7;
/// Slope of the single-predictor scenarios.
pub const TRUE_SLOPE: f64 = -5.3;
/// Slopes of the three-predictor scenario.
pub const TRUE_SLOPES_3D: [f64; 3] = [-5.3, 0.3, 50.0];

/// Range of the evenly spaced predictor.
const UNIVARIATE_RANGE: (f64, f64) = (-30.0, 20.0);
/// Sampling ranges of the three predictors.
const MULTIVARIATE_RANGES: [(f64, f64); 3] = [(-30.0, 20.0), (0.0, 100.0), (-5.0, 5.0)];
/// Per-observation σ is drawn from `noise_sigma * [low, high]`.
const HETERO_SIGMA_FACTORS: (f64, f64) = (0.15, 1.85);

#[derive(Debug, Clone)]
pub struct SampleData {
    /// Predictor columns, in design order.
    pub predictors: Vec<Vec<f64>>,
    pub observations: Vec<f64>,
    /// Inverse-variance weights when the scenario has known per-point noise.
    pub weights: Option<Vec<f64>>,
    /// Generating coefficients, intercept first.
    pub truth: Vec<f64>,
    /// Held-out query point (predictor values only).
    pub query: Vec<f64>,
}

pub fn generate_sample(config: &DemoConfig) -> Result<SampleData, AppError> {
    if config.sample_count < 2 {
        return Err(AppError::new(2, "Sample count must be at least 2."));
    }
    if !(config.noise_sigma.is_finite() && config.noise_sigma > 0.0) {
        return Err(AppError::new(2, "Noise sigma must be finite and > 0."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let n = config.sample_count;

    match config.scenario {
        Scenario::Univariate => {
            let x = linspace(UNIVARIATE_RANGE.0, UNIVARIATE_RANGE.1, n);
            let normal = noise(config.noise_sigma)?;
            let observations = x
                .iter()
                .map(|&xi| TRUE_INTERCEPT + TRUE_SLOPE * xi + normal.sample(&mut rng))
                .collect();
            Ok(SampleData {
                predictors: vec![x],
                observations,
                weights: None,
                truth: vec![TRUE_INTERCEPT, TRUE_SLOPE],
                query: vec![6.0],
            })
        }
        Scenario::Multivariate => {
            let predictors: Vec<Vec<f64>> = MULTIVARIATE_RANGES
                .iter()
                .map(|&(lo, hi)| (0..n).map(|_| rng.gen_range(lo..hi)).collect())
                .collect();
            let normal = noise(config.noise_sigma)?;
            let observations = (0..n)
                .map(|i| {
                    let signal: f64 = TRUE_SLOPES_3D
                        .iter()
                        .zip(predictors.iter())
                        .map(|(b, col)| b * col[i])
                        .sum();
                    TRUE_INTERCEPT + signal + normal.sample(&mut rng)
                })
                .collect();

            let mut truth = vec![TRUE_INTERCEPT];
            truth.extend_from_slice(&TRUE_SLOPES_3D);
            Ok(SampleData {
                predictors,
                observations,
                weights: None,
                truth,
                // Deliberately outside the sampled box so the mean response is uncertain.
                query: vec![40.0, 150.0, 8.0],
            })
        }
        Scenario::Heteroscedastic => {
            let x = linspace(UNIVARIATE_RANGE.0, UNIVARIATE_RANGE.1, n);
            let (lo, hi) = HETERO_SIGMA_FACTORS;
            let standard = noise(1.0)?;

            let mut observations = Vec::with_capacity(n);
            let mut weights = Vec::with_capacity(n);
            for &xi in &x {
                let sigma = config.noise_sigma * rng.gen_range(lo..hi);
                let eps = sigma * standard.sample(&mut rng);
                observations.push(TRUE_INTERCEPT + TRUE_SLOPE * xi + eps);
                weights.push(1.0 / (sigma * sigma));
            }

            Ok(SampleData {
                predictors: vec![x],
                observations,
                weights: Some(weights),
                truth: vec![TRUE_INTERCEPT, TRUE_SLOPE],
                query: vec![6.0],
            })
        }
    }
}

/// `n` evenly spaced points from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

fn noise(sigma: f64) -> Result<Normal<f64>, AppError> {
    Normal::new(0.0, sigma).map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))
}
