//! Confidence and prediction intervals at query points.
//!
//! For a query `q` and a fit with coefficients β, residual variance `s²` and
//! `(X^T W X)^{-1}`:
//!
//! - point estimate: `ŷ = q^T β`
//! - leverage: `h = q^T (X^T W X)^{-1} q`
//! - critical value: `t = t_{1 - α/2, n - p}`
//! - mean response: `ŷ ± t sqrt(s² h)`
//! - new observation: `ŷ ± t sqrt(s² (1 + h))`
//!
//! The `1` inside the prediction interval is the noise of the new observation
//! itself. For a new observation with known weight `w0` it becomes `1 / w0`.

use rayon::prelude::*;

use crate::domain::IntervalResult;
use crate::error::{RegressionError, Result};
use crate::fit::FitResult;
use crate::math::{QueryPoint, student_t_critical, validate_significance};

/// Estimate the response at `query` with two-sided intervals at `significance`.
pub fn estimate(fit: &FitResult, query: &QueryPoint, significance: f64) -> Result<IntervalResult> {
    estimate_for_weight(fit, query, significance, 1.0)
}

/// Like [`estimate`], for a new observation with inverse-variance weight `query_weight`.
pub fn estimate_for_weight(
    fit: &FitResult,
    query: &QueryPoint,
    significance: f64,
    query_weight: f64,
) -> Result<IntervalResult> {
    validate_significance(significance)?;
    if !(query_weight.is_finite() && query_weight > 0.0) {
        return Err(RegressionError::InvalidQueryWeight(query_weight));
    }
    let critical_value = student_t_critical(fit.degrees_of_freedom(), significance)?;
    interval_at(fit, query, significance, critical_value, query_weight)
}

/// Estimate many queries against one fit, in parallel.
///
/// Results come back in query order. On failure the error of the first failing
/// query (in query order) is returned.
pub fn estimate_batch(
    fit: &FitResult,
    queries: &[QueryPoint],
    significance: f64,
) -> Result<Vec<IntervalResult>> {
    validate_significance(significance)?;
    // The critical value only depends on df and α, so compute it once.
    let critical_value = student_t_critical(fit.degrees_of_freedom(), significance)?;

    let results: Vec<Result<IntervalResult>> = queries
        .par_iter()
        .map(|q| interval_at(fit, q, significance, critical_value, 1.0))
        .collect();
    results.into_iter().collect()
}

fn interval_at(
    fit: &FitResult,
    query: &QueryPoint,
    significance: f64,
    critical_value: f64,
    query_weight: f64,
) -> Result<IntervalResult> {
    let estimate = fit.predict(query)?;
    // Rounding can push h a hair below zero for points at the centroid of a tiny design.
    let leverage = fit.leverage(query)?.max(0.0);
    let s2 = fit.residual_variance();

    let confidence_half_width = critical_value * (s2 * leverage).sqrt();
    let prediction_half_width = critical_value * (s2 * (1.0 / query_weight + leverage)).sqrt();

    tracing::trace!(
        estimate,
        leverage,
        confidence_half_width,
        prediction_half_width,
        "estimated interval"
    );

    Ok(IntervalResult {
        estimate,
        confidence_half_width,
        prediction_half_width,
        significance,
        leverage,
        critical_value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::fit;
    use crate::math::DesignMatrix;
    use approx::assert_relative_eq;

    /// Small fixed dataset: y ≈ 3 - 0.5 x with deterministic noise.
    fn small_fit() -> FitResult {
        let x: Vec<f64> = (0..12).map(|i| i as f64 - 4.0).collect();
        let noise = [0.3, -0.2, 0.5, -0.6, 0.1, 0.0, -0.4, 0.35, -0.15, 0.2, -0.3, 0.25];
        let y: Vec<f64> = x
            .iter()
            .zip(noise.iter())
            .map(|(&xi, &e)| 3.0 - 0.5 * xi + e)
            .collect();
        let design = DesignMatrix::build(&[x]).unwrap();
        fit(&design, &y, None).unwrap()
    }

    #[test]
    fn estimate_matches_closed_form() {
        let fit = small_fit();
        let q = QueryPoint::from_predictors(&[2.5]).unwrap();
        let r = estimate(&fit, &q, 0.05).unwrap();

        let beta = fit.coefficients();
        assert_relative_eq!(r.estimate, beta[0] + 2.5 * beta[1], max_relative = 1e-12);

        let t = student_t_critical(10, 0.05).unwrap();
        let h = fit.leverage(&q).unwrap();
        let s2 = fit.residual_variance();
        assert_relative_eq!(r.critical_value, t, max_relative = 1e-12);
        assert_relative_eq!(r.confidence_half_width, t * (s2 * h).sqrt(), max_relative = 1e-12);
        assert_relative_eq!(r.prediction_half_width, t * (s2 * (1.0 + h)).sqrt(), max_relative = 1e-12);
    }

    #[test]
    fn leverage_matches_simple_regression_formula() {
        // For one predictor: h = 1/n + (x0 - x̄)² / Σ(x - x̄)².
        let fit = small_fit();
        let xs: Vec<f64> = (0..12).map(|i| i as f64 - 4.0).collect();
        let mean = xs.iter().sum::<f64>() / 12.0;
        let sxx: f64 = xs.iter().map(|x| (x - mean).powi(2)).sum();

        for x0 in [-10.0, mean, 0.0, 7.5] {
            let q = QueryPoint::from_predictors(&[x0]).unwrap();
            let expected = 1.0 / 12.0 + (x0 - mean).powi(2) / sxx;
            assert_relative_eq!(fit.leverage(&q).unwrap(), expected, max_relative = 1e-10);
        }
    }

    #[test]
    fn prediction_interval_is_wider_than_confidence_interval() {
        let fit = small_fit();
        for x0 in [-50.0, -4.0, 0.0, 3.5, 100.0] {
            let q = QueryPoint::from_predictors(&[x0]).unwrap();
            for alpha in [0.5, 0.1, 0.05, 0.001] {
                let r = estimate(&fit, &q, alpha).unwrap();
                assert!(
                    r.prediction_half_width > r.confidence_half_width,
                    "x0={x0} alpha={alpha}: {r:?}"
                );
            }
        }
    }

    #[test]
    fn half_widths_grow_as_significance_shrinks() {
        let fit = small_fit();
        let q = QueryPoint::from_predictors(&[1.0]).unwrap();
        let mut prev: Option<IntervalResult> = None;
        for alpha in [0.5, 0.2, 0.1, 0.05, 0.01, 0.001, 1e-6] {
            let r = estimate(&fit, &q, alpha).unwrap();
            if let Some(p) = prev {
                assert!(r.confidence_half_width > p.confidence_half_width);
                assert!(r.prediction_half_width > p.prediction_half_width);
                assert_relative_eq!(r.estimate, p.estimate);
            }
            prev = Some(r);
        }
    }

    #[test]
    fn confidence_interval_is_narrowest_at_the_centroid() {
        let fit = small_fit();
        let mean = (0..12).map(|i| i as f64 - 4.0).sum::<f64>() / 12.0;
        let at_mean = estimate(&fit, &QueryPoint::from_predictors(&[mean]).unwrap(), 0.05).unwrap();
        for x0 in [mean - 3.0, mean + 0.5, mean + 10.0] {
            let r = estimate(&fit, &QueryPoint::from_predictors(&[x0]).unwrap(), 0.05).unwrap();
            assert!(r.confidence_half_width > at_mean.confidence_half_width);
        }
    }

    #[test]
    fn rejects_bad_significance_and_query_length() {
        let fit = small_fit();
        let q = QueryPoint::from_predictors(&[1.0]).unwrap();
        for alpha in [0.0, 1.0, -0.5, 2.0, f64::NAN] {
            let err = estimate(&fit, &q, alpha).unwrap_err();
            assert!(matches!(err, RegressionError::InvalidSignificance(_)));
        }

        let wrong = QueryPoint::new(vec![1.0, 2.0, 3.0]).unwrap();
        let err = estimate(&fit, &wrong, 0.05).unwrap_err();
        assert_eq!(
            err,
            RegressionError::DimensionMismatch {
                context: "query",
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn query_weight_scales_the_new_observation_noise() {
        let fit = small_fit();
        let q = QueryPoint::from_predictors(&[0.0]).unwrap();
        let unit = estimate(&fit, &q, 0.05).unwrap();
        let same = estimate_for_weight(&fit, &q, 0.05, 1.0).unwrap();
        assert_eq!(unit, same);

        let precise = estimate_for_weight(&fit, &q, 0.05, 4.0).unwrap();
        assert_relative_eq!(precise.confidence_half_width, unit.confidence_half_width);
        assert!(precise.prediction_half_width < unit.prediction_half_width);
        let expected = precise.critical_value * (fit.residual_variance() * (0.25 + precise.leverage)).sqrt();
        assert_relative_eq!(precise.prediction_half_width, expected, max_relative = 1e-12);

        for bad in [0.0, -2.0, f64::NAN, f64::INFINITY] {
            let err = estimate_for_weight(&fit, &q, 0.05, bad).unwrap_err();
            assert!(matches!(err, RegressionError::InvalidQueryWeight(_)), "weight {bad} gave {err:?}");
        }
    }

    #[test]
    fn batch_matches_sequential_estimates() {
        let fit = small_fit();
        let queries: Vec<QueryPoint> = (0..64)
            .map(|i| QueryPoint::from_predictors(&[i as f64 * 0.37 - 10.0]).unwrap())
            .collect();

        let batch = estimate_batch(&fit, &queries, 0.1).unwrap();
        assert_eq!(batch.len(), queries.len());
        for (q, r) in queries.iter().zip(batch.iter()) {
            let single = estimate(&fit, q, 0.1).unwrap();
            assert_eq!(*r, single);
        }
    }

    #[test]
    fn batch_reports_first_failing_query() {
        let fit = small_fit();
        let queries = vec![
            QueryPoint::from_predictors(&[1.0]).unwrap(),
            QueryPoint::new(vec![1.0]).unwrap(),
            QueryPoint::new(vec![1.0, 2.0, 3.0]).unwrap(),
        ];
        let err = estimate_batch(&fit, &queries, 0.05).unwrap_err();
        assert!(matches!(err, RegressionError::DimensionMismatch { found: 1, .. }));
    }

    #[test]
    fn concurrent_estimates_share_one_fit() {
        let fit = small_fit();
        let q = QueryPoint::from_predictors(&[2.0]).unwrap();
        let expected = estimate(&fit, &q, 0.05).unwrap();

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| estimate(&fit, &q, 0.05).unwrap()))
                .collect();
            for h in handles {
                assert_eq!(h.join().unwrap(), expected);
            }
        });
    }
}
