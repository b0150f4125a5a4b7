//! Least squares fitting.
//!
//! Given:
//! - a design matrix `X` (intercept + predictors)
//! - observed responses `y_i`
//! - optional inverse-variance weights `w_i`
//!
//! we solve the weighted normal equations for β, then compute:
//! - residuals `r_i = y_i - x_i^T β`
//! - the residual variance `s² = Σ w_i r_i² / (n - p)`
//!
//! The resulting [`FitResult`] is immutable and is shared read-only by every
//! interval query.

use nalgebra::{DMatrix, DVector};

use crate::domain::CoefficientEstimate;
use crate::error::{RegressionError, Result};
use crate::math::{
    DesignMatrix, QueryPoint, quadratic_form, solve_normal_equations, student_t_critical,
    student_t_two_sided_p,
};

/// Fitted linear model.
#[derive(Debug, Clone)]
pub struct FitResult {
    coefficients: DVector<f64>,
    normal_inverse: DMatrix<f64>,
    residuals: DVector<f64>,
    fitted_values: DVector<f64>,
    residual_variance: f64,
    r_squared: Option<f64>,
    samples: usize,
    weighted: bool,
    rcond: f64,
}

/// Fit `y = Xβ` by (weighted) least squares.
///
/// `weights` are inverse variances, one per observation; `None` is ordinary
/// least squares.
pub fn fit(design: &DesignMatrix, observations: &[f64], weights: Option<&[f64]>) -> Result<FitResult> {
    let n = design.sample_count();
    let p = design.param_count();

    if observations.len() != n {
        return Err(RegressionError::DimensionMismatch {
            context: "observations",
            expected: n,
            found: observations.len(),
        });
    }
    if let Some(index) = observations.iter().position(|v| !v.is_finite()) {
        return Err(RegressionError::NonFinite {
            context: "observations",
            index,
        });
    }
    if let Some(w) = weights {
        validate_weights(w, n)?;
    }

    // n == p fits exactly but leaves nothing to estimate the variance from.
    if n <= p {
        return Err(RegressionError::DegenerateDesign {
            samples: n,
            parameters: p,
        });
    }

    let x = design.as_matrix();
    let y = DVector::from_column_slice(observations);
    let w = weights.map(DVector::from_column_slice);

    let solution = solve_normal_equations(x, &y, w.as_ref())?;

    let fitted_values = x * &solution.coefficients;
    let residuals = &y - &fitted_values;

    let weight_at = |i: usize| w.as_ref().map_or(1.0, |w| w[i]);
    let weighted_sse: f64 = residuals
        .iter()
        .enumerate()
        .map(|(i, r)| weight_at(i) * r * r)
        .sum();
    let residual_variance = weighted_sse / (n - p) as f64;

    let r_squared = {
        let sw: f64 = (0..n).map(weight_at).sum();
        let y_bar = (0..n).map(|i| weight_at(i) * y[i]).sum::<f64>() / sw;
        let tss: f64 = (0..n).map(|i| weight_at(i) * (y[i] - y_bar).powi(2)).sum();
        (tss > 0.0).then(|| 1.0 - weighted_sse / tss)
    };

    tracing::debug!(
        samples = n,
        parameters = p,
        weighted = weights.is_some(),
        residual_variance,
        rcond = solution.rcond,
        "fitted least squares model"
    );

    Ok(FitResult {
        coefficients: solution.coefficients,
        normal_inverse: solution.inverse,
        residuals,
        fitted_values,
        residual_variance,
        r_squared,
        samples: n,
        weighted: weights.is_some(),
        rcond: solution.rcond,
    })
}

fn validate_weights(weights: &[f64], n: usize) -> Result<()> {
    if weights.len() != n {
        return Err(RegressionError::DimensionMismatch {
            context: "weights",
            expected: n,
            found: weights.len(),
        });
    }
    match weights.iter().position(|w| !(w.is_finite() && *w > 0.0)) {
        Some(index) => Err(RegressionError::InvalidWeight {
            index,
            value: weights[index],
        }),
        None => Ok(()),
    }
}

impl FitResult {
    /// Estimated coefficients, intercept first.
    pub fn coefficients(&self) -> &DVector<f64> {
        &self.coefficients
    }

    /// `(X^T W X)^{-1}`.
    pub fn normal_inverse(&self) -> &DMatrix<f64> {
        &self.normal_inverse
    }

    pub fn residuals(&self) -> &DVector<f64> {
        &self.residuals
    }

    pub fn fitted_values(&self) -> &DVector<f64> {
        &self.fitted_values
    }

    /// Residual variance estimate `s²`.
    pub fn residual_variance(&self) -> f64 {
        self.residual_variance
    }

    pub fn residual_std_error(&self) -> f64 {
        self.residual_variance.sqrt()
    }

    /// Weighted coefficient of determination; `None` when the response is constant.
    pub fn r_squared(&self) -> Option<f64> {
        self.r_squared
    }

    pub fn sample_count(&self) -> usize {
        self.samples
    }

    pub fn param_count(&self) -> usize {
        self.coefficients.len()
    }

    /// Residual degrees of freedom `n - p`.
    pub fn degrees_of_freedom(&self) -> usize {
        self.samples - self.coefficients.len()
    }

    pub fn is_weighted(&self) -> bool {
        self.weighted
    }

    /// Reciprocal condition estimate of the equilibrated normal matrix.
    pub fn rcond(&self) -> f64 {
        self.rcond
    }

    /// Leverage `h = q^T (X^T W X)^{-1} q` of a query point.
    pub fn leverage(&self, query: &QueryPoint) -> Result<f64> {
        self.check_query(query)?;
        Ok(quadratic_form(&self.normal_inverse, query.as_vector()))
    }

    /// Point prediction `q^T β`.
    pub fn predict(&self, query: &QueryPoint) -> Result<f64> {
        self.check_query(query)?;
        Ok(query.as_vector().dot(&self.coefficients))
    }

    /// Standard errors `sqrt(s² [(X^T W X)^{-1}]_jj)`.
    pub fn standard_errors(&self) -> DVector<f64> {
        self.normal_inverse
            .diagonal()
            .map(|v| (self.residual_variance * v.max(0.0)).sqrt())
    }

    /// Coefficient table with t statistics, p-values and two-sided intervals.
    pub fn coefficient_estimates(&self, significance: f64) -> Result<Vec<CoefficientEstimate>> {
        let df = self.degrees_of_freedom();
        let t_crit = student_t_critical(df, significance)?;
        let se = self.standard_errors();

        self.coefficients
            .iter()
            .zip(se.iter())
            .map(|(&value, &std_error)| -> Result<CoefficientEstimate> {
                let t_statistic = if std_error > 0.0 {
                    value / std_error
                } else {
                    f64::INFINITY.copysign(value)
                };
                let p_value = student_t_two_sided_p(df, t_statistic)?;
                Ok(CoefficientEstimate {
                    value,
                    std_error,
                    t_statistic,
                    p_value,
                    lower: value - t_crit * std_error,
                    upper: value + t_crit * std_error,
                })
            })
            .collect()
    }

    pub(crate) fn check_query(&self, query: &QueryPoint) -> Result<()> {
        if query.len() != self.param_count() {
            return Err(RegressionError::DimensionMismatch {
                context: "query",
                expected: self.param_count(),
                found: query.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn line_design() -> (DesignMatrix, Vec<f64>) {
        let x: Vec<f64> = (0..8).map(|i| i as f64).collect();
        // y = 1 + 2x with a fixed +-0.5 wobble so residuals are non-zero.
        let y: Vec<f64> = x
            .iter()
            .enumerate()
            .map(|(i, &xi)| 1.0 + 2.0 * xi + if i % 2 == 0 { 0.5 } else { -0.5 })
            .collect();
        (DesignMatrix::build(&[x]).unwrap(), y)
    }

    #[test]
    fn fit_recovers_exact_line() {
        let x = vec![0.0, 1.0, 2.0, 3.0];
        let y: Vec<f64> = x.iter().map(|v| 2.0 + 3.0 * v).collect();
        let design = DesignMatrix::build(&[x]).unwrap();

        let fit = fit(&design, &y, None).unwrap();
        assert!((fit.coefficients()[0] - 2.0).abs() < 1e-10);
        assert!((fit.coefficients()[1] - 3.0).abs() < 1e-10);
        assert!(fit.residual_variance() < 1e-20);
        assert_eq!(fit.degrees_of_freedom(), 2);
        assert!(!fit.is_weighted());
    }

    #[test]
    fn residual_variance_divides_by_degrees_of_freedom() {
        let (design, y) = line_design();
        let fit = fit(&design, &y, None).unwrap();

        let sse: f64 = fit.residuals().iter().map(|r| r * r).sum();
        assert_relative_eq!(fit.residual_variance(), sse / 6.0, max_relative = 1e-12);

        for i in 0..y.len() {
            assert_relative_eq!(fit.fitted_values()[i] + fit.residuals()[i], y[i], max_relative = 1e-12);
        }
    }

    #[test]
    fn weighted_variance_uses_weights() {
        let (design, y) = line_design();
        let w: Vec<f64> = (0..8).map(|i| 1.0 + i as f64).collect();
        let fit = fit(&design, &y, Some(&w)).unwrap();

        let wsse: f64 = fit
            .residuals()
            .iter()
            .zip(w.iter())
            .map(|(r, wi)| wi * r * r)
            .sum();
        assert_relative_eq!(fit.residual_variance(), wsse / 6.0, max_relative = 1e-12);
        assert!(fit.is_weighted());
    }

    #[test]
    fn uniform_weights_reproduce_unweighted_coefficients() {
        let (design, y) = line_design();
        let unweighted = fit(&design, &y, None).unwrap();
        let w = vec![7.25; y.len()];
        let weighted = fit(&design, &y, Some(&w)).unwrap();

        for (a, b) in unweighted.coefficients().iter().zip(weighted.coefficients().iter()) {
            assert_relative_eq!(*a, *b, max_relative = 1e-10);
        }
        // s² scales with the weight, (X^T W X)^{-1} with its reciprocal.
        assert_relative_eq!(
            weighted.residual_variance(),
            7.25 * unweighted.residual_variance(),
            max_relative = 1e-10
        );
    }

    #[test]
    fn square_design_is_degenerate() {
        let design = DesignMatrix::build(&[vec![1.0, 2.0]]).unwrap();
        let err = fit(&design, &[3.0, 5.0], None).unwrap_err();
        assert_eq!(
            err,
            RegressionError::DegenerateDesign {
                samples: 2,
                parameters: 2
            }
        );
    }

    #[test]
    fn rejects_mismatched_observations_and_weights() {
        let (design, y) = line_design();

        let err = fit(&design, &y[..5], None).unwrap_err();
        assert!(matches!(err, RegressionError::DimensionMismatch { context: "observations", .. }));

        let err = fit(&design, &y, Some(&[1.0, 2.0])).unwrap_err();
        assert!(matches!(err, RegressionError::DimensionMismatch { context: "weights", .. }));
    }

    #[test]
    fn rejects_non_positive_and_non_finite_weights() {
        let (design, y) = line_design();
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let mut w = vec![1.0; y.len()];
            w[3] = bad;
            let err = fit(&design, &y, Some(&w)).unwrap_err();
            assert!(
                matches!(err, RegressionError::InvalidWeight { index: 3, .. }),
                "weight {bad} gave {err:?}"
            );
        }
    }

    #[test]
    fn collinear_predictors_are_singular() {
        let x1: Vec<f64> = (0..6).map(|i| i as f64).collect();
        let x2: Vec<f64> = x1.iter().map(|v| 3.0 * v - 1.0).collect();
        let y: Vec<f64> = x1.iter().map(|v| v * v).collect();
        let design = DesignMatrix::build(&[x1, x2]).unwrap();

        let err = fit(&design, &y, None).unwrap_err();
        assert!(matches!(err, RegressionError::SingularDesign { .. }));
    }

    #[test]
    fn constant_predictor_is_singular() {
        let design = DesignMatrix::build(&[vec![2.0; 5]]).unwrap();
        let err = fit(&design, &[1.0, 2.0, 3.0, 4.0, 5.0], None).unwrap_err();
        assert!(matches!(err, RegressionError::SingularDesign { .. }));
    }

    #[test]
    fn coefficient_table_brackets_estimates() {
        let (design, y) = line_design();
        let fit = fit(&design, &y, None).unwrap();
        let table = fit.coefficient_estimates(0.05).unwrap();

        assert_eq!(table.len(), 2);
        for c in &table {
            assert!(c.lower < c.value && c.value < c.upper);
            assert!(c.std_error > 0.0);
            assert!((0.0..=1.0).contains(&c.p_value));
        }
        // The slope is overwhelmingly significant.
        assert!(table[1].p_value < 1e-4);
        assert!(table[1].lower < 2.0 && 2.0 < table[1].upper);
    }

    #[test]
    fn r_squared_is_high_for_near_linear_data() {
        let (design, y) = line_design();
        let fit = fit(&design, &y, None).unwrap();
        let r2 = fit.r_squared().unwrap();
        assert!(r2 > 0.98 && r2 <= 1.0, "r2 = {r2}");
    }
}
