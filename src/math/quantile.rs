//! Student-t critical values and tail probabilities.

use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::error::{RegressionError, Result};

/// Check that a significance level lies strictly inside `(0, 1)`.
pub fn validate_significance(significance: f64) -> Result<()> {
    if significance.is_finite() && significance > 0.0 && significance < 1.0 {
        Ok(())
    } else {
        Err(RegressionError::InvalidSignificance(significance))
    }
}

/// Two-sided critical value `t_{1 - α/2, df}`.
pub fn student_t_critical(degrees_of_freedom: usize, significance: f64) -> Result<f64> {
    validate_significance(significance)?;
    let dist = students_t(degrees_of_freedom)?;
    Ok(dist.inverse_cdf(1.0 - significance / 2.0))
}

/// Two-sided p-value `P(|T| >= |t|)` for a t statistic.
pub fn student_t_two_sided_p(degrees_of_freedom: usize, t: f64) -> Result<f64> {
    let dist = students_t(degrees_of_freedom)?;
    let p = 2.0 * (1.0 - dist.cdf(t.abs()));
    Ok(p.clamp(0.0, 1.0))
}

fn students_t(degrees_of_freedom: usize) -> Result<StudentsT> {
    StudentsT::new(0.0, 1.0, degrees_of_freedom as f64)
        .map_err(|e| RegressionError::Distribution(e.to_string()))
}
