//! Error types.
//!
//! The regression core reports failures as a typed [`RegressionError`]. The
//! binary converts those into [`AppError`], which carries a process exit code.

use thiserror::Error;

/// Failures of design construction, fitting, or interval estimation.
///
/// Every variant is deterministic: retrying the same call fails the same way.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegressionError {
    /// Mismatched vector/matrix lengths (predictors, observations, weights, query).
    #[error("Dimension mismatch for {context}: expected {expected}, found {found}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    /// Fewer samples than parameters.
    #[error("Not enough samples: {samples} samples for {parameters} parameters")]
    InsufficientSamples { samples: usize, parameters: usize },

    /// A weight that is zero, negative, or not finite.
    #[error("Invalid weight {value} at index {index}: weights must be finite and > 0")]
    InvalidWeight { index: usize, value: f64 },

    /// Weight of a new observation at a query point that is zero, negative, or not finite.
    #[error("Invalid query weight {0}: the new observation's weight must be finite and > 0")]
    InvalidQueryWeight(f64),

    /// Zero residual degrees of freedom (n == p).
    #[error("Degenerate design: {samples} samples for {parameters} parameters leaves no degrees of freedom")]
    DegenerateDesign { samples: usize, parameters: usize },

    /// Rank-deficient or numerically unstable normal-equations matrix.
    #[error("Normal equations matrix is singular or ill-conditioned (rcond {rcond:.3e}); predictors may be collinear")]
    SingularDesign { rcond: f64 },

    /// Significance level outside the open interval (0, 1).
    #[error("Significance must lie strictly between 0 and 1, got {0}")]
    InvalidSignificance(f64),

    /// No predictor columns were supplied.
    #[error("At least one predictor column is required")]
    NoPredictors,

    /// NaN or infinite input value.
    #[error("Non-finite value in {context} at index {index}")]
    NonFinite { context: &'static str, index: usize },

    /// The Student-t distribution could not be constructed.
    #[error("Student-t distribution error: {0}")]
    Distribution(String),
}

/// Convenience alias for results of the regression core.
pub type Result<T> = std::result::Result<T, RegressionError>;

impl RegressionError {
    /// Exit code used by the binary for this failure class.
    pub fn exit_code(&self) -> u8 {
        match self {
            RegressionError::DimensionMismatch { .. }
            | RegressionError::InvalidWeight { .. }
            | RegressionError::InvalidQueryWeight(_)
            | RegressionError::InvalidSignificance(_)
            | RegressionError::NoPredictors
            | RegressionError::NonFinite { .. } => 2,
            RegressionError::InsufficientSamples { .. } | RegressionError::DegenerateDesign { .. } => 3,
            RegressionError::SingularDesign { .. } | RegressionError::Distribution(_) => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<RegressionError> for AppError {
    fn from(err: RegressionError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regression_errors_map_to_exit_codes() {
        let err: AppError = RegressionError::SingularDesign { rcond: 0.0 }.into();
        assert_eq!(err.exit_code(), 4);

        let err: AppError = RegressionError::DegenerateDesign { samples: 2, parameters: 2 }.into();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("no degrees of freedom"));

        let err: AppError = RegressionError::InvalidSignificance(1.5).into();
        assert_eq!(err.exit_code(), 2);

        let err: AppError = RegressionError::InvalidQueryWeight(-1.0).into();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("query weight"));
    }
}
