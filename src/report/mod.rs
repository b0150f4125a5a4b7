//! Reporting utilities: coefficient naming and formatted terminal output.

pub mod format;

pub use format::*;

/// Label used for the intercept row.
pub const INTERCEPT_NAME: &str = "(Intercept)";

/// Coefficient labels in design order: intercept first, then predictors.
pub fn coefficient_names(predictor_names: &[String]) -> Vec<String> {
    std::iter::once(INTERCEPT_NAME.to_string())
        .chain(predictor_names.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intercept_comes_first() {
        let names = coefficient_names(&["x".to_string(), "z".to_string()]);
        assert_eq!(names, vec!["(Intercept)", "x", "z"]);
    }
}
