//! Design matrix construction.
//!
//! The design matrix has a constant column first, followed by the predictor
//! columns in the order the caller supplied them:
//!
//! ```text
//! [ 1  x_11  x_12 ... x_1k ]
//! [ 1  x_21  x_22 ... x_2k ]
//! [ ...                    ]
//! ```
//!
//! That column order is the contract for coefficients and query points.

use nalgebra::{DMatrix, DVector};

use crate::error::{RegressionError, Result};

/// Validated `n × p` design matrix (intercept + predictors).
#[derive(Debug, Clone, PartialEq)]
pub struct DesignMatrix {
    matrix: DMatrix<f64>,
}

impl DesignMatrix {
    /// Build a design matrix from predictor columns.
    ///
    /// Every column must have the same length `n`, and `n` must exceed the
    /// number of predictors so that `n >= p` with `p = predictors + 1`.
    pub fn build<C: AsRef<[f64]>>(predictors: &[C]) -> Result<Self> {
        let Some(first) = predictors.first() else {
            return Err(RegressionError::NoPredictors);
        };
        let n = first.as_ref().len();
        let k = predictors.len();

        for column in predictors {
            let column = column.as_ref();
            if column.len() != n {
                return Err(RegressionError::DimensionMismatch {
                    context: "predictor column",
                    expected: n,
                    found: column.len(),
                });
            }
        }

        for column in predictors {
            if let Some(row) = column.as_ref().iter().position(|v| !v.is_finite()) {
                return Err(RegressionError::NonFinite {
                    context: "predictor row",
                    index: row,
                });
            }
        }

        if n <= k {
            return Err(RegressionError::InsufficientSamples {
                samples: n,
                parameters: k + 1,
            });
        }

        let matrix = DMatrix::from_fn(n, k + 1, |i, j| {
            if j == 0 { 1.0 } else { predictors[j - 1].as_ref()[i] }
        });

        Ok(Self { matrix })
    }

    /// Number of rows (`n`).
    pub fn sample_count(&self) -> usize {
        self.matrix.nrows()
    }

    /// Number of columns including the intercept (`p`).
    pub fn param_count(&self) -> usize {
        self.matrix.ncols()
    }

    /// Number of predictor columns (`p - 1`).
    pub fn predictor_count(&self) -> usize {
        self.matrix.ncols() - 1
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// Build a query point in this design's column order from predictor values.
    pub fn query(&self, predictors: &[f64]) -> Result<QueryPoint> {
        if predictors.len() != self.predictor_count() {
            return Err(RegressionError::DimensionMismatch {
                context: "query predictors",
                expected: self.predictor_count(),
                found: predictors.len(),
            });
        }
        QueryPoint::from_predictors(predictors)
    }
}

/// A point at which a prediction is requested: `[1, x_1, ..., x_k]`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPoint {
    values: DVector<f64>,
}

impl QueryPoint {
    /// Wrap a full query vector (intercept term included).
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(RegressionError::NonFinite {
                context: "query",
                index,
            });
        }
        Ok(Self {
            values: DVector::from_vec(values),
        })
    }

    /// Build a query from predictor values only; the intercept term is prepended.
    pub fn from_predictors(predictors: &[f64]) -> Result<Self> {
        let mut values = Vec::with_capacity(predictors.len() + 1);
        values.push(1.0);
        values.extend_from_slice(predictors);
        Self::new(values).map_err(|err| match err {
            RegressionError::NonFinite { context, index } => RegressionError::NonFinite {
                context,
                index: index - 1,
            },
            other => other,
        })
    }

    /// Dimensionality `p` (intercept included).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_vector(&self) -> &DVector<f64> {
        &self.values
    }

    /// Predictor values without the leading intercept term.
    pub fn predictors(&self) -> &[f64] {
        &self.values.as_slice()[1.min(self.values.len())..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_prepends_intercept_column() {
        let x1 = vec![1.0, 2.0, 3.0];
        let x2 = vec![4.0, 5.0, 6.0];
        let design = DesignMatrix::build(&[x1, x2]).unwrap();

        assert_eq!(design.sample_count(), 3);
        assert_eq!(design.param_count(), 3);
        let m = design.as_matrix();
        for i in 0..3 {
            assert_eq!(m[(i, 0)], 1.0);
        }
        assert_eq!(m[(1, 1)], 2.0);
        assert_eq!(m[(2, 2)], 6.0);
    }

    #[test]
    fn build_rejects_ragged_columns() {
        let err = DesignMatrix::build(&[vec![1.0, 2.0, 3.0], vec![1.0, 2.0]]).unwrap_err();
        assert_eq!(
            err,
            RegressionError::DimensionMismatch {
                context: "predictor column",
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn build_rejects_fewer_samples_than_parameters() {
        // Two predictors -> three parameters; two samples is underdetermined.
        let err = DesignMatrix::build(&[vec![1.0, 2.0], vec![3.0, 5.0]]).unwrap_err();
        assert_eq!(
            err,
            RegressionError::InsufficientSamples {
                samples: 2,
                parameters: 3
            }
        );
    }

    #[test]
    fn build_accepts_square_design() {
        // n == p is a valid design; the solver rejects it later for variance estimation.
        let design = DesignMatrix::build(&[vec![1.0, 2.0]]).unwrap();
        assert_eq!(design.sample_count(), design.param_count());
    }

    #[test]
    fn build_rejects_empty_and_non_finite_input() {
        let empty: [Vec<f64>; 0] = [];
        assert_eq!(DesignMatrix::build(&empty).unwrap_err(), RegressionError::NoPredictors);

        let err = DesignMatrix::build(&[vec![1.0, f64::NAN, 3.0]]).unwrap_err();
        assert!(matches!(err, RegressionError::NonFinite { index: 1, .. }));
    }

    #[test]
    fn query_follows_design_order() {
        let design = DesignMatrix::build(&[vec![1.0, 2.0, 3.0, 4.0], vec![0.0, 1.0, 0.0, 1.0]]).unwrap();
        let q = design.query(&[6.0, -1.0]).unwrap();
        assert_eq!(q.len(), 3);
        assert_eq!(q.as_vector().as_slice(), &[1.0, 6.0, -1.0]);
        assert_eq!(q.predictors(), &[6.0, -1.0]);

        let err = design.query(&[6.0]).unwrap_err();
        assert!(matches!(err, RegressionError::DimensionMismatch { expected: 2, found: 1, .. }));
    }
}
