//! Weighted least squares via the normal equations.
//!
//! We solve
//!
//! ```text
//! minimize Σ w_i (y_i - x_i^T β)^2
//! ```
//!
//! by scaling each row by `sqrt(w_i)` and forming the normal equations
//! `(X^T W X) β = X^T W y`. Interval estimation needs `(X^T W X)^{-1}` for every
//! query, so the inverse is retained alongside β.
//!
//! Implementation choices:
//! - The normal matrix is equilibrated by its diagonal (`D^{-1/2} A D^{-1/2}`)
//!   before factoring, so predictors on very different scales do not look
//!   ill-conditioned.
//! - The equilibrated matrix is factored with Cholesky. β comes from the
//!   triangular solves; the inverse comes from the same factor.
//! - The reciprocal condition number is the ratio of the smallest to largest
//!   eigenvalue of the equilibrated matrix (exact in the 2-norm for a symmetric
//!   matrix). Designs below [`MIN_RCOND`] are rejected as singular.

use nalgebra::{DMatrix, DVector};

use crate::error::{RegressionError, Result};

/// Smallest accepted reciprocal condition estimate of the equilibrated normal matrix.
pub const MIN_RCOND: f64 = 1e-12;

/// Solution of the weighted normal equations.
#[derive(Debug, Clone)]
pub struct NormalSolution {
    pub coefficients: DVector<f64>,
    /// `(X^T W X)^{-1}` in the original (unequilibrated) scale.
    pub inverse: DMatrix<f64>,
    /// Reciprocal condition estimate of the equilibrated normal matrix.
    pub rcond: f64,
}

/// Solve `(X^T W X) β = X^T W y`.
///
/// `weights` must already be validated (finite, strictly positive, length `n`).
/// `None` means unit weights.
pub fn solve_normal_equations(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    weights: Option<&DVector<f64>>,
) -> Result<NormalSolution> {
    let n = x.nrows();
    let p = x.ncols();

    // Build the weighted design X_w and weighted observations y_w.
    let mut xw = x.clone();
    let mut yw = y.clone();
    if let Some(w) = weights {
        for i in 0..n {
            let sw = w[i].sqrt();
            for j in 0..p {
                xw[(i, j)] *= sw;
            }
            yw[i] *= sw;
        }
    }

    let normal = xw.tr_mul(&xw);
    let rhs = xw.tr_mul(&yw);

    // Equilibrate: scale[j] = 1 / sqrt(A_jj).
    let mut scale = DVector::<f64>::zeros(p);
    for j in 0..p {
        let d = normal[(j, j)];
        if !(d.is_finite() && d > 0.0) {
            return Err(RegressionError::SingularDesign { rcond: 0.0 });
        }
        scale[j] = 1.0 / d.sqrt();
    }
    let scaled = DMatrix::from_fn(p, p, |i, j| normal[(i, j)] * scale[i] * scale[j]);

    let rcond = reciprocal_condition(&scaled.symmetric_eigenvalues());
    if !(rcond >= MIN_RCOND) {
        return Err(RegressionError::SingularDesign { rcond });
    }

    let Some(chol) = scaled.cholesky() else {
        return Err(RegressionError::SingularDesign { rcond });
    };

    let scaled_rhs = rhs.component_mul(&scale);
    let coefficients = chol.solve(&scaled_rhs).component_mul(&scale);

    let scaled_inverse = chol.inverse();
    let inverse = DMatrix::from_fn(p, p, |i, j| scaled_inverse[(i, j)] * scale[i] * scale[j]);

    if coefficients.iter().chain(inverse.iter()).any(|v| !v.is_finite()) {
        return Err(RegressionError::SingularDesign { rcond });
    }

    Ok(NormalSolution {
        coefficients,
        inverse,
        rcond,
    })
}

/// Evaluate the bilinear form `v^T A v` for a symmetric matrix `A`.
pub fn quadratic_form(a: &DMatrix<f64>, v: &DVector<f64>) -> f64 {
    (a * v).dot(v)
}

/// `λ_min / λ_max` of a symmetric matrix; 0 when it is not positive definite.
fn reciprocal_condition(eigenvalues: &DVector<f64>) -> f64 {
    let min = eigenvalues.min();
    let max = eigenvalues.max();
    if !(min.is_finite() && max.is_finite()) || min <= 0.0 || max <= 0.0 {
        return 0.0;
    }
    min / max
}
