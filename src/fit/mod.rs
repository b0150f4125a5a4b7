//! Least squares fitting.
//!
//! Responsibilities:
//!
//! - validate observations and weights against the design
//! - solve the weighted normal equations
//! - compute residuals, residual variance and the coefficient table

pub mod fitter;

pub use fitter::*;
