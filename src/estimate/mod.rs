//! Interval estimation against a fitted model.
//!
//! Estimation is a pure read of a [`crate::fit::FitResult`], so any number of
//! queries can run concurrently against the same fit.

pub mod interval;

pub use interval::*;
