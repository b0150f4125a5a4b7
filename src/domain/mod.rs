//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - interval and coefficient outputs (`IntervalResult`, `CoefficientEstimate`)
//! - the portable fit report (`FitReport`)
//! - run configuration (`FitConfig`, `DemoConfig`, `Scenario`, `UncertaintyKind`)

pub mod types;

pub use types::*;
