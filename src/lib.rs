//! `linfit` library crate.
//!
//! Linear least squares (ordinary and weighted) with confidence intervals for
//! the mean response and prediction intervals for new observations.
//!
//! The binary (`linfit`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the regression core (`math`, `fit`, `estimate`) is usable on its own

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod estimate;
pub mod fit;
pub mod io;
pub mod math;
pub mod report;
