//! Synthetic data generation for the `demo` command and tests.

pub mod sample;

pub use sample::*;
