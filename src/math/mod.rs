//! Mathematical building blocks: design matrices, the weighted normal-equations
//! solve, and Student-t critical values.

pub mod design;
pub mod ols;
pub mod quantile;

pub use design::*;
pub use ols::*;
pub use quantile::*;
