//! Mathematical utilities: basis functions, linear and nonlinear least squares.

pub mod basis;
pub mod lm;
pub mod ols;

pub use basis::*;
pub use lm::*;
pub use ols::*;
