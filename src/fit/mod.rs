//! Curve fitting.
//!
//! Responsibilities:
//!
//! - pick representative locked-rotor samples
//! - fit power-series polynomials (full degree range or explicit degree sets)
//! - fit shifted power laws (seed grid scored in parallel, then LM refinement)

pub mod parametric;
pub mod polynomial;
pub mod seed_grid;
pub mod stall;

pub use parametric::*;
pub use polynomial::*;
pub use seed_grid::*;
pub use stall::*;
