//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the numeric `Table` every loader produces
//! - unit normalization rules (`UnitNormalizer`)
//! - canonical column names, motor/breaker identifiers and run configuration

pub mod table;
pub mod types;
pub mod units;

pub use table::*;
pub use types::*;
pub use units::*;
