//! Input/output helpers.
//!
//! - CSV ingest + header aliasing (`ingest`)
//! - observed vs fitted CSV export (`export`)
//! - curve JSON read/write (`curve`)

pub mod curve;
pub mod export;
pub mod ingest;

pub use curve::*;
pub use export::*;
pub use ingest::*;
