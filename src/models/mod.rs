//! Fitted function models.
//!
//! Models are plain data with pure evaluation so that fitting, reporting and
//! export code can stay generic.

pub mod model;

pub use model::*;
