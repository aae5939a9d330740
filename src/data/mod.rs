//! Dataset location.
//!
//! The vendor motor captures and the breaker datasheet digitizations live in a
//! fixed directory layout under one data root.

pub mod layout;

pub use layout::*;
