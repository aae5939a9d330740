//! `frc-curves` library crate.
//!
//! Fits the empirical curves used to model FRC robot components: DC motor
//! current and torque from vendor characterization data, and the main
//! breaker's temperature derate and trip-time bands from its datasheet.
//!
//! The binary (`frc`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - characterizations are reusable from other simulation code

pub mod app;
pub mod characterize;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
