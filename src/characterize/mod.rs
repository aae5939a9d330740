//! Component characterization.
//!
//! A characterizer takes the raw tables for one component, fits every curve
//! the component needs, and returns an immutable characterization. Construction
//! is all-or-nothing: any failed fit fails the whole characterization.

use serde::Serialize;

use crate::domain::FitQuality;
use crate::models::FittedFunction;

pub mod breaker;
pub mod motor;

pub use breaker::*;
pub use motor::*;

/// One fitted relationship together with the samples it was fitted on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FittedSeries {
    pub name: String,
    pub x_label: String,
    pub y_label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub function: FittedFunction,
}

impl FittedSeries {
    pub fn new(
        name: impl Into<String>,
        (x_label, y_label): (&str, &str),
        x: Vec<f64>,
        y: Vec<f64>,
        function: FittedFunction,
    ) -> Self {
        Self {
            name: name.into(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            x,
            y,
            function,
        }
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        self.function.evaluate(x)
    }

    pub fn quality(&self) -> FitQuality {
        self.function.quality(&self.x, &self.y)
    }
}
