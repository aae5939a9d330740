//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON alongside fitted functions
//! - configured from CLI flags

use std::fmt;
use std::ops::Range;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Canonical column names every loader must produce.
pub mod columns {
    pub const SPEED: &str = "speed";
    pub const TORQUE: &str = "torque";
    pub const CURRENT: &str = "current";
    pub const VOLTAGE: &str = "voltage";
    pub const TIME: &str = "time";
    pub const SUPPLIED_POWER: &str = "supplied_power";
    pub const OUTPUT_POWER: &str = "output_power";
    pub const EFFICIENCY: &str = "efficiency";
    pub const POWER_DISSIPATION: &str = "power_dissipation";

    pub const TEST_VOLTAGE: &str = "test_voltage";

    pub const TEMPERATURE: &str = "temperature";
    pub const DERATE: &str = "derate";
    pub const TRIP_TIME: &str = "trip_time";
}

/// Motors with published VEX characterization data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum MotorType {
    #[serde(rename = "cim")]
    #[value(name = "cim")]
    Cim,
    #[serde(rename = "mini-cim")]
    #[value(name = "mini-cim")]
    MiniCim,
    #[serde(rename = "775pro")]
    #[value(name = "775pro")]
    Pro775,
    #[serde(rename = "bag")]
    #[value(name = "bag")]
    Bag,
}

impl MotorType {
    pub const ALL: [MotorType; 4] = [MotorType::Cim, MotorType::MiniCim, MotorType::Pro775, MotorType::Bag];

    pub fn name(self) -> &'static str {
        match self {
            MotorType::Cim => "cim",
            MotorType::MiniCim => "mini-cim",
            MotorType::Pro775 => "775pro",
            MotorType::Bag => "bag",
        }
    }

    /// Date stamp of the published motor-curve file.
    pub fn curve_date(self) -> &'static str {
        match self {
            MotorType::Cim => "20151104",
            MotorType::MiniCim => "20151207",
            MotorType::Pro775 => "20151208",
            MotorType::Bag => "20151207",
        }
    }

    /// Date stamp of the published locked-rotor files.
    pub fn stall_date(self) -> &'static str {
        match self {
            MotorType::Cim => "20151104",
            MotorType::MiniCim => "20151209",
            MotorType::Pro775 => "20151209",
            MotorType::Bag => "20151207",
        }
    }
}

impl fmt::Display for MotorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which edge of a datasheet tolerance band a curve describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Boundary {
    Min,
    Max,
}

impl Boundary {
    pub const ALL: [Boundary; 2] = [Boundary::Min, Boundary::Max];

    pub fn name(self) -> &'static str {
        match self {
            Boundary::Min => "min",
            Boundary::Max => "max",
        }
    }
}

/// Breaker datasheet curve families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakerCurve {
    /// Rated-current multiplier vs ambient temperature.
    TempDerate,
    /// Time to trip vs current.
    TripTime,
}

impl BreakerCurve {
    pub fn name(self) -> &'static str {
        match self {
            BreakerCurve::TempDerate => "temp_derate",
            BreakerCurve::TripTime => "trip_time",
        }
    }

    /// Canonical `(x, y)` column names.
    pub fn axes(self) -> (&'static str, &'static str) {
        match self {
            BreakerCurve::TempDerate => (columns::TEMPERATURE, columns::DERATE),
            BreakerCurve::TripTime => (columns::CURRENT, columns::TRIP_TIME),
        }
    }
}

/// One representative locked-rotor observation at one applied test voltage.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SampledPoint {
    pub test_voltage: f64,
    pub time: f64,
    pub current: f64,
    pub voltage: f64,
    pub torque: f64,
}

impl SampledPoint {
    /// Synthetic origin row (0 V, 0 A, 0 s, 0 N·m).
    pub const ORIGIN: SampledPoint = SampledPoint {
        test_voltage: 0.0,
        time: 0.0,
        current: 0.0,
        voltage: 0.0,
        torque: 0.0,
    };

    pub fn power(&self) -> f64 {
        self.current * self.voltage
    }
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub max_abs_residual: f64,
    pub n: usize,
}

/// Row window scanned by the stall sample selector.
///
/// Defaults to rows `1..10`: the first sample after power-on is unreliable,
/// and the locked-rotor peak sits within the first ten captures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StallWindow {
    pub start: usize,
    pub end: usize,
}

impl StallWindow {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl Default for StallWindow {
    fn default() -> Self {
        Self { start: 1, end: 10 }
    }
}

/// Motor characterization settings.
#[derive(Debug, Clone, PartialEq)]
pub struct MotorConfig {
    /// Locked-rotor test voltages.
    pub stall_voltages: Vec<f64>,
    /// Stall-table values are expressed as a fraction of their value at this voltage.
    pub reference_voltage: f64,
    /// Voltage the vendor motor curve was recorded at.
    pub curve_voltage: f64,
    pub stall_window: StallWindow,
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            stall_voltages: vec![2.0, 4.0, 6.0, 8.0, 10.0, 12.0],
            reference_voltage: 12.0,
            curve_voltage: 12.0,
            stall_window: StallWindow::default(),
        }
    }
}

/// Levenberg–Marquardt and seeding options for the power-law fitter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParametricOptions {
    pub max_iterations: usize,
    /// Relative SSE reduction below which a step counts as converged.
    pub ftol: f64,
    /// Relative parameter step below which the solver stops.
    pub xtol: f64,
    /// Gradient infinity-norm below which the solver stops.
    pub gtol: f64,
    /// Exponent magnitudes scanned when seeding (log-spaced, both signs).
    pub seed_exponent_min: f64,
    pub seed_exponent_max: f64,
    pub seed_exponent_steps: usize,
    /// Shift offsets scanned when seeding, as fractions of the x span.
    pub seed_shift_steps: usize,
    /// How many of the best seeds are refined.
    pub refine_seeds: usize,
}

impl Default for ParametricOptions {
    fn default() -> Self {
        Self {
            max_iterations: 400,
            ftol: 1e-12,
            xtol: 1e-12,
            gtol: 1e-14,
            seed_exponent_min: 0.05,
            seed_exponent_max: 6.0,
            seed_exponent_steps: 24,
            seed_shift_steps: 12,
            refine_seeds: 4,
        }
    }
}

/// Main breaker characterization settings.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakerConfig {
    /// Ambient temperature (°C) the breaker operates at.
    pub ambient_temp: f64,
    /// Degree of the temperature-derate polynomials.
    pub derate_degree: usize,
    pub parametric: ParametricOptions,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            ambient_temp: 25.0,
            derate_degree: 3,
            parametric: ParametricOptions::default(),
        }
    }
}
