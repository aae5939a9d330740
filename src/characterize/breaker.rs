//! Main breaker characterization.
//!
//! The datasheet gives each curve as a tolerance band (min and max edge):
//!
//! - rated-current multiplier vs ambient temperature: cubic polynomial per edge
//! - time to trip vs current: shifted power law per edge, pinned to the last
//!   datasheet point
//!
//! The four fits are independent.

use log::info;

use crate::characterize::FittedSeries;
use crate::domain::{Boundary, BreakerConfig, BreakerCurve, Table};
use crate::error::CurveError;
use crate::fit::{Degrees, ParametricFit, fit_polynomial, fit_power_law};

/// Raw datasheet tables, already carrying canonical column names.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakerTables {
    pub temp_derate_min: Table,
    pub temp_derate_max: Table,
    pub trip_time_min: Table,
    pub trip_time_max: Table,
}

impl BreakerTables {
    pub fn get(&self, curve: BreakerCurve, boundary: Boundary) -> &Table {
        match (curve, boundary) {
            (BreakerCurve::TempDerate, Boundary::Min) => &self.temp_derate_min,
            (BreakerCurve::TempDerate, Boundary::Max) => &self.temp_derate_max,
            (BreakerCurve::TripTime, Boundary::Min) => &self.trip_time_min,
            (BreakerCurve::TripTime, Boundary::Max) => &self.trip_time_max,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BreakerCharacterizer {
    config: BreakerConfig,
}

impl BreakerCharacterizer {
    pub fn new(config: BreakerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    pub fn characterize(&self, tables: BreakerTables) -> Result<BreakerCharacterization, CurveError> {
        let derate = |boundary| self.fit_derate(tables.get(BreakerCurve::TempDerate, boundary), boundary);
        let derate_min = derate(Boundary::Min)?;
        let derate_max = derate(Boundary::Max)?;

        let trip = |boundary| self.fit_trip(tables.get(BreakerCurve::TripTime, boundary), boundary);
        let (trip_min, trip_fit_min) = trip(Boundary::Min)?;
        let (trip_max, trip_fit_max) = trip(Boundary::Max)?;

        info!(
            "main breaker: characterized at {} °C (trip shifts {:.4} / {:.4})",
            self.config.ambient_temp, trip_fit_min.shift, trip_fit_max.shift
        );
        Ok(BreakerCharacterization {
            ambient_temp: self.config.ambient_temp,
            tables,
            derate_min,
            derate_max,
            trip_min,
            trip_max,
            trip_fit_min,
            trip_fit_max,
        })
    }

    fn fit_derate(&self, table: &Table, boundary: Boundary) -> Result<FittedSeries, CurveError> {
        let axes = BreakerCurve::TempDerate.axes();
        let (x, y) = table.xy(axes.0, axes.1)?;
        let fit = fit_polynomial(&x, &y, &Degrees::UpTo(self.config.derate_degree))?;
        Ok(FittedSeries::new(
            format!("{}_{}", BreakerCurve::TempDerate.name(), boundary.name()),
            axes,
            x,
            y,
            fit.function,
        ))
    }

    fn fit_trip(&self, table: &Table, boundary: Boundary) -> Result<(FittedSeries, ParametricFit), CurveError> {
        let axes = BreakerCurve::TripTime.axes();
        let (x, y) = table.xy(axes.0, axes.1)?;
        let fit = fit_power_law(&x, &y, &self.config.parametric)?;
        let series = FittedSeries::new(
            format!("{}_{}", BreakerCurve::TripTime.name(), boundary.name()),
            axes,
            x,
            y,
            fit.function.clone(),
        );
        Ok((series, fit))
    }
}

/// Fitted derate and trip-time bands for the main breaker.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakerCharacterization {
    ambient_temp: f64,
    tables: BreakerTables,
    derate_min: FittedSeries,
    derate_max: FittedSeries,
    trip_min: FittedSeries,
    trip_max: FittedSeries,
    trip_fit_min: ParametricFit,
    trip_fit_max: ParametricFit,
}

impl BreakerCharacterization {
    pub fn ambient_temp(&self) -> f64 {
        self.ambient_temp
    }

    pub fn tables(&self) -> &BreakerTables {
        &self.tables
    }

    pub fn derate(&self, boundary: Boundary) -> &FittedSeries {
        match boundary {
            Boundary::Min => &self.derate_min,
            Boundary::Max => &self.derate_max,
        }
    }

    pub fn trip(&self, boundary: Boundary) -> &FittedSeries {
        match boundary {
            Boundary::Min => &self.trip_min,
            Boundary::Max => &self.trip_max,
        }
    }

    /// Full power-law fit (parameters, shift, covariance) for one trip edge.
    pub fn trip_fit(&self, boundary: Boundary) -> &ParametricFit {
        match boundary {
            Boundary::Min => &self.trip_fit_min,
            Boundary::Max => &self.trip_fit_max,
        }
    }

    /// All fitted series, derate band first.
    pub fn series(&self) -> [&FittedSeries; 4] {
        [&self.derate_min, &self.derate_max, &self.trip_min, &self.trip_max]
    }

    /// `(min, max)` seconds to trip at `current` amps.
    pub fn trip_time(&self, current: f64) -> (f64, f64) {
        (self.trip_min.evaluate(current), self.trip_max.evaluate(current))
    }

    /// `(min, max)` rated-current multiplier at `temp` °C.
    pub fn temperature_derate(&self, temp: f64) -> (f64, f64) {
        (self.derate_min.evaluate(temp), self.derate_max.evaluate(temp))
    }

    /// Derate band at the configured ambient temperature.
    pub fn ambient_derate(&self) -> (f64, f64) {
        self.temperature_derate(self.ambient_temp)
    }
}
