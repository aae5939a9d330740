//! Locked-rotor sample selection.
//!
//! A locked-rotor capture is a short time series at one applied test voltage.
//! The representative sample is the row of peak electrical power
//! (`current × voltage`) within an early window of the capture. One such
//! sample per test voltage, behind a synthetic origin row, forms the stall
//! index table the voltage-scaling fits run on.

use log::debug;

use crate::domain::{SampledPoint, StallWindow, Table, columns};
use crate::error::CurveError;

/// A locked-rotor capture tagged with the voltage it was recorded at.
#[derive(Debug, Clone, PartialEq)]
pub struct StallFrame {
    pub test_voltage: f64,
    pub table: Table,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StallSampleSelector {
    pub window: StallWindow,
}

impl StallSampleSelector {
    pub fn new(window: StallWindow) -> Self {
        Self { window }
    }

    /// Pick the peak-power row within the window.
    ///
    /// The window is truncated to the table length. Ties keep the earliest row.
    pub fn select(&self, table: &Table, test_voltage: f64) -> Result<SampledPoint, CurveError> {
        let time = table.column(columns::TIME)?;
        let current = table.column(columns::CURRENT)?;
        let voltage = table.column(columns::VOLTAGE)?;
        let torque = table.column(columns::TORQUE)?;

        let start = self.window.start.min(table.len());
        let end = self.window.end.min(table.len());
        let available = end.saturating_sub(start);
        if available < 2 {
            return Err(CurveError::insufficient(
                format!(
                    "stall window {}..{} of {}",
                    self.window.start,
                    self.window.end,
                    table.label()
                ),
                2,
                available,
            ));
        }

        let mut best: Option<(usize, f64)> = None;
        for row in start..end {
            let power = current[row] * voltage[row];
            let threshold = best.map_or(0.0, |(_, p)| p);
            if power > threshold {
                best = Some((row, power));
            }
        }

        let Some((row, power)) = best else {
            return Err(CurveError::insufficient(
                format!("positive-power samples in stall window of {}", table.label()),
                1,
                0,
            ));
        };
        debug!(
            "{}: peak power {power:.3} W at row {row} (t={})",
            table.label(),
            time[row]
        );

        Ok(SampledPoint {
            test_voltage,
            time: time[row],
            current: current[row],
            voltage: voltage[row],
            torque: torque[row],
        })
    }

    /// Sample every frame and assemble the stall index table.
    pub fn index_table(&self, frames: &[StallFrame]) -> Result<StallIndexTable, CurveError> {
        let points = frames
            .iter()
            .map(|f| self.select(&f.table, f.test_voltage))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(StallIndexTable::new(points))
    }
}

/// Origin row followed by one sampled point per test voltage, ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct StallIndexTable {
    points: Vec<SampledPoint>,
}

impl StallIndexTable {
    pub fn new(mut sampled: Vec<SampledPoint>) -> Self {
        sampled.sort_by(|l, r| l.test_voltage.total_cmp(&r.test_voltage));
        let mut points = Vec::with_capacity(sampled.len() + 1);
        points.push(SampledPoint::ORIGIN);
        points.extend(sampled);
        Self { points }
    }

    pub fn points(&self) -> &[SampledPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Values of one canonical column, origin first.
    pub fn column(&self, name: &str) -> Result<Vec<f64>, CurveError> {
        let pick: fn(&SampledPoint) -> f64 = match name {
            columns::TEST_VOLTAGE => |p: &SampledPoint| p.test_voltage,
            columns::TIME => |p: &SampledPoint| p.time,
            columns::CURRENT => |p: &SampledPoint| p.current,
            columns::VOLTAGE => |p: &SampledPoint| p.voltage,
            columns::TORQUE => |p: &SampledPoint| p.torque,
            _ => return Err(CurveError::schema(name, "stall index table")),
        };
        Ok(self.points.iter().map(pick).collect())
    }

    /// The sampled point recorded at `test_voltage` (origin excluded).
    pub fn reference_row(&self, test_voltage: f64) -> Option<&SampledPoint> {
        self.points
            .iter()
            .skip(1)
            .find(|p| p.test_voltage == test_voltage)
    }

    pub fn to_table(&self) -> Result<Table, CurveError> {
        let names = [
            columns::TEST_VOLTAGE,
            columns::TIME,
            columns::CURRENT,
            columns::VOLTAGE,
            columns::TORQUE,
        ];
        let cols = names
            .iter()
            .map(|name| Ok((*name, self.column(name)?)))
            .collect::<Result<Vec<_>, CurveError>>()?;
        Table::from_columns("stall index table", cols)
    }
}
