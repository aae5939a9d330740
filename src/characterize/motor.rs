//! DC motor characterization.
//!
//! Two groups of fits:
//!
//! - current and torque as linear functions of speed, from the vendor motor
//!   curve (speed in rev/s after normalization)
//! - current and torque as a fraction of their value at the reference voltage,
//!   as cubic functions of the measured stall voltage with no constant term
//!   (zero volts must give zero current and torque)

use log::{debug, info};

use crate::characterize::FittedSeries;
use crate::domain::{MotorConfig, SampledPoint, Table, UnitNormalizer, columns};
use crate::error::CurveError;
use crate::fit::{Degrees, StallFrame, StallIndexTable, StallSampleSelector, fit_polynomial};

/// Degrees of the voltage-scaling fits.
const FRACTION_DEGREES: [usize; 3] = [1, 2, 3];

/// Raw tables for one motor, as loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct MotorData {
    pub label: String,
    /// Vendor motor curve in vendor units (rpm, percent).
    pub curve: Table,
    pub stall_frames: Vec<StallFrame>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MotorCharacterizer {
    config: MotorConfig,
}

impl MotorCharacterizer {
    pub fn new(config: MotorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MotorConfig {
        &self.config
    }

    pub fn characterize(&self, data: MotorData) -> Result<MotorCharacterization, CurveError> {
        let curve = UnitNormalizer::motor_curve().normalize(&data.curve)?;

        let selector = StallSampleSelector::new(self.config.stall_window.clone());
        let stall_index = selector.index_table(&data.stall_frames)?;

        let reference_voltage = self.config.reference_voltage;
        let reference = *stall_index.reference_row(reference_voltage).ok_or_else(|| {
            CurveError::invalid(format!(
                "{}: reference voltage {reference_voltage} V is not among the stall captures",
                data.label
            ))
        })?;
        if reference.current == 0.0 || reference.torque == 0.0 {
            return Err(CurveError::invalid(format!(
                "{}: zero current or torque at reference voltage {reference_voltage} V",
                data.label
            )));
        }
        debug!("{}: reference sample {reference:?}", data.label);

        let speed = curve.column(columns::SPEED)?.to_vec();
        let current = curve.column(columns::CURRENT)?.to_vec();
        let torque = curve.column(columns::TORQUE)?.to_vec();

        let current_fit = fit_polynomial(&speed, &current, &Degrees::UpTo(1))?;
        let torque_fit = fit_polynomial(&speed, &torque, &Degrees::UpTo(1))?;

        let voltage = stall_index.column(columns::VOLTAGE)?;
        let current_fraction: Vec<f64> = stall_index
            .column(columns::CURRENT)?
            .iter()
            .map(|c| c / reference.current)
            .collect();
        let torque_fraction: Vec<f64> = stall_index
            .column(columns::TORQUE)?
            .iter()
            .map(|t| t / reference.torque)
            .collect();

        let degrees = Degrees::Set(FRACTION_DEGREES.to_vec());
        let current_fraction_fit = fit_polynomial(&voltage, &current_fraction, &degrees)?;
        let torque_fraction_fit = fit_polynomial(&voltage, &torque_fraction, &degrees)?;

        let characterization = MotorCharacterization {
            current: FittedSeries::new(
                "current_vs_speed",
                (columns::SPEED, columns::CURRENT),
                speed.clone(),
                current,
                current_fit.function,
            ),
            torque: FittedSeries::new(
                "torque_vs_speed",
                (columns::SPEED, columns::TORQUE),
                speed,
                torque,
                torque_fit.function,
            ),
            current_fraction: FittedSeries::new(
                "current_fraction_vs_voltage",
                (columns::VOLTAGE, "current_fraction"),
                voltage.clone(),
                current_fraction,
                current_fraction_fit.function,
            ),
            torque_fraction: FittedSeries::new(
                "torque_fraction_vs_voltage",
                (columns::VOLTAGE, "torque_fraction"),
                voltage,
                torque_fraction,
                torque_fraction_fit.function,
            ),
            label: data.label,
            reference_voltage,
            curve,
            stall_frames: data.stall_frames,
            stall_index,
            reference,
        };
        info!(
            "{}: characterized from {} curve rows and {} stall captures",
            characterization.label,
            characterization.curve.len(),
            characterization.stall_frames.len()
        );
        Ok(characterization)
    }
}

/// Fitted current and torque models for one motor.
#[derive(Debug, Clone, PartialEq)]
pub struct MotorCharacterization {
    label: String,
    reference_voltage: f64,
    curve: Table,
    stall_frames: Vec<StallFrame>,
    stall_index: StallIndexTable,
    reference: SampledPoint,
    current: FittedSeries,
    torque: FittedSeries,
    current_fraction: FittedSeries,
    torque_fraction: FittedSeries,
}

impl MotorCharacterization {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn reference_voltage(&self) -> f64 {
        self.reference_voltage
    }

    /// Normalized motor curve (rev/s, unit efficiency).
    pub fn curve(&self) -> &Table {
        &self.curve
    }

    pub fn stall_frames(&self) -> &[StallFrame] {
        &self.stall_frames
    }

    pub fn stall_index(&self) -> &StallIndexTable {
        &self.stall_index
    }

    /// Stall sample at the reference voltage.
    pub fn reference(&self) -> &SampledPoint {
        &self.reference
    }

    pub fn current(&self) -> &FittedSeries {
        &self.current
    }

    pub fn torque(&self) -> &FittedSeries {
        &self.torque
    }

    pub fn current_fraction(&self) -> &FittedSeries {
        &self.current_fraction
    }

    pub fn torque_fraction(&self) -> &FittedSeries {
        &self.torque_fraction
    }

    /// All fitted series, speed fits first.
    pub fn series(&self) -> [&FittedSeries; 4] {
        [
            &self.current,
            &self.torque,
            &self.current_fraction,
            &self.torque_fraction,
        ]
    }

    /// Current (A) at `speed` rev/s.
    pub fn current_at(&self, speed: f64) -> f64 {
        self.current.evaluate(speed)
    }

    /// Torque (N·m) at `speed` rev/s.
    pub fn torque_at(&self, speed: f64) -> f64 {
        self.torque.evaluate(speed)
    }

    pub fn current_fraction_at(&self, volts: f64) -> f64 {
        self.current_fraction.evaluate(volts)
    }

    pub fn torque_fraction_at(&self, volts: f64) -> f64 {
        self.torque_fraction.evaluate(volts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn curve() -> Table {
        Table::from_columns(
            "curve",
            vec![
                (columns::SPEED, vec![0.0, 600.0, 1200.0, 1800.0]),
                (columns::CURRENT, vec![133.0, 100.0, 67.0, 33.0]),
                (columns::TORQUE, vec![2.4, 1.6, 0.8, 0.0]),
            ],
        )
        .unwrap()
    }

    fn stall_frame(v: f64) -> StallFrame {
        let table = Table::from_columns(
            format!("stall {v}V"),
            vec![
                (columns::TIME, vec![0.0, 0.01, 0.02, 0.03, 0.04]),
                (columns::CURRENT, vec![0.0, 5.0 * v, 10.0 * v, 8.0 * v, 6.0 * v]),
                (columns::VOLTAGE, vec![v; 5]),
                (columns::TORQUE, vec![0.0, 0.05 * v, 0.1 * v, 0.08 * v, 0.06 * v]),
            ],
        )
        .unwrap();
        StallFrame {
            test_voltage: v,
            table,
        }
    }

    fn data() -> MotorData {
        MotorData {
            label: "test motor".to_string(),
            curve: curve(),
            stall_frames: [2.0, 4.0, 6.0, 8.0, 10.0, 12.0].into_iter().map(stall_frame).collect(),
        }
    }

    #[test]
    fn fits_speed_and_voltage_relationships() {
        let m = MotorCharacterizer::default().characterize(data()).unwrap();
        assert_relative_eq!(m.current_at(15.0), 83.25, epsilon = 1e-9);
        assert_relative_eq!(m.torque_at(30.0), 0.0, epsilon = 1e-9);
        assert_relative_eq!(m.torque_fraction_at(6.0), 0.5, epsilon = 1e-9);
        assert_relative_eq!(m.current_fraction_at(12.0), 1.0, epsilon = 1e-9);
        assert_eq!(m.current_fraction_at(0.0), 0.0);
        assert_eq!(m.reference().current, 120.0);
        assert_eq!(m.stall_index().len(), 7);
    }

    #[test]
    fn reference_voltage_is_located_by_value() {
        let mut d = data();
        d.stall_frames.reverse();
        let m = MotorCharacterizer::default().characterize(d).unwrap();
        assert_eq!(m.reference().test_voltage, 12.0);
        assert_relative_eq!(m.torque_fraction_at(6.0), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn missing_reference_voltage_is_invalid() {
        let mut d = data();
        d.stall_frames.retain(|f| f.test_voltage != 12.0);
        let err = MotorCharacterizer::default().characterize(d).unwrap_err();
        assert!(matches!(err, CurveError::InvalidInput(_)), "{err:?}");
    }

    #[test]
    fn curve_without_speed_fails_whole_characterization() {
        let mut d = data();
        d.curve = Table::from_columns("curve", vec![(columns::CURRENT, vec![1.0, 2.0])]).unwrap();
        let err = MotorCharacterizer::default().characterize(d).unwrap_err();
        assert_eq!(err, CurveError::schema(columns::SPEED, "curve"));
    }
}
