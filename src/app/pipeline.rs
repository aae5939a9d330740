//! Shared load-and-characterize logic used by every subcommand.
//!
//! Keeping this in one place keeps the workflow identical across commands:
//! locate files -> ingest CSVs -> characterize -> residuals
//!
//! The command handlers in `app` then only deal with presentation and exports.

use log::info;
use rayon::prelude::*;

use crate::characterize::{
    BreakerCharacterization, BreakerCharacterizer, BreakerTables, MotorCharacterization, MotorCharacterizer,
    MotorData,
};
use crate::data::DataLayout;
use crate::domain::{Boundary, BreakerConfig, BreakerCurve, MotorConfig, MotorType, Table};
use crate::error::AppError;
use crate::fit::StallFrame;
use crate::io::ingest::{TableSchema, load_table};
use crate::report::{Residual, compute_residuals};

/// Outputs of one motor run.
#[derive(Debug, Clone)]
pub struct MotorRun {
    pub motor: MotorType,
    pub characterization: MotorCharacterization,
    pub residuals: Vec<Residual>,
}

/// Outputs of one breaker run.
#[derive(Debug, Clone)]
pub struct BreakerRun {
    pub characterization: BreakerCharacterization,
    pub residuals: Vec<Residual>,
}

/// Load the vendor curve and every locked-rotor capture for `motor`.
pub fn load_motor_data(layout: &DataLayout, motor: MotorType, config: &MotorConfig) -> Result<MotorData, AppError> {
    let curve = load_table(
        &layout.motor_curve(motor),
        &format!("{motor} motor curve"),
        TableSchema::MotorCurve,
    )?;

    let stall_frames = config
        .stall_voltages
        .iter()
        .map(|&v| {
            let table = load_table(
                &layout.locked_rotor(motor, v),
                &format!("{motor} locked rotor {v}V"),
                TableSchema::LockedRotor,
            )?;
            Ok(StallFrame {
                test_voltage: v,
                table,
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    Ok(MotorData {
        label: motor.name().to_string(),
        curve,
        stall_frames,
    })
}

/// Load and characterize one motor.
pub fn run_motor(layout: &DataLayout, motor: MotorType, config: &MotorConfig) -> Result<MotorRun, AppError> {
    let data = load_motor_data(layout, motor, config)?;
    let characterization = MotorCharacterizer::new(config.clone()).characterize(data)?;
    let residuals = compute_residuals(characterization.series())?;
    Ok(MotorRun {
        motor,
        characterization,
        residuals,
    })
}

/// Characterize several motors in parallel.
///
/// Results keep the order of `motors`; the first failure (in that order) wins.
pub fn run_motors(layout: &DataLayout, motors: &[MotorType], config: &MotorConfig) -> Result<Vec<MotorRun>, AppError> {
    info!("characterizing {} motors", motors.len());
    let runs: Vec<Result<MotorRun, AppError>> = motors
        .par_iter()
        .map(|&motor| run_motor(layout, motor, config))
        .collect();
    runs.into_iter().collect()
}

/// Load the four breaker datasheet tables.
pub fn load_breaker_tables(layout: &DataLayout) -> Result<BreakerTables, AppError> {
    let load = |curve: BreakerCurve, boundary: Boundary| -> Result<Table, AppError> {
        load_table(
            &layout.breaker_sheet(curve, boundary),
            &format!("breaker {} {}", curve.name(), boundary.name()),
            TableSchema::Breaker(curve),
        )
    };
    Ok(BreakerTables {
        temp_derate_min: load(BreakerCurve::TempDerate, Boundary::Min)?,
        temp_derate_max: load(BreakerCurve::TempDerate, Boundary::Max)?,
        trip_time_min: load(BreakerCurve::TripTime, Boundary::Min)?,
        trip_time_max: load(BreakerCurve::TripTime, Boundary::Max)?,
    })
}

/// Load and characterize the main breaker.
pub fn run_breaker(layout: &DataLayout, config: &BreakerConfig) -> Result<BreakerRun, AppError> {
    let tables = load_breaker_tables(layout)?;
    let characterization = BreakerCharacterizer::new(config.clone()).characterize(tables)?;
    let residuals = compute_residuals(characterization.series())?;
    Ok(BreakerRun {
        characterization,
        residuals,
    })
}
