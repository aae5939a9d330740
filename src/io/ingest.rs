//! CSV ingest.
//!
//! Turns vendor measurement CSVs into numeric [`Table`]s with canonical column
//! names.
//!
//! - **Header aliasing**: vendor headers (`Speed (RPM)`, `Amps`,
//!   `Torque 12V (N · m)`, ...) map to canonical names; unknown headers are
//!   kept, normalized.
//! - **Strict schema**: the columns a table kind needs must be present.
//! - **Strict cells**: every cell must parse as a number; the error names the line.
//!
//! No unit conversion happens here (see `domain::units`).

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use log::debug;

use crate::domain::{BreakerCurve, Table, columns};
use crate::error::{AppError, CurveError};

/// Which kind of table a CSV holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSchema {
    /// Vendor motor curve (speed sweep at one voltage).
    MotorCurve,
    /// Locked-rotor time series at one test voltage.
    LockedRotor,
    /// One edge of a breaker datasheet curve.
    Breaker(BreakerCurve),
}

impl TableSchema {
    pub fn required(self) -> Vec<&'static str> {
        match self {
            TableSchema::MotorCurve => vec![columns::SPEED, columns::CURRENT, columns::TORQUE],
            TableSchema::LockedRotor => vec![columns::TIME, columns::CURRENT, columns::VOLTAGE, columns::TORQUE],
            TableSchema::Breaker(curve) => {
                let (x, y) = curve.axes();
                vec![x, y]
            }
        }
    }

    /// Canonical name for a normalized header, if it is a known alias.
    pub fn canonical(self, header: &str) -> Option<&'static str> {
        match self {
            TableSchema::MotorCurve | TableSchema::LockedRotor => motor_alias(header),
            TableSchema::Breaker(BreakerCurve::TempDerate) => match header {
                "temperature" | "temp" | "ambient temperature" | "temperature (c)" | "temperature (°c)" => {
                    Some(columns::TEMPERATURE)
                }
                "derate" | "multiplier" | "rating multiplier" | "percent of rating" => Some(columns::DERATE),
                _ => None,
            },
            TableSchema::Breaker(BreakerCurve::TripTime) => match header {
                "current" | "current (a)" | "amps" => Some(columns::CURRENT),
                "trip_time" | "trip time" | "time" | "time (s)" | "trip time (s)" => Some(columns::TRIP_TIME),
                _ => None,
            },
        }
    }
}

fn motor_alias(header: &str) -> Option<&'static str> {
    let name = match header {
        "speed" | "speed (rpm)" => columns::SPEED,
        "torque" | "torque (n·m)" | "torque (n · m)" => columns::TORQUE,
        "current" | "current (a)" | "amps" => columns::CURRENT,
        "voltage" | "voltage (v)" | "volts" => columns::VOLTAGE,
        "time" | "time (s)" => columns::TIME,
        "supplied power (w)" | "supplied_power" => columns::SUPPLIED_POWER,
        "output power (w)" | "output_power" => columns::OUTPUT_POWER,
        "efficiency (%)" | "efficiency" => columns::EFFICIENCY,
        "power dissipation (w)" | "power_dissipation" => columns::POWER_DISSIPATION,
        // Locked-rotor captures label torque with the test voltage: "Torque 12V (N · m)".
        h if h.starts_with("torque ") => columns::TORQUE,
        _ => return None,
    };
    Some(name)
}

/// Parse a CSV into a canonical table.
pub fn read_table<R: Read>(reader: R, label: &str, schema: TableSchema) -> Result<Table, CurveError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| CurveError::invalid(format!("{label}: failed to read CSV headers: {e}")))?
        .clone();
    let names = canonical_names(&headers, schema);

    let mut values: Vec<Vec<f64>> = vec![Vec::new(); names.len()];
    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header; lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| CurveError::invalid(format!("{label}: CSV parse error on line {line}: {e}")))?;
        for (col, cell) in record.iter().enumerate() {
            let v: f64 = cell.parse().map_err(|_| {
                CurveError::invalid(format!(
                    "{label}: non-numeric value `{cell}` in column `{}` on line {line}",
                    names[col]
                ))
            })?;
            values[col].push(v);
        }
    }

    let table = Table::from_columns(label, names.into_iter().zip(values).collect())?;
    for column in schema.required() {
        if !table.has_column(column) {
            return Err(CurveError::schema(column, label));
        }
    }
    debug!("{label}: {} rows, columns {:?}", table.len(), table.column_names().collect::<Vec<_>>());
    Ok(table)
}

/// Open and parse a CSV file.
pub fn load_table(path: &Path, label: &str, schema: TableSchema) -> Result<Table, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    Ok(read_table(file, label, schema)?)
}

fn canonical_names(headers: &StringRecord, schema: TableSchema) -> Vec<String> {
    let normalized: Vec<String> = headers.iter().map(normalize_header_name).collect();
    let mut names: Vec<String> = normalized
        .iter()
        .map(|h| schema.canonical(h).map_or_else(|| h.clone(), str::to_string))
        .collect();

    // Digitized datasheets often carry arbitrary axis titles; a bare two-column
    // breaker sheet is read as (x, y).
    if let TableSchema::Breaker(curve) = schema {
        let (x, y) = curve.axes();
        let known = names.iter().any(|n| n == x || n == y);
        if names.len() == 2 && !known {
            names = vec![x.to_string(), y.to_string()];
        }
    }
    names
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header.
    let name = name.trim().trim_start_matches('\u{feff}').trim();
    name.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_vendor_motor_curve_headers() {
        let csv = "\u{feff}Speed (RPM),Torque (N·m),Current (A),Supplied Power (W),Output Power (W),Efficiency (%),Power Dissipation (W)\n\
                   0,2.42,133,1596,0,0,1596\n\
                   5310,0,2.7,32.4,0,0,32.4\n";
        let t = read_table(csv.as_bytes(), "cim curve", TableSchema::MotorCurve).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.column(columns::SPEED).unwrap(), &[0.0, 5310.0]);
        assert_eq!(t.column(columns::CURRENT).unwrap(), &[133.0, 2.7]);
        assert!(t.has_column(columns::POWER_DISSIPATION));
        assert!(t.has_column(columns::EFFICIENCY));
    }

    #[test]
    fn maps_locked_rotor_headers() {
        let csv = "Time (s), Amps ,Volts,Torque 12V (N · m)\n0.00,0,12,0\n0.01,120,11.5,2.3\n";
        let t = read_table(csv.as_bytes(), "stall", TableSchema::LockedRotor).unwrap();
        assert_eq!(t.column(columns::TORQUE).unwrap(), &[0.0, 2.3]);
        assert_eq!(t.column(columns::VOLTAGE).unwrap(), &[12.0, 11.5]);
    }

    #[test]
    fn missing_required_column_is_schema_error() {
        let csv = "Time,Amps,Volts\n0,1,2\n";
        let err = read_table(csv.as_bytes(), "stall", TableSchema::LockedRotor).unwrap_err();
        assert_eq!(err, CurveError::schema(columns::TORQUE, "stall"));
    }

    #[test]
    fn non_numeric_cell_names_the_line() {
        let csv = "Time,Amps,Volts,Torque\n0,1,2,3\n0.1,x,2,3\n";
        let err = read_table(csv.as_bytes(), "stall", TableSchema::LockedRotor).unwrap_err();
        match err {
            CurveError::InvalidInput(msg) => {
                assert!(msg.contains("line 3"), "{msg}");
                assert!(msg.contains("current"), "{msg}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn trip_sheet_renames_time_column() {
        let csv = "Current,Time\n150,120\n300,15\n";
        let t = read_table(csv.as_bytes(), "trip", TableSchema::Breaker(BreakerCurve::TripTime)).unwrap();
        assert_eq!(t.column(columns::TRIP_TIME).unwrap(), &[120.0, 15.0]);
    }

    #[test]
    fn unlabeled_breaker_sheet_is_named_positionally() {
        let csv = "x,y\n-40,1.2\n85,0.8\n";
        let t = read_table(csv.as_bytes(), "derate", TableSchema::Breaker(BreakerCurve::TempDerate)).unwrap();
        assert_eq!(t.column(columns::TEMPERATURE).unwrap(), &[-40.0, 85.0]);
        assert_eq!(t.column(columns::DERATE).unwrap(), &[1.2, 0.8]);
    }

    #[test]
    fn duplicate_canonical_columns_are_rejected() {
        let csv = "Amps,Current (A),Time,Volts,Torque\n1,1,0,2,3\n";
        let err = read_table(csv.as_bytes(), "stall", TableSchema::LockedRotor).unwrap_err();
        assert!(matches!(err, CurveError::InvalidInput(_)));
    }
}
