//! Export observed vs fitted values to CSV.
//!
//! One row per sample of every fitted series, so a spreadsheet can plot the
//! fits against their data.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::AppError;
use crate::report::Residual;

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    function: &'a str,
    x_label: &'a str,
    y_label: &'a str,
    x: f64,
    y_obs: f64,
    y_fit: f64,
    residual: f64,
}

/// Write residual rows as CSV to any writer.
pub fn write_residuals<W: Write>(writer: W, residuals: &[Residual]) -> Result<(), AppError> {
    let mut out = csv::Writer::from_writer(writer);
    for r in residuals {
        out.serialize(ExportRow {
            function: &r.function,
            x_label: &r.x_label,
            y_label: &r.y_label,
            x: r.x,
            y_obs: r.y_obs,
            y_fit: r.y_fit,
            residual: r.residual,
        })
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }
    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write residual rows to a CSV file.
pub fn write_residuals_csv(path: &Path, residuals: &[Residual]) -> Result<(), AppError> {
    let file = std::fs::File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_residuals(file, residuals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_and_rows() {
        let rows = vec![Residual {
            function: "torque_vs_speed".to_string(),
            x_label: "speed".to_string(),
            y_label: "torque".to_string(),
            x: 10.0,
            y_obs: 1.6,
            y_fit: 1.5,
            residual: 0.1,
        }];
        let mut buf = Vec::new();
        write_residuals(&mut buf, &rows).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("function,x_label,y_label,x,y_obs,y_fit,residual"));
        assert_eq!(lines.next(), Some("torque_vs_speed,speed,torque,10.0,1.6,1.5,0.1"));
        assert_eq!(lines.next(), None);
    }
}
