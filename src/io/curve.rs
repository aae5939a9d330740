//! Read/write curve JSON files.
//!
//! A curve file is the portable form of a characterization: every fitted
//! function of one component with its axes and fit quality. `frc eval`
//! reloads it to evaluate functions without refitting.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::characterize::FittedSeries;
use crate::domain::FitQuality;
use crate::error::AppError;
use crate::models::FittedFunction;

/// One named function in a curve file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedFunction {
    pub name: String,
    pub x_label: String,
    pub y_label: String,
    pub function: FittedFunction,
    pub quality: FitQuality,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveFile {
    pub tool: String,
    pub generated: DateTime<Utc>,
    /// Motor type or `main-breaker`.
    pub component: String,
    pub functions: Vec<NamedFunction>,
}

impl CurveFile {
    pub fn from_series<'a>(component: impl Into<String>, series: impl IntoIterator<Item = &'a FittedSeries>) -> Self {
        let functions = series
            .into_iter()
            .map(|s| NamedFunction {
                name: s.name.clone(),
                x_label: s.x_label.clone(),
                y_label: s.y_label.clone(),
                function: s.function.clone(),
                quality: s.quality(),
            })
            .collect();
        Self {
            tool: "frc".to_string(),
            generated: Utc::now(),
            component: component.into(),
            functions,
        }
    }

    pub fn function(&self, name: &str) -> Option<&NamedFunction> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.iter().map(|f| f.name.as_str())
    }
}

/// Write a curve JSON file.
pub fn write_curve_json(path: &Path, curve: &CurveFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create curve JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, curve)
        .map_err(|e| AppError::new(2, format!("Failed to write curve JSON: {e}")))?;
    Ok(())
}

/// Read a curve JSON file.
pub fn read_curve_json(path: &Path) -> Result<CurveFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open curve JSON '{}': {e}", path.display())))?;
    let curve: CurveFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid curve JSON: {e}")))?;
    Ok(curve)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> FittedSeries {
        FittedSeries::new(
            "current_vs_speed",
            ("speed", "current"),
            vec![0.0, 10.0],
            vec![133.0, 100.0],
            FittedFunction::Polynomial {
                coefficients: vec![133.0, -3.3],
            },
        )
    }

    #[test]
    fn curve_file_survives_disk_round_trip() {
        let s = series();
        let curve = CurveFile::from_series("cim", [&s]);
        let path = std::env::temp_dir().join(format!("frc-curve-{}.json", std::process::id()));
        write_curve_json(&path, &curve).unwrap();
        let back = read_curve_json(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(back.component, "cim");
        assert_eq!(back.generated, curve.generated);
        assert_eq!(back.names().collect::<Vec<_>>(), ["current_vs_speed"]);
        let f = back.function("current_vs_speed").unwrap();
        assert!((f.function.evaluate(10.0) - 100.0).abs() < 1e-9);
        assert_eq!(f.quality.n, 2);
    }

    #[test]
    fn missing_file_is_input_error() {
        let err = read_curve_json(Path::new("/nonexistent/frc-curve.json")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
