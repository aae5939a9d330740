//! Paths of the published characterization files.
//!
//! ```text
//! <root>/vex/<motor>/<motor>-motor-curve-data-<date>.csv
//! <root>/vex/<motor>/<motor>-locked-rotor-data-<v>v-<date>.csv
//! <root>/data_sheets/120-main-breaker-<curve>-<min|max>.csv
//! ```

use std::path::{Path, PathBuf};

use crate::domain::{Boundary, BreakerCurve, MotorType};

/// Environment variable naming the data root.
pub const DATA_DIR_ENV: &str = "FRC_DATA_DIR";
/// Data root used when neither a flag nor the environment names one.
pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root from `FRC_DATA_DIR` (a `.env` file is honoured), else `data`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let root = std::env::var(DATA_DIR_ENV).unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
        Self::new(root)
    }

    /// An explicit root wins over the environment.
    pub fn resolve(explicit: Option<&Path>) -> Self {
        match explicit {
            Some(root) => Self::new(root),
            None => Self::from_env(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn motor_dir(&self, motor: MotorType) -> PathBuf {
        self.root.join("vex").join(motor.name())
    }

    pub fn motor_curve(&self, motor: MotorType) -> PathBuf {
        self.motor_dir(motor).join(format!(
            "{}-motor-curve-data-{}.csv",
            motor.name(),
            motor.curve_date()
        ))
    }

    /// Locked-rotor capture at `voltage`; whole voltages print without a decimal (`12v`).
    pub fn locked_rotor(&self, motor: MotorType, voltage: f64) -> PathBuf {
        self.motor_dir(motor).join(format!(
            "{}-locked-rotor-data-{voltage}v-{}.csv",
            motor.name(),
            motor.stall_date()
        ))
    }

    pub fn breaker_sheet(&self, curve: BreakerCurve, boundary: Boundary) -> PathBuf {
        self.root.join("data_sheets").join(format!(
            "120-main-breaker-{}-{}.csv",
            curve.name(),
            boundary.name()
        ))
    }
}

impl Default for DataLayout {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motor_paths_follow_vendor_naming() {
        let layout = DataLayout::new("/srv/frc");
        assert_eq!(
            layout.motor_curve(MotorType::Cim),
            PathBuf::from("/srv/frc/vex/cim/cim-motor-curve-data-20151104.csv")
        );
        assert_eq!(
            layout.locked_rotor(MotorType::Pro775, 12.0),
            PathBuf::from("/srv/frc/vex/775pro/775pro-locked-rotor-data-12v-20151209.csv")
        );
        assert_eq!(
            layout.locked_rotor(MotorType::MiniCim, 2.0),
            PathBuf::from("/srv/frc/vex/mini-cim/mini-cim-locked-rotor-data-2v-20151209.csv")
        );
    }

    #[test]
    fn breaker_paths_name_curve_and_edge() {
        let layout = DataLayout::new("d");
        assert_eq!(
            layout.breaker_sheet(BreakerCurve::TripTime, Boundary::Max),
            PathBuf::from("d/data_sheets/120-main-breaker-trip_time-max.csv")
        );
        assert_eq!(
            layout.breaker_sheet(BreakerCurve::TempDerate, Boundary::Min),
            PathBuf::from("d/data_sheets/120-main-breaker-temp_derate-min.csv")
        );
    }

    #[test]
    fn explicit_root_wins() {
        let layout = DataLayout::resolve(Some(Path::new("elsewhere")));
        assert_eq!(layout.root(), Path::new("elsewhere"));
    }
}
