//! Command-line parsing for the `frc` characterization tool.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! fitting code and from command dispatch (`app`).

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::domain::{BreakerConfig, MotorConfig, MotorType, ParametricOptions, StallWindow};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "frc", version, about = "FRC motor and main breaker curve characterization")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Characterize one motor from its vendor curve and locked-rotor captures.
    Motor(MotorArgs),
    /// Characterize several motors in parallel (all catalogued motors by default).
    Motors(MotorsArgs),
    /// Characterize the 120 A main breaker from its datasheet curves.
    Breaker(BreakerArgs),
    /// Evaluate a function from a previously exported curve JSON.
    Eval(EvalArgs),
}

/// Where the dataset lives.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Data root (defaults to $FRC_DATA_DIR, then `data`).
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

/// Motor characterization settings.
#[derive(Debug, Args, Clone)]
pub struct MotorSettings {
    /// Voltage whose stall sample the voltage-scaling fits are normalized to.
    #[arg(long, default_value_t = 12.0)]
    pub reference_voltage: f64,

    /// First locked-rotor row scanned for peak power.
    #[arg(long, default_value_t = 1)]
    pub window_start: usize,

    /// End (exclusive) of the locked-rotor rows scanned for peak power.
    #[arg(long, default_value_t = 10)]
    pub window_end: usize,
}

impl MotorSettings {
    pub fn to_config(&self) -> MotorConfig {
        MotorConfig {
            reference_voltage: self.reference_voltage,
            stall_window: StallWindow {
                start: self.window_start,
                end: self.window_end,
            },
            ..MotorConfig::default()
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct MotorArgs {
    /// Motor type.
    #[arg(value_enum)]
    pub motor: MotorType,

    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub settings: MotorSettings,

    /// Print the N largest residuals.
    #[arg(long, default_value_t = 5)]
    pub top: usize,

    /// Export observed vs fitted values to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export fitted functions to JSON (readable by `frc eval`).
    #[arg(long = "export-curve")]
    pub export_curve: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct MotorsArgs {
    /// Motor types (all when omitted).
    #[arg(value_enum)]
    pub motors: Vec<MotorType>,

    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub settings: MotorSettings,

    /// Write `<motor>.json` curve files into this directory.
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct BreakerArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Ambient temperature (°C) the breaker operates at.
    #[arg(long, default_value_t = 25.0, allow_negative_numbers = true)]
    pub ambient_temp: f64,

    /// Iteration budget of the trip-time solver.
    #[arg(long, default_value_t = 400)]
    pub max_iterations: usize,

    /// Number of best seeds refined by the trip-time solver.
    #[arg(long, default_value_t = 4)]
    pub refine_seeds: usize,

    /// Print the N largest residuals.
    #[arg(long, default_value_t = 5)]
    pub top: usize,

    /// Export observed vs fitted values to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export fitted functions to JSON (readable by `frc eval`).
    #[arg(long = "export-curve")]
    pub export_curve: Option<PathBuf>,
}

impl BreakerArgs {
    pub fn to_config(&self) -> BreakerConfig {
        BreakerConfig {
            ambient_temp: self.ambient_temp,
            parametric: ParametricOptions {
                max_iterations: self.max_iterations,
                refine_seeds: self.refine_seeds,
                ..ParametricOptions::default()
            },
            ..BreakerConfig::default()
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct EvalArgs {
    /// Curve JSON file produced by `--export-curve`.
    #[arg(long, value_name = "JSON")]
    pub curve: PathBuf,

    /// Function name (e.g. `current_vs_speed`, `trip_time_max`).
    #[arg(long)]
    pub function: String,

    /// Points to evaluate at.
    #[arg(required = true, num_args = 1.., allow_negative_numbers = true)]
    pub x: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_motor_with_window() {
        let cli = Cli::parse_from(["frc", "-vv", "motor", "775pro", "--window-end", "8", "--data-dir", "d"]);
        assert_eq!(cli.verbose, 2);
        let Command::Motor(args) = cli.command else {
            panic!("expected motor subcommand");
        };
        assert_eq!(args.motor, MotorType::Pro775);
        let config = args.settings.to_config();
        assert_eq!(config.stall_window, StallWindow { start: 1, end: 8 });
        assert_eq!(config.reference_voltage, 12.0);
        assert_eq!(args.data.data_dir, Some(PathBuf::from("d")));
    }

    #[test]
    fn motors_default_to_empty_list() {
        let cli = Cli::parse_from(["frc", "motors"]);
        let Command::Motors(args) = cli.command else {
            panic!("expected motors subcommand");
        };
        assert!(args.motors.is_empty());
    }

    #[test]
    fn breaker_accepts_negative_ambient() {
        let cli = Cli::parse_from(["frc", "breaker", "--ambient-temp", "-10"]);
        let Command::Breaker(args) = cli.command else {
            panic!("expected breaker subcommand");
        };
        assert_eq!(args.to_config().ambient_temp, -10.0);
    }

    #[test]
    fn eval_takes_negative_points() {
        let cli = Cli::parse_from(["frc", "eval", "--curve", "c.json", "--function", "f", "-1.5", "2"]);
        let Command::Eval(args) = cli.command else {
            panic!("expected eval subcommand");
        };
        assert_eq!(args.x, vec![-1.5, 2.0]);
    }
}
