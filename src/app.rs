//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and installs the logger
//! - loads and characterizes motors or the main breaker
//! - prints reports
//! - writes optional exports

use clap::Parser;
use log::{LevelFilter, info};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use crate::cli::{BreakerArgs, Cli, Command, EvalArgs, MotorArgs, MotorsArgs};
use crate::data::DataLayout;
use crate::domain::MotorType;
use crate::error::AppError;
use crate::io::curve::{CurveFile, read_curve_json, write_curve_json};
use crate::io::export::write_residuals_csv;
use crate::report::{format_breaker_summary, format_motor_summary, format_residuals, largest_residuals};

pub mod pipeline;

/// Entry point for the `frc` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Motor(args) => handle_motor(args),
        Command::Motors(args) => handle_motors(args),
        Command::Breaker(args) => handle_breaker(args),
        Command::Eval(args) => handle_eval(args),
    }
}

/// Map `-v` occurrences to a log level.
pub fn level_for(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn init_logging(verbose: u8) {
    // A second init (e.g. in tests) is harmless; keep the first logger.
    let _ = TermLogger::init(
        level_for(verbose),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );
}

fn handle_motor(args: MotorArgs) -> Result<(), AppError> {
    let layout = DataLayout::resolve(args.data.data_dir.as_deref());
    let config = args.settings.to_config();
    let run = pipeline::run_motor(&layout, args.motor, &config)?;

    println!("{}", format_motor_summary(&run.characterization));
    if args.top > 0 {
        println!("Largest residuals:");
        println!("{}", format_residuals(&largest_residuals(&run.residuals, args.top)));
    }

    if let Some(path) = &args.export {
        write_residuals_csv(path, &run.residuals)?;
        info!("wrote residuals to {}", path.display());
    }
    if let Some(path) = &args.export_curve {
        let curve = CurveFile::from_series(args.motor.name(), run.characterization.series());
        write_curve_json(path, &curve)?;
        info!("wrote curve file {}", path.display());
    }
    Ok(())
}

fn handle_motors(args: MotorsArgs) -> Result<(), AppError> {
    let layout = DataLayout::resolve(args.data.data_dir.as_deref());
    let config = args.settings.to_config();
    let motors = if args.motors.is_empty() {
        MotorType::ALL.to_vec()
    } else {
        args.motors.clone()
    };

    let runs = pipeline::run_motors(&layout, &motors, &config)?;
    for run in &runs {
        println!("{}", format_motor_summary(&run.characterization));
    }

    if let Some(dir) = &args.export_dir {
        std::fs::create_dir_all(dir)
            .map_err(|e| AppError::new(2, format!("Failed to create export directory '{}': {e}", dir.display())))?;
        for run in &runs {
            let curve = CurveFile::from_series(run.motor.name(), run.characterization.series());
            write_curve_json(&dir.join(format!("{}.json", run.motor.name())), &curve)?;
        }
        info!("wrote {} curve files to {}", runs.len(), dir.display());
    }
    Ok(())
}

fn handle_breaker(args: BreakerArgs) -> Result<(), AppError> {
    let layout = DataLayout::resolve(args.data.data_dir.as_deref());
    let config = args.to_config();
    let run = pipeline::run_breaker(&layout, &config)?;

    println!("{}", format_breaker_summary(&run.characterization));
    if args.top > 0 {
        println!("Largest residuals:");
        println!("{}", format_residuals(&largest_residuals(&run.residuals, args.top)));
    }

    if let Some(path) = &args.export {
        write_residuals_csv(path, &run.residuals)?;
        info!("wrote residuals to {}", path.display());
    }
    if let Some(path) = &args.export_curve {
        let curve = CurveFile::from_series("main-breaker", run.characterization.series());
        write_curve_json(path, &curve)?;
        info!("wrote curve file {}", path.display());
    }
    Ok(())
}

fn handle_eval(args: EvalArgs) -> Result<(), AppError> {
    let curve = read_curve_json(&args.curve)?;
    let Some(f) = curve.function(&args.function) else {
        let known: Vec<&str> = curve.names().collect();
        return Err(AppError::new(
            2,
            format!(
                "No function `{}` in {} (available: {}).",
                args.function,
                args.curve.display(),
                known.join(", ")
            ),
        ));
    };

    println!("{} {}", f.x_label, f.y_label);
    for x in &args.x {
        println!("{x} {}", f.function.evaluate(*x));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_steps_through_levels() {
        assert_eq!(level_for(0), LevelFilter::Warn);
        assert_eq!(level_for(1), LevelFilter::Info);
        assert_eq!(level_for(2), LevelFilter::Debug);
        assert_eq!(level_for(7), LevelFilter::Trace);
    }
}
