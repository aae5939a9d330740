//! Formatted terminal output.
//!
//! Formatting lives in one place so the fitting code stays free of
//! presentation and output changes stay local.

use crate::characterize::{BreakerCharacterization, FittedSeries, MotorCharacterization};
use crate::domain::Boundary;
use crate::report::Residual;

/// Summary of one motor characterization.
pub fn format_motor_summary(motor: &MotorCharacterization) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== frc - motor {} ===\n", motor.label()));
    out.push_str(&format!(
        "Curve: n={} | speed=[{:.2}, {:.2}] rev/s\n",
        motor.curve().len(),
        min(&motor.current().x),
        max(&motor.current().x),
    ));
    let r = motor.reference();
    out.push_str(&format!(
        "Stall captures: {} | reference {:.1} V: current={:.3} A torque={:.4} N·m (t={:.3}s)\n",
        motor.stall_frames().len(),
        motor.reference_voltage(),
        r.current,
        r.torque,
        r.time,
    ));

    out.push_str("\nStall samples:\n");
    out.push_str(&format!(
        "{:>8} {:>8} {:>10} {:>10} {:>10}\n",
        "test_v", "time", "current", "voltage", "torque"
    ));
    for p in motor.stall_index().points() {
        out.push_str(&format!(
            "{:>8.1} {:>8.3} {:>10.3} {:>10.3} {:>10.4}\n",
            p.test_voltage, p.time, p.current, p.voltage, p.torque
        ));
    }

    out.push('\n');
    out.push_str(&format_series_table(&motor.series()));
    out
}

/// Summary of the main breaker characterization.
pub fn format_breaker_summary(breaker: &BreakerCharacterization) -> String {
    let mut out = String::new();

    out.push_str("=== frc - main breaker ===\n");
    let (lo, hi) = breaker.ambient_derate();
    out.push_str(&format!(
        "Ambient: {:.1} °C | derate=[{lo:.4}, {hi:.4}]\n",
        breaker.ambient_temp()
    ));
    for boundary in Boundary::ALL {
        let fit = breaker.trip_fit(boundary);
        out.push_str(&format!(
            "Trip {}: a,b,c,d={} e={:.6} (iterations={})\n",
            boundary.name(),
            fmt_vec(&fit.params),
            fit.shift,
            fit.iterations
        ));
    }

    out.push('\n');
    out.push_str(&format_series_table(&breaker.series()));
    out
}

/// One line per fitted series: name, fit quality and function.
pub fn format_series_table(series: &[&FittedSeries]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<28} {:>4} {:>12} {:>12} {:>12}  {}\n",
            "function", "n", "sse", "rmse", "max|res|", "f(x)"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<28} {:-<4} {:-<12} {:-<12} {:-<12}  {:-<4}\n", "", "", "", "", "", "").trim_end());
    out.push('\n');

    for s in series {
        let q = s.quality();
        out.push_str(&format!(
            "{:<28} {:>4} {:>12.4e} {:>12.4e} {:>12.4e}  {}\n",
            truncate(&s.name, 28),
            q.n,
            q.sse,
            q.rmse,
            q.max_abs_residual,
            s.function
        ));
    }
    out
}

/// Table of the given residual rows.
pub fn format_residuals(rows: &[Residual]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<28} {:>10} {:>12} {:>12} {:>12}\n",
        "function", "x", "y_obs", "y_fit", "residual"
    ));
    for r in rows {
        out.push_str(&format!(
            "{:<28} {:>10.3} {:>12.4} {:>12.4} {:>12.4}\n",
            truncate(&r.function, 28),
            r.x,
            r.y_obs,
            r.y_fit,
            r.residual
        ));
    }
    out
}

fn min(v: &[f64]) -> f64 {
    v.iter().copied().fold(f64::INFINITY, f64::min)
}

fn max(v: &[f64]) -> f64 {
    v.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.6}")).collect();
    format!("[{}]", parts.join(", "))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
