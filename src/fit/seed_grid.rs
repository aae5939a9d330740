//! Starting-point grids for the power-law fitter.
//!
//! `a·(b·(x+c))^d` is linear in `a` once `(b, c, d)` are fixed, and `b` only
//! rescales `a` (`a·b^d` is the identifiable product). So we seed the solver by
//! scanning a deterministic `(c, d)` grid with `b = 1` and solving for `a` in
//! closed form.

use crate::domain::ParametricOptions;
use crate::error::CurveError;

/// Smallest shift offset tried, as a fraction of the x span.
const SHIFT_FRAC_MIN: f64 = 1e-3;
/// Largest shift offset tried, as a fraction of the x span.
const SHIFT_FRAC_MAX: f64 = 2.0;

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
pub fn log_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, CurveError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0 && max > min) {
        return Err(CurveError::invalid(format!(
            "invalid log range: min={min}, max={max} (must be finite, >0, and max>min)"
        )));
    }
    if steps < 2 {
        return Err(CurveError::invalid("log range steps must be >= 2"));
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push((ln_min + step * i as f64).exp());
    }
    Ok(out)
}

/// Exponents `±m` for log-spaced magnitudes `m`, negative first.
pub fn exponent_grid(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, CurveError> {
    let magnitudes = log_space(min, max, steps)?;
    let mut out: Vec<f64> = magnitudes.iter().rev().map(|m| -m).collect();
    out.extend(magnitudes);
    Ok(out)
}

/// Shifts `c` that keep `x + c > 0` over the whole sample.
///
/// Includes `c = 0` when every x is already positive.
pub fn shift_grid(xs: &[f64], steps: usize) -> Result<Vec<f64>, CurveError> {
    let x_min = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let x_max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !(x_min.is_finite() && x_max.is_finite()) {
        return Err(CurveError::invalid("shift grid needs finite x values"));
    }

    let span = if x_max > x_min {
        x_max - x_min
    } else {
        x_min.abs().max(1.0)
    };

    let mut out = Vec::with_capacity(steps + 1);
    if x_min > 0.0 {
        out.push(0.0);
    }
    for frac in log_space(SHIFT_FRAC_MIN, SHIFT_FRAC_MAX, steps)? {
        out.push(-x_min + span * frac);
    }
    Ok(out)
}

/// Cartesian `(c, d)` seed grid for the given sample.
pub fn seed_grid(xs: &[f64], opts: &ParametricOptions) -> Result<Vec<(f64, f64)>, CurveError> {
    let shifts = shift_grid(xs, opts.seed_shift_steps)?;
    let exponents = exponent_grid(
        opts.seed_exponent_min,
        opts.seed_exponent_max,
        opts.seed_exponent_steps,
    )?;

    let mut out = Vec::with_capacity(shifts.len() * exponents.len());
    for &c in &shifts {
        for &d in &exponents {
            out.push((c, d));
        }
    }
    Ok(out)
}
