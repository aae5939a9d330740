//! Shifted power-law fitting.
//!
//! We fit `f(x) = a·(b·(x + c))^d` by nonlinear least squares, then add a
//! constant `e` so the curve passes exactly through the last sample:
//!
//! ```text
//! e = y_last - f(x_last)
//! ```
//!
//! "Last" is the last row in table order, not the largest x.
//!
//! Search strategy:
//! - score every `(c, d)` seed from [`seed_grid`] in parallel (`b = 1`, `a` in closed form)
//! - refine the best few seeds with Levenberg–Marquardt, also in parallel
//! - keep the lowest-SSE refinement that converged
//!
//! Selection is deterministic: ties on SSE break by seed index.

use log::{debug, warn};
use nalgebra::DMatrix;
use rayon::prelude::*;

use crate::domain::{FitQuality, ParametricOptions};
use crate::error::CurveError;
use crate::fit::seed_grid::seed_grid;
use crate::math::{LmOutcome, LmSettings, jacobian, levenberg_marquardt, power_term};
use crate::models::{FittedFunction, PowerLaw};

/// Number of free parameters in `a·(b·(x + c))^d`.
const N_PARAMS: usize = 4;

/// Result of a shifted power-law fit.
#[derive(Debug, Clone, PartialEq)]
pub struct ParametricFit {
    /// `[a, b, c, d]` before the shift.
    pub params: [f64; 4],
    /// Vertical shift `e`.
    pub shift: f64,
    /// Parameter covariance estimate, `None` when there are no residual degrees of freedom.
    pub covariance: Option<DMatrix<f64>>,
    /// SSE of the unshifted fit.
    pub sse: f64,
    /// Solver iterations spent on the winning seed.
    pub iterations: usize,
    /// The shifted function `f(x) + e`.
    pub function: FittedFunction,
    /// Diagnostics of the shifted function.
    pub quality: FitQuality,
}

impl ParametricFit {
    pub fn evaluate(&self, x: f64) -> f64 {
        self.function.evaluate(x)
    }
}

#[derive(Debug, Clone)]
struct Seed {
    idx: usize,
    params: [f64; 4],
    sse: f64,
}

/// Fit `a·(b·(x + c))^d + e` to `(x, y)`.
pub fn fit_power_law(x: &[f64], y: &[f64], opts: &ParametricOptions) -> Result<ParametricFit, CurveError> {
    if x.len() != y.len() {
        return Err(CurveError::invalid(format!(
            "x has {} values but y has {}",
            x.len(),
            y.len()
        )));
    }
    if x.len() < N_PARAMS {
        return Err(CurveError::insufficient("power-law fit", N_PARAMS, x.len()));
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(CurveError::invalid("non-finite value in power-law fit input"));
    }

    let grid = seed_grid(x, opts)?;
    let mut seeds: Vec<Seed> = grid
        .par_iter()
        .enumerate()
        .filter_map(|(idx, &(c, d))| score_seed(idx, c, d, x, y))
        .collect();
    if seeds.is_empty() {
        warn!("power-law fit: none of {} seeds is defined over the sample", grid.len());
        return Err(CurveError::Convergence {
            context: "power-law fit has no valid starting point".to_string(),
            iterations: 0,
        });
    }
    seeds.sort_by(|l, r| l.sse.total_cmp(&r.sse).then(l.idx.cmp(&r.idx)));
    seeds.truncate(opts.refine_seeds.max(1));
    debug!(
        "power-law fit: {} seeds scored, refining {} (best seed sse={:e})",
        grid.len(),
        seeds.len(),
        seeds[0].sse
    );

    let settings = LmSettings {
        max_iterations: opts.max_iterations,
        ftol: opts.ftol,
        xtol: opts.xtol,
        gtol: opts.gtol,
    };
    let refined: Vec<(usize, LmOutcome)> = seeds
        .par_iter()
        .map(|seed| (seed.idx, levenberg_marquardt(&PowerLaw, x, y, &seed.params, &settings)))
        .collect();

    let best = refined
        .iter()
        .filter(|(_, out)| out.converged && out.sse.is_finite())
        .min_by(|(li, l), (ri, r)| l.sse.total_cmp(&r.sse).then(li.cmp(ri)));
    let Some((seed_idx, outcome)) = best else {
        warn!("power-law fit: no refinement converged within {} iterations", opts.max_iterations);
        return Err(CurveError::Convergence {
            context: "power-law fit".to_string(),
            iterations: opts.max_iterations,
        });
    };

    let params = [outcome.params[0], outcome.params[1], outcome.params[2], outcome.params[3]];
    let [a, b, c, d] = params;

    // Safe: length was checked above.
    let x_last = x[x.len() - 1];
    let y_last = y[y.len() - 1];
    let shift = y_last - a * power_term(x_last, b, c, d);
    if !shift.is_finite() {
        return Err(CurveError::Fit(format!(
            "power law is undefined at the last sample x={x_last}"
        )));
    }

    let covariance = covariance(x, &params, outcome.sse);
    let function = FittedFunction::ParametricPower { a, b, c, d, e: shift };
    let quality = function.quality(x, y);
    debug!(
        "power-law fit: seed {seed_idx} converged in {} iterations, sse={:e}, shift={shift:e}",
        outcome.iterations, outcome.sse
    );

    Ok(ParametricFit {
        params,
        shift,
        covariance,
        sse: outcome.sse,
        iterations: outcome.iterations,
        function,
        quality,
    })
}

/// Score one `(c, d)` seed with `b = 1` and the closed-form best `a`.
fn score_seed(idx: usize, c: f64, d: f64, x: &[f64], y: &[f64]) -> Option<Seed> {
    let g: Vec<f64> = x.iter().map(|&xi| power_term(xi, 1.0, c, d)).collect();
    if g.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let gg: f64 = g.iter().map(|v| v * v).sum();
    if !(gg.is_finite() && gg > 0.0) {
        return None;
    }
    let a = g.iter().zip(y).map(|(gi, yi)| gi * yi).sum::<f64>() / gg;
    let sse: f64 = g
        .iter()
        .zip(y)
        .map(|(gi, yi)| {
            let r = yi - a * gi;
            r * r
        })
        .sum();
    sse.is_finite().then_some(Seed {
        idx,
        params: [a, 1.0, c, d],
        sse,
    })
}

/// `σ² · (JᵀJ)⁺` with `σ² = SSE / (n - 4)`.
///
/// `a` and `b` only enter through `a·b^d`, so `JᵀJ` is rank deficient and we
/// use the pseudo-inverse.
fn covariance(x: &[f64], params: &[f64; 4], sse: f64) -> Option<DMatrix<f64>> {
    let dof = x.len().checked_sub(N_PARAMS).filter(|d| *d > 0)?;
    let j = jacobian(&PowerLaw, x, params);
    let jtj = j.transpose() * &j;
    let eps = jtj.amax() * f64::EPSILON * N_PARAMS as f64;
    let pinv = jtj.pseudo_inverse(eps).ok()?;
    let cov = pinv * (sse / dof as f64);
    cov.iter().all(|v| v.is_finite()).then_some(cov)
}
