//! Levenberg–Marquardt for small nonlinear least-squares problems.
//!
//! We minimize `Σ (y_i - f(x_i; p))^2` over a handful of parameters `p`.
//! Each trial step solves the damped normal equations
//!
//! ```text
//! (JᵀJ + λ·diag(JᵀJ)) δ = Jᵀ r
//! ```
//!
//! with Marquardt's diagonal scaling, so parameters with very different
//! magnitudes (a scale in the thousands next to an exponent near one) are
//! damped proportionally. Accepted steps shrink `λ`, rejected steps grow it.
//!
//! Every trial (accepted or not) counts against the iteration budget, so the
//! budget bounds the number of model evaluations.

use log::trace;
use nalgebra::{DMatrix, DVector};

/// A model that can be evaluated and differentiated with respect to its parameters.
pub trait DiffModel {
    fn n_params(&self) -> usize;

    fn value(&self, x: f64, params: &[f64]) -> f64;

    /// Write `∂f/∂p_j` at `x` into `out` (length `n_params`).
    fn gradient(&self, x: f64, params: &[f64], out: &mut [f64]);
}

#[derive(Debug, Clone, PartialEq)]
pub struct LmSettings {
    pub max_iterations: usize,
    pub ftol: f64,
    pub xtol: f64,
    pub gtol: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LmOutcome {
    pub params: Vec<f64>,
    pub sse: f64,
    pub iterations: usize,
    pub converged: bool,
}

const LAMBDA_START: f64 = 1e-3;
const LAMBDA_MIN: f64 = 1e-15;
const LAMBDA_MAX: f64 = 1e20;

/// Sum of squared residuals; NaN/inf if the model is undefined anywhere.
pub fn sse<M: DiffModel>(model: &M, xs: &[f64], ys: &[f64], params: &[f64]) -> f64 {
    xs.iter()
        .zip(ys)
        .map(|(&x, &y)| {
            let r = y - model.value(x, params);
            r * r
        })
        .sum()
}

/// Jacobian of the model values (rows = observations, cols = parameters).
pub fn jacobian<M: DiffModel>(model: &M, xs: &[f64], params: &[f64]) -> DMatrix<f64> {
    let p = model.n_params();
    let mut j = DMatrix::<f64>::zeros(xs.len(), p);
    let mut row = vec![0.0; p];
    for (i, &x) in xs.iter().enumerate() {
        model.gradient(x, params, &mut row);
        for (k, v) in row.iter().enumerate() {
            j[(i, k)] = *v;
        }
    }
    j
}

pub fn levenberg_marquardt<M: DiffModel>(
    model: &M,
    xs: &[f64],
    ys: &[f64],
    start: &[f64],
    settings: &LmSettings,
) -> LmOutcome {
    let p = model.n_params();
    let mut params = DVector::from_column_slice(start);
    let mut current_sse = sse(model, xs, ys, params.as_slice());

    let outcome = |params: &DVector<f64>, sse: f64, iterations: usize, converged: bool| LmOutcome {
        params: params.iter().copied().collect(),
        sse,
        iterations,
        converged,
    };

    if !current_sse.is_finite() {
        return outcome(&params, current_sse, 0, false);
    }
    if current_sse == 0.0 {
        return outcome(&params, current_sse, 0, true);
    }

    let mut lambda = LAMBDA_START;
    let mut jtj = DMatrix::<f64>::zeros(p, p);
    let mut gradient = DVector::<f64>::zeros(p);
    let mut stale = true;

    for iteration in 1..=settings.max_iterations {
        if stale {
            let j = jacobian(model, xs, params.as_slice());
            let residuals = DVector::from_iterator(
                xs.len(),
                xs.iter()
                    .zip(ys)
                    .map(|(&x, &y)| y - model.value(x, params.as_slice())),
            );
            jtj = j.transpose() * &j;
            gradient = j.transpose() * residuals;
            stale = false;

            if !gradient.iter().all(|g| g.is_finite()) {
                return outcome(&params, current_sse, iteration - 1, false);
            }
            if gradient.amax() <= settings.gtol {
                return outcome(&params, current_sse, iteration - 1, true);
            }
        }

        let max_diag = (0..p).map(|i| jtj[(i, i)]).fold(0.0_f64, f64::max);
        let floor = (max_diag * 1e-12).max(f64::MIN_POSITIVE);
        let mut damped = jtj.clone();
        for i in 0..p {
            damped[(i, i)] += lambda * jtj[(i, i)].max(floor);
        }

        let Some(chol) = damped.cholesky() else {
            lambda = (lambda * 10.0).min(LAMBDA_MAX);
            continue;
        };
        let step = chol.solve(&gradient);
        let step_small = step.norm() <= settings.xtol * (params.norm() + settings.xtol);

        let candidate = &params + &step;
        let candidate_sse = sse(model, xs, ys, candidate.as_slice());
        trace!("lm iteration {iteration}: lambda={lambda:e} sse={current_sse:e} -> {candidate_sse:e}");

        if candidate_sse.is_finite() && candidate_sse < current_sse {
            let reduction = (current_sse - candidate_sse) / current_sse;
            params = candidate;
            current_sse = candidate_sse;
            lambda = (lambda / 10.0).max(LAMBDA_MIN);
            stale = true;

            if reduction <= settings.ftol || step_small || current_sse == 0.0 {
                return outcome(&params, current_sse, iteration, true);
            }
        } else {
            // No downhill step left at this resolution: we are at a minimum.
            if step_small {
                return outcome(&params, current_sse, iteration, true);
            }
            if lambda >= LAMBDA_MAX {
                return outcome(&params, current_sse, iteration, false);
            }
            lambda = (lambda * 10.0).min(LAMBDA_MAX);
        }
    }

    outcome(&params, current_sse, settings.max_iterations, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `y = p0 · exp(p1 · x)`
    struct Exponential;

    impl DiffModel for Exponential {
        fn n_params(&self) -> usize {
            2
        }

        fn value(&self, x: f64, p: &[f64]) -> f64 {
            p[0] * (p[1] * x).exp()
        }

        fn gradient(&self, x: f64, p: &[f64], out: &mut [f64]) {
            let e = (p[1] * x).exp();
            out[0] = e;
            out[1] = p[0] * x * e;
        }
    }

    fn settings() -> LmSettings {
        LmSettings {
            max_iterations: 200,
            ftol: 1e-12,
            xtol: 1e-12,
            gtol: 1e-14,
        }
    }

    #[test]
    fn recovers_exponential_parameters() {
        let xs: Vec<f64> = (0..12).map(|i| i as f64 * 0.25).collect();
        let ys: Vec<f64> = xs.iter().map(|&x| 2.5 * (-0.7 * x).exp()).collect();

        let out = levenberg_marquardt(&Exponential, &xs, &ys, &[1.0, -0.1], &settings());
        assert!(out.converged, "{out:?}");
        assert!((out.params[0] - 2.5).abs() < 1e-6);
        assert!((out.params[1] + 0.7).abs() < 1e-6);
        assert!(out.sse < 1e-12);
    }

    #[test]
    fn tiny_budget_reports_non_convergence() {
        let xs: Vec<f64> = (0..12).map(|i| i as f64 * 0.25).collect();
        let ys: Vec<f64> = xs.iter().map(|&x| 2.5 * (-0.7 * x).exp()).collect();
        let tight = LmSettings {
            max_iterations: 1,
            ..settings()
        };

        let out = levenberg_marquardt(&Exponential, &xs, &ys, &[100.0, 3.0], &tight);
        assert!(!out.converged);
        assert_eq!(out.iterations, 1);
    }

    #[test]
    fn undefined_start_is_not_converged() {
        let out = levenberg_marquardt(&Exponential, &[1.0], &[1.0], &[f64::NAN, 0.0], &settings());
        assert!(!out.converged);
        assert_eq!(out.iterations, 0);
    }
}
