//! Fitted function representation and evaluation.
//!
//! A fitted function is either a power series or a shifted power law. Both
//! are plain data (no captured closures), so they can be cloned, compared,
//! serialized to a curve file and evaluated later.
//!
//! The fitters rely on two primitive operations implemented here:
//! - build a design row for a given `x` and retained degree set (for OLS)
//! - evaluate a fitted function (for residuals, reports and callers)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::FitQuality;
use crate::math::{DiffModel, horner, monomial, power_law_gradient, power_term};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FittedFunction {
    /// `Σ c_k x^k`, coefficients lowest degree first.
    Polynomial { coefficients: Vec<f64> },
    /// `a·(b·(x + c))^d + e`
    ParametricPower { a: f64, b: f64, c: f64, d: f64, e: f64 },
}

impl FittedFunction {
    pub fn evaluate(&self, x: f64) -> f64 {
        match self {
            FittedFunction::Polynomial { coefficients } => horner(coefficients, x),
            FittedFunction::ParametricPower { a, b, c, d, e } => a * power_term(x, *b, *c, *d) + e,
        }
    }

    pub fn evaluate_all(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.evaluate(x)).collect()
    }

    /// Residual diagnostics of this function against observed pairs.
    pub fn quality(&self, xs: &[f64], ys: &[f64]) -> FitQuality {
        let mut sse = 0.0;
        let mut max_abs_residual = 0.0_f64;
        for (&x, &y) in xs.iter().zip(ys) {
            let r = y - self.evaluate(x);
            sse += r * r;
            max_abs_residual = max_abs_residual.max(r.abs());
        }
        let n = xs.len().min(ys.len());
        let rmse = if n == 0 { 0.0 } else { (sse / n as f64).sqrt() };
        FitQuality {
            sse,
            rmse,
            max_abs_residual,
            n,
        }
    }
}

impl fmt::Display for FittedFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FittedFunction::Polynomial { coefficients } => {
                let mut wrote = false;
                for (k, c) in coefficients.iter().enumerate() {
                    if *c == 0.0 {
                        continue;
                    }
                    if wrote {
                        f.write_str(if *c < 0.0 { " - " } else { " + " })?;
                    } else if *c < 0.0 {
                        f.write_str("-")?;
                    }
                    let mag = c.abs();
                    match k {
                        0 => write!(f, "{mag:.6}")?,
                        1 => write!(f, "{mag:.6}·x")?,
                        _ => write!(f, "{mag:.6}·x^{k}")?,
                    }
                    wrote = true;
                }
                if !wrote {
                    f.write_str("0")?;
                }
                Ok(())
            }
            FittedFunction::ParametricPower { a, b, c, d, e } => {
                write!(f, "{a:.6}·({b:.6}·(x + {c:.6}))^{d:.6} + {e:.6}")
            }
        }
    }
}

/// Fill a design row of monomials for the retained `degrees`.
///
/// # Panics
/// Panics if `out` is shorter than `degrees`. Callers should size it correctly.
pub fn fill_design_row(x: f64, degrees: &[usize], out: &mut [f64]) {
    for (slot, &k) in out.iter_mut().zip(degrees) {
        *slot = monomial(x, k);
    }
}

/// The unshifted power law `a·(b·(x + c))^d`, parameters `[a, b, c, d]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PowerLaw;

impl DiffModel for PowerLaw {
    fn n_params(&self) -> usize {
        4
    }

    fn value(&self, x: f64, p: &[f64]) -> f64 {
        p[0] * power_term(x, p[1], p[2], p[3])
    }

    fn gradient(&self, x: f64, p: &[f64], out: &mut [f64]) {
        out.copy_from_slice(&power_law_gradient(x, p[0], p[1], p[2], p[3]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polynomial_evaluates_lowest_degree_first() {
        let f = FittedFunction::Polynomial {
            coefficients: vec![1.0, 2.0, 3.0],
        };
        assert_eq!(f.evaluate(2.0), 1.0 + 4.0 + 12.0);
        assert_eq!(f.evaluate_all(&[0.0, 1.0]), vec![1.0, 6.0]);
    }

    #[test]
    fn parametric_power_includes_shift() {
        let f = FittedFunction::ParametricPower {
            a: 2.0,
            b: 0.5,
            c: 2.0,
            d: 2.0,
            e: -1.0,
        };
        // 2 * (0.5 * (2 + 2))^2 - 1 = 7
        assert_eq!(f.evaluate(2.0), 7.0);
    }

    #[test]
    fn quality_reports_residuals() {
        let f = FittedFunction::Polynomial {
            coefficients: vec![0.0, 1.0],
        };
        let q = f.quality(&[0.0, 1.0, 2.0], &[0.0, 1.0, 4.0]);
        assert_eq!(q.n, 3);
        assert_eq!(q.sse, 4.0);
        assert_eq!(q.max_abs_residual, 2.0);
    }

    #[test]
    fn display_skips_zero_terms() {
        let f = FittedFunction::Polynomial {
            coefficients: vec![0.0, 0.5, 0.0, -0.25],
        };
        assert_eq!(f.to_string(), "0.500000·x - 0.250000·x^3");
    }

    #[test]
    fn serializes_with_kind_tag() {
        let f = FittedFunction::ParametricPower {
            a: 1.0,
            b: 2.0,
            c: 3.0,
            d: 4.0,
            e: 5.0,
        };
        let json = serde_json::to_string(&f).unwrap();
        assert!(json.contains("\"kind\":\"parametric_power\""));
        let back: FittedFunction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, f);
    }
}
