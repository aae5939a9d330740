//! Power-series polynomial fitting.
//!
//! Given:
//! - sample points `x_i`
//! - observed values `y_i`
//! - either a maximum degree `d` (retain `0..=d`) or an explicit degree set
//!
//! we solve one ordinary least squares problem for the retained coefficients.
//! Degrees outside the set get a coefficient of exactly `0.0`, so leaving out
//! degree 0 pins the curve to the origin.
//!
//! Columns of the Vandermonde matrix are scaled to unit norm before solving and
//! unscaled afterwards. Without this, a cubic over voltages of ~12 mixes column
//! magnitudes of 1 and ~1700 and the rank test becomes unreliable.

use nalgebra::{DMatrix, DVector};

use crate::domain::FitQuality;
use crate::error::CurveError;
use crate::math::solve_least_squares;
use crate::models::{FittedFunction, fill_design_row};

/// Which power-series terms to fit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degrees {
    /// Every degree `0..=d`.
    UpTo(usize),
    /// Exactly these degrees (order and duplicates ignored).
    Set(Vec<usize>),
}

impl Degrees {
    /// Sorted, de-duplicated retained degrees.
    pub fn retained(&self) -> Vec<usize> {
        match self {
            Degrees::UpTo(d) => (0..=*d).collect(),
            Degrees::Set(set) => {
                let mut v = set.clone();
                v.sort_unstable();
                v.dedup();
                v
            }
        }
    }
}

impl From<usize> for Degrees {
    fn from(degree: usize) -> Self {
        Degrees::UpTo(degree)
    }
}

impl From<&[usize]> for Degrees {
    fn from(set: &[usize]) -> Self {
        Degrees::Set(set.to_vec())
    }
}

/// Result of a polynomial fit.
#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialFit {
    pub function: FittedFunction,
    pub degrees: Vec<usize>,
    pub quality: FitQuality,
}

impl PolynomialFit {
    /// Dense coefficients, lowest degree first.
    pub fn coefficients(&self) -> &[f64] {
        match &self.function {
            FittedFunction::Polynomial { coefficients } => coefficients,
            FittedFunction::ParametricPower { .. } => &[],
        }
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        self.function.evaluate(x)
    }
}

/// Fit a power series to `(x, y)` by least squares.
pub fn fit_polynomial(x: &[f64], y: &[f64], degrees: &Degrees) -> Result<PolynomialFit, CurveError> {
    if x.len() != y.len() {
        return Err(CurveError::invalid(format!(
            "x has {} values but y has {}",
            x.len(),
            y.len()
        )));
    }
    let retained = degrees.retained();
    let Some(&max_degree) = retained.last() else {
        return Err(CurveError::invalid("empty degree set"));
    };
    let n = x.len();
    if n < max_degree + 1 {
        return Err(CurveError::insufficient(
            format!("degree {max_degree} polynomial fit"),
            max_degree + 1,
            n,
        ));
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(CurveError::invalid("non-finite value in polynomial fit input"));
    }

    let p = retained.len();
    let mut design = DMatrix::<f64>::zeros(n, p);
    let mut row = vec![0.0; p];
    for (i, &xi) in x.iter().enumerate() {
        fill_design_row(xi, &retained, &mut row);
        for (j, v) in row.iter().enumerate() {
            design[(i, j)] = *v;
        }
    }

    let scales: Vec<f64> = (0..p)
        .map(|j| {
            let norm = design.column(j).norm();
            if norm > 0.0 { norm } else { 1.0 }
        })
        .collect();
    for (j, s) in scales.iter().enumerate() {
        design.column_mut(j).unscale_mut(*s);
    }

    let beta = solve_least_squares(&design, &DVector::from_column_slice(y))?;

    let mut coefficients = vec![0.0; max_degree + 1];
    for (j, &k) in retained.iter().enumerate() {
        coefficients[k] = beta[j] / scales[j];
    }

    let function = FittedFunction::Polynomial { coefficients };
    let quality = function.quality(x, y);
    Ok(PolynomialFit {
        function,
        degrees: retained,
        quality,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn interpolates_degree_plus_one_points() {
        let x = [-1.0, 0.5, 2.0, 3.5];
        let y = [4.0, -1.0, 2.5, 10.0];
        let fit = fit_polynomial(&x, &y, &Degrees::UpTo(3)).unwrap();
        for (&xi, &yi) in x.iter().zip(&y) {
            assert!((fit.evaluate(xi) - yi).abs() < 1e-9, "x={xi}");
        }
    }

    #[test]
    fn recovers_line_slope_and_intercept() {
        let x: Vec<f64> = (0..20).map(|i| i as f64 * 0.75).collect();
        let y: Vec<f64> = x.iter().map(|v| -3.25 * v + 17.5).collect();
        let fit = fit_polynomial(&x, &y, &Degrees::UpTo(1)).unwrap();
        let c = fit.coefficients();
        assert_relative_eq!(c[0], 17.5, max_relative = 1e-9);
        assert_relative_eq!(c[1], -3.25, max_relative = 1e-9);
    }

    #[test]
    fn omitted_constant_term_passes_through_origin() {
        let x = [0.0, 2.0, 4.0, 6.0, 8.0, 10.0, 12.0];
        let y = [0.05, 0.2, 0.45, 0.5, 0.7, 0.8, 1.0];
        let fit = fit_polynomial(&x, &y, &Degrees::Set(vec![3, 1, 2])).unwrap();
        assert_eq!(fit.degrees, vec![1, 2, 3]);
        assert_eq!(fit.coefficients()[0], 0.0);
        assert_eq!(fit.evaluate(0.0), 0.0);
    }

    #[test]
    fn too_few_points_is_insufficient_data() {
        let err = fit_polynomial(&[1.0, 2.0], &[1.0, 2.0], &Degrees::UpTo(2)).unwrap_err();
        assert_eq!(
            err,
            CurveError::insufficient("degree 2 polynomial fit", 3, 2)
        );
    }

    #[test]
    fn repeated_x_is_singular() {
        let err = fit_polynomial(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0], &Degrees::UpTo(1)).unwrap_err();
        assert!(matches!(err, CurveError::Fit(_)));
    }

    #[test]
    fn mismatched_lengths_are_invalid() {
        let err = fit_polynomial(&[1.0, 2.0], &[1.0], &Degrees::UpTo(0)).unwrap_err();
        assert!(matches!(err, CurveError::InvalidInput(_)));
    }

    #[test]
    fn refitting_is_bit_identical() {
        let x = [0.0, 1.0, 2.5, 4.0, 7.0];
        let y = [1.0, 0.3, -0.2, 2.0, 5.5];
        let a = fit_polynomial(&x, &y, &Degrees::UpTo(2)).unwrap();
        let b = fit_polynomial(&x, &y, &Degrees::UpTo(2)).unwrap();
        assert_eq!(a, b);
    }
}
