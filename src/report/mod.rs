//! Reporting utilities: residuals and formatted terminal output.

use crate::characterize::FittedSeries;
use crate::error::AppError;

pub mod format;

pub use format::*;

/// Observed vs fitted value of one sample of one fitted series.
#[derive(Debug, Clone, PartialEq)]
pub struct Residual {
    pub function: String,
    pub x_label: String,
    pub y_label: String,
    pub x: f64,
    pub y_obs: f64,
    pub y_fit: f64,
    pub residual: f64,
}

/// Fitted values and residuals for every sample of every series.
pub fn compute_residuals<'a>(series: impl IntoIterator<Item = &'a FittedSeries>) -> Result<Vec<Residual>, AppError> {
    let mut out = Vec::new();
    for s in series {
        for (&x, &y_obs) in s.x.iter().zip(&s.y) {
            let y_fit = s.evaluate(x);
            if !y_fit.is_finite() {
                return Err(AppError::new(
                    4,
                    format!("Non-finite prediction of {} at {} = {x}.", s.name, s.x_label),
                ));
            }
            out.push(Residual {
                function: s.name.clone(),
                x_label: s.x_label.clone(),
                y_label: s.y_label.clone(),
                x,
                y_obs,
                y_fit,
                residual: y_obs - y_fit,
            });
        }
    }
    Ok(out)
}

/// The `top_n` residuals of largest magnitude, largest first.
pub fn largest_residuals(residuals: &[Residual], top_n: usize) -> Vec<Residual> {
    let mut sorted = residuals.to_vec();
    sorted.sort_by(|a, b| b.residual.abs().total_cmp(&a.residual.abs()));
    sorted.truncate(top_n);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FittedFunction;

    fn series() -> FittedSeries {
        FittedSeries::new(
            "line",
            ("x", "y"),
            vec![0.0, 1.0, 2.0],
            vec![0.0, 1.5, 1.0],
            FittedFunction::Polynomial {
                coefficients: vec![0.0, 1.0],
            },
        )
    }

    #[test]
    fn compute_residuals_basic() {
        let s = series();
        let residuals = compute_residuals([&s]).unwrap();
        assert_eq!(residuals.len(), 3);
        assert_eq!(residuals[1].y_fit, 1.0);
        assert_eq!(residuals[1].residual, 0.5);
        assert_eq!(residuals[2].residual, -1.0);
    }

    #[test]
    fn largest_residuals_by_magnitude() {
        let s = series();
        let residuals = compute_residuals([&s]).unwrap();
        let top = largest_residuals(&residuals, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].x, 2.0);
        assert_eq!(top[1].x, 1.0);
    }

    #[test]
    fn undefined_prediction_is_an_error() {
        let s = FittedSeries::new(
            "power",
            ("x", "y"),
            vec![-1.0],
            vec![0.0],
            FittedFunction::ParametricPower {
                a: 1.0,
                b: 1.0,
                c: 0.0,
                d: 0.5,
                e: 0.0,
            },
        );
        let err = compute_residuals([&s]).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }
}
