//! Least squares solver.
//!
//! Every linear fit in this crate reduces to:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! Implementation choices:
//! - SVD rather than normal equations, so tall Vandermonde matrices with
//!   widely different column scales stay well behaved.
//! - Rank is checked explicitly. A rank-deficient design (repeated x values,
//!   an all-zero column) is reported as an error instead of silently returning
//!   the minimum-norm solution.

use nalgebra::{DMatrix, DVector};

use crate::error::CurveError;

/// Solve a least squares problem using SVD.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<DVector<f64>, CurveError> {
    let (n, p) = x.shape();
    if p == 0 {
        return Err(CurveError::Fit("design matrix has no columns".to_string()));
    }
    if n < p {
        return Err(CurveError::Fit(format!(
            "underdetermined system: {n} equations for {p} unknowns"
        )));
    }
    if y.len() != n {
        return Err(CurveError::invalid(format!(
            "observation vector has {} rows, design matrix has {n}",
            y.len()
        )));
    }

    let svd = x.clone().svd(true, true);

    // Same cutoff LAPACK's gelsd uses by default.
    let max_sv = svd.singular_values.iter().copied().fold(0.0_f64, f64::max);
    let tol = max_sv * n.max(p) as f64 * f64::EPSILON;
    let rank = svd.rank(tol);
    if rank < p {
        return Err(CurveError::Fit(format!(
            "singular design matrix: rank {rank} < {p} columns"
        )));
    }

    let beta = svd
        .solve(y, tol)
        .map_err(|e| CurveError::Fit(e.to_string()))?;

    if !beta.iter().all(|v| v.is_finite()) {
        return Err(CurveError::Fit("non-finite least-squares solution".to_string()));
    }
    Ok(beta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn collinear_columns_are_rejected() {
        // Every x is the same, so the intercept and slope columns are parallel.
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 4.0, 1.0, 4.0, 1.0, 4.0]);
        let y = DVector::from_row_slice(&[1.0, 2.0, 3.0]);
        let err = solve_least_squares(&x, &y).unwrap_err();
        assert!(matches!(err, CurveError::Fit(_)));
    }

    #[test]
    fn wide_systems_are_underdetermined() {
        let x = DMatrix::from_row_slice(1, 2, &[1.0, 2.0]);
        let y = DVector::from_row_slice(&[1.0]);
        assert!(matches!(solve_least_squares(&x, &y), Err(CurveError::Fit(_))));
    }
}
