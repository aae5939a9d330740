//! Basis functions for the two model families.
//!
//! - monomials `x^k` for power-series polynomials
//! - the power-law term `(b·(x + c))^d` and its partial derivatives
//!
//! Numerical notes:
//! - `f64::powf` follows C `pow`: a negative base with a non-integer exponent
//!   yields NaN. Callers treat NaN as "outside the model's domain" and reject
//!   the candidate rather than clamping.

/// `x^k` for a non-negative integer degree.
pub fn monomial(x: f64, degree: usize) -> f64 {
    match i32::try_from(degree) {
        Ok(k) => x.powi(k),
        Err(_) => x.powf(degree as f64),
    }
}

/// Evaluate `Σ c_k x^k` (coefficients lowest degree first) by Horner's rule.
pub fn horner(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

/// `(b·(x + c))^d`.
pub fn power_term(x: f64, b: f64, c: f64, d: f64) -> f64 {
    (b * (x + c)).powf(d)
}

/// Gradient of `a·(b·(x + c))^d` with respect to `(a, b, c, d)`.
pub fn power_law_gradient(x: f64, a: f64, b: f64, c: f64, d: f64) -> [f64; 4] {
    let shifted = x + c;
    let u = b * shifted;
    let g = u.powf(d);
    let g_prev = u.powf(d - 1.0);
    [g, a * d * g_prev * shifted, a * d * g_prev * b, a * g * u.ln()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horner_matches_direct_sum() {
        let c = [1.0, -2.0, 0.5, 3.0];
        for &x in &[-2.0, 0.0, 0.3, 7.0] {
            let direct: f64 = c.iter().enumerate().map(|(k, ck)| ck * monomial(x, k)).sum();
            assert!((horner(&c, x) - direct).abs() < 1e-9);
        }
    }

    #[test]
    fn horner_of_empty_is_zero() {
        assert_eq!(horner(&[], 3.0), 0.0);
    }

    #[test]
    fn power_law_gradient_matches_finite_differences() {
        let (a, b, c, d) = (3.0, 0.2, 1.5, -1.3);
        let x = 4.0;
        let f = |p: [f64; 4]| p[0] * power_term(x, p[1], p[2], p[3]);
        let grad = power_law_gradient(x, a, b, c, d);
        let p = [a, b, c, d];
        for i in 0..4 {
            let h = 1e-6 * p[i].abs().max(1.0);
            let mut up = p;
            let mut down = p;
            up[i] += h;
            down[i] -= h;
            let numeric = (f(up) - f(down)) / (2.0 * h);
            assert!(
                (numeric - grad[i]).abs() < 1e-5 * numeric.abs().max(1.0),
                "param {i}: analytic {} vs numeric {numeric}",
                grad[i]
            );
        }
    }

    #[test]
    fn negative_base_with_fractional_exponent_is_nan() {
        assert!(power_term(-2.0, 1.0, 0.0, 0.5).is_nan());
        assert_eq!(power_term(-2.0, 1.0, 0.0, 2.0), 4.0);
    }
}
