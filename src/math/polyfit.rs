//! Polynomial least squares.
//!
//! We repeatedly solve small regression problems of the form:
//!
//! ```text
//! minimize Σ (y_i - Σ_j c_j x_i^j)^2
//! ```
//!
//! Implementation choices:
//! - The design matrix is a plain Vandermonde matrix (degree ≤ 10, so
//!   columns stay few and conditioning is manageable on log-flow inputs).
//! - We solve via SVD, which handles tall matrices (more rows than columns);
//!   nalgebra's `QR::solve` is intended for square systems.
//! - Progressively looser tolerances are tried before giving up, since
//!   near-duplicate flow samples can make columns nearly collinear.

use nalgebra::{DMatrix, DVector};

use crate::error::QcError;

/// Fit a degree-`degree` polynomial to `(x, y)`; coefficients low-to-high.
pub fn fit_polynomial(x: &[f64], y: &[f64], degree: usize) -> Result<Vec<f64>, QcError> {
    let n = x.len();
    let p = degree + 1;

    if y.len() != n {
        return Err(QcError::precondition(
            "samples",
            format!("x has {n} values, y has {}", y.len()),
        ));
    }
    if n < p {
        return Err(QcError::UnderdeterminedFit {
            degree,
            needed: p,
            got: n,
        });
    }
    if let Some(i) = x.iter().chain(y.iter()).position(|v| !v.is_finite()) {
        return Err(QcError::precondition(
            "samples",
            format!("non-finite sample value at position {i}"),
        ));
    }

    let mut design = DMatrix::<f64>::zeros(n, p);
    for i in 0..n {
        let mut pow = 1.0;
        for j in 0..p {
            design[(i, j)] = pow;
            pow *= x[i];
        }
    }
    let rhs = DVector::from_column_slice(y);

    solve_least_squares(&design, &rhs)
        .map(|beta| beta.iter().copied().collect())
        .ok_or_else(|| {
            QcError::Fit(format!(
                "degree-{degree} polynomial system is too ill-conditioned to solve"
            ))
        })
}

/// Evaluate a polynomial (coefficients low-to-high) at `x` via Horner.
pub fn eval_polynomial(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
fn solve_least_squares(design: &DMatrix<f64>, rhs: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = design.clone().svd(true, true);

    // Try progressively looser tolerances if the strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(rhs, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_linear_coefficients_exactly() {
        // y = 2 + 3x
        let x = [0.0, 1.0, 2.0, 3.0];
        let y: Vec<f64> = x.iter().map(|v| 2.0 + 3.0 * v).collect();

        let c = fit_polynomial(&x, &y, 1).unwrap();
        assert_eq!(c.len(), 2);
        assert!((c[0] - 2.0).abs() < 1e-10);
        assert!((c[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn recovers_quadratic_within_tolerance() {
        // y = 1 - 2x + 0.5x^2
        let x: Vec<f64> = (0..12).map(|i| i as f64 * 0.5).collect();
        let y: Vec<f64> = x.iter().map(|v| 1.0 - 2.0 * v + 0.5 * v * v).collect();

        let c = fit_polynomial(&x, &y, 2).unwrap();
        assert!((c[0] - 1.0).abs() < 1e-8);
        assert!((c[1] + 2.0).abs() < 1e-8);
        assert!((c[2] - 0.5).abs() < 1e-8);
    }

    #[test]
    fn underdetermined_fit_is_a_distinct_error() {
        let err = fit_polynomial(&[1.0, 2.0], &[1.0, 2.0], 2).unwrap_err();
        assert!(matches!(
            err,
            QcError::UnderdeterminedFit {
                degree: 2,
                needed: 3,
                got: 2
            }
        ));
    }

    #[test]
    fn horner_matches_direct_evaluation() {
        let coeffs = [1.0, -2.0, 0.5];
        let x = 3.0;
        let direct = 1.0 - 2.0 * x + 0.5 * x * x;
        assert!((eval_polynomial(&coeffs, x) - direct).abs() < 1e-12);
        assert_eq!(eval_polynomial(&[], 5.0), 0.0);
    }
}
