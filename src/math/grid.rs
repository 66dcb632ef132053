//! Evaluation grid generation.
//!
//! Calibration curves are evaluated on a fixed grid in log-flow space and
//! surface traces on a fixed grid along the travel axis, so both share one
//! linear-spacing helper with strict range validation.

use crate::error::QcError;

/// Generate `steps` evenly spaced points between `min` and `max` (inclusive).
pub fn lin_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, QcError> {
    if !(min.is_finite() && max.is_finite() && max > min) {
        return Err(QcError::precondition(
            "grid",
            format!("invalid range: min={min}, max={max} (must be finite and max>min)"),
        ));
    }
    if steps < 2 {
        return Err(QcError::precondition("grid", "steps must be >= 2"));
    }

    let step = (max - min) / (steps as f64 - 1.0);
    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push(min + step * i as f64);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lin_space_includes_endpoints() {
        let v = lin_space(0.0, 10.0, 5).unwrap();
        assert_eq!(v.len(), 5);
        assert!((v[0] - 0.0).abs() < 1e-12);
        assert!((v[4] - 10.0).abs() < 1e-12);
        assert!((v[1] - 2.5).abs() < 1e-12);
    }

    #[test]
    fn lin_space_rejects_degenerate_ranges() {
        assert!(lin_space(1.0, 1.0, 5).is_err());
        assert!(lin_space(2.0, 1.0, 5).is_err());
        assert!(lin_space(0.0, 1.0, 1).is_err());
        assert!(lin_space(f64::NAN, 1.0, 5).is_err());
    }
}
