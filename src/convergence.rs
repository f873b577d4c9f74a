//! Convergence monitor for the refinement loop.
//!
//! The loop stops once an iterate barely differs from the previous one:
//! `sum((prev - cur)^2) / sum(cur^2) <= tolerance`.

use crate::errors::{validate_finite, SurrogateError, SurrogateResult};
use crate::preprocessing::{max_abs, scaled_sum_of_squares};

/// Successive-iterate ratio `z / I`.
///
/// `z` is the sum of squared differences and `I` the energy of `current`.
/// Both sums are taken on values divided by `max|current|`, which leaves the
/// ratio unchanged and keeps it finite for any finite input. Fails with
/// `DegenerateSequence` when `current` is identically zero, where the ratio
/// is undefined.
pub fn convergence_ratio(current: &[f64], previous: &[f64]) -> SurrogateResult<f64> {
    if current.len() != previous.len() {
        return Err(SurrogateError::NumericalError {
            reason: format!(
                "iterates differ in length: {} vs {}",
                current.len(),
                previous.len()
            ),
            operation: Some("convergence_ratio".to_string()),
        });
    }

    let scale = max_abs(current);
    if scale == 0.0 {
        return Err(SurrogateError::DegenerateSequence {
            reason: "current iterate is identically zero, convergence ratio undefined".to_string(),
        });
    }

    let energy = scaled_sum_of_squares(current, scale);
    let change: f64 = current
        .iter()
        .zip(previous)
        .map(|(&c, &p)| {
            let d = p / scale - c / scale;
            d * d
        })
        .sum();

    let ratio = change / energy;
    validate_finite(ratio, "convergence ratio")?;
    Ok(ratio)
}

/// Whether `current` has converged relative to `previous`.
pub fn check_convergence(current: &[f64], previous: &[f64], tolerance: f64) -> SurrogateResult<bool> {
    Ok(convergence_ratio(current, previous)? <= tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_TOLERANCE;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_identical_iterates_converge() {
        let x = vec![1.0, -2.0, 3.0];
        assert_eq!(convergence_ratio(&x, &x).unwrap(), 0.0);
        assert!(check_convergence(&x, &x, DEFAULT_TOLERANCE).unwrap());
    }

    #[test]
    fn test_ratio_value() {
        // z = 1, I = 1 + 4 = 5
        let ratio = convergence_ratio(&[1.0, 2.0], &[1.0, 3.0]).unwrap();
        assert_approx_eq!(ratio, 0.2, 1e-15);
        assert!(!check_convergence(&[1.0, 2.0], &[1.0, 3.0], DEFAULT_TOLERANCE).unwrap());
    }

    #[test]
    fn test_threshold_is_inclusive() {
        // z = 0.25, I = 1, exact in binary
        assert!(check_convergence(&[1.0], &[1.5], 0.25).unwrap());
        assert!(!check_convergence(&[1.0], &[1.5], 0.2499).unwrap());
    }

    #[test]
    fn test_ratio_is_scale_free_for_huge_values() {
        let current = [1e160, 5e160, 2e160, 8e160];
        let previous = [1e160, 5e160, 3e160, 8e160];
        let ratio = convergence_ratio(&current, &previous).unwrap();
        // z = 1, I = 1 + 25 + 4 + 64
        assert_approx_eq!(ratio, 1.0 / 94.0, 1e-12);

        let at_limit = [f64::MAX, -f64::MAX];
        assert_approx_eq!(convergence_ratio(&at_limit, &[-f64::MAX, f64::MAX]).unwrap(), 4.0, 1e-12);
    }

    #[test]
    fn test_zero_iterate_is_degenerate() {
        let err = convergence_ratio(&[0.0, 0.0], &[1.0, 0.0]).unwrap_err();
        assert!(matches!(err, SurrogateError::DegenerateSequence { .. }));
    }

    #[test]
    fn test_length_mismatch() {
        assert!(matches!(
            convergence_ratio(&[1.0], &[1.0, 2.0]),
            Err(SurrogateError::NumericalError { .. })
        ));
    }
}
