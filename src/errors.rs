//! Error types and validation functions for surrogate generation.
//!
//! Every fallible operation in the crate returns [`SurrogateResult`]. Input
//! validation happens before any spectrum or distribution is computed, so an
//! error from the validators never leaves partially built state behind.

use thiserror::Error;

/// Error types for IAAFT surrogate generation.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SurrogateError {
    /// Malformed argument: wrong shape, unparseable value or out-of-domain flag.
    #[error("Invalid input: {argument} {reason}")]
    InvalidInput {
        /// Name of the offending argument
        argument: String,
        /// What the argument must satisfy
        reason: String,
    },

    /// Series too short to have a spectrum and a distribution.
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData {
        /// Minimum required data points
        required: usize,
        /// Actual number of data points provided
        actual: usize,
    },

    /// Invalid numeric configuration value.
    #[error("Invalid parameter: {parameter} = {value}, expected {constraint}")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value provided
        value: f64,
        /// Valid range or constraint description
        constraint: String,
    },

    /// The refinement loop exhausted its iteration or time budget.
    #[error(
        "Surrogate {surrogate} did not converge after {iterations} iterations (last ratio {last_ratio:e})"
    )]
    NonTermination {
        /// Zero-based index of the surrogate that failed
        surrogate: usize,
        /// Iterations performed before giving up
        iterations: usize,
        /// Convergence ratio at the last completed iteration
        last_ratio: f64,
    },

    /// Reference series has zero energy, so the convergence ratio is undefined.
    #[error("Degenerate sequence: {reason}")]
    DegenerateSequence {
        /// Why the sequence is degenerate
        reason: String,
    },

    /// NaN or infinite values in the input or produced by a transform.
    #[error("Numerical computation failed: {reason}")]
    NumericalError {
        /// Detailed reason for numerical failure
        reason: String,
        /// Operation that failed
        operation: Option<String>,
    },

    /// Transform size not supported by the plan cache.
    #[error("FFT computation failed: input size {size} not supported")]
    FftError {
        /// Input size that caused the failure
        size: usize,
    },
}

/// Result type for surrogate operations.
pub type SurrogateResult<T> = Result<T, SurrogateError>;

impl SurrogateError {
    /// Shorthand for an [`SurrogateError::InvalidInput`] error.
    pub fn invalid_input(argument: &str, reason: impl Into<String>) -> Self {
        SurrogateError::InvalidInput {
            argument: argument.to_string(),
            reason: reason.into(),
        }
    }

    /// True for errors raised by argument validation, before any numeric work.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            SurrogateError::InvalidInput { .. }
                | SurrogateError::InsufficientData { .. }
                | SurrogateError::InvalidParameter { .. }
        )
    }
}

/// Validates that data has sufficient length for analysis.
///
/// # Example
/// ```rust
/// use iaaft_surrogates::errors::validate_data_length;
///
/// let data = vec![1.0, 2.0, 3.0];
/// assert!(validate_data_length(&data, 2).is_ok());
/// assert!(validate_data_length(&data, 5).is_err());
/// ```
pub fn validate_data_length(data: &[f64], min_required: usize) -> SurrogateResult<()> {
    if data.len() < min_required {
        Err(SurrogateError::InsufficientData {
            required: min_required,
            actual: data.len(),
        })
    } else {
        Ok(())
    }
}

/// Validates that a parameter is within `[min, max]`.
///
/// # Example
/// ```rust
/// use iaaft_surrogates::errors::validate_parameter;
///
/// assert!(validate_parameter(0.05, 0.0, 1.0, "significance_level").is_ok());
/// assert!(validate_parameter(1.5, 0.0, 1.0, "significance_level").is_err());
/// ```
pub fn validate_parameter(value: f64, min: f64, max: f64, name: &str) -> SurrogateResult<()> {
    if value.is_nan() {
        return Err(SurrogateError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: "must not be NaN".to_string(),
        });
    }

    if min.is_nan() || max.is_nan() || min > max {
        return Err(SurrogateError::NumericalError {
            reason: format!("Invalid bounds for parameter {}: min={}, max={}", name, min, max),
            operation: None,
        });
    }

    if value < min || value > max {
        Err(SurrogateError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: format!("[{}, {}]", min, max),
        })
    } else {
        Ok(())
    }
}

/// Validates that a value is finite and not NaN.
pub fn validate_finite(value: f64, name: &str) -> SurrogateResult<()> {
    if !value.is_finite() {
        Err(SurrogateError::NumericalError {
            reason: format!("{} is not finite: {}", name, value),
            operation: None,
        })
    } else {
        Ok(())
    }
}

/// Validates that all values in a slice are finite.
///
/// Returns on the first offending value, naming its index.
///
/// # Example
/// ```rust
/// use iaaft_surrogates::errors::validate_all_finite;
///
/// assert!(validate_all_finite(&[1.0, 2.0, 3.0], "series").is_ok());
/// assert!(validate_all_finite(&[1.0, f64::NAN, 3.0], "series").is_err());
/// ```
pub fn validate_all_finite(data: &[f64], name: &str) -> SurrogateResult<()> {
    if let Some((i, &value)) = data.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        let value_desc = if value.is_nan() {
            "NaN".to_string()
        } else if value.is_sign_positive() {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        };

        return Err(SurrogateError::NumericalError {
            reason: format!(
                "{} contains non-finite value at index {}: {}",
                name, i, value_desc
            ),
            operation: None,
        });
    }

    Ok(())
}
