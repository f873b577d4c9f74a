//! # Surrogate Configuration
//!
//! This module contains the configuration structure controlling surrogate
//! generation: how many surrogates, whether to detrend, how chatty to be,
//! and the budgets that bound the refinement loop.

use crate::errors::{SurrogateError, SurrogateResult};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default convergence threshold on the successive-iterate ratio.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Default cap on refinement iterations per surrogate.
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// What to do when the reference series has zero energy.
///
/// The convergence ratio divides by the energy of the current iterate, which
/// is the energy of the reference once the distribution has been imposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DegeneratePolicy {
    /// Fail the call with `SurrogateError::DegenerateSequence` before any surrogate is drawn
    #[default]
    Reject,
    /// Emit shuffled copies of the reference, reported as converged at iteration 0
    PassThrough,
}

/// Configuration for IAAFT surrogate generation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SurrogateConfig {
    /// Number of surrogates to generate
    pub count: usize,
    /// Subtract the line through the first and last sample before analysis
    pub detrend: bool,
    /// Emit progress messages at info level
    pub verbose: bool,
    /// Convergence threshold on the successive-iterate ratio
    pub tolerance: f64,
    /// Maximum refinement iterations per surrogate
    pub max_iterations: usize,
    /// Optional wall-clock budget per surrogate
    pub timeout: Option<Duration>,
    /// Master seed; `None` seeds every surrogate from OS entropy
    pub seed: Option<u64>,
    /// Refine surrogates on the rayon pool
    pub parallel: bool,
    /// Handling of zero-energy reference series
    pub degenerate_policy: DegeneratePolicy,
}

impl Default for SurrogateConfig {
    fn default() -> Self {
        Self {
            count: 1,
            detrend: false,
            verbose: true,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            timeout: None,
            seed: None,
            parallel: false,
            degenerate_policy: DegeneratePolicy::Reject,
        }
    }
}

impl SurrogateConfig {
    /// Default configuration producing `count` surrogates.
    pub fn new(count: usize) -> Self {
        Self {
            count,
            ..Self::default()
        }
    }

    /// Quiet configuration: no progress messages.
    pub fn quiet(count: usize) -> Self {
        Self {
            count,
            verbose: false,
            ..Self::default()
        }
    }

    /// Reproducible configuration: fixed master seed, no progress messages.
    pub fn reproducible(count: usize, seed: u64) -> Self {
        Self {
            count,
            verbose: false,
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Set detrending.
    pub fn with_detrend(mut self, detrend: bool) -> Self {
        self.detrend = detrend;
        self
    }

    /// Set verbosity.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the master seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the convergence threshold.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the per-surrogate wall-clock budget.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Enable or disable parallel refinement.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the degenerate-sequence policy.
    pub fn with_degenerate_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.degenerate_policy = policy;
        self
    }

    /// Check every field before any numeric work starts.
    pub fn validate(&self) -> SurrogateResult<()> {
        if self.count < 1 {
            return Err(SurrogateError::invalid_input(
                "count",
                "must be a positive integer or convertible to a positive integer",
            ));
        }

        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(SurrogateError::InvalidParameter {
                parameter: "tolerance".to_string(),
                value: self.tolerance,
                constraint: "finite and > 0".to_string(),
            });
        }

        if self.max_iterations == 0 {
            return Err(SurrogateError::InvalidParameter {
                parameter: "max_iterations".to_string(),
                value: 0.0,
                constraint: ">= 1".to_string(),
            });
        }

        if let Some(timeout) = self.timeout {
            if timeout.is_zero() {
                return Err(SurrogateError::InvalidParameter {
                    parameter: "timeout".to_string(),
                    value: 0.0,
                    constraint: "non-zero duration".to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_routine() {
        let config = SurrogateConfig::default();
        assert_eq!(config.count, 1);
        assert!(!config.detrend);
        assert!(config.verbose);
        assert_eq!(config.tolerance, 1e-6);
        assert_eq!(config.degenerate_policy, DegeneratePolicy::Reject);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        let quiet = SurrogateConfig::quiet(4);
        assert_eq!(quiet.count, 4);
        assert!(!quiet.verbose);

        let seeded = SurrogateConfig::reproducible(2, 7).with_detrend(true);
        assert_eq!(seeded.seed, Some(7));
        assert!(seeded.detrend);
    }

    #[test]
    fn test_zero_count_is_invalid_input() {
        let err = SurrogateConfig::new(0).validate().unwrap_err();
        assert!(matches!(err, SurrogateError::InvalidInput { ref argument, .. } if argument == "count"));
    }

    #[test]
    fn test_bad_budgets_rejected() {
        assert!(matches!(
            SurrogateConfig::new(1).with_tolerance(0.0).validate(),
            Err(SurrogateError::InvalidParameter { .. })
        ));
        assert!(matches!(
            SurrogateConfig::new(1).with_tolerance(f64::NAN).validate(),
            Err(SurrogateError::InvalidParameter { .. })
        ));
        assert!(matches!(
            SurrogateConfig::new(1).with_max_iterations(0).validate(),
            Err(SurrogateError::InvalidParameter { .. })
        ));
        assert!(matches!(
            SurrogateConfig::new(1)
                .with_timeout(Duration::ZERO)
                .validate(),
            Err(SurrogateError::InvalidParameter { .. })
        ));
    }
}
