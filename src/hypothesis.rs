//! Surrogate data hypothesis testing.
//!
//! Compares a statistic of the reference series against its distribution
//! over IAAFT surrogates. The surrogates realise the null hypothesis of a
//! linear Gaussian process observed through a static, possibly nonlinear,
//! measurement function; a statistic far outside the surrogate distribution
//! is evidence of nonlinear structure.

use crate::analyzer::SurrogateTargets;
use crate::config::SurrogateConfig;
use crate::errors::{validate_parameter, SurrogateError, SurrogateResult};
use crate::preprocessing::sorted_copy;
use crate::surrogates::generate_surrogates_with_targets;

/// Outcome of a surrogate data test.
#[derive(Debug, Clone, PartialEq)]
pub struct SurrogateTestResult {
    /// Statistic evaluated on the (possibly detrended) reference
    pub observed_statistic: f64,
    /// Statistic evaluated on every surrogate, in generation order
    pub null_distribution: Vec<f64>,
    /// Two-sided rank p-value
    pub p_value: f64,
    /// Significance level the decision was taken at
    pub significance_level: f64,
    /// Whether the null hypothesis is rejected
    pub reject_null: bool,
    /// (observed - null mean) / null standard deviation, 0 if the null has no spread
    pub effect_size: f64,
}

/// Run a two-sided surrogate data test of `statistic` on `data`.
///
/// `config.count` surrogates are drawn; with `M` surrogates the smallest
/// attainable p-value is `1 / (M + 1)`.
pub fn surrogate_test<F>(
    data: &[f64],
    statistic: F,
    config: &SurrogateConfig,
    significance_level: f64,
) -> SurrogateResult<SurrogateTestResult>
where
    F: Fn(&[f64]) -> f64,
{
    validate_parameter(significance_level, 0.0, 1.0, "significance_level")?;
    if significance_level == 0.0 || significance_level == 1.0 {
        return Err(SurrogateError::InvalidParameter {
            parameter: "significance_level".to_string(),
            value: significance_level,
            constraint: "(0, 1)".to_string(),
        });
    }
    config.validate()?;

    let min_attainable = 1.0 / (config.count as f64 + 1.0);
    if min_attainable > significance_level {
        log::warn!(
            "{} surrogates cannot reach significance {}: smallest p-value is {:.4}",
            config.count,
            significance_level,
            min_attainable
        );
    }

    let targets = SurrogateTargets::from_series(data, config.detrend)?;
    let observed_statistic = statistic(targets.reference());
    if !observed_statistic.is_finite() {
        return Err(SurrogateError::NumericalError {
            reason: format!("statistic of the reference is not finite: {}", observed_statistic),
            operation: Some("surrogate_test".to_string()),
        });
    }

    let surrogates = generate_surrogates_with_targets(&targets, config)?;
    let null_distribution: Vec<f64> = surrogates.rows().map(&statistic).collect();
    if let Some(i) = null_distribution.iter().position(|s| !s.is_finite()) {
        return Err(SurrogateError::NumericalError {
            reason: format!("statistic of surrogate {} is not finite", i),
            operation: Some("surrogate_test".to_string()),
        });
    }

    let p_value = rank_p_value_two_sided(observed_statistic, &null_distribution);
    let effect_size = z_score(observed_statistic, &null_distribution);

    Ok(SurrogateTestResult {
        observed_statistic,
        null_distribution,
        p_value,
        significance_level,
        reject_null: p_value < significance_level,
        effect_size,
    })
}

/// `(1 + #{|s - median| >= |observed - median|}) / (M + 1)`.
fn rank_p_value_two_sided(observed: f64, null_distribution: &[f64]) -> f64 {
    if null_distribution.is_empty() {
        return 1.0;
    }

    let sorted = sorted_copy(null_distribution);
    let median = sorted[sorted.len() / 2];
    let observed_deviation = (observed - median).abs();
    let as_extreme = null_distribution
        .iter()
        .filter(|&&s| (s - median).abs() >= observed_deviation)
        .count();

    (1.0 + as_extreme as f64) / (null_distribution.len() as f64 + 1.0)
}

fn z_score(observed: f64, null_distribution: &[f64]) -> f64 {
    let n = null_distribution.len();
    if n < 2 {
        return 0.0;
    }

    let mean = null_distribution.iter().sum::<f64>() / n as f64;
    let variance = null_distribution
        .iter()
        .map(|&s| (s - mean).powi(2))
        .sum::<f64>()
        / (n - 1) as f64;

    if variance > 0.0 {
        (observed - mean) / variance.sqrt()
    } else {
        0.0
    }
}

/// Time-reversal asymmetry `mean((x[t] - x[t-lag])^3)`.
///
/// Zero in expectation for time-reversible processes, which includes every
/// linear Gaussian process. Returns NaN when `lag` is 0 or not shorter than
/// the series.
pub fn time_reversal_asymmetry(data: &[f64], lag: usize) -> f64 {
    if lag == 0 || lag >= data.len() {
        return f64::NAN;
    }

    let terms = data.len() - lag;
    data[lag..]
        .iter()
        .zip(data)
        .map(|(&later, &earlier)| (later - earlier).powi(3))
        .sum::<f64>()
        / terms as f64
}

/// Third-order autocovariance `mean(x[t] * x[t-lag] * x[t-2*lag])`.
///
/// Returns NaN when `lag` is 0 or `2 * lag` is not shorter than the series.
pub fn third_order_autocovariance(data: &[f64], lag: usize) -> f64 {
    if lag == 0 || 2 * lag >= data.len() {
        return f64::NAN;
    }

    let terms = data.len() - 2 * lag;
    (2 * lag..data.len())
        .map(|t| data[t] * data[t - lag] * data[t - 2 * lag])
        .sum::<f64>()
        / terms as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_time_reversal_asymmetry_values() {
        // differences 1, 1, -2 -> cubes 1, 1, -8
        assert_approx_eq!(time_reversal_asymmetry(&[0.0, 1.0, 2.0, 0.0], 1), -2.0, 1e-12);
        // reversing the series flips the sign
        assert_approx_eq!(time_reversal_asymmetry(&[0.0, 2.0, 1.0, 0.0], 1), 2.0, 1e-12);
        assert!(time_reversal_asymmetry(&[1.0, 2.0], 2).is_nan());
        assert!(time_reversal_asymmetry(&[1.0, 2.0], 0).is_nan());
    }

    #[test]
    fn test_third_order_autocovariance_values() {
        // t = 2: 3*2*1, t = 3: 4*3*2
        assert_approx_eq!(third_order_autocovariance(&[1.0, 2.0, 3.0, 4.0], 1), 15.0, 1e-12);
        assert!(third_order_autocovariance(&[1.0, 2.0, 3.0, 4.0], 2).is_nan());
    }

    #[test]
    fn test_rank_p_value() {
        let null = vec![-2.0, -1.0, 0.0, 1.0, 2.0];
        // nothing is as extreme as 10
        assert_approx_eq!(rank_p_value_two_sided(10.0, &null), 1.0 / 6.0, 1e-12);
        // everything is at least as extreme as the median
        assert_approx_eq!(rank_p_value_two_sided(0.0, &null), 1.0, 1e-12);
        assert_eq!(rank_p_value_two_sided(0.0, &[]), 1.0);
    }

    #[test]
    fn test_z_score() {
        assert_approx_eq!(z_score(3.0, &[1.0, 2.0, 3.0]), 1.0, 1e-12);
        assert_eq!(z_score(3.0, &[1.0, 1.0]), 0.0);
        assert_eq!(z_score(3.0, &[1.0]), 0.0);
    }

    #[test]
    fn test_surrogate_test_structure() {
        let data: Vec<f64> = (0..64)
            .map(|i| {
                let t = i as f64;
                (0.3 * t).sin() + 0.4 * (0.11 * t * t).cos()
            })
            .collect();
        let config = SurrogateConfig::reproducible(19, 314);

        let result = surrogate_test(&data, |x| time_reversal_asymmetry(x, 1), &config, 0.1).unwrap();

        assert_eq!(result.null_distribution.len(), 19);
        assert!(result.p_value > 0.0 && result.p_value <= 1.0);
        assert!(result.p_value >= 1.0 / 20.0);
        assert_eq!(result.reject_null, result.p_value < 0.1);
        assert_approx_eq!(
            result.observed_statistic,
            time_reversal_asymmetry(&data, 1),
            1e-12
        );
    }

    #[test]
    fn test_surrogate_test_rejects_bad_level() {
        let data = vec![1.0, 5.0, 2.0, 8.0];
        let config = SurrogateConfig::reproducible(3, 1);
        for level in [0.0, 1.0, -0.1, f64::NAN] {
            assert!(surrogate_test(&data, |x| x[0], &config, level).is_err());
        }
    }

    #[test]
    fn test_non_finite_statistic_is_reported() {
        let data = vec![1.0, 5.0, 2.0, 8.0];
        let config = SurrogateConfig::reproducible(3, 1);
        assert!(matches!(
            surrogate_test(&data, |x| time_reversal_asymmetry(x, 10), &config, 0.05),
            Err(SurrogateError::NumericalError { .. })
        ));
    }
}
