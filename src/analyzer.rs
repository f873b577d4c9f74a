//! Spectral and distribution targets of the reference series.
//!
//! [`SurrogateTargets`] is computed once per call and shared read-only by
//! every surrogate refinement: the amplitude spectrum each surrogate must
//! carry and the sorted values each surrogate must consist of.

use crate::errors::{
    validate_all_finite, validate_data_length, validate_finite, SurrogateError, SurrogateResult,
};
use crate::fft_ops::amplitude_spectrum;
use crate::preprocessing::{detrend_endpoints, endpoint_trend, is_zero_energy, max_abs, sorted_copy};

/// Shortest series with both a spectrum and a distribution to match.
pub const MIN_SERIES_LENGTH: usize = 2;

/// Targets shared by all surrogates of one call.
#[derive(Debug, Clone, PartialEq)]
pub struct SurrogateTargets {
    /// Series the surrogates are drawn from (detrended if requested)
    reference: Vec<f64>,
    /// Removed line, when detrending was applied
    trend: Option<Vec<f64>>,
    /// `|rfft(reference)|`, `L/2+1` bins
    spectrum_magnitude: Vec<f64>,
    /// Reference values sorted ascending
    sorted_distribution: Vec<f64>,
    /// Reference is zero to within rounding
    degenerate: bool,
}

impl SurrogateTargets {
    /// Analyse `data`, optionally detrending it first.
    ///
    /// When `detrend` is set the detrended series replaces the original for
    /// everything downstream: spectrum, distribution and surrogate values.
    pub fn from_series(data: &[f64], detrend: bool) -> SurrogateResult<Self> {
        validate_data_length(data, MIN_SERIES_LENGTH)?;
        validate_all_finite(data, "original_data")?;

        let (reference, trend) = if detrend {
            (detrend_endpoints(data), Some(endpoint_trend(data)))
        } else {
            (data.to_vec(), None)
        };

        let degenerate = is_zero_energy(&reference, max_abs(data));
        let spectrum_magnitude = amplitude_spectrum(&reference)?;
        validate_all_finite(&spectrum_magnitude, "target spectrum")?;
        let sorted_distribution = sorted_copy(&reference);

        Ok(Self {
            reference,
            trend,
            spectrum_magnitude,
            sorted_distribution,
            degenerate,
        })
    }

    /// Series length `L`.
    pub fn len(&self) -> usize {
        self.reference.len()
    }

    /// Never true for a successfully built target set.
    pub fn is_empty(&self) -> bool {
        self.reference.is_empty()
    }

    /// The (possibly detrended) reference series.
    pub fn reference(&self) -> &[f64] {
        &self.reference
    }

    /// The removed trend line, if detrending was applied.
    pub fn trend(&self) -> Option<&[f64]> {
        self.trend.as_deref()
    }

    /// Target amplitude spectrum.
    pub fn spectrum_magnitude(&self) -> &[f64] {
        &self.spectrum_magnitude
    }

    /// Target value distribution, ascending.
    pub fn sorted_distribution(&self) -> &[f64] {
        &self.sorted_distribution
    }

    /// Whether the reference has zero energy.
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }
}

/// Relative RMS difference between the amplitude spectrum of `series` and the target.
///
/// Zero means the spectra agree exactly.
pub fn spectral_mismatch(series: &[f64], targets: &SurrogateTargets) -> SurrogateResult<f64> {
    if series.len() != targets.len() {
        return Err(SurrogateError::InvalidInput {
            argument: "series".to_string(),
            reason: format!(
                "has length {}, targets were computed for length {}",
                series.len(),
                targets.len()
            ),
        });
    }

    let magnitude = amplitude_spectrum(series)?;
    let scale = max_abs(targets.spectrum_magnitude());
    if scale == 0.0 {
        return Err(SurrogateError::DegenerateSequence {
            reason: "target spectrum is identically zero".to_string(),
        });
    }

    let (error, total) = magnitude
        .iter()
        .zip(targets.spectrum_magnitude())
        .fold((0.0, 0.0), |(error, total), (&m, &t)| {
            let (m, t) = (m / scale, t / scale);
            (error + (m - t).powi(2), total + t * t)
        });

    let mismatch = (error / total).sqrt();
    validate_finite(mismatch, "spectral mismatch")?;
    Ok(mismatch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_targets_without_detrending() {
        let data = vec![1.0, 5.0, 2.0, 8.0, 3.0, 7.0, 4.0, 6.0];
        let targets = SurrogateTargets::from_series(&data, false).unwrap();

        assert_eq!(targets.len(), 8);
        assert_eq!(targets.reference(), data.as_slice());
        assert!(targets.trend().is_none());
        assert_eq!(targets.spectrum_magnitude().len(), 5);
        assert_approx_eq!(targets.spectrum_magnitude()[0], 36.0, 1e-12);
        assert_eq!(
            targets.sorted_distribution(),
            &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]
        );
        assert!(!targets.is_degenerate());
    }

    #[test]
    fn test_detrending_replaces_reference() {
        let data = vec![0.0, 4.0, 1.0, 6.0];
        let targets = SurrogateTargets::from_series(&data, true).unwrap();

        // line from 0 to 6 over 3 steps has slope 2
        assert_eq!(targets.reference(), &[0.0, 2.0, -3.0, 0.0]);
        assert_eq!(targets.trend().unwrap(), &[0.0, 2.0, 4.0, 6.0]);
        assert_eq!(targets.sorted_distribution(), &[-3.0, 0.0, 0.0, 2.0]);
    }

    #[test]
    fn test_linear_series_detrends_to_degenerate() {
        let data: Vec<f64> = (0..32).map(|i| -2.0 + 0.5 * i as f64).collect();
        let targets = SurrogateTargets::from_series(&data, true).unwrap();
        assert!(targets.is_degenerate());

        let raw = SurrogateTargets::from_series(&data, false).unwrap();
        assert!(!raw.is_degenerate());
    }

    #[test]
    fn test_invalid_series_rejected() {
        assert!(matches!(
            SurrogateTargets::from_series(&[1.0], false),
            Err(SurrogateError::InsufficientData { required: 2, actual: 1 })
        ));
        assert!(matches!(
            SurrogateTargets::from_series(&[1.0, f64::NAN, 2.0], false),
            Err(SurrogateError::NumericalError { .. })
        ));
    }

    #[test]
    fn test_spectral_mismatch() {
        let data = vec![1.0, 5.0, 2.0, 8.0, 3.0, 7.0, 4.0, 6.0];
        let targets = SurrogateTargets::from_series(&data, false).unwrap();
        assert_approx_eq!(spectral_mismatch(&data, &targets).unwrap(), 0.0, 1e-12);

        // time reversal keeps the amplitude spectrum
        let reversed: Vec<f64> = data.iter().rev().copied().collect();
        assert_approx_eq!(spectral_mismatch(&reversed, &targets).unwrap(), 0.0, 1e-12);

        let sorted = targets.sorted_distribution().to_vec();
        assert!(spectral_mismatch(&sorted, &targets).unwrap() > 0.01);

        assert!(spectral_mismatch(&data[..4], &targets).is_err());
    }

    #[test]
    fn test_spectral_mismatch_for_huge_values() {
        let data: Vec<f64> = [1.0, 5.0, 2.0, 8.0, 3.0, 7.0, 4.0, 6.0]
            .iter()
            .map(|x| x * 1e160)
            .collect();
        let targets = SurrogateTargets::from_series(&data, false).unwrap();
        assert_approx_eq!(spectral_mismatch(&data, &targets).unwrap(), 0.0, 1e-12);

        let sorted = targets.sorted_distribution().to_vec();
        let mismatch = spectral_mismatch(&sorted, &targets).unwrap();
        assert!(mismatch.is_finite() && mismatch > 0.01);
    }

    #[test]
    fn test_overflowing_spectrum_rejected() {
        assert!(matches!(
            SurrogateTargets::from_series(&[f64::MAX; 4], false),
            Err(SurrogateError::NumericalError { .. })
        ));
    }
}
