//! Iterative Amplitude Adjusted Fourier Transform refinement.
//!
//! One surrogate is produced by alternating two projections on a randomly
//! permuted copy of the reference series:
//!
//! 1. **Spectrum matching**: keep the candidate's Fourier phases, replace the
//!    magnitudes with the target amplitude spectrum, transform back.
//! 2. **Distribution matching**: replace each value by the target value of
//!    the same rank.
//!
//! Each projection restores one invariant and disturbs the other; the loop
//! ends when successive iterates agree to within the tolerance (see
//! [`crate::convergence`]), or fails with `NonTermination` once the iteration
//! or time budget is spent.
//!
//! Reference: T. Schreiber and A. Schmitz, "Improved surrogate data for
//! nonlinearity tests", Phys. Rev. Lett. 77 (1996), 635.

use crate::analyzer::SurrogateTargets;
use crate::config::{DegeneratePolicy, SurrogateConfig};
use crate::convergence::convergence_ratio;
use crate::errors::{SurrogateError, SurrogateResult};
use crate::fft_ops::RealFft;
use crate::preprocessing::argsort;
use crate::secure_rng::SecureRng;
use rustfft::num_complex::Complex;
use std::time::Instant;

/// A finished surrogate and how it got there.
#[derive(Debug, Clone, PartialEq)]
pub struct RefinedSurrogate {
    /// Surrogate values, length `L`
    pub values: Vec<f64>,
    /// Iteration at which the convergence test passed (0 for pass-through)
    pub iterations: usize,
    /// Convergence ratio at the stopping iteration
    pub final_ratio: f64,
}

/// Impose the target amplitude spectrum on `candidate`, keeping its phases.
pub fn impose_spectrum(
    fft: &mut RealFft,
    candidate: &mut [f64],
    target_magnitude: &[f64],
    spectrum: &mut Vec<Complex<f64>>,
) -> SurrogateResult<()> {
    fft.forward(candidate, spectrum)?;

    for (bin, &magnitude) in spectrum.iter_mut().zip(target_magnitude) {
        *bin = Complex::from_polar(magnitude, bin.arg());
    }

    fft.inverse(spectrum, candidate)?;

    if let Some(i) = candidate.iter().position(|v| !v.is_finite()) {
        return Err(SurrogateError::NumericalError {
            reason: format!("spectrum-matched candidate is not finite at index {}", i),
            operation: Some("impose_spectrum".to_string()),
        });
    }
    Ok(())
}

/// Replace every value of `candidate` with the target value of the same rank.
///
/// Afterwards the candidate is a permutation of `sorted_target`.
pub fn impose_distribution(candidate: &mut [f64], sorted_target: &[f64], order: &mut Vec<usize>) {
    argsort(candidate, order);
    for (&position, &value) in order.iter().zip(sorted_target) {
        candidate[position] = value;
    }
}

/// Refine surrogate number `index` against `targets`.
///
/// The starting candidate is a uniform random permutation of the reference
/// drawn from `rng`.
pub fn refine_surrogate(
    targets: &SurrogateTargets,
    config: &SurrogateConfig,
    index: usize,
    rng: &mut SecureRng,
) -> SurrogateResult<RefinedSurrogate> {
    log::trace!(
        "surrogate {}: seed {:?}, stream {}",
        index,
        rng.seed(),
        rng.stream()
    );
    let mut candidate = targets.reference().to_vec();
    rng.shuffle(&mut candidate);

    if targets.is_degenerate() {
        return match config.degenerate_policy {
            DegeneratePolicy::PassThrough => Ok(RefinedSurrogate {
                values: candidate,
                iterations: 0,
                final_ratio: 0.0,
            }),
            DegeneratePolicy::Reject => Err(SurrogateError::DegenerateSequence {
                reason: "reference series has zero energy".to_string(),
            }),
        };
    }

    let mut fft = RealFft::new(targets.len())?;
    let mut spectrum = Vec::with_capacity(targets.spectrum_magnitude().len());
    let mut order = Vec::with_capacity(targets.len());
    let mut previous = candidate.clone();
    let mut last_ratio = f64::INFINITY;
    let started = Instant::now();

    for iteration in 1..=config.max_iterations {
        impose_spectrum(
            &mut fft,
            &mut candidate,
            targets.spectrum_magnitude(),
            &mut spectrum,
        )?;
        impose_distribution(&mut candidate, targets.sorted_distribution(), &mut order);

        let ratio = convergence_ratio(&candidate, &previous)?;
        log::trace!("surrogate {} iteration {}: ratio {:e}", index, iteration, ratio);

        if ratio <= config.tolerance {
            return Ok(RefinedSurrogate {
                values: candidate,
                iterations: iteration,
                final_ratio: ratio,
            });
        }

        last_ratio = ratio;
        previous.copy_from_slice(&candidate);

        if let Some(timeout) = config.timeout {
            if started.elapsed() >= timeout {
                log::warn!(
                    "surrogate {} exceeded its {:?} budget after {} iterations",
                    index,
                    timeout,
                    iteration
                );
                return Err(SurrogateError::NonTermination {
                    surrogate: index,
                    iterations: iteration,
                    last_ratio,
                });
            }
        }
    }

    log::warn!(
        "surrogate {} did not converge within {} iterations",
        index,
        config.max_iterations
    );
    Err(SurrogateError::NonTermination {
        surrogate: index,
        iterations: config.max_iterations,
        last_ratio,
    })
}
