//! Batch surrogate generation.
//!
//! [`generate_surrogates`] is the crate's main entry point: validate, analyse
//! the reference once, refine `count` surrogates and assemble them into a
//! [`SurrogateSet`].

use crate::analyzer::{spectral_mismatch, SurrogateTargets, MIN_SERIES_LENGTH};
use crate::config::{DegeneratePolicy, SurrogateConfig};
use crate::errors::{validate_all_finite, validate_data_length, SurrogateError, SurrogateResult};
use crate::fft_ops::get_fft_cache_stats;
use crate::iaaft::{refine_surrogate, RefinedSurrogate};
use crate::results::{SurrogateDiagnostics, SurrogateSet};
use crate::secure_rng::SecureRng;

/// Log target for verbose progress messages.
pub const PROGRESS_TARGET: &str = "iaaft_surrogates::progress";

/// Progress messages, emitted only in verbose mode.
#[derive(Debug, Clone, Copy)]
struct Progress {
    verbose: bool,
}

impl Progress {
    fn report(&self, message: std::fmt::Arguments<'_>) {
        if self.verbose {
            log::info!(target: PROGRESS_TARGET, "{}", message);
        }
    }
}

/// Generate IAAFT surrogates of `original_data`.
///
/// All arguments are validated before any spectrum is computed. Each
/// surrogate has the same sorted values as the (possibly detrended)
/// reference and, to within the convergence tolerance, the same amplitude
/// spectrum.
///
/// # Example
/// ```rust
/// use iaaft_surrogates::{generate_surrogates, SurrogateConfig};
///
/// let data = vec![1.0, 5.0, 2.0, 8.0, 3.0, 7.0, 4.0, 6.0];
/// let set = generate_surrogates(&data, &SurrogateConfig::reproducible(3, 42)).unwrap();
/// assert_eq!(set.shape(), (3, 8));
/// ```
pub fn generate_surrogates(
    original_data: &[f64],
    config: &SurrogateConfig,
) -> SurrogateResult<SurrogateSet> {
    validate_data_length(original_data, MIN_SERIES_LENGTH)?;
    validate_all_finite(original_data, "original_data")?;
    config.validate()?;

    let progress = Progress {
        verbose: config.verbose,
    };
    progress.report(format_args!("### Starting IAAFT routine ###"));
    if config.detrend {
        progress.report(format_args!("### Detrending time series ###"));
    }

    let targets = SurrogateTargets::from_series(original_data, config.detrend)?;
    generate_surrogates_with_targets(&targets, config)
}

/// Generate surrogates against targets that were already analysed.
///
/// `config.detrend` is ignored here; detrending is decided when the targets
/// are built.
pub fn generate_surrogates_with_targets(
    targets: &SurrogateTargets,
    config: &SurrogateConfig,
) -> SurrogateResult<SurrogateSet> {
    config.validate()?;

    if targets.is_degenerate() {
        match config.degenerate_policy {
            DegeneratePolicy::Reject => {
                log::warn!("reference series has zero energy; no surrogates generated");
                return Err(SurrogateError::DegenerateSequence {
                    reason: "reference series has zero energy, convergence ratio undefined"
                        .to_string(),
                });
            }
            DegeneratePolicy::PassThrough => {
                log::warn!("reference series has zero energy; surrogates are shuffled copies");
            }
        }
    }

    let progress = Progress {
        verbose: config.verbose,
    };
    let mut set = SurrogateSet::with_shape(
        config.count,
        targets.len(),
        targets.trend().map(<[f64]>::to_vec),
    )?;

    let use_parallel = config.parallel && cfg!(feature = "parallel") && config.count > 1;

    if use_parallel {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            let finished: Vec<(RefinedSurrogate, SurrogateDiagnostics)> = (0..config.count)
                .into_par_iter()
                .map(|index| refine_one(targets, config, index, progress))
                .collect::<SurrogateResult<_>>()?;

            for (refined, diagnostics) in finished {
                set.store(&refined.values, diagnostics)?;
            }
        }
    } else {
        for index in 0..config.count {
            let (refined, diagnostics) = refine_one(targets, config, index, progress)?;
            set.store(&refined.values, diagnostics)?;
        }
    }

    let (plans, capacity) = get_fft_cache_stats();
    log::debug!("FFT plan cache holds {} of {} plans", plans, capacity);

    set.finish()
}

/// Refine surrogate `index` with its own random stream and measure it.
fn refine_one(
    targets: &SurrogateTargets,
    config: &SurrogateConfig,
    index: usize,
    progress: Progress,
) -> SurrogateResult<(RefinedSurrogate, SurrogateDiagnostics)> {
    progress.report(format_args!(
        "# Surrogate number {} out of {}.",
        index + 1,
        config.count
    ));

    let mut rng = SecureRng::for_surrogate(config.seed, index);
    let refined = refine_surrogate(targets, config, index, &mut rng)?;

    progress.report(format_args!(
        "Process converged after {} iterations.",
        refined.iterations
    ));

    let spectral_error = if targets.is_degenerate() {
        0.0
    } else {
        spectral_mismatch(&refined.values, targets)?
    };

    let diagnostics = SurrogateDiagnostics {
        index,
        iterations: refined.iterations,
        final_ratio: refined.final_ratio,
        spectral_error,
    };
    Ok((refined, diagnostics))
}
