//! # IAAFT Surrogates
//!
//! Surrogate time series by the Iterative Amplitude Adjusted Fourier
//! Transform (Schreiber & Schmitz, 1996).
//!
//! An IAAFT surrogate has exactly the same values as the original series,
//! in a different order, and (to within a convergence tolerance) the same
//! amplitude spectrum. Temporal structure beyond the linear correlations is
//! destroyed, which makes surrogates a null model for nonlinearity tests.
//!
//! ## Quick Start
//!
//! ```rust
//! use iaaft_surrogates::{generate_surrogates, SurrogateConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let data = vec![1.0, 5.0, 2.0, 8.0, 3.0, 7.0, 4.0, 6.0];
//!
//!     let set = generate_surrogates(&data, &SurrogateConfig::reproducible(3, 7))?;
//!     for (row, diagnostics) in set.rows().zip(set.diagnostics()) {
//!         println!("{:?} after {} iterations", row, diagnostics.iterations);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`analyzer`]: target spectrum and sorted distribution, computed once
//! - [`iaaft`]: the alternating-projection refinement of one surrogate
//! - [`convergence`]: the successive-iterate stopping rule
//! - [`surrogates`]: batch entry point and progress reporting
//! - [`hypothesis`]: surrogate data tests built on top

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod errors;
pub mod fft_ops;
pub mod input;
pub mod preprocessing;
pub mod results;
pub mod secure_rng;

// Surrogate generation
pub mod analyzer;
pub mod convergence;
pub mod hypothesis;
pub mod iaaft;
pub mod surrogates;

pub use analyzer::{spectral_mismatch, SurrogateTargets};
pub use config::{DegeneratePolicy, SurrogateConfig};
pub use convergence::{check_convergence, convergence_ratio};
pub use errors::{SurrogateError, SurrogateResult};
pub use hypothesis::{
    surrogate_test, third_order_autocovariance, time_reversal_asymmetry, SurrogateTestResult,
};
pub use iaaft::{refine_surrogate, RefinedSurrogate};
pub use results::{SurrogateDiagnostics, SurrogateOutput, SurrogateSet};
pub use secure_rng::SecureRng;
pub use surrogates::{generate_surrogates, generate_surrogates_with_targets};
