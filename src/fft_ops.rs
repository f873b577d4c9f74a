//! FFT operations for surrogate refinement.
//!
//! Real-input transforms are computed with a complex FFT of the full series
//! length (no zero padding, which would change the spectrum being matched).
//! Only the non-negative frequency bins `0..=L/2` are exposed; the inverse
//! rebuilds the Hermitian half before transforming back.
//!
//! Plans are shared across calls and threads through an LRU cache keyed by
//! size and direction, so refining many surrogates of the same length plans
//! each transform once.

use crate::errors::{SurrogateError, SurrogateResult};
use lru::LruCache;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::num::NonZeroUsize;
use std::sync::{Arc, LazyLock, Mutex};

/// Cache key for FFT planners, distinguishing forward and inverse transforms
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
struct FftCacheKey {
    size: usize,
    is_forward: bool,
}

type FftPlanCache = LruCache<FftCacheKey, Arc<dyn Fft<f64>>>;

/// Maximum cached plans
const MAX_CACHE_ENTRIES: usize = 64;
/// Largest supported transform (2^24 points)
pub const MAX_FFT_SIZE: usize = 1 << 24;

static FFT_CACHE: LazyLock<Mutex<FftPlanCache>> = LazyLock::new(|| {
    Mutex::new(LruCache::new(
        NonZeroUsize::new(MAX_CACHE_ENTRIES).unwrap_or(NonZeroUsize::MIN),
    ))
});

/// Get a cached FFT plan (forward or inverse), planning it on a miss.
fn get_cached_fft_plan(size: usize, is_forward: bool) -> SurrogateResult<Arc<dyn Fft<f64>>> {
    if size == 0 || size > MAX_FFT_SIZE {
        return Err(SurrogateError::FftError { size });
    }

    let cache_key = FftCacheKey { size, is_forward };

    // A panic while holding the lock cannot leave a half-inserted plan behind
    let mut cache = match FFT_CACHE.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };

    if let Some(plan) = cache.get(&cache_key) {
        return Ok(Arc::clone(plan));
    }

    let mut planner = FftPlanner::new();
    let plan = if is_forward {
        planner.plan_fft_forward(size)
    } else {
        planner.plan_fft_inverse(size)
    };

    cache.put(cache_key, Arc::clone(&plan));
    Ok(plan)
}

/// Number of cached plans and cache capacity.
pub fn get_fft_cache_stats() -> (usize, usize) {
    let cache = match FFT_CACHE.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    (cache.len(), cache.cap().get())
}

/// Number of non-negative frequency bins of a real series of length `len`.
#[inline]
pub fn rfft_len(len: usize) -> usize {
    len / 2 + 1
}

/// Reusable forward/inverse real transform pair for one series length.
///
/// Holds its own buffers so the refinement loop allocates nothing per
/// iteration.
pub struct RealFft {
    len: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
    buffer: Vec<Complex<f64>>,
    scratch: Vec<Complex<f64>>,
}

impl std::fmt::Debug for RealFft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealFft").field("len", &self.len).finish()
    }
}

impl RealFft {
    /// Plan transforms for series of length `len`.
    pub fn new(len: usize) -> SurrogateResult<Self> {
        let forward = get_cached_fft_plan(len, true)?;
        let inverse = get_cached_fft_plan(len, false)?;
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());

        Ok(Self {
            len,
            forward,
            inverse,
            buffer: vec![Complex::new(0.0, 0.0); len],
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
        })
    }

    /// Series length this transform was planned for.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; a zero-length plan cannot be built.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Forward transform of `input`, writing the `L/2+1` non-negative bins to `spectrum`.
    pub fn forward(
        &mut self,
        input: &[f64],
        spectrum: &mut Vec<Complex<f64>>,
    ) -> SurrogateResult<()> {
        self.check_len(input.len())?;

        for (slot, &x) in self.buffer.iter_mut().zip(input) {
            *slot = Complex::new(x, 0.0);
        }
        self.forward
            .process_with_scratch(&mut self.buffer, &mut self.scratch);

        spectrum.clear();
        spectrum.extend_from_slice(&self.buffer[..rfft_len(self.len)]);
        Ok(())
    }

    /// Inverse of a non-negative-bin spectrum, producing exactly `L` real samples.
    ///
    /// The imaginary parts of the DC bin and, for even `L`, the Nyquist bin
    /// are ignored, as a real series cannot carry them.
    pub fn inverse(&mut self, spectrum: &[Complex<f64>], output: &mut [f64]) -> SurrogateResult<()> {
        self.check_len(output.len())?;
        let n = self.len;
        if spectrum.len() != rfft_len(n) {
            return Err(SurrogateError::NumericalError {
                reason: format!(
                    "spectrum has {} bins, expected {} for length {}",
                    spectrum.len(),
                    rfft_len(n),
                    n
                ),
                operation: Some("inverse_real".to_string()),
            });
        }

        self.buffer[0] = Complex::new(spectrum[0].re, 0.0);
        for k in 1..n.div_ceil(2) {
            self.buffer[k] = spectrum[k];
            self.buffer[n - k] = spectrum[k].conj();
        }
        if n % 2 == 0 && n > 1 {
            self.buffer[n / 2] = Complex::new(spectrum[n / 2].re, 0.0);
        }

        self.inverse
            .process_with_scratch(&mut self.buffer, &mut self.scratch);

        // rustfft does not normalise
        let normalization = 1.0 / n as f64;
        for (out, c) in output.iter_mut().zip(&self.buffer) {
            *out = c.re * normalization;
        }
        Ok(())
    }

    fn check_len(&self, len: usize) -> SurrogateResult<()> {
        if len != self.len {
            return Err(SurrogateError::NumericalError {
                reason: format!("series length {} does not match planned length {}", len, self.len),
                operation: Some("real_fft".to_string()),
            });
        }
        Ok(())
    }
}

/// Real-input forward transform: `L/2+1` complex bins.
pub fn rfft(data: &[f64]) -> SurrogateResult<Vec<Complex<f64>>> {
    let mut fft = RealFft::new(data.len())?;
    let mut spectrum = Vec::with_capacity(rfft_len(data.len()));
    fft.forward(data, &mut spectrum)?;
    Ok(spectrum)
}

/// Inverse real transform forced to length `len`.
pub fn irfft(spectrum: &[Complex<f64>], len: usize) -> SurrogateResult<Vec<f64>> {
    let mut fft = RealFft::new(len)?;
    let mut output = vec![0.0; len];
    fft.inverse(spectrum, &mut output)?;
    Ok(output)
}

/// Magnitude of every non-negative frequency bin.
pub fn amplitude_spectrum(data: &[f64]) -> SurrogateResult<Vec<f64>> {
    Ok(rfft(data)?.iter().map(|c| c.norm()).collect())
}
