//! Locally owned random number generation for surrogate draws.
//!
//! Each surrogate gets its own [`SecureRng`]. Unseeded generators draw their
//! key from OS entropy; seeded ones select an independent ChaCha20 stream per
//! surrogate index so a seeded call is reproducible regardless of the order
//! in which surrogates are refined.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// ChaCha20-backed generator owned by a single surrogate refinement.
#[derive(Clone, Debug)]
pub struct SecureRng {
    rng: ChaCha20Rng,
    /// Seed used (if deterministic)
    seed: Option<u64>,
    /// Stream selected within the seed's key
    stream: u64,
}

impl SecureRng {
    /// Create a new generator keyed from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: ChaCha20Rng::from_entropy(),
            seed: None,
            stream: 0,
        }
    }

    /// Create a generator with a specific seed for reproducibility.
    ///
    /// `seed_from_u64` expands the u64 into the full 256-bit ChaCha key.
    pub fn with_seed(seed: u64) -> Self {
        Self::for_stream(seed, 0)
    }

    /// Create the generator for stream `stream` under `seed`.
    ///
    /// Streams of the same key never overlap, so surrogate `k` of a seeded
    /// call always consumes stream `k`.
    pub fn for_stream(seed: u64, stream: u64) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        rng.set_stream(stream);
        Self {
            rng,
            seed: Some(seed),
            stream,
        }
    }

    /// Generator for surrogate `index` given an optional master seed.
    pub fn for_surrogate(master_seed: Option<u64>, index: usize) -> Self {
        match master_seed {
            Some(seed) => Self::for_stream(seed, index as u64),
            None => Self::new(),
        }
    }

    /// Seed this generator was built from, if any.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Stream index within the seed's key.
    pub fn stream(&self) -> u64 {
        self.stream
    }

    /// Apply a uniform random permutation in place (Fisher-Yates).
    pub fn shuffle<T>(&mut self, values: &mut [T]) {
        values.shuffle(&mut self.rng);
    }
}

impl Default for SecureRng {
    fn default() -> Self {
        Self::new()
    }
}
