//! Deterministic, resettable random streams.
//!
//! # Determinism strategy
//!
//! Every stochastic component owns its own `RandomStream`.  A stream is a
//! `SmallRng` plus the seed it was built from, so it can be rewound:
//!
//!   substream_seed(k) = seed XOR (k * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive substream indices uniformly across the seed
//! space.  Replications use substream `r` for replication `r`, which gives
//! common random numbers when comparing two configurations: the same
//! replication draws the same underlying uniforms in both runs.

use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// A seeded random stream with start-of-stream and substream resets.
#[derive(Clone, Debug)]
pub struct RandomStream {
    rng:       SmallRng,
    seed:      u64,
    substream: u64,
}

impl RandomStream {
    pub fn new(seed: u64) -> Self {
        Self {
            rng:       SmallRng::seed_from_u64(substream_seed(seed, 0)),
            seed,
            substream: 0,
        }
    }

    /// Derive an independent stream, e.g. one per generator from a single
    /// root seed.
    pub fn child(&mut self, offset: u64) -> RandomStream {
        let child_seed: u64 = self.rng.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        RandomStream::new(child_seed)
    }

    /// Rewind to the beginning of the stream (substream 0).
    pub fn reset_start_stream(&mut self) {
        self.substream = 0;
        self.rng = SmallRng::seed_from_u64(substream_seed(self.seed, 0));
    }

    /// Rewind to the beginning of the current substream.
    pub fn reset_start_substream(&mut self) {
        self.rng = SmallRng::seed_from_u64(substream_seed(self.seed, self.substream));
    }

    /// Jump to the beginning of the next substream.
    pub fn reset_next_substream(&mut self) {
        self.substream += 1;
        self.reset_start_substream();
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Index of the current substream (0 after `new` or `reset_start_stream`).
    pub fn substream(&self) -> u64 {
        self.substream
    }

    /// A uniform draw in `[0, 1)`.
    #[inline]
    pub fn next_uniform(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }

    /// Expose the inner `SmallRng` for use with distribution types
    /// (`dist.sample(stream.inner())`).
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.rng
    }
}

impl RngCore for RandomStream {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    #[inline]
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    #[inline]
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

#[inline]
fn substream_seed(seed: u64, substream: u64) -> u64 {
    seed ^ substream.wrapping_mul(MIXING_CONSTANT)
}
