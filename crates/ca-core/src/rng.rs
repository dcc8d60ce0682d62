//! Deterministic per-worker RNG wrapper.
//!
//! # Determinism strategy
//!
//! Each worker gets its own independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (rank * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive ranks uniformly across the seed space.  All
//! stochastic rule draws (random slow-down, lane-switch acceptance, spawn
//! admission) go through the owning worker's stream, so a run with a fixed
//! worker count and seed is reproducible.  Runs with *different* worker
//! counts draw from different streams and are not expected to match.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::Rank;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Per-worker deterministic RNG.
///
/// Create one per worker at bootstrap; the type is `!Sync` so a stream can
/// never be shared between workers by accident.
pub struct WorkerRng(SmallRng);

impl WorkerRng {
    /// Seed deterministically from the run's global seed and a worker rank.
    pub fn new(global_seed: u64, rank: Rank) -> Self {
        let seed = global_seed ^ (rank.0 as u64).wrapping_mul(MIXING_CONSTANT);
        WorkerRng(SmallRng::seed_from_u64(seed))
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Sample a uniformly distributed value of any `Standard`-distributed type.
    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }
}
