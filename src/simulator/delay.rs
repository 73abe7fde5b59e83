//! Randomized delay generation.

use std::sync::Arc;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use super::clock::Clock;
use crate::presets::DelayRange;

/// Source of uniformly distributed integers.
///
/// The only source of non-determinism in a simulation; swap it for
/// `SeededRandom` or `FixedRandom` to make runs reproducible.
pub trait RandomSource: Send {
    /// Uniform integer in `[min, max]`. Callers guarantee `min <= max`.
    fn between_inclusive(&mut self, min: u64, max: u64) -> u64;
}

/// Thread-local entropy via `rand::thread_rng`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn between_inclusive(&mut self, min: u64, max: u64) -> u64 {
        rand::thread_rng().gen_range(min..=max)
    }
}

/// Reproducible stream seeded from a `u64`.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    /// Create a stream from `seed`; equal seeds yield equal sequences.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn between_inclusive(&mut self, min: u64, max: u64) -> u64 {
        self.rng.gen_range(min..=max)
    }
}

/// Always picks the same end of the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedRandom {
    /// Lower bound of every range.
    Minimum,
    /// Upper bound of every range.
    Maximum,
}

impl RandomSource for FixedRandom {
    fn between_inclusive(&mut self, min: u64, max: u64) -> u64 {
        match self {
            FixedRandom::Minimum => min,
            FixedRandom::Maximum => max,
        }
    }
}

/// Samples pause durations from a `DelayRange` and sleeps on a `Clock`.
pub struct DelayGenerator {
    random: Box<dyn RandomSource>,
    clock: Arc<dyn Clock>,
}

impl DelayGenerator {
    /// Create a generator from a random source and a clock.
    pub fn new(random: Box<dyn RandomSource>, clock: Arc<dyn Clock>) -> Self {
        Self { random, clock }
    }

    /// Replace the random source.
    pub fn with_random(mut self, random: Box<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    /// Replace the clock used for sleeping.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Draw a duration uniformly from `range`, millisecond granularity.
    pub fn sample(&mut self, range: DelayRange) -> Duration {
        let ms = self
            .random
            .between_inclusive(range.min_ms(), range.max_ms());
        Duration::from_millis(ms)
    }

    /// Draw a duration from `range` and sleep for it. Returns the slept duration.
    pub async fn pause(&mut self, range: DelayRange) -> Duration {
        let delay = self.sample(range);
        debug!(delay_ms = delay.as_millis() as u64, range = %range, "Pausing");
        self.clock.sleep(delay).await;
        delay
    }
}

impl std::fmt::Debug for DelayGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelayGenerator").finish_non_exhaustive()
    }
}
