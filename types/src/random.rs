//! Randomness seam.
//!
//! Vote timing and voter selection are randomized; tests substitute a
//! deterministic source.

use rand::Rng;

/// Source of randomness for scheduling decisions.
pub trait RandomSource: Send + Sync {
    /// A uniformly distributed value in `[low, high)`. Returns `low` when the
    /// range is empty.
    fn uniform(&self, low: f64, high: f64) -> f64;

    /// A uniformly distributed index in `0..len`. `len` must be non-zero.
    fn index(&self, len: usize) -> usize;

    /// `true` with the given probability.
    fn chance(&self, probability: f64) -> bool {
        self.uniform(0.0, 1.0) < probability
    }
}

/// Randomness from the thread-local generator.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn uniform(&self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        rand::thread_rng().gen_range(low..high)
    }

    fn index(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}
