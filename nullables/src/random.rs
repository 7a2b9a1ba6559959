//! Nullable random: deterministic scheduling decisions.

use std::collections::VecDeque;
use std::sync::Mutex;

use vanguard_types::RandomSource;

/// A deterministic [`RandomSource`] for testing.
///
/// `uniform` returns `low + fraction * (high - low)` for a fixed fraction.
/// `index` returns scripted indices (modulo `len`) and then `0`.
/// `chance` returns a fixed answer.
pub struct NullRandom {
    fraction: f64,
    chance: bool,
    indices: Mutex<VecDeque<usize>>,
}

impl NullRandom {
    /// Create with a fixed fraction in `[0, 1)`; `chance` always answers `false`.
    pub fn new(fraction: f64) -> Self {
        Self {
            fraction,
            chance: false,
            indices: Mutex::new(VecDeque::new()),
        }
    }

    /// Make every `chance` call answer `answer`.
    pub fn with_chance(mut self, answer: bool) -> Self {
        self.chance = answer;
        self
    }

    /// Script the next indices returned by `index`.
    pub fn with_indices(self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.indices.lock().unwrap().extend(indices);
        self
    }
}

impl Default for NullRandom {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl RandomSource for NullRandom {
    fn uniform(&self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        low + self.fraction * (high - low)
    }

    fn index(&self, len: usize) -> usize {
        self.indices
            .lock()
            .unwrap()
            .pop_front()
            .map(|i| i % len)
            .unwrap_or(0)
    }

    fn chance(&self, _probability: f64) -> bool {
        self.chance
    }
}
