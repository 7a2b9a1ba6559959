//! Exponential backoff between generic submission failures.

use std::time::Duration;

/// Doubling delay, capped.
#[derive(Clone, Debug)]
pub struct Backoff {
    current: Duration,
    cap: Duration,
}

impl Backoff {
    pub fn new(start: Duration, cap: Duration) -> Self {
        Self {
            current: start.min(cap),
            cap,
        }
    }

    /// The delay to wait now. Doubles the following one, up to the cap.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.cap);
        delay
    }
}
