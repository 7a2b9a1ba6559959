//! `[dispatch]` tunables.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Pause before voting on content that is already past its wait.
    #[serde(default = "default_settle_delay")]
    pub settle_delay_secs: f64,

    /// Pause before retrying a voter that hit the voting interval limit or a
    /// transient ledger glitch.
    #[serde(default = "default_rate_limit_delay")]
    pub rate_limit_delay_secs: f64,

    #[serde(default = "default_backoff_start")]
    pub backoff_start_secs: f64,

    #[serde(default = "default_backoff_cap")]
    pub backoff_cap_secs: f64,

    /// Transient and rate-limited retries allowed per voter per task.
    #[serde(default = "default_retry_ceiling")]
    pub retry_ceiling: u32,
}

fn default_settle_delay() -> f64 {
    3.0
}

fn default_rate_limit_delay() -> f64 {
    3.0
}

fn default_backoff_start() -> f64 {
    0.2
}

fn default_backoff_cap() -> f64 {
    12.8
}

fn default_retry_ceiling() -> u32 {
    10
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            settle_delay_secs: default_settle_delay(),
            rate_limit_delay_secs: default_rate_limit_delay(),
            backoff_start_secs: default_backoff_start(),
            backoff_cap_secs: default_backoff_cap(),
            retry_ceiling: default_retry_ceiling(),
        }
    }
}

fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

impl DispatchConfig {
    pub fn settle_delay(&self) -> Duration {
        secs(self.settle_delay_secs)
    }

    pub fn rate_limit_delay(&self) -> Duration {
        secs(self.rate_limit_delay_secs)
    }

    pub fn backoff_start(&self) -> Duration {
        secs(self.backoff_start_secs)
    }

    pub fn backoff_cap(&self) -> Duration {
        secs(self.backoff_cap_secs)
    }
}
