use serde::{Deserialize, Serialize};
use std::time::Duration;

/// `[rpc]` section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Node endpoint serving `condenser_api`.
    #[serde(default = "default_url")]
    pub url: String,

    /// Endpoint that signs and broadcasts votes.
    #[serde(default)]
    pub signer_url: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// How often the transfer stream polls for new blocks.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_url() -> String {
    "https://api.steemit.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_ms() -> u64 {
    3_000
}

impl RpcConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            signer_url: None,
            timeout_secs: default_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}
