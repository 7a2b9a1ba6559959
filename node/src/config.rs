//! Daemon configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use vanguard_dispatch::DispatchConfig;
use vanguard_eligibility::{FilterLists, RulesConfig, VotingRules};
use vanguard_roster::VoterRoster;
use vanguard_rpc::RpcConfig;
use vanguard_utils::LogFormat;

use crate::NodeError;

/// An account, tag or app list: inline array, whitespace-separated string,
/// or `{ file = "path" }` with whitespace-separated entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListSource {
    Items(Vec<String>),
    File { file: PathBuf },
    Text(String),
}

impl Default for ListSource {
    fn default() -> Self {
        Self::Items(Vec::new())
    }
}

fn read_file(path: &Path) -> Result<String, NodeError> {
    std::fs::read_to_string(path)
        .map_err(|e| NodeError::Config(format!("{}: {e}", path.display())))
}

impl ListSource {
    pub fn resolve(&self) -> Result<HashSet<String>, NodeError> {
        let words = |text: &str| -> HashSet<String> {
            text.split_whitespace().map(str::to_string).collect()
        };
        match self {
            Self::Items(items) => Ok(items.iter().flat_map(|i| words(i)).collect()),
            Self::Text(text) => Ok(words(text)),
            Self::File { file } => Ok(words(&read_file(file)?)),
        }
    }
}

/// Voter credentials: inline `"name credential"` entries or a file of them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VotersSource {
    Entries(Vec<String>),
    File { file: PathBuf },
}

impl Default for VotersSource {
    fn default() -> Self {
        Self::Entries(Vec::new())
    }
}

impl VotersSource {
    pub fn load(&self) -> Result<VoterRoster, NodeError> {
        let roster = match self {
            Self::Entries(entries) => VoterRoster::parse(entries.iter().map(String::as_str))?,
            Self::File { file } => VoterRoster::from_file(file)?,
        };
        Ok(roster)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Append-only record of disabled voters.
    #[serde(default = "default_disabled_voters_path")]
    pub disabled_voters_path: PathBuf,

    /// Pause before reopening a failed transfer stream.
    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,

    /// Blocks fetched per request while replaying.
    #[serde(default = "default_replay_batch_size")]
    pub replay_batch_size: u64,

    #[serde(default)]
    pub voters: VotersSource,

    #[serde(default)]
    pub bots: ListSource,
    #[serde(default)]
    pub skip_accounts: ListSource,
    #[serde(default)]
    pub skip_tags: ListSource,
    #[serde(default)]
    pub only_tags: ListSource,
    #[serde(default)]
    pub skip_apps: ListSource,
    #[serde(default)]
    pub only_apps: ListSource,
    #[serde(default)]
    pub flag_signals: ListSource,
    #[serde(default)]
    pub vote_signals: ListSource,

    #[serde(default)]
    pub rpc: RpcConfig,

    #[serde(default)]
    pub voting_rules: RulesConfig,

    #[serde(default)]
    pub dispatch: DispatchConfig,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}

fn default_disabled_voters_path() -> PathBuf {
    PathBuf::from("vanguard-disabled-voters.txt")
}

fn default_reconnect_delay_secs() -> u64 {
    5
}

fn default_replay_batch_size() -> u64 {
    100
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, NodeError> {
        Self::from_toml_str(&read_file(path)?)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    pub fn filter_lists(&self) -> Result<FilterLists, NodeError> {
        Ok(FilterLists {
            bots: self.bots.resolve()?,
            skip_accounts: self.skip_accounts.resolve()?,
            skip_tags: self.skip_tags.resolve()?,
            only_tags: self.only_tags.resolve()?,
            skip_apps: self.skip_apps.resolve()?,
            only_apps: self.only_apps.resolve()?,
            flag_signals: self.flag_signals.resolve()?,
            vote_signals: self.vote_signals.resolve()?,
        })
    }

    /// Parsed and validated voting rules, lists included.
    pub fn rules(&self) -> Result<VotingRules, NodeError> {
        Ok(VotingRules::from_config(
            &self.voting_rules,
            self.filter_lists()?,
        )?)
    }

    pub fn roster(&self) -> Result<VoterRoster, NodeError> {
        self.voters.load()
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            disabled_voters_path: default_disabled_voters_path(),
            reconnect_delay_secs: default_reconnect_delay_secs(),
            replay_batch_size: default_replay_batch_size(),
            voters: VotersSource::default(),
            bots: ListSource::default(),
            skip_accounts: ListSource::default(),
            skip_tags: ListSource::default(),
            only_tags: ListSource::default(),
            skip_apps: ListSource::default(),
            only_apps: ListSource::default(),
            flag_signals: ListSource::default(),
            vote_signals: ListSource::default(),
            rpc: RpcConfig::default(),
            voting_rules: RulesConfig::default(),
            dispatch: DispatchConfig::default(),
        }
    }
}
