//! Voting rules: the immutable policy loaded once at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

use vanguard_types::{Amount, VoteWeight, VotingPower};

use crate::RulesError;

/// Raw `[voting_rules]` table as written in the configuration file.
///
/// Amounts and percentages stay textual here (`"1.000 STEEM"`, `"90.0 %"`);
/// [`VotingRules::from_config`] parses and validates them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RulesConfig {
    /// `"100.0 %"` for a fixed weight, or `"dynamic"`.
    #[serde(default = "default_vote_weight")]
    pub vote_weight: String,

    #[serde(default)]
    pub min_transfer: Option<String>,

    #[serde(default)]
    pub max_transfer: Option<String>,

    /// Only act on transfers larger than the recipient's average.
    #[serde(default)]
    pub only_above_average_transfers: bool,

    /// How many history entries to look back over per bot.
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,

    /// Probability that a history lookup discards the cache and refetches.
    #[serde(default = "default_history_refresh_chance")]
    pub history_refresh_chance: f64,

    /// Also vote on replies.
    #[serde(default)]
    pub enable_comments: bool,

    /// Minutes.
    #[serde(default)]
    pub min_wait: u32,

    /// Minutes.
    #[serde(default)]
    pub max_wait: u32,

    #[serde(default = "default_zero_percent")]
    pub min_voting_power: String,

    #[serde(default = "default_zero_percent")]
    pub reserve_voting_power: String,

    /// Minutes since creation after which content is ignored.
    #[serde(default)]
    pub max_age: Option<u64>,

    /// A reputation score (`25.0`) or `"dynamic:<limit>"`.
    #[serde(default)]
    pub min_reputation: Option<ReputationValue>,

    /// Probability that a dynamic reputation floor is recomputed per check.
    /// Defaults to `1 / (limit + 1)`.
    #[serde(default)]
    pub reputation_refresh_chance: Option<f64>,
}

/// `min_reputation` may be written as a number or a string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReputationValue {
    Number(f64),
    Text(String),
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_vote_weight() -> String {
    "100.0 %".to_string()
}

fn default_history_limit() -> u32 {
    100
}

fn default_history_refresh_chance() -> f64 {
    0.05
}

fn default_zero_percent() -> String {
    "0.0 %".to_string()
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            vote_weight: default_vote_weight(),
            min_transfer: None,
            max_transfer: None,
            only_above_average_transfers: false,
            history_limit: default_history_limit(),
            history_refresh_chance: default_history_refresh_chance(),
            enable_comments: false,
            min_wait: 0,
            max_wait: 0,
            min_voting_power: default_zero_percent(),
            reserve_voting_power: default_zero_percent(),
            max_age: None,
            min_reputation: None,
            reputation_refresh_chance: None,
        }
    }
}

// ── Parsed rules ───────────────────────────────────────────────────────

/// How vote weight is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeightSetting {
    Fixed(VoteWeight),
    /// Scale with the transfer relative to the recipient's largest transfer.
    Dynamic,
}

impl FromStr for WeightSetting {
    type Err = vanguard_types::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("dynamic") {
            Ok(Self::Dynamic)
        } else {
            s.parse().map(Self::Fixed)
        }
    }
}

/// Minimum author reputation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ReputationSetting {
    Fixed(f64),
    /// The lowest author reputation among the top `limit` trending posts.
    Dynamic { limit: u32, refresh_chance: f64 },
}

/// Account, tag and app lists consulted by the filters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterLists {
    /// Monitored pay-for-vote accounts.
    pub bots: HashSet<String>,
    pub skip_accounts: HashSet<String>,
    pub skip_tags: HashSet<String>,
    /// Empty means every tag is allowed.
    pub only_tags: HashSet<String>,
    pub skip_apps: HashSet<String>,
    /// Empty means every app is allowed.
    pub only_apps: HashSet<String>,
    /// A downvote from any of these vetoes the vote.
    pub flag_signals: HashSet<String>,
    /// An upvote from any of these vetoes the vote.
    pub vote_signals: HashSet<String>,
}

/// Validated voting policy. Read-only after startup.
#[derive(Clone, Debug, PartialEq)]
pub struct VotingRules {
    pub vote_weight: WeightSetting,
    pub min_transfer: Option<Amount>,
    pub max_transfer: Option<Amount>,
    pub only_above_average_transfers: bool,
    pub history_limit: u32,
    pub history_refresh_chance: f64,
    pub enable_comments: bool,
    pub min_wait_minutes: u32,
    pub max_wait_minutes: u32,
    pub min_voting_power: VotingPower,
    pub reserve_voting_power: VotingPower,
    pub max_age_minutes: Option<u64>,
    pub min_reputation: Option<ReputationSetting>,
    pub lists: FilterLists,
}

fn parse_field<T: FromStr<Err = vanguard_types::ParseError>>(
    field: &'static str,
    raw: &str,
) -> Result<T, RulesError> {
    raw.parse()
        .map_err(|source| RulesError::InvalidValue { field, source })
}

fn check_chance(field: &'static str, value: f64) -> Result<f64, RulesError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(RulesError::InvalidChance { field, value })
    }
}

impl VotingRules {
    pub fn from_config(config: &RulesConfig, lists: FilterLists) -> Result<Self, RulesError> {
        if config.min_wait > config.max_wait {
            return Err(RulesError::WaitRange {
                min: config.min_wait,
                max: config.max_wait,
            });
        }

        let min_voting_power: VotingPower =
            parse_field("min_voting_power", &config.min_voting_power)?;
        let reserve_voting_power: VotingPower =
            parse_field("reserve_voting_power", &config.reserve_voting_power)?;
        if reserve_voting_power > min_voting_power {
            return Err(RulesError::ReserveExceedsMinimum);
        }

        let min_reputation = match &config.min_reputation {
            None => None,
            Some(ReputationValue::Number(score)) => {
                Some(ReputationSetting::Fixed(*score))
            }
            Some(ReputationValue::Text(text)) => {
                Some(parse_reputation(text, config.reputation_refresh_chance)?)
            }
        };

        Ok(Self {
            vote_weight: parse_field("vote_weight", &config.vote_weight)?,
            min_transfer: config
                .min_transfer
                .as_deref()
                .map(|raw| parse_field("min_transfer", raw))
                .transpose()?,
            max_transfer: config
                .max_transfer
                .as_deref()
                .map(|raw| parse_field("max_transfer", raw))
                .transpose()?,
            only_above_average_transfers: config.only_above_average_transfers,
            history_limit: config.history_limit,
            history_refresh_chance: check_chance(
                "history_refresh_chance",
                config.history_refresh_chance,
            )?,
            enable_comments: config.enable_comments,
            min_wait_minutes: config.min_wait,
            max_wait_minutes: config.max_wait,
            min_voting_power,
            reserve_voting_power,
            max_age_minutes: config.max_age,
            min_reputation,
            lists,
        })
    }
}

fn parse_reputation(text: &str, refresh: Option<f64>) -> Result<ReputationSetting, RulesError> {
    let text = text.trim();
    if let Some(limit) = text.strip_prefix("dynamic:") {
        let limit: u32 = limit
            .trim()
            .parse()
            .map_err(|_| RulesError::InvalidReputation(text.to_string()))?;
        let refresh_chance = match refresh {
            Some(chance) => check_chance("reputation_refresh_chance", chance)?,
            None => 1.0 / (f64::from(limit) + 1.0),
        };
        return Ok(ReputationSetting::Dynamic {
            limit,
            refresh_chance,
        });
    }
    text.parse()
        .map(ReputationSetting::Fixed)
        .map_err(|_| RulesError::InvalidReputation(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(toml_str: &str) -> RulesConfig {
        toml::from_str(toml_str).expect("valid rules toml")
    }

    #[test]
    fn empty_config_uses_defaults() {
        let rules = VotingRules::from_config(&config_from(""), FilterLists::default()).unwrap();
        assert_eq!(rules.vote_weight, WeightSetting::Fixed(VoteWeight::FULL));
        assert_eq!(rules.history_limit, 100);
        assert_eq!(rules.history_refresh_chance, 0.05);
        assert_eq!(rules.min_transfer, None);
        assert!(!rules.enable_comments);
    }

    #[test]
    fn parses_full_rule_set() {
        let config = config_from(
            r#"
            vote_weight = "dynamic"
            min_transfer = "1.000 STEEM"
            max_transfer = "10.000 STEEM"
            min_wait = 1
            max_wait = 5
            min_voting_power = "80.0 %"
            reserve_voting_power = "5.0 %"
            max_age = 1440
            min_reputation = "dynamic:100"
            "#,
        );
        let rules = VotingRules::from_config(&config, FilterLists::default()).unwrap();
        assert_eq!(rules.vote_weight, WeightSetting::Dynamic);
        assert_eq!(rules.min_transfer, Some(Amount::from_milli(1_000, "STEEM")));
        assert_eq!(rules.max_transfer, Some(Amount::from_milli(10_000, "STEEM")));
        assert_eq!(rules.min_voting_power, VotingPower::new(8_000));
        assert_eq!(rules.reserve_voting_power, VotingPower::new(500));
        assert_eq!(rules.max_age_minutes, Some(1440));
        assert_eq!(
            rules.min_reputation,
            Some(ReputationSetting::Dynamic {
                limit: 100,
                refresh_chance: 1.0 / 101.0,
            })
        );
    }

    #[test]
    fn numeric_reputation_is_fixed() {
        let config = config_from("min_reputation = 25.5");
        let rules = VotingRules::from_config(&config, FilterLists::default()).unwrap();
        assert_eq!(rules.min_reputation, Some(ReputationSetting::Fixed(25.5)));
    }

    #[test]
    fn rejects_inverted_wait_range() {
        let config = config_from("min_wait = 10\nmax_wait = 5");
        assert_eq!(
            VotingRules::from_config(&config, FilterLists::default()),
            Err(RulesError::WaitRange { min: 10, max: 5 })
        );
    }

    #[test]
    fn rejects_reserve_above_minimum() {
        let config = config_from(
            "min_voting_power = \"50.0 %\"\nreserve_voting_power = \"60.0 %\"",
        );
        assert_eq!(
            VotingRules::from_config(&config, FilterLists::default()),
            Err(RulesError::ReserveExceedsMinimum)
        );
    }

    #[test]
    fn rejects_malformed_amount() {
        let config = config_from("min_transfer = \"lots\"");
        assert!(matches!(
            VotingRules::from_config(&config, FilterLists::default()),
            Err(RulesError::InvalidValue {
                field: "min_transfer",
                ..
            })
        ));
    }

    #[test]
    fn rejects_bad_refresh_chance() {
        let config = config_from("history_refresh_chance = 1.5");
        assert!(matches!(
            VotingRules::from_config(&config, FilterLists::default()),
            Err(RulesError::InvalidChance { .. })
        ));
    }
}
