use thiserror::Error;

use vanguard_types::ParseError;

/// Invalid voting rules.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RulesError {
    #[error("voting_rules.{field}: {source}")]
    InvalidValue {
        field: &'static str,
        #[source]
        source: ParseError,
    },

    #[error("voting_rules.min_reputation: expected a number or \"dynamic:<limit>\", got {0:?}")]
    InvalidReputation(String),

    #[error("voting_rules: min_wait ({min}) is greater than max_wait ({max})")]
    WaitRange { min: u32, max: u32 },

    #[error("voting_rules: reserve_voting_power exceeds min_voting_power")]
    ReserveExceedsMinimum,

    #[error("voting_rules.{field}: probability must be within 0..=1, got {value}")]
    InvalidChance { field: &'static str, value: f64 },
}
