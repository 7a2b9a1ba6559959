use thiserror::Error;

use vanguard_client::LedgerError;
use vanguard_eligibility::RulesError;
use vanguard_roster::RosterError;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid voting rules: {0}")]
    Rules(#[from] RulesError),

    #[error("roster error: {0}")]
    Roster(#[from] RosterError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
