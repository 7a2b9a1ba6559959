//! Parse errors for the textual forms used by the ledger and configuration.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid percentage: {0}")]
    InvalidPercent(String),

    #[error("percentage out of range (0-100 %): {0}")]
    PercentOutOfRange(String),
}
