use thiserror::Error;

/// Transport and data errors from the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("ledger request failed: {0}")]
    Transport(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid response from ledger: {0}")]
    InvalidResponse(String),

    #[error("transfer stream closed")]
    StreamClosed,

    #[error("{0}")]
    Other(String),
}

/// Ledger hiccups that are safe to retry without changing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientKind {
    /// The transaction referenced a block the node no longer knows.
    StaleBlockReference,
    /// The node's clock disagrees with the transaction expiration.
    ClockSkew,
    /// The signature was not in canonical form.
    NonCanonicalSignature,
    /// The transaction expired before inclusion.
    ExpirationRace,
}

impl std::fmt::Display for TransientKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::StaleBlockReference => "stale block reference",
            Self::ClockSkew => "clock skew",
            Self::NonCanonicalSignature => "non-canonical signature",
            Self::ExpirationRace => "transaction expired",
        };
        f.write_str(s)
    }
}

/// Classified outcome of a rejected vote submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("duplicate vote")]
    DuplicateVote,

    #[error("voting too quickly")]
    RateLimited,

    #[error("voting weight too small")]
    WeightTooSmall,

    #[error("missing required posting authority")]
    MissingAuthority,

    #[error("invalid credential")]
    InvalidCredential,

    #[error("upvote lockout (too close to payout)")]
    PayoutLockout,

    #[error("transient ledger error: {0}")]
    Transient(TransientKind),

    #[error("{0}")]
    Other(String),
}

impl From<LedgerError> for SubmitError {
    fn from(e: LedgerError) -> Self {
        SubmitError::Other(e.to_string())
    }
}
