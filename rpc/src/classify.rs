//! Mapping signer rejections onto [`SubmitError`].
//!
//! A signer that knows the taxonomy reports a `kind`. Otherwise the raw
//! ledger assertion text is matched against the messages nodes are known
//! to produce.

use vanguard_client::{SubmitError, TransientKind};

const KNOWN_MESSAGES: &[(&str, SubmitError)] = &[
    ("You have already voted in a similar way", SubmitError::DuplicateVote),
    ("Can only vote once every 3 seconds", SubmitError::RateLimited),
    ("Voting weight is too small", SubmitError::WeightTooSmall),
    ("missing required posting authority", SubmitError::MissingAuthority),
    ("Invalid version", SubmitError::InvalidCredential),
    ("UPVOTE_LOCKOUT", SubmitError::PayoutLockout),
    (
        "tapos_block_summary",
        SubmitError::Transient(TransientKind::StaleBlockReference),
    ),
    (
        "now < trx.expiration",
        SubmitError::Transient(TransientKind::ClockSkew),
    ),
    (
        "transaction expiration exception",
        SubmitError::Transient(TransientKind::ExpirationRace),
    ),
    (
        "signature is not canonical",
        SubmitError::Transient(TransientKind::NonCanonicalSignature),
    ),
];

fn from_kind(kind: &str) -> Option<SubmitError> {
    let error = match kind {
        "duplicate_vote" => SubmitError::DuplicateVote,
        "rate_limited" => SubmitError::RateLimited,
        "weight_too_small" => SubmitError::WeightTooSmall,
        "missing_authority" => SubmitError::MissingAuthority,
        "invalid_credential" => SubmitError::InvalidCredential,
        "payout_lockout" => SubmitError::PayoutLockout,
        "stale_block_reference" => SubmitError::Transient(TransientKind::StaleBlockReference),
        "clock_skew" => SubmitError::Transient(TransientKind::ClockSkew),
        "non_canonical_signature" => {
            SubmitError::Transient(TransientKind::NonCanonicalSignature)
        }
        "expiration_race" => SubmitError::Transient(TransientKind::ExpirationRace),
        _ => return None,
    };
    Some(error)
}

/// Classify a rejected vote.
pub fn classify(kind: Option<&str>, message: &str) -> SubmitError {
    if let Some(error) = kind.and_then(from_kind) {
        return error;
    }
    KNOWN_MESSAGES
        .iter()
        .find(|(needle, _)| message.contains(needle))
        .map(|(_, error)| error.clone())
        .unwrap_or_else(|| SubmitError::Other(message.to_string()))
}
