//! Transfers and the block/history containers they arrive in.

use serde::{Deserialize, Serialize};

use crate::{Amount, Timestamp};

/// An observed payment between two accounts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: String,
    pub to: String,
    pub amount: Amount,
    /// Free text; pay-for-vote transfers carry the content slug here.
    pub memo: String,
}

/// A historical block, reduced to what replay needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub number: u64,
    pub timestamp: Timestamp,
    pub transfers: Vec<Transfer>,
}

/// One entry of an account's operation history.
///
/// `index` is the account-local sequence number, unique per account.
/// Operations other than transfers carry no payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub index: u64,
    pub transfer: Option<Transfer>,
}
