//! The ledger client collaborator.
//!
//! The engine never talks to the network directly. Everything it needs from
//! the ledger (the transfer stream, content snapshots, account power and
//! history, historical blocks, and vote submission) goes through
//! [`LedgerClient`]. Implementations are responsible for transport and for
//! classifying submission failures into [`SubmitError`].

pub mod error;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use vanguard_types::{
    Block, ContentSnapshot, Credential, HistoryEntry, Slug, Timestamp, Transfer, VoteWeight,
    VotingPower,
};

pub use error::{LedgerError, SubmitError, TransientKind};

/// Live transfers. The stream ends (or yields an error) on disconnect.
pub type TransferStream = mpsc::Receiver<Result<Transfer, LedgerError>>;

/// Authoritative voting power of an account at its last vote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountPower {
    pub name: String,
    /// Power as stored by the ledger, i.e. as of `last_vote_time`.
    pub voting_power: VotingPower,
    pub last_vote_time: Timestamp,
}

/// An abstract "cast vote" request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRequest {
    pub voter: String,
    pub author: String,
    pub permlink: String,
    pub weight: VoteWeight,
}

/// Acknowledgement of an accepted vote.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    /// Transaction id, when the ledger reports one.
    pub transaction_id: Option<String>,
}

#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Open the live transfer stream.
    async fn stream_transfers(&self) -> Result<TransferStream, LedgerError>;

    /// Fetch a fresh snapshot of a post or comment.
    async fn get_content(&self, slug: &Slug) -> Result<ContentSnapshot, LedgerError>;

    /// Batch fetch of stored voting power for the named accounts.
    async fn get_accounts_power(&self, names: &[String]) -> Result<Vec<AccountPower>, LedgerError>;

    /// The most recent `limit` history entries of an account, oldest first.
    async fn get_account_history(
        &self,
        name: &str,
        limit: u32,
    ) -> Result<Vec<HistoryEntry>, LedgerError>;

    /// Sign and broadcast a vote with the given credential.
    async fn submit_vote(
        &self,
        credential: &Credential,
        vote: &VoteRequest,
    ) -> Result<VoteReceipt, SubmitError>;

    /// Number of the last irreversible block.
    async fn last_irreversible_block(&self) -> Result<u64, LedgerError>;

    /// Blocks `low..=high` in ascending order.
    async fn get_block_range(&self, low: u64, high: u64) -> Result<Vec<Block>, LedgerError>;

    /// Raw author reputations of the top `limit` trending posts.
    async fn get_trending_reputations(&self, limit: u32) -> Result<Vec<i64>, LedgerError>;
}
