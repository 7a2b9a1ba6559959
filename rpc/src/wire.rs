//! `condenser_api` response shapes and their conversion into domain types.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use vanguard_client::AccountPower;
use vanguard_types::{
    ActiveVote, Amount, Block, ContentSnapshot, HistoryEntry, Timestamp, Transfer, VotingPower,
};

use crate::RpcError;

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a ledger timestamp (`2017-06-01T12:00:00`, UTC). Anything before
/// the epoch becomes the epoch.
pub fn parse_time(raw: &str) -> Result<Timestamp, RpcError> {
    let trimmed = raw.trim_end_matches('Z');
    let parsed = NaiveDateTime::parse_from_str(trimmed, TIME_FORMAT)
        .map_err(|e| RpcError::Decode(format!("bad timestamp {raw:?}: {e}")))?;
    let secs = parsed.and_utc().timestamp().max(0);
    Ok(Timestamp::new(secs as u64))
}

/// Integers the node sometimes sends as strings.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum Flexible {
    Int(i64),
    Text(String),
}

impl Flexible {
    pub fn as_i64(&self) -> Result<i64, RpcError> {
        match self {
            Self::Int(v) => Ok(*v),
            Self::Text(s) => s
                .parse()
                .map_err(|_| RpcError::Decode(format!("not an integer: {s:?}"))),
        }
    }
}

impl Default for Flexible {
    fn default() -> Self {
        Self::Int(0)
    }
}

#[derive(Debug, Deserialize)]
pub struct RpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
pub struct RpcErrorBody {
    #[serde(default)]
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct RawVote {
    pub voter: String,
    #[serde(default)]
    pub percent: Flexible,
}

#[derive(Debug, Deserialize)]
pub struct RawContent {
    pub author: String,
    pub permlink: String,
    #[serde(default)]
    pub parent_author: String,
    #[serde(default)]
    pub parent_permlink: String,
    pub created: String,
    #[serde(default)]
    pub cashout_time: Option<String>,
    pub max_accepted_payout: Amount,
    #[serde(default)]
    pub json_metadata: String,
    #[serde(default)]
    pub author_reputation: Flexible,
    #[serde(default)]
    pub active_votes: Vec<RawVote>,
}

impl RawContent {
    /// The node answers unknown content with an empty record.
    pub fn is_empty(&self) -> bool {
        self.author.is_empty()
    }

    pub fn into_snapshot(self) -> Result<ContentSnapshot, RpcError> {
        let active_votes = self
            .active_votes
            .into_iter()
            .map(|v| {
                let percent = v.percent.as_i64()?;
                Ok(ActiveVote {
                    voter: v.voter,
                    percent: percent.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32,
                })
            })
            .collect::<Result<Vec<_>, RpcError>>()?;

        Ok(ContentSnapshot {
            created: parse_time(&self.created)?,
            cashout_time: self.cashout_time.as_deref().map(parse_time).transpose()?,
            author: self.author,
            permlink: self.permlink,
            parent_author: self.parent_author,
            parent_permlink: self.parent_permlink,
            max_accepted_payout: self.max_accepted_payout,
            json_metadata: self.json_metadata,
            author_reputation: self.author_reputation.as_i64()?,
            active_votes,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RawAccount {
    pub name: String,
    pub voting_power: u16,
    pub last_vote_time: String,
}

impl RawAccount {
    pub fn into_power(self) -> Result<AccountPower, RpcError> {
        Ok(AccountPower {
            last_vote_time: parse_time(&self.last_vote_time)?,
            name: self.name,
            voting_power: VotingPower::new(self.voting_power),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RawTransfer {
    pub from: String,
    pub to: String,
    pub amount: Amount,
    #[serde(default)]
    pub memo: String,
}

impl From<RawTransfer> for Transfer {
    fn from(raw: RawTransfer) -> Self {
        Transfer {
            from: raw.from,
            to: raw.to,
            amount: raw.amount,
            memo: raw.memo,
        }
    }
}

/// `[type, payload]`; payloads of other operation types are ignored.
fn transfer_op(op: &Value) -> Option<Transfer> {
    let pair = op.as_array()?;
    if pair.first()?.as_str()? != "transfer" {
        return None;
    }
    serde_json::from_value::<RawTransfer>(pair.get(1)?.clone())
        .ok()
        .map(Transfer::from)
}

#[derive(Debug, Deserialize)]
pub struct RawHistoryOp {
    pub op: Value,
}

/// One `[index, { op: [type, payload], .. }]` pair.
pub fn history_entry((index, item): (u64, RawHistoryOp)) -> HistoryEntry {
    HistoryEntry {
        index,
        transfer: transfer_op(&item.op),
    }
}

#[derive(Debug, Deserialize)]
pub struct RawTransaction {
    #[serde(default)]
    pub operations: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct RawBlock {
    pub timestamp: String,
    #[serde(default)]
    pub transactions: Vec<RawTransaction>,
}

impl RawBlock {
    pub fn into_block(self, number: u64) -> Result<Block, RpcError> {
        let transfers = self
            .transactions
            .iter()
            .flat_map(|tx| tx.operations.iter())
            .filter_map(transfer_op)
            .collect();
        Ok(Block {
            number,
            timestamp: parse_time(&self.timestamp)?,
            transfers,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RawGlobalProperties {
    pub head_block_number: u64,
    pub last_irreversible_block_num: u64,
}

#[derive(Debug, Deserialize)]
pub struct RawDiscussion {
    #[serde(default)]
    pub author_reputation: Flexible,
}

/// Body sent to the signer.
#[derive(Debug, Serialize)]
pub struct SignerRequest<'a> {
    pub voter: &'a str,
    pub credential: &'a str,
    pub author: &'a str,
    pub permlink: &'a str,
    pub weight: u16,
}

#[derive(Debug, Deserialize)]
pub struct SignerResponse {
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub error: Option<SignerError>,
}

#[derive(Debug, Deserialize)]
pub struct SignerError {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub message: String,
}
