//! Point-in-time views of posts and comments.

use serde::{Deserialize, Serialize};

use crate::{Amount, Slug, Timestamp};

/// A vote already cast on a piece of content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveVote {
    pub voter: String,
    /// Signed percent in hundredths (`-10000..=10000`). Negative is a flag.
    pub percent: i32,
}

/// A snapshot of a post or comment as returned by the ledger.
///
/// Snapshots go stale: votes accumulate and the author may edit. Re-fetch
/// before acting on one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContentSnapshot {
    pub author: String,
    pub permlink: String,
    /// Empty for top-level posts.
    pub parent_author: String,
    /// For top-level posts this is the category (first tag).
    pub parent_permlink: String,
    pub created: Timestamp,
    /// `None` when the ledger no longer reports a cashout time.
    pub cashout_time: Option<Timestamp>,
    pub max_accepted_payout: Amount,
    /// Raw JSON metadata as stored on the ledger.
    pub json_metadata: String,
    /// Raw (unscaled) author reputation.
    pub author_reputation: i64,
    pub active_votes: Vec<ActiveVote>,
}

impl ContentSnapshot {
    pub fn slug(&self) -> Slug {
        Slug::new(self.author.clone(), self.permlink.clone())
    }

    /// Whether this is a reply rather than a top-level post.
    pub fn is_reply(&self) -> bool {
        !self.parent_author.is_empty()
    }

    pub fn metadata(&self) -> ContentMetadata {
        ContentMetadata::parse(&self.json_metadata)
    }

    /// Every account that has voted, regardless of direction.
    pub fn voters(&self) -> impl Iterator<Item = &str> {
        self.active_votes.iter().map(|v| v.voter.as_str())
    }

    pub fn upvoters(&self) -> impl Iterator<Item = &str> {
        self.active_votes
            .iter()
            .filter(|v| v.percent > 0)
            .map(|v| v.voter.as_str())
    }

    pub fn downvoters(&self) -> impl Iterator<Item = &str> {
        self.active_votes
            .iter()
            .filter(|v| v.percent < 0)
            .map(|v| v.voter.as_str())
    }

    pub fn has_voted(&self, account: &str) -> bool {
        self.voters().any(|v| v == account)
    }
}

/// The parts of `json_metadata` the filters care about.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContentMetadata {
    pub tags: Vec<String>,
    /// Application name with any `/version` suffix removed.
    pub app: Option<String>,
}

impl ContentMetadata {
    /// Parse raw metadata leniently: malformed JSON yields empty metadata,
    /// and `tags` may be either a single string or an array.
    pub fn parse(raw: &str) -> Self {
        let value: serde_json::Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(_) => return Self::default(),
        };

        let tags = match value.get("tags") {
            Some(serde_json::Value::String(tag)) => vec![tag.clone()],
            Some(serde_json::Value::Array(items)) => items
                .iter()
                .filter_map(|t| t.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        };

        let app = value
            .get("app")
            .and_then(|a| a.as_str())
            .and_then(|a| a.split('/').next())
            .filter(|a| !a.is_empty())
            .map(str::to_string);

        Self { tags, app }
    }
}
