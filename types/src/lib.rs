//! Fundamental types for the vanguard voting engine.
//!
//! This crate defines the data shared across every other crate in the workspace:
//! asset amounts, content slugs, transfers, content snapshots, vote weights,
//! voting power, signing credentials, and the clock/randomness seams.

pub mod amount;
pub mod content;
pub mod error;
pub mod keys;
pub mod power;
pub mod random;
pub mod slug;
pub mod time;
pub mod transfer;

pub use amount::Amount;
pub use content::{ActiveVote, ContentMetadata, ContentSnapshot};
pub use error::ParseError;
pub use keys::Credential;
pub use power::{VoteWeight, VotingPower};
pub use random::{RandomSource, ThreadRandom};
pub use slug::Slug;
pub use time::{Clock, SystemClock, Timestamp};
pub use transfer::{Block, HistoryEntry, Transfer};
