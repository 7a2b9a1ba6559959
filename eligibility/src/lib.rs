//! Eligibility: deciding whether a transfer and its content are worth a vote,
//! and how strong that vote should be.
//!
//! Two filter stages:
//! - [`TransferFilter`] and [`ContentFilter::may_vote`] run as soon as a
//!   transfer is observed and reject cheaply.
//! - [`ContentFilter::skip`] runs again right before submission, against a
//!   fresh snapshot, because the content may have changed in the meantime.
//!
//! [`WeightPolicy`] turns a transfer into a vote weight, either fixed or
//! scaled to the largest payment the recipient has ever received.

pub mod content_filter;
pub mod error;
pub mod history;
pub mod reputation;
pub mod rules;
pub mod transfer_filter;
pub mod verdict;
pub mod weight;

pub use content_filter::ContentFilter;
pub use error::RulesError;
pub use history::TransferHistory;
pub use reputation::{to_reputation, ReputationFloor};
pub use rules::{
    FilterLists, ReputationSetting, ReputationValue, RulesConfig, VotingRules, WeightSetting,
};
pub use transfer_filter::TransferFilter;
pub use verdict::{Rejection, SkipReason, Verdict};
pub use weight::{dynamic_weight, WeightPolicy};
