//! Filter outcomes.
//!
//! Rejections are expected and never retried; they are values, not errors.

use std::fmt;

use vanguard_types::Amount;

/// Why a transfer or its content was not acted on.
#[derive(Clone, Debug, PartialEq)]
pub enum Rejection {
    NotMonitored { recipient: String },
    AssetMismatch { expected: String, actual: String },
    BelowMinimum { minimum: Amount },
    AboveMaximum { maximum: Amount },
    BelowAverage { average: Amount },
    NoSlugInMemo,
    ContentNotFound,
    RepliesDisabled,
    SkipTag(String),
    NoAllowedTag,
    SkipAccount(String),
    SkipApp(String),
    AppNotAllowed(Option<String>),
    BotAlreadyVoted(String),
    LowReputation { reputation: f64, floor: f64 },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotMonitored { recipient } => write!(f, "{recipient} is not a monitored bot"),
            Self::AssetMismatch { expected, actual } => {
                write!(f, "asset {actual} does not match {expected}")
            }
            Self::BelowMinimum { minimum } => write!(f, "transfer below minimum {minimum}"),
            Self::AboveMaximum { maximum } => write!(f, "transfer above maximum {maximum}"),
            Self::BelowAverage { average } => {
                write!(f, "transfer not above recipient average {average}")
            }
            Self::NoSlugInMemo => f.write_str("memo does not reference content"),
            Self::ContentNotFound => f.write_str("content not found"),
            Self::RepliesDisabled => f.write_str("replies are disabled"),
            Self::SkipTag(tag) => write!(f, "skipped tag {tag}"),
            Self::NoAllowedTag => f.write_str("no allowed tag"),
            Self::SkipAccount(author) => write!(f, "skipped account {author}"),
            Self::SkipApp(app) => write!(f, "skipped app {app}"),
            Self::AppNotAllowed(app) => {
                write!(f, "app {} not allowed", app.as_deref().unwrap_or("<none>"))
            }
            Self::BotAlreadyVoted(bot) => write!(f, "cannot front-run, {bot} already voted"),
            Self::LowReputation { reputation, floor } => {
                write!(f, "author reputation {reputation:.3} below {floor:.3}")
            }
        }
    }
}

/// Outcome of a filter stage.
#[derive(Clone, Debug, PartialEq)]
pub enum Verdict {
    Eligible,
    Rejected(Rejection),
}

impl Verdict {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible)
    }
}

/// Why the pre-submission gate refused to vote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    BotAlreadyVoted(Vec<String>),
    CashoutPassed,
    TooOld { age_minutes: u64 },
    PayoutDeclined,
    NoVotersLeft,
    FlagSignal(Vec<String>),
    VoteSignal(Vec<String>),
    AlreadyVoted(Vec<String>),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BotAlreadyVoted(bots) => {
                write!(f, "cannot front-run ({} voted)", bots.join(" "))
            }
            Self::CashoutPassed => f.write_str("cashout time has passed"),
            Self::TooOld { age_minutes } => write!(f, "too old ({age_minutes} minutes)"),
            Self::PayoutDeclined => f.write_str("payout declined"),
            Self::NoVotersLeft => f.write_str("everyone already voted"),
            Self::FlagSignal(accounts) => {
                write!(f, "flag signals ({} flagged)", accounts.join(" "))
            }
            Self::VoteSignal(accounts) => {
                write!(f, "vote signals ({} voted)", accounts.join(" "))
            }
            Self::AlreadyVoted(voters) => write!(f, "already voted ({})", voters.join(" ")),
        }
    }
}
