//! Content-level gates: [`ContentFilter::may_vote`] at observation time and
//! [`ContentFilter::skip`] right before submission.

use std::collections::HashSet;
use std::sync::Arc;

use vanguard_types::{ContentSnapshot, Timestamp};

use crate::{Rejection, SkipReason, Verdict, VotingRules};

pub struct ContentFilter {
    rules: Arc<VotingRules>,
}

/// Members of `set` among `accounts`, in `accounts` order, deduplicated.
fn matching<'a>(accounts: impl Iterator<Item = &'a str>, set: &HashSet<String>) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for account in accounts {
        if set.contains(account) && !found.iter().any(|f| f == account) {
            found.push(account.to_string());
        }
    }
    found
}

impl ContentFilter {
    pub fn new(rules: Arc<VotingRules>) -> Self {
        Self { rules }
    }

    /// Observation-time check. Pure.
    pub fn may_vote(&self, content: &ContentSnapshot) -> Verdict {
        let lists = &self.rules.lists;

        if !self.rules.enable_comments && content.is_reply() {
            return Verdict::Rejected(Rejection::RepliesDisabled);
        }
        if lists.skip_tags.contains(&content.parent_permlink) {
            return Verdict::Rejected(Rejection::SkipTag(content.parent_permlink.clone()));
        }

        let metadata = content.metadata();
        if let Some(tag) = metadata.tags.iter().find(|t| lists.skip_tags.contains(*t)) {
            return Verdict::Rejected(Rejection::SkipTag(tag.clone()));
        }
        if !lists.only_tags.is_empty() && !metadata.tags.iter().any(|t| lists.only_tags.contains(t))
        {
            return Verdict::Rejected(Rejection::NoAllowedTag);
        }
        if lists.skip_accounts.contains(&content.author) {
            return Verdict::Rejected(Rejection::SkipAccount(content.author.clone()));
        }
        if let Some(app) = metadata.app.as_ref().filter(|a| lists.skip_apps.contains(*a)) {
            return Verdict::Rejected(Rejection::SkipApp(app.clone()));
        }
        if !lists.only_apps.is_empty()
            && !metadata
                .app
                .as_ref()
                .is_some_and(|a| lists.only_apps.contains(a))
        {
            return Verdict::Rejected(Rejection::AppNotAllowed(metadata.app));
        }
        if let Some(bot) = matching(content.voters(), &lists.bots).into_iter().next() {
            return Verdict::Rejected(Rejection::BotAlreadyVoted(bot));
        }

        Verdict::Eligible
    }

    /// Pre-submission gate. Returns the first reason not to vote, if any.
    ///
    /// `voters` is the task's remaining working set.
    pub fn skip(
        &self,
        content: &ContentSnapshot,
        voters: &[String],
        now: Timestamp,
    ) -> Option<SkipReason> {
        let lists = &self.rules.lists;

        let bots = matching(content.voters(), &lists.bots);
        if !bots.is_empty() {
            return Some(SkipReason::BotAlreadyVoted(bots));
        }
        if content.cashout_time.is_some_and(|t| t < now) {
            return Some(SkipReason::CashoutPassed);
        }
        if let Some(max_age) = self.rules.max_age_minutes {
            let age_minutes = content.created.elapsed_since(now) / 60;
            if age_minutes > max_age {
                return Some(SkipReason::TooOld { age_minutes });
            }
        }
        if content.max_accepted_payout.is_zero() {
            return Some(SkipReason::PayoutDeclined);
        }
        if voters.is_empty() {
            return Some(SkipReason::NoVotersLeft);
        }

        let flags = matching(content.downvoters(), &lists.flag_signals);
        if !flags.is_empty() {
            return Some(SkipReason::FlagSignal(flags));
        }
        let signals = matching(content.upvoters(), &lists.vote_signals);
        if !signals.is_empty() {
            return Some(SkipReason::VoteSignal(signals));
        }

        let ours: HashSet<String> = voters.iter().cloned().collect();
        let already = matching(content.voters(), &ours);
        if !already.is_empty() {
            return Some(SkipReason::AlreadyVoted(already));
        }

        None
    }
}
