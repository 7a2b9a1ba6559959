//! Observed transfer → vote task.

use std::sync::Arc;

use tracing::{debug, info};

use vanguard_client::{LedgerClient, LedgerError};
use vanguard_dispatch::{Dispatch, DispatchEngine, VoteJob, WaitOffset};
use vanguard_eligibility::{
    ContentFilter, Rejection, ReputationFloor, TransferFilter, TransferHistory, Verdict,
    VotingRules, WeightPolicy,
};
use vanguard_types::{RandomSource, Slug, Transfer};

/// What happened to one transfer.
#[derive(Debug)]
pub enum Outcome {
    Rejected(Rejection),
    Dispatched(Dispatch),
}

impl Outcome {
    pub fn is_spawned(&self) -> bool {
        matches!(self, Self::Dispatched(Dispatch::Spawned(_)))
    }
}

/// First-stage filters, weight selection and hand-off to the engine.
///
/// Shared by the live stream loop and the replay driver.
pub struct Pipeline {
    client: Arc<dyn LedgerClient>,
    transfers: TransferFilter,
    content: ContentFilter,
    reputation: ReputationFloor,
    weight: WeightPolicy,
    engine: Arc<DispatchEngine>,
}

impl Pipeline {
    pub fn new(
        rules: Arc<VotingRules>,
        client: Arc<dyn LedgerClient>,
        random: Arc<dyn RandomSource>,
        engine: Arc<DispatchEngine>,
    ) -> Self {
        let history = Arc::new(TransferHistory::new(
            rules.history_limit,
            rules.history_refresh_chance,
            Arc::clone(&random),
        ));
        Self {
            client,
            transfers: TransferFilter::new(Arc::clone(&rules), Arc::clone(&history)),
            content: ContentFilter::new(Arc::clone(&rules)),
            reputation: ReputationFloor::new(rules.min_reputation, random),
            weight: WeightPolicy::new(rules.vote_weight, history),
            engine,
        }
    }

    /// Run `transfer` through every first-stage check and dispatch it.
    ///
    /// Errors are ledger failures while looking something up, not
    /// rejections.
    pub async fn handle(
        &self,
        transfer: Transfer,
        offset: WaitOffset,
    ) -> Result<Outcome, LedgerError> {
        let client = self.client.as_ref();

        if let Verdict::Rejected(rejection) = self.transfers.check(&transfer, client).await? {
            match &rejection {
                Rejection::NotMonitored { .. } => debug!(to = %transfer.to, "{rejection}"),
                _ => info!(
                    from = %transfer.from,
                    to = %transfer.to,
                    "Skipped transfer of {}, {rejection}",
                    transfer.amount
                ),
            }
            return Ok(Outcome::Rejected(rejection));
        }

        let Some(slug) = Slug::from_memo(&transfer.memo) else {
            info!(
                from = %transfer.from,
                to = %transfer.to,
                memo = %transfer.memo,
                "Skipped, {}",
                Rejection::NoSlugInMemo
            );
            return Ok(Outcome::Rejected(Rejection::NoSlugInMemo));
        };

        let content = match client.get_content(&slug).await {
            Ok(content) => content,
            Err(LedgerError::NotFound(_)) => {
                return Ok(self.reject(&slug, Rejection::ContentNotFound));
            }
            Err(error) => return Err(error),
        };

        if let Verdict::Rejected(rejection) = self.content.may_vote(&content) {
            return Ok(self.reject(&slug, rejection));
        }
        if let Verdict::Rejected(rejection) = self.reputation.check(&content, client).await {
            return Ok(self.reject(&slug, rejection));
        }

        let weight = self.weight.weight_of(&transfer, client).await?;
        let job = VoteJob {
            content,
            transfer,
            weight,
            offset,
        };
        Ok(Outcome::Dispatched(self.engine.dispatch(job)))
    }

    fn reject(&self, slug: &Slug, rejection: Rejection) -> Outcome {
        info!(slug = %slug, "Skipped, {rejection}");
        Outcome::Rejected(rejection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vanguard_client::SubmitError;
    use vanguard_dispatch::{DispatchConfig, EngineParts};
    use vanguard_eligibility::{FilterLists, RulesConfig};
    use vanguard_nullables::{NullClock, NullDisabledVoterStore, NullLedger, NullRandom};
    use vanguard_power::{PowerThresholds, VotingPowerLedger};
    use vanguard_roster::VoterRoster;
    use vanguard_types::{ActiveVote, Amount, ContentSnapshot, Timestamp};

    const NOW: u64 = 1_600_000_000;

    struct Fixture {
        ledger: Arc<NullLedger>,
        engine: Arc<DispatchEngine>,
        pipeline: Pipeline,
    }

    fn fixture(tweak: impl FnOnce(&mut RulesConfig, &mut FilterLists)) -> Fixture {
        let mut config = RulesConfig {
            min_transfer: Some("1.000 STEEM".into()),
            max_transfer: Some("10.000 STEEM".into()),
            min_wait: 1,
            max_wait: 5,
            ..RulesConfig::default()
        };
        let mut lists = FilterLists {
            bots: ["bot1".to_string()].into(),
            ..FilterLists::default()
        };
        tweak(&mut config, &mut lists);
        let rules = Arc::new(VotingRules::from_config(&config, lists).unwrap());

        let ledger = Arc::new(NullLedger::new());
        let clock = Arc::new(NullClock::new(NOW));
        let random = Arc::new(NullRandom::new(0.5));
        let engine = Arc::new(DispatchEngine::new(
            EngineParts {
                rules: Arc::clone(&rules),
                client: ledger.clone(),
                power: Arc::new(VotingPowerLedger::new(
                    PowerThresholds::default(),
                    clock.clone(),
                )),
                roster: Arc::new(VoterRoster::parse(["v1 5Kone"]).unwrap()),
                disabled: Arc::new(NullDisabledVoterStore::new()),
                clock,
                random: random.clone(),
            },
            DispatchConfig::default(),
        ));
        let pipeline = Pipeline::new(rules, ledger.clone(), random, Arc::clone(&engine));
        Fixture {
            ledger,
            engine,
            pipeline,
        }
    }

    fn post() -> ContentSnapshot {
        ContentSnapshot {
            author: "alice".into(),
            permlink: "my-post".into(),
            parent_author: String::new(),
            parent_permlink: "life".into(),
            created: Timestamp::new(NOW - 60),
            cashout_time: Some(Timestamp::new(NOW + 86_400)),
            max_accepted_payout: Amount::from_milli(1_000_000_000, "SBD"),
            json_metadata: r#"{"tags":["life"],"app":"steemit/0.1"}"#.into(),
            author_reputation: 0,
            active_votes: Vec::new(),
        }
    }

    fn transfer(amount: &str, memo: &str) -> Transfer {
        Transfer {
            from: "alice".into(),
            to: "bot1".into(),
            amount: amount.parse().unwrap(),
            memo: memo.into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn eligible_transfer_is_dispatched() {
        let f = fixture(|_, _| {});
        f.ledger.set_content(post());

        let outcome = f
            .pipeline
            .handle(transfer("5.000 STEEM", "@alice/my-post"), WaitOffset::SinceCreated)
            .await
            .unwrap();
        assert!(outcome.is_spawned());
        assert!(f.engine.is_pending(&Slug::new("alice", "my-post")));

        let Outcome::Dispatched(Dispatch::Spawned(handle)) = outcome else {
            unreachable!()
        };
        let report = handle.await.unwrap();
        assert_eq!(report.votes_cast, 1);
        assert_eq!(f.ledger.submitted_votes()[0].voter, "v1");
    }

    #[tokio::test(start_paused = true)]
    async fn unmonitored_recipient_is_rejected_without_fetching() {
        let f = fixture(|_, _| {});
        let mut t = transfer("5.000 STEEM", "@alice/my-post");
        t.to = "someone".into();

        let outcome = f.pipeline.handle(t, WaitOffset::SinceCreated).await.unwrap();
        assert!(matches!(
            outcome,
            Outcome::Rejected(Rejection::NotMonitored { .. })
        ));
        assert!(f.ledger.content_fetches().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn out_of_bounds_amount_is_rejected() {
        let f = fixture(|_, _| {});
        let outcome = f
            .pipeline
            .handle(transfer("0.500 STEEM", "@alice/my-post"), WaitOffset::SinceCreated)
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            Outcome::Rejected(Rejection::BelowMinimum { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn memo_without_slug_is_rejected() {
        let f = fixture(|_, _| {});
        let outcome = f
            .pipeline
            .handle(transfer("5.000 STEEM", "thanks!"), WaitOffset::SinceCreated)
            .await
            .unwrap();
        assert!(matches!(outcome, Outcome::Rejected(Rejection::NoSlugInMemo)));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_content_is_rejected() {
        let f = fixture(|_, _| {});
        let outcome = f
            .pipeline
            .handle(transfer("5.000 STEEM", "@alice/gone"), WaitOffset::SinceCreated)
            .await
            .unwrap();
        assert!(matches!(outcome, Outcome::Rejected(Rejection::ContentNotFound)));
    }

    #[tokio::test(start_paused = true)]
    async fn transport_failure_propagates() {
        let f = fixture(|_, _| {});
        let slug = Slug::new("alice", "my-post");
        f.ledger
            .push_content_error(&slug, LedgerError::Transport("timeout".into()));

        let result = f
            .pipeline
            .handle(transfer("5.000 STEEM", "@alice/my-post"), WaitOffset::SinceCreated)
            .await;
        assert!(matches!(result, Err(LedgerError::Transport(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn content_the_bot_already_voted_is_rejected() {
        let f = fixture(|_, _| {});
        let mut content = post();
        content.active_votes.push(ActiveVote {
            voter: "bot1".into(),
            percent: 10_000,
        });
        f.ledger.set_content(content);

        let outcome = f
            .pipeline
            .handle(transfer("5.000 STEEM", "@alice/my-post"), WaitOffset::SinceCreated)
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            Outcome::Rejected(Rejection::BotAlreadyVoted(_))
        ));
        assert_eq!(f.engine.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn low_reputation_author_is_rejected() {
        let f = fixture(|config, _| {
            config.min_reputation = Some(vanguard_eligibility::ReputationValue::Number(50.0));
        });
        f.ledger.set_content(post());

        let outcome = f
            .pipeline
            .handle(transfer("5.000 STEEM", "@alice/my-post"), WaitOffset::SinceCreated)
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            Outcome::Rejected(Rejection::LowReputation { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn second_transfer_for_same_post_is_deduplicated() {
        let f = fixture(|_, _| {});
        f.ledger.set_content(post());

        let first = f
            .pipeline
            .handle(transfer("5.000 STEEM", "@alice/my-post"), WaitOffset::SinceCreated)
            .await
            .unwrap();
        let second = f
            .pipeline
            .handle(transfer("2.000 STEEM", "@alice/my-post"), WaitOffset::SinceCreated)
            .await
            .unwrap();
        assert!(first.is_spawned());
        assert!(matches!(
            second,
            Outcome::Dispatched(Dispatch::AlreadyPending)
        ));
        assert_eq!(f.engine.pending(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limited_voter_still_votes_once() {
        let f = fixture(|_, _| {});
        f.ledger.set_content(post());
        f.ledger.script_votes("v1", vec![Err(SubmitError::RateLimited)]);

        let Outcome::Dispatched(Dispatch::Spawned(handle)) = f
            .pipeline
            .handle(transfer("5.000 STEEM", "@alice/my-post"), WaitOffset::SinceCreated)
            .await
            .unwrap()
        else {
            panic!("expected a spawned task");
        };
        assert_eq!(handle.await.unwrap().votes_cast, 1);
        assert_eq!(f.ledger.submitted_votes().len(), 2);
    }
}
