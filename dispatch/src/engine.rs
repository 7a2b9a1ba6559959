//! The per-post vote task and the engine that spawns it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use vanguard_client::{LedgerClient, LedgerError, SubmitError, VoteRequest};
use vanguard_eligibility::{ContentFilter, SkipReason, VotingRules};
use vanguard_power::VotingPowerLedger;
use vanguard_roster::{on_blocking_pool, DisabledVoterStore, VoterRoster};
use vanguard_types::{
    Clock, ContentSnapshot, RandomSource, Slug, Timestamp, Transfer, VoteWeight,
};

use vanguard_utils::format_duration;

use crate::{Backoff, DispatchConfig, TaskGuard, TaskRegistry};

/// What the initial wait is measured against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitOffset {
    /// Seconds since the content was created (live events).
    SinceCreated,
    /// A fixed number of seconds already elapsed (replayed events).
    Elapsed(u64),
}

/// Everything a task needs to know about one eligible event.
#[derive(Clone, Debug)]
pub struct VoteJob {
    pub content: ContentSnapshot,
    pub transfer: Transfer,
    pub weight: VoteWeight,
    pub offset: WaitOffset,
}

/// Result of handing a job to the engine.
#[derive(Debug)]
pub enum Dispatch {
    Spawned(JoinHandle<TaskReport>),
    /// A task for this slug is already live; the job was dropped.
    AlreadyPending,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TaskEnd {
    /// The pre-submission gate refused.
    Skipped(SkipReason),
    /// Every voter in the working set was tried.
    Exhausted,
    ZeroWeight,
    /// The content is too close to payout for anyone to vote.
    Lockout,
    /// The content could not be re-fetched.
    FetchFailed(LedgerError),
    /// The disabled-voter store could not be read.
    StoreUnavailable(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct TaskReport {
    pub slug: Slug,
    pub votes_cast: u32,
    pub end: TaskEnd,
}

/// Collaborators shared by every task.
pub struct EngineParts {
    pub rules: Arc<VotingRules>,
    pub client: Arc<dyn LedgerClient>,
    pub power: Arc<VotingPowerLedger>,
    pub roster: Arc<VoterRoster>,
    pub disabled: Arc<dyn DisabledVoterStore>,
    pub clock: Arc<dyn Clock>,
    pub random: Arc<dyn RandomSource>,
}

struct Shared {
    parts: EngineParts,
    filter: ContentFilter,
    config: DispatchConfig,
    voted_for_authors: Mutex<HashMap<String, Timestamp>>,
    last_pending: AtomicUsize,
}

/// Spawns and deduplicates vote tasks.
pub struct DispatchEngine {
    shared: Arc<Shared>,
    registry: TaskRegistry,
}

impl DispatchEngine {
    pub fn new(parts: EngineParts, config: DispatchConfig) -> Self {
        let filter = ContentFilter::new(Arc::clone(&parts.rules));
        Self {
            shared: Arc::new(Shared {
                parts,
                filter,
                config,
                voted_for_authors: Mutex::new(HashMap::new()),
                last_pending: AtomicUsize::new(0),
            }),
            registry: TaskRegistry::new(),
        }
    }

    /// Spawn a task for `job` unless its slug already has one.
    pub fn dispatch(&self, job: VoteJob) -> Dispatch {
        let slug = job.content.slug();
        let Some(guard) = self.registry.try_register(&slug) else {
            info!(slug = %slug, "Skipped, vote already pending");
            return Dispatch::AlreadyPending;
        };
        self.shared.log_pending(&self.registry);

        let shared = Arc::clone(&self.shared);
        let registry = self.registry.clone();
        Dispatch::Spawned(tokio::spawn(async move {
            let report = shared.run(job, &guard).await;
            drop(guard);
            shared.log_pending(&registry);
            report
        }))
    }

    /// Number of live tasks.
    pub fn pending(&self) -> usize {
        self.registry.len()
    }

    pub fn is_pending(&self, slug: &Slug) -> bool {
        self.registry.contains(slug)
    }

    /// When `author` last received a vote from any of our voters.
    pub async fn last_voted_for(&self, author: &str) -> Option<Timestamp> {
        self.shared.voted_for_authors.lock().await.get(author).copied()
    }

    /// Forget live tasks and power estimates after a stream reset.
    ///
    /// Tasks already running finish on their own; their slugs become free
    /// immediately.
    pub async fn reset(&self) {
        self.registry.clear();
        self.shared.last_pending.store(0, Ordering::Relaxed);
        self.shared.parts.power.clear().await;
    }
}

/// What the voter loop does after an attempt.
enum Next {
    /// Pick a voter at random from what is left.
    Continue,
    /// Try the same voter again.
    Retry,
    Stop(TaskEnd),
}

impl Shared {
    fn log_pending(&self, registry: &TaskRegistry) {
        let pending = registry.len();
        if self.last_pending.swap(pending, Ordering::Relaxed) != pending {
            info!(pending, "Pending votes: {pending}");
        }
    }

    async fn run(&self, job: VoteJob, guard: &TaskGuard) -> TaskReport {
        let slug = guard.slug().clone();
        let (votes_cast, end) = self.vote(job, &slug).await;
        match &end {
            TaskEnd::Skipped(reason) => info!(slug = %slug, "Skipped, {reason}"),
            TaskEnd::Exhausted => info!(slug = %slug, votes_cast, "Done voting ({votes_cast} cast)"),
            TaskEnd::ZeroWeight => info!(slug = %slug, "Skipped, vote weight is zero"),
            TaskEnd::Lockout => info!(slug = %slug, votes_cast, "Stopped, payout window reached"),
            TaskEnd::FetchFailed(error) => warn!(slug = %slug, %error, "content re-fetch failed"),
            TaskEnd::StoreUnavailable(error) => {
                error!(slug = %slug, %error, "disabled-voter store unavailable")
            }
        }
        TaskReport {
            slug,
            votes_cast,
            end,
        }
    }

    fn skip(&self, content: &ContentSnapshot, voters: &[String]) -> Option<SkipReason> {
        self.filter.skip(content, voters, self.parts.clock.now())
    }

    /// Working set: active roster minus anyone already on the content minus
    /// voters recharging for this weight.
    async fn working_set(
        &self,
        content: &ContentSnapshot,
        weight: VoteWeight,
    ) -> Result<Vec<String>, TaskEnd> {
        let roster = Arc::clone(&self.parts.roster);
        let store = Arc::clone(&self.parts.disabled);
        let active = on_blocking_pool(move || roster.active_voters(store.as_ref()))
            .await
            .map_err(|e| TaskEnd::StoreUnavailable(e.to_string()))?;
        let voters: Vec<String> = active
            .into_iter()
            .filter(|name| !content.has_voted(name))
            .collect();
        let recharging = self.parts.power.recharging(&voters, weight).await;
        Ok(voters
            .into_iter()
            .filter(|name| !recharging.contains(name))
            .collect())
    }

    async fn vote(&self, job: VoteJob, slug: &Slug) -> (u32, TaskEnd) {
        let VoteJob {
            mut content,
            transfer,
            weight,
            offset,
        } = job;

        let mut voters = match self.working_set(&content, weight).await {
            Ok(voters) => voters,
            Err(end) => return (0, end),
        };
        if let Some(reason) = self.skip(&content, &voters) {
            return (0, TaskEnd::Skipped(reason));
        }

        let elapsed = match offset {
            WaitOffset::SinceCreated => content.created.elapsed_since(self.parts.clock.now()),
            WaitOffset::Elapsed(secs) => secs,
        };
        let rules = &self.parts.rules;
        let target = self.parts.random.uniform(
            f64::from(rules.min_wait_minutes),
            f64::from(rules.max_wait_minutes),
        ) * 60.0;
        let wait = target - elapsed as f64;

        if wait > 0.0 {
            let wait = Duration::from_secs_f64(wait);
            info!(slug = %slug, "Waiting {} to vote", format_duration(wait));
            tokio::time::sleep(wait).await;
        } else {
            info!(slug = %slug, "Catching up to vote");
            tokio::time::sleep(self.config.settle_delay()).await;
        }

        content = match self.parts.client.get_content(slug).await {
            Ok(fresh) => fresh,
            Err(error) => return (0, TaskEnd::FetchFailed(error)),
        };
        if let Some(reason) = self.skip(&content, &voters) {
            return (0, TaskEnd::Skipped(reason));
        }

        self.voter_loop(&content, &transfer, weight, &mut voters, slug)
            .await
    }

    async fn voter_loop(
        &self,
        content: &ContentSnapshot,
        transfer: &Transfer,
        weight: VoteWeight,
        voters: &mut Vec<String>,
        slug: &Slug,
    ) -> (u32, TaskEnd) {
        let mut votes_cast = 0;
        let mut backoff = Backoff::new(self.config.backoff_start(), self.config.backoff_cap());
        let mut retries: HashMap<String, u32> = HashMap::new();
        let mut pinned: Option<String> = None;

        loop {
            if voters.is_empty() {
                return (votes_cast, TaskEnd::Exhausted);
            }
            if weight.is_zero() {
                return (votes_cast, TaskEnd::ZeroWeight);
            }

            let voter = match pinned.take() {
                Some(voter) => voter,
                None => voters[self.parts.random.index(voters.len())].clone(),
            };
            self.recharge_notice(&voter, slug).await;

            let Some(credential) = self.parts.roster.credential(&voter) else {
                warn!(slug = %slug, voter = %voter, "no credential for {voter}, skipping");
                voters.retain(|v| *v != voter);
                continue;
            };

            info!(
                slug = %slug,
                voter = %voter,
                "{voter} voting for {slug} (transferred {} to get {weight} upvote)",
                transfer.amount
            );
            let request = VoteRequest {
                voter: voter.clone(),
                author: content.author.clone(),
                permlink: content.permlink.clone(),
                weight,
            };

            let outcome = self.parts.client.submit_vote(credential, &request).await;
            let next = match outcome {
                Ok(receipt) => {
                    info!(
                        slug = %slug,
                        voter = %voter,
                        tx = receipt.transaction_id.as_deref().unwrap_or("-"),
                        "Success"
                    );
                    voters.retain(|v| *v != voter);
                    votes_cast += 1;
                    self.record_success(&content.author, &voter, slug).await;
                    Next::Continue
                }
                Err(error) => {
                    self.classify(error, &voter, voters, &mut retries, &mut backoff, slug)
                        .await
                }
            };

            match next {
                Next::Continue => {}
                Next::Retry => pinned = Some(voter),
                Next::Stop(end) => return (votes_cast, end),
            }
        }
    }

    /// Apply one failed submission to the working set.
    async fn classify(
        &self,
        error: SubmitError,
        voter: &str,
        voters: &mut Vec<String>,
        retries: &mut HashMap<String, u32>,
        backoff: &mut Backoff,
        slug: &Slug,
    ) -> Next {
        let retryable = matches!(error, SubmitError::RateLimited | SubmitError::Transient(_));
        if retryable {
            let attempts = retries.entry(voter.to_string()).or_insert(0);
            *attempts += 1;
            if *attempts > self.config.retry_ceiling {
                warn!(slug = %slug, voter, attempts = *attempts, "retry ceiling reached");
                return self.generic_failure(&error, voter, voters, backoff, slug).await;
            }
        }

        match error {
            SubmitError::DuplicateVote | SubmitError::WeightTooSmall => {
                info!(slug = %slug, voter, "\tFailed: {error}");
                voters.retain(|v| v != voter);
                Next::Continue
            }
            SubmitError::RateLimited => {
                info!(slug = %slug, voter, "\tRetrying: {error}");
                tokio::time::sleep(self.config.rate_limit_delay()).await;
                Next::Retry
            }
            SubmitError::MissingAuthority | SubmitError::InvalidCredential => {
                warn!(slug = %slug, voter, "\tFailed: {error} ({voter})");
                self.disable(voter, &error.to_string(), slug).await;
                voters.retain(|v| v != voter);
                Next::Continue
            }
            SubmitError::PayoutLockout => {
                info!(slug = %slug, voter, "\tFailed: {error}");
                Next::Stop(TaskEnd::Lockout)
            }
            SubmitError::Transient(kind) => {
                info!(slug = %slug, voter, "\tRetrying: {kind}");
                tokio::time::sleep(self.config.rate_limit_delay()).await;
                Next::Retry
            }
            SubmitError::Other(_) => self.generic_failure(&error, voter, voters, backoff, slug).await,
        }
    }

    async fn generic_failure(
        &self,
        error: &SubmitError,
        voter: &str,
        voters: &mut Vec<String>,
        backoff: &mut Backoff,
        slug: &Slug,
    ) -> Next {
        let delay = backoff.next_delay();
        warn!(
            slug = %slug,
            voter,
            "Pausing {:.1} :: Unable to vote with {voter}. {error}",
            delay.as_secs_f64()
        );
        voters.retain(|v| v != voter);
        tokio::time::sleep(delay).await;
        Next::Continue
    }

    async fn disable(&self, voter: &str, reason: &str, slug: &Slug) {
        let store = Arc::clone(&self.parts.disabled);
        let (name, reason) = (voter.to_string(), reason.to_string());
        if let Err(error) = on_blocking_pool(move || store.disable(&name, &reason)).await {
            error!(slug = %slug, voter, %error, "failed to persist disabled voter");
        }
    }

    async fn recharge_notice(&self, voter: &str, slug: &Slug) {
        let Some(power) = self.parts.power.power_of(voter).await else {
            return;
        };
        if power >= self.parts.power.thresholds().minimum {
            return;
        }
        if self.parts.roster.len() > 1 {
            info!(slug = %slug, voter, "Recharging {voter} vote power (currently too low: {power})");
        } else {
            info!(slug = %slug, voter, "Recharging vote power (currently too low: {power})");
        }
    }

    async fn record_success(&self, author: &str, voter: &str, slug: &Slug) {
        let now = self.parts.clock.now();
        self.voted_for_authors
            .lock()
            .await
            .insert(author.to_string(), now);

        let names = [voter.to_string()];
        if let Err(error) = self.parts.power.refresh(self.parts.client.as_ref(), &names).await {
            warn!(slug = %slug, voter, %error, "voting power refresh failed");
        }
    }
}
