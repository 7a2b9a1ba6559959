//! Nullable ledger: a scripted, in-memory [`LedgerClient`].
//!
//! Content snapshots, account power, history and blocks are seeded by the
//! test. Vote submissions are recorded and answered from per-voter scripts
//! (accepting by default). Transfer streams are replayed from scripts; once
//! the scripts run out, `stream_transfers` hands back a stream that stays
//! open until the test pushes into it or drops the ledger.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use vanguard_client::{
    AccountPower, LedgerClient, LedgerError, SubmitError, TransferStream, VoteReceipt,
    VoteRequest,
};
use vanguard_types::{Block, ContentSnapshot, Credential, HistoryEntry, Slug, Transfer};

const STREAM_CAPACITY: usize = 64;

#[derive(Default)]
pub struct NullLedger {
    contents: Mutex<HashMap<Slug, VecDeque<Result<ContentSnapshot, LedgerError>>>>,
    content_fetches: Mutex<Vec<Slug>>,
    accounts: Mutex<HashMap<String, AccountPower>>,
    power_fetches: Mutex<Vec<Vec<String>>>,
    history: Mutex<HashMap<String, Vec<HistoryEntry>>>,
    history_fetches: Mutex<Vec<(String, u32)>>,
    history_delays: Mutex<HashMap<String, Duration>>,
    vote_scripts: Mutex<HashMap<String, VecDeque<Result<VoteReceipt, SubmitError>>>>,
    submitted: Mutex<Vec<VoteRequest>>,
    blocks: Mutex<BTreeMap<u64, Block>>,
    last_irreversible: Mutex<u64>,
    trending: Mutex<Vec<i64>>,
    stream_scripts: Mutex<VecDeque<Vec<Result<Transfer, LedgerError>>>>,
    live_senders: Mutex<Vec<mpsc::Sender<Result<Transfer, LedgerError>>>>,
    stream_opens: Mutex<usize>,
}

impl NullLedger {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Seeding ─────────────────────────────────────────────────────────

    /// Make `snapshot` the answer for its slug, replacing anything queued.
    pub fn set_content(&self, snapshot: ContentSnapshot) {
        let mut contents = self.contents.lock().unwrap();
        contents.insert(snapshot.slug(), VecDeque::from([Ok(snapshot)]));
    }

    /// Queue a later version of a snapshot. Each fetch consumes the front
    /// entry; the last entry keeps being returned.
    pub fn push_content(&self, snapshot: ContentSnapshot) {
        let mut contents = self.contents.lock().unwrap();
        contents.entry(snapshot.slug()).or_default().push_back(Ok(snapshot));
    }

    /// Queue a failing fetch for `slug`.
    pub fn push_content_error(&self, slug: &Slug, error: LedgerError) {
        let mut contents = self.contents.lock().unwrap();
        contents.entry(slug.clone()).or_default().push_back(Err(error));
    }

    pub fn set_account_power(&self, account: AccountPower) {
        self.accounts
            .lock()
            .unwrap()
            .insert(account.name.clone(), account);
    }

    pub fn set_history(&self, name: &str, entries: Vec<HistoryEntry>) {
        self.history.lock().unwrap().insert(name.to_string(), entries);
    }

    /// Make every history fetch for `name` take `delay` to answer.
    pub fn delay_history(&self, name: &str, delay: Duration) {
        self.history_delays
            .lock()
            .unwrap()
            .insert(name.to_string(), delay);
    }

    /// Script the next outcomes for `voter`; unscripted submissions succeed.
    pub fn script_votes(
        &self,
        voter: &str,
        outcomes: impl IntoIterator<Item = Result<VoteReceipt, SubmitError>>,
    ) {
        self.vote_scripts
            .lock()
            .unwrap()
            .entry(voter.to_string())
            .or_default()
            .extend(outcomes);
    }

    pub fn add_block(&self, block: Block) {
        self.blocks.lock().unwrap().insert(block.number, block);
    }

    pub fn set_last_irreversible(&self, number: u64) {
        *self.last_irreversible.lock().unwrap() = number;
    }

    pub fn set_trending(&self, reputations: Vec<i64>) {
        *self.trending.lock().unwrap() = reputations;
    }

    /// Script one stream connection: its items are delivered and then the
    /// stream closes.
    pub fn script_stream(&self, items: Vec<Result<Transfer, LedgerError>>) {
        self.stream_scripts.lock().unwrap().push_back(items);
    }

    /// Push a transfer into every open unscripted stream.
    pub async fn push_transfer(&self, transfer: Transfer) {
        let senders: Vec<_> = self.live_senders.lock().unwrap().clone();
        for sender in senders {
            let _ = sender.send(Ok(transfer.clone())).await;
        }
    }

    // ── Inspection ──────────────────────────────────────────────────────

    pub fn submitted_votes(&self) -> Vec<VoteRequest> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn content_fetches(&self) -> Vec<Slug> {
        self.content_fetches.lock().unwrap().clone()
    }

    pub fn power_fetches(&self) -> Vec<Vec<String>> {
        self.power_fetches.lock().unwrap().clone()
    }

    pub fn history_fetches(&self) -> Vec<(String, u32)> {
        self.history_fetches.lock().unwrap().clone()
    }

    pub fn stream_opens(&self) -> usize {
        *self.stream_opens.lock().unwrap()
    }
}

#[async_trait]
impl LedgerClient for NullLedger {
    async fn stream_transfers(&self) -> Result<TransferStream, LedgerError> {
        *self.stream_opens.lock().unwrap() += 1;
        let (tx, rx) = mpsc::channel(STREAM_CAPACITY);

        let script = self.stream_scripts.lock().unwrap().pop_front();
        match script {
            Some(items) => {
                tokio::spawn(async move {
                    for item in items {
                        if tx.send(item).await.is_err() {
                            break;
                        }
                    }
                });
            }
            None => self.live_senders.lock().unwrap().push(tx),
        }
        Ok(rx)
    }

    async fn get_content(&self, slug: &Slug) -> Result<ContentSnapshot, LedgerError> {
        self.content_fetches.lock().unwrap().push(slug.clone());
        let mut contents = self.contents.lock().unwrap();
        let queue = contents
            .get_mut(slug)
            .ok_or_else(|| LedgerError::NotFound(slug.to_string()))?;
        let next = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        next.unwrap_or_else(|| Err(LedgerError::NotFound(slug.to_string())))
    }

    async fn get_accounts_power(&self, names: &[String]) -> Result<Vec<AccountPower>, LedgerError> {
        self.power_fetches.lock().unwrap().push(names.to_vec());
        let accounts = self.accounts.lock().unwrap();
        Ok(names
            .iter()
            .filter_map(|name| accounts.get(name).cloned())
            .collect())
    }

    async fn get_account_history(
        &self,
        name: &str,
        limit: u32,
    ) -> Result<Vec<HistoryEntry>, LedgerError> {
        self.history_fetches
            .lock()
            .unwrap()
            .push((name.to_string(), limit));
        let delay = self.history_delays.lock().unwrap().get(name).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let history = self.history.lock().unwrap();
        let entries = history.get(name).cloned().unwrap_or_default();
        let skip = entries.len().saturating_sub(limit as usize);
        Ok(entries.into_iter().skip(skip).collect())
    }

    async fn submit_vote(
        &self,
        _credential: &Credential,
        vote: &VoteRequest,
    ) -> Result<VoteReceipt, SubmitError> {
        self.submitted.lock().unwrap().push(vote.clone());
        self.vote_scripts
            .lock()
            .unwrap()
            .get_mut(&vote.voter)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(VoteReceipt::default()))
    }

    async fn last_irreversible_block(&self) -> Result<u64, LedgerError> {
        Ok(*self.last_irreversible.lock().unwrap())
    }

    async fn get_block_range(&self, low: u64, high: u64) -> Result<Vec<Block>, LedgerError> {
        if low > high {
            return Ok(Vec::new());
        }
        Ok(self
            .blocks
            .lock()
            .unwrap()
            .range(low..=high)
            .map(|(_, b)| b.clone())
            .collect())
    }

    async fn get_trending_reputations(&self, limit: u32) -> Result<Vec<i64>, LedgerError> {
        let trending = self.trending.lock().unwrap();
        Ok(trending.iter().take(limit as usize).copied().collect())
    }
}
