//! Per-bot transfer history, cached and refreshed lazily.
//!
//! The first lookup for a bot fetches `limit` entries. Later lookups fetch
//! only the newest `limit / 10` and merge them in, except that with
//! probability `refresh_chance` the cache is discarded and rebuilt.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use vanguard_client::{LedgerClient, LedgerError};
use vanguard_types::{Amount, RandomSource, Transfer};

pub struct TransferHistory {
    limit: u32,
    refresh_chance: f64,
    random: Arc<dyn RandomSource>,
    cache: Mutex<HashMap<String, BTreeMap<u64, Option<Transfer>>>>,
}

impl TransferHistory {
    pub fn new(limit: u32, refresh_chance: f64, random: Arc<dyn RandomSource>) -> Self {
        Self {
            limit,
            refresh_chance,
            random,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Incoming payments to `bot` denominated in `asset`, oldest first.
    async fn incoming(
        &self,
        client: &dyn LedgerClient,
        bot: &str,
        asset: &str,
    ) -> Result<Vec<u64>, LedgerError> {
        // Never hold the lock across a fetch.
        let cached = {
            let mut cache = self.cache.lock().await;
            if self.random.chance(self.refresh_chance) {
                cache.remove(bot);
            }
            cache.contains_key(bot)
        };

        let limit = if cached { self.limit / 10 } else { self.limit };
        let fetched = if !cached || limit > 0 {
            client.get_account_history(bot, limit).await?
        } else {
            Vec::new()
        };
        if !cached {
            debug!(bot, entries = fetched.len(), "fetched transfer history");
        }

        let mut cache = self.cache.lock().await;
        let entries = cache.entry(bot.to_string()).or_default();
        entries.extend(fetched.into_iter().map(|e| (e.index, e.transfer)));
        while entries.len() > self.limit.max(1) as usize {
            entries.pop_first();
        }

        Ok(entries
            .values()
            .flatten()
            .filter(|t| t.to == bot && t.amount.asset() == asset)
            .map(|t| t.amount.milli())
            .collect())
    }

    /// Mean incoming payment to `bot` in `asset`, `None` without history.
    pub async fn average_transfer(
        &self,
        client: &dyn LedgerClient,
        bot: &str,
        asset: &str,
    ) -> Result<Option<Amount>, LedgerError> {
        let inputs = self.incoming(client, bot, asset).await?;
        let sum: u64 = inputs.iter().sum();
        if sum == 0 {
            return Ok(None);
        }
        Ok(Some(Amount::from_milli(sum / inputs.len() as u64, asset)))
    }

    /// Largest incoming payment to `bot` in `asset`, zero without history.
    pub async fn max_transfer(
        &self,
        client: &dyn LedgerClient,
        bot: &str,
        asset: &str,
    ) -> Result<Amount, LedgerError> {
        let inputs = self.incoming(client, bot, asset).await?;
        let max = inputs.into_iter().max().unwrap_or(0);
        Ok(Amount::from_milli(max, asset))
    }
}
