//! The shared, synchronized power table.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use vanguard_client::{LedgerClient, LedgerError};
use vanguard_types::{Clock, VoteWeight, VotingPower};

use crate::project;

/// Configured power thresholds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PowerThresholds {
    /// Voters below this are left to recharge.
    pub minimum: VotingPower,
    /// How far below `minimum` a full-strength vote may dip.
    pub reserve: VotingPower,
}

impl PowerThresholds {
    /// Threshold that applies to a vote of the given weight.
    ///
    /// Full-strength votes may use reserve power; anything smaller may not.
    pub fn for_weight(&self, weight: VoteWeight) -> VotingPower {
        if weight.is_full() {
            self.minimum.saturating_sub(self.reserve)
        } else {
            self.minimum
        }
    }
}

/// Min/max/average over a set of accounts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PowerSummary {
    pub min: VotingPower,
    pub max: VotingPower,
    pub average: VotingPower,
    pub accounts: usize,
}

impl PowerSummary {
    fn over<'a>(values: impl IntoIterator<Item = &'a VotingPower>) -> Self {
        let values: Vec<u32> = values
            .into_iter()
            .map(|v| u32::from(v.hundredths()))
            .collect();
        if values.is_empty() {
            return Self::default();
        }
        let sum: u32 = values.iter().sum();
        let min = values.iter().copied().min().unwrap_or(0);
        let max = values.iter().copied().max().unwrap_or(0);
        Self {
            min: VotingPower::new(min as u16),
            max: VotingPower::new(max as u16),
            average: VotingPower::new((sum / values.len() as u32) as u16),
            accounts: values.len(),
        }
    }

    /// One-line operator summary.
    pub fn report(&self, thresholds: &PowerThresholds) -> String {
        let mut parts = Vec::new();
        if self.accounts > 1 {
            parts.push(format!("Average remaining voting power: {}", self.average));
            if self.max > thresholds.minimum {
                parts.push(format!("highest account: {}", self.max));
            }
        } else {
            parts.push(format!("Remaining voting power: {}", self.average));
        }
        parts.push(format!("recharging when below: {}", thresholds.minimum));
        if thresholds.reserve > VotingPower::ZERO {
            parts.push(format!("reserve voting power: {}", thresholds.reserve));
        }
        parts.join("; ")
    }
}

/// Per-account power estimates, refreshed by polling the ledger.
pub struct VotingPowerLedger {
    thresholds: PowerThresholds,
    clock: Arc<dyn Clock>,
    table: RwLock<HashMap<String, VotingPower>>,
    /// Makes each poll-and-apply atomic with respect to other polls.
    poll_lock: Mutex<()>,
}

impl VotingPowerLedger {
    pub fn new(thresholds: PowerThresholds, clock: Arc<dyn Clock>) -> Self {
        Self {
            thresholds,
            clock,
            table: RwLock::new(HashMap::new()),
            poll_lock: Mutex::new(()),
        }
    }

    pub fn thresholds(&self) -> &PowerThresholds {
        &self.thresholds
    }

    /// Poll authoritative power for `names`, project it to now, and store it.
    ///
    /// Returns a summary over the accounts the ledger reported.
    pub async fn refresh(
        &self,
        client: &dyn LedgerClient,
        names: &[String],
    ) -> Result<PowerSummary, LedgerError> {
        let _poll = self.poll_lock.lock().await;

        if names.is_empty() {
            return Ok(PowerSummary::default());
        }
        let accounts = client.get_accounts_power(names).await?;
        let now = self.clock.now();

        let mut projected = Vec::with_capacity(accounts.len());
        for account in &accounts {
            let elapsed = account.last_vote_time.elapsed_since(now);
            let projection = project(account.voting_power, elapsed);
            if projection.wasted > 0.0 {
                tracing::info!(
                    voter = %account.name,
                    "{} wasted voting power: {:.2} %",
                    account.name,
                    projection.wasted / 100.0
                );
            }
            projected.push((account.name.clone(), projection.current));
        }

        let mut table = self.table.write().await;
        for (name, power) in &projected {
            table.insert(name.clone(), *power);
        }
        Ok(PowerSummary::over(projected.iter().map(|(_, p)| p)))
    }

    /// Last refreshed estimate; not re-projected.
    pub async fn power_of(&self, name: &str) -> Option<VotingPower> {
        self.table.read().await.get(name).copied()
    }

    /// The subset of `voters` below the threshold for a vote of `weight`.
    ///
    /// Voters that have never been polled are not reported.
    pub async fn recharging(&self, voters: &[String], weight: VoteWeight) -> Vec<String> {
        let threshold = self.thresholds.for_weight(weight);
        let table = self.table.read().await;
        voters
            .iter()
            .filter(|v| table.get(v.as_str()).is_some_and(|p| *p < threshold))
            .cloned()
            .collect()
    }

    /// Forget every estimate.
    pub async fn clear(&self) {
        let _poll = self.poll_lock.lock().await;
        self.table.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vanguard_client::AccountPower;
    use vanguard_nullables::{NullClock, NullLedger};
    use vanguard_types::Timestamp;

    const NOW: u64 = 1_000_000;

    fn thresholds() -> PowerThresholds {
        PowerThresholds {
            minimum: VotingPower::new(8_000),
            reserve: VotingPower::new(500),
        }
    }

    fn account(name: &str, power: u16, secs_ago: u64) -> AccountPower {
        AccountPower {
            name: name.into(),
            voting_power: VotingPower::new(power),
            last_vote_time: Timestamp::new(NOW - secs_ago),
        }
    }

    fn setup(accounts: &[AccountPower]) -> (NullLedger, VotingPowerLedger) {
        let ledger = NullLedger::new();
        for a in accounts {
            ledger.set_account_power(a.clone());
        }
        let power = VotingPowerLedger::new(thresholds(), Arc::new(NullClock::new(NOW)));
        (ledger, power)
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn refresh_projects_and_summarizes() {
        let (ledger, power) = setup(&[
            account("alice", 7_000, 86_400),
            account("bob", 9_900, 86_400),
        ]);
        let summary = power.refresh(&ledger, &names(&["alice", "bob"])).await.unwrap();

        assert_eq!(power.power_of("alice").await, Some(VotingPower::new(9_000)));
        assert_eq!(power.power_of("bob").await, Some(VotingPower::FULL));
        assert_eq!(summary.min, VotingPower::new(9_000));
        assert_eq!(summary.max, VotingPower::FULL);
        assert_eq!(summary.average, VotingPower::new(9_500));
        assert_eq!(summary.accounts, 2);
    }

    #[tokio::test]
    async fn refresh_with_no_accounts_is_all_zero() {
        let (ledger, power) = setup(&[]);
        let summary = power.refresh(&ledger, &names(&["ghost"])).await.unwrap();
        assert_eq!(summary, PowerSummary::default());
        assert!(ledger.power_fetches().len() == 1);

        let summary = power.refresh(&ledger, &[]).await.unwrap();
        assert_eq!(summary, PowerSummary::default());
        assert_eq!(ledger.power_fetches().len(), 1);
    }

    #[tokio::test]
    async fn recharging_uses_plain_minimum_for_partial_votes() {
        let (ledger, power) = setup(&[
            account("alice", 7_800, 0),
            account("bob", 7_400, 0),
            account("carol", 8_100, 0),
        ]);
        let voters = names(&["alice", "bob", "carol"]);
        power.refresh(&ledger, &voters).await.unwrap();

        let recharging = power.recharging(&voters, VoteWeight::new(5_000)).await;
        assert_eq!(recharging, names(&["alice", "bob"]));
    }

    #[tokio::test]
    async fn recharging_uses_lowered_threshold_for_full_votes() {
        let (ledger, power) = setup(&[
            account("alice", 7_800, 0),
            account("bob", 7_400, 0),
            account("carol", 8_100, 0),
        ]);
        let voters = names(&["alice", "bob", "carol"]);
        power.refresh(&ledger, &voters).await.unwrap();

        // 8000 - 500 = 7500
        let recharging = power.recharging(&voters, VoteWeight::FULL).await;
        assert_eq!(recharging, names(&["bob"]));
    }

    #[tokio::test]
    async fn unpolled_voters_are_not_recharging() {
        let (_ledger, power) = setup(&[]);
        let recharging = power.recharging(&names(&["nobody"]), VoteWeight::FULL).await;
        assert!(recharging.is_empty());
    }

    #[tokio::test]
    async fn clear_forgets_estimates() {
        let (ledger, power) = setup(&[account("alice", 5_000, 0)]);
        power.refresh(&ledger, &names(&["alice"])).await.unwrap();
        power.clear().await;
        assert_eq!(power.power_of("alice").await, None);
        assert!(power.recharging(&names(&["alice"]), VoteWeight::FULL).await.is_empty());
    }

    #[test]
    fn report_mentions_reserve_and_highest_account() {
        let summary = PowerSummary {
            min: VotingPower::new(7_000),
            max: VotingPower::new(9_000),
            average: VotingPower::new(8_000),
            accounts: 2,
        };
        let line = summary.report(&thresholds());
        assert_eq!(
            line,
            "Average remaining voting power: 80.000 %; highest account: 90.000 %; \
             recharging when below: 80.000 %; reserve voting power: 5.000 %"
        );
    }

    #[test]
    fn report_for_single_account() {
        let summary = PowerSummary {
            min: VotingPower::new(9_000),
            max: VotingPower::new(9_000),
            average: VotingPower::new(9_000),
            accounts: 1,
        };
        let thresholds = PowerThresholds {
            minimum: VotingPower::new(8_000),
            reserve: VotingPower::ZERO,
        };
        assert_eq!(
            summary.report(&thresholds),
            "Remaining voting power: 90.000 %; recharging when below: 80.000 %"
        );
    }
}
