//! Author reputation floor.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use vanguard_client::LedgerClient;
use vanguard_types::{ContentSnapshot, RandomSource};

use crate::{Rejection, ReputationSetting, Verdict};

/// Convert a raw ledger reputation into the familiar 25-based score.
pub fn to_reputation(raw: i64) -> f64 {
    if raw == 0 {
        return 25.0;
    }
    let level = ((raw.unsigned_abs() as f64).log10() - 9.0).max(0.0);
    let signed = if raw < 0 { -level } else { level };
    signed * 9.0 + 25.0
}

pub struct ReputationFloor {
    setting: Option<ReputationSetting>,
    random: Arc<dyn RandomSource>,
    /// Lowest raw trending reputation, once looked up.
    dynamic: Mutex<Option<i64>>,
}

impl ReputationFloor {
    pub fn new(setting: Option<ReputationSetting>, random: Arc<dyn RandomSource>) -> Self {
        Self {
            setting,
            random,
            dynamic: Mutex::new(None),
        }
    }

    /// Current floor as a score, `None` when no floor is configured.
    ///
    /// A failed trending lookup keeps the previous floor (or 0 raw).
    pub async fn floor(&self, client: &dyn LedgerClient) -> Option<f64> {
        match self.setting? {
            ReputationSetting::Fixed(score) => Some(score),
            ReputationSetting::Dynamic {
                limit,
                refresh_chance,
            } => {
                let mut cached = self.dynamic.lock().await;
                if cached.is_none() || self.random.chance(refresh_chance) {
                    match client.get_trending_reputations(limit).await {
                        Ok(reputations) => {
                            if let Some(min) = reputations.into_iter().min() {
                                let floor = format!("{:.3}", to_reputation(min));
                                info!(%floor, limit, "current minimum dynamic reputation");
                                *cached = Some(min);
                            }
                        }
                        Err(error) => warn!(%error, "trending reputation lookup failed"),
                    }
                }
                Some(to_reputation(cached.unwrap_or(0)))
            }
        }
    }

    pub async fn check(&self, content: &ContentSnapshot, client: &dyn LedgerClient) -> Verdict {
        let Some(floor) = self.floor(client).await else {
            return Verdict::Eligible;
        };
        let reputation = to_reputation(content.author_reputation);
        if reputation < floor {
            Verdict::Rejected(Rejection::LowReputation { reputation, floor })
        } else {
            Verdict::Eligible
        }
    }
}
