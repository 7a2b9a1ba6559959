//! First-stage check on an observed transfer.

use std::sync::Arc;

use vanguard_client::{LedgerClient, LedgerError};
use vanguard_types::{Amount, Transfer};

use crate::{Rejection, TransferHistory, Verdict, VotingRules};

pub struct TransferFilter {
    rules: Arc<VotingRules>,
    history: Arc<TransferHistory>,
}

impl TransferFilter {
    pub fn new(rules: Arc<VotingRules>, history: Arc<TransferHistory>) -> Self {
        Self { rules, history }
    }

    /// Configured min/max bounds, inclusive and asset-matched.
    pub fn within_bounds(&self, amount: &Amount) -> Verdict {
        if let Some(minimum) = &self.rules.min_transfer {
            if !amount.same_asset(minimum) {
                return Verdict::Rejected(Rejection::AssetMismatch {
                    expected: minimum.asset().to_string(),
                    actual: amount.asset().to_string(),
                });
            }
            if amount.milli() < minimum.milli() {
                return Verdict::Rejected(Rejection::BelowMinimum {
                    minimum: minimum.clone(),
                });
            }
        }
        if let Some(maximum) = &self.rules.max_transfer {
            if !amount.same_asset(maximum) {
                return Verdict::Rejected(Rejection::AssetMismatch {
                    expected: maximum.asset().to_string(),
                    actual: amount.asset().to_string(),
                });
            }
            if amount.milli() > maximum.milli() {
                return Verdict::Rejected(Rejection::AboveMaximum {
                    maximum: maximum.clone(),
                });
            }
        }
        Verdict::Eligible
    }

    /// Full candidate check. Only the above-average rule touches the ledger,
    /// so it runs last.
    pub async fn check(
        &self,
        transfer: &Transfer,
        client: &dyn LedgerClient,
    ) -> Result<Verdict, LedgerError> {
        if !self.rules.lists.bots.contains(&transfer.to) {
            return Ok(Verdict::Rejected(Rejection::NotMonitored {
                recipient: transfer.to.clone(),
            }));
        }

        let bounds = self.within_bounds(&transfer.amount);
        if !bounds.is_eligible() {
            return Ok(bounds);
        }

        if self.rules.only_above_average_transfers {
            let average = self
                .history
                .average_transfer(client, &transfer.to, transfer.amount.asset())
                .await?;
            if let Some(average) = average {
                if transfer.amount.milli() <= average.milli() {
                    return Ok(Verdict::Rejected(Rejection::BelowAverage { average }));
                }
            }
        }

        Ok(Verdict::Eligible)
    }
}
