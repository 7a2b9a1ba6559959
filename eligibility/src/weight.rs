//! Vote-weight policy.

use std::sync::Arc;

use vanguard_client::{LedgerClient, LedgerError};
use vanguard_types::{Amount, Transfer, VoteWeight};

use crate::{TransferHistory, WeightSetting};

/// Weight proportional to `amount / max`, full when `amount` is the largest
/// seen or nothing has been seen.
pub fn dynamic_weight(amount: &Amount, max: &Amount) -> VoteWeight {
    if max.is_zero() || amount.milli() >= max.milli() {
        return VoteWeight::FULL;
    }
    let hundredths = u128::from(amount.milli()) * u128::from(VoteWeight::FULL.hundredths())
        / u128::from(max.milli());
    VoteWeight::new(hundredths as u16)
}

pub struct WeightPolicy {
    setting: WeightSetting,
    history: Arc<TransferHistory>,
}

impl WeightPolicy {
    pub fn new(setting: WeightSetting, history: Arc<TransferHistory>) -> Self {
        Self { setting, history }
    }

    pub async fn weight_of(
        &self,
        transfer: &Transfer,
        client: &dyn LedgerClient,
    ) -> Result<VoteWeight, LedgerError> {
        match self.setting {
            WeightSetting::Fixed(weight) => Ok(weight),
            WeightSetting::Dynamic => {
                let max = self
                    .history
                    .max_transfer(client, &transfer.to, transfer.amount.asset())
                    .await?;
                Ok(dynamic_weight(&transfer.amount, &max))
            }
        }
    }
}
