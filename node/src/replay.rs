//! Replaying a historical block range through the live pipeline.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use vanguard_client::{LedgerClient, LedgerError};
use vanguard_dispatch::WaitOffset;
use vanguard_types::{Block, Clock};

use crate::Pipeline;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub blocks: u64,
    pub transfers: u64,
    pub dispatched: u64,
    /// Blocks or transfers that could not be processed.
    pub errors: u64,
}

pub struct ReplayDriver {
    pub(crate) client: Arc<dyn LedgerClient>,
    pub(crate) pipeline: Arc<Pipeline>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) batch_size: u64,
    pub(crate) settle_delay: Duration,
}

impl ReplayDriver {
    /// Replay the `depth` blocks up to and including the last irreversible
    /// block.
    ///
    /// Each transfer is dispatched with its block age as the elapsed time,
    /// so old events skip the initial wait.
    pub async fn replay(&self, depth: u64) -> Result<ReplayStats, LedgerError> {
        let head = self.client.last_irreversible_block().await?;
        let start = head.saturating_sub(depth);
        info!(start, head, "Replaying from block {start} to {head}");

        let batch = self.batch_size.max(1);
        let mut stats = ReplayStats::default();
        let mut low = start;
        loop {
            let high = low.saturating_add(batch - 1).min(head);
            match self.client.get_block_range(low, high).await {
                Ok(blocks) => {
                    for block in blocks {
                        self.replay_block(block, &mut stats).await;
                    }
                }
                Err(error) => {
                    warn!(%error, low, high, "failed to fetch blocks");
                    stats.errors += 1;
                }
            }
            if high >= head {
                break;
            }
            low = high + 1;
        }

        tokio::time::sleep(self.settle_delay).await;
        info!(
            blocks = stats.blocks,
            transfers = stats.transfers,
            dispatched = stats.dispatched,
            "Done replaying."
        );
        Ok(stats)
    }

    async fn replay_block(&self, block: Block, stats: &mut ReplayStats) {
        stats.blocks += 1;
        let elapsed = block.timestamp.elapsed_since(self.clock.now());
        for transfer in block.transfers {
            stats.transfers += 1;
            match self
                .pipeline
                .handle(transfer, WaitOffset::Elapsed(elapsed))
                .await
            {
                Ok(outcome) if outcome.is_spawned() => stats.dispatched += 1,
                Ok(_) => {}
                Err(error) => {
                    warn!(block = block.number, %error, "replayed transfer failed");
                    stats.errors += 1;
                }
            }
        }
    }
}
