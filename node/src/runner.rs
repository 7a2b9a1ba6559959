//! The live transfer loop.
//!
//! A session opens the transfer stream and feeds every transfer through the
//! [`Pipeline`]. Any connectivity failure ends the session: the engine drops
//! its transient state and a new session starts after the reconnect delay.
//! Only a shutdown signal ends the loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{info, warn};

use vanguard_client::{LedgerClient, LedgerError};
use vanguard_dispatch::{DispatchEngine, WaitOffset};
use vanguard_power::VotingPowerLedger;
use vanguard_roster::{on_blocking_pool, DisabledVoterStore, VoterRoster};
use vanguard_utils::format_duration;

use crate::Pipeline;

enum SessionEnd {
    Shutdown,
    Failed(LedgerError),
}

pub struct StreamRunner {
    pub(crate) client: Arc<dyn LedgerClient>,
    pub(crate) pipeline: Arc<Pipeline>,
    pub(crate) engine: Arc<DispatchEngine>,
    pub(crate) power: Arc<VotingPowerLedger>,
    pub(crate) roster: Arc<VoterRoster>,
    pub(crate) disabled: Arc<dyn DisabledVoterStore>,
    pub(crate) bots: Vec<String>,
    pub(crate) reconnect_delay: Duration,
}

impl StreamRunner {
    /// Follow the chain until `shutdown` fires.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) {
        loop {
            match self.session(&mut shutdown).await {
                SessionEnd::Shutdown => {
                    info!("transfer stream stopped");
                    return;
                }
                SessionEnd::Failed(error) => {
                    warn!(
                        %error,
                        "Unable to stream on current RPC node. Retrying in {}",
                        format_duration(self.reconnect_delay)
                    );
                    self.engine.reset().await;
                    tokio::select! {
                        biased;
                        _ = shutdown.recv() => return,
                        _ = tokio::time::sleep(self.reconnect_delay) => {}
                    }
                }
            }
        }
    }

    async fn session(&self, shutdown: &mut broadcast::Receiver<()>) -> SessionEnd {
        if let Err(error) = self.report_power().await {
            return SessionEnd::Failed(error);
        }
        info!(
            "Now watching for new transfers to: {}",
            self.bots.join(", ")
        );

        let mut stream = match self.client.stream_transfers().await {
            Ok(stream) => stream,
            Err(error) => return SessionEnd::Failed(error),
        };

        loop {
            let item = tokio::select! {
                biased;
                _ = shutdown.recv() => return SessionEnd::Shutdown,
                item = stream.recv() => item,
            };
            let transfer = match item {
                Some(Ok(transfer)) => transfer,
                Some(Err(error)) => return SessionEnd::Failed(error),
                None => return SessionEnd::Failed(LedgerError::StreamClosed),
            };

            match self.pipeline.handle(transfer, WaitOffset::SinceCreated).await {
                Ok(outcome) if outcome.is_spawned() => {
                    if let Err(error) = self.report_power().await {
                        return SessionEnd::Failed(error);
                    }
                }
                Ok(_) => {}
                Err(error) => return SessionEnd::Failed(error),
            }
        }
    }

    /// Re-poll the active voters and log where their power stands.
    async fn report_power(&self) -> Result<(), LedgerError> {
        let roster = Arc::clone(&self.roster);
        let store = Arc::clone(&self.disabled);
        let active = match on_blocking_pool(move || roster.active_voters(store.as_ref())).await {
            Ok(active) => active,
            Err(error) => {
                warn!(%error, "disabled-voter store unavailable");
                self.roster.names().map(str::to_string).collect()
            }
        };
        let summary = self.power.refresh(self.client.as_ref(), &active).await?;
        let thresholds = self.power.thresholds();
        info!("{}", summary.report(thresholds));

        if summary.accounts > 0 && summary.max < thresholds.minimum {
            let disabled = self.roster.len().saturating_sub(active.len());
            if disabled > 0 {
                info!(disabled, "Recharging vote power ({disabled} disabled voters)");
            } else {
                info!("Recharging vote power");
            }
        }
        Ok(())
    }
}
