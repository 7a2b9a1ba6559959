//! The node: wires rules, roster, power table, engine and loops together.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use vanguard_client::LedgerClient;
use vanguard_dispatch::{DispatchEngine, EngineParts};
use vanguard_power::{PowerThresholds, VotingPowerLedger};
use vanguard_roster::{DisabledVoterStore, RosterError};
use vanguard_types::{Clock, RandomSource};

use crate::{NodeConfig, NodeError, Pipeline, ReplayDriver, ShutdownController, StreamRunner};

/// External collaborators the node is built on.
pub struct Services {
    pub client: Arc<dyn LedgerClient>,
    pub clock: Arc<dyn Clock>,
    pub random: Arc<dyn RandomSource>,
    pub disabled: Arc<dyn DisabledVoterStore>,
}

pub struct Node {
    engine: Arc<DispatchEngine>,
    runner: StreamRunner,
    replay: ReplayDriver,
    shutdown: ShutdownController,
}

impl Node {
    pub fn new(config: &NodeConfig, services: Services) -> Result<Self, NodeError> {
        let rules = Arc::new(config.rules()?);
        let roster = Arc::new(config.roster()?);
        if roster.is_empty() {
            return Err(RosterError::Empty.into());
        }
        if rules.lists.bots.is_empty() {
            warn!("no bots configured, nothing will be voted on");
        }

        let Services {
            client,
            clock,
            random,
            disabled,
        } = services;

        let power = Arc::new(VotingPowerLedger::new(
            PowerThresholds {
                minimum: rules.min_voting_power,
                reserve: rules.reserve_voting_power,
            },
            Arc::clone(&clock),
        ));
        let engine = Arc::new(DispatchEngine::new(
            EngineParts {
                rules: Arc::clone(&rules),
                client: Arc::clone(&client),
                power: Arc::clone(&power),
                roster: Arc::clone(&roster),
                disabled: Arc::clone(&disabled),
                clock: Arc::clone(&clock),
                random: Arc::clone(&random),
            },
            config.dispatch.clone(),
        ));
        let pipeline = Arc::new(Pipeline::new(
            Arc::clone(&rules),
            Arc::clone(&client),
            random,
            Arc::clone(&engine),
        ));

        let mut bots: Vec<String> = rules.lists.bots.iter().cloned().collect();
        bots.sort();

        info!(
            voters = roster.len(),
            bots = bots.len(),
            "node initialized"
        );

        Ok(Self {
            runner: StreamRunner {
                client: Arc::clone(&client),
                pipeline: Arc::clone(&pipeline),
                engine: Arc::clone(&engine),
                power,
                roster,
                disabled,
                bots,
                reconnect_delay: Duration::from_secs(config.reconnect_delay_secs),
            },
            replay: ReplayDriver {
                client,
                pipeline,
                clock,
                batch_size: config.replay_batch_size,
                settle_delay: config.dispatch.settle_delay(),
            },
            engine,
            shutdown: ShutdownController::new(),
        })
    }

    pub fn engine(&self) -> &Arc<DispatchEngine> {
        &self.engine
    }

    pub fn replay_driver(&self) -> &ReplayDriver {
        &self.replay
    }

    pub fn shutdown_controller(&self) -> &ShutdownController {
        &self.shutdown
    }

    /// Optionally replay `replay_depth` blocks while following the live
    /// stream. Returns once shutdown is triggered.
    pub async fn run(&self, replay_depth: Option<u64>) {
        let mut replay_shutdown = self.shutdown.subscribe();
        let live_shutdown = self.shutdown.subscribe();

        let replay = async {
            let Some(depth) = replay_depth else {
                return;
            };
            tokio::select! {
                result = self.replay.replay(depth) => {
                    if let Err(error) = result {
                        warn!(%error, "replay aborted");
                    }
                }
                _ = replay_shutdown.recv() => {}
            }
        };

        tokio::join!(replay, self.runner.run(live_shutdown));
    }

    /// [`Node::run`] until SIGINT/SIGTERM.
    pub async fn run_until_signal(&self, replay_depth: Option<u64>) {
        tokio::join!(self.shutdown.wait_for_signal(), self.run(replay_depth));
        info!("node stopped");
    }
}
