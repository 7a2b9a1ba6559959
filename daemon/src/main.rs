//! Vanguard daemon: front-runs pay-for-vote accounts with a roster of voters.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use vanguard_node::{Node, NodeConfig, Services};
use vanguard_roster::FileDisabledVoterStore;
use vanguard_rpc::RpcClient;
use vanguard_types::{SystemClock, ThreadRandom};

#[derive(Parser)]
#[command(name = "vanguard-daemon", about = "Front-running vote dispatcher")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "vanguard.toml", env = "VANGUARD_CONFIG")]
    config: PathBuf,

    /// Replay this many blocks behind the last irreversible block before
    /// following the live stream.
    #[arg(long, env = "VANGUARD_REPLAY")]
    replay: Option<u64>,

    /// Log level: "trace", "debug", "info", "warn", "error". Overrides the
    /// config file.
    #[arg(long, env = "VANGUARD_LOG_LEVEL")]
    log_level: Option<String>,

    /// Legacy form of `--replay`: `replay:<blocks>`.
    #[arg(value_parser = parse_replay_arg)]
    legacy_replay: Option<u64>,
}

fn parse_replay_arg(raw: &str) -> Result<u64, String> {
    let depth = raw
        .strip_prefix("replay:")
        .ok_or_else(|| format!("expected replay:<blocks>, got {raw:?}"))?;
    depth
        .trim()
        .parse()
        .map_err(|e| format!("invalid replay depth {depth:?}: {e}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = NodeConfig::from_toml_file(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    vanguard_utils::init_logging(config.log_format, level);
    tracing::info!("Loaded config from {}", cli.config.display());

    let client = RpcClient::new(&config.rpc).context("building ledger client")?;
    let services = Services {
        client: Arc::new(client),
        clock: Arc::new(SystemClock),
        random: Arc::new(ThreadRandom),
        disabled: Arc::new(FileDisabledVoterStore::new(&config.disabled_voters_path)),
    };
    let node = Node::new(&config, services).context("starting node")?;

    let replay = cli.replay.or(cli.legacy_replay);
    match replay {
        Some(depth) => tracing::info!(depth, "replaying {depth} blocks before going live"),
        None => tracing::info!("live streaming only"),
    }
    node.run_until_signal(replay).await;

    tracing::info!("Vanguard daemon exited cleanly");
    Ok(())
}
