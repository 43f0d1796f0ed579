// crates/kelp-daemon/src/main.rs
//
// Binary entrypoint for the Kelp Protocol daemon.
//
// Initializes tracing, parses CLI arguments, loads configuration and
// genesis, restores the latest state snapshot, and runs the block loop
// until interrupted. Each block runs end-of-block unbonding processing
// and persists a snapshot.

mod config;
mod genesis;
mod node;

use std::time::Duration;

use clap::Parser;

use config::DaemonConfig;
use genesis::ChainGenesis;
use kelp_store::RocksStore;
use node::ChainNode;

/// Kelp Protocol daemon — runs the storage-pool registry chain node.
#[derive(Parser, Debug)]
#[command(name = "kelpd", version = "0.1.0", about = "Kelp Protocol node daemon")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "~/.kelp/config.toml")]
    config: String,

    /// Override the genesis document path from the config file.
    #[arg(long)]
    genesis: Option<String>,

    /// Override the data directory from the config file.
    #[arg(long)]
    data_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration from TOML file, falling back to defaults if the
    // file is not found.
    let mut daemon_config = match DaemonConfig::load(&expand_tilde(&args.config)) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!(
                "Could not load config from {}: {}. Using defaults.",
                args.config, e
            );
            DaemonConfig::default()
        }
    };

    // CLI flags override config file values.
    if let Some(genesis) = args.genesis {
        daemon_config.genesis_path = genesis;
    }
    if let Some(data_dir) = args.data_dir {
        daemon_config.data_dir = data_dir;
    }

    // Initialize tracing subscriber for structured logging; RUST_LOG
    // overrides the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&daemon_config.log_level)),
        )
        .init();

    tracing::info!("Kelp Protocol Daemon v0.1.0");
    tracing::info!("Data directory: {}", daemon_config.data_dir);
    tracing::info!("Block time: {}s", daemon_config.block_time_secs);

    let data_dir = expand_tilde(&daemon_config.data_dir);
    let store = RocksStore::open(&format!("{}/rocksdb", data_dir))?;

    // The genesis document is only required for a fresh data directory.
    let genesis_path = expand_tilde(&daemon_config.genesis_path);
    let chain_genesis = match ChainGenesis::load(&genesis_path) {
        Ok(g) => g,
        Err(e) => {
            tracing::warn!(
                "Could not load genesis from {}: {}. Using an empty genesis.",
                genesis_path,
                e
            );
            ChainGenesis::default()
        }
    };

    let mut chain_node = ChainNode::bootstrap(&store, chain_genesis)?;
    tracing::info!(
        chain_id = chain_node.chain_id(),
        height = chain_node.height(),
        "node ready"
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("received shutdown signal");
                break;
            }
            _ = tokio::time::sleep(Duration::from_secs(daemon_config.block_time_secs)) => {
                let (ctx, events) = chain_node.advance_block();
                for event in &events {
                    tracing::info!(height = ctx.height, ?event, "event");
                }
                chain_node.persist(&store)?;
            }
        }
    }

    // Final save so nothing since the last block tick is lost.
    chain_node.persist(&store)?;
    tracing::info!("kelp daemon shut down gracefully");

    Ok(())
}

/// Expand `~` at the start of a path to the user's home directory.
fn expand_tilde(path: &str) -> String {
    if path.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}{}", home.display(), &path[1..]);
        }
    }
    path.to_string()
}
