// crates/kelp-daemon/src/config.rs
//
// Runtime configuration for the Kelp Protocol daemon.
// Loaded from a TOML file or populated with sensible defaults.

use serde::Deserialize;
use std::fs;

/// Runtime configuration for the daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Directory for local data storage (RocksDB state snapshots).
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Path to the JSON genesis document used when no snapshot exists.
    #[serde(default = "default_genesis_path")]
    pub genesis_path: String,

    /// Seconds between blocks.
    #[serde(default = "default_block_time_secs")]
    pub block_time_secs: u64,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_data_dir() -> String {
    "~/.kelp/data".to_string()
}

fn default_genesis_path() -> String {
    "~/.kelp/genesis.json".to_string()
}

fn default_block_time_secs() -> u64 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            genesis_path: default_genesis_path(),
            block_time_secs: default_block_time_secs(),
            log_level: default_log_level(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: DaemonConfig = toml::from_str(&contents)?;
        Ok(config)
    }
}
