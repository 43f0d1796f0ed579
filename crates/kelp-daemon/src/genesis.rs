// crates/kelp-daemon/src/genesis.rs
//
// Chain genesis document: account balances plus the registry module state.

use serde::{Deserialize, Serialize};
use std::fs;

use kelp_core::InMemoryBank;
use kelp_registry::GenesisState;

/// An initial account balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisBalance {
    pub address: String,
    pub amount: u64,
}

/// The full chain genesis document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChainGenesis {
    /// Chain identifier, logged at startup.
    #[serde(default)]
    pub chain_id: String,
    /// Initial spendable balances.
    #[serde(default)]
    pub balances: Vec<GenesisBalance>,
    /// Registry module genesis.
    #[serde(default)]
    pub registry: GenesisState,
}

impl ChainGenesis {
    /// Load a genesis document from a JSON file.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let genesis: ChainGenesis = serde_json::from_str(&contents)?;
        Ok(genesis)
    }

    /// Build the balance ledger seeded with the genesis balances.
    pub fn bank(&self) -> InMemoryBank {
        InMemoryBank::with_balances(
            self.balances
                .iter()
                .map(|b| (b.address.clone(), b.amount)),
        )
    }
}
