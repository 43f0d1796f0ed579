// crates/kelp-daemon/src/node.rs
//
// Chain node: owns the registry and drives block progression.
//
// Each block advances the height, stamps the block time, runs end-of-block
// unbonding processing, and persists a snapshot. On startup the node
// restores the latest snapshot, falling back to the genesis document for a
// fresh data directory — that is what carries unmatured unbonding entries
// across restarts.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use kelp_core::{BlockContext, InMemoryBank, KelpError, StateStore};
use kelp_registry::{Registry, RegistryEvent, RegistryState};

use crate::genesis::ChainGenesis;

/// Everything the daemon persists per block.
#[derive(Debug, Serialize, Deserialize)]
struct ChainSnapshot {
    chain_id: String,
    height: u64,
    bank: InMemoryBank,
    registry: RegistryState,
}

/// A running chain node.
pub struct ChainNode {
    registry: Registry<InMemoryBank>,
    chain_id: String,
    height: u64,
}

impl ChainNode {
    /// Restore from the latest snapshot in `store`, or initialize from the
    /// genesis document if the store is empty.
    pub fn bootstrap(
        store: &dyn StateStore,
        genesis: ChainGenesis,
    ) -> Result<Self, KelpError> {
        if let Some(bytes) = store.load_state()? {
            let snapshot: ChainSnapshot = serde_json::from_slice(&bytes)?;
            let registry_bytes = serde_json::to_vec(&snapshot.registry)?;
            let registry = Registry::restore(&registry_bytes, snapshot.bank)?;
            tracing::info!(
                chain_id = %snapshot.chain_id,
                height = snapshot.height,
                "restored state snapshot"
            );
            return Ok(Self {
                registry,
                chain_id: snapshot.chain_id,
                height: snapshot.height,
            });
        }

        let chain_id = genesis.chain_id.clone();
        let bank = genesis.bank();
        let registry = Registry::from_genesis(genesis.registry, bank)?;
        tracing::info!(chain_id = %chain_id, "initialized from genesis");
        Ok(Self {
            registry,
            chain_id,
            height: 0,
        })
    }

    /// The current block height.
    pub fn height(&self) -> u64 {
        self.height
    }

    /// The chain identifier from genesis.
    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    /// Access the registry (transaction submission, queries).
    pub fn registry(&mut self) -> &mut Registry<InMemoryBank> {
        &mut self.registry
    }

    /// Produce the next block: advance the height, run end-of-block
    /// processing, and return the drained events.
    pub fn advance_block(&mut self) -> (BlockContext, Vec<RegistryEvent>) {
        self.height += 1;
        let ctx = BlockContext::new(self.height, Utc::now());
        self.registry.end_block(&ctx);
        let events = self.registry.take_events();
        tracing::trace!(height = self.height, events = events.len(), "block");
        (ctx, events)
    }

    /// Persist the current state to `store`.
    pub fn persist(&self, store: &dyn StateStore) -> Result<(), KelpError> {
        let snapshot = ChainSnapshot {
            chain_id: self.chain_id.clone(),
            height: self.height,
            bank: self.registry.bank().clone(),
            registry: self.registry.state().clone(),
        };
        store.save_state(&serde_json::to_vec(&snapshot)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genesis::GenesisBalance;
    use kelp_core::{BankLedger, Params, Pool, SPORE_PER_KELP};
    use kelp_registry::GenesisState;
    use kelp_store::MemoryStore;

    fn local_genesis() -> ChainGenesis {
        ChainGenesis {
            chain_id: "kelp-local-1".to_string(),
            balances: vec![GenesisBalance {
                address: "kelp1alice".to_string(),
                amount: 1_000 * SPORE_PER_KELP,
            }],
            registry: GenesisState {
                params: Params {
                    unbonding_staking_time: 60,
                    unbonding_delegation_time: 60,
                    ..Default::default()
                },
                pool_count: 1,
                pools: vec![Pool::new(0, "moana", "@kelp/evm")],
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_bootstrap_from_genesis() {
        let store = MemoryStore::new();
        let mut node = ChainNode::bootstrap(&store, local_genesis()).unwrap();
        assert_eq!(node.height(), 0);
        assert_eq!(node.chain_id(), "kelp-local-1");
        assert!(node.registry().state().pool(0).is_ok());
    }

    #[test]
    fn test_restart_resumes_unbonding() {
        let store = MemoryStore::new();
        let mut node = ChainNode::bootstrap(&store, local_genesis()).unwrap();

        let (ctx, _) = node.advance_block();
        node.registry()
            .stake_pool(&ctx, 0, "kelp1alice", 100 * SPORE_PER_KELP)
            .unwrap();
        node.registry()
            .unstake_pool(&ctx, 0, "kelp1alice", 80 * SPORE_PER_KELP)
            .unwrap();
        node.persist(&store).unwrap();

        // Restart: the pending unbonding entry is still there.
        let mut restarted = ChainNode::bootstrap(&store, local_genesis()).unwrap();
        assert_eq!(restarted.height(), 1);
        assert_eq!(
            restarted.registry().state().unbonding_amount(0, "kelp1alice"),
            80 * SPORE_PER_KELP
        );

        // A block past the unbonding period releases it.
        let future = BlockContext::new(
            2,
            Utc::now() + chrono::Duration::seconds(120),
        );
        restarted.registry().end_block(&future);
        let events = restarted.registry().take_events();
        assert!(!events.is_empty());
        assert_eq!(
            restarted.registry().bank().balance("kelp1alice"),
            980 * SPORE_PER_KELP
        );
    }
}
