// crates/kelp-registry/src/genesis.rs
//
// Genesis import/export.
//
// The genesis document is the record-list form of the registry state, the
// shape a chain ships in its genesis file. Importing validates params and
// indexes every record under its composite key; exporting walks the maps
// back into lists.

use serde::{Deserialize, Serialize};

use kelp_core::{
    BankLedger, DelegationEntry, DelegationPoolData, DelegationUnbondingEntry, Delegator, Funder,
    KelpError, Params, Pool, Staker, StakingUnbondingEntry, UnbondingQueue, UnbondingStaker,
};

use crate::registry::Registry;
use crate::state::RegistryState;

/// Registry genesis document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenesisState {
    #[serde(default)]
    pub params: Params,
    #[serde(default)]
    pub pool_count: u64,
    #[serde(default)]
    pub pools: Vec<Pool>,
    #[serde(default)]
    pub stakers: Vec<Staker>,
    #[serde(default)]
    pub unbonding_stakers: Vec<UnbondingStaker>,
    #[serde(default)]
    pub funders: Vec<Funder>,
    #[serde(default)]
    pub delegators: Vec<Delegator>,
    #[serde(default)]
    pub delegation_pool_data: Vec<DelegationPoolData>,
    #[serde(default)]
    pub delegation_entries: Vec<DelegationEntry>,
    #[serde(default)]
    pub staking_queue: UnbondingQueue<StakingUnbondingEntry>,
    #[serde(default)]
    pub delegation_queue: UnbondingQueue<DelegationUnbondingEntry>,
}

impl<B: BankLedger> Registry<B> {
    /// Build a registry from a genesis document.
    ///
    /// # Errors
    /// Returns an error if the parameters do not validate.
    pub fn from_genesis(genesis: GenesisState, bank: B) -> Result<Self, KelpError> {
        genesis.params.validate()?;

        let mut state = RegistryState::new(genesis.params);
        state.pool_count = genesis.pool_count;

        for pool in genesis.pools {
            state.pools.insert(pool.id, pool);
        }
        for staker in genesis.stakers {
            state
                .stakers
                .insert(Staker::key(&staker.account, staker.pool_id), staker);
        }
        for unbonding in genesis.unbonding_stakers {
            state.unbonding_stakers.insert(
                UnbondingStaker::key(unbonding.pool_id, &unbonding.staker),
                unbonding,
            );
        }
        for funder in genesis.funders {
            state
                .funders
                .insert(Funder::key(&funder.account, funder.pool_id), funder);
        }
        for delegator in genesis.delegators {
            state.delegators.insert(
                Delegator::key(delegator.pool_id, &delegator.staker, &delegator.delegator),
                delegator,
            );
        }
        for data in genesis.delegation_pool_data {
            state
                .delegation_pool_data
                .insert(DelegationPoolData::key(data.pool_id, &data.staker), data);
        }
        for entry in genesis.delegation_entries {
            state.delegation_entries.insert(
                DelegationEntry::key(entry.pool_id, &entry.staker, entry.k_index),
                entry,
            );
        }
        state.staking_queue = genesis.staking_queue;
        state.delegation_queue = genesis.delegation_queue;

        Ok(Self {
            state,
            bank,
            events: Vec::new(),
        })
    }

    /// Export the current state as a genesis document.
    pub fn export_genesis(&self) -> GenesisState {
        GenesisState {
            params: self.state.params.clone(),
            pool_count: self.state.pool_count,
            pools: self.state.pools.values().cloned().collect(),
            stakers: self.state.stakers.values().cloned().collect(),
            unbonding_stakers: self.state.unbonding_stakers.values().cloned().collect(),
            funders: self.state.funders.values().cloned().collect(),
            delegators: self.state.delegators.values().cloned().collect(),
            delegation_pool_data: self
                .state
                .delegation_pool_data
                .values()
                .cloned()
                .collect(),
            delegation_entries: self.state.delegation_entries.values().cloned().collect(),
            staking_queue: self.state.staking_queue.clone(),
            delegation_queue: self.state.delegation_queue.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use kelp_core::{BlockContext, InMemoryBank, SPORE_PER_KELP};

    fn ctx() -> BlockContext {
        BlockContext::new(1, chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap())
    }

    #[test]
    fn test_genesis_with_seeded_pool() {
        let genesis = GenesisState {
            pool_count: 1,
            pools: vec![Pool::new(0, "moana", "@kelp/evm")],
            ..Default::default()
        };
        let bank =
            InMemoryBank::with_balances([("kelp1alice".to_string(), 100 * SPORE_PER_KELP)]);
        let mut registry = Registry::from_genesis(genesis, bank).unwrap();

        assert!(registry.state().pool(0).is_ok());
        registry
            .stake_pool(&ctx(), 0, "kelp1alice", 80 * SPORE_PER_KELP)
            .unwrap();
        assert_eq!(
            registry.state().pool(0).unwrap().total_stake,
            80 * SPORE_PER_KELP
        );
    }

    #[test]
    fn test_export_round_trip() {
        let genesis = GenesisState {
            pool_count: 1,
            pools: vec![Pool::new(0, "moana", "@kelp/evm")],
            ..Default::default()
        };
        let bank = InMemoryBank::with_balances([
            ("kelp1alice".to_string(), 1_000 * SPORE_PER_KELP),
            ("kelp1bob".to_string(), 1_000 * SPORE_PER_KELP),
        ]);
        let mut registry = Registry::from_genesis(genesis, bank).unwrap();
        registry
            .stake_pool(&ctx(), 0, "kelp1alice", 100 * SPORE_PER_KELP)
            .unwrap();
        registry
            .delegate_pool(&ctx(), 0, "kelp1alice", "kelp1bob", 50 * SPORE_PER_KELP)
            .unwrap();
        registry
            .unstake_pool(&ctx(), 0, "kelp1alice", 20 * SPORE_PER_KELP)
            .unwrap();

        let exported = registry.export_genesis();
        let reimported =
            Registry::from_genesis(exported, registry.bank().clone()).unwrap();
        assert_eq!(reimported.state(), registry.state());
    }

    #[test]
    fn test_invalid_genesis_params_rejected() {
        let genesis = GenesisState {
            params: Params {
                default_commission: "2.0".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(Registry::from_genesis(genesis, InMemoryBank::new()).is_err());
    }
}
