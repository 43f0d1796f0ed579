// crates/kelp-registry/src/state.rs
//
// The registry's full ledger state.
//
// Everything lives in ordered maps with composite string keys (built by the
// record types in kelp-core) so iteration order is deterministic and the
// serialized snapshot is stable. The pool registry owns the aggregate
// totals; each ledger exclusively owns its own per-account records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use kelp_core::{
    DelegationEntry, DelegationPoolData, DelegationUnbondingEntry, Delegator, Funder, KelpError,
    Params, Pool, Staker, StakingUnbondingEntry, UnbondingQueue, UnbondingStaker,
};

/// Complete registry state. Serialized as the per-block snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryState {
    /// Module parameters.
    pub params: Params,
    /// Number of pools ever created; the next pool id.
    pub pool_count: u64,
    /// Pools by id.
    pub pools: BTreeMap<u64, Pool>,
    /// Stakers by `{account}/{pool_id}`.
    pub stakers: BTreeMap<String, Staker>,
    /// Unbonding stake totals by `{pool_id}/{staker}`.
    pub unbonding_stakers: BTreeMap<String, UnbondingStaker>,
    /// Funders by `{account}/{pool_id}`.
    pub funders: BTreeMap<String, Funder>,
    /// Delegators by `{pool_id}/{staker}/{delegator}`.
    pub delegators: BTreeMap<String, Delegator>,
    /// Delegation buckets by `{pool_id}/{staker}`.
    pub delegation_pool_data: BTreeMap<String, DelegationPoolData>,
    /// F1 index entries by `{pool_id}/{staker}/{k_index}`.
    pub delegation_entries: BTreeMap<String, DelegationEntry>,
    /// Pending stake releases, FIFO.
    pub staking_queue: UnbondingQueue<StakingUnbondingEntry>,
    /// Pending delegation releases, FIFO.
    pub delegation_queue: UnbondingQueue<DelegationUnbondingEntry>,
}

impl RegistryState {
    /// Create an empty state with the given parameters.
    pub fn new(params: Params) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    /// Look up a pool by id.
    ///
    /// # Errors
    /// Returns `KelpError::PoolNotFound` if the id is unknown.
    pub fn pool(&self, id: u64) -> Result<&Pool, KelpError> {
        self.pools.get(&id).ok_or(KelpError::PoolNotFound(id))
    }

    /// Look up a pool by id for mutation.
    pub fn pool_mut(&mut self, id: u64) -> Result<&mut Pool, KelpError> {
        self.pools.get_mut(&id).ok_or(KelpError::PoolNotFound(id))
    }

    /// Look up a staker entry.
    pub fn staker(&self, account: &str, pool_id: u64) -> Option<&Staker> {
        self.stakers.get(&Staker::key(account, pool_id))
    }

    /// A staker's amount currently in transit through the unbonding queue.
    pub fn unbonding_amount(&self, pool_id: u64, staker: &str) -> u64 {
        self.unbonding_stakers
            .get(&UnbondingStaker::key(pool_id, staker))
            .map(|u| u.unbonding_amount)
            .unwrap_or(0)
    }

    /// Look up a funder entry.
    pub fn funder(&self, account: &str, pool_id: u64) -> Option<&Funder> {
        self.funders.get(&Funder::key(account, pool_id))
    }

    /// Look up a delegator entry.
    pub fn delegator(&self, pool_id: u64, staker: &str, delegator: &str) -> Option<&Delegator> {
        self.delegators.get(&Delegator::key(pool_id, staker, delegator))
    }

    /// Look up the delegation bucket for a (pool, staker) pair.
    pub fn delegation_data(&self, pool_id: u64, staker: &str) -> Option<&DelegationPoolData> {
        self.delegation_pool_data
            .get(&DelegationPoolData::key(pool_id, staker))
    }
}
