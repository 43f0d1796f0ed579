// crates/kelp-registry/src/pool.rs
//
// Pool membership bookkeeping: lowest staker/funder tracking and member
// removal.
//
// `pool.stakers` and `pool.funders` keep insertion order, and removal
// preserves the order of the remaining members. The lowest-entry scan uses
// strict `<`, so on ties the earliest-created entry wins and the result is
// stable across recomputation. Both lists are bounded by the max_stakers /
// max_funders params, which keeps the scan constant-time in practice.

use kelp_core::{Funder, Staker, UnbondingStaker};

use crate::state::RegistryState;

/// Recompute `pool.lowest_staker` from the current staker amounts.
pub(crate) fn update_lowest_staker(state: &mut RegistryState, pool_id: u64) {
    let Some(pool) = state.pools.get(&pool_id) else {
        return;
    };

    let mut min_amount = u64::MAX;
    let mut min_staker = String::new();
    for account in &pool.stakers {
        if let Some(staker) = state.stakers.get(&Staker::key(account, pool_id)) {
            if staker.amount < min_amount {
                min_amount = staker.amount;
                min_staker = staker.account.clone();
            }
        }
    }

    if let Some(pool) = state.pools.get_mut(&pool_id) {
        pool.lowest_staker = min_staker;
    }
}

/// Recompute `pool.lowest_funder` from the current funder amounts.
pub(crate) fn update_lowest_funder(state: &mut RegistryState, pool_id: u64) {
    let Some(pool) = state.pools.get(&pool_id) else {
        return;
    };

    let mut min_amount = u64::MAX;
    let mut min_funder = String::new();
    for account in &pool.funders {
        if let Some(funder) = state.funders.get(&Funder::key(account, pool_id)) {
            if funder.amount < min_amount {
                min_amount = funder.amount;
                min_funder = funder.account.clone();
            }
        }
    }

    if let Some(pool) = state.pools.get_mut(&pool_id) {
        pool.lowest_funder = min_funder;
    }
}

/// Remove a staker entry, its pool membership, and its share of
/// `total_stake`. Returns the removed entry's active amount.
///
/// Does not recompute the lowest staker; callers do that once their own
/// mutations are complete.
pub(crate) fn remove_staker(state: &mut RegistryState, pool_id: u64, account: &str) -> u64 {
    let Some(staker) = state.stakers.remove(&Staker::key(account, pool_id)) else {
        return 0;
    };

    if let Some(pool) = state.pools.get_mut(&pool_id) {
        pool.stakers.retain(|a| a != account);
        pool.total_stake = pool.total_stake.saturating_sub(staker.amount);
    }
    staker.amount
}

/// Remove a funder entry, its pool membership, and its share of
/// `total_funds`. Returns the removed entry's amount.
pub(crate) fn remove_funder(state: &mut RegistryState, pool_id: u64, account: &str) -> u64 {
    let Some(funder) = state.funders.remove(&Funder::key(account, pool_id)) else {
        return 0;
    };

    if let Some(pool) = state.pools.get_mut(&pool_id) {
        pool.funders.retain(|a| a != account);
        pool.total_funds = pool.total_funds.saturating_sub(funder.amount);
    }
    funder.amount
}

/// Drop the unbonding-staker record once nothing is left in transit.
pub(crate) fn prune_unbonding_staker(state: &mut RegistryState, pool_id: u64, staker: &str) {
    let key = UnbondingStaker::key(pool_id, staker);
    if let Some(entry) = state.unbonding_stakers.get(&key) {
        if entry.unbonding_amount == 0 {
            state.unbonding_stakers.remove(&key);
        }
    }
}
