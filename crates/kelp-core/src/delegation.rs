// crates/kelp-core/src/delegation.rs
//
// Delegation ledger records and F1 distribution bookkeeping.
//
// Reward accounting follows the F1 fee-distribution scheme: the pool data
// for a (pool, staker) pair carries the rewards accrued since the last
// index advance, and each delegator remembers the index entry (`k_index`)
// current when they last (re)delegated or withdrew. A delegator's pending
// reward is (balance[latest] - balance[k_index]) * delegation_amount.

use serde::{Deserialize, Serialize};

use crate::dec::Dec;

/// A delegation from one account to a staker in a pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegator {
    /// The pool the staker operates in.
    pub pool_id: u64,
    /// The staker being delegated to.
    pub staker: String,
    /// Address of the delegating account.
    pub delegator: String,
    /// Delegated amount in spore.
    pub delegation_amount: u64,
    /// The F1 index entry current when this delegator last entered.
    pub k_index: u64,
}

impl Delegator {
    /// Composite store key: `{pool_id}/{staker}/{delegator}`.
    pub fn key(pool_id: u64, staker: &str, delegator: &str) -> String {
        format!("{}/{}/{}", pool_id, staker, delegator)
    }
}

/// Aggregate delegation data for a (pool, staker) pair.
///
/// Removed when the last delegator leaves; queries then report the
/// canonical zero state (all-zero strings, empty staker, flag false).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationPoolData {
    /// The pool the staker operates in.
    pub pool_id: u64,
    /// The staker whose delegation bucket this is.
    pub staker: String,
    /// Rewards accrued since the last index advance, in spore.
    pub current_rewards: u64,
    /// Sum of all delegator amounts for this staker.
    pub total_delegation: u64,
    /// Number of active delegators.
    pub delegator_count: u64,
    /// Index of the latest F1 entry.
    pub latest_index_k: u64,
    /// Whether the latest index advance originated from an undelegation.
    /// Flagged entries are deleted when the next entry supersedes them.
    pub latest_index_was_undelegation: bool,
}

impl DelegationPoolData {
    /// Composite store key: `{pool_id}/{staker}`.
    pub fn key(pool_id: u64, staker: &str) -> String {
        format!("{}/{}", pool_id, staker)
    }
}

/// A single F1 index entry: the cumulative reward-per-token balance at the
/// close of period `k_index`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationEntry {
    /// The pool the staker operates in.
    pub pool_id: u64,
    /// The staker whose delegation bucket this is.
    pub staker: String,
    /// Index of this entry.
    pub k_index: u64,
    /// Cumulative reward per delegated spore.
    pub balance: Dec,
}

impl DelegationEntry {
    /// Composite store key: `{pool_id}/{staker}/{k_index}`.
    pub fn key(pool_id: u64, staker: &str, k_index: u64) -> String {
        format!("{}/{}/{}", pool_id, staker, k_index)
    }
}
