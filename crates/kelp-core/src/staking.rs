// crates/kelp-core/src/staking.rs
//
// Staker ledger records.
//
// A staker entry lives as long as either its active amount or its
// unbonding amount is nonzero:
//   absent -> active (amount > 0) -> unbonding (unbonding_amount > 0,
//   may coexist with active) -> absent (both zero)

use serde::{Deserialize, Serialize};

/// A protocol node's stake in a single pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staker {
    /// Address of the staking account.
    pub account: String,
    /// The pool being staked into.
    pub pool_id: u64,
    /// Active staked amount in spore. Unchanged while stake is unbonding;
    /// reduced only when an unbonding entry matures.
    pub amount: u64,
    /// Share of delegation rewards kept by the staker, as a decimal string.
    pub commission: String,
    /// Display name.
    #[serde(default)]
    pub moniker: String,
    /// Website URL.
    #[serde(default)]
    pub website: String,
    /// Logo URL.
    #[serde(default)]
    pub logo: String,
}

impl Staker {
    /// Composite store key: `{account}/{pool_id}`.
    pub fn key(account: &str, pool_id: u64) -> String {
        format!("{}/{}", account, pool_id)
    }
}

/// Stake currently in transit through the staking unbonding queue.
///
/// Tracked separately from the staker entry so a fully-unstaked staker can
/// be removed from the pool while their unmatured entries drain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbondingStaker {
    /// The pool the stake is leaving.
    pub pool_id: u64,
    /// Address of the staking account.
    pub staker: String,
    /// Total amount across this staker's unmatured unbonding entries.
    pub unbonding_amount: u64,
}

impl UnbondingStaker {
    /// Composite store key: `{pool_id}/{staker}`.
    pub fn key(pool_id: u64, staker: &str) -> String {
        format!("{}/{}", pool_id, staker)
    }
}

/// Status filter for staker list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StakerStatus {
    /// No filter.
    Unspecified,
    /// Stakers with a nonzero active amount.
    Active,
    /// Stakers whose entire stake is unbonding.
    Inactive,
}

impl StakerStatus {
    /// Whether a staker with the given amounts matches this filter.
    pub fn matches(&self, amount: u64, unbonding_amount: u64) -> bool {
        match self {
            StakerStatus::Unspecified => true,
            StakerStatus::Active => amount > 0,
            StakerStatus::Inactive => amount == 0 && unbonding_amount > 0,
        }
    }
}
