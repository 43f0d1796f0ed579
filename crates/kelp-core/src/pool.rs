// crates/kelp-core/src/pool.rs
//
// Storage pool record and its aggregate totals.
//
// The pool owns the aggregate totals (total_stake, total_funds,
// total_delegation) and the insertion-ordered member lists, but not the
// per-account ledger entries: those belong to the staking, funding, and
// delegation ledgers, which are the sole writers of their aggregate field.

use serde::{Deserialize, Serialize};

/// A storage pool.
///
/// `stakers` and `funders` keep insertion order; removal preserves the
/// order of the remaining members so the lowest-entry tie break ("earliest
/// created wins") stays stable across recomputation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    /// Sequential pool id.
    pub id: u64,
    /// Human-readable pool name.
    pub name: String,
    /// Runtime the pool archives (e.g. "@kelp/evm").
    pub runtime: String,
    /// Paused pools accept no new members.
    #[serde(default)]
    pub paused: bool,
    /// Sum of all staker amounts, including stake that is still unbonding.
    pub total_stake: u64,
    /// Sum of all funder amounts.
    pub total_funds: u64,
    /// Sum of all delegator amounts across the pool's stakers.
    pub total_delegation: u64,
    /// Staker addresses in the order they first staked.
    pub stakers: Vec<String>,
    /// Address holding the minimum stake, or "" if there are no stakers.
    pub lowest_staker: String,
    /// Funder addresses in the order they first funded.
    pub funders: Vec<String>,
    /// Address holding the minimum funding amount, or "" if there are no funders.
    pub lowest_funder: String,
}

impl Pool {
    /// Create a new empty pool.
    pub fn new(id: u64, name: &str, runtime: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            runtime: runtime.to_string(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_pool_is_empty() {
        let pool = Pool::new(0, "moana", "@kelp/evm");
        assert_eq!(pool.id, 0);
        assert_eq!(pool.total_stake, 0);
        assert_eq!(pool.total_funds, 0);
        assert_eq!(pool.total_delegation, 0);
        assert!(pool.stakers.is_empty());
        assert_eq!(pool.lowest_staker, "");
        assert!(pool.funders.is_empty());
        assert_eq!(pool.lowest_funder, "");
        assert!(!pool.paused);
    }
}
