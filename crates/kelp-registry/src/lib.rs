// crates/kelp-registry/src/lib.rs
//
// kelp-registry: the storage-pool registry state machine for the Kelp
// Protocol — staking, delegation (F1 reward distribution), funding, and
// time-delayed unbonding.
//
// The registry executes inside a deterministic, single-threaded
// state-transition engine: the surrounding execution layer applies
// transactions strictly sequentially, and every mutating operation is
// atomic (fully applied or fully rejected). Read-only query accessors
// mirror the LCD surface.

mod delegation;
pub mod events;
mod f1;
mod funding;
pub mod genesis;
mod pool;
pub mod query;
pub mod registry;
mod staking;
pub mod state;
mod unbonding;

// Re-export key types for ergonomic access from downstream crates.
pub use events::{RegistryEvent, TxReceipt};
pub use genesis::GenesisState;
pub use query::{
    AccountAssetsResponse, AccountDelegationResponse, DelegationPoolDataResponse,
    DelegationUnbondingResponse, DelegatorResponse, DelegatorsByPoolAndStakerResponse,
    FunderResponse, PoolResponse, StakerResponse, StakingUnbondingResponse,
};
pub use registry::{Registry, MODULE_ACCOUNT};
pub use state::RegistryState;

#[cfg(test)]
mod tests {
    // Cross-ledger scenarios that exercise several operations against the
    // pool aggregate invariants.

    use crate::registry::Registry;
    use kelp_core::{BankLedger, BlockContext, InMemoryBank, Params, SPORE_PER_KELP};

    fn ctx_at(secs: u64) -> BlockContext {
        BlockContext::new(1, chrono::DateTime::from_timestamp(secs as i64, 0).unwrap())
    }

    /// total_stake, total_funds, and total_delegation must equal the sums
    /// of their ledger entries after every mutation.
    fn assert_pool_invariants(registry: &Registry<InMemoryBank>, pool_id: u64) {
        let state = registry.state();
        let pool = state.pool(pool_id).unwrap();

        let stake_sum: u64 = pool
            .stakers
            .iter()
            .filter_map(|account| state.staker(account, pool_id))
            .map(|s| s.amount)
            .sum();
        assert_eq!(pool.total_stake, stake_sum);

        let funds_sum: u64 = pool
            .funders
            .iter()
            .filter_map(|account| state.funder(account, pool_id))
            .map(|f| f.amount)
            .sum();
        assert_eq!(pool.total_funds, funds_sum);

        let delegation_sum: u64 = state
            .delegators
            .values()
            .filter(|d| d.pool_id == pool_id)
            .map(|d| d.delegation_amount)
            .sum();
        assert_eq!(pool.total_delegation, delegation_sum);

        // Lowest sentinels are empty iff the lists are empty.
        assert_eq!(pool.lowest_staker.is_empty(), pool.stakers.is_empty());
        assert_eq!(pool.lowest_funder.is_empty(), pool.funders.is_empty());
    }

    #[test]
    fn test_mixed_lifecycle_preserves_invariants() {
        let params = Params {
            unbonding_staking_time: 60,
            unbonding_delegation_time: 60,
            ..Default::default()
        };
        let bank = InMemoryBank::with_balances([
            ("kelp1alice".to_string(), 1_000 * SPORE_PER_KELP),
            ("kelp1bob".to_string(), 1_000 * SPORE_PER_KELP),
            ("kelp1charlie".to_string(), 1_000 * SPORE_PER_KELP),
        ]);
        let mut registry = Registry::new(params, bank).unwrap();
        registry.create_pool("moana", "@kelp/evm");

        registry
            .stake_pool(&ctx_at(100), 0, "kelp1alice", 200 * SPORE_PER_KELP)
            .unwrap();
        assert_pool_invariants(&registry, 0);

        registry
            .stake_pool(&ctx_at(101), 0, "kelp1bob", 100 * SPORE_PER_KELP)
            .unwrap();
        assert_pool_invariants(&registry, 0);

        registry
            .fund_pool(&ctx_at(102), 0, "kelp1charlie", 300 * SPORE_PER_KELP)
            .unwrap();
        assert_pool_invariants(&registry, 0);

        registry
            .delegate_pool(&ctx_at(103), 0, "kelp1alice", "kelp1charlie", 50 * SPORE_PER_KELP)
            .unwrap();
        assert_pool_invariants(&registry, 0);

        registry
            .unstake_pool(&ctx_at(104), 0, "kelp1bob", 40 * SPORE_PER_KELP)
            .unwrap();
        assert_pool_invariants(&registry, 0);

        registry
            .undelegate_pool(&ctx_at(105), 0, "kelp1alice", "kelp1charlie", 20 * SPORE_PER_KELP)
            .unwrap();
        assert_pool_invariants(&registry, 0);

        registry
            .defund_pool(&ctx_at(106), 0, "kelp1charlie", 100 * SPORE_PER_KELP)
            .unwrap();
        assert_pool_invariants(&registry, 0);

        // Releases keep the invariants too.
        registry.end_block(&ctx_at(200));
        assert_pool_invariants(&registry, 0);

        // Everything the ledgers released is spendable again.
        assert_eq!(
            registry.bank().balance("kelp1bob"),
            (900 + 40) * SPORE_PER_KELP
        );
        assert_eq!(
            registry.bank().balance("kelp1charlie"),
            (1_000 - 300 - 50 + 20 + 100) * SPORE_PER_KELP
        );
    }

    #[test]
    fn test_receipts_from_operation_results() {
        use crate::events::TxReceipt;

        let bank = InMemoryBank::with_balances([("kelp1alice".to_string(), 100)]);
        let mut registry = Registry::new(Params::default(), bank).unwrap();
        registry.create_pool("moana", "@kelp/evm");

        let ok = registry.stake_pool(&ctx_at(100), 0, "kelp1alice", 50);
        assert_eq!(TxReceipt::from_result(&ok), TxReceipt::ok());

        let err = registry.stake_pool(&ctx_at(100), 0, "kelp1alice", 51);
        let receipt = TxReceipt::from_result(&err);
        assert_ne!(receipt.code, 0);
        assert!(receipt.log.contains("insufficient funds"));
    }
}
