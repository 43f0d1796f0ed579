// crates/kelp-registry/src/unbonding.rs
//
// Unbonding queue processing, invoked once per block from `end_block`.
//
// Both queues are FIFO and ordered by creation time, so processing stops
// at the first unmatured entry. Each release only touches its own account
// plus the pool aggregates it was derived from. Cost per block is O(t)
// with t the number of entries that matured in that block.

use kelp_core::{BankLedger, BlockContext, Staker, UnbondingStaker};

use crate::events::RegistryEvent;
use crate::pool;
use crate::registry::Registry;

impl<B: BankLedger> Registry<B> {
    /// Release matured staking unbonding entries.
    ///
    /// On release the entry's amount finally leaves `staker.amount` and
    /// `pool.total_stake` and returns to the staker's spendable balance.
    /// A staker whose whole remaining stake is released is removed from
    /// the pool. Entries whose staker was evicted in the meantime release
    /// nothing (the eviction already refunded the full stake).
    pub(crate) fn process_staking_unbonding_queue(&mut self, ctx: &BlockContext) {
        let unbonding_time = self.state.params.unbonding_staking_time;
        let now = ctx.unix_secs();

        loop {
            let due = match self.state.staking_queue.front() {
                Some(entry) => entry.creation_time + unbonding_time < now,
                None => false,
            };
            if !due {
                break;
            }
            let Some(entry) = self.state.staking_queue.pop_front() else {
                break;
            };

            let unbonding_key = UnbondingStaker::key(entry.pool_id, &entry.staker);
            if let Some(unbonding) = self.state.unbonding_stakers.get_mut(&unbonding_key) {
                unbonding.unbonding_amount =
                    unbonding.unbonding_amount.saturating_sub(entry.amount);
            }

            let staker_key = Staker::key(&entry.staker, entry.pool_id);
            if let Some(staker) = self.state.stakers.get(&staker_key).cloned() {
                let released = if entry.amount >= staker.amount {
                    // The release covers the whole remaining stake.
                    pool::remove_staker(&mut self.state, entry.pool_id, &entry.staker)
                } else {
                    if let Some(staker) = self.state.stakers.get_mut(&staker_key) {
                        staker.amount -= entry.amount;
                    }
                    if let Some(pool) = self.state.pools.get_mut(&entry.pool_id) {
                        pool.total_stake = pool.total_stake.saturating_sub(entry.amount);
                    }
                    entry.amount
                };

                pool::update_lowest_staker(&mut self.state, entry.pool_id);
                self.bank.credit(&entry.staker, released);

                tracing::debug!(
                    pool_id = entry.pool_id,
                    address = %entry.staker,
                    amount = released,
                    "stake released"
                );
                self.emit(RegistryEvent::UnstakePool {
                    pool_id: entry.pool_id,
                    address: entry.staker.clone(),
                    amount: released,
                });
            }

            pool::prune_unbonding_staker(&mut self.state, entry.pool_id, &entry.staker);
        }
    }

    /// Release matured delegation unbonding entries.
    ///
    /// The delegation ledger was already updated when the undelegation was
    /// requested; maturity only returns the principal to the delegator.
    pub(crate) fn process_delegation_unbonding_queue(&mut self, ctx: &BlockContext) {
        let unbonding_time = self.state.params.unbonding_delegation_time;
        let now = ctx.unix_secs();

        loop {
            let due = match self.state.delegation_queue.front() {
                Some(entry) => entry.creation_time + unbonding_time < now,
                None => false,
            };
            if !due {
                break;
            }
            let Some(entry) = self.state.delegation_queue.pop_front() else {
                break;
            };

            self.bank.credit(&entry.delegator, entry.amount);
            tracing::debug!(
                pool_id = entry.pool_id,
                address = %entry.delegator,
                amount = entry.amount,
                "delegation released"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::registry::Registry;
    use kelp_core::{BankLedger, BlockContext, InMemoryBank, Params, SPORE_PER_KELP};

    const UNBONDING_SECS: u64 = 60;

    fn ctx_at(secs: u64) -> BlockContext {
        BlockContext::new(1, chrono::DateTime::from_timestamp(secs as i64, 0).unwrap())
    }

    fn test_registry() -> Registry<InMemoryBank> {
        let params = Params {
            unbonding_staking_time: UNBONDING_SECS,
            unbonding_delegation_time: UNBONDING_SECS,
            ..Default::default()
        };
        let bank = InMemoryBank::with_balances([
            ("kelp1alice".to_string(), 1_000 * SPORE_PER_KELP),
            ("kelp1bob".to_string(), 1_000 * SPORE_PER_KELP),
        ]);
        let mut registry = Registry::new(params, bank).unwrap();
        registry.create_pool("moana", "@kelp/evm");
        registry
    }

    #[test]
    fn test_stake_release_after_unbonding_period() {
        let mut registry = test_registry();
        registry
            .stake_pool(&ctx_at(100), 0, "kelp1alice", 100 * SPORE_PER_KELP)
            .unwrap();
        registry
            .unstake_pool(&ctx_at(100), 0, "kelp1alice", 80 * SPORE_PER_KELP)
            .unwrap();

        // Not yet matured: nothing changes.
        registry.end_block(&ctx_at(100 + UNBONDING_SECS));
        assert_eq!(
            registry.state().pool(0).unwrap().total_stake,
            100 * SPORE_PER_KELP
        );
        assert_eq!(
            registry.bank().balance("kelp1alice"),
            900 * SPORE_PER_KELP
        );

        // Matured: stake and totals drop, balance returns.
        registry.end_block(&ctx_at(101 + UNBONDING_SECS));
        let pool = registry.state().pool(0).unwrap();
        assert_eq!(pool.total_stake, 20 * SPORE_PER_KELP);
        assert_eq!(pool.stakers, vec!["kelp1alice"]);
        assert_eq!(
            registry.state().staker("kelp1alice", 0).unwrap().amount,
            20 * SPORE_PER_KELP
        );
        assert_eq!(registry.state().unbonding_amount(0, "kelp1alice"), 0);
        assert_eq!(
            registry.bank().balance("kelp1alice"),
            980 * SPORE_PER_KELP
        );
    }

    #[test]
    fn test_full_unstake_removes_staker() {
        let mut registry = test_registry();
        registry
            .stake_pool(&ctx_at(100), 0, "kelp1alice", 100 * SPORE_PER_KELP)
            .unwrap();
        registry
            .unstake_pool(&ctx_at(100), 0, "kelp1alice", 80 * SPORE_PER_KELP)
            .unwrap();
        registry
            .unstake_pool(&ctx_at(110), 0, "kelp1alice", 20 * SPORE_PER_KELP)
            .unwrap();

        // Until maturity the staker stays listed with the full amount.
        let pool = registry.state().pool(0).unwrap();
        assert_eq!(pool.total_stake, 100 * SPORE_PER_KELP);
        assert_eq!(pool.lowest_staker, "kelp1alice");
        assert_eq!(
            registry.state().unbonding_amount(0, "kelp1alice"),
            100 * SPORE_PER_KELP
        );

        registry.end_block(&ctx_at(111 + UNBONDING_SECS));

        let pool = registry.state().pool(0).unwrap();
        assert_eq!(pool.total_stake, 0);
        assert!(pool.stakers.is_empty());
        assert_eq!(pool.lowest_staker, "");
        assert!(registry.state().staker("kelp1alice", 0).is_none());
        assert_eq!(registry.state().unbonding_amount(0, "kelp1alice"), 0);
        assert!(registry.state().unbonding_stakers.is_empty());
        assert_eq!(
            registry.bank().balance("kelp1alice"),
            1_000 * SPORE_PER_KELP
        );
    }

    #[test]
    fn test_unbonding_conservation() {
        let mut registry = test_registry();
        registry
            .stake_pool(&ctx_at(100), 0, "kelp1alice", 100 * SPORE_PER_KELP)
            .unwrap();
        registry
            .unstake_pool(&ctx_at(100), 0, "kelp1alice", 30 * SPORE_PER_KELP)
            .unwrap();
        registry
            .unstake_pool(&ctx_at(120), 0, "kelp1alice", 50 * SPORE_PER_KELP)
            .unwrap();

        let queued: u64 = registry
            .state()
            .staking_queue
            .entries
            .values()
            .filter(|e| e.staker == "kelp1alice")
            .map(|e| e.amount)
            .sum();
        assert_eq!(queued, registry.state().unbonding_amount(0, "kelp1alice"));

        // Release the first entry only; the invariant still holds.
        registry.end_block(&ctx_at(101 + UNBONDING_SECS));
        let queued: u64 = registry
            .state()
            .staking_queue
            .entries
            .values()
            .filter(|e| e.staker == "kelp1alice")
            .map(|e| e.amount)
            .sum();
        assert_eq!(queued, 50 * SPORE_PER_KELP);
        assert_eq!(queued, registry.state().unbonding_amount(0, "kelp1alice"));
    }

    #[test]
    fn test_delegation_release_credits_principal() {
        let mut registry = test_registry();
        registry
            .stake_pool(&ctx_at(100), 0, "kelp1alice", 100 * SPORE_PER_KELP)
            .unwrap();
        registry
            .delegate_pool(&ctx_at(100), 0, "kelp1alice", "kelp1bob", 100 * SPORE_PER_KELP)
            .unwrap();
        registry
            .undelegate_pool(&ctx_at(110), 0, "kelp1alice", "kelp1bob", 100 * SPORE_PER_KELP)
            .unwrap();

        assert_eq!(
            registry.bank().balance("kelp1bob"),
            900 * SPORE_PER_KELP
        );

        registry.end_block(&ctx_at(111 + UNBONDING_SECS));
        assert_eq!(
            registry.bank().balance("kelp1bob"),
            1_000 * SPORE_PER_KELP
        );
        assert!(registry.state().delegation_queue.is_empty());
    }

    #[test]
    fn test_matured_entries_survive_snapshot_restore() {
        let mut registry = test_registry();
        registry
            .stake_pool(&ctx_at(100), 0, "kelp1alice", 100 * SPORE_PER_KELP)
            .unwrap();
        registry
            .unstake_pool(&ctx_at(100), 0, "kelp1alice", 80 * SPORE_PER_KELP)
            .unwrap();

        // Simulate a restart between request and maturity.
        let snapshot = registry.snapshot().unwrap();
        let bank = registry.bank().clone();
        let mut restored = Registry::restore(&snapshot, bank).unwrap();

        assert_eq!(
            restored.state().unbonding_amount(0, "kelp1alice"),
            80 * SPORE_PER_KELP
        );

        restored.end_block(&ctx_at(101 + UNBONDING_SECS));
        assert_eq!(
            restored.bank().balance("kelp1alice"),
            980 * SPORE_PER_KELP
        );
    }
}
