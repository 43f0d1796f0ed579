// crates/kelp-registry/src/staking.rs
//
// Staking ledger operations.
//
// Staked funds move into the module account and stay counted in
// `staker.amount` and `pool.total_stake` until their unbonding entry
// matures; `unstake_pool` only enqueues the release. A staker's free stake
// is therefore `amount - unbonding_amount`, and that is the per-request
// unstake cap.

use kelp_core::{BankLedger, BlockContext, KelpError, Staker, UnbondingStaker};

use crate::events::RegistryEvent;
use crate::pool;
use crate::registry::{Registry, MODULE_ACCOUNT};

impl<B: BankLedger> Registry<B> {
    /// Stake into a pool, creating or topping up the sender's entry.
    ///
    /// A new staker joining a full pool must outbid the current lowest
    /// staker, who is then refunded their active stake and removed.
    ///
    /// # Errors
    /// `PoolNotFound`, `StakeTooLow` (full pool, bid too low), or
    /// `InsufficientFunds`. Failures leave all state untouched.
    pub fn stake_pool(
        &mut self,
        _ctx: &BlockContext,
        pool_id: u64,
        account: &str,
        amount: u64,
    ) -> Result<(), KelpError> {
        let pool = self.state.pool(pool_id)?;
        let staker_exists = self.state.staker(account, pool_id).is_some();

        // A new staker joining a full pool must displace the lowest one.
        let mut evicted: Option<Staker> = None;
        if !staker_exists && pool.stakers.len() as u64 >= self.state.params.max_stakers {
            let lowest = self
                .state
                .staker(&pool.lowest_staker, pool_id)
                .cloned()
                .ok_or_else(|| {
                    KelpError::InvalidState(format!(
                        "pool {} is full but has no lowest staker",
                        pool_id
                    ))
                })?;

            if amount > lowest.amount {
                evicted = Some(lowest);
            } else {
                return Err(KelpError::StakeTooLow { min: lowest.amount });
            }
        }

        // Last failure point: everything after this mutates.
        self.bank.transfer(account, MODULE_ACCOUNT, amount)?;

        if let Some(lowest) = evicted {
            self.pay_out(&lowest.account, lowest.amount)?;
            pool::remove_staker(&mut self.state, pool_id, &lowest.account);
            tracing::info!(
                pool_id,
                address = %lowest.account,
                amount = lowest.amount,
                "evicted lowest staker"
            );
            self.emit(RegistryEvent::UnstakePool {
                pool_id,
                address: lowest.account,
                amount: lowest.amount,
            });
        }

        let key = Staker::key(account, pool_id);
        if let Some(staker) = self.state.stakers.get_mut(&key) {
            staker.amount += amount;
        } else {
            self.state.stakers.insert(
                key,
                Staker {
                    account: account.to_string(),
                    pool_id,
                    amount,
                    commission: self.state.params.default_commission.clone(),
                    ..Default::default()
                },
            );
            self.state.pool_mut(pool_id)?.stakers.push(account.to_string());
        }

        self.state.pool_mut(pool_id)?.total_stake += amount;
        pool::update_lowest_staker(&mut self.state, pool_id);

        tracing::debug!(pool_id, address = account, amount, "stake");
        self.emit(RegistryEvent::StakePool {
            pool_id,
            address: account.to_string(),
            amount,
        });
        Ok(())
    }

    /// Request withdrawal of staked funds.
    ///
    /// Moves `amount` into the unbonding queue; `staker.amount`,
    /// `pool.total_stake`, and balances stay unchanged until the entry
    /// matures in `end_block`.
    ///
    /// # Errors
    /// `PoolNotFound`, `NoStaker`, or `UnstakeTooHigh` when `amount`
    /// exceeds the stake not already unbonding.
    pub fn unstake_pool(
        &mut self,
        ctx: &BlockContext,
        pool_id: u64,
        account: &str,
        amount: u64,
    ) -> Result<(), KelpError> {
        self.state.pool(pool_id)?;

        let staked = self
            .state
            .staker(account, pool_id)
            .map(|s| s.amount)
            .ok_or(KelpError::NoStaker)?;
        let unbonding = self.state.unbonding_amount(pool_id, account);

        let max = staked.saturating_sub(unbonding);
        if amount > max {
            return Err(KelpError::UnstakeTooHigh { max });
        }

        let index = self.state.staking_queue.next_index();
        self.state.staking_queue.entries.insert(
            index,
            kelp_core::StakingUnbondingEntry {
                index,
                pool_id,
                staker: account.to_string(),
                amount,
                creation_time: ctx.unix_secs(),
            },
        );

        let entry = self
            .state
            .unbonding_stakers
            .entry(UnbondingStaker::key(pool_id, account))
            .or_insert_with(|| UnbondingStaker {
                pool_id,
                staker: account.to_string(),
                unbonding_amount: 0,
            });
        entry.unbonding_amount += amount;

        tracing::debug!(pool_id, address = account, amount, "unstake queued");
        Ok(())
    }

    /// Update a staker's commission and display metadata.
    ///
    /// # Errors
    /// `PoolNotFound`, `NoStaker`, or `InvalidCommission` when the
    /// commission is not a decimal in [0, 1].
    pub fn update_metadata(
        &mut self,
        _ctx: &BlockContext,
        pool_id: u64,
        account: &str,
        commission: &str,
        moniker: &str,
        website: &str,
        logo: &str,
    ) -> Result<(), KelpError> {
        self.state.pool(pool_id)?;

        if self.state.staker(account, pool_id).is_none() {
            return Err(KelpError::NoStaker);
        }

        kelp_core::params::validate_percentage(commission)
            .map_err(|_| KelpError::InvalidCommission(commission.to_string()))?;

        let key = Staker::key(account, pool_id);
        if let Some(staker) = self.state.stakers.get_mut(&key) {
            staker.commission = commission.to_string();
            staker.moniker = moniker.to_string();
            staker.website = website.to_string();
            staker.logo = logo.to_string();
        }

        self.emit(RegistryEvent::UpdateMetadata {
            pool_id,
            address: account.to_string(),
            commission: commission.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::registry::{Registry, MODULE_ACCOUNT};
    use kelp_core::{BankLedger, BlockContext, InMemoryBank, Params, SPORE_PER_KELP};

    fn ctx() -> BlockContext {
        BlockContext::new(1, chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap())
    }

    fn registry_with_pool(balances: &[(&str, u64)]) -> Registry<InMemoryBank> {
        let bank = InMemoryBank::with_balances(
            balances
                .iter()
                .map(|(account, amount)| (account.to_string(), *amount)),
        );
        let mut registry = Registry::new(Params::default(), bank).unwrap();
        registry.create_pool("moana", "@kelp/evm");
        registry.take_events();
        registry
    }

    #[test]
    fn test_stake_80_then_20_yields_single_entry_of_100() {
        let mut registry = registry_with_pool(&[("kelp1alice", 1_000 * SPORE_PER_KELP)]);

        registry
            .stake_pool(&ctx(), 0, "kelp1alice", 80 * SPORE_PER_KELP)
            .unwrap();
        registry
            .stake_pool(&ctx(), 0, "kelp1alice", 20 * SPORE_PER_KELP)
            .unwrap();

        let pool = registry.state().pool(0).unwrap();
        assert_eq!(pool.total_stake, 100 * SPORE_PER_KELP);
        assert_eq!(pool.stakers, vec!["kelp1alice"]);
        assert_eq!(pool.lowest_staker, "kelp1alice");

        let staker = registry.state().staker("kelp1alice", 0).unwrap();
        assert_eq!(staker.amount, 100 * SPORE_PER_KELP);
        assert_eq!(staker.commission, "0.9");

        assert_eq!(
            registry.bank().balance("kelp1alice"),
            900 * SPORE_PER_KELP
        );
        assert_eq!(
            registry.bank().balance(MODULE_ACCOUNT),
            100 * SPORE_PER_KELP
        );
    }

    #[test]
    fn test_stake_more_than_balance_is_rejected_without_mutation() {
        let mut registry = registry_with_pool(&[("kelp1alice", 100)]);

        let err = registry.stake_pool(&ctx(), 0, "kelp1alice", 101).unwrap_err();
        assert!(err.to_string().contains("insufficient funds"));

        let pool = registry.state().pool(0).unwrap();
        assert_eq!(pool.total_stake, 0);
        assert!(pool.stakers.is_empty());
        assert_eq!(pool.lowest_staker, "");
        assert!(registry.state().staker("kelp1alice", 0).is_none());
        assert_eq!(registry.bank().balance("kelp1alice"), 100);
    }

    #[test]
    fn test_stake_unknown_pool() {
        let mut registry = registry_with_pool(&[("kelp1alice", 100)]);
        let err = registry.stake_pool(&ctx(), 7, "kelp1alice", 10).unwrap_err();
        assert!(err.to_string().contains("pool with id 7 does not exist"));
    }

    #[test]
    fn test_multiple_stakers_lowest_tracking() {
        let mut registry = registry_with_pool(&[
            ("kelp1alice", 1_000 * SPORE_PER_KELP),
            ("kelp1bob", 1_000 * SPORE_PER_KELP),
            ("kelp1charlie", 1_000 * SPORE_PER_KELP),
        ]);

        registry
            .stake_pool(&ctx(), 0, "kelp1alice", 200 * SPORE_PER_KELP)
            .unwrap();
        registry
            .stake_pool(&ctx(), 0, "kelp1bob", 100 * SPORE_PER_KELP)
            .unwrap();
        registry
            .stake_pool(&ctx(), 0, "kelp1charlie", 300 * SPORE_PER_KELP)
            .unwrap();

        let pool = registry.state().pool(0).unwrap();
        assert_eq!(pool.total_stake, 600 * SPORE_PER_KELP);
        assert_eq!(pool.stakers.len(), 3);
        assert_eq!(pool.lowest_staker, "kelp1bob");
    }

    #[test]
    fn test_unstake_above_free_stake_is_rejected() {
        let mut registry = registry_with_pool(&[("kelp1alice", 1_000 * SPORE_PER_KELP)]);
        registry
            .stake_pool(&ctx(), 0, "kelp1alice", 100 * SPORE_PER_KELP)
            .unwrap();
        registry
            .unstake_pool(&ctx(), 0, "kelp1alice", 80 * SPORE_PER_KELP)
            .unwrap();

        // 80 of 100 is already unbonding, so only 20 is free.
        let err = registry
            .unstake_pool(&ctx(), 0, "kelp1alice", 50 * SPORE_PER_KELP)
            .unwrap_err();
        assert!(err.to_string().contains("maximum unstaking amount"));

        // Stake and totals unchanged.
        let staker = registry.state().staker("kelp1alice", 0).unwrap();
        assert_eq!(staker.amount, 100 * SPORE_PER_KELP);
        assert_eq!(
            registry.state().pool(0).unwrap().total_stake,
            100 * SPORE_PER_KELP
        );
        assert_eq!(
            registry.state().unbonding_amount(0, "kelp1alice"),
            80 * SPORE_PER_KELP
        );
    }

    #[test]
    fn test_unstake_keeps_total_stake_until_release() {
        let mut registry = registry_with_pool(&[("kelp1alice", 1_000 * SPORE_PER_KELP)]);
        registry
            .stake_pool(&ctx(), 0, "kelp1alice", 100 * SPORE_PER_KELP)
            .unwrap();

        let balance_before = registry.bank().balance("kelp1alice");
        registry
            .unstake_pool(&ctx(), 0, "kelp1alice", 80 * SPORE_PER_KELP)
            .unwrap();

        let pool = registry.state().pool(0).unwrap();
        assert_eq!(pool.total_stake, 100 * SPORE_PER_KELP);
        assert_eq!(pool.stakers.len(), 1);
        assert_eq!(pool.lowest_staker, "kelp1alice");
        assert_eq!(
            registry.state().unbonding_amount(0, "kelp1alice"),
            80 * SPORE_PER_KELP
        );
        assert_eq!(registry.bank().balance("kelp1alice"), balance_before);
    }

    #[test]
    fn test_unstake_without_stake() {
        let mut registry = registry_with_pool(&[("kelp1alice", 100)]);
        let err = registry.unstake_pool(&ctx(), 0, "kelp1alice", 10).unwrap_err();
        assert!(err.to_string().contains("sender is no staker"));
    }

    #[test]
    fn test_full_pool_eviction_refunds_lowest() {
        let params = Params {
            max_stakers: 2,
            ..Default::default()
        };
        let bank = InMemoryBank::with_balances([
            ("kelp1alice".to_string(), 1_000),
            ("kelp1bob".to_string(), 1_000),
            ("kelp1charlie".to_string(), 1_000),
        ]);
        let mut registry = Registry::new(params, bank).unwrap();
        registry.create_pool("moana", "@kelp/evm");

        registry.stake_pool(&ctx(), 0, "kelp1alice", 100).unwrap();
        registry.stake_pool(&ctx(), 0, "kelp1bob", 200).unwrap();

        // Charlie outbids alice, who is refunded in full.
        registry.stake_pool(&ctx(), 0, "kelp1charlie", 150).unwrap();

        let pool = registry.state().pool(0).unwrap();
        assert_eq!(pool.stakers, vec!["kelp1bob", "kelp1charlie"]);
        assert_eq!(pool.total_stake, 350);
        assert_eq!(pool.lowest_staker, "kelp1charlie");
        assert!(registry.state().staker("kelp1alice", 0).is_none());
        assert_eq!(registry.bank().balance("kelp1alice"), 1_000);
    }

    #[test]
    fn test_full_pool_low_bid_rejected() {
        let params = Params {
            max_stakers: 2,
            ..Default::default()
        };
        let bank = InMemoryBank::with_balances([
            ("kelp1alice".to_string(), 1_000),
            ("kelp1bob".to_string(), 1_000),
            ("kelp1charlie".to_string(), 1_000),
        ]);
        let mut registry = Registry::new(params, bank).unwrap();
        registry.create_pool("moana", "@kelp/evm");

        registry.stake_pool(&ctx(), 0, "kelp1alice", 100).unwrap();
        registry.stake_pool(&ctx(), 0, "kelp1bob", 200).unwrap();

        let err = registry
            .stake_pool(&ctx(), 0, "kelp1charlie", 100)
            .unwrap_err();
        assert!(err.to_string().contains("minimum staking amount"));

        let pool = registry.state().pool(0).unwrap();
        assert_eq!(pool.stakers, vec!["kelp1alice", "kelp1bob"]);
        assert_eq!(pool.total_stake, 300);
        assert_eq!(registry.bank().balance("kelp1charlie"), 1_000);
    }

    #[test]
    fn test_update_metadata() {
        let mut registry = registry_with_pool(&[("kelp1alice", 1_000)]);
        registry.stake_pool(&ctx(), 0, "kelp1alice", 100).unwrap();

        registry
            .update_metadata(&ctx(), 0, "kelp1alice", "0.5", "alice", "https://alice.example", "")
            .unwrap();

        let staker = registry.state().staker("kelp1alice", 0).unwrap();
        assert_eq!(staker.commission, "0.5");
        assert_eq!(staker.moniker, "alice");

        let err = registry
            .update_metadata(&ctx(), 0, "kelp1alice", "1.5", "", "", "")
            .unwrap_err();
        assert!(err.to_string().contains("invalid commission"));
    }
}
