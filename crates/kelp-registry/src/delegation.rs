// crates/kelp-registry/src/delegation.rs
//
// Delegation ledger operations.
//
// Delegated funds are held by the module account. Rewards settle through
// the F1 index (see f1.rs) and are credited immediately on withdraw;
// undelegated principal travels through the delegation unbonding queue and
// is credited only at maturity.

use kelp_core::{BankLedger, BlockContext, DelegationPoolData, KelpError};

use crate::events::RegistryEvent;
use crate::f1::F1Distribution;
use crate::registry::{Registry, MODULE_ACCOUNT};

impl<B: BankLedger> Registry<B> {
    /// Delegate to a staker in a pool.
    ///
    /// An existing delegator first settles pending rewards (credited to
    /// their balance), then their previous delegation and the new amount
    /// fold into a fresh F1 entry.
    ///
    /// # Errors
    /// `PoolNotFound`, `SelfDelegation` (checked before any balance
    /// access), `NoStaker`, or `InsufficientFunds`. Failures leave all
    /// state untouched.
    pub fn delegate_pool(
        &mut self,
        _ctx: &BlockContext,
        pool_id: u64,
        staker: &str,
        delegator: &str,
        amount: u64,
    ) -> Result<(), KelpError> {
        self.state.pool(pool_id)?;

        if delegator == staker {
            return Err(KelpError::SelfDelegation);
        }
        if self.state.staker(staker, pool_id).is_none() {
            return Err(KelpError::NoStaker);
        }

        let already_delegator = self.state.delegator(pool_id, staker, delegator).is_some();

        // Last failure point: everything after this mutates.
        self.bank.transfer(delegator, MODULE_ACCOUNT, amount)?;

        if already_delegator {
            let mut f1 = F1Distribution::new(&mut self.state, pool_id, staker, delegator);
            let reward = f1.withdraw()?;
            let previous = f1.undelegate()?;
            let mut f1 = F1Distribution::new(&mut self.state, pool_id, staker, delegator);
            f1.delegate(previous + amount);
            self.pay_out(delegator, reward)?;
        } else {
            F1Distribution::new(&mut self.state, pool_id, staker, delegator).delegate(amount);
        }

        self.state.pool_mut(pool_id)?.total_delegation += amount;

        tracing::debug!(pool_id, address = delegator, staker, amount, "delegate");
        self.emit(RegistryEvent::DelegatePool {
            pool_id,
            address: delegator.to_string(),
            staker: staker.to_string(),
            amount,
        });
        Ok(())
    }

    /// Withdraw delegated funds.
    ///
    /// Pending rewards are credited immediately; the principal enters the
    /// delegation unbonding queue and returns at maturity. When the last
    /// delegator leaves, the (pool, staker) bucket resets to the canonical
    /// zero state.
    ///
    /// # Errors
    /// `PoolNotFound`, `NotADelegator`, or `NotEnoughDelegation`.
    /// Failures leave all state untouched.
    pub fn undelegate_pool(
        &mut self,
        ctx: &BlockContext,
        pool_id: u64,
        staker: &str,
        delegator: &str,
        amount: u64,
    ) -> Result<(), KelpError> {
        self.state.pool(pool_id)?;

        let delegated = self
            .state
            .delegator(pool_id, staker, delegator)
            .map(|d| d.delegation_amount)
            .ok_or(KelpError::NotADelegator)?;
        if amount > delegated {
            return Err(KelpError::NotEnoughDelegation);
        }

        let mut f1 = F1Distribution::new(&mut self.state, pool_id, staker, delegator);
        let reward = f1.withdraw()?;
        let undelegated = f1.undelegate()?;
        let remainder = undelegated.saturating_sub(amount);
        let mut f1 = F1Distribution::new(&mut self.state, pool_id, staker, delegator);
        f1.delegate(remainder);

        self.pay_out(delegator, reward)?;

        let index = self.state.delegation_queue.next_index();
        self.state.delegation_queue.entries.insert(
            index,
            kelp_core::DelegationUnbondingEntry {
                index,
                pool_id,
                staker: staker.to_string(),
                delegator: delegator.to_string(),
                amount,
                creation_time: ctx.unix_secs(),
            },
        );

        let pool = self.state.pool_mut(pool_id)?;
        pool.total_delegation = pool.total_delegation.saturating_sub(amount);

        tracing::debug!(pool_id, address = delegator, staker, amount, "undelegate queued");
        self.emit(RegistryEvent::UndelegatePool {
            pool_id,
            address: delegator.to_string(),
            staker: staker.to_string(),
            amount,
        });
        Ok(())
    }

    /// Collect pending delegation rewards without touching the delegation.
    ///
    /// # Errors
    /// `PoolNotFound` or `NotADelegator`.
    pub fn withdraw_rewards(
        &mut self,
        _ctx: &BlockContext,
        pool_id: u64,
        staker: &str,
        delegator: &str,
    ) -> Result<u64, KelpError> {
        self.state.pool(pool_id)?;

        if self.state.delegator(pool_id, staker, delegator).is_none() {
            return Err(KelpError::NotADelegator);
        }

        let mut f1 = F1Distribution::new(&mut self.state, pool_id, staker, delegator);
        let reward = f1.withdraw()?;
        self.pay_out(delegator, reward)?;

        self.emit(RegistryEvent::WithdrawRewards {
            pool_id,
            address: delegator.to_string(),
            staker: staker.to_string(),
            amount: reward,
        });
        Ok(reward)
    }

    /// Deposit rewards into a staker's delegation bucket.
    ///
    /// This is the reward-distribution extension point: an external payer
    /// (block rewards, bundle payouts) funds the bucket and delegators
    /// collect proportionally via the F1 index. Nothing else accrues
    /// rewards.
    ///
    /// # Errors
    /// `PoolNotFound`, `InvalidState` when the staker has no delegators,
    /// or `InsufficientFunds` on the payer.
    pub fn payout_rewards(
        &mut self,
        _ctx: &BlockContext,
        pool_id: u64,
        staker: &str,
        from: &str,
        amount: u64,
    ) -> Result<(), KelpError> {
        self.state.pool(pool_id)?;

        let key = DelegationPoolData::key(pool_id, staker);
        match self.state.delegation_pool_data.get(&key) {
            Some(data) if data.delegator_count > 0 => {}
            _ => {
                return Err(KelpError::InvalidState(format!(
                    "staker {} has no delegators in pool {}",
                    staker, pool_id
                )));
            }
        }

        self.bank.transfer(from, MODULE_ACCOUNT, amount)?;

        if let Some(data) = self.state.delegation_pool_data.get_mut(&key) {
            data.current_rewards += amount;
        }

        tracing::debug!(pool_id, staker, amount, "reward payout");
        self.emit(RegistryEvent::PayoutRewards {
            pool_id,
            staker: staker.to_string(),
            amount,
        });
        Ok(())
    }
}
