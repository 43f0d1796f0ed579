// crates/kelp-registry/src/funding.rs
//
// Funding ledger operations.
//
// Funding has no unbonding delay: defunded amounts return to the spendable
// balance in the same transaction. The funder set is capped; a newcomer to
// a full pool must outbid the current lowest funder, who is refunded in
// full and removed.

use kelp_core::{BankLedger, BlockContext, Funder, KelpError};

use crate::events::RegistryEvent;
use crate::pool;
use crate::registry::{Registry, MODULE_ACCOUNT};

impl<B: BankLedger> Registry<B> {
    /// Fund a pool's reward pot, creating or topping up the sender's entry.
    ///
    /// # Errors
    /// `PoolNotFound`, `FundsTooLow` (full pool, bid too low), or
    /// `InsufficientFunds`. Failures leave all state untouched.
    pub fn fund_pool(
        &mut self,
        _ctx: &BlockContext,
        pool_id: u64,
        account: &str,
        amount: u64,
    ) -> Result<(), KelpError> {
        let pool = self.state.pool(pool_id)?;
        let funder_exists = self.state.funder(account, pool_id).is_some();

        // A new funder joining a full pool must displace the lowest one.
        let mut evicted: Option<Funder> = None;
        if !funder_exists && pool.funders.len() as u64 >= self.state.params.max_funders {
            let lowest = self
                .state
                .funder(&pool.lowest_funder, pool_id)
                .cloned()
                .ok_or_else(|| {
                    KelpError::InvalidState(format!(
                        "pool {} is full but has no lowest funder",
                        pool_id
                    ))
                })?;

            if amount > lowest.amount {
                evicted = Some(lowest);
            } else {
                return Err(KelpError::FundsTooLow { min: lowest.amount });
            }
        }

        // Last failure point: everything after this mutates.
        self.bank.transfer(account, MODULE_ACCOUNT, amount)?;

        if let Some(lowest) = evicted {
            self.pay_out(&lowest.account, lowest.amount)?;
            pool::remove_funder(&mut self.state, pool_id, &lowest.account);
            tracing::info!(
                pool_id,
                address = %lowest.account,
                amount = lowest.amount,
                "evicted lowest funder"
            );
            self.emit(RegistryEvent::DefundPool {
                pool_id,
                address: lowest.account,
                amount: lowest.amount,
            });
        }

        let key = Funder::key(account, pool_id);
        if let Some(funder) = self.state.funders.get_mut(&key) {
            funder.amount += amount;
        } else {
            self.state.funders.insert(
                key,
                Funder {
                    account: account.to_string(),
                    pool_id,
                    amount,
                },
            );
            self.state.pool_mut(pool_id)?.funders.push(account.to_string());
        }

        self.state.pool_mut(pool_id)?.total_funds += amount;
        pool::update_lowest_funder(&mut self.state, pool_id);

        tracing::debug!(pool_id, address = account, amount, "fund");
        self.emit(RegistryEvent::FundPool {
            pool_id,
            address: account.to_string(),
            amount,
        });
        Ok(())
    }

    /// Withdraw funding from a pool. Credited immediately.
    ///
    /// # Errors
    /// `PoolNotFound`, `NoFunder`, or `DefundTooHigh` when `amount`
    /// exceeds the sender's funded amount. Failures leave all state
    /// untouched.
    pub fn defund_pool(
        &mut self,
        _ctx: &BlockContext,
        pool_id: u64,
        account: &str,
        amount: u64,
    ) -> Result<(), KelpError> {
        self.state.pool(pool_id)?;

        let funded = self
            .state
            .funder(account, pool_id)
            .map(|f| f.amount)
            .ok_or(KelpError::NoFunder)?;

        if amount > funded {
            return Err(KelpError::DefundTooHigh { max: funded });
        }

        self.pay_out(account, amount)?;

        if amount == funded {
            // remove_funder also subtracts the amount from total_funds
            pool::remove_funder(&mut self.state, pool_id, account);
        } else {
            let key = Funder::key(account, pool_id);
            if let Some(funder) = self.state.funders.get_mut(&key) {
                funder.amount -= amount;
            }
            let pool = self.state.pool_mut(pool_id)?;
            pool.total_funds = pool.total_funds.saturating_sub(amount);
        }

        pool::update_lowest_funder(&mut self.state, pool_id);

        tracing::debug!(pool_id, address = account, amount, "defund");
        self.emit(RegistryEvent::DefundPool {
            pool_id,
            address: account.to_string(),
            amount,
        });
        Ok(())
    }
}
