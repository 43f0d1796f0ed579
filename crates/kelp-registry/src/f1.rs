// crates/kelp-registry/src/f1.rs
//
// F1 fee-distribution bookkeeping for delegation rewards.
//
// Each (pool, staker) bucket carries a chain of index entries; entry `f`
// stores the cumulative reward per delegated spore at the close of period
// `f`:
//
//   balance_f = balance_{f-1} + current_rewards / total_delegation
//
// A delegator remembers the entry current when they last (re)delegated or
// withdrew (`k_index`); their pending reward is
//
//   (balance_latest - balance_{k_index}) * delegation_amount
//
// Every state-changing operation closes the current period, resets
// `current_rewards`, and advances `latest_index_k`. Entries written by an
// undelegation are flagged and deleted when the next entry supersedes
// them, so the chain only retains entries some delegator still references.

use kelp_core::{Dec, DelegationEntry, DelegationPoolData, Delegator, KelpError};

use crate::state::RegistryState;

/// Cursor for F1 operations on one (pool, staker, delegator) triple.
pub(crate) struct F1Distribution<'a> {
    state: &'a mut RegistryState,
    pool_id: u64,
    staker: String,
    delegator: String,
}

impl<'a> F1Distribution<'a> {
    pub(crate) fn new(
        state: &'a mut RegistryState,
        pool_id: u64,
        staker: &str,
        delegator: &str,
    ) -> Self {
        Self {
            state,
            pool_id,
            staker: staker.to_string(),
            delegator: delegator.to_string(),
        }
    }

    fn data_key(&self) -> String {
        DelegationPoolData::key(self.pool_id, &self.staker)
    }

    fn delegator_key(&self) -> String {
        Delegator::key(self.pool_id, &self.staker, &self.delegator)
    }

    fn entry_balance(&self, k_index: u64) -> Option<Dec> {
        self.state
            .delegation_entries
            .get(&DelegationEntry::key(self.pool_id, &self.staker, k_index))
            .map(|e| e.balance)
    }

    fn remove_entry(&mut self, k_index: u64) {
        self.state
            .delegation_entries
            .remove(&DelegationEntry::key(self.pool_id, &self.staker, k_index));
    }

    /// Close the current period: write entry `f` from entry `f-1` and the
    /// accrued rewards, optionally deleting the superseded entry.
    ///
    /// Returns the new entry's balance and index.
    fn update_entries(
        &mut self,
        f_minus_1_index: u64,
        current_rewards: u64,
        total_delegation: u64,
        delete_old_entry: bool,
    ) -> (Dec, u64) {
        let previous = self.entry_balance(f_minus_1_index).unwrap_or_else(Dec::zero);
        let share = Dec::from_ratio(current_rewards, total_delegation);
        let balance = previous.add(share);
        let index_f = f_minus_1_index + 1;

        if delete_old_entry {
            self.remove_entry(f_minus_1_index);
        }

        self.state.delegation_entries.insert(
            DelegationEntry::key(self.pool_id, &self.staker, index_f),
            DelegationEntry {
                pool_id: self.pool_id,
                staker: self.staker.clone(),
                k_index: index_f,
                balance,
            },
        );

        (balance, index_f)
    }

    /// Record a delegation of `amount`, creating the bucket if this is the
    /// first delegator. A zero amount is a no-op (used by the redelegation
    /// path when nothing remains).
    pub(crate) fn delegate(&mut self, amount: u64) {
        if amount == 0 {
            return;
        }

        let mut data = self
            .state
            .delegation_pool_data
            .get(&self.data_key())
            .cloned()
            .unwrap_or_else(|| DelegationPoolData {
                pool_id: self.pool_id,
                staker: self.staker.clone(),
                ..Default::default()
            });

        let (_, index_f) = self.update_entries(
            data.latest_index_k,
            data.current_rewards,
            data.total_delegation,
            data.latest_index_was_undelegation,
        );

        data.latest_index_was_undelegation = false;
        data.current_rewards = 0;
        data.total_delegation += amount;
        data.delegator_count += 1;
        data.latest_index_k = index_f;

        self.state.delegation_pool_data.insert(self.data_key(), data);
        self.state.delegators.insert(
            self.delegator_key(),
            Delegator {
                pool_id: self.pool_id,
                staker: self.staker.clone(),
                delegator: self.delegator.clone(),
                delegation_amount: amount,
                k_index: index_f,
            },
        );
    }

    /// Remove the delegator entirely and return their full delegation.
    ///
    /// Pending rewards must have been withdrawn first or they are lost.
    /// When the last delegator leaves, the bucket and its entries are
    /// removed so queries read the canonical zero state.
    pub(crate) fn undelegate(&mut self) -> Result<u64, KelpError> {
        let mut data = self
            .state
            .delegation_pool_data
            .get(&self.data_key())
            .cloned()
            .ok_or_else(|| {
                KelpError::InvalidState(format!(
                    "no delegation data for staker {} in pool {}",
                    self.staker, self.pool_id
                ))
            })?;

        let delegator = self
            .state
            .delegators
            .get(&self.delegator_key())
            .cloned()
            .ok_or(KelpError::NotADelegator)?;

        let (_, index_f) = self.update_entries(
            data.latest_index_k,
            data.current_rewards,
            data.total_delegation,
            data.latest_index_was_undelegation,
        );

        // The new entry is only needed while another delegator can still
        // reference it; flag it for deletion on the next advance.
        data.latest_index_was_undelegation = true;
        data.current_rewards = 0;
        data.latest_index_k = index_f;
        data.total_delegation = data
            .total_delegation
            .saturating_sub(delegator.delegation_amount);
        data.delegator_count = data.delegator_count.saturating_sub(1);

        self.state.delegators.remove(&self.delegator_key());
        self.remove_entry(delegator.k_index);

        if data.delegator_count == 0 {
            self.state.delegation_pool_data.remove(&self.data_key());
            self.remove_entry(index_f);
        } else {
            self.state.delegation_pool_data.insert(self.data_key(), data);
        }

        Ok(delegator.delegation_amount)
    }

    /// Settle the delegator's pending reward and move their checkpoint to
    /// the fresh index entry. Returns the reward; no funds move here.
    pub(crate) fn withdraw(&mut self) -> Result<u64, KelpError> {
        let mut data = self
            .state
            .delegation_pool_data
            .get(&self.data_key())
            .cloned()
            .ok_or_else(|| {
                KelpError::InvalidState(format!(
                    "no delegation data for staker {} in pool {}",
                    self.staker, self.pool_id
                ))
            })?;

        let mut delegator = self
            .state
            .delegators
            .get(&self.delegator_key())
            .cloned()
            .ok_or(KelpError::NotADelegator)?;

        let (balance_f, index_f) = self.update_entries(
            data.latest_index_k,
            data.current_rewards,
            data.total_delegation,
            data.latest_index_was_undelegation,
        );

        data.latest_index_was_undelegation = false;
        data.current_rewards = 0;
        data.latest_index_k = index_f;
        self.state.delegation_pool_data.insert(self.data_key(), data);

        let balance_k = self.entry_balance(delegator.k_index).ok_or_else(|| {
            KelpError::InvalidState(format!(
                "missing index entry {} for delegator {}",
                delegator.k_index, self.delegator
            ))
        })?;
        self.remove_entry(delegator.k_index);

        delegator.k_index = index_f;
        let amount = delegator.delegation_amount;
        self.state.delegators.insert(self.delegator_key(), delegator);

        Ok(balance_f.sub(balance_k).mul_int(amount).round_u64())
    }

    /// The delegator's pending reward, without any state change.
    pub(crate) fn pending_reward(
        state: &RegistryState,
        pool_id: u64,
        staker: &str,
        delegator: &str,
    ) -> u64 {
        let Some(data) = state.delegation_data(pool_id, staker) else {
            return 0;
        };
        let Some(entry) = state.delegator(pool_id, staker, delegator) else {
            return 0;
        };

        let latest = state
            .delegation_entries
            .get(&DelegationEntry::key(pool_id, staker, data.latest_index_k))
            .map(|e| e.balance)
            .unwrap_or_else(Dec::zero);
        let share = Dec::from_ratio(data.current_rewards, data.total_delegation);
        let balance_f = latest.add(share);

        let balance_k = state
            .delegation_entries
            .get(&DelegationEntry::key(pool_id, staker, entry.k_index))
            .map(|e| e.balance)
            .unwrap_or_else(Dec::zero);

        balance_f
            .sub(balance_k)
            .mul_int(entry.delegation_amount)
            .round_u64()
    }
}
