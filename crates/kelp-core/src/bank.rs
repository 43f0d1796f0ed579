// crates/kelp-core/src/bank.rs
//
// Balance ledger collaborator.
//
// The registry never holds balances itself: locked funds move into the
// module account and back out through this interface. Failures surface as
// `InsufficientFunds` with no partial movement.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::KelpError;

/// Per-account spendable balance ledger.
pub trait BankLedger {
    /// Spendable balance of an account in spore. Unknown accounts read 0.
    fn balance(&self, account: &str) -> u64;

    /// Remove `amount` from an account's spendable balance.
    ///
    /// # Errors
    /// Returns `KelpError::InsufficientFunds` if the balance is too low;
    /// the balance is unchanged on failure.
    fn debit(&mut self, account: &str, amount: u64) -> Result<(), KelpError>;

    /// Add `amount` to an account's spendable balance.
    fn credit(&mut self, account: &str, amount: u64);

    /// Move `amount` between two accounts.
    fn transfer(&mut self, from: &str, to: &str, amount: u64) -> Result<(), KelpError> {
        self.debit(from, amount)?;
        self.credit(to, amount);
        Ok(())
    }
}

/// In-memory balance ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InMemoryBank {
    accounts: BTreeMap<String, u64>,
}

impl InMemoryBank {
    /// Create an empty bank.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bank seeded with the given balances.
    pub fn with_balances<I>(balances: I) -> Self
    where
        I: IntoIterator<Item = (String, u64)>,
    {
        Self {
            accounts: balances.into_iter().collect(),
        }
    }

    /// Mint new spore into an account.
    pub fn mint(&mut self, account: &str, amount: u64) {
        let balance = self.accounts.entry(account.to_string()).or_insert(0);
        *balance = balance.saturating_add(amount);
    }
}

impl BankLedger for InMemoryBank {
    fn balance(&self, account: &str) -> u64 {
        self.accounts.get(account).copied().unwrap_or(0)
    }

    fn debit(&mut self, account: &str, amount: u64) -> Result<(), KelpError> {
        let available = self.balance(account);
        if amount > available {
            return Err(KelpError::InsufficientFunds {
                account: account.to_string(),
                available,
                requested: amount,
            });
        }
        if let Some(balance) = self.accounts.get_mut(account) {
            *balance -= amount;
            if *balance == 0 {
                self.accounts.remove(account);
            }
        }
        Ok(())
    }

    fn credit(&mut self, account: &str, amount: u64) {
        if amount == 0 {
            return;
        }
        let balance = self.accounts.entry(account.to_string()).or_insert(0);
        *balance = balance.saturating_add(amount);
    }
}
