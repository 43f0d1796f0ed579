// crates/kelp-core/src/funding.rs
//
// Funder ledger records.

use serde::{Deserialize, Serialize};

/// An account funding a pool's reward pot.
///
/// Funding is not subject to an unbonding delay: defunded amounts return
/// to the spendable balance immediately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Funder {
    /// Address of the funding account.
    pub account: String,
    /// The pool being funded.
    pub pool_id: u64,
    /// Funded amount in spore.
    pub amount: u64,
}

impl Funder {
    /// Composite store key: `{account}/{pool_id}`.
    pub fn key(account: &str, pool_id: u64) -> String {
        format!("{}/{}", account, pool_id)
    }
}
