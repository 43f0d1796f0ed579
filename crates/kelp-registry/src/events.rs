// crates/kelp-registry/src/events.rs
//
// Typed registry events and transaction receipts.
//
// Events are emitted whenever funds actually move (or pool membership
// changes) and buffered per block; the driving layer drains them after
// end-of-block processing. Receipts translate operation results into the
// code/log pair the transaction-execution collaborator returns to clients:
// code 0 is success, nonzero codes carry the failure message.

use serde::{Deserialize, Serialize};

use kelp_core::KelpError;

/// An event describing a completed registry state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RegistryEvent {
    CreatePool {
        pool_id: u64,
        name: String,
    },
    StakePool {
        pool_id: u64,
        address: String,
        amount: u64,
    },
    /// Emitted when stake actually leaves the pool: on unbonding release
    /// and on eviction of the lowest staker.
    UnstakePool {
        pool_id: u64,
        address: String,
        amount: u64,
    },
    FundPool {
        pool_id: u64,
        address: String,
        amount: u64,
    },
    /// Emitted on defund and on eviction of the lowest funder.
    DefundPool {
        pool_id: u64,
        address: String,
        amount: u64,
    },
    DelegatePool {
        pool_id: u64,
        address: String,
        staker: String,
        amount: u64,
    },
    UndelegatePool {
        pool_id: u64,
        address: String,
        staker: String,
        amount: u64,
    },
    WithdrawRewards {
        pool_id: u64,
        address: String,
        staker: String,
        amount: u64,
    },
    PayoutRewards {
        pool_id: u64,
        staker: String,
        amount: u64,
    },
    UpdateMetadata {
        pool_id: u64,
        address: String,
        commission: String,
    },
}

/// Result of a submitted transaction, as surfaced to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// 0 on success, the error's registry code otherwise.
    pub code: u32,
    /// Empty on success, the failure message otherwise.
    pub log: String,
}

impl TxReceipt {
    /// A success receipt.
    pub fn ok() -> Self {
        Self {
            code: 0,
            log: String::new(),
        }
    }

    /// Build a receipt from an operation result.
    pub fn from_result(result: &Result<(), KelpError>) -> Self {
        match result {
            Ok(()) => Self::ok(),
            Err(e) => Self {
                code: e.code(),
                log: e.to_string(),
            },
        }
    }
}
