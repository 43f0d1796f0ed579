// crates/kelp-core/src/lib.rs
//
// kelp-core: Core types, token units, and ledger traits for the Kelp Protocol.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines the canonical data structures of the pool registry (pools,
// stakers, funders, delegators, unbonding queues), the protocol error type,
// module parameters, and the trait interfaces for the balance ledger and
// the state store.

pub mod bank;
pub mod context;
pub mod dec;
pub mod delegation;
pub mod error;
pub mod funding;
pub mod params;
pub mod pool;
pub mod staking;
pub mod token;
pub mod traits;
pub mod unbonding;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use kelp_core::Pool;`

// Pool types
pub use pool::Pool;

// Staking types
pub use staking::{Staker, StakerStatus, UnbondingStaker};

// Delegation types
pub use delegation::{DelegationEntry, DelegationPoolData, Delegator};

// Funding types
pub use funding::Funder;

// Unbonding types
pub use unbonding::{DelegationUnbondingEntry, StakingUnbondingEntry, UnbondingQueue};

// Token and decimal types
pub use dec::Dec;
pub use token::{Kelp, Spore, SPORE_PER_KELP};

// Parameters and block context
pub use context::BlockContext;
pub use params::Params;

// Error type
pub use error::KelpError;

// Traits
pub use bank::{BankLedger, InMemoryBank};
pub use traits::StateStore;
