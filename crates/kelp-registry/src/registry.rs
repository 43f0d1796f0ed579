// crates/kelp-registry/src/registry.rs
//
// The registry: a deterministic, single-threaded state machine over the
// pool/staking/delegation/funding ledgers.
//
// Mutating operations take `&mut self` and are all-or-nothing: every
// failure path returns before the first state or balance mutation.
// Queries take `&self`. Locked funds are held by the module account on the
// balance ledger and move back out on release.

use kelp_core::{BankLedger, BlockContext, KelpError, Params, Pool};

use crate::events::RegistryEvent;
use crate::state::RegistryState;

/// The balance-ledger account holding all locked stake, delegation, and
/// funding.
pub const MODULE_ACCOUNT: &str = "kelp_registry_module";

/// The storage-pool registry.
pub struct Registry<B: BankLedger> {
    pub(crate) state: RegistryState,
    pub(crate) bank: B,
    pub(crate) events: Vec<RegistryEvent>,
}

impl<B: BankLedger> Registry<B> {
    /// Create an empty registry with the given parameters.
    ///
    /// # Errors
    /// Returns an error if the parameters do not validate.
    pub fn new(params: Params, bank: B) -> Result<Self, KelpError> {
        params.validate()?;
        Ok(Self {
            state: RegistryState::new(params),
            bank,
            events: Vec::new(),
        })
    }

    /// Rebuild a registry from a previously serialized state snapshot.
    pub fn restore(bytes: &[u8], bank: B) -> Result<Self, KelpError> {
        let state: RegistryState = serde_json::from_slice(bytes)?;
        state.params.validate()?;
        Ok(Self {
            state,
            bank,
            events: Vec::new(),
        })
    }

    /// Serialize the full state for persistence.
    pub fn snapshot(&self) -> Result<Vec<u8>, KelpError> {
        Ok(serde_json::to_vec(&self.state)?)
    }

    /// Read-only access to the ledger state.
    pub fn state(&self) -> &RegistryState {
        &self.state
    }

    /// Read-only access to the balance ledger.
    pub fn bank(&self) -> &B {
        &self.bank
    }

    /// Mutable access to the balance ledger (genesis funding, faucets).
    pub fn bank_mut(&mut self) -> &mut B {
        &mut self.bank
    }

    /// Create a new pool and return its id.
    pub fn create_pool(&mut self, name: &str, runtime: &str) -> u64 {
        let id = self.state.pool_count;
        self.state.pool_count += 1;
        self.state.pools.insert(id, Pool::new(id, name, runtime));

        tracing::info!(pool_id = id, name, "created pool");
        self.emit(RegistryEvent::CreatePool {
            pool_id: id,
            name: name.to_string(),
        });
        id
    }

    /// End-of-block processing: release every matured unbonding entry.
    pub fn end_block(&mut self, ctx: &BlockContext) {
        self.process_staking_unbonding_queue(ctx);
        self.process_delegation_unbonding_queue(ctx);
    }

    /// Drain the events buffered since the last call.
    pub fn take_events(&mut self) -> Vec<RegistryEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: RegistryEvent) {
        tracing::debug!(?event, "registry event");
        self.events.push(event);
    }

    /// Move funds out of the module account, failing the chain-halt way:
    /// the module running dry is an internal invariant breach, not a user
    /// error.
    pub(crate) fn pay_out(&mut self, to: &str, amount: u64) -> Result<(), KelpError> {
        self.bank
            .transfer(MODULE_ACCOUNT, to, amount)
            .map_err(|_| {
                KelpError::InvalidState(format!(
                    "module account cannot cover {}spore owed to {}",
                    amount, to
                ))
            })
    }
}
