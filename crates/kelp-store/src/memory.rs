// crates/kelp-store/src/memory.rs
//
// In-memory `StateStore` for tests and ephemeral nodes.

use std::sync::Mutex;

use kelp_core::error::KelpError;
use kelp_core::traits::StateStore;

/// In-memory snapshot store. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<Option<Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn save_state(&self, bytes: &[u8]) -> Result<(), KelpError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| KelpError::Storage("memory store lock poisoned".to_string()))?;
        *state = Some(bytes.to_vec());
        Ok(())
    }

    fn load_state(&self) -> Result<Option<Vec<u8>>, KelpError> {
        let state = self
            .state
            .lock()
            .map_err(|_| KelpError::Storage("memory store lock poisoned".to_string()))?;
        Ok(state.clone())
    }
}
