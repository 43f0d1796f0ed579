// crates/kelp-core/src/traits.rs
//
// Trait interfaces implemented by downstream crates.

use crate::error::KelpError;

/// Durable storage for registry state snapshots.
///
/// The registry serializes its full state once per block; the store only
/// deals in opaque bytes so the snapshot format stays a registry concern.
/// Implementations: `kelp_store::RocksStore` (durable),
/// `kelp_store::MemoryStore` (tests).
pub trait StateStore {
    /// Persist a state snapshot, replacing any previous one.
    fn save_state(&self, bytes: &[u8]) -> Result<(), KelpError>;

    /// Load the most recent state snapshot, if one exists.
    fn load_state(&self) -> Result<Option<Vec<u8>>, KelpError>;
}
