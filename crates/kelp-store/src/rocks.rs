// crates/kelp-store/src/rocks.rs
//
// RocksDB-backed persistent storage for registry state.
//
// Key format:
//   - Snapshot: `state:v1` -> JSON-serialized registry state
//
// The snapshot is written once per block by the daemon; the versioned key
// leaves room for migrating the snapshot format without rewriting history.

use rocksdb::{DBWithThreadMode, MultiThreaded, Options};

use kelp_core::error::KelpError;
use kelp_core::traits::StateStore;

/// Key the current state snapshot is stored under.
const STATE_KEY: &[u8] = b"state:v1";

/// RocksDB wrapper implementing the `StateStore` trait.
pub struct RocksStore {
    db: DBWithThreadMode<MultiThreaded>,
}

impl RocksStore {
    /// Open a RocksDB database at the given filesystem path.
    ///
    /// Creates the database directory if it does not exist.
    pub fn open(path: &str) -> Result<Self, KelpError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DBWithThreadMode::<MultiThreaded>::open(&opts, path)
            .map_err(|e| KelpError::Storage(format!("failed to open RocksDB at {}: {}", path, e)))?;

        Ok(Self { db })
    }

    /// Store a value under an arbitrary key.
    pub fn put_bytes(&self, key: &[u8], value: &[u8]) -> Result<(), KelpError> {
        self.db
            .put(key, value)
            .map_err(|e| KelpError::Storage(format!("RocksDB put failed: {}", e)))
    }

    /// Retrieve a value by arbitrary key.
    pub fn get_bytes(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KelpError> {
        self.db
            .get(key)
            .map_err(|e| KelpError::Storage(format!("RocksDB get failed: {}", e)))
    }
}

impl StateStore for RocksStore {
    fn save_state(&self, bytes: &[u8]) -> Result<(), KelpError> {
        self.put_bytes(STATE_KEY, bytes)
    }

    fn load_state(&self) -> Result<Option<Vec<u8>>, KelpError> {
        self.get_bytes(STATE_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = RocksStore::open(dir.path().to_str().unwrap()).unwrap();

        assert!(store.load_state().unwrap().is_none());

        let snapshot = serde_json::json!({ "pool_count": 1 });
        store.save_state(&serde_json::to_vec(&snapshot).unwrap()).unwrap();
        let loaded = store.load_state().unwrap().unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&loaded).unwrap();
        assert_eq!(parsed, snapshot);

        // A newer snapshot replaces the previous one.
        let snapshot = serde_json::json!({ "pool_count": 2 });
        store.save_state(&serde_json::to_vec(&snapshot).unwrap()).unwrap();
        let loaded = store.load_state().unwrap().unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&loaded).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn test_snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_str().unwrap().to_string();

        {
            let store = RocksStore::open(&path).unwrap();
            store.save_state(b"persisted").unwrap();
        }

        let store = RocksStore::open(&path).unwrap();
        assert_eq!(store.load_state().unwrap().unwrap(), b"persisted");
    }

    #[test]
    fn test_raw_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = RocksStore::open(dir.path().to_str().unwrap()).unwrap();

        store.put_bytes(b"genesis:hash", b"abc").unwrap();
        assert_eq!(store.get_bytes(b"genesis:hash").unwrap().unwrap(), b"abc");
        assert!(store.get_bytes(b"missing").unwrap().is_none());
    }
}
