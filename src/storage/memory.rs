//! In-memory storage implementation.
//!
//! The current snapshot is an `Arc` to a sorted map. A commit copies the map,
//! applies the batch to the copy and swaps it in, so readers holding an older
//! snapshot are never affected.

use std::sync::Arc;

use log::debug;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::{KeyMap, Snapshot, Storage, WriteBatch};

/// Configuration for [`MemoryStorage`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStorageConfig {}

/// Volatile, copy-on-write key/value store.
#[derive(Debug)]
pub struct MemoryStorage {
    current: RwLock<Snapshot>,
    commit_lock: Mutex<()>,
}

impl MemoryStorage {
    pub fn new(_config: MemoryStorageConfig) -> Self {
        Self::from_snapshot(Snapshot::default())
    }

    pub(crate) fn from_snapshot(snapshot: Snapshot) -> Self {
        MemoryStorage {
            current: RwLock::new(snapshot),
            commit_lock: Mutex::new(()),
        }
    }

    /// Commit `batch`, running `persist` on the new image before publishing it.
    ///
    /// If `persist` fails nothing is published.
    pub(crate) fn commit_with<F>(&self, batch: WriteBatch, persist: F) -> Result<u64>
    where
        F: FnOnce(&KeyMap, u64) -> Result<()>,
    {
        let _guard = self.commit_lock.lock();

        let base = self.current.read().clone();
        let generation = base.generation() + 1;
        let ops = batch.len();

        let mut data: KeyMap = base.data().as_ref().clone();
        batch.apply_to(&mut data);
        persist(&data, generation)?;

        *self.current.write() = Snapshot::new(Arc::new(data), generation);
        debug!("committed generation {generation} ({ops} operations)");
        Ok(generation)
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new(MemoryStorageConfig::default())
    }
}

impl Storage for MemoryStorage {
    fn snapshot(&self) -> Result<Snapshot> {
        Ok(self.current.read().clone())
    }

    fn commit(&self, batch: WriteBatch) -> Result<u64> {
        self.commit_with(batch, |_, _| Ok(()))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
