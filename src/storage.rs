//! Storage substrate for Quarry.
//!
//! The index keeps all of its state as sorted byte keys. This module provides
//! the seam to whatever durable store sits underneath:
//!
//! - **[`Storage`] trait**: read snapshots plus atomic batch commits
//! - **[`StorageConfig`] enum**: type-safe configuration for the backends
//! - **[`StorageFactory`]**: builds a backend from its configuration
//!
//! A [`Snapshot`] is immutable. Commits publish a new snapshot; a snapshot that
//! is already held by a reader never changes.
//!
//! # Example
//!
//! ```
//! use quarry::storage::{StorageConfig, StorageFactory, WriteBatch};
//! use quarry::storage::memory::MemoryStorageConfig;
//!
//! # fn main() -> quarry::error::Result<()> {
//! let storage = StorageFactory::open(StorageConfig::Memory(MemoryStorageConfig::default()))?;
//!
//! let before = storage.snapshot()?;
//! let mut batch = WriteBatch::new();
//! batch.put(b"k".to_vec(), b"v".to_vec());
//! storage.commit(batch)?;
//!
//! assert!(before.get(b"k").is_none());
//! assert_eq!(storage.snapshot()?.get(b"k"), Some(&b"v"[..]));
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod file;
pub mod memory;

use file::{FileStorage, FileStorageConfig};
use memory::{MemoryStorage, MemoryStorageConfig};

/// Sorted key/value image shared by snapshots.
pub(crate) type KeyMap = BTreeMap<Vec<u8>, Arc<[u8]>>;

/// Trait for storage backends.
pub trait Storage: Send + Sync + std::fmt::Debug {
    /// The latest committed snapshot.
    fn snapshot(&self) -> Result<Snapshot>;

    /// Apply `batch` atomically and return the new generation.
    ///
    /// Commits are serialized. On error the previous snapshot stays current.
    fn commit(&self, batch: WriteBatch) -> Result<u64>;

    /// Backend name (for logging).
    fn name(&self) -> &'static str;
}

/// An immutable, cheaply cloneable view of the store at one generation.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    data: Arc<KeyMap>,
    generation: u64,
}

impl Snapshot {
    pub(crate) fn new(data: Arc<KeyMap>, generation: u64) -> Self {
        Snapshot { data, generation }
    }

    pub(crate) fn data(&self) -> &Arc<KeyMap> {
        &self.data
    }

    /// Generation of the commit that published this snapshot (0 when empty).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.data.get(key).map(|v| v.as_ref())
    }

    /// Shared handle to the value of `key`, without copying it.
    pub fn get_shared(&self, key: &[u8]) -> Option<Arc<[u8]>> {
        self.data.get(key).cloned()
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        self.data.contains_key(key)
    }

    /// Keys within the given bounds, ascending. Inverted bounds yield nothing.
    pub fn range<'s>(
        &'s self,
        lower: Bound<&[u8]>,
        upper: Bound<&[u8]>,
    ) -> Box<dyn DoubleEndedIterator<Item = (&'s [u8], &'s [u8])> + 's> {
        if is_empty_range(lower, upper) {
            return Box::new(std::iter::empty());
        }
        let lower = lower.map(|b| b.to_vec());
        let upper = upper.map(|b| b.to_vec());
        Box::new(
            self.data
                .range::<Vec<u8>, _>((lower, upper))
                .map(|(k, v)| (k.as_slice(), v.as_ref())),
        )
    }

    /// Like [`range`](Snapshot::range), handing out shared value handles.
    pub fn range_shared<'s>(
        &'s self,
        lower: Bound<&[u8]>,
        upper: Bound<&[u8]>,
    ) -> Box<dyn DoubleEndedIterator<Item = (&'s [u8], Arc<[u8]>)> + 's> {
        if is_empty_range(lower, upper) {
            return Box::new(std::iter::empty());
        }
        let lower = lower.map(|b| b.to_vec());
        let upper = upper.map(|b| b.to_vec());
        Box::new(
            self.data
                .range::<Vec<u8>, _>((lower, upper))
                .map(|(k, v)| (k.as_slice(), Arc::clone(v))),
        )
    }

    /// Keys starting with `prefix`, ascending.
    pub fn prefix<'s>(
        &'s self,
        prefix: &[u8],
    ) -> Box<dyn DoubleEndedIterator<Item = (&'s [u8], &'s [u8])> + 's> {
        match prefix_successor(prefix) {
            Some(end) => self.range(Bound::Included(prefix), Bound::Excluded(end.as_slice())),
            None => self.range(Bound::Included(prefix), Bound::Unbounded),
        }
    }
}

/// Smallest key greater than every key starting with `prefix`, if any.
pub fn prefix_successor(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last != u8::MAX {
            end.push(last + 1);
            return Some(end);
        }
    }
    None
}

fn is_empty_range(lower: Bound<&[u8]>, upper: Bound<&[u8]>) -> bool {
    match (lower, upper) {
        (Bound::Included(l), Bound::Included(u)) => l > u,
        (Bound::Included(l), Bound::Excluded(u))
        | (Bound::Excluded(l), Bound::Included(u))
        | (Bound::Excluded(l), Bound::Excluded(u)) => l >= u,
        _ => false,
    }
}

/// One operation of a [`WriteBatch`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchOp {
    Put(Vec<u8>, Vec<u8>),
    Delete(Vec<u8>),
}

/// Ordered set of writes committed atomically.
#[derive(Clone, Debug, Default)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        WriteBatch::default()
    }

    pub fn put(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.ops.push(BatchOp::Put(key, value));
    }

    pub fn delete(&mut self, key: Vec<u8>) {
        self.ops.push(BatchOp::Delete(key));
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    /// Apply the operations, in order, to a key map.
    pub(crate) fn apply_to(self, data: &mut KeyMap) {
        for op in self.ops {
            match op {
                BatchOp::Put(key, value) => {
                    data.insert(key, Arc::from(value));
                }
                BatchOp::Delete(key) => {
                    data.remove(&key);
                }
            }
        }
    }
}

/// Configuration for the storage backends.
///
/// ```
/// use quarry::storage::StorageConfig;
///
/// let config: StorageConfig =
///     serde_json::from_str(r#"{ "type": "file", "path": "/tmp/quarry.img" }"#).unwrap();
/// assert!(matches!(config, StorageConfig::File(_)));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageConfig {
    /// Volatile in-memory store.
    Memory(MemoryStorageConfig),
    /// In-memory store persisted to a single image file.
    File(FileStorageConfig),
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Memory(MemoryStorageConfig::default())
    }
}

/// Builds storage backends from configuration.
pub struct StorageFactory;

impl StorageFactory {
    /// Open the backend described by `config`.
    pub fn open(config: StorageConfig) -> Result<Arc<dyn Storage>> {
        match config {
            StorageConfig::Memory(config) => Ok(Arc::new(MemoryStorage::new(config))),
            StorageConfig::File(config) => Ok(Arc::new(FileStorage::open(config)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_of(keys: &[&[u8]]) -> Snapshot {
        let data: KeyMap = keys
            .iter()
            .map(|k| (k.to_vec(), Arc::from(&b"v"[..])))
            .collect();
        Snapshot::new(Arc::new(data), 1)
    }

    #[test]
    fn test_range_and_prefix() {
        let snapshot = snapshot_of(&[&b"a"[..], b"ab", b"abc", b"b", b"\xff", b"\xff\x01"]);

        let keys: Vec<&[u8]> = snapshot.prefix(b"ab").map(|(k, _)| k).collect();
        assert_eq!(keys, vec![&b"ab"[..], b"abc"]);

        let keys: Vec<&[u8]> = snapshot.prefix(b"\xff").map(|(k, _)| k).collect();
        assert_eq!(keys.len(), 2);

        let keys: Vec<&[u8]> = snapshot
            .range(Bound::Excluded(&b"a"[..]), Bound::Included(&b"b"[..]))
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec![&b"ab"[..], b"abc", b"b"]);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let snapshot = snapshot_of(&[&b"a"[..], b"b"]);
        assert_eq!(
            snapshot
                .range(Bound::Included(&b"b"[..]), Bound::Included(&b"a"[..]))
                .count(),
            0
        );
        assert_eq!(
            snapshot
                .range(Bound::Excluded(&b"a"[..]), Bound::Excluded(&b"a"[..]))
                .count(),
            0
        );
    }

    #[test]
    fn test_prefix_successor() {
        assert_eq!(prefix_successor(b"ab"), Some(b"ac".to_vec()));
        assert_eq!(prefix_successor(b"a\xff"), Some(b"b".to_vec()));
        assert_eq!(prefix_successor(b"\xff\xff"), None);
    }

    #[test]
    fn test_batch_applies_in_order() {
        let mut batch = WriteBatch::new();
        batch.put(b"k".to_vec(), b"1".to_vec());
        batch.delete(b"k".to_vec());
        batch.put(b"j".to_vec(), b"2".to_vec());
        assert_eq!(batch.len(), 3);

        let mut data = KeyMap::new();
        batch.apply_to(&mut data);
        assert!(!data.contains_key(&b"k"[..]));
        assert_eq!(data.get(&b"j"[..]).map(|v| v.as_ref()), Some(&b"2"[..]));
    }
}
