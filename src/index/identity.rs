//! Identity map and index metadata.
//!
//! External ids are caller-supplied strings; internal ids are dense integers
//! assigned at commit time, starting at 1 and never reused.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{QuarryError, Result};
use crate::index::InternalId;
use crate::index::keys;
use crate::storage::Snapshot;

/// Counters persisted under the meta key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexMeta {
    /// The id the next new document receives.
    pub next_id: InternalId,
    /// Number of live documents.
    pub live: u64,
}

impl Default for IndexMeta {
    fn default() -> Self {
        IndexMeta { next_id: 1, live: 0 }
    }
}

impl IndexMeta {
    const ENCODED_LEN: usize = 16;

    pub fn load(snapshot: &Snapshot) -> Result<Self> {
        match snapshot.get(keys::META_KEY) {
            None => Ok(IndexMeta::default()),
            Some(bytes) => Self::decode(bytes),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = vec![0u8; Self::ENCODED_LEN];
        LittleEndian::write_u64(&mut out[..8], self.next_id);
        LittleEndian::write_u64(&mut out[8..], self.live);
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::ENCODED_LEN {
            return Err(QuarryError::corrupted("index meta has the wrong length"));
        }
        Ok(IndexMeta {
            next_id: LittleEndian::read_u64(&bytes[..8]),
            live: LittleEndian::read_u64(&bytes[8..]),
        })
    }
}

/// Bidirectional external/internal id lookups against one snapshot.
#[derive(Clone, Debug)]
pub struct IdentityMap {
    snapshot: Snapshot,
}

impl IdentityMap {
    pub fn new(snapshot: Snapshot) -> Self {
        IdentityMap { snapshot }
    }

    pub fn internal_id_of(&self, external: &str) -> Result<Option<InternalId>> {
        match self.snapshot.get(&keys::internal_key(external)) {
            None => Ok(None),
            Some(bytes) if bytes.len() == 8 => Ok(Some(LittleEndian::read_u64(bytes))),
            Some(_) => Err(QuarryError::corrupted(format!(
                "identity of {external:?} is malformed"
            ))),
        }
    }

    pub fn external_id_of(&self, id: InternalId) -> Result<Option<String>> {
        match self.snapshot.get(&keys::external_key(id)) {
            None => Ok(None),
            Some(bytes) => String::from_utf8(bytes.to_vec())
                .map(Some)
                .map_err(|_| QuarryError::corrupted(format!("external id of {id} is not UTF-8"))),
        }
    }
}

/// Value stored under an internal-id key.
pub(crate) fn encode_internal_id(id: InternalId) -> Vec<u8> {
    let mut out = vec![0u8; 8];
    LittleEndian::write_u64(&mut out, id);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorage;
    use crate::storage::{Storage, WriteBatch};

    #[test]
    fn test_meta_roundtrip() {
        let meta = IndexMeta { next_id: 42, live: 7 };
        assert_eq!(IndexMeta::decode(&meta.encode()).unwrap(), meta);
        assert!(IndexMeta::decode(&[1, 2]).is_err());
        assert_eq!(IndexMeta::load(&Snapshot::default()).unwrap().next_id, 1);
    }

    #[test]
    fn test_identity_lookups() {
        let storage = MemoryStorage::default();
        let mut batch = WriteBatch::new();
        batch.put(keys::internal_key("entry/1"), encode_internal_id(1));
        batch.put(keys::external_key(1), b"entry/1".to_vec());
        storage.commit(batch).unwrap();

        let map = IdentityMap::new(storage.snapshot().unwrap());
        assert_eq!(map.internal_id_of("entry/1").unwrap(), Some(1));
        assert_eq!(map.internal_id_of("entry/2").unwrap(), None);
        assert_eq!(map.external_id_of(1).unwrap().as_deref(), Some("entry/1"));
        assert_eq!(map.external_id_of(2).unwrap(), None);
    }
}
