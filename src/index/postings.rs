//! Posting lists.
//!
//! A posting list is a strictly ascending list of internal ids, stored as a
//! varint count followed by varint deltas (the first delta is taken from 0).
//! Ids start at 1, so every delta of a valid list is at least 1.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::error::{QuarryError, Result};
use crate::index::InternalId;
use crate::util::varint::{decode_u64, encode_u64_into};

/// A decoded posting list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PostingList {
    ids: Vec<InternalId>,
}

impl PostingList {
    pub fn new() -> Self {
        PostingList::default()
    }

    /// Build from ids that are already strictly ascending.
    pub fn from_sorted(ids: Vec<InternalId>) -> Result<Self> {
        if ids.windows(2).any(|w| w[0] >= w[1]) {
            return Err(QuarryError::invalid_argument(
                "posting ids must be strictly ascending",
            ));
        }
        Ok(PostingList { ids })
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut cursor = PostingCursor::new(Arc::from(bytes))?;
        let mut ids = Vec::with_capacity(cursor.len());
        while let Some(id) = cursor.next_id()? {
            ids.push(id);
        }
        Ok(PostingList { ids })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.ids.len() + 2);
        encode_u64_into(self.ids.len() as u64, &mut out);
        let mut previous = 0;
        for &id in &self.ids {
            encode_u64_into(id - previous, &mut out);
            previous = id;
        }
        out
    }

    pub fn ids(&self) -> &[InternalId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: InternalId) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    /// Remove `removes` and then add `adds`; both must be sorted and unique.
    pub fn apply(&mut self, adds: &[InternalId], removes: &[InternalId]) {
        let mut kept = Vec::with_capacity(self.ids.len());
        let mut r = 0;
        for &id in &self.ids {
            while r < removes.len() && removes[r] < id {
                r += 1;
            }
            if r < removes.len() && removes[r] == id {
                continue;
            }
            kept.push(id);
        }

        let mut merged = Vec::with_capacity(kept.len() + adds.len());
        let (mut i, mut a) = (0, 0);
        while i < kept.len() && a < adds.len() {
            match kept[i].cmp(&adds[a]) {
                Ordering::Less => {
                    merged.push(kept[i]);
                    i += 1;
                }
                Ordering::Greater => {
                    merged.push(adds[a]);
                    a += 1;
                }
                Ordering::Equal => {
                    merged.push(kept[i]);
                    i += 1;
                    a += 1;
                }
            }
        }
        merged.extend_from_slice(&kept[i..]);
        merged.extend_from_slice(&adds[a..]);

        self.ids = merged;
    }
}

/// Lazily decoding cursor over encoded posting bytes.
#[derive(Clone, Debug)]
pub struct PostingCursor {
    bytes: Arc<[u8]>,
    position: usize,
    total: usize,
    remaining: usize,
    last: InternalId,
}

impl PostingCursor {
    pub fn new(bytes: Arc<[u8]>) -> Result<Self> {
        let (count, read) = decode_u64(&bytes)?;
        Ok(PostingCursor {
            bytes,
            position: read,
            total: count as usize,
            remaining: count as usize,
            last: 0,
        })
    }

    /// A cursor over no ids.
    pub fn empty() -> Self {
        PostingCursor {
            bytes: Arc::from(&[0u8][..]),
            position: 1,
            total: 0,
            remaining: 0,
            last: 0,
        }
    }

    /// Total number of ids in the list.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Ids not yet returned.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn next_id(&mut self) -> Result<Option<InternalId>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        let (delta, read) = decode_u64(&self.bytes[self.position..])?;
        if delta == 0 {
            return Err(QuarryError::corrupted("posting list is not strictly ascending"));
        }
        self.position += read;
        self.remaining -= 1;
        self.last += delta;
        Ok(Some(self.last))
    }

    /// Decode up to `buffer.len()` ids.
    pub fn fill(&mut self, buffer: &mut [InternalId]) -> Result<usize> {
        let mut written = 0;
        while written < buffer.len() {
            match self.next_id()? {
                Some(id) => {
                    buffer[written] = id;
                    written += 1;
                }
                None => break,
            }
        }
        Ok(written)
    }
}
