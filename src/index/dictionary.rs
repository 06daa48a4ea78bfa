//! Term dictionaries and field statistics over a snapshot.
//!
//! Each field has three dictionaries that map a sorted key to a posting list:
//! text terms, long companions and double companions. Absent terms yield empty
//! results, never errors.

use std::ops::Bound;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{QuarryError, Result};
use crate::index::keys::{self, DOUBLE, FIELD_PREFIX_LEN, LONG, TERM};
use crate::index::postings::PostingCursor;
use crate::schema::FieldId;
use crate::storage::{Snapshot, prefix_successor};

/// A dictionary entry: the term (or sortable number) and its posting bytes.
pub type DictionaryEntry<'s> = (&'s [u8], Arc<[u8]>);

/// Boxed iterator over dictionary entries.
pub type DictionaryIter<'s> = Box<dyn DoubleEndedIterator<Item = DictionaryEntry<'s>> + 's>;

/// What a field has been written as, accumulated over all commits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStats {
    flags: u8,
}

impl FieldStats {
    const HAS_VALUES: u8 = 1;
    const HAS_TUPLES: u8 = 1 << 1;
    const HAS_LISTS: u8 = 1 << 2;

    pub fn from_byte(flags: u8) -> Self {
        FieldStats { flags }
    }

    pub fn to_byte(self) -> u8 {
        self.flags
    }

    pub fn has_values(self) -> bool {
        self.flags & Self::HAS_VALUES != 0
    }

    pub fn has_tuples(self) -> bool {
        self.flags & Self::HAS_TUPLES != 0
    }

    pub fn has_lists(self) -> bool {
        self.flags & Self::HAS_LISTS != 0
    }

    pub(crate) fn record(&mut self, tuple: bool, list: bool) {
        self.flags |= Self::HAS_VALUES;
        if tuple {
            self.flags |= Self::HAS_TUPLES;
        }
        if list {
            self.flags |= Self::HAS_LISTS;
        }
    }

    pub(crate) fn merge(self, other: FieldStats) -> FieldStats {
        FieldStats {
            flags: self.flags | other.flags,
        }
    }
}

/// Read-only view of the dictionaries of one snapshot.
#[derive(Clone, Debug)]
pub struct TermDictionary {
    snapshot: Snapshot,
}

impl TermDictionary {
    pub fn new(snapshot: Snapshot) -> Self {
        TermDictionary { snapshot }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Posting bytes of an exact term.
    pub fn lookup(&self, field: FieldId, term: &[u8]) -> Option<Arc<[u8]>> {
        self.snapshot.get_shared(&keys::term_key(field, term))
    }

    /// Cursor over the postings of an exact term; empty when absent.
    pub fn postings(&self, field: FieldId, term: &[u8]) -> Result<PostingCursor> {
        match self.lookup(field, term) {
            Some(bytes) => PostingCursor::new(bytes),
            None => Ok(PostingCursor::empty()),
        }
    }

    /// Number of ids posted for an exact term.
    pub fn doc_frequency(&self, field: FieldId, term: &[u8]) -> Result<usize> {
        Ok(self.postings(field, term)?.len())
    }

    /// Every term of `field`, ascending.
    pub fn terms(&self, field: FieldId) -> DictionaryIter<'_> {
        self.scan(TERM, field, Bound::Unbounded, Bound::Unbounded)
    }

    /// Terms of `field` starting with `prefix`, ascending.
    pub fn lookup_prefix(&self, field: FieldId, prefix: &[u8]) -> DictionaryIter<'_> {
        match prefix_successor(prefix) {
            Some(end) => self.scan(TERM, field, Bound::Included(prefix), Bound::Excluded(end.as_slice())),
            None => self.scan(TERM, field, Bound::Included(prefix), Bound::Unbounded),
        }
    }

    /// Terms of `field` within byte-lexicographic bounds, ascending.
    pub fn lookup_range(
        &self,
        field: FieldId,
        lower: Bound<&[u8]>,
        upper: Bound<&[u8]>,
    ) -> DictionaryIter<'_> {
        self.scan(TERM, field, lower, upper)
    }

    /// Long companions of `field` within numeric bounds, ascending.
    pub fn long_range(&self, field: FieldId, lower: Bound<i64>, upper: Bound<i64>) -> DictionaryIter<'_> {
        let lower = lower.map(keys::sortable_i64);
        let upper = upper.map(keys::sortable_i64);
        self.scan(
            LONG,
            field,
            as_slice_bound(&lower),
            as_slice_bound(&upper),
        )
    }

    /// Double companions of `field` within numeric bounds, ascending.
    ///
    /// A NaN bound matches nothing.
    pub fn double_range(&self, field: FieldId, lower: Bound<f64>, upper: Bound<f64>) -> DictionaryIter<'_> {
        let (Some(lower), Some(upper)) = (sortable_bound(lower), sortable_bound(upper)) else {
            return Box::new(std::iter::empty());
        };
        self.scan(
            DOUBLE,
            field,
            as_slice_bound(&lower),
            as_slice_bound(&upper),
        )
    }

    /// Number of distinct terms of `field`.
    pub fn term_count(&self, field: FieldId) -> usize {
        self.terms(field).count()
    }

    /// Accumulated statistics of `field`.
    pub fn field_stats(&self, field: FieldId) -> Result<FieldStats> {
        match self.snapshot.get(&keys::field_key(field)) {
            None => Ok(FieldStats::default()),
            Some([flags]) => Ok(FieldStats::from_byte(*flags)),
            Some(_) => Err(QuarryError::corrupted(format!(
                "field statistics of field {field} are malformed"
            ))),
        }
    }

    fn scan(&self, tag: u8, field: FieldId, lower: Bound<&[u8]>, upper: Bound<&[u8]>) -> DictionaryIter<'_> {
        let prefix = keys::field_prefix(tag, field);
        let with_prefix = |suffix: &[u8]| {
            let mut key = prefix.clone();
            key.extend_from_slice(suffix);
            key
        };

        let lower = match lower {
            Bound::Included(s) => Bound::Included(with_prefix(s)),
            Bound::Excluded(s) => Bound::Excluded(with_prefix(s)),
            Bound::Unbounded => Bound::Included(prefix.clone()),
        };
        let upper = match upper {
            Bound::Included(s) => Bound::Included(with_prefix(s)),
            Bound::Excluded(s) => Bound::Excluded(with_prefix(s)),
            Bound::Unbounded => match prefix_successor(&prefix) {
                Some(end) => Bound::Excluded(end),
                None => Bound::Unbounded,
            },
        };

        Box::new(
            self.snapshot
                .range_shared(as_slice_bound(&lower), as_slice_bound(&upper))
                .map(|(key, postings)| (&key[FIELD_PREFIX_LEN..], postings)),
        )
    }
}

fn sortable_bound(bound: Bound<f64>) -> Option<Bound<[u8; 8]>> {
    Some(match bound {
        Bound::Included(v) => Bound::Included(keys::sortable_f64(v)?),
        Bound::Excluded(v) => Bound::Excluded(keys::sortable_f64(v)?),
        Bound::Unbounded => Bound::Unbounded,
    })
}

fn as_slice_bound<T: AsRef<[u8]>>(bound: &Bound<T>) -> Bound<&[u8]> {
    match bound {
        Bound::Included(v) => Bound::Included(v.as_ref()),
        Bound::Excluded(v) => Bound::Excluded(v.as_ref()),
        Bound::Unbounded => Bound::Unbounded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::postings::PostingList;
    use crate::storage::memory::MemoryStorage;
    use crate::storage::{Storage, WriteBatch};

    fn dictionary() -> TermDictionary {
        let storage = MemoryStorage::default();
        let mut batch = WriteBatch::new();
        let postings = PostingList::from_sorted(vec![1, 2]).unwrap().encode();
        for term in ["lake", "mountain", "road", "sky"] {
            batch.put(keys::term_key(1, term.as_bytes()), postings.clone());
        }
        batch.put(keys::term_key(2, b"other"), postings.clone());
        for v in [-5i64, 0, 7, 100] {
            batch.put(keys::long_key(1, v), postings.clone());
            batch.put(keys::double_key(1, v as f64 + 0.5).unwrap(), postings.clone());
        }
        let mut stats = FieldStats::default();
        stats.record(true, false);
        batch.put(keys::field_key(1), vec![stats.to_byte()]);
        storage.commit(batch).unwrap();
        TermDictionary::new(storage.snapshot().unwrap())
    }

    fn terms(iter: DictionaryIter<'_>) -> Vec<String> {
        iter.map(|(t, _)| String::from_utf8_lossy(t).into_owned()).collect()
    }

    #[test]
    fn test_term_scans() {
        let dict = dictionary();
        assert_eq!(terms(dict.terms(1)), vec!["lake", "mountain", "road", "sky"]);
        assert_eq!(terms(dict.lookup_prefix(1, b"r")), vec!["road"]);
        assert_eq!(
            terms(dict.lookup_range(1, Bound::Excluded(&b"lake"[..]), Bound::Included(&b"road"[..]))),
            vec!["mountain", "road"]
        );
        assert_eq!(dict.term_count(2), 1);
        assert_eq!(dict.term_count(3), 0);
        assert_eq!(dict.doc_frequency(1, b"sky").unwrap(), 2);
        assert_eq!(dict.doc_frequency(1, b"absent").unwrap(), 0);
    }

    #[test]
    fn test_numeric_scans() {
        let dict = dictionary();
        let longs: Vec<i64> = dict
            .long_range(1, Bound::Included(0), Bound::Unbounded)
            .map(|(k, _)| keys::decode_sortable_i64(k).unwrap())
            .collect();
        assert_eq!(longs, vec![0, 7, 100]);

        let doubles: Vec<f64> = dict
            .double_range(1, Bound::Unbounded, Bound::Excluded(7.5))
            .map(|(k, _)| keys::decode_sortable_f64(k).unwrap())
            .collect();
        assert_eq!(doubles, vec![-4.5, 0.5]);

        assert_eq!(dict.double_range(1, Bound::Included(f64::NAN), Bound::Unbounded).count(), 0);
    }

    #[test]
    fn test_field_stats() {
        let dict = dictionary();
        let stats = dict.field_stats(1).unwrap();
        assert!(stats.has_values() && stats.has_tuples() && !stats.has_lists());
        assert!(!dict.field_stats(2).unwrap().has_values());
    }
}
