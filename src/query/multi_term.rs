//! Union of many posting lists of one field.
//!
//! Term providers (`In`, prefix/suffix/substring scans, ranges, regex) all
//! reduce to "every id posted under any of these terms". The lists are merged
//! with a min-heap keyed by each cursor's current id.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};
use std::sync::Arc;

use crate::error::Result;
use crate::index::InternalId;
use crate::index::postings::PostingCursor;
use crate::query::inspect::InspectionNode;
use crate::query::matcher::{Confidence, Match, check_buffer};
use crate::schema::FieldId;

#[derive(Debug)]
pub struct MultiTermMatch {
    name: &'static str,
    field: FieldId,
    parameters: BTreeMap<String, String>,
    cursors: Vec<PostingCursor>,
    heap: BinaryHeap<Reverse<(InternalId, usize)>>,
    last: Option<InternalId>,
    total: u64,
}

impl MultiTermMatch {
    /// Merge the given encoded posting lists. `name` labels the match in
    /// [`inspect`](Match::inspect) output.
    pub fn new<I>(name: &'static str, field: FieldId, postings: I) -> Result<Self>
    where
        I: IntoIterator<Item = Arc<[u8]>>,
    {
        let mut cursors = Vec::new();
        let mut heap = BinaryHeap::new();
        let mut total = 0u64;
        for bytes in postings {
            let mut cursor = PostingCursor::new(bytes)?;
            total = total.saturating_add(cursor.len() as u64);
            if let Some(first) = cursor.next_id()? {
                heap.push(Reverse((first, cursors.len())));
                cursors.push(cursor);
            }
        }

        Ok(MultiTermMatch {
            name,
            field,
            parameters: BTreeMap::new(),
            cursors,
            heap,
            last: None,
            total,
        })
    }

    pub fn with_parameter<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.parameters.insert(key.into(), value.to_string());
        self
    }

    /// Number of non-empty posting lists being merged.
    pub fn term_count(&self) -> usize {
        self.cursors.len()
    }
}

impl Match for MultiTermMatch {
    fn fill(&mut self, buffer: &mut [InternalId]) -> Result<usize> {
        check_buffer(buffer)?;
        let mut written = 0;
        while written < buffer.len() {
            let Some(Reverse((id, source))) = self.heap.pop() else {
                break;
            };
            if let Some(next) = self.cursors[source].next_id()? {
                self.heap.push(Reverse((next, source)));
            }
            if self.last == Some(id) {
                continue;
            }
            self.last = Some(id);
            buffer[written] = id;
            written += 1;
        }
        Ok(written)
    }

    fn count(&self) -> u64 {
        self.total
    }

    fn confidence(&self) -> Confidence {
        if self.cursors.len() <= 1 {
            Confidence::High
        } else {
            Confidence::Normal
        }
    }

    fn inspect(&self) -> InspectionNode {
        let mut node = InspectionNode::new(self.name)
            .with_parameter("field", self.field)
            .with_parameter("terms", self.cursors.len())
            .with_parameter("count", self.total);
        for (key, value) in &self.parameters {
            node = node.with_parameter(key.clone(), value);
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::postings::PostingList;
    use crate::query::matcher::collect_ids;

    fn postings(ids: &[InternalId]) -> Arc<[u8]> {
        PostingList::from_sorted(ids.to_vec()).unwrap().encode().into()
    }

    #[test]
    fn test_union_deduplicates() {
        let mut union = MultiTermMatch::new(
            "In",
            1,
            vec![postings(&[1, 3, 5]), postings(&[2, 3, 6]), postings(&[]), postings(&[5, 7])],
        )
        .unwrap();
        assert_eq!(union.term_count(), 3);
        assert_eq!(union.count(), 8);
        assert_eq!(union.confidence(), Confidence::Normal);
        assert_eq!(collect_ids(&mut union, 3).unwrap(), vec![1, 2, 3, 5, 6, 7]);
        assert_eq!(union.fill(&mut [0; 8]).unwrap(), 0);
    }

    #[test]
    fn test_no_terms() {
        let mut union = MultiTermMatch::new("StartsWith", 0, Vec::new()).unwrap();
        assert_eq!(union.count(), 0);
        assert_eq!(union.fill(&mut [0; 8]).unwrap(), 0);
    }
}
