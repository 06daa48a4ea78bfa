//! Ordering a match by a field's stored value.
//!
//! Sorting needs every id up front, so [`SortingMatch`] drains its input at
//! construction, reads the sort key of each id from the stored entries and
//! then streams the ordered (and optionally truncated) ids. Results are no
//! longer in ascending id order.

use std::cmp::Ordering;

use log::debug;

use crate::entry::{EntryValue, IndexEntryReader};
use crate::error::{QuarryError, Result};
use crate::index::InternalId;
use crate::index::keys;
use crate::query::inspect::InspectionNode;
use crate::query::matcher::{Confidence, Match, check_buffer, collect_ids};
use crate::schema::FieldId;
use crate::storage::Snapshot;

/// Sort key of one document.
///
/// Numeric keys order before text keys and documents without a value order
/// last, whatever the direction.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Numeric { double: f64, long: i64 },
    Text(Vec<u8>),
    Missing,
}

impl SortKey {
    pub fn from_value(value: Option<&EntryValue<'_>>) -> Self {
        match value {
            None => SortKey::Missing,
            Some(EntryValue {
                numeric: Some((long, double)),
                ..
            }) => SortKey::Numeric {
                double: *double,
                long: *long,
            },
            Some(value) => SortKey::Text(value.bytes.to_vec()),
        }
    }

    fn class(&self) -> u8 {
        match self {
            SortKey::Numeric { .. } => 0,
            SortKey::Text(_) => 1,
            SortKey::Missing => 2,
        }
    }

    /// Compare two keys. `descending` reverses the order within a class only.
    pub fn compare(&self, other: &SortKey, descending: bool) -> Ordering {
        let within = match (self, other) {
            (
                SortKey::Numeric { double: a, long: la },
                SortKey::Numeric { double: b, long: lb },
            ) => a.total_cmp(b).then(la.cmp(lb)),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            _ => return self.class().cmp(&other.class()),
        };
        if descending { within.reverse() } else { within }
    }
}

/// Ids of an input match ordered by one field. Equal keys keep ascending id
/// order in both directions.
#[derive(Debug)]
pub struct SortingMatch {
    field: Option<FieldId>,
    descending: bool,
    take: Option<usize>,
    sorted: Vec<InternalId>,
    position: usize,
    total: usize,
    input: InspectionNode,
}

impl SortingMatch {
    pub fn new(
        mut input: Box<dyn Match>,
        snapshot: &Snapshot,
        field: Option<FieldId>,
        descending: bool,
        take: Option<usize>,
        buffer_size: usize,
    ) -> Result<Self> {
        let inspection = input.inspect();
        let ids = collect_ids(&mut input, buffer_size.max(1))?;
        let total = ids.len();

        let mut keyed = Vec::with_capacity(ids.len());
        for id in ids {
            let key = match field {
                Some(field) => {
                    let entry = snapshot.get(&keys::entry_key(id)).ok_or_else(|| {
                        QuarryError::corrupted(format!("document {id} is posted but has no entry"))
                    })?;
                    let reader = IndexEntryReader::new(entry)?;
                    SortKey::from_value(reader.first_value(field)?.as_ref())
                }
                None => SortKey::Missing,
            };
            keyed.push((key, id));
        }
        keyed.sort_unstable_by(|(a, a_id), (b, b_id)| a.compare(b, descending).then(a_id.cmp(b_id)));

        let mut sorted: Vec<InternalId> = keyed.into_iter().map(|(_, id)| id).collect();
        if let Some(take) = take {
            sorted.truncate(take);
        }
        debug!(
            "sorted {total} ids by field {field:?} ({}), emitting {}",
            if descending { "descending" } else { "ascending" },
            sorted.len()
        );

        Ok(SortingMatch {
            field,
            descending,
            take,
            sorted,
            position: 0,
            total,
            input: inspection,
        })
    }

    /// Number of ids the input matched, before `take` truncation.
    pub fn total_results(&self) -> usize {
        self.total
    }
}

impl Match for SortingMatch {
    fn fill(&mut self, buffer: &mut [InternalId]) -> Result<usize> {
        check_buffer(buffer)?;
        let remaining = &self.sorted[self.position..];
        let written = remaining.len().min(buffer.len());
        buffer[..written].copy_from_slice(&remaining[..written]);
        self.position += written;
        Ok(written)
    }

    fn count(&self) -> u64 {
        self.sorted.len() as u64
    }

    fn confidence(&self) -> Confidence {
        Confidence::High
    }

    fn inspect(&self) -> InspectionNode {
        let name = if self.descending {
            "OrderByDescending"
        } else {
            "OrderByAscending"
        };
        let mut node = InspectionNode::new(name).with_parameter("total_results", self.total);
        if let Some(field) = self.field {
            node = node.with_parameter("field", field);
        }
        if let Some(take) = self.take {
            node = node.with_parameter("take", take);
        }
        node.with_child(self.input.clone())
    }
}
