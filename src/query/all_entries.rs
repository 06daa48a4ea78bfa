//! Every live document of a snapshot.

use crate::error::Result;
use crate::index::InternalId;
use crate::index::postings::PostingCursor;
use crate::query::inspect::InspectionNode;
use crate::query::matcher::{Confidence, Match, check_buffer};

#[derive(Debug, Clone)]
pub struct AllEntriesMatch {
    cursor: PostingCursor,
}

impl AllEntriesMatch {
    pub fn new(cursor: PostingCursor) -> Self {
        AllEntriesMatch { cursor }
    }
}

impl Match for AllEntriesMatch {
    fn fill(&mut self, buffer: &mut [InternalId]) -> Result<usize> {
        check_buffer(buffer)?;
        self.cursor.fill(buffer)
    }

    fn count(&self) -> u64 {
        self.cursor.len() as u64
    }

    fn confidence(&self) -> Confidence {
        Confidence::High
    }

    fn inspect(&self) -> InspectionNode {
        InspectionNode::new("AllEntries").with_parameter("count", self.count())
    }
}
