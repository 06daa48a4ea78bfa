//! Exact term match.

use crate::error::Result;
use crate::index::InternalId;
use crate::index::postings::PostingCursor;
use crate::query::inspect::InspectionNode;
use crate::query::matcher::{Confidence, Match, check_buffer};
use crate::schema::FieldId;

/// Streams the posting list of one `(field, term)` pair.
#[derive(Debug, Clone)]
pub struct TermMatch {
    field: FieldId,
    term: Vec<u8>,
    cursor: PostingCursor,
}

impl TermMatch {
    pub fn new(field: FieldId, term: Vec<u8>, cursor: PostingCursor) -> Self {
        TermMatch {
            field,
            term,
            cursor,
        }
    }

    pub fn field(&self) -> FieldId {
        self.field
    }

    pub fn term(&self) -> &[u8] {
        &self.term
    }
}

impl Match for TermMatch {
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
        InspectionNode::new("Term")
            .with_parameter("field", self.field)
            .with_parameter("term", String::from_utf8_lossy(&self.term))
            .with_parameter("count", self.count())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::index::postings::PostingList;
    use crate::query::matcher::collect_ids;

    #[test]
    fn test_term_fill() {
        let bytes: Arc<[u8]> = PostingList::from_sorted(vec![1, 4, 9]).unwrap().encode().into();
        let mut term = TermMatch::new(1, b"lake".to_vec(), PostingCursor::new(bytes).unwrap());
        assert_eq!(term.count(), 3);
        assert_eq!(collect_ids(&mut term, 2).unwrap(), vec![1, 4, 9]);
        assert_eq!(term.fill(&mut [0; 4]).unwrap(), 0);
        assert!(term.fill(&mut []).is_err());
    }
}
