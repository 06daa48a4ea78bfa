//! Materialized, replayable matches.

use std::sync::Arc;

use crate::error::{QuarryError, Result};
use crate::index::InternalId;
use crate::query::inspect::InspectionNode;
use crate::query::matcher::{Confidence, Match, check_buffer, collect_ids};

/// Holds every id of a match so it can be consumed more than once.
///
/// Each [`replay`](MemoizedMatch::replay) is an independent cursor over the
/// same shared ids.
#[derive(Debug, Clone)]
pub struct MemoizedMatch {
    ids: Arc<[InternalId]>,
    position: usize,
    input: Option<InspectionNode>,
}

impl MemoizedMatch {
    /// Drain `input` into memory.
    pub fn new(mut input: Box<dyn Match>, buffer_size: usize) -> Result<Self> {
        let inspection = input.inspect();
        let ids = collect_ids(&mut input, buffer_size.max(1))?;
        Ok(MemoizedMatch {
            ids: ids.into(),
            position: 0,
            input: Some(inspection),
        })
    }

    /// A match over already known, strictly ascending ids.
    pub fn from_sorted(ids: Vec<InternalId>) -> Result<Self> {
        if ids.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(QuarryError::invalid_argument("ids must be strictly ascending"));
        }
        Ok(MemoizedMatch {
            ids: ids.into(),
            position: 0,
            input: None,
        })
    }

    /// A fresh cursor over the same ids.
    pub fn replay(&self) -> MemoizedMatch {
        MemoizedMatch {
            ids: Arc::clone(&self.ids),
            position: 0,
            input: self.input.clone(),
        }
    }

    pub fn ids(&self) -> &[InternalId] {
        &self.ids
    }
}

impl Match for MemoizedMatch {
    fn fill(&mut self, buffer: &mut [InternalId]) -> Result<usize> {
        check_buffer(buffer)?;
        let remaining = &self.ids[self.position..];
        let written = remaining.len().min(buffer.len());
        buffer[..written].copy_from_slice(&remaining[..written]);
        self.position += written;
        Ok(written)
    }

    fn count(&self) -> u64 {
        self.ids.len() as u64
    }

    fn confidence(&self) -> Confidence {
        Confidence::High
    }

    fn inspect(&self) -> InspectionNode {
        let node = InspectionNode::new("Memoized").with_parameter("count", self.ids.len());
        match &self.input {
            Some(input) => node.with_child(input.clone()),
            None => node,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::and::AndMatch;
    use crate::query::and_not::AndNotMatch;
    use crate::query::or::OrMatch;

    fn ids(values: &[InternalId]) -> Box<dyn Match> {
        Box::new(MemoizedMatch::from_sorted(values.to_vec()).unwrap())
    }

    #[test]
    fn test_replay() {
        let memo = MemoizedMatch::new(ids(&[2, 4, 8]), 2).unwrap();
        let mut first = memo.replay();
        let mut second = memo.replay();
        assert_eq!(collect_ids(&mut first, 1).unwrap(), vec![2, 4, 8]);
        assert_eq!(collect_ids(&mut second, 5).unwrap(), vec![2, 4, 8]);
        assert_eq!(first.fill(&mut [0; 2]).unwrap(), 0);
        assert_eq!(memo.inspect().children[0].name, "Memoized");
    }

    #[test]
    fn test_rejects_unsorted() {
        assert!(MemoizedMatch::from_sorted(vec![3, 1]).is_err());
        assert!(MemoizedMatch::from_sorted(vec![1, 1]).is_err());
    }

    #[test]
    fn test_combinators() {
        let left = [1, 2, 3, 5, 8, 13, 21];
        let right = [2, 3, 4, 8, 16];
        for buffer in [1, 2, 3, 64] {
            let mut and = AndMatch::new(ids(&left), ids(&right), buffer);
            assert_eq!(collect_ids(&mut and, buffer).unwrap(), vec![2, 3, 8]);
            assert_eq!(and.fill(&mut [0; 4]).unwrap(), 0);

            let mut or = OrMatch::new(ids(&left), ids(&right), buffer);
            assert_eq!(
                collect_ids(&mut or, buffer).unwrap(),
                vec![1, 2, 3, 4, 5, 8, 13, 16, 21]
            );
            assert_eq!(or.fill(&mut [0; 4]).unwrap(), 0);

            let mut and_not = AndNotMatch::new(ids(&left), ids(&right), buffer);
            assert_eq!(collect_ids(&mut and_not, buffer).unwrap(), vec![1, 5, 13, 21]);
        }
    }

    #[test]
    fn test_counts() {
        let and = AndMatch::new(ids(&[1, 2]), ids(&[1, 2, 3]), 8);
        assert_eq!(and.count(), 2);
        assert_eq!(and.confidence(), Confidence::Low);
        let or = OrMatch::new(ids(&[1, 2]), ids(&[1, 2, 3]), 8);
        assert_eq!(or.count(), 5);
        assert_eq!(or.inspect().children.len(), 2);
    }
}
