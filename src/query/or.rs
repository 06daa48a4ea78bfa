//! Union of two matches.

use crate::error::Result;
use crate::index::InternalId;
use crate::query::buffered::BufferedSource;
use crate::query::inspect::InspectionNode;
use crate::query::matcher::{Confidence, Match, check_buffer, check_score_buffers};
use crate::query::merge::{merge_into, union_step};

#[derive(Debug)]
pub struct OrMatch {
    left: BufferedSource,
    right: BufferedSource,
    exhausted: bool,
}

impl OrMatch {
    pub fn new(left: Box<dyn Match>, right: Box<dyn Match>, buffer_size: usize) -> Self {
        OrMatch {
            left: BufferedSource::new(left, buffer_size),
            right: BufferedSource::new(right, buffer_size),
            exhausted: false,
        }
    }
}

impl Match for OrMatch {
    fn fill(&mut self, buffer: &mut [InternalId]) -> Result<usize> {
        check_buffer(buffer)?;
        if self.exhausted {
            return Ok(0);
        }
        let (written, done) = merge_into(union_step, &mut self.left, &mut self.right, buffer)?;
        self.exhausted = done;
        Ok(written)
    }

    fn count(&self) -> u64 {
        self.left
            .inner()
            .count()
            .saturating_add(self.right.inner().count())
    }

    fn confidence(&self) -> Confidence {
        Confidence::Normal
    }

    fn inspect(&self) -> InspectionNode {
        InspectionNode::new("Or")
            .with_parameter("count", self.count())
            .with_child(self.left.inner().inspect())
            .with_child(self.right.inner().inspect())
    }

    fn score(&mut self, ids: &[InternalId], scores: &mut [f32]) -> Result<()> {
        check_score_buffers(ids, scores)?;
        self.left.inner_mut().score(ids, scores)?;
        self.right.inner_mut().score(ids, scores)
    }
}
