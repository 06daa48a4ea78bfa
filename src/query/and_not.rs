//! Set difference of two matches.

use crate::error::Result;
use crate::index::InternalId;
use crate::query::buffered::BufferedSource;
use crate::query::inspect::InspectionNode;
use crate::query::matcher::{Confidence, Match, check_buffer};
use crate::query::merge::{difference_step, merge_into};

/// Ids of `left` that `right` does not yield.
#[derive(Debug)]
pub struct AndNotMatch {
    left: BufferedSource,
    right: BufferedSource,
    exhausted: bool,
}

impl AndNotMatch {
    pub fn new(left: Box<dyn Match>, right: Box<dyn Match>, buffer_size: usize) -> Self {
        AndNotMatch {
            left: BufferedSource::new(left, buffer_size),
            right: BufferedSource::new(right, buffer_size),
            exhausted: false,
        }
    }
}

impl Match for AndNotMatch {
    fn fill(&mut self, buffer: &mut [InternalId]) -> Result<usize> {
        check_buffer(buffer)?;
        if self.exhausted {
            return Ok(0);
        }
        let (written, done) = merge_into(difference_step, &mut self.left, &mut self.right, buffer)?;
        self.exhausted = done;
        Ok(written)
    }

    fn count(&self) -> u64 {
        self.left.inner().count()
    }

    fn confidence(&self) -> Confidence {
        Confidence::Low
    }

    fn inspect(&self) -> InspectionNode {
        InspectionNode::new("AndNot")
            .with_parameter("count", self.count())
            .with_child(self.left.inner().inspect())
            .with_child(self.right.inner().inspect())
    }

    fn score(&mut self, ids: &[InternalId], scores: &mut [f32]) -> Result<()> {
        self.left.inner_mut().score(ids, scores)
    }
}
