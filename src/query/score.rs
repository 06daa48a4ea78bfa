//! Scoring hooks.
//!
//! The core ranks nothing on its own. A [`ScoreFunction`] attached through
//! [`BoostMatch`] multiplies into whatever scores the caller passes to
//! [`Match::score`], which lets callers plug in relevance while the match
//! itself keeps yielding ids in the same order.

use std::fmt::Debug;
use std::sync::Arc;

use crate::error::Result;
use crate::index::InternalId;
use crate::query::inspect::InspectionNode;
use crate::query::matcher::{Confidence, Match, check_score_buffers};

pub trait ScoreFunction: Send + Sync + Debug {
    fn score(&self, id: InternalId) -> f32;

    fn name(&self) -> &'static str;
}

/// The same score for every id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantScore(pub f32);

impl ScoreFunction for ConstantScore {
    fn score(&self, _id: InternalId) -> f32 {
        self.0
    }

    fn name(&self) -> &'static str {
        "constant"
    }
}

/// Wraps a match and multiplies its scores by a function of the id.
#[derive(Debug)]
pub struct BoostMatch {
    inner: Box<dyn Match>,
    function: Arc<dyn ScoreFunction>,
}

impl BoostMatch {
    pub fn new(inner: Box<dyn Match>, function: Arc<dyn ScoreFunction>) -> Self {
        BoostMatch { inner, function }
    }
}

impl Match for BoostMatch {
    fn fill(&mut self, buffer: &mut [InternalId]) -> Result<usize> {
        self.inner.fill(buffer)
    }

    fn count(&self) -> u64 {
        self.inner.count()
    }

    fn confidence(&self) -> Confidence {
        self.inner.confidence()
    }

    fn inspect(&self) -> InspectionNode {
        InspectionNode::new("Boost")
            .with_parameter("function", self.function.name())
            .with_child(self.inner.inspect())
    }

    fn score(&mut self, ids: &[InternalId], scores: &mut [f32]) -> Result<()> {
        check_score_buffers(ids, scores)?;
        self.inner.score(ids, scores)?;
        for (id, score) in ids.iter().zip(scores.iter_mut()) {
            *score *= self.function.score(*id);
        }
        Ok(())
    }
}
