//! The [`Match`] contract.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::error::{QuarryError, Result};
use crate::index::InternalId;
use crate::query::inspect::InspectionNode;

/// How far [`Match::count`] can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// A rough upper bound.
    Low,
    /// An upper bound that is usually close.
    Normal,
    /// The exact number of ids the match yields.
    High,
}

/// A cursor over an ascending stream of internal ids.
///
/// `fill` writes between 1 and `buffer.len()` ids and returns how many were
/// written, or returns 0 once the stream is exhausted. Exhaustion is terminal:
/// every later call returns 0 as well. An empty buffer is rejected because a
/// zero return would be indistinguishable from exhaustion.
pub trait Match: Send + Debug {
    fn fill(&mut self, buffer: &mut [InternalId]) -> Result<usize>;

    /// Number of ids this match yields, qualified by [`Match::confidence`].
    fn count(&self) -> u64;

    fn confidence(&self) -> Confidence;

    /// Describe this match and its inputs.
    fn inspect(&self) -> InspectionNode;

    /// Adjust `scores[i]` for `ids[i]`. Matches without a scoring opinion
    /// leave the scores untouched.
    fn score(&mut self, ids: &[InternalId], scores: &mut [f32]) -> Result<()> {
        check_score_buffers(ids, scores)
    }
}

impl Match for Box<dyn Match> {
    fn fill(&mut self, buffer: &mut [InternalId]) -> Result<usize> {
        (**self).fill(buffer)
    }

    fn count(&self) -> u64 {
        (**self).count()
    }

    fn confidence(&self) -> Confidence {
        (**self).confidence()
    }

    fn inspect(&self) -> InspectionNode {
        (**self).inspect()
    }

    fn score(&mut self, ids: &[InternalId], scores: &mut [f32]) -> Result<()> {
        (**self).score(ids, scores)
    }
}

/// Drain a match into a vector, pulling `buffer_size` ids at a time.
pub fn collect_ids<M: Match + ?Sized>(matcher: &mut M, buffer_size: usize) -> Result<Vec<InternalId>> {
    let mut buffer = vec![0; buffer_size];
    let mut ids = Vec::new();
    loop {
        let read = matcher.fill(&mut buffer)?;
        if read == 0 {
            return Ok(ids);
        }
        ids.extend_from_slice(&buffer[..read]);
    }
}

pub(crate) fn check_buffer(buffer: &[InternalId]) -> Result<()> {
    if buffer.is_empty() {
        return Err(QuarryError::invalid_argument("fill needs a non-empty buffer"));
    }
    Ok(())
}

pub(crate) fn check_score_buffers(ids: &[InternalId], scores: &[f32]) -> Result<()> {
    if ids.len() != scores.len() {
        return Err(QuarryError::invalid_argument(format!(
            "{} ids but {} scores",
            ids.len(),
            scores.len()
        )));
    }
    Ok(())
}
