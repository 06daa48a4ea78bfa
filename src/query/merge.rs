//! Stateless merge steps over two ascending id streams.
//!
//! Each step function looks only at the current head of both sides and says
//! what to emit and which sides to advance. [`merge_into`] drives a step
//! function over two [`BufferedSource`]s until the output buffer is full or
//! the step reports the merge is done.

use crate::error::Result;
use crate::index::InternalId;
use crate::query::buffered::BufferedSource;

/// Outcome of comparing two stream heads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeStep {
    pub emit: Option<InternalId>,
    pub advance_left: bool,
    pub advance_right: bool,
}

impl MergeStep {
    pub const DONE: MergeStep = MergeStep {
        emit: None,
        advance_left: false,
        advance_right: false,
    };

    fn new(emit: Option<InternalId>, advance_left: bool, advance_right: bool) -> Self {
        MergeStep {
            emit,
            advance_left,
            advance_right,
        }
    }

    pub fn is_done(&self) -> bool {
        !self.advance_left && !self.advance_right
    }
}

/// Ids present on both sides. Done as soon as either side is exhausted.
pub fn intersect_step(left: Option<InternalId>, right: Option<InternalId>) -> MergeStep {
    match (left, right) {
        (Some(l), Some(r)) if l < r => MergeStep::new(None, true, false),
        (Some(l), Some(r)) if l > r => MergeStep::new(None, false, true),
        (Some(l), Some(_)) => MergeStep::new(Some(l), true, true),
        _ => MergeStep::DONE,
    }
}

/// Ids present on either side, each once.
pub fn union_step(left: Option<InternalId>, right: Option<InternalId>) -> MergeStep {
    match (left, right) {
        (None, None) => MergeStep::DONE,
        (Some(l), None) => MergeStep::new(Some(l), true, false),
        (None, Some(r)) => MergeStep::new(Some(r), false, true),
        (Some(l), Some(r)) if l < r => MergeStep::new(Some(l), true, false),
        (Some(l), Some(r)) if l > r => MergeStep::new(Some(r), false, true),
        (Some(l), Some(_)) => MergeStep::new(Some(l), true, true),
    }
}

/// Ids of the left side that are absent from the right side.
pub fn difference_step(left: Option<InternalId>, right: Option<InternalId>) -> MergeStep {
    match (left, right) {
        (None, _) => MergeStep::DONE,
        (Some(l), None) => MergeStep::new(Some(l), true, false),
        (Some(l), Some(r)) if l < r => MergeStep::new(Some(l), true, false),
        (Some(l), Some(r)) if l > r => MergeStep::new(None, false, true),
        (Some(_), Some(_)) => MergeStep::new(None, true, true),
    }
}

/// Run `step` until `buffer` is full or the merge is done. Returns the number
/// of ids written and whether the merge is done.
pub fn merge_into<F>(
    step: F,
    left: &mut BufferedSource,
    right: &mut BufferedSource,
    buffer: &mut [InternalId],
) -> Result<(usize, bool)>
where
    F: Fn(Option<InternalId>, Option<InternalId>) -> MergeStep,
{
    let mut written = 0;
    while written < buffer.len() {
        let next = step(left.peek()?, right.peek()?);
        if next.is_done() {
            return Ok((written, true));
        }
        if next.advance_left {
            left.advance();
        }
        if next.advance_right {
            right.advance();
        }
        if let Some(id) = next.emit {
            buffer[written] = id;
            written += 1;
        }
    }
    Ok((written, false))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(step: fn(Option<InternalId>, Option<InternalId>) -> MergeStep, left: &[u64], right: &[u64]) -> Vec<u64> {
        let (mut l, mut r) = (0, 0);
        let mut out = Vec::new();
        loop {
            let next = step(left.get(l).copied(), right.get(r).copied());
            if next.is_done() {
                return out;
            }
            out.extend(next.emit);
            l += next.advance_left as usize;
            r += next.advance_right as usize;
        }
    }

    #[test]
    fn test_steps() {
        let left = [1, 3, 5, 7];
        let right = [3, 4, 7, 9];
        assert_eq!(run(intersect_step, &left, &right), vec![3, 7]);
        assert_eq!(run(union_step, &left, &right), vec![1, 3, 4, 5, 7, 9]);
        assert_eq!(run(difference_step, &left, &right), vec![1, 5]);
        assert_eq!(run(intersect_step, &left, &[]), Vec::<u64>::new());
        assert_eq!(run(difference_step, &[], &right), Vec::<u64>::new());
    }
}
