//! A match over nothing.

use crate::error::Result;
use crate::index::InternalId;
use crate::query::inspect::InspectionNode;
use crate::query::matcher::{Confidence, Match, check_buffer};

/// Yields no ids. Used for unknown fields and absent terms.
#[derive(Debug, Clone, Default)]
pub struct EmptyMatch {
    reason: Option<String>,
}

impl EmptyMatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty match remembering why it is empty, shown by `inspect`.
    pub fn because<S: Into<String>>(reason: S) -> Self {
        EmptyMatch {
            reason: Some(reason.into()),
        }
    }
}

impl Match for EmptyMatch {
    fn fill(&mut self, buffer: &mut [InternalId]) -> Result<usize> {
        check_buffer(buffer)?;
        Ok(0)
    }

    fn count(&self) -> u64 {
        0
    }

    fn confidence(&self) -> Confidence {
        Confidence::High
    }

    fn inspect(&self) -> InspectionNode {
        let node = InspectionNode::new("Empty");
        match &self.reason {
            Some(reason) => node.with_parameter("reason", reason),
            None => node,
        }
    }
}
