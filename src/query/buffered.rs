//! Peekable, chunk-pulling view of a match.

use crate::error::Result;
use crate::index::InternalId;
use crate::query::matcher::Match;

/// Pulls ids from an inner match one buffer at a time and hands them out one
/// by one. Once the inner match reports exhaustion it is never called again.
#[derive(Debug)]
pub struct BufferedSource {
    inner: Box<dyn Match>,
    buffer: Vec<InternalId>,
    position: usize,
    len: usize,
    exhausted: bool,
}

impl BufferedSource {
    pub fn new(inner: Box<dyn Match>, capacity: usize) -> Self {
        BufferedSource {
            inner,
            buffer: vec![0; capacity.max(1)],
            position: 0,
            len: 0,
            exhausted: false,
        }
    }

    /// The next id without consuming it.
    pub fn peek(&mut self) -> Result<Option<InternalId>> {
        if self.position == self.len {
            if self.exhausted {
                return Ok(None);
            }
            self.len = self.inner.fill(&mut self.buffer)?;
            self.position = 0;
            if self.len == 0 {
                self.exhausted = true;
                return Ok(None);
            }
        }
        Ok(Some(self.buffer[self.position]))
    }

    /// Consume the id last returned by [`peek`](Self::peek).
    pub fn advance(&mut self) {
        if self.position < self.len {
            self.position += 1;
        }
    }

    pub fn inner(&self) -> &dyn Match {
        self.inner.as_ref()
    }

    pub fn inner_mut(&mut self) -> &mut dyn Match {
        self.inner.as_mut()
    }
}
