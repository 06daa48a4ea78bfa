//! Limit filter implementation.

use super::Filter;

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// A filter that keeps at most `limit` tokens of the stream.
#[derive(Clone, Debug)]
pub struct LimitFilter {
    limit: usize,
}

impl LimitFilter {
    /// Create a new limit filter with the given limit.
    pub fn new(limit: usize) -> Self {
        LimitFilter { limit }
    }

    /// Get the limit.
    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Filter for LimitFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        Ok(Box::new(tokens.take(self.limit)))
    }

    fn name(&self) -> &'static str {
        "limit"
    }
}
