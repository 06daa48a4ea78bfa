//! Lowercase filter implementation.
//!
//! Terms that are valid UTF-8 are lowercased with Unicode rules. Anything else
//! only has its ASCII letters folded, leaving other bytes untouched.

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// A filter that converts token terms to lowercase.
///
/// Stopped tokens pass through unchanged. Positions and offsets are preserved.
#[derive(Clone, Debug, Default)]
pub struct LowercaseFilter;

impl LowercaseFilter {
    /// Create a new lowercase filter.
    pub fn new() -> Self {
        LowercaseFilter
    }
}

/// Lowercase a term, Unicode-aware when the bytes are UTF-8.
pub(crate) fn lowercase_bytes(term: &[u8]) -> Vec<u8> {
    if term.is_ascii() {
        return term.to_ascii_lowercase();
    }
    match std::str::from_utf8(term) {
        Ok(text) => text.to_lowercase().into_bytes(),
        Err(_) => term.to_ascii_lowercase(),
    }
}

impl Filter for LowercaseFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        Ok(Box::new(tokens.map(|token| {
            if token.is_stopped() {
                token
            } else {
                let lowered = lowercase_bytes(&token.term);
                token.with_term(lowered)
            }
        })))
    }

    fn name(&self) -> &'static str {
        "lowercase"
    }
}
