//! Core analyzer trait definition.
//!
//! An analyzer is a pure function from field bytes to a token stream. The
//! index writer and the searcher must share analyzer instances (or identical
//! configuration) for term lookups to line up.
//!
//! ```text
//! Raw bytes → Tokenizer → Filter 1 → ... → Filter N → terms
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for analyzers that convert raw field bytes into processed tokens.
pub trait Analyzer: Send + Sync {
    /// Analyze the given bytes and return a stream of tokens.
    fn analyze(&self, input: &[u8]) -> Result<TokenStream>;

    /// Get the name of this analyzer (for debugging and configuration).
    fn name(&self) -> &'static str;

    /// Analyze the input and collect the term bytes of every token that was
    /// not stopped, in stream order.
    fn terms(&self, input: &[u8]) -> Result<Vec<Vec<u8>>> {
        Ok(self
            .analyze(input)?
            .filter(|token| !token.is_stopped())
            .map(|token| token.term)
            .collect())
    }
}
