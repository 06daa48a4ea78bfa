//! Strip filter implementation.

use super::Filter;
use crate::analysis::token::TokenStream;
use crate::error::Result;

/// A filter that removes leading and trailing ASCII whitespace from terms.
///
/// Terms that become empty are stopped.
#[derive(Clone, Debug, Default)]
pub struct StripFilter;

impl StripFilter {
    /// Create a new strip filter.
    pub fn new() -> Self {
        StripFilter
    }
}

impl Filter for StripFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        Ok(Box::new(tokens.map(|token| {
            if token.is_stopped() {
                return token;
            }
            let trimmed = token.term.trim_ascii();
            if trimmed.is_empty() {
                token.stop()
            } else if trimmed.len() == token.term.len() {
                token
            } else {
                let trimmed = trimmed.to_vec();
                token.with_term(trimmed)
            }
        })))
    }

    fn name(&self) -> &'static str {
        "strip"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;

    #[test]
    fn test_strip_filter() {
        let filter = StripFilter::new();
        let tokens = vec![
            Token::new("  hello  ", 0),
            Token::new("world", 1),
            Token::new("   ", 2),
        ];

        let result: Vec<Token> = filter
            .filter(Box::new(tokens.into_iter()))
            .unwrap()
            .collect();

        assert_eq!(result.len(), 3);
        assert_eq!(result[0].term, b"hello");
        assert_eq!(result[1].term, b"world");
        assert!(result[2].is_stopped());
    }
}
