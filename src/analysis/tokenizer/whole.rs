//! Whole-value tokenizer implementation.

use super::Tokenizer;

use crate::analysis::token::{Token, TokenStream};
use crate::error::Result;

/// A tokenizer that treats the entire value as a single token.
///
/// This is the tokenizer behind the default keyword analysis: a field value is
/// indexed as one exact term.
#[derive(Clone, Debug, Default)]
pub struct WholeTokenizer;

impl WholeTokenizer {
    /// Create a new whole tokenizer.
    pub fn new() -> Self {
        WholeTokenizer
    }
}

impl Tokenizer for WholeTokenizer {
    fn tokenize(&self, input: &[u8]) -> Result<TokenStream> {
        if input.is_empty() {
            Ok(Box::new(std::iter::empty()))
        } else {
            let token = Token::with_offsets(input, 0, 0, input.len());
            Ok(Box::new(std::iter::once(token)))
        }
    }

    fn name(&self) -> &'static str {
        "whole"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_tokenizer() {
        let tokenizer = WholeTokenizer::new();
        let tokens: Vec<Token> = tokenizer.tokenize(b"hello world").unwrap().collect();

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].term, b"hello world");
        assert_eq!(tokens[0].position, 0);
        assert_eq!(tokens[0].end_offset, 11);
    }

    #[test]
    fn test_whole_tokenizer_empty() {
        let tokenizer = WholeTokenizer::new();
        assert_eq!(tokenizer.tokenize(b"").unwrap().count(), 0);
    }

    #[test]
    fn test_whole_tokenizer_binary() {
        let tokens: Vec<Token> = WholeTokenizer::new()
            .tokenize(&[0xff, 0x00, 0x10])
            .unwrap()
            .collect();
        assert_eq!(tokens[0].term, vec![0xff, 0x00, 0x10]);
    }
}
