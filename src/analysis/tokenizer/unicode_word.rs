//! Unicode word tokenizer implementation.
//!
//! Splits text using Unicode word boundary rules (UAX #29) and keeps only the
//! segments that contain alphanumeric characters. Input that is not valid
//! UTF-8 is emitted as a single whole token so that no bytes are silently
//! dropped from the index.
//!
//! # Examples
//!
//! ```
//! use quarry::analysis::tokenizer::Tokenizer;
//! use quarry::analysis::tokenizer::unicode_word::UnicodeWordTokenizer;
//!
//! let tokenizer = UnicodeWordTokenizer::new();
//! let tokens: Vec<_> = tokenizer.tokenize("Hello, world!".as_bytes()).unwrap().collect();
//!
//! assert_eq!(tokens[0].term, b"Hello");
//! assert_eq!(tokens[1].term, b"world");
//! ```

use unicode_segmentation::UnicodeSegmentation;

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;

/// A tokenizer that splits text on Unicode word boundaries.
#[derive(Clone, Debug, Default)]
pub struct UnicodeWordTokenizer;

impl UnicodeWordTokenizer {
    /// Create a new Unicode word tokenizer.
    pub fn new() -> Self {
        UnicodeWordTokenizer
    }
}

impl Tokenizer for UnicodeWordTokenizer {
    fn tokenize(&self, input: &[u8]) -> Result<TokenStream> {
        let Ok(text) = std::str::from_utf8(input) else {
            if input.is_empty() {
                return Ok(Box::new(std::iter::empty()));
            }
            let token = Token::with_offsets(input, 0, 0, input.len());
            return Ok(Box::new(std::iter::once(token)));
        };

        let tokens: Vec<Token> = text
            .split_word_bound_indices()
            .filter(|(_, word)| word.chars().any(|c| c.is_alphanumeric()))
            .enumerate()
            .map(|(position, (start, word))| {
                Token::with_offsets(word.as_bytes(), position, start, start + word.len())
            })
            .collect();

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "unicode_word"
    }
}
