//! Token types for text analysis.
//!
//! A [`Token`] carries the term bytes produced by a tokenizer together with
//! its position and byte offsets in the analyzed input. Terms are plain byte
//! sequences because field values are not required to be valid UTF-8.
//!
//! # Examples
//!
//! ```
//! use quarry::analysis::token::Token;
//!
//! let token = Token::with_offsets("world", 1, 6, 11);
//! assert_eq!(token.term, b"world");
//! assert_eq!(token.start_offset, 6);
//! assert_eq!(token.end_offset, 11);
//! ```

use std::fmt;

/// A token represents a single unit of text after tokenization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// The term bytes of the token.
    pub term: Vec<u8>,

    /// Position in the token stream (0-based).
    pub position: usize,

    /// Byte offset of the start of the token in the original input.
    pub start_offset: usize,

    /// Byte offset just past the end of the token in the original input.
    pub end_offset: usize,

    /// Whether a filter marked this token for removal.
    pub stopped: bool,
}

impl Token {
    /// Create a new token whose offsets span the term itself.
    pub fn new<T: Into<Vec<u8>>>(term: T, position: usize) -> Self {
        let term = term.into();
        let end_offset = term.len();
        Token {
            term,
            position,
            start_offset: 0,
            end_offset,
            stopped: false,
        }
    }

    /// Create a new token with explicit offsets.
    pub fn with_offsets<T: Into<Vec<u8>>>(
        term: T,
        position: usize,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        Token {
            term: term.into(),
            position,
            start_offset,
            end_offset,
            stopped: false,
        }
    }

    /// Replace the term bytes, keeping position and offsets.
    pub fn with_term<T: Into<Vec<u8>>>(mut self, term: T) -> Self {
        self.term = term.into();
        self
    }

    /// Mark the token as stopped.
    pub fn stop(mut self) -> Self {
        self.stopped = true;
        self
    }

    /// Check if the token was stopped by a filter.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Term length in bytes.
    pub fn len(&self) -> usize {
        self.term.len()
    }

    /// Check if the term is empty.
    pub fn is_empty(&self) -> bool {
        self.term.is_empty()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.term))
    }
}

/// A boxed stream of tokens flowing through the pipeline.
pub type TokenStream = Box<dyn Iterator<Item = Token> + Send>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_creation() {
        let token = Token::new("hello", 0);
        assert_eq!(token.term, b"hello");
        assert_eq!(token.position, 0);
        assert_eq!(token.start_offset, 0);
        assert_eq!(token.end_offset, 5);
        assert!(!token.is_stopped());
    }

    #[test]
    fn test_token_stop_and_display() {
        let token = Token::new("hello", 0).with_term("bye").stop();
        assert!(token.is_stopped());
        assert_eq!(token.to_string(), "bye");
        assert_eq!(token.len(), 3);
    }
}
