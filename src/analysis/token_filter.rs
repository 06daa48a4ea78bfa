//! Token filters that transform token streams.
//!
//! Filters run after the tokenizer inside a
//! [`PipelineAnalyzer`](crate::analysis::analyzer::pipeline::PipelineAnalyzer).
//! A filter may rewrite term bytes, mark tokens as stopped, or cut the stream
//! short.
//!
//! # Examples
//!
//! ```
//! use quarry::analysis::token_filter::Filter;
//! use quarry::analysis::token_filter::lowercase::LowercaseFilter;
//! use quarry::analysis::token::Token;
//!
//! let filter = LowercaseFilter::new();
//! let tokens = vec![Token::new("Hello", 0), Token::new("WORLD", 1)];
//! let filtered: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(filtered[0].term, b"hello");
//! assert_eq!(filtered[1].term, b"world");
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for filters that transform token streams.
pub trait Filter: Send + Sync {
    /// Apply this filter to a token stream.
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Get the name of this filter (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod limit;
pub mod lowercase;
pub mod strip;
