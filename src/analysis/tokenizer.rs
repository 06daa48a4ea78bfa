//! Tokenizers split raw field bytes into candidate tokens.

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for tokenizers that convert field bytes into tokens.
///
/// # Examples
///
/// ```
/// use quarry::analysis::token::{Token, TokenStream};
/// use quarry::analysis::tokenizer::Tokenizer;
/// use quarry::error::Result;
///
/// struct CommaTokenizer;
///
/// impl Tokenizer for CommaTokenizer {
///     fn tokenize(&self, input: &[u8]) -> Result<TokenStream> {
///         let tokens: Vec<Token> = input
///             .split(|b| *b == b',')
///             .enumerate()
///             .map(|(i, s)| Token::new(s, i))
///             .collect();
///         Ok(Box::new(tokens.into_iter()))
///     }
///
///     fn name(&self) -> &'static str {
///         "comma"
///     }
/// }
/// ```
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given bytes into a stream of tokens.
    fn tokenize(&self, input: &[u8]) -> Result<TokenStream>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod regex;
pub mod unicode_word;
pub mod whitespace;
pub mod whole;
