//! Regex-based tokenizer implementation.

use std::sync::Arc;

use regex::bytes::Regex;

use super::Tokenizer;
use crate::analysis::token::{Token, TokenStream};
use crate::error::{QuarryError, Result};

/// A tokenizer that extracts tokens with a regular expression.
///
/// Matching runs over bytes (`regex::bytes`), so arbitrary binary values can
/// be tokenized.
#[derive(Clone, Debug)]
pub struct RegexTokenizer {
    /// The regex pattern used to extract tokens
    pattern: Arc<Regex>,
    /// Whether to extract gaps (bytes between matches) instead of matches
    gaps: bool,
}

impl RegexTokenizer {
    /// Create a new regex tokenizer with the default pattern `\w+`.
    pub fn new() -> Result<Self> {
        Self::with_pattern(r"\w+")
    }

    /// Create a new regex tokenizer with a custom pattern.
    pub fn with_pattern(pattern: &str) -> Result<Self> {
        Ok(RegexTokenizer {
            pattern: Arc::new(compile(pattern)?),
            gaps: false,
        })
    }

    /// Create a tokenizer that extracts gaps (bytes between matches) instead of matches.
    pub fn with_gaps(pattern: &str) -> Result<Self> {
        Ok(RegexTokenizer {
            pattern: Arc::new(compile(pattern)?),
            gaps: true,
        })
    }

    /// Get the regex pattern used by this tokenizer.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Check if this tokenizer extracts gaps.
    pub fn gaps(&self) -> bool {
        self.gaps
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| QuarryError::analysis(format!("Invalid regex pattern: {e}")))
}

impl Tokenizer for RegexTokenizer {
    fn tokenize(&self, input: &[u8]) -> Result<TokenStream> {
        let tokens = if self.gaps {
            let mut tokens = Vec::new();
            let mut last_end = 0;

            for mat in self.pattern.find_iter(input) {
                if mat.start() > last_end {
                    tokens.push(Token::with_offsets(
                        &input[last_end..mat.start()],
                        tokens.len(),
                        last_end,
                        mat.start(),
                    ));
                }
                last_end = mat.end();
            }
            if last_end < input.len() {
                tokens.push(Token::with_offsets(
                    &input[last_end..],
                    tokens.len(),
                    last_end,
                    input.len(),
                ));
            }
            tokens
        } else {
            self.pattern
                .find_iter(input)
                .filter(|mat| !mat.as_bytes().is_empty())
                .enumerate()
                .map(|(position, mat)| {
                    Token::with_offsets(mat.as_bytes(), position, mat.start(), mat.end())
                })
                .collect()
        };

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "regex"
    }
}
