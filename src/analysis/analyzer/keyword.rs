//! Keyword analyzer that treats the entire input as a single token.
//!
//! This is the analyzer used for every field that has no configured
//! pipeline: the stored value is the term, byte for byte.
//!
//! # Examples
//!
//! ```
//! use quarry::analysis::analyzer::analyzer::Analyzer;
//! use quarry::analysis::analyzer::keyword::KeywordAnalyzer;
//!
//! let analyzer = KeywordAnalyzer::new();
//! let terms = analyzer.terms(b"entry/1").unwrap();
//!
//! assert_eq!(terms, vec![b"entry/1".to_vec()]);
//! ```

use crate::analysis::analyzer::analyzer::Analyzer;
use crate::analysis::token::TokenStream;
use crate::analysis::tokenizer::Tokenizer;
use crate::analysis::tokenizer::whole::WholeTokenizer;
use crate::error::Result;

/// Analyzer that emits the whole value as one untransformed term.
#[derive(Clone, Debug, Default)]
pub struct KeywordAnalyzer {
    tokenizer: WholeTokenizer,
}

impl KeywordAnalyzer {
    pub fn new() -> Self {
        KeywordAnalyzer {
            tokenizer: WholeTokenizer::new(),
        }
    }
}

impl Analyzer for KeywordAnalyzer {
    fn analyze(&self, input: &[u8]) -> Result<TokenStream> {
        self.tokenizer.tokenize(input)
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}
