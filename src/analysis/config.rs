//! Serializable analyzer configuration.
//!
//! Analyzer trait objects cannot be serialized, so index configuration refers
//! to analyzers through [`AnalyzerConfig`] and builds the pipelines when the
//! index is opened.
//!
//! ```
//! use quarry::analysis::config::AnalyzerConfig;
//!
//! let config: AnalyzerConfig = serde_json::from_str(
//!     r#"{ "type": "whitespace", "filters": [{ "type": "lowercase" }] }"#,
//! ).unwrap();
//! let analyzer = config.build().unwrap();
//!
//! assert_eq!(analyzer.terms(b"Sky Space").unwrap(), vec![b"sky".to_vec(), b"space".to_vec()]);
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::analyzer::Analyzer;
use crate::analysis::analyzer::keyword::KeywordAnalyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::token_filter::Filter;
use crate::analysis::token_filter::limit::LimitFilter;
use crate::analysis::token_filter::lowercase::LowercaseFilter;
use crate::analysis::token_filter::strip::StripFilter;
use crate::analysis::tokenizer::Tokenizer;
use crate::analysis::tokenizer::regex::RegexTokenizer;
use crate::analysis::tokenizer::unicode_word::UnicodeWordTokenizer;
use crate::analysis::tokenizer::whitespace::WhitespaceTokenizer;
use crate::analysis::tokenizer::whole::WholeTokenizer;
use crate::error::{QuarryError, Result};

/// Analyzer pipeline description: a tokenizer plus its ordered filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalyzerConfig {
    /// The whole value is one term.
    Keyword {
        #[serde(default)]
        filters: Vec<FilterConfig>,
    },
    /// Split on ASCII whitespace.
    Whitespace {
        #[serde(default)]
        filters: Vec<FilterConfig>,
    },
    /// Split on Unicode word boundaries.
    UnicodeWord {
        #[serde(default)]
        filters: Vec<FilterConfig>,
    },
    /// Terms are the matches of `pattern`.
    Regex {
        pattern: String,
        #[serde(default)]
        filters: Vec<FilterConfig>,
    },
}

/// One token filter of a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterConfig {
    Lowercase,
    Strip,
    Limit { max_tokens: usize },
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig::Keyword {
            filters: Vec::new(),
        }
    }
}

impl AnalyzerConfig {
    /// Configured filters, in application order.
    pub fn filters(&self) -> &[FilterConfig] {
        match self {
            AnalyzerConfig::Keyword { filters }
            | AnalyzerConfig::Whitespace { filters }
            | AnalyzerConfig::UnicodeWord { filters }
            | AnalyzerConfig::Regex { filters, .. } => filters,
        }
    }

    /// Build the analyzer described by this configuration.
    pub fn build(&self) -> Result<Arc<dyn Analyzer>> {
        let tokenizer: Arc<dyn Tokenizer> = match self {
            AnalyzerConfig::Keyword { filters } if filters.is_empty() => {
                return Ok(Arc::new(KeywordAnalyzer::new()));
            }
            AnalyzerConfig::Keyword { .. } => Arc::new(WholeTokenizer::new()),
            AnalyzerConfig::Whitespace { .. } => Arc::new(WhitespaceTokenizer::new()),
            AnalyzerConfig::UnicodeWord { .. } => Arc::new(UnicodeWordTokenizer::new()),
            AnalyzerConfig::Regex { pattern, .. } => Arc::new(RegexTokenizer::with_pattern(pattern)?),
        };

        let mut analyzer = PipelineAnalyzer::new(tokenizer);
        for filter in self.filters() {
            analyzer = analyzer.add_filter(filter.build()?);
        }
        Ok(Arc::new(analyzer))
    }
}

impl FilterConfig {
    /// Build the filter described by this configuration.
    pub fn build(&self) -> Result<Arc<dyn Filter>> {
        Ok(match self {
            FilterConfig::Lowercase => Arc::new(LowercaseFilter::new()),
            FilterConfig::Strip => Arc::new(StripFilter::new()),
            FilterConfig::Limit { max_tokens: 0 } => {
                return Err(QuarryError::invalid_config(
                    "limit filter needs max_tokens > 0",
                ));
            }
            FilterConfig::Limit { max_tokens } => Arc::new(LimitFilter::new(*max_tokens)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_keyword() {
        let analyzer = AnalyzerConfig::default().build().unwrap();
        assert_eq!(analyzer.name(), "keyword");
        assert_eq!(analyzer.terms(b"A b").unwrap(), vec![b"A b".to_vec()]);
    }

    #[test]
    fn test_regex_config_roundtrip() {
        let config = AnalyzerConfig::Regex {
            pattern: r"[a-z]+".to_string(),
            filters: vec![FilterConfig::Limit { max_tokens: 1 }],
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""type":"regex""#));
        let back: AnalyzerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);

        let analyzer = back.build().unwrap();
        assert_eq!(analyzer.terms(b"ab cd").unwrap(), vec![b"ab".to_vec()]);
    }

    #[test]
    fn test_invalid_configs() {
        let bad_pattern = AnalyzerConfig::Regex {
            pattern: "(".to_string(),
            filters: Vec::new(),
        };
        assert!(bad_pattern.build().is_err());
        assert!(FilterConfig::Limit { max_tokens: 0 }.build().is_err());
    }
}
