//! Text analysis module for Quarry.
//!
//! Analysis turns raw field bytes into the normalized terms used as
//! posting-list keys. The same pipeline runs at index time and at query time,
//! so a term looked up by a searcher is produced exactly like the terms
//! written by the index writer.

pub mod analyzer;
pub mod config;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

pub use analyzer::analyzer::Analyzer;
pub use analyzer::keyword::KeywordAnalyzer;
pub use analyzer::per_field::PerFieldAnalyzer;
pub use analyzer::pipeline::PipelineAnalyzer;
pub use config::{AnalyzerConfig, FilterConfig};
pub use token::{Token, TokenStream};
