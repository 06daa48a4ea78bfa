//! Analyzers combine a tokenizer with an ordered chain of token filters.
//!
//! - [`analyzer::Analyzer`] is the core trait.
//! - [`keyword::KeywordAnalyzer`] indexes the whole value as one term.
//! - [`pipeline::PipelineAnalyzer`] composes any tokenizer with filters.
//! - [`per_field::PerFieldAnalyzer`] selects an analyzer per field id.

#[allow(clippy::module_inception)]
pub mod analyzer;
pub mod keyword;
pub mod per_field;
pub mod pipeline;
