//! Per-field analyzer.
//!
//! Fields without a registered analyzer fall back to the default, which is
//! [`KeywordAnalyzer`] unless configured otherwise.

use std::sync::Arc;

use ahash::AHashMap;

use crate::analysis::analyzer::analyzer::Analyzer;
use crate::analysis::analyzer::keyword::KeywordAnalyzer;
use crate::analysis::token::TokenStream;
use crate::error::Result;
use crate::schema::FieldId;

/// Selects an analyzer by field id.
#[derive(Clone)]
pub struct PerFieldAnalyzer {
    default_analyzer: Arc<dyn Analyzer>,
    field_analyzers: AHashMap<FieldId, Arc<dyn Analyzer>>,
}

impl PerFieldAnalyzer {
    /// Create a per-field analyzer with the given fallback.
    pub fn new(default_analyzer: Arc<dyn Analyzer>) -> Self {
        Self {
            default_analyzer,
            field_analyzers: AHashMap::new(),
        }
    }

    /// Register the analyzer used for one field.
    pub fn add_analyzer(&mut self, field: FieldId, analyzer: Arc<dyn Analyzer>) {
        self.field_analyzers.insert(field, analyzer);
    }

    /// The analyzer used for `field`.
    pub fn get_analyzer(&self, field: FieldId) -> &Arc<dyn Analyzer> {
        self.field_analyzers
            .get(&field)
            .unwrap_or(&self.default_analyzer)
    }

    pub fn default_analyzer(&self) -> &Arc<dyn Analyzer> {
        &self.default_analyzer
    }

    /// Analyze a value of `field`.
    pub fn analyze_field(&self, field: FieldId, input: &[u8]) -> Result<TokenStream> {
        self.get_analyzer(field).analyze(input)
    }

    /// Terms produced for a value of `field`.
    pub fn field_terms(&self, field: FieldId, input: &[u8]) -> Result<Vec<Vec<u8>>> {
        self.get_analyzer(field).terms(input)
    }
}

impl Default for PerFieldAnalyzer {
    fn default() -> Self {
        Self::new(Arc::new(KeywordAnalyzer::new()))
    }
}

impl Analyzer for PerFieldAnalyzer {
    fn analyze(&self, input: &[u8]) -> Result<TokenStream> {
        // Without a field, use the default analyzer
        self.default_analyzer.analyze(input)
    }

    fn name(&self) -> &'static str {
        "per_field"
    }
}

impl std::fmt::Debug for PerFieldAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut fields: Vec<_> = self
            .field_analyzers
            .iter()
            .map(|(id, a)| (*id, a.name()))
            .collect();
        fields.sort_unstable();
        f.debug_struct("PerFieldAnalyzer")
            .field("default", &self.default_analyzer.name())
            .field("fields", &fields)
            .finish()
    }
}
