//! Index configuration.
//!
//! Everything needed to open an index is carried by one immutable
//! [`IndexConfig`], loadable from JSON:
//!
//! ```
//! use quarry::index::config::IndexConfig;
//!
//! let config = IndexConfig::from_json_str(r#"{
//!     "fields": ["Id", "Content"],
//!     "analyzers": { "Content": { "type": "whitespace", "filters": [{ "type": "lowercase" }] } },
//!     "searcher": { "merge_buffer_size": 256 }
//! }"#).unwrap();
//!
//! assert_eq!(config.searcher.merge_buffer_size, 256);
//! assert!(config.writer.parallel_analysis);
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::per_field::PerFieldAnalyzer;
use crate::analysis::config::AnalyzerConfig;
use crate::error::{QuarryError, Result};
use crate::schema::FieldSchema;
use crate::storage::StorageConfig;

/// Complete configuration of an index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Field names; a field's id is its position in this list.
    #[serde(default)]
    pub fields: Vec<String>,

    /// Analyzer per field name. Fields not listed use keyword analysis.
    #[serde(default)]
    pub analyzers: BTreeMap<String, AnalyzerConfig>,

    /// Analyzer for fields not listed in `analyzers`.
    #[serde(default)]
    pub default_analyzer: AnalyzerConfig,

    #[serde(default)]
    pub writer: IndexWriterConfig,

    #[serde(default)]
    pub searcher: SearcherConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

impl IndexConfig {
    /// Configuration with the given fields and defaults everywhere else.
    pub fn with_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        IndexConfig {
            fields: fields.into_iter().map(Into::into).collect(),
            ..IndexConfig::default()
        }
    }

    /// Set the analyzer of one field.
    pub fn analyzer<S: Into<String>>(mut self, field: S, analyzer: AnalyzerConfig) -> Self {
        self.analyzers.insert(field.into(), analyzer);
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: IndexConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the configuration for values that cannot work.
    pub fn validate(&self) -> Result<()> {
        let schema = self.schema()?;
        for field in self.analyzers.keys() {
            if schema.field_id(field).is_none() {
                return Err(QuarryError::invalid_config(format!(
                    "analyzer configured for unknown field {field:?}"
                )));
            }
        }
        self.searcher.validate()
    }

    /// The field schema described by `fields`.
    pub fn schema(&self) -> Result<FieldSchema> {
        FieldSchema::new(self.fields.iter().cloned())
    }

    /// Build the per-field analyzer for `schema`.
    pub fn build_analyzers(&self, schema: &FieldSchema) -> Result<PerFieldAnalyzer> {
        let mut analyzers = PerFieldAnalyzer::new(self.default_analyzer.build()?);
        for (name, config) in &self.analyzers {
            let field = schema.field_id(name).ok_or_else(|| {
                QuarryError::invalid_config(format!("analyzer configured for unknown field {name:?}"))
            })?;
            analyzers.add_analyzer(field, config.build()?);
        }
        Ok(analyzers)
    }
}

/// Index writer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexWriterConfig {
    /// Analyze staged documents on the rayon thread pool.
    #[serde(default = "default_parallel_analysis")]
    pub parallel_analysis: bool,

    /// Minimum number of staged documents before analysis goes parallel.
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

fn default_parallel_analysis() -> bool {
    true
}

fn default_parallel_threshold() -> usize {
    1024
}

impl Default for IndexWriterConfig {
    fn default() -> Self {
        IndexWriterConfig {
            parallel_analysis: default_parallel_analysis(),
            parallel_threshold: default_parallel_threshold(),
        }
    }
}

/// Searcher settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearcherConfig {
    /// Number of ids each binary combinator pulls from an input at a time.
    #[serde(default = "default_merge_buffer_size")]
    pub merge_buffer_size: usize,
}

fn default_merge_buffer_size() -> usize {
    4096
}

impl Default for SearcherConfig {
    fn default() -> Self {
        SearcherConfig {
            merge_buffer_size: default_merge_buffer_size(),
        }
    }
}

impl SearcherConfig {
    pub fn validate(&self) -> Result<()> {
        if self.merge_buffer_size == 0 {
            return Err(QuarryError::invalid_config("merge_buffer_size must be > 0"));
        }
        Ok(())
    }
}
