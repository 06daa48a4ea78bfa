//! Index façade.
//!
//! An [`Index`] ties a storage backend to a field schema and the per-field
//! analyzers. It hands out at most one [`IndexWriter`] at a time and any
//! number of [`IndexSearcher`]s, each pinned to the snapshot current when it
//! was opened.
//!
//! # Example
//!
//! ```
//! use quarry::entry::IndexEntryWriter;
//! use quarry::index::Index;
//! use quarry::index::config::IndexConfig;
//! use quarry::query::collect_ids;
//!
//! # fn main() -> quarry::error::Result<()> {
//! let index = Index::open(IndexConfig::with_fields(["Id", "Content"]))?;
//!
//! let mut writer = index.writer()?;
//! let mut buffer = vec![0u8; 256];
//! let mut entry = IndexEntryWriter::new(&mut buffer, index.schema());
//! entry.write(0, b"entry/1")?;
//! entry.write_list(1, ["road", "lake"])?;
//! writer.index("entry/1", entry.finish()?)?;
//! writer.commit()?;
//!
//! let searcher = index.searcher()?;
//! let mut lake = searcher.term_query("Content", "lake")?;
//! let ids = collect_ids(&mut lake, 64)?;
//! assert_eq!(searcher.get_identity_for(ids[0])?, "entry/1");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dictionary;
pub mod identity;
pub mod keys;
pub mod postings;
pub mod searcher;
pub mod writer;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};

use crate::analysis::analyzer::per_field::PerFieldAnalyzer;
use crate::error::{QuarryError, Result};
use crate::schema::FieldSchema;
use crate::storage::{Storage, StorageFactory};

use self::config::IndexConfig;
use self::searcher::IndexSearcher;
use self::writer::IndexWriter;

/// Dense document id assigned at commit time, starting at 1.
pub type InternalId = u64;

/// An open index.
#[derive(Debug)]
pub struct Index {
    storage: Arc<dyn Storage>,
    schema: Arc<FieldSchema>,
    analyzers: Arc<PerFieldAnalyzer>,
    config: IndexConfig,
    writer_open: Arc<AtomicBool>,
}

impl Index {
    /// Open (or create) the index described by `config`.
    pub fn open(config: IndexConfig) -> Result<Self> {
        config.validate()?;
        let storage = StorageFactory::open(config.storage.clone())?;
        Self::with_storage(config, storage)
    }

    /// Open an index over an existing storage backend.
    ///
    /// Fails with a schema error when the storage already holds an index
    /// whose fields differ from the configured ones.
    pub fn with_storage(config: IndexConfig, storage: Arc<dyn Storage>) -> Result<Self> {
        config.validate()?;
        let schema = config.schema()?;

        let snapshot = storage.snapshot()?;
        if let Some(stored) = snapshot.get(keys::SCHEMA_KEY) {
            let stored: FieldSchema = serde_json::from_slice(stored)?;
            if stored != schema {
                return Err(QuarryError::schema(format!(
                    "index was built with fields {:?}, configured fields are {:?}",
                    stored.field_names(),
                    schema.field_names()
                )));
            }
        }

        let analyzers = config.build_analyzers(&schema)?;
        info!(
            "opened index on {} storage at generation {} with {} fields",
            storage.name(),
            snapshot.generation(),
            schema.len()
        );

        Ok(Index {
            storage,
            schema: Arc::new(schema),
            analyzers: Arc::new(analyzers),
            config,
            writer_open: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// The index writer. Only one writer may be alive at a time.
    pub fn writer(&self) -> Result<IndexWriter> {
        if self.writer_open.swap(true, Ordering::AcqRel) {
            return Err(QuarryError::index("another writer is already open"));
        }
        debug!("writer opened");
        Ok(IndexWriter::new(
            Arc::clone(&self.storage),
            Arc::clone(&self.schema),
            Arc::clone(&self.analyzers),
            self.config.writer.clone(),
        )
        .with_release(Arc::clone(&self.writer_open)))
    }

    /// A searcher over the latest committed snapshot.
    pub fn searcher(&self) -> Result<IndexSearcher> {
        Ok(IndexSearcher::new(
            self.storage.snapshot()?,
            Arc::clone(&self.schema),
            Arc::clone(&self.analyzers),
            self.config.searcher.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorage;

    #[test]
    fn test_single_writer() {
        let index = Index::open(IndexConfig::with_fields(["Id"])).unwrap();
        let writer = index.writer().unwrap();
        assert!(index.writer().is_err());
        drop(writer);
        assert!(index.writer().is_ok());
    }

    #[test]
    fn test_schema_mismatch() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::default());
        let index = Index::with_storage(IndexConfig::with_fields(["Id", "Content"]), Arc::clone(&storage)).unwrap();
        let mut writer = index.writer().unwrap();
        writer.delete("nothing").unwrap();
        writer.commit().unwrap();

        let reopened = Index::with_storage(IndexConfig::with_fields(["Id"]), storage);
        assert!(matches!(reopened, Err(QuarryError::Schema(_))));
    }
}
