//! # Quarry
//!
//! An embedded structured and full-text indexing engine.
//!
//! ## Features
//!
//! - Compact binary entry codec for raw, tuple (text + long + double) and
//!   list fields
//! - Per-field analysis pipelines
//! - Atomic, all-or-nothing commits over a sorted key/value substrate
//! - Snapshot-isolated searchers
//! - A buffer-filling match algebra: term, prefix/suffix/substring, range,
//!   boolean and ordering matches

pub mod analysis;
pub mod entry;
pub mod error;
pub mod index;
pub mod query;
pub mod schema;
pub mod storage;
pub mod util;

pub mod prelude {
    pub use crate::entry::{FieldType, IndexEntryReader, IndexEntryWriter};
    pub use crate::error::{QuarryError, Result};
    pub use crate::index::config::IndexConfig;
    pub use crate::index::searcher::IndexSearcher;
    pub use crate::index::writer::{CommitStats, IndexWriter};
    pub use crate::index::{Index, InternalId};
    pub use crate::query::{Comparand, Match, collect_ids};
    pub use crate::schema::{FieldId, FieldSchema};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
