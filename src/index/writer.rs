//! Index writer.
//!
//! The writer stages `(external id, entry)` pairs and deletions, then turns
//! them into posting-list updates at [`IndexWriter::commit`]. A commit is one
//! storage batch: either every staged change becomes visible or none does.
//!
//! # Example
//!
//! ```
//! use quarry::entry::IndexEntryWriter;
//! use quarry::index::Index;
//! use quarry::index::config::IndexConfig;
//!
//! # fn main() -> quarry::error::Result<()> {
//! let index = Index::open(IndexConfig::with_fields(["Id", "Content"]))?;
//! let mut writer = index.writer()?;
//!
//! let mut buffer = vec![0u8; 256];
//! let mut entry = IndexEntryWriter::new(&mut buffer, index.schema());
//! entry.write(0, b"entry/1")?;
//! entry.write_list(1, ["road", "lake"])?;
//! writer.index("entry/1", entry.finish()?)?;
//!
//! let stats = writer.commit()?;
//! assert_eq!(stats.indexed, 1);
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use ahash::AHashMap;
use log::{debug, trace, warn};
use rayon::prelude::*;

use crate::analysis::analyzer::per_field::PerFieldAnalyzer;
use crate::entry::IndexEntryReader;
use crate::error::{QuarryError, Result};
use crate::index::InternalId;
use crate::index::config::IndexWriterConfig;
use crate::index::dictionary::{FieldStats, TermDictionary};
use crate::index::identity::{IdentityMap, IndexMeta, encode_internal_id};
use crate::index::keys;
use crate::index::postings::PostingList;
use crate::schema::{FieldId, FieldSchema};
use crate::storage::{Storage, WriteBatch};

/// Outcome of a commit.
#[derive(Debug, Clone, Default)]
pub struct CommitStats {
    /// Storage generation published by the commit.
    pub generation: u64,
    /// Documents added under a new internal id.
    pub indexed: usize,
    /// Documents re-indexed under their existing internal id.
    pub updated: usize,
    /// Documents removed.
    pub deleted: usize,
    /// Posting lists rewritten or removed.
    pub postings_touched: usize,
    pub elapsed: Duration,
}

#[derive(Debug)]
enum StagedOp {
    Index { external: String, entry: Vec<u8> },
    Delete { external: String },
}

impl StagedOp {
    fn external(&self) -> &str {
        match self {
            StagedOp::Index { external, .. } | StagedOp::Delete { external } => external,
        }
    }
}

/// One resolved document change of a commit.
struct Change<'a> {
    id: InternalId,
    external: &'a str,
    old_entry: Option<Arc<[u8]>>,
    new_entry: Option<&'a [u8]>,
    is_new: bool,
}

/// Posting keys and field shapes produced by analyzing one entry.
#[derive(Debug, Default)]
struct DocumentTerms {
    posting_keys: Vec<Vec<u8>>,
    fields: Vec<(FieldId, FieldStats)>,
}

/// Single-writer index builder.
pub struct IndexWriter {
    storage: Arc<dyn Storage>,
    schema: Arc<FieldSchema>,
    analyzers: Arc<PerFieldAnalyzer>,
    config: IndexWriterConfig,
    staged: Vec<StagedOp>,
    release: Option<Arc<AtomicBool>>,
}

impl std::fmt::Debug for IndexWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexWriter")
            .field("storage", &self.storage.name())
            .field("fields", &self.schema.len())
            .field("config", &self.config)
            .field("staged", &self.staged.len())
            .finish()
    }
}

impl IndexWriter {
    pub fn new(
        storage: Arc<dyn Storage>,
        schema: Arc<FieldSchema>,
        analyzers: Arc<PerFieldAnalyzer>,
        config: IndexWriterConfig,
    ) -> Self {
        IndexWriter {
            storage,
            schema,
            analyzers,
            config,
            staged: Vec::new(),
            release: None,
        }
    }

    /// Clear `flag` when this writer is dropped.
    pub(crate) fn with_release(mut self, flag: Arc<AtomicBool>) -> Self {
        self.release = Some(flag);
        self
    }

    /// Stage one document. Indexing an external id that is already committed
    /// replaces that document and keeps its internal id.
    pub fn index<S: Into<String>>(&mut self, external_id: S, entry: &[u8]) -> Result<()> {
        let external = external_id.into();
        if external.is_empty() {
            return Err(QuarryError::invalid_argument("external id must not be empty"));
        }

        let reader = IndexEntryReader::new(entry)?;
        if reader.field_count() > self.schema.len() {
            return Err(QuarryError::schema(format!(
                "entry has {} fields, the schema declares {}",
                reader.field_count(),
                self.schema.len()
            )));
        }
        for field in 0..reader.field_count() {
            reader.values(field as FieldId)?;
        }

        self.staged.push(StagedOp::Index {
            external,
            entry: entry.to_vec(),
        });
        Ok(())
    }

    /// Stage the removal of a document. Unknown ids are ignored at commit.
    pub fn delete<S: Into<String>>(&mut self, external_id: S) -> Result<()> {
        let external = external_id.into();
        if external.is_empty() {
            return Err(QuarryError::invalid_argument("external id must not be empty"));
        }
        self.staged.push(StagedOp::Delete { external });
        Ok(())
    }

    /// Number of staged operations.
    pub fn pending_docs(&self) -> usize {
        self.staged.len()
    }

    /// Drop every staged operation.
    pub fn rollback(&mut self) {
        self.staged.clear();
    }

    /// Publish every staged change as one new snapshot.
    ///
    /// On error nothing is published and the staged operations are kept.
    pub fn commit(&mut self) -> Result<CommitStats> {
        let started = Instant::now();
        let snapshot = self.storage.snapshot()?;
        if self.staged.is_empty() {
            return Ok(CommitStats {
                generation: snapshot.generation(),
                ..CommitStats::default()
            });
        }
        debug!(
            "commit of {} staged operations on generation {}",
            self.staged.len(),
            snapshot.generation()
        );

        let identities = IdentityMap::new(snapshot.clone());
        let dictionary = TermDictionary::new(snapshot.clone());
        let mut meta = IndexMeta::load(&snapshot)?;
        let mut stats = CommitStats::default();

        // The last staged operation of an external id wins.
        let mut order: Vec<&str> = Vec::new();
        let mut latest: AHashMap<&str, &StagedOp> = AHashMap::new();
        for op in &self.staged {
            let external = op.external();
            match latest.insert(external, op) {
                None => order.push(external),
                Some(StagedOp::Index { .. }) if matches!(op, StagedOp::Index { .. }) => {
                    warn!("{external:?} was staged more than once, keeping the last entry");
                }
                Some(_) => {}
            }
        }

        let mut changes = Vec::with_capacity(order.len());
        for external in order {
            let existing = identities.internal_id_of(external)?;
            let old_entry = match existing {
                Some(id) => Some(snapshot.get_shared(&keys::entry_key(id)).ok_or_else(|| {
                    QuarryError::corrupted(format!("document {id} has an identity but no entry"))
                })?),
                None => None,
            };

            match latest.get(external) {
                Some(StagedOp::Index { entry, .. }) => {
                    let id = match existing {
                        Some(id) => id,
                        None => {
                            let id = meta.next_id;
                            meta.next_id += 1;
                            id
                        }
                    };
                    changes.push(Change {
                        id,
                        external,
                        old_entry,
                        new_entry: Some(entry.as_slice()),
                        is_new: existing.is_none(),
                    });
                }
                Some(StagedOp::Delete { .. }) => match existing {
                    Some(id) => changes.push(Change {
                        id,
                        external,
                        old_entry,
                        new_entry: None,
                        is_new: false,
                    }),
                    None => debug!("ignoring delete of unknown document {external:?}"),
                },
                None => {}
            }
        }

        let analyzers = self.analyzers.as_ref();
        let analyzed: Vec<(Option<DocumentTerms>, Option<DocumentTerms>)> =
            if self.config.parallel_analysis && changes.len() >= self.config.parallel_threshold {
                changes
                    .par_iter()
                    .map(|change| analyze_change(analyzers, change))
                    .collect::<Result<Vec<_>>>()?
            } else {
                changes
                    .iter()
                    .map(|change| analyze_change(analyzers, change))
                    .collect::<Result<Vec<_>>>()?
            };

        let mut batch = WriteBatch::new();
        let mut updates: BTreeMap<Vec<u8>, (Vec<InternalId>, Vec<InternalId>)> = BTreeMap::new();
        let mut field_stats: BTreeMap<FieldId, FieldStats> = BTreeMap::new();
        let mut all_adds = Vec::new();
        let mut all_removes = Vec::new();

        for (change, (old_terms, new_terms)) in changes.iter().zip(analyzed) {
            if let Some(old_terms) = old_terms {
                for key in old_terms.posting_keys {
                    updates.entry(key).or_default().1.push(change.id);
                }
            }

            match (change.new_entry, new_terms) {
                (Some(entry), Some(new_terms)) => {
                    for key in new_terms.posting_keys {
                        updates.entry(key).or_default().0.push(change.id);
                    }
                    for (field, shape) in new_terms.fields {
                        let merged = field_stats.entry(field).or_default().merge(shape);
                        field_stats.insert(field, merged);
                    }
                    batch.put(keys::entry_key(change.id), entry.to_vec());
                    if change.is_new {
                        batch.put(keys::external_key(change.id), change.external.as_bytes().to_vec());
                        batch.put(keys::internal_key(change.external), encode_internal_id(change.id));
                        all_adds.push(change.id);
                        stats.indexed += 1;
                    } else {
                        stats.updated += 1;
                    }
                }
                _ => {
                    batch.delete(keys::entry_key(change.id));
                    batch.delete(keys::external_key(change.id));
                    batch.delete(keys::internal_key(change.external));
                    all_removes.push(change.id);
                    stats.deleted += 1;
                }
            }
        }

        for (key, (mut adds, mut removes)) in updates {
            adds.sort_unstable();
            adds.dedup();
            removes.sort_unstable();
            removes.dedup();

            let mut postings = match snapshot.get(&key) {
                Some(bytes) => PostingList::decode(bytes)?,
                None => PostingList::new(),
            };
            postings.apply(&adds, &removes);
            if postings.is_empty() {
                batch.delete(key);
            } else {
                batch.put(key, postings.encode());
            }
            stats.postings_touched += 1;
        }

        all_adds.sort_unstable();
        all_removes.sort_unstable();
        let mut all = match snapshot.get(keys::ALL_KEY) {
            Some(bytes) => PostingList::decode(bytes)?,
            None => PostingList::new(),
        };
        all.apply(&all_adds, &all_removes);
        meta.live = all.len() as u64;
        batch.put(keys::ALL_KEY.to_vec(), all.encode());

        for (field, shape) in field_stats {
            let current = dictionary.field_stats(field)?;
            let merged = current.merge(shape);
            if merged != current {
                batch.put(keys::field_key(field), vec![merged.to_byte()]);
            }
        }

        let schema = serde_json::to_vec(self.schema.as_ref())?;
        if snapshot.get(keys::SCHEMA_KEY) != Some(schema.as_slice()) {
            batch.put(keys::SCHEMA_KEY.to_vec(), schema);
        }
        batch.put(keys::META_KEY.to_vec(), meta.encode());

        stats.generation = self.storage.commit(batch)?;
        stats.elapsed = started.elapsed();
        self.staged.clear();

        debug!(
            "committed generation {}: {} indexed, {} updated, {} deleted, {} posting lists in {:?}",
            stats.generation,
            stats.indexed,
            stats.updated,
            stats.deleted,
            stats.postings_touched,
            stats.elapsed
        );
        Ok(stats)
    }
}

impl Drop for IndexWriter {
    fn drop(&mut self) {
        if !self.staged.is_empty() {
            warn!("writer dropped with {} uncommitted operations", self.staged.len());
        }
        if let Some(flag) = self.release.take() {
            flag.store(false, Ordering::Release);
        }
    }
}

fn analyze_change(
    analyzers: &PerFieldAnalyzer,
    change: &Change<'_>,
) -> Result<(Option<DocumentTerms>, Option<DocumentTerms>)> {
    let old_terms = match &change.old_entry {
        Some(entry) => Some(analyze_entry(analyzers, entry)?),
        None => None,
    };
    let new_terms = match change.new_entry {
        Some(entry) => Some(analyze_entry(analyzers, entry)?),
        None => None,
    };
    Ok((old_terms, new_terms))
}

/// Posting keys of every value of every field of an entry.
fn analyze_entry(analyzers: &PerFieldAnalyzer, entry: &[u8]) -> Result<DocumentTerms> {
    let reader = IndexEntryReader::new(entry)?;
    let mut terms = DocumentTerms::default();

    for field in 0..reader.field_count() {
        let field = field as FieldId;
        let ty = reader.field_type(field);
        let values = reader.values(field)?;
        if values.is_empty() {
            continue;
        }

        let mut shape = FieldStats::default();
        shape.record(ty.is_tuple(), ty.is_list());
        terms.fields.push((field, shape));

        for value in &values {
            for term in analyzers.field_terms(field, value.bytes)? {
                terms.posting_keys.push(keys::term_key(field, &term));
            }
            if let Some((long, double)) = value.numeric {
                terms.posting_keys.push(keys::long_key(field, long));
                if let Some(key) = keys::double_key(field, double) {
                    terms.posting_keys.push(key);
                }
            }
        }
        trace!("field {field}: {} values analyzed", values.len());
    }

    terms.posting_keys.sort_unstable();
    terms.posting_keys.dedup();
    Ok(terms)
}
