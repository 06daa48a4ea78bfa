//! Index searcher.
//!
//! A searcher pins the snapshot that was current when it was opened. Commits
//! made afterwards are invisible to it, and any number of searchers can be
//! open at once.
//!
//! The searcher is the factory of the match algebra: it resolves field names,
//! runs query values through the same analyzers the writer used and checks
//! field shapes, so that a malformed query fails here instead of in the middle
//! of `fill`.

use std::sync::Arc;

use log::debug;
use regex::bytes::Regex;

use crate::analysis::analyzer::per_field::PerFieldAnalyzer;
use crate::analysis::token_filter::lowercase::lowercase_bytes;
use crate::entry::IndexEntryReader;
use crate::error::{QuarryError, Result};
use crate::index::InternalId;
use crate::index::config::SearcherConfig;
use crate::index::dictionary::TermDictionary;
use crate::index::identity::{IdentityMap, IndexMeta};
use crate::index::keys;
use crate::index::postings::PostingCursor;
use crate::query::{
    AllEntriesMatch, AndMatch, AndNotMatch, BoostMatch, CompareOp, Comparand, EmptyMatch, Match,
    MemoizedMatch, MultiTermMatch, OrMatch, ScoreFunction, SortingMatch, TermMatch, ValueRange,
};
use crate::schema::{FieldId, FieldSchema};
use crate::storage::Snapshot;

/// Read-only query entry point over one snapshot.
#[derive(Debug)]
pub struct IndexSearcher {
    snapshot: Snapshot,
    dictionary: TermDictionary,
    identities: IdentityMap,
    schema: Arc<FieldSchema>,
    analyzers: Arc<PerFieldAnalyzer>,
    config: SearcherConfig,
}

impl IndexSearcher {
    pub fn new(
        snapshot: Snapshot,
        schema: Arc<FieldSchema>,
        analyzers: Arc<PerFieldAnalyzer>,
        config: SearcherConfig,
    ) -> Self {
        debug!("searcher opened on generation {}", snapshot.generation());
        IndexSearcher {
            dictionary: TermDictionary::new(snapshot.clone()),
            identities: IdentityMap::new(snapshot.clone()),
            snapshot,
            schema,
            analyzers,
            config,
        }
    }

    /// Generation of the pinned snapshot.
    pub fn generation(&self) -> u64 {
        self.snapshot.generation()
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    pub fn dictionary(&self) -> &TermDictionary {
        &self.dictionary
    }

    /// Number of live documents.
    pub fn document_count(&self) -> Result<u64> {
        Ok(IndexMeta::load(&self.snapshot)?.live)
    }

    fn buffer_size(&self) -> usize {
        self.config.merge_buffer_size
    }

    /// Run `value` through the analyzer of `field`.
    ///
    /// Returns `None` when the analyzer yields no token and fails with a
    /// query error when it yields more than one. Fields unknown to the schema
    /// use the default analyzer.
    pub fn analyze_single_term(&self, field: &str, value: &[u8]) -> Result<Option<Vec<u8>>> {
        let mut terms = match self.schema.field_id(field) {
            Some(id) => self.analyzers.field_terms(id, value)?,
            None => self.analyzers.default_analyzer().terms(value)?,
        };
        match terms.len() {
            0 => Ok(None),
            1 => Ok(terms.pop()),
            n => Err(QuarryError::query(format!(
                "value {:?} of field {field:?} analyzes to {n} terms, expected one",
                String::from_utf8_lossy(value)
            ))),
        }
    }

    /// Analyzed form of a single-term operand, or the raw bytes when the
    /// analyzer does not produce exactly one term.
    fn normalize_operand(&self, field: FieldId, value: &[u8]) -> Result<Vec<u8>> {
        let mut terms = self.analyzers.field_terms(field, value)?;
        if terms.len() == 1 {
            Ok(terms.pop().unwrap_or_default())
        } else {
            Ok(value.to_vec())
        }
    }

    fn unknown_field(field: &str) -> Box<dyn Match> {
        Box::new(EmptyMatch::because(format!("unknown field {field:?}")))
    }

    /// Every live document.
    pub fn all_entries(&self) -> Result<Box<dyn Match>> {
        let cursor = match self.snapshot.get_shared(keys::ALL_KEY) {
            Some(bytes) => PostingCursor::new(bytes)?,
            None => PostingCursor::empty(),
        };
        Ok(Box::new(AllEntriesMatch::new(cursor)))
    }

    /// Documents whose `field` holds the analyzed `value`.
    pub fn term_query<V: AsRef<[u8]>>(&self, field: &str, value: V) -> Result<Box<dyn Match>> {
        let Some(id) = self.schema.field_id(field) else {
            return Ok(Self::unknown_field(field));
        };
        let Some(term) = self.analyze_single_term(field, value.as_ref())? else {
            return Ok(Box::new(EmptyMatch::because("value yields no term")));
        };
        let cursor = self.dictionary.postings(id, &term)?;
        Ok(Box::new(TermMatch::new(id, term, cursor)))
    }

    /// Documents whose `field` holds any of `values`, each yielded once.
    pub fn in_query<I, V>(&self, field: &str, values: I) -> Result<Box<dyn Match>>
    where
        I: IntoIterator<Item = V>,
        V: AsRef<[u8]>,
    {
        let Some(id) = self.schema.field_id(field) else {
            return Ok(Self::unknown_field(field));
        };
        let mut terms = Vec::new();
        for value in values {
            if let Some(term) = self.analyze_single_term(field, value.as_ref())? {
                terms.push(term);
            }
        }
        terms.sort_unstable();
        terms.dedup();

        let postings: Vec<Arc<[u8]>> = terms
            .iter()
            .filter_map(|term| self.dictionary.lookup(id, term))
            .collect();
        Ok(Box::new(
            MultiTermMatch::new("In", id, postings)?.with_parameter("values", terms.len()),
        ))
    }

    /// Union of the postings of every term of `field` accepted by `accept`.
    fn scan_terms<P>(&self, name: &'static str, field: &str, operand: &[u8], accept: P) -> Result<Box<dyn Match>>
    where
        P: Fn(&[u8]) -> bool,
    {
        let Some(id) = self.schema.field_id(field) else {
            return Ok(Self::unknown_field(field));
        };
        let postings: Vec<Arc<[u8]>> = self
            .dictionary
            .terms(id)
            .filter(|(term, _)| accept(term))
            .map(|(_, postings)| postings)
            .collect();
        Ok(Box::new(
            MultiTermMatch::new(name, id, postings)?
                .with_parameter("value", String::from_utf8_lossy(operand)),
        ))
    }

    /// Pattern and term adapter for the optionally case-insensitive scans.
    fn text_pattern(&self, field: &str, value: &[u8], case_sensitive: bool) -> Result<Vec<u8>> {
        let normalized = match self.schema.field_id(field) {
            Some(id) => self.normalize_operand(id, value)?,
            None => value.to_vec(),
        };
        Ok(if case_sensitive {
            normalized
        } else {
            lowercase_bytes(&normalized)
        })
    }

    fn fold(term: &[u8], case_sensitive: bool) -> std::borrow::Cow<'_, [u8]> {
        if case_sensitive {
            std::borrow::Cow::Borrowed(term)
        } else {
            std::borrow::Cow::Owned(lowercase_bytes(term))
        }
    }

    /// Documents with a term of `field` starting with `prefix`.
    pub fn starts_with_query<V: AsRef<[u8]>>(
        &self,
        field: &str,
        prefix: V,
        case_sensitive: bool,
    ) -> Result<Box<dyn Match>> {
        let pattern = self.text_pattern(field, prefix.as_ref(), case_sensitive)?;
        if case_sensitive {
            let Some(id) = self.schema.field_id(field) else {
                return Ok(Self::unknown_field(field));
            };
            let postings: Vec<Arc<[u8]>> = self
                .dictionary
                .lookup_prefix(id, &pattern)
                .map(|(_, postings)| postings)
                .collect();
            return Ok(Box::new(
                MultiTermMatch::new("StartsWith", id, postings)?
                    .with_parameter("value", String::from_utf8_lossy(&pattern)),
            ));
        }
        self.scan_terms("StartsWith", field, &pattern, |term| {
            Self::fold(term, case_sensitive).starts_with(&pattern)
        })
    }

    /// Documents with a term of `field` ending with `suffix`.
    pub fn ends_with_query<V: AsRef<[u8]>>(
        &self,
        field: &str,
        suffix: V,
        case_sensitive: bool,
    ) -> Result<Box<dyn Match>> {
        let pattern = self.text_pattern(field, suffix.as_ref(), case_sensitive)?;
        self.scan_terms("EndsWith", field, &pattern, |term| {
            Self::fold(term, case_sensitive).ends_with(&pattern)
        })
    }

    /// Documents with a term of `field` containing `needle`.
    pub fn contains_query<V: AsRef<[u8]>>(
        &self,
        field: &str,
        needle: V,
        case_sensitive: bool,
    ) -> Result<Box<dyn Match>> {
        let pattern = self.text_pattern(field, needle.as_ref(), case_sensitive)?;
        self.scan_terms("Contains", field, &pattern, |term| {
            contains(&Self::fold(term, case_sensitive), &pattern)
        })
    }

    /// Documents with a term of `field` that does not start with `prefix`.
    pub fn not_starts_with_query<V: AsRef<[u8]>>(
        &self,
        field: &str,
        prefix: V,
        case_sensitive: bool,
    ) -> Result<Box<dyn Match>> {
        let pattern = self.text_pattern(field, prefix.as_ref(), case_sensitive)?;
        self.scan_terms("NotStartsWith", field, &pattern, |term| {
            !Self::fold(term, case_sensitive).starts_with(&pattern)
        })
    }

    /// Documents with a term of `field` that does not end with `suffix`.
    pub fn not_ends_with_query<V: AsRef<[u8]>>(
        &self,
        field: &str,
        suffix: V,
        case_sensitive: bool,
    ) -> Result<Box<dyn Match>> {
        let pattern = self.text_pattern(field, suffix.as_ref(), case_sensitive)?;
        self.scan_terms("NotEndsWith", field, &pattern, |term| {
            !Self::fold(term, case_sensitive).ends_with(&pattern)
        })
    }

    /// Documents with a term of `field` that does not contain `needle`.
    pub fn not_contains_query<V: AsRef<[u8]>>(
        &self,
        field: &str,
        needle: V,
        case_sensitive: bool,
    ) -> Result<Box<dyn Match>> {
        let pattern = self.text_pattern(field, needle.as_ref(), case_sensitive)?;
        self.scan_terms("NotContains", field, &pattern, |term| {
            !contains(&Self::fold(term, case_sensitive), &pattern)
        })
    }

    /// Documents with at least one term in `field`.
    pub fn exists_query(&self, field: &str) -> Result<Box<dyn Match>> {
        self.scan_terms("Exists", field, b"", |_| true)
    }

    /// Documents with a term of `field` matched by `pattern`. The pattern is
    /// not anchored.
    pub fn regex_query(&self, field: &str, pattern: &str) -> Result<Box<dyn Match>> {
        let regex = Regex::new(pattern)
            .map_err(|e| QuarryError::query(format!("invalid pattern {pattern:?}: {e}")))?;
        self.scan_terms("Regex", field, pattern.as_bytes(), |term| regex.is_match(term))
    }

    pub fn greater_than<C: Into<Comparand>>(
        &self,
        inner: Box<dyn Match>,
        field: &str,
        value: C,
    ) -> Result<Box<dyn Match>> {
        self.compare(inner, field, CompareOp::GreaterThan, value.into(), None)
    }

    pub fn greater_than_or_equal<C: Into<Comparand>>(
        &self,
        inner: Box<dyn Match>,
        field: &str,
        value: C,
    ) -> Result<Box<dyn Match>> {
        self.compare(inner, field, CompareOp::GreaterThanOrEqual, value.into(), None)
    }

    pub fn less_than<C: Into<Comparand>>(
        &self,
        inner: Box<dyn Match>,
        field: &str,
        value: C,
    ) -> Result<Box<dyn Match>> {
        self.compare(inner, field, CompareOp::LessThan, value.into(), None)
    }

    pub fn less_than_or_equal<C: Into<Comparand>>(
        &self,
        inner: Box<dyn Match>,
        field: &str,
        value: C,
    ) -> Result<Box<dyn Match>> {
        self.compare(inner, field, CompareOp::LessThanOrEqual, value.into(), None)
    }

    pub fn equals<C: Into<Comparand>>(
        &self,
        inner: Box<dyn Match>,
        field: &str,
        value: C,
    ) -> Result<Box<dyn Match>> {
        self.compare(inner, field, CompareOp::Equals, value.into(), None)
    }

    /// Ids of `inner` whose `field` holds no value equal to `value`.
    pub fn not_equals<C: Into<Comparand>>(
        &self,
        inner: Box<dyn Match>,
        field: &str,
        value: C,
    ) -> Result<Box<dyn Match>> {
        self.compare(inner, field, CompareOp::NotEquals, value.into(), None)
    }

    /// Ids of `inner` whose `field` holds a value in `[low, high]`.
    pub fn between<L: Into<Comparand>, H: Into<Comparand>>(
        &self,
        inner: Box<dyn Match>,
        field: &str,
        low: L,
        high: H,
    ) -> Result<Box<dyn Match>> {
        self.compare(inner, field, CompareOp::Between, low.into(), Some(high.into()))
    }

    /// Ids of `inner` whose `field` holds no value in `[low, high]`.
    pub fn not_between<L: Into<Comparand>, H: Into<Comparand>>(
        &self,
        inner: Box<dyn Match>,
        field: &str,
        low: L,
        high: H,
    ) -> Result<Box<dyn Match>> {
        self.compare(inner, field, CompareOp::NotBetween, low.into(), Some(high.into()))
    }

    /// Restrict `inner` by comparing `field` against the comparands.
    ///
    /// Positive operators intersect `inner` with the union of the covered
    /// posting lists; negated operators subtract that union from `inner`.
    pub fn compare(
        &self,
        inner: Box<dyn Match>,
        field: &str,
        op: CompareOp,
        low: Comparand,
        high: Option<Comparand>,
    ) -> Result<Box<dyn Match>> {
        let described = match &high {
            Some(high) => format!("[{low}, {high}]"),
            None => low.to_string(),
        };

        let Some(id) = self.schema.field_id(field) else {
            ValueRange::resolve(op, low, high)?;
            return Ok(self.restrict(op, inner, Self::unknown_field(field)));
        };

        let stats = self.dictionary.field_stats(id)?;
        if stats.has_values() && !stats.has_tuples() {
            return Err(QuarryError::type_mismatch(format!(
                "{} needs field {field:?} to be indexed as a tuple",
                op.name()
            )));
        }

        let low = self.normalize_comparand(id, low)?;
        let high = high.map(|high| self.normalize_comparand(id, high)).transpose()?;
        let range = ValueRange::resolve(op, low, high)?;

        let postings: Vec<Arc<[u8]>> = match &range {
            ValueRange::Bytes(lower, upper) => self
                .dictionary
                .lookup_range(id, lower.as_ref().map(Vec::as_slice), upper.as_ref().map(Vec::as_slice))
                .map(|(_, postings)| postings)
                .collect(),
            ValueRange::Long(lower, upper) => self
                .dictionary
                .long_range(id, *lower, *upper)
                .map(|(_, postings)| postings)
                .collect(),
            ValueRange::Double(lower, upper) => self
                .dictionary
                .double_range(id, *lower, *upper)
                .map(|(_, postings)| postings)
                .collect(),
        };

        let covered: Box<dyn Match> = Box::new(
            MultiTermMatch::new(op.name(), id, postings)?.with_parameter("value", described),
        );
        Ok(self.restrict(op, inner, covered))
    }

    fn normalize_comparand(&self, field: FieldId, value: Comparand) -> Result<Comparand> {
        match value {
            Comparand::Bytes(bytes) => Ok(Comparand::Bytes(self.normalize_operand(field, &bytes)?)),
            numeric => Ok(numeric),
        }
    }

    fn restrict(&self, op: CompareOp, inner: Box<dyn Match>, covered: Box<dyn Match>) -> Box<dyn Match> {
        if op.is_negated() {
            self.and_not(inner, covered)
        } else {
            self.and(inner, covered)
        }
    }

    /// Intersection.
    pub fn and(&self, left: Box<dyn Match>, right: Box<dyn Match>) -> Box<dyn Match> {
        Box::new(AndMatch::new(left, right, self.buffer_size()))
    }

    /// Union.
    pub fn or(&self, left: Box<dyn Match>, right: Box<dyn Match>) -> Box<dyn Match> {
        Box::new(OrMatch::new(left, right, self.buffer_size()))
    }

    /// Ids of `left` not yielded by `right`.
    pub fn and_not(&self, left: Box<dyn Match>, right: Box<dyn Match>) -> Box<dyn Match> {
        Box::new(AndNotMatch::new(left, right, self.buffer_size()))
    }

    /// `inner` ordered by the first value of `field`, ascending.
    pub fn order_by_ascending(
        &self,
        inner: Box<dyn Match>,
        field: &str,
        take: Option<usize>,
    ) -> Result<SortingMatch> {
        self.order_by(inner, field, false, take)
    }

    /// `inner` ordered by the first value of `field`, descending.
    pub fn order_by_descending(
        &self,
        inner: Box<dyn Match>,
        field: &str,
        take: Option<usize>,
    ) -> Result<SortingMatch> {
        self.order_by(inner, field, true, take)
    }

    fn order_by(
        &self,
        inner: Box<dyn Match>,
        field: &str,
        descending: bool,
        take: Option<usize>,
    ) -> Result<SortingMatch> {
        let id = self.schema.field_id(field);
        if let Some(id) = id {
            let stats = self.dictionary.field_stats(id)?;
            if stats.has_values() && !stats.has_tuples() {
                return Err(QuarryError::type_mismatch(format!(
                    "ordering needs field {field:?} to be indexed as a tuple"
                )));
            }
        }
        SortingMatch::new(inner, &self.snapshot, id, descending, take, self.buffer_size())
    }

    /// Materialize `inner` so it can be replayed.
    pub fn memoize(&self, inner: Box<dyn Match>) -> Result<MemoizedMatch> {
        MemoizedMatch::new(inner, self.buffer_size())
    }

    /// Attach a score function to `inner`.
    pub fn boost(&self, inner: Box<dyn Match>, function: Arc<dyn ScoreFunction>) -> Box<dyn Match> {
        Box::new(BoostMatch::new(inner, function))
    }

    /// External id of a matched document.
    pub fn get_identity_for(&self, id: InternalId) -> Result<String> {
        self.identities
            .external_id_of(id)?
            .ok_or_else(|| QuarryError::not_found(format!("no document with internal id {id}")))
    }

    /// Internal id of a document by its external id.
    pub fn internal_id_of(&self, external: &str) -> Result<Option<InternalId>> {
        self.identities.internal_id_of(external)
    }

    /// Reader over the stored entry of a matched document.
    pub fn get_reader_for(&self, id: InternalId) -> Result<IndexEntryReader<'_>> {
        let entry = self
            .snapshot
            .get(&keys::entry_key(id))
            .ok_or_else(|| QuarryError::not_found(format!("no document with internal id {id}")))?;
        IndexEntryReader::new(entry)
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
}
