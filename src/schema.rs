//! Field schema for Quarry indexes.
//!
//! A [`FieldSchema`] maps field names to the small integer [`FieldId`]s used by
//! the entry codec and the term dictionaries. It is built once per index and
//! shared read-only by writers and searchers.

#[allow(clippy::module_inception)]
pub mod schema;

pub use schema::*;
