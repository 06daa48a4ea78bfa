//! Binary entry codec.
//!
//! An entry is the immutable, serialized form of one document. It is produced
//! by [`IndexEntryWriter`] into a caller-provided buffer and decoded by
//! [`IndexEntryReader`] without copying.
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! u16 slot_count
//! slot_count × (u8 field type, u32 offset)      field directory
//! values...
//!
//! Raw         varint len, bytes
//! Tuple       i64, f64, varint len, bytes
//! List        varint count, count × u32 element offset, elements
//! TupleList   same as List, elements encoded as Tuple
//! ```
//!
//! Offsets are relative to the start of the entry.

pub mod field_type;
pub mod reader;
pub mod writer;

pub use field_type::FieldType;
pub use reader::{EntryValue, IndexEntryReader, ListIterator};
pub use writer::IndexEntryWriter;

/// Bytes used by the slot count prefix.
pub(crate) const SLOT_COUNT_LEN: usize = 2;

/// Bytes used by one directory slot (type tag + offset).
pub(crate) const SLOT_LEN: usize = 5;

/// Size of the header of an entry with `slots` fields.
pub fn header_len(slots: usize) -> usize {
    SLOT_COUNT_LEN + slots * SLOT_LEN
}
