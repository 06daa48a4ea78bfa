//! Persistent key layout.
//!
//! Every piece of index state lives under a one-byte tag:
//!
//! | key                         | value                        |
//! |-----------------------------|------------------------------|
//! | `T` field term              | postings of the text term    |
//! | `L` field sortable-i64      | postings of the long value   |
//! | `D` field sortable-f64      | postings of the double value |
//! | `F` field                   | field flags                  |
//! | `E` id                      | stored entry                 |
//! | `X` id                      | external id                  |
//! | `I` external id             | internal id                  |
//! | `A`                         | postings of every live id    |
//! | `M`                         | index meta                   |
//! | `S`                         | schema (JSON)                |
//!
//! Field ids and internal ids are big-endian so that key order matches
//! numeric order. Numbers are made sortable by flipping the sign bit (and,
//! for negative doubles, every bit).

use byteorder::{BigEndian, ByteOrder};

use crate::error::{QuarryError, Result};
use crate::index::InternalId;
use crate::schema::FieldId;

pub const TERM: u8 = b'T';
pub const LONG: u8 = b'L';
pub const DOUBLE: u8 = b'D';
pub const FIELD: u8 = b'F';
pub const ENTRY: u8 = b'E';
pub const EXTERNAL: u8 = b'X';
pub const INTERNAL: u8 = b'I';

pub const ALL_KEY: &[u8] = b"A";
pub const META_KEY: &[u8] = b"M";
pub const SCHEMA_KEY: &[u8] = b"S";

/// Length of `tag | field`.
pub const FIELD_PREFIX_LEN: usize = 3;

/// `tag | field`: the prefix shared by all keys of one field dictionary.
pub fn field_prefix(tag: u8, field: FieldId) -> Vec<u8> {
    let mut key = vec![tag, 0, 0];
    BigEndian::write_u16(&mut key[1..3], field);
    key
}

pub fn term_key(field: FieldId, term: &[u8]) -> Vec<u8> {
    let mut key = field_prefix(TERM, field);
    key.extend_from_slice(term);
    key
}

pub fn long_key(field: FieldId, value: i64) -> Vec<u8> {
    let mut key = field_prefix(LONG, field);
    key.extend_from_slice(&sortable_i64(value));
    key
}

/// `None` for NaN, which is never indexed.
pub fn double_key(field: FieldId, value: f64) -> Option<Vec<u8>> {
    let sortable = sortable_f64(value)?;
    let mut key = field_prefix(DOUBLE, field);
    key.extend_from_slice(&sortable);
    Some(key)
}

pub fn field_key(field: FieldId) -> Vec<u8> {
    field_prefix(FIELD, field)
}

pub fn entry_key(id: InternalId) -> Vec<u8> {
    id_key(ENTRY, id)
}

pub fn external_key(id: InternalId) -> Vec<u8> {
    id_key(EXTERNAL, id)
}

pub fn internal_key(external: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(external.len() + 1);
    key.push(INTERNAL);
    key.extend_from_slice(external.as_bytes());
    key
}

fn id_key(tag: u8, id: InternalId) -> Vec<u8> {
    let mut key = vec![tag; 9];
    BigEndian::write_u64(&mut key[1..], id);
    key
}

/// The part of a dictionary key after `tag | field`.
pub fn key_suffix(key: &[u8]) -> &[u8] {
    key.get(FIELD_PREFIX_LEN..).unwrap_or_default()
}

/// Field id of a dictionary key.
pub fn key_field(key: &[u8]) -> Result<FieldId> {
    if key.len() < FIELD_PREFIX_LEN {
        return Err(QuarryError::corrupted("dictionary key is too short"));
    }
    Ok(BigEndian::read_u16(&key[1..3]))
}

/// Encode an i64 so that byte order equals numeric order.
pub fn sortable_i64(value: i64) -> [u8; 8] {
    ((value as u64) ^ (1 << 63)).to_be_bytes()
}

pub fn decode_sortable_i64(bytes: &[u8]) -> Result<i64> {
    let bits = read_u64(bytes)?;
    Ok((bits ^ (1 << 63)) as i64)
}

/// Encode an f64 so that byte order equals numeric order.
///
/// `-0.0` folds onto `+0.0`; NaN has no position and yields `None`.
pub fn sortable_f64(value: f64) -> Option<[u8; 8]> {
    if value.is_nan() {
        return None;
    }
    let value = if value == 0.0 { 0.0 } else { value };
    let bits = value.to_bits();
    let bits = if bits >> 63 == 1 { !bits } else { bits | (1 << 63) };
    Some(bits.to_be_bytes())
}

pub fn decode_sortable_f64(bytes: &[u8]) -> Result<f64> {
    let bits = read_u64(bytes)?;
    let bits = if bits >> 63 == 1 { bits & !(1 << 63) } else { !bits };
    Ok(f64::from_bits(bits))
}

fn read_u64(bytes: &[u8]) -> Result<u64> {
    if bytes.len() != 8 {
        return Err(QuarryError::corrupted(format!(
            "numeric key suffix has {} bytes",
            bytes.len()
        )));
    }
    Ok(BigEndian::read_u64(bytes))
}
