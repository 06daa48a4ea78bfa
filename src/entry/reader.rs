//! Entry reader.
//!
//! The reader borrows the entry bytes and decodes values lazily. Scalar reads
//! on a list field return its first element, which makes single-valued and
//! multi-valued documents interchangeable for callers that only need one value.

use byteorder::{ByteOrder, LittleEndian};

use crate::entry::field_type::FieldType;
use crate::entry::{SLOT_COUNT_LEN, SLOT_LEN, header_len};
use crate::error::{QuarryError, Result};
use crate::schema::FieldId;
use crate::util::varint::decode_u64;

/// One decoded value: its bytes and, for tuples, the numeric companions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryValue<'a> {
    pub bytes: &'a [u8],
    pub numeric: Option<(i64, f64)>,
}

impl<'a> EntryValue<'a> {
    pub fn long(&self) -> Option<i64> {
        self.numeric.map(|(l, _)| l)
    }

    pub fn double(&self) -> Option<f64> {
        self.numeric.map(|(_, d)| d)
    }
}

/// Decodes fields out of an encoded entry.
#[derive(Debug, Clone, Copy)]
pub struct IndexEntryReader<'a> {
    data: &'a [u8],
    slots: usize,
}

impl<'a> IndexEntryReader<'a> {
    /// Wrap encoded entry bytes, validating the header.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        if data.len() < SLOT_COUNT_LEN {
            return Err(QuarryError::corrupted("entry shorter than its header"));
        }
        let slots = LittleEndian::read_u16(&data[..SLOT_COUNT_LEN]) as usize;
        if data.len() < header_len(slots) {
            return Err(QuarryError::corrupted(format!(
                "entry of {} bytes cannot hold a directory of {slots} fields",
                data.len()
            )));
        }
        Ok(IndexEntryReader { data, slots })
    }

    /// The raw entry bytes.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Number of field slots in the directory.
    pub fn field_count(&self) -> usize {
        self.slots
    }

    /// The shape of `field`; `Missing` for unwritten or unknown fields.
    pub fn field_type(&self, field: FieldId) -> FieldType {
        self.slot(field)
            .map(|slot| slot.map_or(FieldType::Missing, |(ty, _)| ty))
            .unwrap_or(FieldType::Missing)
    }

    /// Read the text bytes of `field`.
    pub fn read(&self, field: FieldId) -> Result<Option<&'a [u8]>> {
        Ok(self.first_value(field)?.map(|v| v.bytes))
    }

    /// Read the long companion of a tuple field.
    pub fn read_long(&self, field: FieldId) -> Result<Option<i64>> {
        Ok(self.read_tuple(field)?.and_then(|v| v.long()))
    }

    /// Read the double companion of a tuple field.
    pub fn read_double(&self, field: FieldId) -> Result<Option<f64>> {
        Ok(self.read_tuple(field)?.and_then(|v| v.double()))
    }

    /// Read the long, double and text of a tuple field.
    pub fn read_tuple(&self, field: FieldId) -> Result<Option<EntryValue<'a>>> {
        let ty = self.field_type(field);
        if !ty.is_missing() && !ty.is_tuple() {
            return Err(QuarryError::type_mismatch(format!(
                "field {field} is {ty:?}, not a tuple"
            )));
        }
        self.first_value(field)
    }

    /// Read element `index` of a list field.
    pub fn read_at(&self, field: FieldId, index: usize) -> Result<Option<&'a [u8]>> {
        Ok(self.read_value_at(field, index)?.map(|v| v.bytes))
    }

    /// Read element `index` of a list field, with companions when present.
    pub fn read_value_at(&self, field: FieldId, index: usize) -> Result<Option<EntryValue<'a>>> {
        match self.try_read_many(field)? {
            Some(list) => list.get(index).map(Some),
            None if self.field_type(field).is_missing() => Ok(None),
            None => Err(self.not_a_list(field)),
        }
    }

    /// Open a cursor over a list field.
    pub fn read_many(&self, field: FieldId) -> Result<ListIterator<'a>> {
        self.try_read_many(field)?
            .ok_or_else(|| self.not_a_list(field))
    }

    /// Open a cursor over a list field, or `None` when the field is not a list.
    pub fn try_read_many(&self, field: FieldId) -> Result<Option<ListIterator<'a>>> {
        match self.slot(field)? {
            Some((ty, offset)) if ty.is_list() => {
                ListIterator::open(self.data, offset, ty.is_tuple()).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Every value of `field` regardless of its shape.
    pub fn values(&self, field: FieldId) -> Result<Vec<EntryValue<'a>>> {
        match self.slot(field)? {
            None => Ok(Vec::new()),
            Some((ty, offset)) if ty.is_list() => {
                let list = ListIterator::open(self.data, offset, ty.is_tuple())?;
                (0..list.count()).map(|i| list.get(i)).collect()
            }
            Some((ty, offset)) => Ok(vec![decode_value(self.data, offset, ty.is_tuple())?]),
        }
    }

    /// The value of a scalar field, or the first element of a list field.
    pub fn first_value(&self, field: FieldId) -> Result<Option<EntryValue<'a>>> {
        match self.slot(field)? {
            None => Ok(None),
            Some((ty, offset)) if ty.is_list() => {
                let list = ListIterator::open(self.data, offset, ty.is_tuple())?;
                if list.count() == 0 {
                    Ok(None)
                } else {
                    list.get(0).map(Some)
                }
            }
            Some((ty, offset)) => decode_value(self.data, offset, ty.is_tuple()).map(Some),
        }
    }

    /// Directory lookup; `None` for missing fields.
    fn slot(&self, field: FieldId) -> Result<Option<(FieldType, usize)>> {
        let field = field as usize;
        if field >= self.slots {
            return Ok(None);
        }
        let at = SLOT_COUNT_LEN + field * SLOT_LEN;
        let ty = FieldType::from_tag(self.data[at])?;
        if ty.is_missing() {
            return Ok(None);
        }
        let offset = LittleEndian::read_u32(&self.data[at + 1..at + SLOT_LEN]) as usize;
        if offset >= self.data.len() {
            return Err(QuarryError::corrupted(format!(
                "field {field} points past the end of the entry"
            )));
        }
        Ok(Some((ty, offset)))
    }

    fn not_a_list(&self, field: FieldId) -> QuarryError {
        QuarryError::type_mismatch(format!(
            "field {field} is {:?}, not a list",
            self.field_type(field)
        ))
    }
}

/// Decode one raw or tuple value starting at `offset`.
fn decode_value(data: &[u8], offset: usize, tuple: bool) -> Result<EntryValue<'_>> {
    let mut pos = offset;
    let numeric = if tuple {
        let end = pos + 16;
        if end > data.len() {
            return Err(QuarryError::corrupted("truncated tuple companions"));
        }
        let long = LittleEndian::read_i64(&data[pos..pos + 8]);
        let double = LittleEndian::read_f64(&data[pos + 8..end]);
        pos = end;
        Some((long, double))
    } else {
        None
    };

    let (len, read) = decode_u64(data.get(pos..).unwrap_or_default())?;
    pos += read;
    let end = pos
        .checked_add(len as usize)
        .filter(|end| *end <= data.len())
        .ok_or_else(|| QuarryError::corrupted("value runs past the end of the entry"))?;

    Ok(EntryValue {
        bytes: &data[pos..end],
        numeric,
    })
}

/// Cursor over the elements of a list field.
///
/// The cursor starts before the first element: call [`read_next`] to advance.
/// Element accessors fail with `OutOfRange` when the cursor is not on an
/// element, and the numeric accessors fail with `TypeMismatch` on a list of
/// raw values.
///
/// [`read_next`]: ListIterator::read_next
#[derive(Debug, Clone)]
pub struct ListIterator<'a> {
    data: &'a [u8],
    table: usize,
    count: usize,
    tuple: bool,
    next: usize,
    current: Option<EntryValue<'a>>,
}

impl<'a> ListIterator<'a> {
    fn open(data: &'a [u8], offset: usize, tuple: bool) -> Result<Self> {
        let (count, read) = decode_u64(&data[offset..])?;
        let count = count as usize;
        let table = offset + read;
        if count
            .checked_mul(4)
            .and_then(|n| n.checked_add(table))
            .is_none_or(|end| end > data.len())
        {
            return Err(QuarryError::corrupted("list offset table is truncated"));
        }
        Ok(ListIterator {
            data,
            table,
            count,
            tuple,
            next: 0,
            current: None,
        })
    }

    /// Number of elements.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether elements carry numeric companions.
    pub fn is_tuple(&self) -> bool {
        self.tuple
    }

    /// Random access to element `index`.
    pub fn get(&self, index: usize) -> Result<EntryValue<'a>> {
        if index >= self.count {
            return Err(QuarryError::out_of_range(format!(
                "element {index} of a list of {}",
                self.count
            )));
        }
        let at = self.table + index * 4;
        let offset = LittleEndian::read_u32(&self.data[at..at + 4]) as usize;
        if offset >= self.data.len() {
            return Err(QuarryError::corrupted("list element points past the entry"));
        }
        decode_value(self.data, offset, self.tuple)
    }

    /// Advance to the next element; `false` once the list is exhausted.
    pub fn read_next(&mut self) -> Result<bool> {
        if self.next >= self.count {
            self.current = None;
            return Ok(false);
        }
        self.current = Some(self.get(self.next)?);
        self.next += 1;
        Ok(true)
    }

    /// Text bytes of the current element.
    pub fn sequence(&self) -> Result<&'a [u8]> {
        Ok(self.current()?.bytes)
    }

    /// Long companion of the current element.
    pub fn long(&self) -> Result<i64> {
        self.numeric().map(|(l, _)| l)
    }

    /// Double companion of the current element.
    pub fn double(&self) -> Result<f64> {
        self.numeric().map(|(_, d)| d)
    }

    fn current(&self) -> Result<EntryValue<'a>> {
        self.current.ok_or_else(|| {
            QuarryError::out_of_range(format!(
                "list cursor is not on an element ({} of {})",
                self.next, self.count
            ))
        })
    }

    fn numeric(&self) -> Result<(i64, f64)> {
        let current = self.current()?;
        current
            .numeric
            .ok_or_else(|| QuarryError::type_mismatch("list element is not a tuple"))
    }
}
