//! Entry writer.
//!
//! # Examples
//!
//! ```
//! use quarry::entry::{IndexEntryReader, IndexEntryWriter};
//!
//! let mut buffer = vec![0u8; 256];
//! let mut writer = IndexEntryWriter::with_field_count(&mut buffer, 3);
//! writer.write(0, b"entry/1").unwrap();
//! writer.write_tuple(1, b"1.001", 1, 1.001).unwrap();
//! writer.write_list(2, ["road", "lake"]).unwrap();
//! let entry = writer.finish().unwrap();
//!
//! let reader = IndexEntryReader::new(entry).unwrap();
//! assert_eq!(reader.read(0).unwrap(), Some(&b"entry/1"[..]));
//! assert_eq!(reader.read_long(1).unwrap(), Some(1));
//! assert_eq!(reader.read_at(2, 1).unwrap(), Some(&b"lake"[..]));
//! ```

use byteorder::{ByteOrder, LittleEndian};

use crate::entry::field_type::FieldType;
use crate::entry::{SLOT_COUNT_LEN, SLOT_LEN, header_len};
use crate::error::{QuarryError, Result};
use crate::schema::{FieldId, FieldSchema};
use crate::util::varint::encode_u64;

/// Writes one entry into a fixed, caller-provided buffer.
///
/// Writes past the end of the buffer are not an error by themselves: the
/// writer keeps counting how many bytes the entry needs and [`finish`]
/// reports [`QuarryError::CapacityExceeded`] with that size, so the caller
/// can retry with a large enough buffer.
///
/// [`finish`]: IndexEntryWriter::finish
pub struct IndexEntryWriter<'a> {
    buf: &'a mut [u8],
    directory: Vec<(FieldType, u32)>,
    position: usize,
}

impl<'a> IndexEntryWriter<'a> {
    /// Create a writer with one slot per field of `schema`.
    pub fn new(buf: &'a mut [u8], schema: &FieldSchema) -> Self {
        Self::with_field_count(buf, schema.len())
    }

    /// Create a writer with `fields` slots.
    pub fn with_field_count(buf: &'a mut [u8], fields: usize) -> Self {
        IndexEntryWriter {
            buf,
            directory: vec![(FieldType::Missing, 0); fields],
            position: header_len(fields),
        }
    }

    /// Number of field slots.
    pub fn field_count(&self) -> usize {
        self.directory.len()
    }

    /// Bytes the entry needs so far.
    pub fn len(&self) -> usize {
        self.position
    }

    pub fn is_empty(&self) -> bool {
        self.directory.iter().all(|(ty, _)| ty.is_missing())
    }

    /// Write a raw value.
    pub fn write(&mut self, field: FieldId, value: &[u8]) -> Result<()> {
        self.begin(field, FieldType::Raw)?;
        self.put_raw(value);
        Ok(())
    }

    /// Write a tuple value: text plus its long and double companions.
    pub fn write_tuple(&mut self, field: FieldId, value: &[u8], long: i64, double: f64) -> Result<()> {
        self.begin(field, FieldType::Tuple)?;
        self.put_tuple(value, long, double);
        Ok(())
    }

    /// Write a list of raw values.
    pub fn write_list<I, T>(&mut self, field: FieldId, values: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let values: Vec<T> = values.into_iter().collect();
        self.begin(field, FieldType::List)?;

        let table = self.put_list_header(values.len());
        for (i, value) in values.iter().enumerate() {
            self.patch_offset(table, i);
            self.put_raw(value.as_ref());
        }
        Ok(())
    }

    /// Write a list of tuple values with parallel long and double companions.
    pub fn write_tuple_list<I, T>(
        &mut self,
        field: FieldId,
        values: I,
        longs: &[i64],
        doubles: &[f64],
    ) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let values: Vec<T> = values.into_iter().collect();
        self.check(field)?;
        if values.len() != longs.len() || values.len() != doubles.len() {
            return Err(QuarryError::invalid_argument(format!(
                "field {field}: {} values, {} longs, {} doubles",
                values.len(),
                longs.len(),
                doubles.len()
            )));
        }
        self.begin(field, FieldType::TupleList)?;

        let table = self.put_list_header(values.len());
        for (i, value) in values.iter().enumerate() {
            self.patch_offset(table, i);
            self.put_tuple(value.as_ref(), longs[i], doubles[i]);
        }
        Ok(())
    }

    /// Finish the entry and return the encoded bytes.
    pub fn finish(self) -> Result<&'a [u8]> {
        if self.directory.len() > u16::MAX as usize {
            return Err(QuarryError::out_of_range(format!(
                "{} field slots exceed the limit of {}",
                self.directory.len(),
                u16::MAX
            )));
        }
        let needed = self.position;
        let available = self.buf.len();
        if needed > available {
            return Err(QuarryError::CapacityExceeded { needed, available });
        }
        if needed > u32::MAX as usize {
            return Err(QuarryError::CapacityExceeded {
                needed,
                available: u32::MAX as usize,
            });
        }

        let buf = self.buf;
        LittleEndian::write_u16(&mut buf[..SLOT_COUNT_LEN], self.directory.len() as u16);
        for (i, (ty, offset)) in self.directory.iter().enumerate() {
            let slot = SLOT_COUNT_LEN + i * SLOT_LEN;
            buf[slot] = ty.tag();
            LittleEndian::write_u32(&mut buf[slot + 1..slot + SLOT_LEN], *offset);
        }

        let frozen: &'a [u8] = buf;
        Ok(&frozen[..needed])
    }

    fn check(&self, field: FieldId) -> Result<()> {
        match self.directory.get(field as usize) {
            None => Err(QuarryError::out_of_range(format!(
                "field {field} outside an entry of {} fields",
                self.directory.len()
            ))),
            Some((ty, _)) if !ty.is_missing() => Err(QuarryError::FieldAlreadyWritten(field)),
            Some(_) => Ok(()),
        }
    }

    fn begin(&mut self, field: FieldId, ty: FieldType) -> Result<()> {
        self.check(field)?;
        self.directory[field as usize] = (ty, self.position as u32);
        Ok(())
    }

    fn put(&mut self, bytes: &[u8]) {
        let end = self.position + bytes.len();
        if end <= self.buf.len() {
            self.buf[self.position..end].copy_from_slice(bytes);
        }
        self.position = end;
    }

    fn put_raw(&mut self, value: &[u8]) {
        self.put(&encode_u64(value.len() as u64));
        self.put(value);
    }

    fn put_tuple(&mut self, value: &[u8], long: i64, double: f64) {
        let mut numbers = [0u8; 16];
        LittleEndian::write_i64(&mut numbers[..8], long);
        LittleEndian::write_f64(&mut numbers[8..], double);
        self.put(&numbers);
        self.put_raw(value);
    }

    /// Writes the count and reserves the offset table; returns its position.
    fn put_list_header(&mut self, count: usize) -> usize {
        self.put(&encode_u64(count as u64));
        let table = self.position;
        self.position += count * 4;
        table
    }

    fn patch_offset(&mut self, table: usize, index: usize) {
        let slot = table + index * 4;
        if slot + 4 <= self.buf.len() {
            LittleEndian::write_u32(&mut self.buf[slot..slot + 4], self.position as u32);
        }
    }
}
