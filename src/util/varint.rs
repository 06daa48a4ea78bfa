//! Variable-length integer encoding utilities.
//!
//! Uses 7 bits per byte with a continuation bit, as in protocol buffers.
//! Entry and posting-list encodings are built on these helpers, so decoding
//! reports truncated or overlong input as [`QuarryError::Corrupted`].

use crate::error::{QuarryError, Result};

/// Maximum number of bytes a u64 varint can occupy.
pub const MAX_VARINT_LEN: usize = 10;

/// Encode a u64 value using variable-length encoding.
pub fn encode_u64(value: u64) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(encoded_len_u64(value));
    encode_u64_into(value, &mut bytes);
    bytes
}

/// Append the variable-length encoding of `value` to `out`.
pub fn encode_u64_into(value: u64, out: &mut Vec<u8>) {
    let mut val = value;

    loop {
        let mut byte = (val & 0x7F) as u8;
        val >>= 7;

        if val != 0 {
            byte |= 0x80; // Set continuation bit
        }

        out.push(byte);

        if val == 0 {
            break;
        }
    }
}

/// Write the encoding of `value` into a fixed slice.
///
/// Returns the number of bytes written, or `None` if `out` is too small.
pub fn write_u64_to(value: u64, out: &mut [u8]) -> Option<usize> {
    let len = encoded_len_u64(value);
    if out.len() < len {
        return None;
    }

    let mut val = value;
    for slot in out.iter_mut().take(len) {
        let mut byte = (val & 0x7F) as u8;
        val >>= 7;
        if val != 0 {
            byte |= 0x80;
        }
        *slot = byte;
    }

    Some(len)
}

/// Number of bytes needed to encode `value`.
pub fn encoded_len_u64(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.max(1).div_ceil(7)
}

/// Decode a u64 value from variable-length encoding.
///
/// Returns the value and the number of bytes consumed.
pub fn decode_u64(bytes: &[u8]) -> Result<(u64, usize)> {
    let mut result = 0u64;
    let mut shift = 0;
    let mut bytes_read = 0;

    for &byte in bytes {
        bytes_read += 1;

        if shift >= 64 {
            return Err(QuarryError::corrupted("VarInt overflow"));
        }

        result |= ((byte & 0x7F) as u64) << shift;

        if (byte & 0x80) == 0 {
            return Ok((result, bytes_read));
        }

        shift += 7;
    }

    Err(QuarryError::corrupted("Incomplete VarInt"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_u64() {
        let test_values = [0, 1, 127, 128, 255, 256, 16383, 16384, u64::MAX];

        for &value in &test_values {
            let encoded = encode_u64(value);
            let (decoded, bytes_read) = decode_u64(&encoded).unwrap();

            assert_eq!(value, decoded);
            assert_eq!(encoded.len(), bytes_read);
            assert_eq!(encoded.len(), encoded_len_u64(value));
        }
    }

    #[test]
    fn test_write_to_slice() {
        let mut buffer = [0u8; 4];
        assert_eq!(write_u64_to(300, &mut buffer), Some(2));
        assert_eq!(decode_u64(&buffer).unwrap(), (300, 2));

        let mut small = [0u8; 1];
        assert_eq!(write_u64_to(300, &mut small), None);
    }

    #[test]
    fn test_max_len() {
        assert_eq!(encoded_len_u64(u64::MAX), MAX_VARINT_LEN);
    }

    #[test]
    fn test_truncated_input() {
        let encoded = encode_u64(1 << 40);
        let err = decode_u64(&encoded[..2]).unwrap_err();
        assert!(matches!(err, QuarryError::Corrupted(_)));
    }
}
