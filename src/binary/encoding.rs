// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Binary encoding primitives: varints and protobuf field encoding.
//!
//! CIFF rides on the protobuf wire format, so the only integer encoding we
//! need is the classic varint, plus the field tag that says which field a
//! value belongs to and how it is laid out. Everything here works on byte
//! slices; streaming framing lives in [`super::framing`].
//!
//! # References
//!
//! - **Varint (LEB128)**: Little-endian base-128 variable-length integer encoding.
//!   Originally from DWARF debugging format (1992+), popularized by Protocol Buffers.
//!   See: Google Protocol Buffers encoding: <https://protobuf.dev/programming-guides/encoding/>

use std::io;

use crate::error::{CiffError, Result};

use super::header::MAX_VARINT_BYTES;

/// Largest value a non-negative int32 field can carry.
pub const INT32_MAX: u64 = i32::MAX as u64;

/// Largest value a non-negative int64 field can carry.
pub const INT64_MAX: u64 = i64::MAX as u64;

// ============================================================================
// VARINT ENCODING
// ============================================================================

/// Encode a varint to bytes
pub fn encode_varint(mut value: u64, buf: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            break;
        } else {
            buf.push(byte | 0x80);
        }
    }
}

/// Number of bytes `encode_varint` produces for `value`.
pub fn varint_len(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

/// Decode a varint from bytes, returning (value, bytes_consumed)
///
/// Returns an error if:
/// - Buffer is empty or ends mid-varint
/// - Varint exceeds MAX_VARINT_BYTES or overflows u64
pub fn decode_varint(bytes: &[u8]) -> io::Result<(u64, usize)> {
    if bytes.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "Empty buffer for varint",
        ));
    }

    let mut result: u64 = 0;
    let mut shift = 0;
    let mut i = 0;

    while i < bytes.len() && i < MAX_VARINT_BYTES {
        let byte = bytes[i];
        // The tenth byte may only contribute the top bit of a u64
        if i == MAX_VARINT_BYTES - 1 && byte > 1 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Varint overflows u64",
            ));
        }
        result |= ((byte & 0x7F) as u64) << shift;
        i += 1;
        if byte & 0x80 == 0 {
            return Ok((result, i));
        }
        shift += 7;
    }

    if i >= MAX_VARINT_BYTES {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "Varint exceeds maximum length (possible corruption)",
        ))
    } else {
        Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "Incomplete varint",
        ))
    }
}

// ============================================================================
// FIELD TAGS
// ============================================================================

/// Protobuf wire types. Groups (3, 4) are deprecated and rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
    Fixed32 = 5,
}

/// Largest legal protobuf field number.
const MAX_FIELD_NUMBER: u64 = (1 << 29) - 1;

pub fn encode_tag(field: u32, wire_type: WireType, buf: &mut Vec<u8>) {
    encode_varint(((field as u64) << 3) | wire_type as u64, buf);
}

/// Varint field. Zero is the default and is omitted.
pub fn put_uint(field: u32, value: u64, buf: &mut Vec<u8>) {
    if value != 0 {
        encode_tag(field, WireType::Varint, buf);
        encode_varint(value, buf);
    }
}

/// Double field. Positive zero is the default and is omitted.
pub fn put_double(field: u32, value: f64, buf: &mut Vec<u8>) {
    if value.to_bits() != 0 {
        encode_tag(field, WireType::Fixed64, buf);
        buf.extend_from_slice(&value.to_le_bytes());
    }
}

/// String field. The empty string is the default and is omitted.
pub fn put_str(field: u32, value: &str, buf: &mut Vec<u8>) {
    if !value.is_empty() {
        put_bytes(field, value.as_bytes(), buf);
    }
}

/// Length-delimited field, always written (used for embedded messages).
pub fn put_bytes(field: u32, value: &[u8], buf: &mut Vec<u8>) {
    encode_tag(field, WireType::LengthDelimited, buf);
    encode_varint(value.len() as u64, buf);
    buf.extend_from_slice(value);
}

// ============================================================================
// FIELD DECODING
// ============================================================================

/// A raw field value as laid out on the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Varint(u64),
    Fixed64(u64),
    Fixed32(u32),
    Bytes(&'a [u8]),
}

impl FieldValue<'_> {
    fn wire_name(&self) -> &'static str {
        match self {
            FieldValue::Varint(_) => "varint",
            FieldValue::Fixed64(_) => "fixed64",
            FieldValue::Fixed32(_) => "fixed32",
            FieldValue::Bytes(_) => "length-delimited",
        }
    }
}

/// Walks the fields of one encoded message.
///
/// Errors are reported as `MalformedMessage` tagged with the message name
/// given at construction, so callers never see raw io errors from a buffer.
pub struct FieldReader<'a> {
    message: &'static str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    pub fn new(message: &'static str, bytes: &'a [u8]) -> Self {
        Self {
            message,
            bytes,
            pos: 0,
        }
    }

    fn varint(&mut self, what: &str) -> Result<u64> {
        let (value, consumed) = decode_varint(&self.bytes[self.pos..]).map_err(|e| {
            CiffError::malformed(self.message, format!("{} at byte {}: {}", what, self.pos, e))
        })?;
        self.pos += consumed;
        Ok(value)
    }

    fn take(&mut self, len: u64, what: &str) -> Result<&'a [u8]> {
        let end = usize::try_from(len)
            .ok()
            .and_then(|len| self.pos.checked_add(len))
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| {
                CiffError::malformed(
                    self.message,
                    format!(
                        "{} of {} bytes at byte {} runs past end of message ({} bytes)",
                        what,
                        len,
                        self.pos,
                        self.bytes.len()
                    ),
                )
            })?;
        let bytes: &'a [u8] = self.bytes;
        let slice = &bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// Next `(field_number, value)` pair, or `None` at the end of the message.
    pub fn next_field(&mut self) -> Result<Option<(u32, FieldValue<'a>)>> {
        if self.pos >= self.bytes.len() {
            return Ok(None);
        }

        let tag = self.varint("field tag")?;
        let field = tag >> 3;
        if field == 0 || field > MAX_FIELD_NUMBER {
            return Err(CiffError::malformed(
                self.message,
                format!("invalid field number {}", field),
            ));
        }

        let value = match tag & 0x7 {
            0 => FieldValue::Varint(self.varint("varint field")?),
            1 => {
                let raw = self.take(8, "fixed64 field")?;
                let mut le = [0u8; 8];
                le.copy_from_slice(raw);
                FieldValue::Fixed64(u64::from_le_bytes(le))
            }
            2 => {
                let len = self.varint("field length")?;
                FieldValue::Bytes(self.take(len, "length-delimited field")?)
            }
            5 => {
                let raw = self.take(4, "fixed32 field")?;
                let mut le = [0u8; 4];
                le.copy_from_slice(raw);
                FieldValue::Fixed32(u32::from_le_bytes(le))
            }
            other => {
                return Err(CiffError::malformed(
                    self.message,
                    format!("unsupported wire type {} for field {}", other, field),
                ))
            }
        };

        Ok(Some((field as u32, value)))
    }

    fn wrong_type(&self, field: &str, expected: &str, got: &FieldValue<'_>) -> CiffError {
        CiffError::malformed(
            self.message,
            format!(
                "field '{}' has wire type {}, expected {}",
                field,
                got.wire_name(),
                expected
            ),
        )
    }

    /// Non-negative int32. Negative values arrive sign-extended to ten bytes.
    pub fn int32(&self, field: &str, value: FieldValue<'_>) -> Result<u32> {
        match value {
            FieldValue::Varint(raw) => {
                let signed = raw as i64;
                if (0..=i32::MAX as i64).contains(&signed) {
                    Ok(signed as u32)
                } else {
                    Err(CiffError::malformed(
                        self.message,
                        format!("field '{}' must be a non-negative int32, got {}", field, signed),
                    ))
                }
            }
            other => Err(self.wrong_type(field, "varint", &other)),
        }
    }

    /// Non-negative int64.
    pub fn int64(&self, field: &str, value: FieldValue<'_>) -> Result<u64> {
        match value {
            FieldValue::Varint(raw) => {
                if (raw as i64) < 0 {
                    Err(CiffError::malformed(
                        self.message,
                        format!(
                            "field '{}' must be a non-negative int64, got {}",
                            field, raw as i64
                        ),
                    ))
                } else {
                    Ok(raw)
                }
            }
            other => Err(self.wrong_type(field, "varint", &other)),
        }
    }

    pub fn double(&self, field: &str, value: FieldValue<'_>) -> Result<f64> {
        match value {
            FieldValue::Fixed64(bits) => Ok(f64::from_bits(bits)),
            other => Err(self.wrong_type(field, "fixed64", &other)),
        }
    }

    pub fn string(&self, field: &str, value: FieldValue<'_>) -> Result<String> {
        match value {
            FieldValue::Bytes(bytes) => String::from_utf8(bytes.to_vec()).map_err(|e| {
                CiffError::malformed(
                    self.message,
                    format!("field '{}' is not valid UTF-8: {}", field, e),
                )
            }),
            other => Err(self.wrong_type(field, "length-delimited", &other)),
        }
    }

    pub fn bytes(&self, field: &str, value: FieldValue<'a>) -> Result<&'a [u8]> {
        match value {
            FieldValue::Bytes(bytes) => Ok(bytes),
            other => Err(self.wrong_type(field, "length-delimited", &other)),
        }
    }

    pub fn missing(&self, field: &str) -> CiffError {
        CiffError::malformed(self.message, format!("required field '{}' is absent", field))
    }
}

// ============================================================================
// ENCODE-SIDE RANGE CHECKS
// ============================================================================

/// Refuse an int32 value that [`FieldReader::int32`] would reject.
pub fn check_int32(message: &'static str, field: &'static str, value: u64) -> Result<()> {
    check_range(message, field, value, INT32_MAX)
}

/// Refuse an int64 value that [`FieldReader::int64`] would reject.
pub fn check_int64(message: &'static str, field: &'static str, value: u64) -> Result<()> {
    check_range(message, field, value, INT64_MAX)
}

fn check_range(message: &'static str, field: &'static str, value: u64, max: u64) -> Result<()> {
    if value > max {
        return Err(CiffError::ValueOutOfRange {
            message,
            field,
            value,
            max,
        });
    }
    Ok(())
}


// ============================================================================
// KANI MODEL CHECKING PROOFS
// ============================================================================
//
// Run with: cargo kani
//
// Verified properties:
// 1. encode_varint never panics and emits at most MAX_VARINT_BYTES bytes
// 2. decode_varint never panics for any byte sequence
// 3. Roundtrip: decode(encode(x)) == x for all x

#[cfg(kani)]
mod kani_proofs {
    use super::*;

    #[kani::proof]
    fn verify_encode_varint_no_panic() {
        let value: u64 = kani::any();
        let mut buf = Vec::new();
        encode_varint(value, &mut buf);

        kani::assert(!buf.is_empty(), "encode_varint must produce at least 1 byte");
        kani::assert(
            buf.len() <= MAX_VARINT_BYTES,
            "encode_varint must produce at most MAX_VARINT_BYTES bytes",
        );
        kani::assert(
            buf.last().map_or(false, |&b| b & 0x80 == 0),
            "Last byte must not have continuation bit",
        );
    }

    #[kani::proof]
    #[kani::unwind(12)]
    fn verify_decode_varint_no_panic() {
        let len: usize = kani::any_where(|&n| n <= MAX_VARINT_BYTES + 1);
        let mut bytes = [0u8; 11];
        for i in 0..len {
            bytes[i] = kani::any();
        }

        if let Ok((_, consumed)) = decode_varint(&bytes[..len]) {
            kani::assert(consumed > 0, "Must consume at least 1 byte on success");
            kani::assert(consumed <= len, "Cannot consume more bytes than available");
        }
    }

    #[kani::proof]
    #[kani::unwind(12)]
    fn verify_varint_roundtrip() {
        let original: u64 = kani::any();
        let mut buf = Vec::new();
        encode_varint(original, &mut buf);

        let result = decode_varint(&buf);
        kani::assert(result.is_ok(), "Decoding encoded value must succeed");
        let (decoded, consumed) = result.unwrap();
        kani::assert(decoded == original, "Roundtrip must preserve value");
        kani::assert(consumed == buf.len(), "Must consume exactly the encoded bytes");
    }
}
