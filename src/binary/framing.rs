// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Length-delimited framing over byte streams.
//!
//! Every record in a CIFF stream is a varint byte count followed by that many
//! message bytes, the same layout protobuf's `writeDelimitedTo` produces. The
//! framing layer knows nothing about what is inside a frame.
//!
//! End-of-stream is only clean when it lands exactly on a frame boundary.
//! Running dry inside the length prefix or the payload is `TruncatedStream`.

use std::io::{self, Read, Write};

use tracing::trace;

use crate::error::{CiffError, Result};

use super::encoding::encode_varint;
use super::header::{MAX_MESSAGE_LEN, MAX_VARINT_BYTES};

/// Never reserve more than this up front, whatever the prefix claims.
const PREALLOC_LIMIT: u64 = 1 << 20;

/// Write one length-prefixed frame.
pub fn write_framed<W: Write + ?Sized>(sink: &mut W, message: &[u8]) -> Result<()> {
    let mut prefix = Vec::with_capacity(MAX_VARINT_BYTES);
    encode_varint(message.len() as u64, &mut prefix);
    sink.write_all(&prefix)?;
    sink.write_all(message)?;
    trace!(bytes = message.len(), "wrote frame");
    Ok(())
}

/// Read one frame into a fresh buffer. `None` at a clean end of stream.
pub fn read_framed<R: Read + ?Sized>(source: &mut R) -> Result<Option<Vec<u8>>> {
    let mut buf = Vec::new();
    if read_framed_into(source, &mut buf, MAX_MESSAGE_LEN)? {
        Ok(Some(buf))
    } else {
        Ok(None)
    }
}

/// Read one frame into `buf` (cleared first), rejecting frames above `max_len`.
///
/// Returns `false` at a clean end of stream. Lets the stream reader reuse one
/// buffer for every record.
pub fn read_framed_into<R: Read + ?Sized>(
    source: &mut R,
    buf: &mut Vec<u8>,
    max_len: u64,
) -> Result<bool> {
    buf.clear();

    let len = match read_length_prefix(source)? {
        Some(len) => len,
        None => return Ok(false),
    };

    if len > max_len {
        return Err(CiffError::malformed(
            "frame",
            format!("declared length {} exceeds limit {}", len, max_len),
        ));
    }

    buf.reserve(len.min(PREALLOC_LIMIT) as usize);
    let read = (&mut *source).take(len).read_to_end(buf)? as u64;
    if read < len {
        return Err(CiffError::truncated(format!(
            "payload ended after {} of {} bytes",
            read, len
        )));
    }

    trace!(bytes = len, "read frame");
    Ok(true)
}

/// Read a varint length prefix byte by byte.
fn read_length_prefix<R: Read + ?Sized>(source: &mut R) -> Result<Option<u64>> {
    let mut result: u64 = 0;

    for i in 0..MAX_VARINT_BYTES {
        let byte = match read_byte(source)? {
            Some(byte) => byte,
            None if i == 0 => return Ok(None),
            None => {
                return Err(CiffError::truncated(format!(
                    "length prefix ended after {} bytes",
                    i
                )))
            }
        };

        if i == MAX_VARINT_BYTES - 1 && byte > 1 {
            return Err(CiffError::malformed("frame", "length prefix overflows u64"));
        }
        result |= ((byte & 0x7F) as u64) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(Some(result));
        }
    }

    Err(CiffError::malformed(
        "frame",
        format!("length prefix exceeds {} bytes", MAX_VARINT_BYTES),
    ))
}

fn read_byte<R: Read + ?Sized>(source: &mut R) -> Result<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        match source.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}
