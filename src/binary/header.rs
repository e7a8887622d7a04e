// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The collection header and format-wide constants.
//!
//! The header is always the first record. It declares how many postings lists
//! and doc records follow, which is what drives the reader's state machine,
//! and it carries the collection statistics the integrity checks compare
//! against.
//!
//! `num_*` counts describe this stream; `total_*` counts describe the full
//! source collection. They differ when the export was filtered to a subset of
//! terms, and only when they agree can the aggregate checks say anything.

use serde::Serialize;

use crate::error::{CiffError, Result};

use super::encoding::{check_int32, check_int64, put_double, put_str, put_uint, FieldReader};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Format version written by this crate.
pub const VERSION: u32 = 1;

/// Maximum varint bytes (u64 needs at most 10 bytes)
pub const MAX_VARINT_BYTES: usize = 10;

/// Largest frame the reader accepts by default. Protobuf messages cannot
/// exceed 2 GiB, so nothing legitimate is larger.
pub const MAX_MESSAGE_LEN: u64 = i32::MAX as u64;

// Field numbers, shared with the reference `CommonIndexFileFormat.proto`.
const FIELD_VERSION: u32 = 1;
const FIELD_NUM_POSTINGS_LISTS: u32 = 2;
const FIELD_NUM_DOCS: u32 = 3;
const FIELD_TOTAL_POSTINGS_LISTS: u32 = 4;
const FIELD_TOTAL_DOCS: u32 = 5;
const FIELD_TOTAL_TERMS: u32 = 6;
const FIELD_AVERAGE_DOCLENGTH: u32 = 7;
const FIELD_DESCRIPTION: u32 = 8;

// ============================================================================
// HEADER
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    pub version: u32,
    /// Postings lists present in this stream.
    pub num_postings_lists: u32,
    /// Doc records present in this stream.
    pub num_doc_records: u32,
    /// Postings lists (vocabulary size) of the full collection.
    pub total_postings_lists: u32,
    /// Documents in the full collection.
    pub total_docs: u32,
    /// Sum of every document's length in terms.
    pub total_terms_in_collection: u64,
    /// Informational; never re-verified.
    pub average_doclength: f64,
    pub description: String,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            version: VERSION,
            num_postings_lists: 0,
            num_doc_records: 0,
            total_postings_lists: 0,
            total_docs: 0,
            total_terms_in_collection: 0,
            average_doclength: 0.0,
            description: String::new(),
        }
    }
}

impl Header {
    /// Header for a complete export: `num_*` equal `total_*` and the average
    /// doc length is derived from the totals.
    pub fn complete(
        num_postings_lists: u32,
        num_doc_records: u32,
        total_terms_in_collection: u64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            version: VERSION,
            num_postings_lists,
            num_doc_records,
            total_postings_lists: num_postings_lists,
            total_docs: num_doc_records,
            total_terms_in_collection,
            average_doclength: average_doclength(total_terms_in_collection, num_doc_records),
            description: description.into(),
        }
    }

    /// Refuse a header the reader would reject: a zero version, or a count
    /// past the int32/int64 range of its field.
    pub fn check_encodable(&self) -> Result<()> {
        if self.version == 0 {
            return Err(CiffError::InvalidInput(
                "header version must be non-zero".to_string(),
            ));
        }
        check_int32("Header", "version", self.version as u64)?;
        check_int32("Header", "num_postings_lists", self.num_postings_lists as u64)?;
        check_int32("Header", "num_docs", self.num_doc_records as u64)?;
        check_int32("Header", "total_postings_lists", self.total_postings_lists as u64)?;
        check_int32("Header", "total_docs", self.total_docs as u64)?;
        check_int64(
            "Header",
            "total_terms_in_collection",
            self.total_terms_in_collection,
        )
    }

    /// True when the stream claims to carry the whole collection.
    pub fn is_complete_export(&self) -> bool {
        self.num_postings_lists == self.total_postings_lists
            && self.num_doc_records == self.total_docs
    }
}

/// `total_terms / total_docs`, or 0 for an empty collection.
pub fn average_doclength(total_terms_in_collection: u64, total_docs: u32) -> f64 {
    if total_docs == 0 {
        0.0
    } else {
        total_terms_in_collection as f64 / total_docs as f64
    }
}

pub fn encode_header(header: &Header, buf: &mut Vec<u8>) {
    put_uint(FIELD_VERSION, header.version as u64, buf);
    put_uint(FIELD_NUM_POSTINGS_LISTS, header.num_postings_lists as u64, buf);
    put_uint(FIELD_NUM_DOCS, header.num_doc_records as u64, buf);
    put_uint(FIELD_TOTAL_POSTINGS_LISTS, header.total_postings_lists as u64, buf);
    put_uint(FIELD_TOTAL_DOCS, header.total_docs as u64, buf);
    put_uint(FIELD_TOTAL_TERMS, header.total_terms_in_collection, buf);
    put_double(FIELD_AVERAGE_DOCLENGTH, header.average_doclength, buf);
    put_str(FIELD_DESCRIPTION, &header.description, buf);
}

/// Decode a header. `version` is the one required field: a zero version
/// (absent on the wire) means the bytes are not a CIFF header.
pub fn decode_header(bytes: &[u8]) -> Result<Header> {
    let mut reader = FieldReader::new("Header", bytes);
    let mut header = Header {
        version: 0,
        ..Header::default()
    };

    while let Some((field, value)) = reader.next_field()? {
        match field {
            FIELD_VERSION => header.version = reader.int32("version", value)?,
            FIELD_NUM_POSTINGS_LISTS => {
                header.num_postings_lists = reader.int32("num_postings_lists", value)?
            }
            FIELD_NUM_DOCS => header.num_doc_records = reader.int32("num_docs", value)?,
            FIELD_TOTAL_POSTINGS_LISTS => {
                header.total_postings_lists = reader.int32("total_postings_lists", value)?
            }
            FIELD_TOTAL_DOCS => header.total_docs = reader.int32("total_docs", value)?,
            FIELD_TOTAL_TERMS => {
                header.total_terms_in_collection =
                    reader.int64("total_terms_in_collection", value)?
            }
            FIELD_AVERAGE_DOCLENGTH => {
                header.average_doclength = reader.double("average_doclength", value)?
            }
            FIELD_DESCRIPTION => header.description = reader.string("description", value)?,
            _ => {} // unknown fields are skipped
        }
    }

    if header.version == 0 {
        return Err(reader.missing("version"));
    }

    Ok(header)
}
