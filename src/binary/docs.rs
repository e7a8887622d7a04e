// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Per-document records.

use crate::error::Result;

use super::encoding::{check_int32, put_str, put_uint, FieldReader};

const FIELD_DOCID: u32 = 1;
const FIELD_COLLECTION_DOCID: u32 = 2;
const FIELD_DOCLENGTH: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocRecord {
    /// Internal 0-based id; equals the record's position in the stream.
    pub docid: u32,
    /// Opaque external identifier from the source collection.
    pub collection_docid: String,
    /// Length of the document in terms.
    pub doclength: u32,
}

impl DocRecord {
    /// Refuse a record whose docid or doclength does not fit an int32.
    pub fn check_encodable(&self) -> Result<()> {
        check_int32("DocRecord", "docid", self.docid as u64)?;
        check_int32("DocRecord", "doclength", self.doclength as u64)
    }
}

pub fn encode_doc_record(record: &DocRecord, buf: &mut Vec<u8>) {
    put_uint(FIELD_DOCID, record.docid as u64, buf);
    put_str(FIELD_COLLECTION_DOCID, &record.collection_docid, buf);
    put_uint(FIELD_DOCLENGTH, record.doclength as u64, buf);
}

pub fn decode_doc_record(bytes: &[u8]) -> Result<DocRecord> {
    let mut reader = FieldReader::new("DocRecord", bytes);
    let mut record = DocRecord {
        docid: 0,
        collection_docid: String::new(),
        doclength: 0,
    };

    while let Some((field, value)) = reader.next_field()? {
        match field {
            FIELD_DOCID => record.docid = reader.int32("docid", value)?,
            FIELD_COLLECTION_DOCID => {
                record.collection_docid = reader.string("collection_docid", value)?
            }
            FIELD_DOCLENGTH => record.doclength = reader.int32("doclength", value)?,
            _ => {}
        }
    }

    Ok(record)
}
