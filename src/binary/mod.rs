// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Wire format for CIFF streams.
//!
//! A CIFF stream is a flat sequence of length-delimited protobuf messages. No
//! magic bytes, no footer, no offsets table: the header says how many records
//! of each kind follow, and the reader simply counts. That makes the format
//! trivially streamable (and gzip-able) at the cost of random access, which is
//! fine for an exchange format that is read exactly once.
//!
//! # Format Overview
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ len: varint │ HEADER                                       │
//! │   1 version: int32            5 total_docs: int32          │
//! │   2 num_postings_lists: int32 6 total_terms: int64         │
//! │   3 num_docs: int32           7 average_doclength: double  │
//! │   4 total_postings_lists      8 description: string        │
//! ├────────────────────────────────────────────────────────────┤
//! │ len: varint │ POSTINGS LIST  (× num_postings_lists)        │
//! │   1 term: string  2 df: int64  3 cf: int64                 │
//! │   4 postings: repeated { 1 docid (gap): int32, 2 tf: int32 }│
//! ├────────────────────────────────────────────────────────────┤
//! │ len: varint │ DOC RECORD     (× num_docs)                  │
//! │   1 docid: int32  2 collection_docid: string               │
//! │   3 doclength: int32                                       │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Field numbers match the reference `CommonIndexFileFormat.proto`, so files
//! written here are readable by the Java and Python tooling and vice versa.

mod docs;
mod encoding;
mod framing;
mod header;
mod postings;

pub use docs::{decode_doc_record, encode_doc_record, DocRecord};
pub use encoding::{
    decode_varint, encode_tag, encode_varint, put_bytes, put_double, put_str, put_uint,
    varint_len, FieldReader, FieldValue, WireType,
};
pub use framing::{read_framed, read_framed_into, write_framed};
pub use header::{
    average_doclength, decode_header, encode_header, Header, MAX_MESSAGE_LEN, MAX_VARINT_BYTES,
    VERSION,
};
pub use postings::{
    absolute_postings, check_gaps, decode_postings, decode_postings_list, encode_postings,
    encode_postings_list, AbsolutePosting, AbsolutePostings, Posting, PostingsList,
};
