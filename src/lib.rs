// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Streaming codec for the Common Index File Format (CIFF).
//!
//! CIFF moves inverted indexes between search engines: one header, then every
//! postings list, then every document record, each a length-prefixed protobuf
//! message. This crate encodes and decodes that stream one record at a time
//! and checks that what it reads is consistent.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │   binary     │────▶│    stream    │────▶│    verify    │
//! │ (varint,     │     │ (StreamWriter│     │ (Totals fold,│
//! │  schema,     │     │  StreamReader│     │  Integrity-  │
//! │  delta codec)│     │  Records)    │     │  Report)     │
//! └──────────────┘     └──────────────┘     └──────────────┘
//!        ▲                    ▲   │
//!        │                    │   ▼
//! ┌──────────────┐     ┌──────────────┐
//! │    build     │     │     sink     │
//! │ (IndexSource,│     │ (OldDog CSV) │
//! │  export)     │     │              │
//! └──────────────┘     └──────────────┘
//! ```
//!
//! | Module        | Role                                                   |
//! |---------------|--------------------------------------------------------|
//! | `binary`      | Varint framing, message schema, docid gap codec        |
//! | `stream`      | Sequential writer and protocol-enforcing reader        |
//! | `verify`      | Aggregate integrity checks as a fold over records      |
//! | `build`       | Source collaborator interface and exporter             |
//! | `sink`        | Pipe-separated tables for relational loading           |
//! | `compression` | Transparent `.gz` / `.br` layer by file extension      |
//!
//! # Usage
//!
//! ```
//! use ciff::{DocRecord, Header, PostingsList, StreamReader, StreamWriter};
//!
//! let header = Header::complete(1, 2, 3, "example");
//! let mut writer = StreamWriter::begin(Vec::new(), &header)?;
//! writer.write_postings_list(&PostingsList::from_absolute("cat", &[0, 1], &[1, 2])?)?;
//! writer.write_doc_record(&DocRecord { docid: 0, collection_docid: "A".into(), doclength: 1 })?;
//! writer.write_doc_record(&DocRecord { docid: 1, collection_docid: "B".into(), doclength: 2 })?;
//! let (bytes, _) = writer.finish()?;
//!
//! let report = ciff::verify_stream(StreamReader::open(bytes.as_slice())?)?;
//! assert!(report.is_consistent());
//! # Ok::<(), ciff::CiffError>(())
//! ```

pub mod binary;
pub mod build;
pub mod compression;
pub mod error;
pub mod sink;
pub mod stream;
pub mod utils;
pub mod verify;

pub use binary::{
    absolute_postings, decode_postings, encode_postings, AbsolutePosting, DocRecord, Header,
    Posting, PostingsList, VERSION,
};
pub use error::{CiffError, RecordKind, Result};
pub use stream::{ReaderOptions, Record, Records, StreamReader, StreamWriter, WriteSummary};
pub use utils::{normalize, tokenize};
pub use verify::{
    verify_stream, verify_stream_with, CheckStatus, DocidRange, IntegrityCheck, IntegrityReport,
    Totals,
};
