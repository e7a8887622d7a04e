// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Pull-based stream reader.
//!
//! The header's declared counts drive a small state machine: postings lists
//! until `num_postings_lists` are consumed, then doc records until
//! `num_doc_records` are consumed, then nothing. There is no message-type tag
//! on the wire, so the reader must know what comes next; asking for the wrong
//! kind is a caller bug and is refused before any bytes are read.
//!
//! Every postings list is checked as it arrives (declared `df` against the
//! postings present, gaps positive) and every doc record's docid must equal
//! its position. A failure here is fatal: once a record's shape is wrong,
//! nothing after it can be trusted.

use std::io::Read;

use tracing::debug;

use crate::binary::{
    check_gaps, decode_doc_record, decode_header, decode_postings_list, read_framed_into,
    DocRecord, Header, PostingsList, MAX_MESSAGE_LEN,
};
use crate::error::{CiffError, RecordKind, Result};

/// Reader configuration.
#[derive(Debug, Clone, Copy)]
pub struct ReaderOptions {
    /// Frames declaring more bytes than this are rejected as malformed.
    pub max_message_len: u64,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            max_message_len: MAX_MESSAGE_LEN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Postings { remaining: u32 },
    Docs { remaining: u32 },
    Finished,
}

/// One decoded record after the header.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    PostingsList(PostingsList),
    DocRecord(DocRecord),
}

pub struct StreamReader<R: Read> {
    source: R,
    header: Header,
    options: ReaderOptions,
    phase: Phase,
    /// Set once the first doc record has been requested.
    docs_started: bool,
    /// Set once `None` was handed out for the postings section.
    postings_ended: bool,
    /// Set once `None` was handed out for the doc records section.
    docs_ended: bool,
    postings_read: u32,
    docs_read: u32,
    buf: Vec<u8>,
}

impl<R: Read> StreamReader<R> {
    /// Read the header and position the reader at the first postings list.
    pub fn open(source: R) -> Result<Self> {
        Self::with_options(source, ReaderOptions::default())
    }

    pub fn with_options(mut source: R, options: ReaderOptions) -> Result<Self> {
        let mut buf = Vec::new();
        if !read_framed_into(&mut source, &mut buf, options.max_message_len)? {
            return Err(CiffError::truncated("stream is empty, expected a Header"));
        }
        let header = decode_header(&buf)?;
        debug!(
            version = header.version,
            num_postings_lists = header.num_postings_lists,
            num_doc_records = header.num_doc_records,
            "read header"
        );

        let phase = initial_phase(&header);
        Ok(Self {
            source,
            header,
            options,
            phase,
            docs_started: false,
            postings_ended: false,
            docs_ended: false,
            postings_read: 0,
            docs_read: 0,
            buf,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Which record kind the next successful read will produce.
    pub fn next_kind(&self) -> Option<RecordKind> {
        match self.phase {
            Phase::Postings { .. } => Some(RecordKind::PostingsList),
            Phase::Docs { .. } => Some(RecordKind::DocRecord),
            Phase::Finished => None,
        }
    }

    pub fn postings_lists_read(&self) -> u32 {
        self.postings_read
    }

    pub fn doc_records_read(&self) -> u32 {
        self.docs_read
    }

    /// Next postings list, or `None` once all declared lists were read.
    ///
    /// The `None` is handed out once. Asking again after it, or after doc
    /// records have started, is a protocol violation.
    pub fn next_postings_list(&mut self) -> Result<Option<PostingsList>> {
        let remaining = match self.phase {
            Phase::Postings { remaining } => remaining,
            _ if self.docs_started || self.postings_ended => {
                return Err(CiffError::ProtocolOrderViolation {
                    requested: RecordKind::PostingsList,
                    expected: self.expectation(),
                })
            }
            _ => {
                self.postings_ended = true;
                return Ok(None);
            }
        };

        let ordinal = self.postings_read;
        self.read_frame(RecordKind::PostingsList, ordinal)?;
        let list = decode_postings_list(&self.buf)?;
        list.check_df()?;
        check_gaps(&list.postings)?;

        self.postings_read += 1;
        self.phase = if remaining > 1 {
            Phase::Postings {
                remaining: remaining - 1,
            }
        } else {
            docs_phase(&self.header)
        };
        Ok(Some(list))
    }

    /// Next doc record, or `None` once all declared records were read.
    ///
    /// Asking before every declared postings list was consumed, or again after
    /// the `None`, is a protocol violation.
    pub fn next_doc_record(&mut self) -> Result<Option<DocRecord>> {
        let remaining = match self.phase {
            Phase::Docs { remaining } => remaining,
            Phase::Postings { .. } => {
                return Err(CiffError::ProtocolOrderViolation {
                    requested: RecordKind::DocRecord,
                    expected: self.expectation(),
                })
            }
            Phase::Finished if self.docs_ended => {
                return Err(CiffError::ProtocolOrderViolation {
                    requested: RecordKind::DocRecord,
                    expected: self.expectation(),
                })
            }
            Phase::Finished => {
                self.docs_started = true;
                self.docs_ended = true;
                return Ok(None);
            }
        };
        self.docs_started = true;

        let ordinal = self.docs_read;
        self.read_frame(RecordKind::DocRecord, ordinal)?;
        let record = decode_doc_record(&self.buf)?;
        if record.docid != ordinal {
            return Err(CiffError::DocidOutOfSequence {
                expected: ordinal,
                actual: record.docid,
            });
        }

        self.docs_read += 1;
        self.phase = if remaining > 1 {
            Phase::Docs {
                remaining: remaining - 1,
            }
        } else {
            Phase::Finished
        };
        Ok(Some(record))
    }

    /// Next record of whichever kind comes next. Keeps returning `None` at
    /// the end of the stream.
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        match self.next_kind() {
            Some(RecordKind::PostingsList) => {
                Ok(self.next_postings_list()?.map(Record::PostingsList))
            }
            Some(RecordKind::DocRecord) => Ok(self.next_doc_record()?.map(Record::DocRecord)),
            _ => Ok(None),
        }
    }

    /// Consume the reader as a lazy record iterator.
    pub fn records(self) -> Records<R> {
        Records {
            reader: self,
            failed: false,
        }
    }

    /// Check that nothing follows the declared records and return the source.
    pub fn finish(mut self) -> Result<R> {
        if self.phase != Phase::Finished {
            return Err(CiffError::ProtocolOrderViolation {
                requested: RecordKind::Header,
                expected: self.expectation(),
            });
        }
        if read_framed_into(&mut self.source, &mut self.buf, self.options.max_message_len)? {
            return Err(CiffError::malformed(
                "stream",
                format!(
                    "trailing record after the declared {} postings lists and {} doc records",
                    self.header.num_postings_lists, self.header.num_doc_records
                ),
            ));
        }
        Ok(self.source)
    }

    /// Give back the source without further checks.
    pub fn into_inner(self) -> R {
        self.source
    }

    fn read_frame(&mut self, kind: RecordKind, ordinal: u32) -> Result<()> {
        let found = read_framed_into(&mut self.source, &mut self.buf, self.options.max_message_len)
            .map_err(|e| match e {
                CiffError::TruncatedStream { context } => {
                    CiffError::truncated(format!("{} #{}: {}", kind, ordinal, context))
                }
                other => other,
            })?;
        if !found {
            let declared = match kind {
                RecordKind::PostingsList => self.header.num_postings_lists,
                _ => self.header.num_doc_records,
            };
            return Err(CiffError::truncated(format!(
                "stream ended before {} #{} (header declares {})",
                kind, ordinal, declared
            )));
        }
        Ok(())
    }

    fn expectation(&self) -> String {
        match self.phase {
            Phase::Postings { remaining } => format!("PostingsList ({} remaining)", remaining),
            Phase::Docs { remaining } => format!("DocRecord ({} remaining)", remaining),
            Phase::Finished => "end of stream".to_string(),
        }
    }
}

fn initial_phase(header: &Header) -> Phase {
    if header.num_postings_lists > 0 {
        Phase::Postings {
            remaining: header.num_postings_lists,
        }
    } else {
        docs_phase(header)
    }
}

fn docs_phase(header: &Header) -> Phase {
    if header.num_doc_records > 0 {
        Phase::Docs {
            remaining: header.num_doc_records,
        }
    } else {
        Phase::Finished
    }
}

/// Iterator returned by [`StreamReader::records`]. Fuses after the first error.
pub struct Records<R: Read> {
    reader: StreamReader<R>,
    failed: bool,
}

impl<R: Read> Records<R> {
    pub fn header(&self) -> &Header {
        self.reader.header()
    }

    pub fn into_reader(self) -> StreamReader<R> {
        self.reader
    }
}

impl<R: Read> Iterator for Records<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.reader.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
