// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Stream writer: Header, then postings lists, then doc records.
//!
//! The writer frames and appends; it never buffers records and never
//! reorders them. Order and counts are the caller's job. What the writer does
//! do is keep score, so `finish` can tell the caller (and the log) whether the
//! stream it produced matches the header it started with.

use std::io::Write;

use tracing::{debug, warn};

use crate::binary::{
    encode_doc_record, encode_header, encode_postings_list, write_framed, DocRecord, Header,
    PostingsList,
};
use crate::error::Result;

/// Running totals for everything written after the header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub postings_lists: u64,
    pub doc_records: u64,
    /// Sum of every posting's `tf`.
    pub tf_sum: u64,
    /// Sum of every doc record's `doclength`.
    pub doclength_sum: u64,
    /// Bytes handed to the sink, length prefixes included.
    pub bytes_written: u64,
}

pub struct StreamWriter<W: Write> {
    sink: W,
    header: Header,
    buf: Vec<u8>,
    summary: WriteSummary,
}

impl<W: Write> StreamWriter<W> {
    /// Write the header and return a writer positioned for the first record.
    ///
    /// Every record is checked against what the reader accepts before any of
    /// its bytes reach the sink.
    pub fn begin(mut sink: W, header: &Header) -> Result<Self> {
        header.check_encodable()?;
        let mut buf = Vec::with_capacity(256);
        encode_header(header, &mut buf);
        write_framed(&mut sink, &buf)?;
        debug!(
            num_postings_lists = header.num_postings_lists,
            num_doc_records = header.num_doc_records,
            "wrote header"
        );

        let bytes_written = frame_size(buf.len());
        Ok(Self {
            sink,
            header: header.clone(),
            buf,
            summary: WriteSummary {
                bytes_written,
                ..WriteSummary::default()
            },
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn summary(&self) -> &WriteSummary {
        &self.summary
    }

    pub fn write_postings_list(&mut self, list: &PostingsList) -> Result<()> {
        list.check_encodable()?;
        self.buf.clear();
        encode_postings_list(list, &mut self.buf);
        write_framed(&mut self.sink, &self.buf)?;

        self.summary.postings_lists += 1;
        self.summary.tf_sum += list.tf_sum();
        self.summary.bytes_written += frame_size(self.buf.len());
        Ok(())
    }

    pub fn write_doc_record(&mut self, record: &DocRecord) -> Result<()> {
        record.check_encodable()?;
        self.buf.clear();
        encode_doc_record(record, &mut self.buf);
        write_framed(&mut self.sink, &self.buf)?;

        self.summary.doc_records += 1;
        self.summary.doclength_sum += record.doclength as u64;
        self.summary.bytes_written += frame_size(self.buf.len());
        Ok(())
    }

    /// Flush the sink and hand it back with the final summary.
    ///
    /// Count disagreements with the header are logged, not raised: the bytes
    /// are already out and only the caller knows whether a short stream was
    /// intended.
    pub fn finish(mut self) -> Result<(W, WriteSummary)> {
        self.sink.flush()?;

        let declared_lists = self.header.num_postings_lists as u64;
        let declared_docs = self.header.num_doc_records as u64;
        if self.summary.postings_lists != declared_lists {
            warn!(
                declared = declared_lists,
                written = self.summary.postings_lists,
                "postings list count differs from header"
            );
        }
        if self.summary.doc_records != declared_docs {
            warn!(
                declared = declared_docs,
                written = self.summary.doc_records,
                "doc record count differs from header"
            );
        }

        debug!(bytes = self.summary.bytes_written, "stream finished");
        Ok((self.sink, self.summary))
    }
}

fn frame_size(payload: usize) -> u64 {
    (crate::binary::varint_len(payload as u64) + payload) as u64
}
