// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Export side: turning an index into a CIFF stream.
//!
//! The exporter never sees an index directly. It talks to an [`IndexSource`],
//! which hands over postings with absolute docids in a stable term order and
//! document entries in docid order. [`MemoryIndex`] is the bundled source,
//! built from JSON-lines documents.
//!
//! Export is two passes over the source's terms when a term filter is set:
//! one to count what will be written (the header goes first and needs
//! `num_postings_lists`), one to write it.

pub mod document;
pub mod memory;

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::binary::{DocRecord, Header, PostingsList, VERSION};
use crate::compression::create_output;
use crate::error::{CiffError, Result};
use crate::stream::StreamWriter;

pub use document::{load_documents, load_terms, parse_documents, Document};
pub use memory::MemoryIndex;

/// Records between progress log lines.
const PROGRESS_INTERVAL: u64 = 100_000;

/// Postings for one term, docids absolute and ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermPostings {
    pub term: String,
    pub df: u64,
    pub cf: u64,
    /// `(docid, tf)` pairs.
    pub postings: Vec<(u32, u32)>,
}

/// Per-document statistics as the source knows them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEntry {
    pub docid: u32,
    pub collection_docid: String,
    pub doclength: u32,
}

/// Anything that can be exported as CIFF.
pub trait IndexSource {
    /// Vocabulary size of the whole collection.
    fn num_terms(&self) -> u32;

    fn total_docs(&self) -> u32;

    /// Sum of every document's length.
    fn total_terms_in_collection(&self) -> u64;

    /// Every term, in a stable order.
    fn terms(&self) -> Box<dyn Iterator<Item = TermPostings> + '_>;

    /// Every document, in ascending docid order starting from 0.
    fn documents(&self) -> Box<dyn Iterator<Item = DocumentEntry> + '_>;
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub description: String,
    /// Export only these terms. Doc records are always exported in full.
    pub terms: Option<HashSet<String>>,
    pub version: u32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            description: String::new(),
            terms: None,
            version: VERSION,
        }
    }
}

impl ExportOptions {
    fn includes(&self, term: &str) -> bool {
        self.terms.as_ref().map_or(true, |terms| terms.contains(term))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportSummary {
    pub header: Header,
    pub postings_lists: u64,
    pub doc_records: u64,
    pub postings: u64,
    pub bytes_written: u64,
}

/// Write `source` to `sink` as a CIFF stream and hand the sink back.
pub fn export<S, W>(source: &S, sink: W, options: &ExportOptions) -> Result<(W, ExportSummary)>
where
    S: IndexSource + ?Sized,
    W: Write,
{
    if options.version == 0 {
        return Err(CiffError::InvalidInput(
            "version must be non-zero".to_string(),
        ));
    }

    let total_postings_lists = source.num_terms();
    let num_postings_lists = match &options.terms {
        None => total_postings_lists,
        Some(_) => {
            let count = source.terms().filter(|t| options.includes(&t.term)).count();
            u32::try_from(count).map_err(|_| {
                CiffError::InvalidInput(format!("too many terms to export: {}", count))
            })?
        }
    };
    let total_docs = source.total_docs();
    let total_terms = source.total_terms_in_collection();

    let mut header = Header::complete(
        num_postings_lists,
        total_docs,
        total_terms,
        options.description.clone(),
    );
    header.version = options.version;
    header.total_postings_lists = total_postings_lists;

    info!(
        postings_lists = num_postings_lists,
        total_postings_lists,
        docs = total_docs,
        total_terms,
        "exporting"
    );

    let mut writer = StreamWriter::begin(sink, &header)?;

    let mut postings = 0u64;
    for entry in source.terms().filter(|t| options.includes(&t.term)) {
        let list = to_postings_list(entry)?;
        postings += list.postings.len() as u64;
        writer.write_postings_list(&list)?;

        let written = writer.summary().postings_lists;
        if written % PROGRESS_INTERVAL == 0 {
            info!(written, "postings lists");
        }
    }
    let postings_lists = writer.summary().postings_lists;
    if postings_lists != num_postings_lists as u64 {
        return Err(CiffError::InvalidInput(format!(
            "source yielded {} exported terms after counting {}",
            postings_lists, num_postings_lists
        )));
    }
    debug!(postings_lists, postings, "postings done");

    for (ordinal, entry) in source.documents().enumerate() {
        if entry.docid as usize != ordinal {
            return Err(CiffError::DocidOutOfSequence {
                expected: ordinal as u32,
                actual: entry.docid,
            });
        }
        writer.write_doc_record(&DocRecord {
            docid: entry.docid,
            collection_docid: entry.collection_docid,
            doclength: entry.doclength,
        })?;

        let written = writer.summary().doc_records;
        if written % PROGRESS_INTERVAL == 0 {
            info!(written, "doc records");
        }
    }
    let doc_records = writer.summary().doc_records;
    if doc_records != total_docs as u64 {
        return Err(CiffError::InvalidInput(format!(
            "source yielded {} documents but reported {}",
            doc_records, total_docs
        )));
    }

    let (sink, written) = writer.finish()?;
    info!(
        postings_lists,
        doc_records,
        bytes = written.bytes_written,
        "export complete"
    );

    Ok((
        sink,
        ExportSummary {
            header,
            postings_lists,
            doc_records,
            postings,
            bytes_written: written.bytes_written,
        },
    ))
}

/// Export to a file, compressed according to its extension.
///
/// An export that fails partway is abandoned as a whole: the partial file is
/// removed before the error is returned.
pub fn export_to_path<S>(source: &S, path: &Path, options: &ExportOptions) -> Result<ExportSummary>
where
    S: IndexSource + ?Sized,
{
    let out = create_output(path)?;
    let result = export(source, out, options).and_then(|(out, summary)| {
        out.finish()?;
        Ok(summary)
    });
    if result.is_err() {
        if let Err(e) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %e, "could not remove partial export");
        }
    }
    result
}

/// Delta-encode one term, holding the source to its declared `df`.
fn to_postings_list(entry: TermPostings) -> Result<PostingsList> {
    let (docids, tfs): (Vec<u32>, Vec<u32>) = entry.postings.iter().copied().unzip();
    let mut list = PostingsList::from_absolute(entry.term, &docids, &tfs)?;
    if entry.df != list.df {
        return Err(CiffError::PostingsCountMismatch {
            term: list.term,
            expected: entry.df,
            actual: list.df,
        });
    }
    list.cf = entry.cf;
    Ok(list)
}
