// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Downstream sink: pipe-separated tables for column-store loading.
//!
//! The OldDog layout is three tables a relational engine can bulk-load and
//! score with plain SQL:
//!
//! ```text
//! dict   termid|term|df
//! terms  termid|docid|tf        (absolute docids)
//! docs   collection_docid|docid|doclength
//! ```
//!
//! Term ids are the 0-based ordinal of the postings list in the stream.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::stream::{Record, StreamReader};

#[derive(Debug, Clone)]
pub struct OldDogCsv {
    pub dict: PathBuf,
    pub terms: PathBuf,
    /// Skipped when `None`; the doc records are still read and validated.
    pub docs: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CsvSummary {
    pub dict_rows: u64,
    pub term_rows: u64,
    pub doc_rows: u64,
}

impl OldDogCsv {
    /// Drain `reader` into the tables. The stream is validated as it goes,
    /// so a corrupt input fails partway with the files left incomplete.
    pub fn write<R: Read>(&self, reader: StreamReader<R>) -> Result<CsvSummary> {
        let mut dict = BufWriter::new(File::create(&self.dict)?);
        let mut terms = BufWriter::new(File::create(&self.terms)?);
        let mut docs = match &self.docs {
            Some(path) => Some(BufWriter::new(File::create(path)?)),
            None => None,
        };

        let mut summary = CsvSummary::default();
        let mut records = reader.records();
        for record in records.by_ref() {
            match record? {
                Record::PostingsList(list) => {
                    let termid = summary.dict_rows;
                    writeln!(dict, "{}|{}|{}", termid, list.term, list.df)?;
                    summary.dict_rows += 1;
                    for posting in list.absolute() {
                        let posting = posting?;
                        writeln!(terms, "{}|{}|{}", termid, posting.docid, posting.tf)?;
                        summary.term_rows += 1;
                    }
                }
                Record::DocRecord(doc) => {
                    if let Some(out) = docs.as_mut() {
                        writeln!(
                            out,
                            "{}|{}|{}",
                            doc.collection_docid, doc.docid, doc.doclength
                        )?;
                        summary.doc_rows += 1;
                    }
                }
            }
        }
        records.into_reader().finish()?;

        dict.flush()?;
        terms.flush()?;
        if let Some(mut out) = docs {
            out.flush()?;
        }

        info!(
            dict = summary.dict_rows,
            terms = summary.term_rows,
            docs = summary.doc_rows,
            "wrote csv tables"
        );
        Ok(summary)
    }
}
