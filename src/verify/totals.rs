// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Aggregate checks as a fold over the record stream.
//!
//! Nothing is materialized: each record is observed, added to the running
//! sums, and dropped. Memory stays bounded by the largest single record.

use std::io::Read;

use tracing::{info, warn};

use crate::binary::{DocRecord, Header, PostingsList};
use crate::error::Result;
use crate::stream::{Record, StreamReader};

use super::types::{DocidRange, IntegrityCheck, IntegrityReport};

/// Running sums over the records seen so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub postings_lists: u64,
    pub doc_records: u64,
    pub postings: u64,
    pub tf_sum: u64,
    pub doclength_sum: u64,
    /// Largest absolute docid seen in any postings list.
    pub max_docid: Option<u64>,
}

impl Totals {
    pub fn observe_postings_list(&mut self, list: &PostingsList) {
        self.postings_lists += 1;
        self.postings += list.postings.len() as u64;
        self.tf_sum += list.tf_sum();
        if !list.postings.is_empty() {
            // The last absolute docid is the sum of the gaps.
            let last: u64 = list.postings.iter().map(|p| p.docid as u64).sum();
            self.max_docid = Some(self.max_docid.map_or(last, |max| max.max(last)));
        }
    }

    pub fn observe_doc_record(&mut self, record: &DocRecord) {
        self.doc_records += 1;
        self.doclength_sum += record.doclength as u64;
    }

    pub fn observe(&mut self, record: &Record) {
        match record {
            Record::PostingsList(list) => self.observe_postings_list(list),
            Record::DocRecord(doc) => self.observe_doc_record(doc),
        }
    }

    /// Compare the sums against the header. The checks only run for a
    /// complete export; a subset stream gets `NotVerifiable` on both.
    pub fn report(&self, header: &Header) -> IntegrityReport {
        let verifiable = header.is_complete_export();
        let expected = header.total_terms_in_collection;
        IntegrityReport {
            header: header.clone(),
            postings_lists: self.postings_lists,
            doc_records: self.doc_records,
            postings: self.postings,
            doclength_check: IntegrityCheck::evaluate(
                "doclength",
                "'total_terms_in_collection' in Header == sum of doclengths from DocRecords",
                expected,
                self.doclength_sum,
                verifiable,
            ),
            tf_check: IntegrityCheck::evaluate(
                "tf",
                "'total_terms_in_collection' in Header == sum of all tfs in all Postings",
                expected,
                self.tf_sum,
                verifiable,
            ),
            docid_range: DocidRange {
                max_docid: self.max_docid,
                num_doc_records: header.num_doc_records,
            },
        }
    }
}

/// Read a whole stream and run the aggregate checks.
pub fn verify_stream<R: Read>(reader: StreamReader<R>) -> Result<IntegrityReport> {
    verify_stream_with(reader, |_| {})
}

/// Like [`verify_stream`], handing every record to `inspect` before it is
/// dropped. Used by the CLI to print samples in the same pass.
pub fn verify_stream_with<R, F>(reader: StreamReader<R>, mut inspect: F) -> Result<IntegrityReport>
where
    R: Read,
    F: FnMut(&Record),
{
    let mut records = reader.records();
    let mut totals = Totals::default();
    for record in records.by_ref() {
        let record = record?;
        totals.observe(&record);
        inspect(&record);
    }

    let reader = records.into_reader();
    let report = totals.report(reader.header());
    reader.finish()?;

    for check in report.checks() {
        if check.failed() {
            warn!(
                check = check.name,
                expected = check.expected,
                observed = check.observed,
                "integrity check failed"
            );
        }
    }
    if report.docid_range.failed() {
        warn!(
            max_docid = report.docid_range.max_docid,
            num_doc_records = report.docid_range.num_doc_records,
            "postings reference docids past the last doc record"
        );
    }
    info!(
        postings_lists = report.postings_lists,
        doc_records = report.doc_records,
        consistent = report.is_consistent(),
        "stream verified"
    );
    Ok(report)
}
