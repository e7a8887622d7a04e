//! Property tests over whole streams.
//!
//! Verifies:
//! 1. Any well-formed collection survives write then read unchanged
//! 2. Integrity checks pass exactly when the header totals match the records
//! 3. Any strict prefix of a stream fails, never silently succeeds
//! 4. Arbitrary bytes after a valid header never panic the reader

use std::io::Cursor;

use ciff::{
    verify_stream, CheckStatus, DocRecord, Header, PostingsList, Record, StreamReader,
};
use proptest::prelude::*;

use crate::common::write_stream;

// ============================================================================
// STRATEGIES
// ============================================================================

/// A small random collection: per-doc term counts over a tiny vocabulary.
fn collection_strategy() -> impl Strategy<Value = (Vec<PostingsList>, Vec<DocRecord>)> {
    prop::collection::vec(prop::collection::vec(0u32..4, 6), 0..20).prop_map(|matrix| {
        // matrix[doc][term] = tf (0 = absent)
        let docs: Vec<DocRecord> = matrix
            .iter()
            .enumerate()
            .map(|(docid, row)| DocRecord {
                docid: docid as u32,
                collection_docid: format!("doc-{}", docid),
                doclength: row.iter().sum(),
            })
            .collect();

        let lists = (0..6)
            .filter_map(|term| {
                let (docids, tfs): (Vec<u32>, Vec<u32>) = matrix
                    .iter()
                    .enumerate()
                    .filter(|(_, row)| row[term] > 0)
                    .map(|(docid, row)| (docid as u32, row[term]))
                    .unzip();
                if docids.is_empty() {
                    None
                } else {
                    PostingsList::from_absolute(format!("term{}", term), &docids, &tfs).ok()
                }
            })
            .collect();

        (lists, docs)
    })
}

fn complete_header(lists: &[PostingsList], docs: &[DocRecord]) -> Header {
    let total: u64 = docs.iter().map(|d| d.doclength as u64).sum();
    Header::complete(lists.len() as u32, docs.len() as u32, total, "prop")
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_stream_roundtrip((lists, docs) in collection_strategy()) {
        let header = complete_header(&lists, &docs);
        let bytes = write_stream(&header, &lists, &docs);

        let reader = StreamReader::open(Cursor::new(&bytes)).unwrap();
        prop_assert_eq!(reader.header(), &header);
        let records: Vec<Record> = reader.records().collect::<Result<_, _>>().unwrap();
        let expected: Vec<Record> = lists
            .iter()
            .cloned()
            .map(Record::PostingsList)
            .chain(docs.iter().cloned().map(Record::DocRecord))
            .collect();
        prop_assert_eq!(records, expected);
    }

    #[test]
    fn prop_built_collections_are_consistent((lists, docs) in collection_strategy()) {
        let header = complete_header(&lists, &docs);
        let bytes = write_stream(&header, &lists, &docs);
        let report = verify_stream(StreamReader::open(Cursor::new(&bytes)).unwrap()).unwrap();
        prop_assert_eq!(report.doclength_check.status, CheckStatus::Passed);
        prop_assert_eq!(report.tf_check.status, CheckStatus::Passed);
    }

    #[test]
    fn prop_wrong_total_fails_both_checks(
        (lists, docs) in collection_strategy(),
        delta in 1u64..1000,
    ) {
        let mut header = complete_header(&lists, &docs);
        header.total_terms_in_collection += delta;
        let bytes = write_stream(&header, &lists, &docs);
        let report = verify_stream(StreamReader::open(Cursor::new(&bytes)).unwrap()).unwrap();
        prop_assert!(report.doclength_check.failed());
        prop_assert!(report.tf_check.failed());
        prop_assert_eq!(report.tf_check.observed, report.doclength_check.observed);
    }

    #[test]
    fn prop_every_prefix_fails(
        (lists, docs) in collection_strategy(),
        cut in any::<prop::sample::Index>(),
    ) {
        let header = complete_header(&lists, &docs);
        let bytes = write_stream(&header, &lists, &docs);
        let cut = cut.index(bytes.len());

        let result = StreamReader::open(Cursor::new(&bytes[..cut]))
            .and_then(verify_stream);
        prop_assert!(result.is_err(), "prefix of {} of {} bytes verified", cut, bytes.len());
    }

    #[test]
    fn prop_garbage_after_header_never_panics(
        (lists, docs) in collection_strategy(),
        garbage in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        let header = complete_header(&lists, &docs);
        let mut bytes = write_stream(&header, &[], &[]);
        bytes.extend_from_slice(&garbage);

        let reader = StreamReader::open(Cursor::new(&bytes)).unwrap();
        // Either an error or a report, never a panic.
        let _ = verify_stream(reader);
    }
}
