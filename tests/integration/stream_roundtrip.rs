//! Well-formed streams: written, read back, verified.

use ciff::{
    verify_stream, CheckStatus, DocRecord, Header, PostingsList, Record, RecordKind,
};

use crate::common::{cat_dog_records, cat_dog_stream, doc, list, open, write_stream};

// ============================================================================
// CAT / DOG COLLECTION
// ============================================================================

#[test]
fn test_cat_dog_end_to_end() {
    let bytes = cat_dog_stream();
    let mut reader = open(&bytes);

    let header = reader.header().clone();
    assert_eq!(header.version, 1);
    assert_eq!(header.num_postings_lists, 2);
    assert_eq!(header.num_doc_records, 3);
    assert_eq!(header.total_terms_in_collection, 5);
    assert!((header.average_doclength - 5.0 / 3.0).abs() < 1e-12);

    let cat = reader.next_postings_list().unwrap().unwrap();
    assert_eq!(cat.term, "cat");
    assert_eq!((cat.df, cat.cf), (2, 3));
    // Second posting is stored as a gap of 2.
    assert_eq!(cat.postings[1].docid, 2);
    let absolute: Vec<(u32, u32)> = cat
        .absolute()
        .map(|p| p.map(|p| (p.docid, p.tf)))
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(absolute, vec![(0, 1), (2, 2)]);

    let dog = reader.next_postings_list().unwrap().unwrap();
    assert_eq!(dog.term, "dog");
    assert_eq!(dog.postings[1].docid, 1);

    assert_eq!(reader.next_postings_list().unwrap(), None);
    assert_eq!(reader.next_kind(), Some(RecordKind::DocRecord));

    let ids: Vec<String> = std::iter::from_fn(|| reader.next_doc_record().unwrap())
        .map(|d| d.collection_docid)
        .collect();
    assert_eq!(ids, vec!["A", "B", "C"]);
    assert_eq!(reader.next_kind(), None);
    reader.finish().unwrap();

    let report = verify_stream(open(&bytes)).unwrap();
    assert_eq!(report.doclength_check.status, CheckStatus::Passed);
    assert_eq!(report.tf_check.status, CheckStatus::Passed);
    assert_eq!(report.postings, 4);
}

/// cat at docids 0 and 2, dog at docid 1; lengths 2, 3, 1.
#[test]
fn test_cat_dog_gapped_collection() {
    let header = Header::complete(2, 3, 6, "");
    let lists = vec![list("cat", &[0, 2], &[2, 1]), list("dog", &[1], &[3])];
    let docs = vec![doc(0, "d0", 2), doc(1, "d1", 3), doc(2, "d2", 1)];
    let bytes = write_stream(&header, &lists, &docs);

    let mut reader = open(&bytes);
    let cat = reader.next_postings_list().unwrap().unwrap();
    assert_eq!(cat.postings[1].docid, 2);
    assert_eq!(cat.absolute().map(|p| p.unwrap().docid).collect::<Vec<u32>>(), vec![0, 2]);
    let dog = reader.next_postings_list().unwrap().unwrap();
    assert_eq!(dog.absolute().map(|p| p.unwrap().docid).collect::<Vec<u32>>(), vec![1]);
    assert_eq!(reader.next_postings_list().unwrap(), None);
    let lengths: Vec<u32> = std::iter::from_fn(|| reader.next_doc_record().unwrap())
        .map(|d| d.doclength)
        .collect();
    assert_eq!(lengths, vec![2, 3, 1]);
    reader.finish().unwrap();

    let report = verify_stream(open(&bytes)).unwrap();
    assert_eq!(report.tf_check.status, CheckStatus::Passed);
    assert_eq!(report.tf_check.observed, 6);
    assert_eq!(report.doclength_check.status, CheckStatus::Passed);
    assert_eq!(report.doclength_check.observed, 6);
    assert_eq!(report.docid_range.max_docid, Some(2));
    assert!(report.is_consistent());
}

#[test]
fn test_records_roundtrip_exactly() {
    let (header, lists, docs) = cat_dog_records();
    let bytes = write_stream(&header, &lists, &docs);

    let reader = open(&bytes);
    assert_eq!(reader.header(), &header);
    let records: Vec<Record> = reader.records().collect::<Result<_, _>>().unwrap();

    let expected: Vec<Record> = lists
        .into_iter()
        .map(Record::PostingsList)
        .chain(docs.into_iter().map(Record::DocRecord))
        .collect();
    assert_eq!(records, expected);
}

#[test]
fn test_header_fields_survive() {
    let header = Header {
        version: 3,
        num_postings_lists: 1,
        num_doc_records: 1,
        total_postings_lists: 40_000,
        total_docs: 8_841_823,
        total_terms_in_collection: 5_000_000_000,
        average_doclength: 565.5,
        description: "MS MARCO passages, Anserini, Porter stemming ✓".to_string(),
    };
    let bytes = write_stream(&header, &[list("ü", &[7], &[1])], &[doc(0, "x", 3)]);
    assert_eq!(open(&bytes).header(), &header);
}

#[test]
fn test_extreme_docids() {
    let max = i32::MAX as u32;
    let l = list("edge", &[0, 1, max - 1, max], &[1, 2, 3, u32::MAX >> 1]);
    let bytes = write_stream(&Header::complete(1, 0, 0, ""), &[l.clone()], &[]);
    let mut reader = open(&bytes);
    let back = reader.next_postings_list().unwrap().unwrap();
    assert_eq!(back, l);
    let docids: Vec<u32> = back.absolute().map(|p| p.unwrap().docid).collect();
    assert_eq!(docids, vec![0, 1, max - 1, max]);
}

// ============================================================================
// BOUNDARIES
// ============================================================================

#[test]
fn test_empty_collection() {
    let header = Header::complete(0, 0, 0, "empty");
    assert_eq!(header.average_doclength, 0.0);
    let bytes = write_stream(&header, &[], &[]);

    let mut reader = open(&bytes);
    assert_eq!(reader.next_kind(), None);
    assert_eq!(reader.next_postings_list().unwrap(), None);
    assert_eq!(reader.next_doc_record().unwrap(), None);
    reader.finish().unwrap();

    let report = verify_stream(open(&bytes)).unwrap();
    assert!(report.doclength_check.passed());
    assert!(report.tf_check.passed());
    assert_eq!(report.postings_lists, 0);
}

#[test]
fn test_docs_without_postings() {
    let header = Header::complete(0, 2, 0, "");
    let bytes = write_stream(&header, &[], &[doc(0, "a", 0), doc(1, "b", 0)]);
    let mut reader = open(&bytes);
    assert_eq!(reader.next_kind(), Some(RecordKind::DocRecord));
    assert_eq!(reader.next_doc_record().unwrap().unwrap().collection_docid, "a");
}

// ============================================================================
// AGGREGATE CHECKS
// ============================================================================

/// Ten documents of length 100, ten terms each appearing 10 times in every document.
fn thousand_term_collection() -> (Header, Vec<PostingsList>, Vec<DocRecord>) {
    let docids: Vec<u32> = (0..10).collect();
    let lists: Vec<PostingsList> = (0..10)
        .map(|t| list(&format!("t{}", t), &docids, &[10; 10]))
        .collect();
    let docs: Vec<DocRecord> = (0..10).map(|d| doc(d, &format!("D{}", d), 100)).collect();
    (Header::complete(10, 10, 1000, ""), lists, docs)
}

#[test]
fn test_consistent_totals_pass() {
    let (header, lists, docs) = thousand_term_collection();
    let report = verify_stream(open(&write_stream(&header, &lists, &docs))).unwrap();
    assert!(report.is_consistent());
    assert_eq!(report.tf_check.observed, 1000);
    assert_eq!(report.doclength_check.observed, 1000);
}

#[test]
fn test_mutated_doclength_fails_check_a_only() {
    let (header, lists, mut docs) = thousand_term_collection();
    docs[4].doclength = 97;

    let report = verify_stream(open(&write_stream(&header, &lists, &docs))).unwrap();
    assert_eq!(report.doclength_check.status, CheckStatus::Failed);
    assert_eq!(report.doclength_check.expected, 1000);
    assert_eq!(report.doclength_check.observed, 997);
    assert_eq!(report.tf_check.status, CheckStatus::Passed);
    assert!(!report.is_consistent());
    assert!(report
        .doclength_check
        .to_string()
        .ends_with("[FAILED] expected 1000 observed 997"));
}

#[test]
fn test_mutated_tf_fails_check_b_only() {
    let (header, mut lists, docs) = thousand_term_collection();
    lists[0] = list("t0", &(0..10).collect::<Vec<u32>>(), &[10, 10, 10, 10, 10, 10, 10, 10, 10, 1]);

    let report = verify_stream(open(&write_stream(&header, &lists, &docs))).unwrap();
    assert!(report.doclength_check.passed());
    assert!(report.tf_check.failed());
    assert_eq!(report.tf_check.observed, 991);
}

#[test]
fn test_subset_export_not_verifiable() {
    let (mut header, lists, docs) = thousand_term_collection();
    header.num_postings_lists = 5;
    header.total_postings_lists = 10;

    let report = verify_stream(open(&write_stream(&header, &lists[..5], &docs))).unwrap();
    assert_eq!(report.tf_check.status, CheckStatus::NotVerifiable);
    assert_eq!(report.doclength_check.status, CheckStatus::NotVerifiable);
    assert!(report.is_consistent());
}
