//! Export from JSON-lines documents, outer compression, and the CSV sink.

use std::fs;
use std::io::{Cursor, Write};

use ciff::build::{
    export, export_to_path, load_documents, load_terms, parse_documents, DocumentEntry,
    ExportOptions, IndexSource, MemoryIndex, TermPostings,
};
use ciff::compression::{create_output, open_input};
use ciff::sink::OldDogCsv;
use ciff::{verify_stream, CheckStatus, CiffError, Record, StreamReader};
use tempfile::tempdir;

use crate::common::{cat_dog_records, CAT_DOG_JSONL};

fn cat_dog_index() -> MemoryIndex {
    let docs = parse_documents(Cursor::new(CAT_DOG_JSONL)).unwrap();
    MemoryIndex::from_documents(&docs).unwrap()
}

#[test]
fn test_export_matches_hand_built_stream() {
    let options = ExportOptions {
        description: "cat-dog".to_string(),
        ..ExportOptions::default()
    };
    let (bytes, summary) = export(&cat_dog_index(), Vec::new(), &options).unwrap();
    assert_eq!(summary.postings_lists, 2);
    assert_eq!(summary.doc_records, 3);

    let (header, lists, docs) = cat_dog_records();
    let reader = StreamReader::open(Cursor::new(bytes)).unwrap();
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
fn test_export_through_every_compression() {
    let dir = tempdir().unwrap();
    let index = cat_dog_index();

    for name in ["index.ciff", "index.ciff.gz", "index.ciff.br"] {
        let path = dir.path().join(name);
        let out = create_output(&path).unwrap();
        let (out, summary) = export(&index, out, &ExportOptions::default()).unwrap();
        out.finish().unwrap();

        let report = verify_stream(StreamReader::open(open_input(&path).unwrap()).unwrap()).unwrap();
        assert!(report.is_consistent(), "{}", name);
        assert_eq!(report.postings_lists, summary.postings_lists, "{}", name);
        assert_eq!(report.doc_records, 3, "{}", name);
    }

    let plain = fs::metadata(dir.path().join("index.ciff")).unwrap().len();
    let (bytes, _) = export(&index, Vec::new(), &ExportOptions::default()).unwrap();
    assert_eq!(plain, bytes.len() as u64);
}

#[test]
fn test_terms_file_exports_subset() {
    let dir = tempdir().unwrap();
    let terms_path = dir.path().join("terms.txt");
    fs::write(&terms_path, "dog\n\n  bird  \n").unwrap();
    let terms = load_terms(&terms_path).unwrap();
    assert_eq!(terms, vec!["dog", "bird"]);

    let options = ExportOptions {
        terms: Some(terms.into_iter().collect()),
        ..ExportOptions::default()
    };
    let (bytes, summary) = export(&cat_dog_index(), Vec::new(), &options).unwrap();
    assert_eq!(summary.header.num_postings_lists, 1);
    assert_eq!(summary.header.total_postings_lists, 2);
    assert_eq!(summary.header.num_doc_records, 3);

    let report = verify_stream(StreamReader::open(Cursor::new(bytes)).unwrap()).unwrap();
    assert_eq!(report.tf_check.status, CheckStatus::NotVerifiable);
    assert_eq!(report.tf_check.observed, 2);
}

#[test]
fn test_empty_document_set() {
    let index = MemoryIndex::from_documents(&[]).unwrap();
    let (bytes, summary) = export(&index, Vec::new(), &ExportOptions::default()).unwrap();
    assert_eq!(summary.header.average_doclength, 0.0);
    let report = verify_stream(StreamReader::open(Cursor::new(bytes)).unwrap()).unwrap();
    assert!(report.is_consistent());
}

#[test]
fn test_bad_jsonl_reports_line() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("docs.jsonl");
    let mut file = fs::File::create(&path).unwrap();
    writeln!(file, r#"{{"id": "a", "contents": "x"}}"#).unwrap();
    writeln!(file, "not json").unwrap();
    drop(file);

    match load_documents(&path).unwrap_err() {
        CiffError::InvalidInput(message) => assert!(message.starts_with("line 2"), "{}", message),
        other => panic!("expected InvalidInput, got {:?}", other),
    }
}

#[test]
fn test_csv_tables_from_exported_stream() {
    let dir = tempdir().unwrap();
    let ciff_path = dir.path().join("cat-dog.ciff.gz");
    let out = create_output(&ciff_path).unwrap();
    let (out, _) = export(&cat_dog_index(), out, &ExportOptions::default()).unwrap();
    out.finish().unwrap();

    let sink = OldDogCsv {
        dict: dir.path().join("dict.csv"),
        terms: dir.path().join("terms.csv"),
        docs: Some(dir.path().join("docs.csv")),
    };
    let summary = sink
        .write(StreamReader::open(open_input(&ciff_path).unwrap()).unwrap())
        .unwrap();
    assert_eq!(summary.dict_rows, 2);
    assert_eq!(summary.term_rows, 4);
    assert_eq!(summary.doc_rows, 3);

    assert_eq!(fs::read_to_string(&sink.dict).unwrap(), "0|cat|2\n1|dog|2\n");
    assert_eq!(
        fs::read_to_string(&sink.terms).unwrap(),
        "0|0|1\n0|2|2\n1|0|1\n1|1|1\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("docs.csv")).unwrap(),
        "A|0|2\nB|1|1\nC|2|2\n"
    );
}

#[test]
fn test_csv_without_docs_table() {
    let dir = tempdir().unwrap();
    let (bytes, _) = export(&cat_dog_index(), Vec::new(), &ExportOptions::default()).unwrap();
    let sink = OldDogCsv {
        dict: dir.path().join("dict.csv"),
        terms: dir.path().join("terms.csv"),
        docs: None,
    };
    let summary = sink
        .write(StreamReader::open(Cursor::new(bytes)).unwrap())
        .unwrap();
    assert_eq!(summary.doc_rows, 0);
    assert!(!dir.path().join("docs.csv").exists());
}

/// Two terms, the second one claiming more postings than it carries.
struct BrokenSource;

impl IndexSource for BrokenSource {
    fn num_terms(&self) -> u32 {
        2
    }

    fn total_docs(&self) -> u32 {
        1
    }

    fn total_terms_in_collection(&self) -> u64 {
        2
    }

    fn terms(&self) -> Box<dyn Iterator<Item = TermPostings> + '_> {
        Box::new(
            [("fine", 1), ("liar", 4)]
                .into_iter()
                .map(|(term, df)| TermPostings {
                    term: term.to_string(),
                    df,
                    cf: 1,
                    postings: vec![(0, 1)],
                }),
        )
    }

    fn documents(&self) -> Box<dyn Iterator<Item = DocumentEntry> + '_> {
        Box::new(std::iter::once(DocumentEntry {
            docid: 0,
            collection_docid: "only".to_string(),
            doclength: 2,
        }))
    }
}

#[test]
fn test_failed_export_leaves_no_file() {
    let dir = tempdir().unwrap();
    for name in ["broken.ciff", "broken.ciff.gz"] {
        let path = dir.path().join(name);
        let err = export_to_path(&BrokenSource, &path, &ExportOptions::default()).unwrap_err();
        assert!(
            matches!(err, CiffError::PostingsCountMismatch { expected: 4, actual: 1, .. }),
            "{}: {:?}",
            name,
            err
        );
        assert!(!path.exists(), "{} left behind", name);
    }

    let path = dir.path().join("good.ciff.br");
    let summary = export_to_path(&cat_dog_index(), &path, &ExportOptions::default()).unwrap();
    assert_eq!(summary.doc_records, 3);
    let report = verify_stream(StreamReader::open(open_input(&path).unwrap()).unwrap()).unwrap();
    assert!(report.is_consistent());
}
