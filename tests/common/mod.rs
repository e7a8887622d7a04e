//! Shared test utilities and fixtures.

#![allow(dead_code)]

use std::io::Cursor;

use ciff::{DocRecord, Header, PostingsList, StreamReader, StreamWriter};

// ============================================================================
// RECORD BUILDERS
// ============================================================================

pub fn doc(docid: u32, collection_docid: &str, doclength: u32) -> DocRecord {
    DocRecord {
        docid,
        collection_docid: collection_docid.to_string(),
        doclength,
    }
}

pub fn list(term: &str, docids: &[u32], tfs: &[u32]) -> PostingsList {
    PostingsList::from_absolute(term, docids, tfs).expect("test postings must be sorted")
}

/// Write a stream with the header exactly as given, whatever the records say.
pub fn write_stream(header: &Header, lists: &[PostingsList], docs: &[DocRecord]) -> Vec<u8> {
    let mut writer = StreamWriter::begin(Vec::new(), header).unwrap();
    for l in lists {
        writer.write_postings_list(l).unwrap();
    }
    for d in docs {
        writer.write_doc_record(d).unwrap();
    }
    writer.finish().unwrap().0
}

pub fn open(bytes: &[u8]) -> StreamReader<Cursor<&[u8]>> {
    StreamReader::open(Cursor::new(bytes)).unwrap()
}

// ============================================================================
// FIXTURES
// ============================================================================

/// Three documents, two terms:
///
/// ```text
/// A: "cat dog"   B: "dog"   C: "cat cat"
/// cat -> (0,1) (2,2)        dog -> (0,1) (1,1)
/// ```
pub fn cat_dog_records() -> (Header, Vec<PostingsList>, Vec<DocRecord>) {
    let header = Header::complete(2, 3, 5, "cat-dog");
    let lists = vec![
        list("cat", &[0, 2], &[1, 2]),
        list("dog", &[0, 1], &[1, 1]),
    ];
    let docs = vec![doc(0, "A", 2), doc(1, "B", 1), doc(2, "C", 2)];
    (header, lists, docs)
}

pub fn cat_dog_stream() -> Vec<u8> {
    let (header, lists, docs) = cat_dog_records();
    write_stream(&header, &lists, &docs)
}

pub const CAT_DOG_JSONL: &str = r#"{"id": "A", "contents": "cat dog"}
{"id": "B", "contents": "Dog."}
{"id": "C", "contents": "cat, CAT"}
"#;
