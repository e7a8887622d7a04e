// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Postings list messages and the docid delta codec.
//!
//! Postings are the heart of an inverted index: for each term, which documents
//! contain it? Delta encoding is the obvious optimization since doc_ids tend to
//! cluster. If documents 100, 102, 105, 110 all contain "rust", we store
//! [100, 2, 3, 5] instead of [100, 102, 105, 110]. Small gaps make small varints.
//!
//! On the wire only positive gaps can be represented, so the precondition is
//! strict: docids within one list ascend with no duplicates. The encoder fails
//! fast on a violation instead of producing a corrupt-but-decodable stream, and
//! the decoder reports a zero gap instead of producing non-monotonic ids.
//!
//! # References
//!
//! - **Delta Encoding for Postings**: Zobel & Moffat (2006): "Inverted Files for
//!   Text Search Engines", ACM Computing Surveys.

use crate::error::{CiffError, Result};

use super::encoding::{check_int32, check_int64, put_bytes, put_str, put_uint, FieldReader};

const FIELD_TERM: u32 = 1;
const FIELD_DF: u32 = 2;
const FIELD_CF: u32 = 3;
const FIELD_POSTINGS: u32 = 4;

const FIELD_POSTING_DOCID: u32 = 1;
const FIELD_POSTING_TF: u32 = 2;

// ============================================================================
// MESSAGES
// ============================================================================

/// One delta-encoded posting: `docid` is a gap except in the first position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    pub docid: u32,
    pub tf: u32,
}

/// A posting with its absolute docid restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbsolutePosting {
    pub docid: u32,
    pub tf: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingsList {
    pub term: String,
    /// Declared document frequency; must equal `postings.len()`.
    pub df: u64,
    /// Collection frequency: occurrences of the term across the collection.
    pub cf: u64,
    pub postings: Vec<Posting>,
}

impl PostingsList {
    /// Build a list from absolute postings, deriving `df` and `cf`.
    pub fn from_absolute(term: impl Into<String>, docids: &[u32], tfs: &[u32]) -> Result<Self> {
        let postings = encode_postings(docids, tfs)?;
        let cf = tfs.iter().map(|&tf| tf as u64).sum();
        Ok(Self {
            term: term.into(),
            df: postings.len() as u64,
            cf,
            postings,
        })
    }

    /// Lazily decode absolute docids.
    pub fn absolute(&self) -> AbsolutePostings<'_> {
        absolute_postings(&self.postings)
    }

    /// Sum of `tf` over every posting.
    pub fn tf_sum(&self) -> u64 {
        self.postings.iter().map(|p| p.tf as u64).sum()
    }

    /// Refuse a list the reader would reject: an empty term, a zero `tf`, or
    /// a value past the range of its field.
    pub fn check_encodable(&self) -> Result<()> {
        if self.term.is_empty() {
            return Err(CiffError::InvalidInput(
                "postings list term must be non-empty".to_string(),
            ));
        }
        check_int64("PostingsList", "df", self.df)?;
        check_int64("PostingsList", "cf", self.cf)?;
        for (position, posting) in self.postings.iter().enumerate() {
            if posting.tf == 0 {
                return Err(CiffError::ZeroTermFrequency { position });
            }
            check_int32("Posting", "docid", posting.docid as u64)?;
            check_int32("Posting", "tf", posting.tf as u64)?;
        }
        Ok(())
    }

    /// Fail with `PostingsCountMismatch` unless `df` matches the postings present.
    pub fn check_df(&self) -> Result<()> {
        let actual = self.postings.len() as u64;
        if self.df != actual {
            return Err(CiffError::PostingsCountMismatch {
                term: self.term.clone(),
                expected: self.df,
                actual,
            });
        }
        Ok(())
    }
}

// ============================================================================
// DELTA CODEC
// ============================================================================

/// Gap-encode strictly increasing absolute docids with their term frequencies.
///
/// Docids and tfs are int32 on the wire, so anything above `i32::MAX` is
/// refused here rather than by the reader.
pub fn encode_postings(docids: &[u32], tfs: &[u32]) -> Result<Vec<Posting>> {
    if docids.len() != tfs.len() {
        return Err(CiffError::LengthMismatch {
            docids: docids.len(),
            tfs: tfs.len(),
        });
    }

    let mut postings = Vec::with_capacity(docids.len());
    let mut prev: Option<u32> = None;

    for (position, (&docid, &tf)) in docids.iter().zip(tfs).enumerate() {
        if tf == 0 {
            return Err(CiffError::ZeroTermFrequency { position });
        }
        check_int32("Posting", "docid", docid as u64)?;
        check_int32("Posting", "tf", tf as u64)?;
        let gap = match prev {
            None => docid,
            Some(previous) if docid > previous => docid - previous,
            Some(previous) => {
                return Err(CiffError::UnsortedInput {
                    position,
                    previous,
                    current: docid,
                })
            }
        };
        postings.push(Posting { docid: gap, tf });
        prev = Some(docid);
    }

    Ok(postings)
}

/// Restore absolute docids by running prefix sums over the gaps.
pub fn decode_postings(postings: &[Posting]) -> Result<Vec<u32>> {
    absolute_postings(postings)
        .map(|posting| posting.map(|p| p.docid))
        .collect()
}

pub fn absolute_postings(postings: &[Posting]) -> AbsolutePostings<'_> {
    AbsolutePostings {
        postings,
        position: 0,
        current: 0,
    }
}

/// Iterator produced by [`absolute_postings`]. Stops after the first error.
pub struct AbsolutePostings<'a> {
    postings: &'a [Posting],
    position: usize,
    current: u32,
}

impl Iterator for AbsolutePostings<'_> {
    type Item = Result<AbsolutePosting>;

    fn next(&mut self) -> Option<Self::Item> {
        let posting = *self.postings.get(self.position)?;
        let position = self.position;

        let docid = if position == 0 {
            Some(posting.docid)
        } else if posting.docid == 0 {
            None
        } else {
            self.current.checked_add(posting.docid)
        };

        match docid {
            Some(docid) => {
                self.position += 1;
                self.current = docid;
                Some(Ok(AbsolutePosting {
                    docid,
                    tf: posting.tf,
                }))
            }
            None => {
                self.position = self.postings.len();
                Some(Err(CiffError::CorruptDelta {
                    position,
                    previous: self.current,
                    gap: posting.docid,
                }))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.postings.len() - self.position))
    }
}

/// Check every gap without allocating.
pub fn check_gaps(postings: &[Posting]) -> Result<()> {
    absolute_postings(postings).try_for_each(|p| p.map(|_| ()))
}

// ============================================================================
// SCHEMA ENCODING
// ============================================================================

pub fn encode_postings_list(list: &PostingsList, buf: &mut Vec<u8>) {
    put_str(FIELD_TERM, &list.term, buf);
    put_uint(FIELD_DF, list.df, buf);
    put_uint(FIELD_CF, list.cf, buf);

    let mut posting_buf = Vec::with_capacity(12);
    for posting in &list.postings {
        posting_buf.clear();
        put_uint(FIELD_POSTING_DOCID, posting.docid as u64, &mut posting_buf);
        put_uint(FIELD_POSTING_TF, posting.tf as u64, &mut posting_buf);
        put_bytes(FIELD_POSTINGS, &posting_buf, buf);
    }
}

/// Decode a postings list. `term` and each posting's `tf` are required; the
/// `df` / postings-count agreement is left to the stream reader so it can
/// report both numbers.
pub fn decode_postings_list(bytes: &[u8]) -> Result<PostingsList> {
    let mut reader = FieldReader::new("PostingsList", bytes);
    let mut list = PostingsList {
        term: String::new(),
        df: 0,
        cf: 0,
        postings: Vec::new(),
    };

    while let Some((field, value)) = reader.next_field()? {
        match field {
            FIELD_TERM => list.term = reader.string("term", value)?,
            FIELD_DF => list.df = reader.int64("df", value)?,
            FIELD_CF => list.cf = reader.int64("cf", value)?,
            FIELD_POSTINGS => {
                let bytes = reader.bytes("postings", value)?;
                list.postings.push(decode_posting(bytes)?);
            }
            _ => {}
        }
    }

    if list.term.is_empty() {
        return Err(reader.missing("term"));
    }

    Ok(list)
}

fn decode_posting(bytes: &[u8]) -> Result<Posting> {
    let mut reader = FieldReader::new("Posting", bytes);
    let mut posting = Posting { docid: 0, tf: 0 };

    while let Some((field, value)) = reader.next_field()? {
        match field {
            FIELD_POSTING_DOCID => posting.docid = reader.int32("docid", value)?,
            FIELD_POSTING_TF => posting.tf = reader.int32("tf", value)?,
            _ => {}
        }
    }

    if posting.tf == 0 {
        return Err(reader.missing("tf"));
    }

    Ok(posting)
}
