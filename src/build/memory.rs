// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! In-memory inverted index over JSON-lines documents.
//!
//! Tokenizing is the expensive part and is independent per document, so with
//! the `parallel` feature it runs under rayon. Merging into the dictionary is
//! sequential and walks documents in docid order, which keeps every postings
//! list sorted without a sort.

use std::collections::BTreeMap;

#[cfg(feature = "parallel")]
use indicatif::ProgressBar;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[cfg(feature = "parallel")]
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{CiffError, Result};
use crate::utils::tokenize;

use super::{Document, DocumentEntry, IndexSource, TermPostings};

/// Term counts for one document.
struct Analyzed {
    doclength: u32,
    tfs: BTreeMap<String, u32>,
}

fn analyze(doc: &Document) -> Analyzed {
    let tokens = tokenize(&doc.contents);
    let doclength = tokens.len() as u32;
    let mut tfs = BTreeMap::new();
    for token in tokens {
        *tfs.entry(token).or_insert(0) += 1;
    }
    Analyzed { doclength, tfs }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
    /// Sorted by term.
    terms: Vec<TermPostings>,
    documents: Vec<DocumentEntry>,
    total_terms: u64,
}

impl MemoryIndex {
    /// Index `docs`, assigning docids 0, 1, 2, ... in input order.
    pub fn from_documents(docs: &[Document]) -> Result<Self> {
        check_doc_count(docs)?;

        #[cfg(feature = "parallel")]
        let analyzed: Vec<Analyzed> = docs.par_iter().map(analyze).collect();
        #[cfg(not(feature = "parallel"))]
        let analyzed: Vec<Analyzed> = docs.iter().map(analyze).collect();

        Ok(Self::merge(docs, analyzed))
    }

    /// Same as [`from_documents`](Self::from_documents), ticking `progress`
    /// once per analyzed document.
    #[cfg(feature = "parallel")]
    pub fn from_documents_with_progress(docs: &[Document], progress: &ProgressBar) -> Result<Self> {
        check_doc_count(docs)?;

        let counter = AtomicUsize::new(0);
        let total = docs.len();
        let analyzed: Vec<Analyzed> = docs
            .par_iter()
            .map(|doc| {
                let result = analyze(doc);
                let count = counter.fetch_add(1, Ordering::Relaxed) + 1;
                progress.set_position(count as u64);
                if count % 1000 == 0 || count == total {
                    progress.set_message(format!("{}/{}", count, total));
                }
                result
            })
            .collect();

        Ok(Self::merge(docs, analyzed))
    }

    fn merge(docs: &[Document], analyzed: Vec<Analyzed>) -> Self {
        let mut dictionary: BTreeMap<String, Vec<(u32, u32)>> = BTreeMap::new();
        let mut documents = Vec::with_capacity(docs.len());
        let mut total_terms = 0u64;

        for (docid, (doc, analysis)) in docs.iter().zip(analyzed).enumerate() {
            let docid = docid as u32;
            total_terms += analysis.doclength as u64;
            documents.push(DocumentEntry {
                docid,
                collection_docid: doc.id.clone(),
                doclength: analysis.doclength,
            });
            for (term, tf) in analysis.tfs {
                dictionary.entry(term).or_default().push((docid, tf));
            }
        }

        let terms = dictionary
            .into_iter()
            .map(|(term, postings)| TermPostings {
                df: postings.len() as u64,
                cf: postings.iter().map(|&(_, tf)| tf as u64).sum(),
                term,
                postings,
            })
            .collect();

        Self {
            terms,
            documents,
            total_terms,
        }
    }

    pub fn term(&self, term: &str) -> Option<&TermPostings> {
        self.terms
            .binary_search_by(|entry| entry.term.as_str().cmp(term))
            .ok()
            .map(|i| &self.terms[i])
    }

    pub fn document(&self, docid: u32) -> Option<&DocumentEntry> {
        self.documents.get(docid as usize)
    }
}

/// Docids are `int32` on the wire.
fn check_doc_count(docs: &[Document]) -> Result<()> {
    if docs.len() > i32::MAX as usize {
        return Err(CiffError::InvalidInput(format!(
            "{} documents exceed the docid range",
            docs.len()
        )));
    }
    Ok(())
}

impl IndexSource for MemoryIndex {
    fn num_terms(&self) -> u32 {
        self.terms.len() as u32
    }

    fn total_docs(&self) -> u32 {
        self.documents.len() as u32
    }

    fn total_terms_in_collection(&self) -> u64 {
        self.total_terms
    }

    fn terms(&self) -> Box<dyn Iterator<Item = TermPostings> + '_> {
        Box::new(self.terms.iter().cloned())
    }

    fn documents(&self) -> Box<dyn Iterator<Item = DocumentEntry> + '_> {
        Box::new(self.documents.iter().cloned())
    }
}
