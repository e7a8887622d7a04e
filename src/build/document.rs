// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CiffError, Result};

/// One input document, in the JSON-lines shape Anserini's `JsonCollection`
/// uses: an external id and the text to index.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub contents: String,
}

/// Read documents from a JSON-lines file. Blank lines are skipped.
pub fn load_documents(path: &Path) -> Result<Vec<Document>> {
    let file = File::open(path)?;
    parse_documents(BufReader::new(file))
}

pub fn parse_documents<B: BufRead>(input: B) -> Result<Vec<Document>> {
    let mut documents = Vec::new();
    for (index, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc: Document = serde_json::from_str(&line).map_err(|e| {
            CiffError::InvalidInput(format!("line {}: {}", index + 1, e))
        })?;
        documents.push(doc);
    }
    Ok(documents)
}

/// Read a terms file: one term per line, trimmed, blanks ignored.
pub fn load_terms(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)?;
    let mut terms = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let term = line.trim();
        if !term.is_empty() {
            terms.push(term.to_string());
        }
    }
    Ok(terms)
}
