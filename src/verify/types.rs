// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Integrity check results.
//!
//! A failed check is a finding about the producer, not a reason to stop
//! reading: the stream was structurally valid, the accounting just doesn't
//! add up. So these are plain values with a `Display`, never errors.
//!
//! | Check                 | Compares                                          |
//! |-----------------------|---------------------------------------------------|
//! | `doclength` (Check A) | `sum(doclength)` vs `total_terms_in_collection`   |
//! | `tf` (Check B)        | `sum(tf)` vs `total_terms_in_collection`          |
//!
//! The two sums come from different halves of an exporter, so when exactly
//! one fails it points at the side that is broken.
//!
//! A third finding, [`DocidRange`], holds for every stream, subset or not:
//! each absolute docid in a postings list must name one of the doc records.

use std::fmt;

use serde::Serialize;

use crate::binary::Header;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Passed,
    Failed,
    /// The stream is a filtered subset, so collection totals cannot be matched.
    NotVerifiable,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckStatus::Passed => f.write_str("PASSED"),
            CheckStatus::Failed => f.write_str("FAILED"),
            CheckStatus::NotVerifiable => f.write_str("NOT VERIFIABLE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrityCheck {
    pub name: &'static str,
    pub description: &'static str,
    pub expected: u64,
    pub observed: u64,
    pub status: CheckStatus,
}

impl IntegrityCheck {
    pub(crate) fn evaluate(
        name: &'static str,
        description: &'static str,
        expected: u64,
        observed: u64,
        verifiable: bool,
    ) -> Self {
        let status = if !verifiable {
            CheckStatus::NotVerifiable
        } else if expected == observed {
            CheckStatus::Passed
        } else {
            CheckStatus::Failed
        };
        Self {
            name,
            description,
            expected,
            observed,
            status,
        }
    }

    pub fn passed(&self) -> bool {
        self.status == CheckStatus::Passed
    }

    pub fn failed(&self) -> bool {
        self.status == CheckStatus::Failed
    }
}

impl fmt::Display for IntegrityCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            CheckStatus::Failed => write!(
                f,
                "{}: [FAILED] expected {} observed {}",
                self.description, self.expected, self.observed
            ),
            status => write!(f, "{}: [{}]", self.description, status),
        }
    }
}

/// Largest absolute docid referenced by any posting, against the doc records
/// the header declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocidRange {
    /// `None` when the stream has no postings.
    pub max_docid: Option<u64>,
    pub num_doc_records: u32,
}

impl DocidRange {
    pub const DESCRIPTION: &'static str =
        "absolute docids in PostingsLists < 'num_doc_records' in Header";

    pub fn status(&self) -> CheckStatus {
        match self.max_docid {
            Some(max) if max >= self.num_doc_records as u64 => CheckStatus::Failed,
            _ => CheckStatus::Passed,
        }
    }

    pub fn failed(&self) -> bool {
        self.status() == CheckStatus::Failed
    }
}

impl fmt::Display for DocidRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max_docid {
            Some(max) if self.failed() => write!(
                f,
                "{}: [FAILED] max docid {} with {} doc records",
                Self::DESCRIPTION,
                max,
                self.num_doc_records
            ),
            _ => write!(f, "{}: [{}]", Self::DESCRIPTION, self.status()),
        }
    }
}

/// Everything a full pass over a stream found out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegrityReport {
    pub header: Header,
    pub postings_lists: u64,
    pub doc_records: u64,
    pub postings: u64,
    /// Check A.
    pub doclength_check: IntegrityCheck,
    /// Check B.
    pub tf_check: IntegrityCheck,
    pub docid_range: DocidRange,
}

impl IntegrityReport {
    pub fn checks(&self) -> [&IntegrityCheck; 2] {
        [&self.doclength_check, &self.tf_check]
    }

    /// True when no check failed and every docid is in range. Unverifiable
    /// checks do not count as failures.
    pub fn is_consistent(&self) -> bool {
        self.checks().iter().all(|check| !check.failed()) && !self.docid_range.failed()
    }
}
