// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy for the codec.
//!
//! Every variant is fatal. The format has no partial-record recovery: once a
//! length prefix is misaligned, every following byte is garbage. The only
//! non-fatal outcomes are the aggregate integrity checks in [`crate::verify`],
//! which are reported as diagnostics rather than errors.

use std::io;

use thiserror::Error;

/// Which record kind a reader or writer is dealing with.
///
/// Used in error messages and by the reader to decide what comes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Header,
    PostingsList,
    DocRecord,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Header => f.write_str("Header"),
            RecordKind::PostingsList => f.write_str("PostingsList"),
            RecordKind::DocRecord => f.write_str("DocRecord"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CiffError {
    /// End of input in the middle of a length prefix, a payload, or before a
    /// record the header declared.
    #[error("truncated stream: {context}")]
    TruncatedStream { context: String },

    /// A record's bytes do not decode to the schema.
    #[error("malformed {message}: {reason}")]
    MalformedMessage {
        message: &'static str,
        reason: String,
    },

    /// Writer-side precondition: docids must be strictly increasing.
    #[error(
        "docids not strictly increasing at position {position}: {previous} followed by {current}"
    )]
    UnsortedInput {
        position: usize,
        previous: u32,
        current: u32,
    },

    /// A decoded gap past the first posting is zero, or the running sum overflowed.
    #[error("corrupt delta at posting {position}: gap {gap} after docid {previous}")]
    CorruptDelta {
        position: usize,
        previous: u32,
        gap: u32,
    },

    /// Declared `df` disagrees with the number of postings actually present.
    #[error("unexpected number of postings for term '{term}': expected {expected}, got {actual}")]
    PostingsCountMismatch {
        term: String,
        expected: u64,
        actual: u64,
    },

    /// Reader driven out of the Header -> PostingsList x N -> DocRecord x M order.
    #[error("protocol order violation: requested {requested} while expecting {expected}")]
    ProtocolOrderViolation {
        requested: RecordKind,
        expected: String,
    },

    /// Writer-side precondition: term frequencies are positive.
    #[error("term frequency at position {position} is zero")]
    ZeroTermFrequency { position: usize },

    /// Writer-side precondition: parallel docid/tf slices.
    #[error("docids and tfs differ in length: {docids} vs {tfs}")]
    LengthMismatch { docids: usize, tfs: usize },

    /// A DocRecord whose docid is not its ordinal position.
    #[error("doc record out of sequence: expected docid {expected}, got {actual}")]
    DocidOutOfSequence { expected: u32, actual: u32 },

    /// Writer-side precondition: the value does not fit the field's protobuf type.
    #[error("{message}.{field} = {value} does not fit the wire type (max {max})")]
    ValueOutOfRange {
        message: &'static str,
        field: &'static str,
        value: u64,
        max: u64,
    },

    /// Caller or source collaborator input that cannot become a stream.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, CiffError>;

impl CiffError {
    pub(crate) fn malformed(message: &'static str, reason: impl Into<String>) -> Self {
        CiffError::MalformedMessage {
            message,
            reason: reason.into(),
        }
    }

    pub(crate) fn truncated(context: impl Into<String>) -> Self {
        CiffError::TruncatedStream {
            context: context.into(),
        }
    }

    /// True for errors caused by the caller rather than by the bytes.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            CiffError::UnsortedInput { .. }
                | CiffError::ProtocolOrderViolation { .. }
                | CiffError::ZeroTermFrequency { .. }
                | CiffError::LengthMismatch { .. }
                | CiffError::ValueOutOfRange { .. }
        )
    }
}
