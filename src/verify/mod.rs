// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The verification layer: global integrity checks over a whole stream.
//!
//! Per-record validation (declared `df`, positive gaps, docid sequence) lives
//! in the stream reader because it is fatal. What lives here is the part that
//! needs the entire stream: summing every `tf` and every `doclength` and
//! comparing both against the header's `total_terms_in_collection`, and
//! tracking the largest absolute docid so it can be held against the doc
//! record count.

mod totals;
mod types;

pub use totals::{verify_stream, verify_stream_with, Totals};
pub use types::{CheckStatus, DocidRange, IntegrityCheck, IntegrityReport};
