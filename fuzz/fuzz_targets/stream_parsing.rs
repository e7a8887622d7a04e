// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Whole-stream parsing under adversarial input.
//!
//! A header can declare two billion postings lists on a 20-byte input and a
//! length prefix can claim gigabytes. Both must end in an error once the bytes
//! run out, never in a panic or an unbounded allocation.

#![no_main]

use libfuzzer_sys::fuzz_target;
use ciff::{verify_stream, ReaderOptions, StreamReader};

fuzz_target!(|data: &[u8]| {
    let options = ReaderOptions {
        max_message_len: 1 << 20,
    };
    let Ok(reader) = StreamReader::with_options(data, options) else {
        return;
    };
    let header = reader.header().clone();

    if let Ok(report) = verify_stream(reader) {
        // A stream that verified carried exactly what its header declared.
        assert_eq!(report.postings_lists, header.num_postings_lists as u64);
        assert_eq!(report.doc_records, header.num_doc_records as u64);
        for check in report.checks() {
            if check.passed() {
                assert_eq!(check.expected, check.observed);
            }
        }
    }
});
