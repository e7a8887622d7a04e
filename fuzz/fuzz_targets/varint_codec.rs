// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for varint decoding, both bare and as a frame length prefix.

#![no_main]

use std::io::Cursor;

use libfuzzer_sys::fuzz_target;
use ciff::binary::{decode_varint, encode_varint, read_framed, varint_len};

fuzz_target!(|data: &[u8]| {
    if let Ok((value, consumed)) = decode_varint(data) {
        assert!(consumed >= 1 && consumed <= 10, "consumed {} bytes", consumed);
        assert!(consumed <= data.len());

        let mut reencoded = Vec::new();
        encode_varint(value, &mut reencoded);
        assert_eq!(reencoded.len(), varint_len(value));

        let (redecoded, reconsumed) = decode_varint(&reencoded)
            .expect("re-encoding of a decoded value should always decode");
        assert_eq!(value, redecoded);
        assert_eq!(reconsumed, reencoded.len());
        // Overlong input encodings decode fine but never re-encode longer.
        assert!(reconsumed <= consumed);
    }

    // A frame is a varint followed by that many bytes. Whatever the prefix
    // claims, reading must end in a value or an error.
    let mut cursor = Cursor::new(data);
    if let Ok(Some(payload)) = read_framed(&mut cursor) {
        assert!(payload.len() <= data.len());
    }
});
