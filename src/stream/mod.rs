// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Sequential readers and writers over whole CIFF streams.
//!
//! Single-owner, single-threaded: a writer owns its sink and a reader owns its
//! source for the lifetime of the stream. Parallel exports have to produce
//! independent byte ranges and stitch them behind one adjusted header; nothing
//! here helps with that.

mod reader;
mod writer;

pub use reader::{ReaderOptions, Record, Records, StreamReader};
pub use writer::{StreamWriter, WriteSummary};
