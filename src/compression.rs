// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Outer compression, chosen by file extension.
//!
//! CIFF itself is uncompressed; collections are usually shipped gzipped. The
//! codec only ever sees `Read`/`Write`, so compression wraps the file and
//! nothing else changes.
//!
//! | Extension | Layer                        |
//! |-----------|------------------------------|
//! | `.gz`     | gzip (flate2)                |
//! | `.br`     | brotli                       |
//! | other     | none                         |

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;

/// Brotli buffer size and window, matching the brotli CLI defaults.
const BROTLI_BUFFER: usize = 4096;
const BROTLI_QUALITY: u32 = 9;
const BROTLI_LG_WINDOW: u32 = 22;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Brotli,
}

impl Compression {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("gz") => Compression::Gzip,
            Some("br") => Compression::Brotli,
            _ => Compression::None,
        }
    }
}

/// Open `path` for reading, decompressing when the extension says so.
pub fn open_input(path: &Path) -> io::Result<Box<dyn Read>> {
    let file = BufReader::new(File::open(path)?);
    Ok(match Compression::from_path(path) {
        Compression::None => Box::new(file),
        Compression::Gzip => Box::new(BufReader::new(MultiGzDecoder::new(file))),
        Compression::Brotli => Box::new(BufReader::new(brotli::Decompressor::new(
            file,
            BROTLI_BUFFER,
        ))),
    })
}

/// Create `path` for writing, compressing when the extension says so.
pub fn create_output(path: &Path) -> io::Result<OutputFile> {
    let file = BufWriter::new(File::create(path)?);
    Ok(match Compression::from_path(path) {
        Compression::None => OutputFile::Plain(file),
        Compression::Gzip => OutputFile::Gzip(GzEncoder::new(file, flate2::Compression::default())),
        Compression::Brotli => OutputFile::Brotli(Box::new(brotli::CompressorWriter::new(
            file,
            BROTLI_BUFFER,
            BROTLI_QUALITY,
            BROTLI_LG_WINDOW,
        ))),
    })
}

/// A file being written, possibly through a compressor.
///
/// Dropping without [`finish`](Self::finish) may lose the compressed trailer.
pub enum OutputFile {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
    Brotli(Box<brotli::CompressorWriter<BufWriter<File>>>),
}

impl OutputFile {
    /// Write the compressed trailer and flush everything to disk.
    pub fn finish(self) -> io::Result<()> {
        let mut file = match self {
            OutputFile::Plain(file) => file,
            OutputFile::Gzip(encoder) => encoder.finish()?,
            OutputFile::Brotli(encoder) => encoder.into_inner(),
        };
        file.flush()
    }
}

impl Write for OutputFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputFile::Plain(w) => w.write(buf),
            OutputFile::Gzip(w) => w.write(buf),
            OutputFile::Brotli(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputFile::Plain(w) => w.flush(),
            OutputFile::Gzip(w) => w.flush(),
            OutputFile::Brotli(w) => w.flush(),
        }
    }
}
