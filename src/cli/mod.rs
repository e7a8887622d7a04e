// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the `ciff` command-line interface.
//!
//! Three subcommands: `read` dumps and verifies a stream, `export` builds one
//! from JSON-lines documents, and `to-csv` converts one into OldDog tables.
//! Inputs and outputs ending in `.gz` or `.br` are (de)compressed on the fly.

pub mod display;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "ciff",
    about = "Read and write Common Index File Format streams",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Dump a CIFF stream and run the integrity checks
    ///
    /// Exits with status 2 when the stream parses but an integrity check fails.
    Read {
        /// Path to .ciff file (.gz and .br are decompressed)
        input: PathBuf,

        /// Print every Nth postings list and doc record
        #[arg(long, default_value = "100000", value_parser = clap::value_parser!(u64).range(1..))]
        dump_interval: u64,

        /// Print the integrity report as JSON instead of the dump
        #[arg(long)]
        json: bool,
    },

    /// Build a CIFF stream from JSON-lines documents
    Export {
        /// JSON-lines file with one {"id", "contents"} object per line
        #[arg(short, long)]
        input: PathBuf,

        /// Output path; a .gz or .br suffix selects compression
        #[arg(short, long)]
        output: PathBuf,

        /// Only export postings for the terms listed in this file, one per line
        #[arg(long)]
        terms_file: Option<PathBuf>,

        /// Free-text description stored in the header
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Convert a CIFF stream into pipe-separated OldDog tables
    ToCsv {
        /// Path to .ciff file
        input: PathBuf,

        /// Output for termid|term|df rows
        #[arg(long)]
        dict: PathBuf,

        /// Output for termid|docid|tf rows
        #[arg(long)]
        terms: PathBuf,

        /// Output for collection_docid|docid|doclength rows
        #[arg(long)]
        docs: Option<PathBuf>,
    },
}
