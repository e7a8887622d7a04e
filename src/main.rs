// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;
use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "parallel")]
use indicatif::{ProgressBar, ProgressStyle};

use ciff::build::{export_to_path, load_documents, load_terms, ExportOptions, MemoryIndex};
use ciff::compression::open_input;
use ciff::sink::OldDogCsv;
use ciff::{
    verify_stream, verify_stream_with, DocidRange, Header, IntegrityReport, Record, StreamReader,
};

mod cli;
use cli::display::{
    accent, check_line, docid_range_line, field, format_size, group_digits, heading,
    postings_preview, row, section_bot, section_mid, section_top,
};
use cli::{Cli, Commands};

/// Exit status when the stream parses but its accounting does not add up.
const EXIT_INTEGRITY_FAILED: i32 = 2;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Read {
            input,
            dump_interval,
            json,
        } => run_read(&input, dump_interval, json),
        Commands::Export {
            input,
            output,
            terms_file,
            description,
        } => run_export(&input, &output, terms_file.as_deref(), description).map(|()| true),
        Commands::ToCsv {
            input,
            dict,
            terms,
            docs,
        } => run_to_csv(
            &input,
            OldDogCsv {
                dict,
                terms,
                docs,
            },
        )
        .map(|()| true),
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(EXIT_INTEGRITY_FAILED),
        Err(e) => {
            eprintln!("❌ {:#}", e);
            process::exit(1);
        }
    }
}

fn open_stream(input: &Path) -> Result<StreamReader<Box<dyn std::io::Read>>> {
    let source =
        open_input(input).with_context(|| format!("Failed to open {}", input.display()))?;
    StreamReader::open(source).with_context(|| format!("Failed to read header of {}", input.display()))
}

// ═══════════════════════════════════════════════════════════════════════════
// READ
// ═══════════════════════════════════════════════════════════════════════════

/// Returns whether every integrity check passed or was not applicable.
fn run_read(input: &Path, dump_interval: u64, json: bool) -> Result<bool> {
    let reader = open_stream(input)?;

    if json {
        let report = verify_stream(reader)
            .with_context(|| format!("Failed to read {}", input.display()))?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(report.is_consistent());
    }

    print_header(reader.header());
    println!();
    println!(
        "Reading every PostingsList, dumping out every {}th:",
        group_digits(dump_interval)
    );

    let mut lists = 0u64;
    let mut docs = 0u64;
    let report = verify_stream_with(reader, |record| match record {
        Record::PostingsList(list) => {
            if lists % dump_interval == 0 {
                println!(
                    "term: '{}', df={}, cf={}{}",
                    accent(&list.term),
                    group_digits(list.df),
                    group_digits(list.cf),
                    postings_preview(&list.postings)
                );
            }
            lists += 1;
        }
        Record::DocRecord(doc) => {
            if docs == 0 {
                println!("{} postings lists read", group_digits(lists));
                println!();
                println!(
                    "Reading every DocRecord, dumping out every {}th:",
                    group_digits(dump_interval)
                );
            }
            if docs % dump_interval == 0 {
                println!("{}\t{}\t{}", doc.docid, doc.collection_docid, doc.doclength);
            }
            docs += 1;
        }
    })
    .with_context(|| format!("Failed to read {}", input.display()))?;

    if docs == 0 {
        println!("{} postings lists read", group_digits(lists));
    }
    println!();
    print_report(&report);
    Ok(report.is_consistent())
}

fn print_header(header: &Header) {
    section_top("HEADER");
    field("version", &header.version.to_string());
    field("num_postings_lists", &group_digits(header.num_postings_lists as u64));
    field("num_doc_records", &group_digits(header.num_doc_records as u64));
    field("total_postings_lists", &group_digits(header.total_postings_lists as u64));
    field("total_docs", &group_digits(header.total_docs as u64));
    field(
        "total_terms_in_collection",
        &group_digits(header.total_terms_in_collection),
    );
    field("average_doclength", &format!("{:.6}", header.average_doclength));
    field("description", &header.description);
    section_bot();
}

fn print_report(report: &IntegrityReport) {
    section_top("INTEGRITY");
    field("postings lists read", &group_digits(report.postings_lists));
    field("doc records read", &group_digits(report.doc_records));
    field("postings read", &group_digits(report.postings));
    section_mid("CHECKS");
    for check in report.checks() {
        row(&format!(" {}", check.description));
        row(&format!("   {}", check_line(check)));
    }
    row(&format!(" {}", DocidRange::DESCRIPTION));
    row(&format!("   {}", docid_range_line(&report.docid_range)));
    section_bot();
}

// ═══════════════════════════════════════════════════════════════════════════
// EXPORT
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(feature = "parallel")]
fn create_progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.cyan} {prefix:<12} [{bar:40.cyan/dim}] {pos}/{len} {msg}",
    ) {
        pb.set_style(style.progress_chars("━━╸"));
    }
    pb.set_prefix("Indexing");
    pb
}

fn run_export(
    input: &Path,
    output: &Path,
    terms_file: Option<&Path>,
    description: String,
) -> Result<()> {
    let documents = load_documents(input)
        .with_context(|| format!("Failed to load documents from {}", input.display()))?;

    #[cfg(feature = "parallel")]
    let index = {
        let pb = create_progress_bar(documents.len());
        let index = MemoryIndex::from_documents_with_progress(&documents, &pb)?;
        pb.finish_with_message(format!("indexed {} documents", documents.len()));
        index
    };
    #[cfg(not(feature = "parallel"))]
    let index = MemoryIndex::from_documents(&documents)?;

    let terms = match terms_file {
        Some(path) => Some(
            load_terms(path)
                .with_context(|| format!("Failed to read terms from {}", path.display()))?
                .into_iter()
                .collect::<HashSet<String>>(),
        ),
        None => None,
    };
    let options = ExportOptions {
        description,
        terms,
        ..ExportOptions::default()
    };

    let summary = export_to_path(&index, output, &options)
        .with_context(|| format!("Failed to export to {}", output.display()))?;

    eprintln!();
    eprintln!("✅ {}", heading("Export complete"));
    eprintln!(
        "   {} postings lists │ {} doc records │ {} postings │ {}",
        group_digits(summary.postings_lists),
        group_digits(summary.doc_records),
        group_digits(summary.postings),
        format_size(summary.bytes_written)
    );
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════
// TO-CSV
// ═══════════════════════════════════════════════════════════════════════════

fn run_to_csv(input: &Path, sink: OldDogCsv) -> Result<()> {
    let reader = open_stream(input)?;
    let summary = sink
        .write(reader)
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    eprintln!("✅ {}", heading("Tables written"));
    eprintln!(
        "   {} dict rows │ {} term rows │ {} doc rows",
        group_digits(summary.dict_rows),
        group_digits(summary.term_rows),
        group_digits(summary.doc_rows)
    );
    Ok(())
}
