//! `cdesk import`: validate a client CSV and optionally load it into a client file.
//!
//! Invalid rows are reported, not fatal. Only file-level problems (bad CSV,
//! a missing required column, the row cap) fail the command.

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;
use clientdesk_core::dates::parse_due_date;
use clientdesk_core::import::{ImportBatch, ImportSummary, ValidatedRow, parse_clients};
use serde::Serialize;
use tracing::info;

use crate::cmd::{project_config, resolve_today};
use crate::output::{CliError, OutputMode, fail, pretty_kv, pretty_section, render_mode};
use crate::store::JsonFileSink;

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Client CSV with a header row.
    pub csv: PathBuf,

    /// Client JSON file to import valid rows into. Without it, only validate.
    #[arg(long)]
    pub into: Option<PathBuf>,

    /// Reference date (YYYY-MM-DD) for birthday checks.
    #[arg(long, value_parser = parse_due_date)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
struct InvalidRow {
    line: u64,
    name: String,
    email: String,
    errors: Vec<String>,
}

impl InvalidRow {
    fn new(row: &ValidatedRow) -> Self {
        Self {
            line: row.line,
            name: row.raw.name.clone(),
            email: row.raw.email.clone(),
            errors: row
                .errors
                .iter()
                .map(|(field, message)| format!("{field}: {message}"))
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ImportReport {
    rows: usize,
    valid: usize,
    invalid: usize,
    truncated: usize,
    invalid_rows: Vec<InvalidRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ImportSummary>,
}

impl ImportReport {
    fn new(batch: &ImportBatch, summary: Option<ImportSummary>) -> Self {
        Self {
            rows: batch.rows.len(),
            valid: batch.valid_count(),
            invalid: batch.invalid_count(),
            truncated: batch.truncated,
            invalid_rows: batch
                .rows
                .iter()
                .filter(|r| !r.is_valid())
                .map(InvalidRow::new)
                .collect(),
            summary,
        }
    }
}

pub fn run_import(args: &ImportArgs, output: OutputMode) -> anyhow::Result<()> {
    let config = project_config(output)?;
    let file = File::open(&args.csv).map_err(|e| {
        fail(
            output,
            &CliError::new(format!("cannot open {}: {e}", args.csv.display())),
        )
    })?;
    let today = resolve_today(args.today);

    let batch = parse_clients(BufReader::new(file), today, &config.import)
        .map_err(|e| fail(output, &CliError::coded(e.code(), e.to_string())))?;
    info!(
        rows = batch.rows.len(),
        invalid = batch.invalid_count(),
        "client file validated"
    );

    let summary = match &args.into {
        Some(path) => {
            let mut sink = JsonFileSink::open(path)
                .map_err(|e| fail(output, &CliError::new(format!("{e:#}"))))?;
            let summary = batch
                .submit(&mut sink)
                .map_err(|e| fail(output, &CliError::coded(e.code(), e.to_string())))?;
            Some(summary)
        }
        None => None,
    };

    render_mode(
        output,
        &ImportReport::new(&batch, summary),
        render_import_text,
        render_import_pretty,
    )
}

fn render_import_text(report: &ImportReport, w: &mut dyn Write) -> std::io::Result<()> {
    for row in &report.invalid_rows {
        writeln!(w, "invalid\t{}\t{}\t{}", row.line, row.name, row.errors.join("; "))?;
    }
    write!(
        w,
        "rows={} valid={} invalid={} truncated={}",
        report.rows, report.valid, report.invalid, report.truncated
    )?;
    if let Some(summary) = report.summary {
        write!(
            w,
            " imported={} failed={}",
            summary.imported, summary.failed
        )?;
    }
    writeln!(w)
}

fn render_import_pretty(report: &ImportReport, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Client import")?;
    pretty_kv(w, "rows", report.rows.to_string())?;
    pretty_kv(w, "valid", report.valid.to_string())?;
    pretty_kv(w, "invalid", report.invalid.to_string())?;
    if report.truncated > 0 {
        pretty_kv(w, "truncated", report.truncated.to_string())?;
    }
    if let Some(summary) = report.summary {
        pretty_kv(w, "imported", summary.imported.to_string())?;
        pretty_kv(w, "failed", summary.failed.to_string())?;
    }

    if !report.invalid_rows.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Invalid rows")?;
        for row in &report.invalid_rows {
            writeln!(w, "  line {:<4} {}", row.line, row.name)?;
            for error in &row.errors {
                writeln!(w, "             - {error}")?;
            }
        }
    }
    Ok(())
}
