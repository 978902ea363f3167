use crate::args::RunArgs;
use crate::commands::Out;
use crate::ingest::read_transactions;
use crate::model::{Amount, Currency, NormalizedTransaction};
use crate::pipeline::{write_cleaned, Pipeline};
use crate::{Config, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

/// The outcome of `finparse run`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub rows_read: usize,
    pub skipped: usize,
    pub sample_mode: bool,
    pub top_category: Option<String>,
    pub top_amount: Amount,
    pub total_usd: Amount,
    /// Issue name -> number of rows carrying it.
    pub issue_counts: BTreeMap<String, usize>,
    pub report: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

/// Reads, normalizes and aggregates the input file, then writes the requested outputs.
///
/// # Errors
/// - The input file cannot be read.
/// - The input lacks a required column (`ingest::MissingRequiredColumn`).
/// - The report or cleaned CSV cannot be written.
pub async fn run(config: &Config, args: &RunArgs) -> Result<Out<RunSummary>> {
    let pipeline = Pipeline::new(config)?;
    let ingested = read_transactions(args.input(), args.sample()).await?;
    for skipped in &ingested.skipped {
        debug!(
            "Line {} was skipped ({}): {}",
            skipped.line, skipped.issue, skipped.reason
        );
    }

    let processed = pipeline.run(&ingested.rows);

    if let Some(path) = args.report() {
        processed.report.write(path).await?;
    }
    if let Some(path) = args.output() {
        write_cleaned(path, &ingested.headers, &ingested.rows, &processed.rows).await?;
    }

    let report = &processed.report;
    let summary = RunSummary {
        rows_read: ingested.rows.len(),
        skipped: ingested.skipped.len(),
        sample_mode: args.sample().is_some(),
        top_category: report.top_category.clone(),
        top_amount: Amount::new(report.top_amount),
        total_usd: Amount::new(report.total_usd),
        issue_counts: issue_counts(&processed.rows),
        report: args.report().map(PathBuf::from),
        output: args.output().map(PathBuf::from),
    };

    let mut message = summary_line(&summary);
    for row in processed.rows.iter().take(args.preview()) {
        message.push('\n');
        message.push_str(&preview_line(row, args.default_currency()));
    }
    Ok(Out::new(message, summary))
}

fn issue_counts(rows: &[NormalizedTransaction]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for issue in rows.iter().flat_map(|row| &row.issues) {
        *counts.entry(issue.to_string()).or_default() += 1;
    }
    counts
}

/// `Read 5 rows; skipped 0; top category: Transport ($200.00 of $325.40 total)`
fn summary_line(summary: &RunSummary) -> String {
    let sample = if summary.sample_mode {
        " (sample mode)"
    } else {
        ""
    };
    let top = match &summary.top_category {
        Some(category) => format!(
            "{category} ({} of {} total)",
            summary.top_amount, summary.total_usd
        ),
        None => "none".to_string(),
    };
    format!(
        "Read {} rows{sample}; skipped {}; top category: {top}",
        summary.rows_read, summary.skipped
    )
}

/// `2023-01-01 | 100 (USD?) | Uber (exact) | Transport | ambiguous_currency`
fn preview_line(row: &NormalizedTransaction, default_currency: Option<&Currency>) -> String {
    let date = row
        .date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());
    let amount = match (row.amount, &row.currency, default_currency) {
        (None, _, _) => "-".to_string(),
        (Some(value), Some(currency), _) => format!("{value} {currency}"),
        (Some(value), None, Some(hint)) => format!("{value} ({hint}?)"),
        (Some(value), None, None) => value.to_string(),
    };
    format!(
        "{date} | {amount} | {} ({}) | {} | {}",
        row.merchant_canonical,
        row.merchant_confidence,
        row.category,
        row.issues_text()
    )
}
