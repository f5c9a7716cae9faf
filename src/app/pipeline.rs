//! Shared batch pipeline used by the CLI front-end.
//!
//! Keeping this in one place keeps the workflow testable without a network:
//! CSV parse -> normalize -> score each row -> aggregate
//!
//! Scoring is strictly sequential. Each row waits for its response before the
//! next request is sent, so output order always matches input order. A row
//! whose request fails is kept with a failed outcome; the run never retries
//! and never aborts on a single row.

use std::path::Path;

use crate::data::Scorer;
use crate::domain::{BatchSummary, EnrichedRow, ScoringOutcome};
use crate::error::AppError;
use crate::io::ingest::{FeatureColumns, RawTable, load_table, normalize_row};
use crate::report::compute_summary;

/// All computed outputs of a single `churn batch` run.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRun {
    /// Input header, in file order.
    pub headers: Vec<String>,
    pub rows: Vec<EnrichedRow>,
    /// `None` when no row was scored.
    pub summary: Option<BatchSummary>,
}

/// Progress notification emitted after each row is scored.
#[derive(Debug, Clone, Copy)]
pub struct RowProgress<'a> {
    /// 1-based position of the row within the batch.
    pub done: usize,
    pub total: usize,
    pub row: &'a EnrichedRow,
}

/// Execute the full batch pipeline for an input file.
///
/// Fails fast with a missing-input error, before any I/O, when no path is
/// given.
pub fn run_batch<S: Scorer>(
    input: Option<&Path>,
    scorer: &S,
    on_row: impl FnMut(RowProgress<'_>),
) -> Result<BatchRun, AppError> {
    let path = input.ok_or_else(|| AppError::missing_input("Please select a CSV file (--input <CSV>)."))?;

    tracing::info!(path = %path.display(), "parsing batch input");
    let table = load_table(path)?;

    Ok(run_batch_with_table(table, scorer, on_row))
}

/// Execute the pipeline on an already-parsed table.
pub fn run_batch_with_table<S: Scorer>(
    table: RawTable,
    scorer: &S,
    mut on_row: impl FnMut(RowProgress<'_>),
) -> BatchRun {
    let columns = FeatureColumns::from_headers(&table.headers);
    let missing = columns.missing();
    if !missing.is_empty() {
        tracing::warn!(
            columns = %missing.join(", "),
            "input is missing feature columns; their defaults will be used"
        );
    }

    let total = table.rows.len();
    tracing::info!(rows = total, "scoring batch");

    let mut rows = Vec::with_capacity(total);
    for (idx, raw) in table.rows.into_iter().enumerate() {
        let record = normalize_row(&raw.cells, &columns);

        let outcome = match scorer.score(&record) {
            Ok(prediction) => {
                tracing::debug!(
                    line = raw.line,
                    probability = prediction.probability,
                    risk = prediction.risk_level.as_str(),
                    "row scored"
                );
                ScoringOutcome::Scored(prediction)
            }
            Err(err) => {
                tracing::warn!(line = raw.line, error = %err, "prediction failed");
                ScoringOutcome::Failed
            }
        };

        rows.push(EnrichedRow {
            line: raw.line,
            cells: raw.cells,
            outcome,
        });

        if let Some(row) = rows.last() {
            on_row(RowProgress {
                done: idx + 1,
                total,
                row,
            });
        }
    }

    let summary = compute_summary(&rows);
    if let Some(s) = &summary {
        tracing::info!(
            scored = s.total,
            failed = rows.len() - s.total,
            churn = s.churn,
            high_risk = s.high_risk,
            "batch complete"
        );
    } else {
        tracing::info!(rows = rows.len(), "batch complete; no rows scored");
    }

    BatchRun {
        headers: table.headers,
        rows,
        summary,
    }
}
