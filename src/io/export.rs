//! Export scored rows to CSV.
//!
//! The export is the input file with the prediction columns appended, meant to
//! be easy to consume in spreadsheets or downstream scripts.

use std::fs;
use std::path::Path;

use crate::domain::{EnrichedRow, ScoringOutcome};
use crate::error::AppError;

pub const DEFAULT_EXPORT_FILE: &str = "predictions.csv";

pub const COL_PROBABILITY: &str = "Churn_Probability";
pub const COL_PREDICTION: &str = "Prediction";
pub const COL_RISK: &str = "Risk_Level";
pub const COL_ERROR: &str = "Error";

/// Marker written in the `Error` column for rows that could not be scored.
pub const ERROR_MARKER: &str = "Prediction failed";

/// Serialize rows to CSV text.
///
/// Output is the input header plus `Churn_Probability`, `Prediction`,
/// `Risk_Level`, and an `Error` column when at least one row failed. Rows keep
/// their input order. The function is pure, so repeated calls on the same rows
/// produce identical bytes.
pub fn predictions_to_csv(headers: &[String], rows: &[EnrichedRow]) -> Result<String, AppError> {
    let with_error = rows.iter().any(|r| r.outcome.is_failed());

    let mut writer = csv::WriterBuilder::new()
        .flexible(false)
        .from_writer(Vec::new());

    let mut header: Vec<&str> = headers.iter().map(String::as_str).collect();
    header.extend([COL_PROBABILITY, COL_PREDICTION, COL_RISK]);
    if with_error {
        header.push(COL_ERROR);
    }
    writer
        .write_record(&header)
        .map_err(|e| AppError::io(format!("Failed to write export CSV header: {e}")))?;

    for row in rows {
        let mut record: Vec<String> = row.cells.clone();
        // Keep every record as wide as the header even if a caller built a
        // row by hand.
        record.resize(headers.len(), String::new());

        match &row.outcome {
            ScoringOutcome::Scored(p) => {
                record.push(p.probability.to_string());
                record.push(p.decision.label().to_string());
                record.push(p.risk_level.as_str().to_string());
                if with_error {
                    record.push(String::new());
                }
            }
            ScoringOutcome::Failed => {
                record.extend([String::new(), String::new(), String::new()]);
                record.push(ERROR_MARKER.to_string());
            }
        }

        writer
            .write_record(&record)
            .map_err(|e| AppError::io(format!("Failed to write export CSV row: {e}")))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::io(format!("Failed to flush export CSV: {e}")))?;
    String::from_utf8(bytes).map_err(|e| AppError::io(format!("Export CSV is not valid UTF-8: {e}")))
}

/// Write scored rows to a CSV file.
pub fn write_predictions_csv(path: &Path, headers: &[String], rows: &[EnrichedRow]) -> Result<(), AppError> {
    let text = predictions_to_csv(headers, rows)?;
    fs::write(path, text)
        .map_err(|e| AppError::io(format!("Failed to write export CSV '{}': {e}", path.display())))
}
