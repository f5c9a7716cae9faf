//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the pipeline and client code stay free of presentation concerns
//! - output changes are localized

use crate::data::{DriftReport, HealthStatus};
use crate::domain::{BatchSummary, EnrichedRow, FeatureRecord, Prediction, ScoringOutcome};
use crate::io::ingest::FeatureColumns;

/// Format the batch header line plus summary statistics.
pub fn format_batch_summary(rows: &[EnrichedRow], summary: Option<&BatchSummary>) -> String {
    let failed = rows.iter().filter(|r| r.outcome.is_failed()).count();

    let mut out = String::new();
    out.push_str("=== churn - Batch Prediction ===\n");
    out.push_str(&format!(
        "Rows: {} | scored={} | failed={}\n",
        rows.len(),
        rows.len() - failed,
        failed
    ));

    match summary {
        Some(s) => {
            out.push_str(&format!("Total customers : {}\n", s.total));
            out.push_str(&format!("At risk         : {}\n", s.churn));
            out.push_str(&format!("Avg probability : {:.1}%\n", s.avg_probability * 100.0));
            out.push_str(&format!("High risk       : {}\n", s.high_risk));
        }
        None => out.push_str("No rows were scored; no summary available.\n"),
    }

    out
}

/// Format the first `limit` rows as a results table.
pub fn format_results(headers: &[String], rows: &[EnrichedRow], limit: usize) -> String {
    let columns = FeatureColumns::from_headers(headers);
    let credit_idx = columns.index_of("CreditScore");
    let age_idx = columns.index_of("Age");
    let cell = |row: &EnrichedRow, idx: Option<usize>| -> String {
        idx.and_then(|i| row.cells.get(i)).cloned().unwrap_or_default()
    };

    let mut out = String::new();
    out.push_str(
        format!(
            "{:>6} {:>12} {:>6} {:>18} {:<16} {:<8}\n",
            "line", "credit_score", "age", "churn_probability", "prediction", "risk"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<6} {:-<12} {:-<6} {:-<18} {:-<16} {:-<8}\n", "", "", "", "", "", "").trim_end());
    out.push('\n');

    for row in rows.iter().take(limit) {
        let (prob, label, risk) = match &row.outcome {
            ScoringOutcome::Scored(p) => (
                format!("{:.2}%", p.probability * 100.0),
                p.decision.label(),
                p.risk_level.as_str(),
            ),
            ScoringOutcome::Failed => ("Error".to_string(), "", ""),
        };
        out.push_str(
            format!(
                "{:>6} {:>12} {:>6} {:>18} {:<16} {:<8}\n",
                row.line,
                truncate(&cell(row, credit_idx), 12),
                truncate(&cell(row, age_idx), 6),
                prob,
                label,
                risk,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    if rows.len() > limit {
        out.push_str(&format!(
            "Showing {limit} of {} results. Export CSV to see all.\n",
            rows.len()
        ));
    }

    out
}

/// Format a single-customer prediction.
pub fn format_prediction(record: &FeatureRecord, prediction: &Prediction) -> String {
    let mut out = String::new();
    out.push_str("=== churn - Single Customer Prediction ===\n");
    out.push_str(&format!(
        "Customer: credit_score={} age={} tenure={} balance={:.2} products={} geography={}\n",
        record.credit_score,
        record.age,
        record.tenure,
        record.balance,
        record.num_of_products,
        record.geography().display_name(),
    ));
    out.push_str(&format!("Churn probability : {:.2}%\n", prediction.probability * 100.0));
    out.push_str(&format!("Prediction        : {}\n", prediction.decision.label()));
    out.push_str(&format!("Risk level        : {}\n", prediction.risk_level.as_str()));
    out
}

pub fn format_health(health: &HealthStatus) -> String {
    format!(
        "API status   : {}\nModel loaded : {}\n",
        health.status,
        if health.model_loaded { "yes" } else { "no" }
    )
}

pub fn format_drift(report: &DriftReport, threshold: f64) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} drift detected ({:.1}%) at threshold {threshold:.2}\n",
        report.drift_level(),
        report.drift_percentage()
    ));
    out.push_str(&format!("Features analyzed  : {}\n", report.features_analyzed));
    out.push_str(&format!("Features with drift: {}\n", report.features_drifted));
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
