//! Reporting utilities: batch summary and formatted terminal output.

use crate::domain::{BatchSummary, Decision, EnrichedRow, RiskLevel};

pub mod format;

pub use format::*;

/// Aggregate the successfully scored rows.
///
/// Failed rows are excluded from every statistic. Returns `None` when no row
/// was scored.
pub fn compute_summary(rows: &[EnrichedRow]) -> Option<BatchSummary> {
    let scored: Vec<_> = rows.iter().filter_map(|r| r.outcome.prediction()).collect();
    if scored.is_empty() {
        return None;
    }

    let total = scored.len();
    let churn = scored.iter().filter(|p| p.decision == Decision::WillChurn).count();
    let high_risk = scored.iter().filter(|p| p.risk_level == RiskLevel::High).count();
    let avg_probability = scored.iter().map(|p| p.probability).sum::<f64>() / total as f64;

    Some(BatchSummary {
        total,
        churn,
        avg_probability,
        high_risk,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Prediction, ScoringOutcome};

    fn row(outcome: ScoringOutcome) -> EnrichedRow {
        EnrichedRow {
            line: 2,
            cells: Vec::new(),
            outcome,
        }
    }

    fn scored(probability: f64, flag: u8, risk: RiskLevel) -> EnrichedRow {
        row(ScoringOutcome::Scored(Prediction {
            probability,
            decision: Decision::from_flag(flag).unwrap(),
            risk_level: risk,
        }))
    }

    #[test]
    fn summary_over_all_scored_rows() {
        let rows = vec![
            scored(0.1, 0, RiskLevel::Low),
            scored(0.6, 1, RiskLevel::Medium),
            scored(0.9, 1, RiskLevel::High),
        ];
        let s = compute_summary(&rows).unwrap();
        assert_eq!(s.total, 3);
        assert_eq!(s.churn, 2);
        assert_eq!(s.high_risk, 1);
        assert!((s.avg_probability - 1.6 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn failed_rows_are_excluded() {
        let rows = vec![
            scored(0.4, 0, RiskLevel::Medium),
            row(ScoringOutcome::Failed),
        ];
        let s = compute_summary(&rows).unwrap();
        assert_eq!(s.total, 1);
        assert_eq!(s.churn, 0);
        assert!((s.avg_probability - 0.4).abs() < 1e-12);
    }

    #[test]
    fn no_scored_rows_means_no_summary() {
        assert_eq!(compute_summary(&[]), None);
        assert_eq!(compute_summary(&[row(ScoringOutcome::Failed)]), None);
    }
}
