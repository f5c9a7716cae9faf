//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - sent to / decoded from the prediction service as JSON
//! - carried through the batch pipeline in memory
//! - exported back to CSV

use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize, Serializer};

/// Customer geography.
///
/// On the wire this is two mutually exclusive flags; neither set means France.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Geography {
    #[default]
    France,
    Germany,
    Spain,
}

impl Geography {
    pub fn display_name(self) -> &'static str {
        match self {
            Geography::France => "France",
            Geography::Germany => "Germany",
            Geography::Spain => "Spain",
        }
    }
}

/// One customer, in the exact shape the `/predict` endpoint expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FeatureRecord {
    pub credit_score: f64,
    pub age: i64,
    pub tenure: i64,
    pub balance: f64,
    pub num_of_products: i64,
    #[serde(serialize_with = "as_flag")]
    pub has_cr_card: bool,
    #[serde(serialize_with = "as_flag")]
    pub is_active_member: bool,
    pub estimated_salary: f64,
    #[serde(rename = "Geography_Germany", serialize_with = "as_flag")]
    pub geography_germany: bool,
    #[serde(rename = "Geography_Spain", serialize_with = "as_flag")]
    pub geography_spain: bool,
}

impl FeatureRecord {
    /// Input column names, in wire order.
    pub const COLUMNS: [&'static str; 10] = [
        "CreditScore",
        "Age",
        "Tenure",
        "Balance",
        "NumOfProducts",
        "HasCrCard",
        "IsActiveMember",
        "EstimatedSalary",
        "Geography_Germany",
        "Geography_Spain",
    ];

    pub fn geography(&self) -> Geography {
        if self.geography_germany {
            Geography::Germany
        } else if self.geography_spain {
            Geography::Spain
        } else {
            Geography::France
        }
    }

    pub fn set_geography(&mut self, geography: Geography) {
        self.geography_germany = geography == Geography::Germany;
        self.geography_spain = geography == Geography::Spain;
    }
}

impl Default for FeatureRecord {
    /// Per-field fallbacks used when a cell is missing or unparsable.
    fn default() -> Self {
        Self {
            credit_score: 0.0,
            age: 0,
            tenure: 0,
            balance: 0.0,
            num_of_products: 1,
            has_cr_card: false,
            is_active_member: false,
            estimated_salary: 0.0,
            geography_germany: false,
            geography_spain: false,
        }
    }
}

fn as_flag<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*value))
}

/// Risk tier assigned by the service from the churn probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

/// Binary churn decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    WillChurn,
    WillNotChurn,
}

impl Decision {
    pub fn from_flag(flag: u8) -> Option<Self> {
        match flag {
            1 => Some(Decision::WillChurn),
            0 => Some(Decision::WillNotChurn),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Decision::WillChurn => "Will Churn",
            Decision::WillNotChurn => "Will Not Churn",
        }
    }
}

/// A validated response from the prediction service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Churn probability in `[0, 1]`.
    pub probability: f64,
    pub decision: Decision,
    pub risk_level: RiskLevel,
}

/// Result of scoring a single row.
///
/// A failed row carries no detail beyond the fact that it failed; the cause is
/// logged when it happens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoringOutcome {
    Scored(Prediction),
    Failed,
}

impl ScoringOutcome {
    pub fn prediction(&self) -> Option<&Prediction> {
        match self {
            ScoringOutcome::Scored(p) => Some(p),
            ScoringOutcome::Failed => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ScoringOutcome::Failed)
    }
}

/// One input row plus its scoring outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRow {
    /// 1-based line number in the input file.
    pub line: usize,
    /// Raw cells, aligned to the input header.
    pub cells: Vec<String>,
    pub outcome: ScoringOutcome,
}

/// Aggregate over successfully scored rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchSummary {
    pub total: usize,
    pub churn: usize,
    pub avg_probability: f64,
    pub high_risk: usize,
}

/// Connection settings for the prediction service.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl ApiConfig {
    pub const DEFAULT_BASE_URL: &'static str =
        "https://bank-churn.blackbay-c234dcf2.italynorth.azurecontainerapps.io";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Join an endpoint path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_record_uses_wire_names_and_integer_flags() {
        let mut record = FeatureRecord {
            credit_score: 650.0,
            age: 35,
            tenure: 5,
            balance: 100000.0,
            num_of_products: 2,
            has_cr_card: true,
            is_active_member: false,
            estimated_salary: 75000.0,
            ..FeatureRecord::default()
        };
        record.set_geography(Geography::Spain);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["CreditScore"], 650.0);
        assert_eq!(json["NumOfProducts"], 2);
        assert_eq!(json["HasCrCard"], 1);
        assert_eq!(json["IsActiveMember"], 0);
        assert_eq!(json["Geography_Germany"], 0);
        assert_eq!(json["Geography_Spain"], 1);
        assert_eq!(json.as_object().unwrap().len(), FeatureRecord::COLUMNS.len());
        for col in FeatureRecord::COLUMNS {
            assert!(json.get(col).is_some(), "missing {col}");
        }
    }

    #[test]
    fn geography_round_trips_through_flags() {
        let mut record = FeatureRecord::default();
        assert_eq!(record.geography(), Geography::France);
        record.set_geography(Geography::Germany);
        assert!(record.geography_germany && !record.geography_spain);
        assert_eq!(record.geography(), Geography::Germany);
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let config = ApiConfig {
            base_url: "http://localhost:8000/".to_string(),
            ..ApiConfig::default()
        };
        assert_eq!(config.endpoint("/predict"), "http://localhost:8000/predict");
        assert_eq!(config.endpoint("drift/check"), "http://localhost:8000/drift/check");
    }

    #[test]
    fn decision_flag_mapping() {
        assert_eq!(Decision::from_flag(1).map(Decision::label), Some("Will Churn"));
        assert_eq!(Decision::from_flag(0).map(Decision::label), Some("Will Not Churn"));
        assert_eq!(Decision::from_flag(2), None);
    }
}
