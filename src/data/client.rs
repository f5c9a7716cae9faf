//! HTTP client for the churn prediction service.
//!
//! Endpoints used:
//! - `POST /predict`      one customer -> probability, decision, risk tier
//! - `GET  /health`       service and model status
//! - `POST /drift/check`  drift audit computed server-side

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::domain::{ApiConfig, Decision, FeatureRecord, Prediction, RiskLevel};
use crate::error::AppError;

/// Header carrying the static API key (`X-API-Key`; header names are lowercase on the wire).
pub const API_KEY_HEADER: &str = "x-api-key";

/// Anything that can turn one feature record into a prediction.
///
/// The batch pipeline only depends on this trait, so it can be driven by the
/// real HTTP client or by an in-memory scorer.
pub trait Scorer {
    fn score(&self, record: &FeatureRecord) -> Result<Prediction, AppError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub model_loaded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DriftReport {
    pub status: String,
    pub features_analyzed: usize,
    pub features_drifted: usize,
}

impl DriftReport {
    /// Percentage of analyzed features that drifted.
    pub fn drift_percentage(&self) -> f64 {
        if self.features_analyzed == 0 {
            return 0.0;
        }
        self.features_drifted as f64 / self.features_analyzed as f64 * 100.0
    }

    pub fn drift_level(&self) -> &'static str {
        let pct = self.drift_percentage();
        if pct > 50.0 {
            "HIGH"
        } else if pct > 20.0 {
            "MEDIUM"
        } else {
            "LOW"
        }
    }
}

#[derive(Debug, Deserialize)]
struct PredictionResponse {
    churn_probability: f64,
    prediction: u8,
    risk_level: RiskLevel,
}

impl PredictionResponse {
    fn validate(self) -> Result<Prediction, AppError> {
        if !(self.churn_probability.is_finite() && (0.0..=1.0).contains(&self.churn_probability)) {
            return Err(AppError::remote(format!(
                "Prediction service returned an out-of-range probability: {}",
                self.churn_probability
            )));
        }
        let decision = Decision::from_flag(self.prediction).ok_or_else(|| {
            AppError::remote(format!(
                "Prediction service returned an invalid decision: {}",
                self.prediction
            ))
        })?;
        Ok(Prediction {
            probability: self.churn_probability,
            decision,
            risk_level: self.risk_level,
        })
    }
}

pub struct ChurnApiClient {
    client: Client,
    config: ApiConfig,
}

impl ChurnApiClient {
    pub fn new(config: ApiConfig) -> Result<Self, AppError> {
        if !(config.base_url.starts_with("http://") || config.base_url.starts_with("https://")) {
            return Err(AppError::config(format!(
                "Invalid API base URL '{}': expected http:// or https://",
                config.base_url
            )));
        }

        let mut headers = HeaderMap::new();
        if let Some(key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
            let value = HeaderValue::from_str(key)
                .map_err(|e| AppError::config(format!("Invalid API key header value: {e}")))?;
            headers.insert(API_KEY_HEADER, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    pub fn predict(&self, record: &FeatureRecord) -> Result<Prediction, AppError> {
        let resp = self
            .client
            .post(self.config.endpoint("predict"))
            .json(record)
            .send()
            .map_err(|e| AppError::remote(format!("Prediction request failed: {e}")))?;

        let body: PredictionResponse = decode(resp, "prediction")?;
        body.validate()
    }

    pub fn health(&self) -> Result<HealthStatus, AppError> {
        let resp = self
            .client
            .get(self.config.endpoint("health"))
            .send()
            .map_err(|e| AppError::remote(format!("Health request failed: {e}")))?;
        decode(resp, "health")
    }

    pub fn check_drift(&self, threshold: f64) -> Result<DriftReport, AppError> {
        let resp = self
            .client
            .post(self.config.endpoint("drift/check"))
            .query(&[("threshold", threshold)])
            .send()
            .map_err(|e| AppError::remote(format!("Drift request failed: {e}")))?;
        decode(resp, "drift")
    }
}

impl Scorer for ChurnApiClient {
    fn score(&self, record: &FeatureRecord) -> Result<Prediction, AppError> {
        self.predict(record)
    }
}

fn decode<T: DeserializeOwned>(resp: Response, what: &str) -> Result<T, AppError> {
    let status = resp.status();
    if !status.is_success() {
        let detail = resp
            .json::<ErrorBody>()
            .ok()
            .and_then(|b| b.detail)
            .map(|d| format!(": {d}"))
            .unwrap_or_default();
        return Err(AppError::remote(format!(
            "{what} request failed with status {status}{detail}"
        )));
    }

    resp.json()
        .map_err(|e| AppError::remote(format!("Failed to parse {what} response: {e}")))
}

/// Error body shape used by the service (`{"detail": "..."}`).
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}
