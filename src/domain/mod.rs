//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the customer feature record sent to the service (`FeatureRecord`)
//! - service responses (`Prediction`, `RiskLevel`, `Decision`)
//! - batch outputs (`ScoringOutcome`, `EnrichedRow`, `BatchSummary`)
//! - connection settings (`ApiConfig`)

pub mod types;

pub use types::*;
