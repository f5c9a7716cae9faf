//! Remote data sources.
//!
//! - churn prediction service client (`client`)

pub mod client;

pub use client::{ChurnApiClient, DriftReport, HealthStatus, Scorer};
