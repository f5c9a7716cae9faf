//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - builds the service client from explicit configuration
//! - runs the requested command (batch, predict, health, drift)
//! - prints reports and writes optional exports

use std::time::Duration;

use clap::Parser;

use crate::cli::{ApiArgs, BatchArgs, Command, DriftArgs, PredictArgs};
use crate::data::ChurnApiClient;
use crate::domain::{ApiConfig, FeatureRecord};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `churn` binary.
pub fn run() -> Result<(), AppError> {
    // `.env` must be loaded before clap reads `env = ...` fallbacks.
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();
    crate::logging::init_logging(cli.verbose);

    let config = api_config_from_args(&cli.api)?;
    tracing::debug!(base_url = %config.base_url, api_key = config.api_key.is_some(), "api config");

    match cli.command {
        Command::Batch(args) => handle_batch(args, config),
        Command::Predict(args) => handle_predict(args, config),
        Command::Health => handle_health(config),
        Command::Drift(args) => handle_drift(args, config),
    }
}

fn handle_batch(args: BatchArgs, config: ApiConfig) -> Result<(), AppError> {
    let client = ChurnApiClient::new(config)?;
    let quiet = args.quiet;

    let run = pipeline::run_batch(args.input.as_deref(), &client, |p| {
        if !quiet {
            let status = if p.row.outcome.is_failed() { "failed" } else { "ok" };
            eprintln!("[{}/{}] line {} {status}", p.done, p.total, p.row.line);
        }
    })?;

    println!(
        "{}",
        crate::report::format_batch_summary(&run.rows, run.summary.as_ref())
    );
    if !run.rows.is_empty() {
        println!(
            "{}",
            crate::report::format_results(&run.headers, &run.rows, args.top)
        );
    }

    if let Some(path) = &args.export {
        crate::io::export::write_predictions_csv(path, &run.headers, &run.rows)?;
        tracing::info!(path = %path.display(), rows = run.rows.len(), "exported predictions");
        println!("Exported {} rows to {}", run.rows.len(), path.display());
    }

    Ok(())
}

fn handle_predict(args: PredictArgs, config: ApiConfig) -> Result<(), AppError> {
    let client = ChurnApiClient::new(config)?;
    let record = feature_record_from_args(&args);
    let prediction = client.predict(&record)?;
    println!("{}", crate::report::format_prediction(&record, &prediction));
    Ok(())
}

fn handle_health(config: ApiConfig) -> Result<(), AppError> {
    let client = ChurnApiClient::new(config)?;
    let health = client.health()?;
    println!("{}", crate::report::format_health(&health));
    Ok(())
}

fn handle_drift(args: DriftArgs, config: ApiConfig) -> Result<(), AppError> {
    validate_threshold(args.threshold)?;
    let client = ChurnApiClient::new(config)?;
    let report = client.check_drift(args.threshold)?;
    println!("{}", crate::report::format_drift(&report, args.threshold));
    Ok(())
}

/// Resolve connection settings from flags/env, applying defaults.
pub fn api_config_from_args(args: &ApiArgs) -> Result<ApiConfig, AppError> {
    let base_url = args
        .api_url
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(ApiConfig::DEFAULT_BASE_URL)
        .to_string();

    let api_key = args
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let timeout_secs = args.timeout_secs.unwrap_or(ApiConfig::DEFAULT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(AppError::config("Timeout must be at least 1 second."));
    }

    Ok(ApiConfig {
        base_url,
        api_key,
        timeout: Duration::from_secs(timeout_secs),
    })
}

pub fn feature_record_from_args(args: &PredictArgs) -> FeatureRecord {
    let mut record = FeatureRecord {
        credit_score: args.credit_score,
        age: args.age,
        tenure: args.tenure,
        balance: args.balance,
        num_of_products: args.num_of_products,
        has_cr_card: !args.no_credit_card,
        is_active_member: !args.inactive,
        estimated_salary: args.estimated_salary,
        geography_germany: false,
        geography_spain: false,
    };
    record.set_geography(args.geography);
    record
}

fn validate_threshold(threshold: f64) -> Result<(), AppError> {
    if !(0.01..=0.5).contains(&threshold) {
        return Err(AppError::config(format!(
            "Drift threshold must be between 0.01 and 0.5 (got {threshold})."
        )));
    }
    Ok(())
}
