//! Command-line parsing for the churn prediction client.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the pipeline and HTTP code.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::domain::Geography;
use crate::io::export::DEFAULT_EXPORT_FILE;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "churn", version, about = "Bank customer churn prediction client")]
pub struct Cli {
    #[command(flatten)]
    pub api: ApiArgs,

    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Score every customer in a CSV file, print a summary, and optionally export.
    Batch(BatchArgs),
    /// Score a single customer given on the command line.
    Predict(PredictArgs),
    /// Check that the prediction service is up and its model is loaded.
    Health,
    /// Run the service-side data drift audit.
    Drift(DriftArgs),
}

/// Connection options shared by every subcommand.
///
/// Values fall back to the environment (and a `.env` file) when the flag is
/// not given.
#[derive(Debug, Args, Clone)]
pub struct ApiArgs {
    /// Base URL of the prediction service.
    #[arg(long = "api-url", env = "CHURN_API_URL", global = true)]
    pub api_url: Option<String>,

    /// API key sent in the `X-API-Key` header.
    #[arg(long = "api-key", env = "CHURN_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long = "timeout", env = "CHURN_API_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,
}

/// Options for batch scoring.
#[derive(Debug, Args, Clone)]
pub struct BatchArgs {
    /// Customer CSV with a header row (CreditScore, Age, Tenure, ...).
    #[arg(short = 'i', long, value_name = "CSV")]
    pub input: Option<PathBuf>,

    /// Export scored rows to CSV (defaults to `predictions.csv` when given without a path).
    #[arg(
        short = 'o',
        long,
        value_name = "CSV",
        num_args = 0..=1,
        default_missing_value = DEFAULT_EXPORT_FILE
    )]
    pub export: Option<PathBuf>,

    /// Number of result rows to print.
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Suppress per-row progress on stderr.
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

/// Customer attributes for a single prediction.
#[derive(Debug, Args, Clone)]
pub struct PredictArgs {
    /// Credit score (0-1000).
    #[arg(long, default_value_t = 650.0)]
    pub credit_score: f64,

    /// Age in years (18-100).
    #[arg(long, default_value_t = 35, value_parser = clap::value_parser!(i64).range(18..=100))]
    pub age: i64,

    /// Years with the bank (0-50).
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(i64).range(0..=50))]
    pub tenure: i64,

    /// Account balance.
    #[arg(long, default_value_t = 100000.0)]
    pub balance: f64,

    /// Number of products held (1-4).
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(i64).range(1..=4))]
    pub num_of_products: i64,

    /// Customer does not hold a credit card.
    #[arg(long)]
    pub no_credit_card: bool,

    /// Customer is not an active member.
    #[arg(long)]
    pub inactive: bool,

    /// Estimated yearly salary.
    #[arg(long, default_value_t = 75000.0)]
    pub estimated_salary: f64,

    /// Customer geography.
    #[arg(long, value_enum, default_value_t = Geography::France)]
    pub geography: Geography,
}

/// Options for the drift audit.
#[derive(Debug, Args, Clone)]
pub struct DriftArgs {
    /// Statistical significance threshold (0.01-0.5).
    #[arg(long, default_value_t = 0.05)]
    pub threshold: f64,
}
