//! `churn-batch` library crate.
//!
//! The binary (`churn`) is a thin wrapper around this library so that:
//!
//! - the batch pipeline is testable without a network or spawning processes
//! - the service client is reusable from other front-ends
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod report;
