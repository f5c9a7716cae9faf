//! Input/output helpers.
//!
//! - CSV ingest + lenient normalization (`ingest`)
//! - scored-row CSV export (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
