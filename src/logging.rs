//! Logging setup.
//!
//! Logs go to stderr so stdout stays clean for reports. `RUST_LOG` wins over
//! the `-v` flag when set.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Default filter directive for a given `-v` count.
pub fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info,churn_batch=info",
        _ => "debug,churn_batch=debug",
    }
}

/// Initialize the global subscriber. Safe to call more than once; later
/// calls are ignored.
pub fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_directives() {
        assert_eq!(default_directive(0), "warn");
        assert!(default_directive(1).starts_with("info"));
        assert!(default_directive(5).starts_with("debug"));
    }
}
