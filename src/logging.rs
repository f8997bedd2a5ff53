//! File-based logging module for ACIDWAVE
//!
//! This module sets up tracing-based logging that writes to a file instead of stdout,
//! since the application uses a TUI that occupies the terminal.

use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const LOG_DIR: &str = ".logs";
const LOG_FILE_PREFIX: &str = "acidwave";

/// Takes precedence over `RUST_LOG`, so the client can be traced without
/// turning up every dependency
const LOG_FILTER_ENV: &str = "ACIDWAVE_LOG";
const DEFAULT_FILTER: &str = "acidwave=debug,reqwest=info,symphonia=warn,warn";

/// Initialize the logging system.
///
/// Logs are written to `.logs/acidwave.YYYY-MM-DD.log` with daily rotation.
/// The log level comes from `ACIDWAVE_LOG`, then `RUST_LOG`.
///
/// Default log levels:
/// - `acidwave` modules: DEBUG
/// - `reqwest`: INFO
/// - `symphonia` (streamed audio decoding): WARN
/// - Other crates: WARN
pub fn init_logging() -> anyhow::Result<()> {
    // Ensure log directory exists
    let log_dir = Path::new(LOG_DIR);
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir)?;
    }

    // Daily rotating file, written off the render loop
    let file_appender = RollingFileAppender::new(Rotation::DAILY, LOG_DIR, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The guard must outlive the subscriber, which lives until exit
    Box::leak(Box::new(guard));

    let filter = log_filter(
        std::env::var(LOG_FILTER_ENV).ok(),
        std::env::var(EnvFilter::DEFAULT_ENV).ok(),
    );

    // File output only; the terminal belongs to the TUI
    let fmt_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false) // No ANSI colors in log files
        .with_target(true) // Module path shows which layer logged
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    tracing::info!("Logging initialized - logs written to {}/", LOG_DIR);

    Ok(())
}

/// First directive string that parses wins; blank or malformed ones are skipped
fn log_filter(acidwave_log: Option<String>, rust_log: Option<String>) -> EnvFilter {
    [acidwave_log, rust_log]
        .into_iter()
        .flatten()
        .filter(|directives| !directives.trim().is_empty())
        .find_map(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Log the outcome of a backend API request
#[macro_export]
macro_rules! log_api_result {
    ($operation:expr, $result:expr) => {
        match &$result {
            Ok(_) => tracing::debug!(operation = $operation, "API request successful"),
            Err(e) => tracing::warn!(operation = $operation, error = %e, "API request failed"),
        }
    };
}

/// Log the start of a backend API request, with optional context fields
#[macro_export]
macro_rules! log_api_request {
    ($operation:expr) => {
        tracing::debug!(operation = $operation, "API request started");
    };
    ($operation:expr, $($field:tt)+) => {
        tracing::debug!(operation = $operation, $($field)+, "API request started");
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acidwave_log_wins_over_rust_log() {
        let filter = log_filter(Some("acidwave=trace".into()), Some("error".into()));
        assert_eq!(filter.to_string(), "acidwave=trace");
    }

    #[test]
    fn malformed_directives_fall_through() {
        let filter = log_filter(Some("acidwave=notalevel".into()), Some("info".into()));
        assert_eq!(filter.to_string(), "info");
    }

    #[test]
    fn nothing_set_uses_default() {
        let filter = log_filter(None, Some("  ".into()));
        assert!(filter.to_string().contains("acidwave=debug"));
    }
}
