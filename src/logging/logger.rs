// file: src/logging/logger.rs
// version: 1.0.0
// guid: 8d1f6c37-e4a2-4b59-b7d0-2c9e5a1f8b63

//! Logger initialization and configuration

use crate::error::DeployError;
use crate::Result;
use std::io::IsTerminal;
use tracing::Instrument;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Pick the filter for the given verbosity flags; `RUST_LOG` wins when set
pub fn level_filter(verbose: bool, quiet: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    }
}

/// Initialize the logging system
pub fn init_logger(verbose: bool, quiet: bool) -> Result<()> {
    tracing_subscriber::registry()
        .with(level_filter(verbose, quiet))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init()
        .map_err(|e| DeployError::config(format!("Failed to initialize logger: {}", e)))?;

    Ok(())
}

/// Initialize structured JSON logging on stderr
pub fn init_json_logger(verbose: bool, quiet: bool) -> Result<()> {
    tracing_subscriber::registry()
        .with(level_filter(verbose, quiet))
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| DeployError::config(format!("Failed to initialize JSON logger: {}", e)))?;

    Ok(())
}

/// Run a future inside a named operation span
pub async fn with_async_operation_span<F, Fut, R>(operation: &str, f: F) -> R
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = R>,
{
    let span = tracing::info_span!("operation", name = operation);
    async move { f().await }.instrument(span).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logger_twice_fails_gracefully() {
        // The global subscriber can only be set once per process
        let _ = init_logger(false, false);
        assert!(init_logger(true, false).is_err());
    }

    #[test]
    fn test_level_filter_quiet() {
        if std::env::var("RUST_LOG").is_err() {
            assert_eq!(level_filter(false, true).to_string(), "error");
            assert_eq!(level_filter(true, false).to_string(), "debug");
        }
    }

    #[tokio::test]
    async fn test_with_async_operation_span() {
        let result = with_async_operation_span("deploy", || async { 40 + 2 }).await;
        assert_eq!(result, 42);
    }
}
