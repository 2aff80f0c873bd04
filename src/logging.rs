//! Logging setup for the CLI.
//!
//! Installs a global tracing subscriber writing to stderr, so that reports
//! and listings on stdout stay machine-readable. `RUST_LOG` overrides the
//! level chosen from `-v` flags.

use std::sync::OnceLock;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INSTALLED: OnceLock<()> = OnceLock::new();

/// Errors that may occur while initializing logging.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// Failed to set the global tracing subscriber.
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(tracing::subscriber::SetGlobalDefaultError),
}

/// Maps the number of `-v` flags to a filter directive.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

fn build_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)))
}

/// Initialize tracing to write to stderr.
///
/// Subsequent calls are no-ops. Failures are returned so callers can carry
/// on without logging.
pub fn init(verbosity: u8) -> Result<(), LoggingError> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(build_filter(verbosity));
    tracing::subscriber::set_global_default(subscriber).map_err(LoggingError::SetGlobal)?;

    let _ = INSTALLED.set(());
    Ok(())
}
