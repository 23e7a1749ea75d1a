//! Logging infrastructure for easel.
//!
//! Structured logging via `tracing` with a compact human-readable
//! default and a verbose variant that includes targets and span close
//! events.

use tracing::{Level, span};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Initialize the tracing subscriber for structured logging.
///
/// `RUST_LOG` takes precedence when set; otherwise the filter defaults
/// to `easel=debug,info` (verbose) or `easel=info,warn`.
///
/// # Arguments
/// * `verbose` - If true, include targets and span close events
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("easel=debug,info")
            } else {
                EnvFilter::try_new("easel=info,warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if verbose {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_line_number(false)
                    .with_file(false)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_line_number(false)
                    .with_file(false)
                    .compact(),
            )
            .try_init()?;
    }

    Ok(())
}

/// Create a span for one pipeline operation with structured fields.
///
/// Attempt counts and verdicts are logged as events inside the span by
/// the orchestrators.
pub fn operation_span(operation: &str, fingerprint: &str) -> tracing::Span {
    span!(
        Level::INFO,
        "pipeline_operation",
        operation = %operation,
        fingerprint = %fingerprint,
    )
}
