use tracing_subscriber::{fmt, EnvFilter};

/// Output mode for the process-wide logger.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LogFormat {
    /// Human-readable, for local/interactive runs.
    Pretty,
    /// One JSON object per line, for shipped logs.
    Json,
}

/// Initializes the global `tracing` subscriber. Each pipeline stage wraps
/// its per-document work in a span (`#[instrument]` on the use case), so
/// every log line a document produces carries its record id and stage name.
pub fn init(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter);

    match format {
        LogFormat::Pretty => {
            builder.pretty().init();
        }
        LogFormat::Json => {
            builder.json().init();
        }
    }
}
