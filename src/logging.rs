use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::{Result, ToolError};

/// Installs the global tracing subscriber. Events go to stderr so the
/// conversion message on stdout stays readable.
///
/// `level` accepts any `EnvFilter` directive; an unparsable one falls back to
/// `warn`.
pub fn init(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}
