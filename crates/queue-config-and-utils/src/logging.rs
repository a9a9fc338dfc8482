//! Logging initialization.
//!
//! Library code only emits `tracing` events; binaries call [`init_logging`]
//! once at startup to decide where those events go.

use std::convert::Infallible;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// Environment variable selecting the output format.
const LOG_FORMAT_ENV: &str = "BROKER_QUEUE_LOG_FORMAT";

/// Output format for the stderr subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable single-line output.
    #[default]
    Compact,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Read the format from `BROKER_QUEUE_LOG_FORMAT` (`json` or anything else).
    pub fn from_env() -> Self {
        std::env::var(LOG_FORMAT_ENV)
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for LogFormat {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "json" | "jsonl" => Self::Json,
            _ => Self::Compact,
        })
    }
}

/// Initialize logging to stderr.
///
/// `RUST_LOG` takes precedence over `level` when set.
///
/// ```ignore
/// init_logging("info");
/// tracing::info!("queue ready");
/// ```
pub fn init_logging(level: &str) {
    init_logging_with_format(level, LogFormat::from_env());
}

/// Initialize logging with an explicit output format.
///
/// Calling this more than once is harmless; later calls leave the first
/// subscriber in place.
pub fn init_logging_with_format(level: &str, format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let result = match format {
        LogFormat::Compact => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .compact()
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .json()
            .try_init(),
    };

    if result.is_ok() {
        tracing::debug!(level, ?format, "logging initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_parsing() {
        assert_eq!("json".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!(" JSONL ".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("pretty".parse::<LogFormat>(), Ok(LogFormat::Compact));
        assert_eq!(LogFormat::default(), LogFormat::Compact);
    }

    #[test]
    fn init_logging_twice_does_not_panic() {
        init_logging_with_format("debug", LogFormat::Compact);
        init_logging_with_format("info", LogFormat::Json);
    }
}
