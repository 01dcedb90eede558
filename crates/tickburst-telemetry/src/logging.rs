//! Structured logging initialization.

use crate::error::TelemetryResult;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Machine-readable JSON, for production log shippers.
    Json,
    /// Human-readable multi-line output, for development.
    Pretty,
}

impl LogFormat {
    /// Pick the format from the `RUST_ENV` value: `production` means JSON,
    /// everything else (including unset) means pretty.
    pub fn from_rust_env(value: Option<&str>) -> Self {
        match value {
            Some("production") => Self::Json,
            _ => Self::Pretty,
        }
    }

    fn detect() -> Self {
        Self::from_rust_env(std::env::var("RUST_ENV").ok().as_deref())
    }
}

/// Initialize structured logging.
///
/// `default_directives` is the filter applied when `RUST_LOG` is unset,
/// e.g. `"info,tickburst=debug"`; the output format follows `RUST_ENV`.
pub fn init_logging(default_directives: &str) -> TelemetryResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));
    let registry = tracing_subscriber::registry().with(env_filter);

    match LogFormat::detect() {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_names(true),
            )
            .init(),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_follows_rust_env() {
        assert_eq!(LogFormat::from_rust_env(Some("production")), LogFormat::Json);
        assert_eq!(LogFormat::from_rust_env(Some("staging")), LogFormat::Pretty);
        assert_eq!(LogFormat::from_rust_env(None), LogFormat::Pretty);
    }
}
