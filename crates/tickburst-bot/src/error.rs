//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Feed error: {0}")]
    Feed(#[from] tickburst_feed::FeedError),

    #[error("Execution error: {0}")]
    Exec(#[from] tickburst_exec::ExecError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] tickburst_telemetry::TelemetryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
