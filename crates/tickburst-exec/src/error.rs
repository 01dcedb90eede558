//! Execution error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    /// Fatal configuration error: the signing algorithm is not in the
    /// registry. Raised before any network activity.
    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Unit-scoped signing failure; the affected request is skipped.
    #[error("Signing failed: {0}")]
    Signing(String),

    /// A signed request could not be turned into a transport request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The reactor task is gone; no further registrations are possible.
    #[error("Request reactor unavailable")]
    ReactorUnavailable,

    /// The tick stream closed before a price was observed.
    #[error("Tick stream closed")]
    TickStreamClosed,
}

pub type ExecResult<T> = Result<T, ExecError>;
