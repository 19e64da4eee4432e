//! Errors raised while querying the session-status endpoint

use thiserror::Error;

/// Error raised by a [`crate::source::StatusSource`]
#[derive(Error, Debug)]
pub enum StatusError {
    /// Transport failure, including timeouts from the HTTP client
    #[error("Session status request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-2xx status
    #[error("Session status endpoint answered with status {0}")]
    Status(u16),

    /// The body is not a session status document
    #[error("Malformed session status body: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Type alias for Result with StatusError
pub type StatusResult<T> = Result<T, StatusError>;
