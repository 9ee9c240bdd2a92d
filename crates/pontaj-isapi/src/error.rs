//! ISAPI client error types.
//!
//! Errors never cross the orchestrator boundary: every device operation
//! converts its own failures into a `SyncOutcome` according to the
//! per-operation response policy. The taxonomy here exists so that
//! conversion can distinguish validation, transport and protocol failures.

use thiserror::Error;

/// Error that can occur while talking to a terminal.
#[derive(Debug, Error)]
pub enum IsapiError {
    /// A mandatory field was missing before any network call was made.
    #[error("{0}")]
    Validation(String),

    /// The request timed out.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// The device was unreachable (refused, reset, no route).
    #[error("connection error: {0}")]
    Connection(String),

    /// The device sent a digest challenge we could not answer.
    #[error("digest challenge error: {0}")]
    DigestAuth(String),

    /// Downloading the source image for direct-data transport failed.
    #[error("image download failed: {0}")]
    ImageDownload(String),

    /// Any other HTTP-level failure.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl IsapiError {
    /// Whether the failure is a transport-level condition (timeout or
    /// unreachable device) rather than a protocol or input problem.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, IsapiError::Timeout(_) | IsapiError::Connection(_))
    }

    /// Classify a reqwest error into the transport taxonomy.
    #[must_use]
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            IsapiError::Timeout(err.to_string())
        } else if err.is_connect() {
            IsapiError::Connection(err.to_string())
        } else {
            IsapiError::Http(err)
        }
    }
}

/// Result type for ISAPI operations.
pub type IsapiResult<T> = Result<T, IsapiError>;
