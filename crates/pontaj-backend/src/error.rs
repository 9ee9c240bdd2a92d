//! Backend client errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    /// No backend base URL was configured.
    #[error("backend is not configured")]
    NotConfigured,

    /// HTTP-level failure talking to the Edge Function.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The Edge Function answered with a non-success status.
    #[error("backend returned HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The response body did not match the expected envelope.
    #[error("backend response decode failed: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type BackendResult<T> = Result<T, BackendError>;
