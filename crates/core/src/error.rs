use thiserror::Error;

/// Failures raised by the remote API collaborator.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Rejected on the client before any request was sent.
    #[error("invalid request: {0}")]
    Validation(String),
    /// The service answered with a non-success status (stale revisions included).
    #[error("{method} {path} rejected with status {status}: {message}")]
    Remote {
        method: &'static str,
        path: String,
        status: u16,
        message: String,
    },
    #[error("lookup failed: {0}")]
    Lookup(String),
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn validation<T: Into<String>>(message: T) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn lookup<T: Into<String>>(message: T) -> Self {
        ApiError::Lookup(message.into())
    }

    /// True for revision mismatches reported by the service.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ApiError::Remote { status: 409 | 412, .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Validation(_))
    }
}
