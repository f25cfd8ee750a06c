//! Error types for version discovery.

/// Error from listing releases or branches.
#[derive(Debug, thiserror::Error)]
pub enum VersionsError {
    /// HTTP request failed (network error, timeout, invalid JSON, etc).
    #[error("HTTP request failed")]
    Http(#[from] ureq::Error),

    /// The hosting API answered with a non-success status.
    #[error("HTTP error: {status} - {body}")]
    UpstreamStatus {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// Response body is not the expected JSON.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    /// Repository identifier is not `owner/name`.
    #[error("invalid repository {0:?}, expected owner/name")]
    InvalidRepo(String),

    /// The blocking fetch task panicked or was cancelled.
    #[error("version fetch task failed: {0}")]
    Task(String),
}
