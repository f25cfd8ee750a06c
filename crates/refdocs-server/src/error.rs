//! Error types for the HTTP server.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use refdocs_docs::{DocsError, StoreErrorKind};
use serde_json::json;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Lookup error from the docs service.
    #[error(transparent)]
    Docs(#[from] DocsError),

    /// Docs path that names no language and cannot be redirected.
    #[error("Path not found: {0}")]
    PathNotFound(String),

    /// Missing or wrong refresh token.
    #[error("Unauthorized")]
    Unauthorized,

    /// Refresh endpoint called without a configured token.
    #[error("Refresh is not configured")]
    RefreshDisabled,

    /// Listener could not be bound or the server failed while running.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Host and port do not form a socket address.
    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Docs(DocsError::RefNotFound(ref_)) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Ref not found", "ref": ref_}),
            ),
            Self::Docs(DocsError::DocNotFound { ref_, lang, slug }) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Doc not found", "ref": ref_, "lang": lang, "slug": slug}),
            ),
            Self::Docs(DocsError::Versions(e)) => {
                tracing::warn!(error = %e, "Version lookup failed");
                (
                    StatusCode::BAD_GATEWAY,
                    json!({"error": "Upstream error", "detail": e.to_string()}),
                )
            }
            Self::Docs(DocsError::Store(e)) => {
                let status = match e.kind {
                    StoreErrorKind::NotFound => StatusCode::NOT_FOUND,
                    StoreErrorKind::InvalidPath => StatusCode::BAD_REQUEST,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status.is_server_error() {
                    tracing::error!(error = %e, "Content store error");
                }
                (status, json!({"error": e.to_string()}))
            }
            Self::PathNotFound(path) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Path not found", "path": path}),
            ),
            Self::Unauthorized => {
                let mut response = (
                    StatusCode::UNAUTHORIZED,
                    axum::Json(json!({"error": "Unauthorized"})),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                return response;
            }
            Self::RefreshDisabled => (
                StatusCode::NOT_FOUND,
                json!({"error": "Refresh is not configured"}),
            ),
            Self::Io(_) | Self::InvalidAddress(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": self.to_string()}),
            ),
        };

        (status, axum::Json(body)).into_response()
    }
}
