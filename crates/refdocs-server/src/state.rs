//! Application state.
//!
//! Shared state for all request handlers.

use refdocs_docs::Docs;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Menu, doc and version lookups for the upstream repository.
    pub(crate) docs: Docs,
    /// Bearer token accepted by the refresh endpoint (`None` disables it).
    pub(crate) refresh_token: Option<String>,
}
