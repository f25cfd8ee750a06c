//! Error types for menu and doc lookups.

use std::sync::Arc;

use refdocs_versions::VersionsError;

use crate::store::StoreError;

/// Error from [`Docs`](crate::Docs) operations.
#[derive(Debug, thiserror::Error)]
pub enum DocsError {
    /// The requested ref is neither a branch, a tag nor a satisfiable range.
    #[error("ref not found: {0}")]
    RefNotFound(String),

    /// No page exists for the slug in the requested or fallback language.
    #[error("doc not found: {slug} ({lang}, {ref_})")]
    DocNotFound {
        /// Resolved ref name.
        ref_: String,
        /// Requested language.
        lang: String,
        /// Requested slug.
        slug: String,
    },

    /// Tags or branches could not be listed.
    #[error("version lookup failed")]
    Versions(#[from] Arc<VersionsError>),

    /// Content store error.
    #[error("content store error")]
    Store(#[from] StoreError),
}
