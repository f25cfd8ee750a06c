//! CLI error types.

use refdocs_config::ConfigError;
use refdocs_docs::DocsError;
use refdocs_server::ServerError;
use refdocs_versions::VersionsError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Versions(#[from] VersionsError),

    #[error("{0}")]
    Docs(#[from] DocsError),

    #[error("{0}")]
    Server(#[from] ServerError),

    #[error("{0}")]
    Validation(String),
}
