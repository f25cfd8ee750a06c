//! Content store trait and error types.
//!
//! A content store holds the [`Doc`] records of every ref and language. The
//! menu builder lists a whole ref+language with [`DocStore::find_many`]; the
//! doc fetcher probes candidate file paths with [`DocStore::find_first`].

use std::path::PathBuf;

use async_trait::async_trait;

use crate::doc::Doc;

/// Semantic error categories.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreErrorKind {
    /// Resource does not exist.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Path escapes the store or is malformed.
    InvalidPath,
    /// Stored data could not be parsed (e.g. broken front matter).
    InvalidData,
    /// Other/unknown error category.
    Other,
}

/// Store error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct StoreError {
    /// Semantic error category.
    pub kind: StoreErrorKind,
    /// Path context (if applicable).
    pub path: Option<PathBuf>,
    /// Backend identifier (e.g., "Fs", "Memory").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StoreError {
    /// Create a new store error.
    #[must_use]
    pub fn new(kind: StoreErrorKind) -> Self {
        Self {
            kind,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Create a store error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => StoreErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => StoreErrorKind::PermissionDenied,
            _ => StoreErrorKind::Other,
        };
        Self::new(kind).with_path(path).with_source(err)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (path: /foo/bar)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            StoreErrorKind::NotFound => "Not found",
            StoreErrorKind::PermissionDenied => "Permission denied",
            StoreErrorKind::InvalidPath => "Invalid path",
            StoreErrorKind::InvalidData => "Invalid data",
            StoreErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Read access to documentation pages.
///
/// A ref or language with no pages is not an error: `find_many` returns an
/// empty list and `find_first` returns `None`.
#[async_trait]
pub trait DocStore: Send + Sync {
    /// All pages of `ref_` in `lang`, in no particular order.
    async fn find_many(&self, ref_: &str, lang: &str) -> Result<Vec<Doc>, StoreError>;

    /// The first of `file_paths` that exists for `ref_` in `lang`.
    ///
    /// Candidates are tried in order.
    async fn find_first(
        &self,
        ref_: &str,
        lang: &str,
        file_paths: &[String],
    ) -> Result<Option<Doc>, StoreError>;
}
