//! Mock hosting API for testing.
//!
//! Provides [`MockHost`] for exercising the registry without network access.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::error::VersionsError;
use crate::host::{Branch, Paged, Release, RepoId, VersionHost};

/// In-memory [`VersionHost`].
///
/// Releases and branches are served in insertion order and paginated with
/// the requested page size unless [`MockHost::with_page_size`] overrides it.
///
/// # Example
///
/// ```ignore
/// use refdocs_versions::{MockHost, RepoId, VersionHost};
///
/// let host = MockHost::new()
///     .with_release(None, "remix@2.0.0")
///     .with_branch("main");
///
/// let repo = RepoId::new("remix-run", "remix");
/// let page = host.list_branches(&repo, 1, 100).unwrap();
/// assert_eq!(page.items.len(), 1);
/// assert!(!page.has_next);
/// ```
#[derive(Debug, Default)]
pub struct MockHost {
    releases: RwLock<Vec<Release>>,
    branches: RwLock<Vec<Branch>>,
    page_size: Option<u32>,
    failing: AtomicBool,
    release_calls: AtomicUsize,
    branch_calls: AtomicUsize,
}

impl MockHost {
    /// Create an empty mock host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a release with an optional title.
    #[must_use]
    pub fn with_release(self, name: Option<&str>, tag_name: &str) -> Self {
        self.add_release(name, tag_name);
        self
    }

    /// Add a branch.
    #[must_use]
    pub fn with_branch(self, name: &str) -> Self {
        self.add_branch(name);
        self
    }

    /// Serve pages of `size` items regardless of the requested page size.
    #[must_use]
    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size.max(1));
        self
    }

    /// Add a release after construction.
    pub fn add_release(&self, name: Option<&str>, tag_name: &str) {
        self.releases
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Release {
                name: name.map(str::to_owned),
                tag_name: tag_name.to_owned(),
            });
    }

    /// Add a branch after construction.
    pub fn add_branch(&self, name: &str) {
        self.branches
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Branch {
                name: name.to_owned(),
            });
    }

    /// Make every following request fail with a 503 status.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of release pages requested so far.
    #[must_use]
    pub fn release_calls(&self) -> usize {
        self.release_calls.load(Ordering::SeqCst)
    }

    /// Number of branch pages requested so far.
    #[must_use]
    pub fn branch_calls(&self) -> usize {
        self.branch_calls.load(Ordering::SeqCst)
    }

    fn page<T: Clone>(
        &self,
        items: &RwLock<Vec<T>>,
        page: u32,
        per_page: u32,
    ) -> Result<Paged<T>, VersionsError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(VersionsError::UpstreamStatus {
                status: 503,
                body: "service unavailable".to_owned(),
            });
        }

        let items = items.read().unwrap_or_else(PoisonError::into_inner);
        let size = self.page_size.unwrap_or(per_page).max(1) as usize;
        let start = page.saturating_sub(1) as usize * size;
        let chunk: Vec<T> = items.iter().skip(start).take(size).cloned().collect();

        Ok(Paged {
            items: chunk,
            has_next: start + size < items.len(),
        })
    }
}

impl VersionHost for MockHost {
    fn list_releases(
        &self,
        _repo: &RepoId,
        page: u32,
        per_page: u32,
    ) -> Result<Paged<Release>, VersionsError> {
        self.release_calls.fetch_add(1, Ordering::SeqCst);
        self.page(&self.releases, page, per_page)
    }

    fn list_branches(
        &self,
        _repo: &RepoId,
        page: u32,
        per_page: u32,
    ) -> Result<Paged<Branch>, VersionsError> {
        self.branch_calls.fetch_add(1, Ordering::SeqCst);
        self.page(&self.branches, page, per_page)
    }
}
