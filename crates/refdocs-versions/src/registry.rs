//! Cached registry of release tags and branches.

use std::sync::Arc;

use refdocs_cache::{CachePolicy, FetchResult, SwrCache};
use refdocs_refs::VersionSet;
use tracing::info;

use crate::error::VersionsError;
use crate::host::{PAGE_SIZE, RepoId, VersionHost};
use crate::tags::release_tag;

/// Registry of the documentation refs of upstream repositories.
///
/// Tags and branches are cached separately per repository with
/// stale-while-revalidate semantics: once a listing has been fetched it is
/// always served immediately, and refreshed in the background after the
/// cache TTL.
pub struct VersionRegistry {
    host: Arc<dyn VersionHost>,
    primary_package: String,
    tags: SwrCache<Vec<String>, VersionsError>,
    branches: SwrCache<Vec<String>, VersionsError>,
}

impl VersionRegistry {
    /// Create a registry listing through `host`.
    ///
    /// `primary_package` selects which `<package>@<version>` releases become
    /// documentation tags.
    #[must_use]
    pub fn new(
        host: Arc<dyn VersionHost>,
        primary_package: impl Into<String>,
        policy: CachePolicy,
    ) -> Self {
        Self {
            host,
            primary_package: primary_package.into(),
            tags: SwrCache::new(policy),
            branches: SwrCache::new(policy),
        }
    }

    /// Normalized release tags of `repo`, most recent first.
    pub async fn tags(&self, repo: &RepoId) -> FetchResult<Vec<String>, VersionsError> {
        let host = Arc::clone(&self.host);
        let owned = repo.clone();
        let package = self.primary_package.clone();

        self.tags
            .fetch(&repo.to_string(), move || {
                run_blocking(move || list_tags(host.as_ref(), &owned, &package))
            })
            .await
    }

    /// Branch names of `repo`.
    pub async fn branches(&self, repo: &RepoId) -> FetchResult<Vec<String>, VersionsError> {
        let host = Arc::clone(&self.host);
        let owned = repo.clone();

        self.branches
            .fetch(&repo.to_string(), move || {
                run_blocking(move || list_branches(host.as_ref(), &owned))
            })
            .await
    }

    /// Tags and branches of `repo`, fetched concurrently.
    pub async fn version_set(&self, repo: &RepoId) -> Result<VersionSet, Arc<VersionsError>> {
        let (tags, branches) = futures::try_join!(self.tags(repo), self.branches(repo))?;
        Ok(VersionSet::new(tags.as_ref().clone(), branches.as_ref().clone()))
    }

    /// Forget the cached listings of `repo`.
    pub fn invalidate(&self, repo: &RepoId) {
        let key = repo.to_string();
        self.tags.invalidate(&key);
        self.branches.invalidate(&key);
        info!("Invalidated cached versions of {}", key);
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T, VersionsError>
where
    F: FnOnce() -> Result<T, VersionsError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| VersionsError::Task(e.to_string()))?
}

fn list_tags(
    host: &dyn VersionHost,
    repo: &RepoId,
    primary_package: &str,
) -> Result<Vec<String>, VersionsError> {
    let mut tags = Vec::new();
    let mut page = 1;
    loop {
        let listing = host.list_releases(repo, page, PAGE_SIZE)?;
        tags.extend(
            listing
                .items
                .iter()
                .filter_map(|release| release_tag(release, primary_package)),
        );
        if !listing.has_next {
            break;
        }
        page += 1;
    }

    info!("Found {} tags for {}", tags.len(), repo);
    Ok(tags)
}

fn list_branches(host: &dyn VersionHost, repo: &RepoId) -> Result<Vec<String>, VersionsError> {
    let mut branches = Vec::new();
    let mut page = 1;
    loop {
        let listing = host.list_branches(repo, page, PAGE_SIZE)?;
        branches.extend(listing.items.into_iter().map(|branch| branch.name));
        if !listing.has_next {
            break;
        }
        page += 1;
    }

    info!("Found {} branches for {}", branches.len(), repo);
    Ok(branches)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::mock::MockHost;

    fn repo() -> RepoId {
        RepoId::new("remix-run", "react-router")
    }

    fn host() -> Arc<MockHost> {
        Arc::new(
            MockHost::new()
                .with_release(None, "react-router@6.4.0")
                .with_release(None, "react-router-dom@6.4.0")
                .with_release(Some("v6.3.0"), "v6.3.0")
                .with_release(None, "@remix-run/router@1.0.0")
                .with_release(None, "react-router@6.2.0")
                .with_branch("main")
                .with_branch("dev")
                .with_branch("release-next")
                .with_page_size(2),
        )
    }

    fn registry(host: &Arc<MockHost>, policy: CachePolicy) -> VersionRegistry {
        let host: Arc<dyn VersionHost> = Arc::clone(host) as Arc<dyn VersionHost>;
        VersionRegistry::new(host, "react-router", policy)
    }

    #[tokio::test]
    async fn test_tags_are_filtered_across_pages() {
        let host = host();
        let registry = registry(&host, CachePolicy::default());

        let tags = registry.tags(&repo()).await.unwrap();

        assert_eq!(tags.as_slice(), ["6.4.0", "v6.3.0", "6.2.0"]);
        assert_eq!(host.release_calls(), 3);
    }

    #[tokio::test]
    async fn test_branches_are_listed_across_pages() {
        let host = host();
        let registry = registry(&host, CachePolicy::default());

        let branches = registry.branches(&repo()).await.unwrap();

        assert_eq!(branches.as_slice(), ["main", "dev", "release-next"]);
        assert_eq!(host.branch_calls(), 2);
    }

    #[tokio::test]
    async fn test_fresh_listing_is_served_from_cache() {
        let host = host();
        let registry = registry(&host, CachePolicy::default());

        let first = registry.tags(&repo()).await.unwrap();
        let second = registry.tags(&repo()).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(host.release_calls(), 3);
    }

    #[tokio::test]
    async fn test_version_set_combines_tags_and_branches() {
        let host = host();
        let registry = registry(&host, CachePolicy::default());

        let versions = registry.version_set(&repo()).await.unwrap();

        assert_eq!(versions.tags, ["6.4.0", "v6.3.0", "6.2.0"]);
        assert_eq!(versions.branches, ["main", "dev", "release-next"]);
    }

    #[tokio::test]
    async fn test_invalidate_refetches() {
        let host = host();
        let registry = registry(&host, CachePolicy::default());
        registry.tags(&repo()).await.unwrap();

        host.add_release(None, "react-router@6.5.0");
        registry.invalidate(&repo());
        let tags = registry.tags(&repo()).await.unwrap();

        assert_eq!(tags.as_slice(), ["6.4.0", "v6.3.0", "6.2.0", "6.5.0"]);
    }

    #[tokio::test]
    async fn test_expired_listing_is_served_while_refreshing() {
        let host = host();
        let policy = CachePolicy {
            ttl: Duration::ZERO,
            capacity: 3,
        };
        let registry = registry(&host, policy);
        registry.branches(&repo()).await.unwrap();

        host.add_branch("hotfix");
        let stale = registry.branches(&repo()).await.unwrap();
        assert_eq!(stale.len(), 3);

        let mut refreshed = false;
        for _ in 0..200 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            if registry.branches(&repo()).await.unwrap().len() == 4 {
                refreshed = true;
                break;
            }
        }
        assert!(refreshed, "background refresh never landed");
    }

    #[tokio::test]
    async fn test_upstream_failure_without_cache_is_an_error() {
        let host = host();
        host.set_failing(true);
        let registry = registry(&host, CachePolicy::default());

        let err = registry.tags(&repo()).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            VersionsError::UpstreamStatus { status: 503, .. }
        ));
    }

    #[tokio::test]
    async fn test_upstream_failure_keeps_cached_listing() {
        let host = host();
        let policy = CachePolicy {
            ttl: Duration::ZERO,
            capacity: 3,
        };
        let registry = registry(&host, policy);
        registry.tags(&repo()).await.unwrap();

        host.set_failing(true);
        let tags = registry.tags(&repo()).await.unwrap();

        assert_eq!(tags.len(), 3);
    }
}
