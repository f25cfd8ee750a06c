//! Wiring from configuration to the docs service.

use std::sync::Arc;

use refdocs_config::Config;
use refdocs_docs::{Docs, FsDocStore};
use refdocs_versions::{CachePolicy, GithubClient, RepoId, VersionHost, VersionRegistry};

use crate::error::CliError;

/// Build the docs service described by `config`.
///
/// # Errors
///
/// Returns an error if the `[upstream]` section is missing or names an
/// invalid repository.
pub(crate) fn build_docs(config: &Config) -> Result<Docs, CliError> {
    let upstream = config.require_upstream()?;
    let repo: RepoId = upstream.repo.parse()?;

    let host: Arc<dyn VersionHost> = Arc::new(GithubClient::new(
        &upstream.api_url,
        upstream.token.clone(),
        upstream.timeout(),
    ));
    let policy = CachePolicy {
        ttl: config.versions.ttl(),
        capacity: config.versions.capacity,
    };
    let registry = Arc::new(VersionRegistry::new(
        host,
        upstream.primary_package.clone(),
        policy,
    ));
    let store = Arc::new(FsDocStore::new(config.docs_resolved.source_dir.clone()));

    Ok(Docs::new(
        registry,
        repo,
        store,
        upstream.latest_branch.clone(),
        config.docs_resolved.default_lang.clone(),
    ))
}
