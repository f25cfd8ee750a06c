//! Version discovery for refdocs.
//!
//! Lists the release tags and branches of an upstream repository through a
//! hosting API and caches them:
//!
//! - [`VersionHost`] abstracts the hosting API; [`GithubClient`] implements
//!   it over the GitHub REST API
//! - [`release_tag`] filters releases to the primary package and reduces
//!   their tags to versions
//! - [`VersionRegistry`] caches listings per repository with
//!   stale-while-revalidate semantics
//! - [`MockHost`] for testing (behind `mock` feature flag)

mod client;
mod error;
mod host;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod registry;
mod tags;

pub use client::{DEFAULT_API_URL, DEFAULT_TIMEOUT, GithubClient};
pub use error::VersionsError;
pub use host::{Branch, PAGE_SIZE, Paged, Release, RepoId, VersionHost};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockHost;
pub use refdocs_cache::CachePolicy;
pub use registry::VersionRegistry;
pub use tags::{UNKNOWN_TAG, normalize_tag_name, release_tag};
