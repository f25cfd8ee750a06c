//! Hosting API abstraction.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::VersionsError;

/// Page size used when listing releases and branches.
pub const PAGE_SIZE: u32 = 100;

/// An `owner/name` repository identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RepoId {
    /// Account or organization owning the repository.
    pub owner: String,
    /// Repository name.
    pub name: String,
}

impl RepoId {
    /// Create a repository identifier from its parts.
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl FromStr for RepoId {
    type Err = VersionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(VersionsError::InvalidRepo(s.to_owned())),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A published release as listed by the hosting API.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Release {
    /// Release title, often `null` for tag-only releases.
    #[serde(default)]
    pub name: Option<String>,
    /// Git tag the release points at.
    pub tag_name: String,
}

/// A branch as listed by the hosting API.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Branch {
    /// Branch name.
    pub name: String,
}

/// One page of a paginated listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paged<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Whether the API advertised a following page.
    pub has_next: bool,
}

/// Source of release and branch listings.
///
/// Implementations are blocking; the registry calls them from
/// `tokio::task::spawn_blocking`.
pub trait VersionHost: Send + Sync {
    /// List one page of releases, most recent first. Pages start at 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API answers with a
    /// non-success status.
    fn list_releases(
        &self,
        repo: &RepoId,
        page: u32,
        per_page: u32,
    ) -> Result<Paged<Release>, VersionsError>;

    /// List one page of branches. Pages start at 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API answers with a
    /// non-success status.
    fn list_branches(
        &self,
        repo: &RepoId,
        page: u32,
        per_page: u32,
    ) -> Result<Paged<Branch>, VersionsError>;
}
