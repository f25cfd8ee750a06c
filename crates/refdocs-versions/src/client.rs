//! GitHub REST API client.
//!
//! Lists releases and branches with the blocking `ureq` agent. Pagination
//! follows the `Link` response header.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::info;
use ureq::Agent;

use crate::error::VersionsError;
use crate::host::{Branch, Paged, Release, RepoId, VersionHost};

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT: u64 = 30;

const USER_AGENT: &str = concat!("refdocs/", env!("CARGO_PKG_VERSION"));

/// GitHub REST API client.
pub struct GithubClient {
    agent: Agent,
    api_url: String,
    token: Option<String>,
}

impl GithubClient {
    /// Create a client for `api_url`.
    ///
    /// An empty `token` is treated as no token; unauthenticated requests are
    /// subject to much lower rate limits.
    #[must_use]
    pub fn new(api_url: &str, token: Option<String>, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            api_url: api_url.trim_end_matches('/').to_owned(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    /// Create a client for the public API with the default timeout.
    #[must_use]
    pub fn public(token: Option<String>) -> Self {
        Self::new(
            DEFAULT_API_URL,
            token,
            Duration::from_secs(DEFAULT_TIMEOUT),
        )
    }

    fn get_page<T: DeserializeOwned>(&self, url: &str) -> Result<Paged<T>, VersionsError> {
        let mut request = self
            .agent
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT);
        if let Some(token) = &self.token {
            let auth_header = format!("Bearer {token}");
            request = request.header("Authorization", &auth_header);
        }

        let response = request.call()?;

        let status = response.status().as_u16();
        let has_next = response
            .headers()
            .get("link")
            .and_then(|value| value.to_str().ok())
            .is_some_and(has_next_link);
        let mut body_reader = response.into_body();

        if status != 200 {
            let error_body = body_reader
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(VersionsError::UpstreamStatus {
                status,
                body: error_body,
            });
        }

        let body = body_reader.read_to_string()?;
        let items: Vec<T> = serde_json::from_str(&body)?;
        Ok(Paged { items, has_next })
    }
}

impl VersionHost for GithubClient {
    fn list_releases(
        &self,
        repo: &RepoId,
        page: u32,
        per_page: u32,
    ) -> Result<Paged<Release>, VersionsError> {
        let url = format!(
            "{}/repos/{}/{}/releases?per_page={per_page}&page={page}",
            self.api_url, repo.owner, repo.name
        );
        info!("Listing releases of {} (page {})", repo, page);
        self.get_page(&url)
    }

    fn list_branches(
        &self,
        repo: &RepoId,
        page: u32,
        per_page: u32,
    ) -> Result<Paged<Branch>, VersionsError> {
        let url = format!(
            "{}/repos/{}/{}/branches?per_page={per_page}&page={page}",
            self.api_url, repo.owner, repo.name
        );
        info!("Listing branches of {} (page {})", repo, page);
        self.get_page(&url)
    }
}

/// Whether a `Link` header advertises a `rel="next"` page.
fn has_next_link(header: &str) -> bool {
    header.split(',').any(|link| {
        link.split(';')
            .skip(1)
            .any(|param| matches!(param.trim(), r#"rel="next""# | "rel=next"))
    })
}
