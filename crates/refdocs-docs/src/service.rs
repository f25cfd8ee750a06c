//! Menu and doc lookups for a resolved ref.

use std::sync::Arc;

use refdocs_refs::{ParamTriple, Ref, VersionSet, select_ref, validate_params};
use refdocs_versions::{RepoId, VersionRegistry};
use tracing::debug;

use crate::doc::Doc;
use crate::error::DocsError;
use crate::menu::{MenuNode, build_menu, merge_docs};
use crate::store::DocStore;

/// Language every page exists in; localized pages fall back to it.
pub const FALLBACK_LANG: &str = "en";

/// Documentation lookups for one upstream repository.
pub struct Docs {
    registry: Arc<VersionRegistry>,
    repo: RepoId,
    store: Arc<dyn DocStore>,
    latest_branch: String,
    default_lang: String,
}

impl Docs {
    /// Create a lookup service.
    ///
    /// `latest_branch` is served for the `latest` keyword; `default_lang`
    /// is used when a path does not start with a language code.
    #[must_use]
    pub fn new(
        registry: Arc<VersionRegistry>,
        repo: RepoId,
        store: Arc<dyn DocStore>,
        latest_branch: impl Into<String>,
        default_lang: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            repo,
            store,
            latest_branch: latest_branch.into(),
            default_lang: default_lang.into(),
        }
    }

    /// Upstream repository.
    #[must_use]
    pub fn repo(&self) -> &RepoId {
        &self.repo
    }

    /// Version registry the service resolves refs against.
    #[must_use]
    pub fn registry(&self) -> &VersionRegistry {
        &self.registry
    }

    /// Known tags and branches.
    pub async fn versions(&self) -> Result<VersionSet, DocsError> {
        Ok(self.registry.version_set(&self.repo).await?)
    }

    /// Redirect target for a docs path, or `None` if it is canonical.
    pub async fn canonical_path(&self, params: &ParamTriple) -> Result<Option<String>, DocsError> {
        let versions = self.versions().await?;
        Ok(validate_params(
            &versions.tags,
            &versions.branches,
            params,
            &self.default_lang,
        ))
    }

    /// Resolve a version-or-branch URL segment.
    pub async fn resolve_ref(&self, param: &str) -> Result<Ref, DocsError> {
        let versions = self.versions().await?;
        select_ref(param, &versions, &self.latest_branch)
            .ok_or_else(|| DocsError::RefNotFound(param.to_owned()))
    }

    /// Navigation menu of `ref_param` in `lang`.
    ///
    /// English pages fill in for pages missing from `lang`.
    pub async fn get_menu(&self, ref_param: &str, lang: &str) -> Result<Vec<MenuNode>, DocsError> {
        let resolved = self.resolve_ref(ref_param).await?;
        let name = resolved.name();

        let (english, localized) = if lang == FALLBACK_LANG {
            (self.store.find_many(name, FALLBACK_LANG).await?, Vec::new())
        } else {
            futures::try_join!(
                self.store.find_many(name, FALLBACK_LANG),
                self.store.find_many(name, lang)
            )?
        };
        debug!(
            ref_ = %resolved,
            lang,
            english = english.len(),
            localized = localized.len(),
            "Building menu"
        );

        Ok(build_menu(merge_docs(english, localized)))
    }

    /// Page at `slug` of `ref_param` in `lang`, falling back to English.
    pub async fn get_doc(&self, ref_param: &str, slug: &str, lang: &str) -> Result<Doc, DocsError> {
        let resolved = self.resolve_ref(ref_param).await?;
        let name = resolved.name();
        let candidates = candidate_paths(slug);

        if let Some(doc) = self.store.find_first(name, lang, &candidates).await? {
            return Ok(doc);
        }
        if lang != FALLBACK_LANG
            && let Some(doc) = self
                .store
                .find_first(name, FALLBACK_LANG, &candidates)
                .await?
        {
            debug!(ref_ = %resolved, lang, slug, "Serving English fallback");
            return Ok(doc);
        }

        Err(DocsError::DocNotFound {
            ref_: name.to_owned(),
            lang: lang.to_owned(),
            slug: slug.to_owned(),
        })
    }
}

/// File paths that may hold the page at `slug`, in lookup order.
///
/// The index file comes first, matching the page the menu keeps when
/// `a.md` and `a/index.md` share a slug.
#[must_use]
pub fn candidate_paths(slug: &str) -> Vec<String> {
    let slug = slug.trim_matches('/');
    if slug.is_empty() {
        return vec!["index.md".to_owned()];
    }
    vec![format!("{slug}/index.md"), format!("{slug}.md")]
}
