//! Canonicalization of `/docs/:lang/:ref?/*` URL parameters.

use serde::Deserialize;

use crate::language::is_language_code;
use crate::range::latest_tag;
use crate::version::{lookup, resolve, satisfying};

/// Parameters extracted from a `/docs/:lang/:ref?/*` request path.
///
/// `lang` is always present but is not necessarily a language code: users
/// type versions (`/docs/2.1`) and content paths (`/docs/guides`) into that
/// slot too.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ParamTriple {
    /// First path segment, a candidate language code.
    pub lang: String,
    /// Second path segment, a candidate ref.
    #[serde(rename = "ref")]
    pub ref_: Option<String>,
    /// Remaining path, a content slug.
    pub rest: Option<String>,
}

impl ParamTriple {
    /// Create parameters with only a language segment.
    #[must_use]
    pub fn new(lang: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            ref_: None,
            rest: None,
        }
    }

    /// Set the ref segment.
    #[must_use]
    pub fn with_ref(mut self, ref_: impl Into<String>) -> Self {
        self.ref_ = Some(ref_.into());
        self
    }

    /// Set the remaining path.
    #[must_use]
    pub fn with_rest(mut self, rest: impl Into<String>) -> Self {
        self.rest = Some(rest.into());
        self
    }

    /// Split a path (relative to `/docs/`) into parameters.
    ///
    /// Returns `None` for an empty path.
    ///
    /// # Examples
    ///
    /// ```
    /// use refdocs_refs::ParamTriple;
    ///
    /// let params = ParamTriple::from_path("/en/main/guides/routing/").unwrap();
    /// assert_eq!(params.lang, "en");
    /// assert_eq!(params.ref_.as_deref(), Some("main"));
    /// assert_eq!(params.rest.as_deref(), Some("guides/routing"));
    /// ```
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let lang = segments.next()?;
        let ref_ = segments.next().map(str::to_owned);
        let rest: Vec<&str> = segments.collect();
        Some(Self {
            lang: lang.to_owned(),
            ref_,
            rest: (!rest.is_empty()).then(|| rest.join("/")),
        })
    }
}

/// Canonicalize docs URL parameters against the known tags and branches.
///
/// Returns `None` when `params` already name a language and an exact ref,
/// or `Some("<lang>/<ref>[/<rest>]")` with the path the caller should
/// redirect to (relative to `/docs/`).
///
/// Resolution rules:
///
/// - `/<lang>` redirects to the latest release.
/// - `/<lang>/<range>` redirects to the highest release satisfying the
///   range; if nothing satisfies it, the segment is kept as a content path
///   under the latest release.
/// - `/<ref-or-range>/...` (no language) is moved under `default_lang`.
/// - `/<anything-else>/...` becomes a content path under `default_lang` and
///   the latest release.
///
/// "Latest release" is the highest non-prerelease tag. When no such tag
/// exists, rules that need it produce no redirect.
#[must_use]
pub fn validate_params(
    tags: &[String],
    branches: &[String],
    params: &ParamTriple,
    default_lang: &str,
) -> Option<String> {
    let first = params.lang.as_str();
    let second = params.ref_.as_deref().filter(|s| !s.is_empty());
    let splat: Vec<&str> = params
        .rest
        .as_deref()
        .map(|rest| rest.split('/').filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();
    let latest = latest_tag(tags);

    if is_language_code(first) {
        let Some(second) = second else {
            return latest.map(|latest| join([first, latest]));
        };

        if lookup(tags, branches, second).is_some() {
            return None;
        }

        if let Some(expanded) = satisfying(tags, second) {
            return Some(join([first, expanded.name()].into_iter().chain(splat)));
        }

        // Not a version after all: keep it as the first content segment.
        let latest = latest?;
        return Some(join([first, latest, second].into_iter().chain(splat)));
    }

    if let Some(resolved) = resolve(tags, branches, first) {
        return Some(join(
            [default_lang, resolved.name()]
                .into_iter()
                .chain(second)
                .chain(splat),
        ));
    }

    let latest = latest?;
    Some(join(
        [default_lang, latest, first]
            .into_iter()
            .chain(second)
            .chain(splat),
    ))
}

fn join<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    segments.into_iter().collect::<Vec<_>>().join("/")
}
