//! Tagged ref model over the known tags and branches.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::range::{VersionRange, latest_tag, max_satisfying};

/// A resolved documentation ref.
///
/// URLs carry refs as plain strings; once a string has been matched against
/// the known tags and branches it is carried as one of these variants so
/// that callers can branch on what kind of ref they hold.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum Ref {
    /// An immutable release (e.g. `2.1.0`, legacy `v0.17.0`).
    Tag(String),
    /// A movable branch (e.g. `main`, `dev`).
    Branch(String),
}

impl Ref {
    /// The ref name as it appears in URLs and in the content store.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Tag(name) | Self::Branch(name) => name,
        }
    }

    /// Returns `true` for release tags.
    #[must_use]
    pub fn is_tag(&self) -> bool {
        matches!(self, Self::Tag(_))
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The known refs of the upstream repository.
///
/// `tags` keep the order the hosting API returned them in (most recent
/// first); that order is never used for version precedence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSet {
    /// Normalized release tags.
    pub tags: Vec<String>,
    /// Branch names.
    pub branches: Vec<String>,
}

impl VersionSet {
    /// Create a version set from tag and branch lists.
    #[must_use]
    pub fn new(tags: Vec<String>, branches: Vec<String>) -> Self {
        Self { tags, branches }
    }

    /// Exact-match lookup of a ref name.
    ///
    /// A name that is both a branch and a tag resolves as a branch.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Ref> {
        lookup(&self.tags, &self.branches, name)
    }

    /// Resolve `name` exactly, or as a range over the tags.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<Ref> {
        resolve(&self.tags, &self.branches, name)
    }

    /// The highest non-prerelease tag.
    #[must_use]
    pub fn latest(&self) -> Option<Ref> {
        latest_tag(&self.tags).map(|tag| Ref::Tag(tag.to_owned()))
    }
}

pub(crate) fn lookup(tags: &[String], branches: &[String], name: &str) -> Option<Ref> {
    if branches.iter().any(|b| b == name) {
        Some(Ref::Branch(name.to_owned()))
    } else if tags.iter().any(|t| t == name) {
        Some(Ref::Tag(name.to_owned()))
    } else {
        None
    }
}

pub(crate) fn resolve(tags: &[String], branches: &[String], name: &str) -> Option<Ref> {
    lookup(tags, branches, name).or_else(|| satisfying(tags, name))
}

/// Highest tag satisfying `range`, or `None` when `range` is not a range.
pub(crate) fn satisfying(tags: &[String], range: &str) -> Option<Ref> {
    let range: VersionRange = range.parse().ok()?;
    max_satisfying(tags, &range).map(|tag| Ref::Tag(tag.to_owned()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn versions() -> VersionSet {
        VersionSet::new(
            vec!["2.1.0".to_owned(), "2.0.0".to_owned(), "v0.17.0".to_owned()],
            vec!["main".to_owned(), "dev".to_owned()],
        )
    }

    #[test]
    fn test_lookup_exact_tag_and_branch() {
        let versions = versions();

        assert_eq!(versions.lookup("2.0.0"), Some(Ref::Tag("2.0.0".to_owned())));
        assert_eq!(versions.lookup("dev"), Some(Ref::Branch("dev".to_owned())));
        assert_eq!(versions.lookup("2"), None);
    }

    #[test]
    fn test_lookup_prefers_branch_on_name_clash() {
        let versions = VersionSet::new(vec!["next".to_owned()], vec!["next".to_owned()]);

        assert_eq!(versions.lookup("next"), Some(Ref::Branch("next".to_owned())));
    }

    #[test]
    fn test_resolve_falls_back_to_range() {
        let versions = versions();

        assert_eq!(versions.resolve("2"), Some(Ref::Tag("2.1.0".to_owned())));
        assert_eq!(versions.resolve("0.x"), Some(Ref::Tag("v0.17.0".to_owned())));
        assert_eq!(versions.resolve("guide"), None);
    }

    #[test]
    fn test_latest() {
        assert_eq!(versions().latest(), Some(Ref::Tag("2.1.0".to_owned())));
        assert_eq!(VersionSet::default().latest(), None);
    }

    #[test]
    fn test_ref_serializes_as_tagged_union() {
        let json = serde_json::to_value(Ref::Branch("main".to_owned())).unwrap();

        assert_eq!(json, serde_json::json!({"kind": "branch", "name": "main"}));
    }

    #[test]
    fn test_ref_display_is_name() {
        assert_eq!(Ref::Tag("1.0.0".to_owned()).to_string(), "1.0.0");
        assert!(Ref::Tag("1.0.0".to_owned()).is_tag());
        assert!(!Ref::Branch("main".to_owned()).is_tag());
    }
}
