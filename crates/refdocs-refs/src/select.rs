//! Ref selection for content lookups.

use crate::version::{Ref, VersionSet};

/// URL keyword that always selects the configured latest branch.
pub const LATEST_KEYWORD: &str = "latest";

/// Map a version-or-branch URL parameter to a concrete ref.
///
/// Resolution order:
///
/// 1. empty parameter or [`LATEST_KEYWORD`] → `latest_branch`
/// 2. exact branch name, then exact tag name
/// 3. highest non-prerelease tag satisfying the parameter as a range
///
/// Returns `None` when nothing matches; callers report that as not found.
///
/// # Examples
///
/// ```
/// use refdocs_refs::{Ref, VersionSet, select_ref};
///
/// let versions = VersionSet::new(vec!["1.2.0".into(), "1.3.1".into()], vec!["main".into()]);
///
/// assert_eq!(select_ref("1", &versions, "main"), Some(Ref::Tag("1.3.1".into())));
/// assert_eq!(select_ref("latest", &versions, "main"), Some(Ref::Branch("main".into())));
/// assert_eq!(select_ref("nope", &versions, "main"), None);
/// ```
#[must_use]
pub fn select_ref(param: &str, versions: &VersionSet, latest_branch: &str) -> Option<Ref> {
    if param.is_empty() || param == LATEST_KEYWORD {
        return Some(Ref::Branch(latest_branch.to_owned()));
    }
    versions.resolve(param)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn versions() -> VersionSet {
        VersionSet::new(
            vec!["2.0.0".to_owned(), "2.0.1-pre.0".to_owned(), "1.4.0".to_owned()],
            vec!["main".to_owned(), "dev".to_owned()],
        )
    }

    #[test]
    fn test_empty_and_keyword_select_latest_branch() {
        let versions = versions();

        assert_eq!(select_ref("", &versions, "main"), Some(Ref::Branch("main".to_owned())));
        assert_eq!(
            select_ref(LATEST_KEYWORD, &versions, "dev"),
            Some(Ref::Branch("dev".to_owned()))
        );
    }

    #[test]
    fn test_exact_branch_and_tag() {
        let versions = versions();

        assert_eq!(select_ref("dev", &versions, "main"), Some(Ref::Branch("dev".to_owned())));
        assert_eq!(
            select_ref("2.0.1-pre.0", &versions, "main"),
            Some(Ref::Tag("2.0.1-pre.0".to_owned()))
        );
    }

    #[test]
    fn test_range_excludes_prerelease() {
        assert_eq!(
            select_ref("^2", &versions(), "main"),
            Some(Ref::Tag("2.0.0".to_owned()))
        );
    }

    #[test]
    fn test_unresolvable_is_none() {
        assert_eq!(select_ref("9.x", &versions(), "main"), None);
        assert_eq!(select_ref("feature", &versions(), "main"), None);
    }
}
