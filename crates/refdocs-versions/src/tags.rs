//! Release filtering and tag normalization.
//!
//! Monorepo releases are tagged `<package>@<version>`; older releases use
//! `v<version>`. Only releases of the primary package (or legacy releases)
//! become documentation refs, and their tags are reduced to the version.

use crate::host::Release;

/// Normalized tag for release tags that carry no recognizable version.
pub const UNKNOWN_TAG: &str = "unknown";

/// Normalize a release into a documentation tag, or `None` if the release
/// belongs to another package.
///
/// A release is accepted when its title starts with `v<digit>`, its tag is
/// scoped to `primary_package` (`<primary_package>@...`), or its tag starts
/// with `v<digit>`.
#[must_use]
pub fn release_tag(release: &Release, primary_package: &str) -> Option<String> {
    let accepted = release.name.as_deref().is_some_and(has_version_prefix)
        || release.tag_name.split('@').next() == Some(primary_package)
        || has_version_prefix(&release.tag_name);

    accepted.then(|| normalize_tag_name(&release.tag_name))
}

/// Reduce a tag name to the version it names.
///
/// - `pkg@1.2.3` → `1.2.3` (text after the last `@`)
/// - `v1.2.3` → `v1.2.3`
/// - anything else → [`UNKNOWN_TAG`]
#[must_use]
pub fn normalize_tag_name(tag_name: &str) -> String {
    if let Some((_, version)) = tag_name.rsplit_once('@') {
        version.to_owned()
    } else if has_version_prefix(tag_name) {
        tag_name.to_owned()
    } else {
        UNKNOWN_TAG.to_owned()
    }
}

/// `v` followed by an ASCII digit.
fn has_version_prefix(s: &str) -> bool {
    s.strip_prefix('v')
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_digit())
}
