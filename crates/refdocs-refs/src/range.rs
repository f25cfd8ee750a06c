//! npm-style semver ranges over release tags.
//!
//! URLs carry ranges written the way JavaScript developers write them
//! (`2`, `2.x`, `^2.1`, `>=1.2 <2`, `1.0 - 1.4`, `1.x || 2.x`). The `semver`
//! crate speaks Cargo's dialect, where a bare `2.1` means `^2.1` and
//! comparators are comma separated. [`VersionRange`] translates the npm form
//! into one [`VersionReq`] per `||` alternative:
//!
//! - bare partial versions become exact-prefix requirements (`2.1` → `=2.1`)
//! - wildcard components are dropped (`2.x` → `=2`, `*` → any)
//! - whitespace-separated comparators become a conjunction
//! - `a - b` becomes `>=a, <=b`
//!
//! Prerelease versions never satisfy a range, even when they are
//! numerically greater than every release.

use std::fmt;
use std::str::FromStr;

use semver::{Version, VersionReq};

/// Error returned when a range expression cannot be parsed.
#[derive(Debug, thiserror::Error)]
#[error("invalid version range {input:?}")]
pub struct RangeError {
    input: String,
    #[source]
    source: Option<semver::Error>,
}

/// A parsed npm-style version range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionRange {
    alternatives: Vec<VersionReq>,
}

impl VersionRange {
    /// The universal range (`*`).
    #[must_use]
    pub fn any() -> Self {
        Self {
            alternatives: vec![VersionReq::STAR],
        }
    }

    /// Check whether a version satisfies this range.
    ///
    /// Prerelease versions are always rejected.
    #[must_use]
    pub fn matches(&self, version: &Version) -> bool {
        version.pre.is_empty() && self.alternatives.iter().any(|req| req.matches(version))
    }
}

impl FromStr for VersionRange {
    type Err = RangeError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let alternatives = input
            .split("||")
            .map(parse_alternative)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| RangeError {
                input: input.to_owned(),
                source,
            })?;
        Ok(Self { alternatives })
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, req) in self.alternatives.iter().enumerate() {
            if i > 0 {
                f.write_str(" || ")?;
            }
            write!(f, "{req}")?;
        }
        Ok(())
    }
}

/// Parse a tag name as a semver version.
///
/// Leading whitespace, `=` and `v` prefixes are tolerated (`v1.2.3` parses
/// as `1.2.3`). Partial versions and non-version names return `None`.
///
/// # Examples
///
/// ```
/// use refdocs_refs::parse_version;
///
/// assert_eq!(parse_version("v1.2.3").map(|v| v.to_string()).as_deref(), Some("1.2.3"));
/// assert!(parse_version("main").is_none());
/// assert!(parse_version("1.2").is_none());
/// ```
pub fn parse_version(tag: &str) -> Option<Version> {
    let trimmed = tag.trim();
    let trimmed = trimmed.strip_prefix('=').unwrap_or(trimmed);
    let trimmed = trimmed.strip_prefix(['v', 'V']).unwrap_or(trimmed);
    Version::parse(trimmed).ok()
}

/// Find the highest tag satisfying `range`.
///
/// Tags that do not parse as versions are ignored. Ordering follows semver
/// precedence, never the order of `tags`.
pub fn max_satisfying<'a>(tags: &'a [String], range: &VersionRange) -> Option<&'a str> {
    tags.iter()
        .filter_map(|tag| parse_version(tag).map(|version| (version, tag.as_str())))
        .filter(|(version, _)| range.matches(version))
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, tag)| tag)
}

/// Find the highest non-prerelease tag.
pub fn latest_tag(tags: &[String]) -> Option<&str> {
    max_satisfying(tags, &VersionRange::any())
}

/// Parse one `||`-separated alternative into a requirement.
///
/// Fails with `None` when a token is not a version at all.
fn parse_alternative(alternative: &str) -> Result<VersionReq, Option<semver::Error>> {
    let comparators = normalize_alternative(alternative).ok_or(None)?;
    if comparators.is_empty() {
        return Ok(VersionReq::STAR);
    }
    VersionReq::parse(&comparators.join(", ")).map_err(Some)
}

/// Rewrite an npm alternative into Cargo-style comparators.
///
/// Returns `None` if any version token is malformed.
fn normalize_alternative(alternative: &str) -> Option<Vec<String>> {
    if let Some((low, high)) = alternative.split_once(" - ") {
        let low = normalize_comparator(">=", low.trim())?;
        let high = normalize_comparator("<=", high.trim())?;
        return Some([low, high].into_iter().filter_map(Comparator::into_req).collect());
    }

    let mut comparators = Vec::new();
    let mut pending_op: Option<&str> = None;

    for token in alternative.split_whitespace() {
        // npm allows a space between operator and version: `>= 1.2`
        if OPERATORS.contains(&token) {
            pending_op = Some(token);
            continue;
        }
        let (op, version) = match pending_op.take() {
            Some(op) => (op, token),
            None => split_operator(token),
        };
        comparators.extend(normalize_comparator(op, version)?.into_req());
    }

    // A dangling operator is kept so that parsing fails.
    if let Some(op) = pending_op {
        comparators.push(op.to_owned());
    }

    Some(comparators)
}

/// Operators in match order (longest first).
const OPERATORS: &[&str] = &[">=", "<=", "~>", ">", "<", "=", "~", "^"];

fn split_operator(token: &str) -> (&str, &str) {
    OPERATORS
        .iter()
        .find_map(|op| token.strip_prefix(*op).map(|rest| (*op, rest)))
        .unwrap_or(("", token))
}

/// A normalized comparator.
enum Comparator {
    /// Matches every version.
    Any,
    /// Cargo-style requirement text.
    Req(String),
}

impl Comparator {
    fn into_req(self) -> Option<String> {
        match self {
            Self::Any => None,
            Self::Req(req) => Some(req),
        }
    }
}

fn is_wildcard(part: &str) -> bool {
    matches!(part, "x" | "X" | "*")
}

fn is_numeric(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())
}

/// Normalize a single comparator, or `None` if `version` is not a
/// (partial) version.
///
/// Components are numeric or exactly `x`/`X`/`*`; everything after the
/// first wildcard is ignored. A `-pre` or `+build` suffix needs all three
/// numeric components.
fn normalize_comparator(op: &str, version: &str) -> Option<Comparator> {
    let op = match op {
        "~>" => "~",
        "" => "=",
        other => other,
    };
    let version = version.strip_prefix(['v', 'V']).unwrap_or(version);

    let core_end = version.find(['-', '+']).unwrap_or(version.len());
    let (core, suffix) = version.split_at(core_end);
    let parts: Vec<&str> = core.split('.').collect();
    if parts.len() > 3 || !parts.iter().all(|p| is_numeric(p) || is_wildcard(p)) {
        return None;
    }

    let concrete: Vec<&str> = parts
        .iter()
        .take_while(|part| !is_wildcard(part))
        .copied()
        .collect();

    if !suffix.is_empty() && concrete.len() < 3 {
        return None;
    }
    if concrete.len() == parts.len() {
        return Some(Comparator::Req(format!("{op}{version}")));
    }
    if concrete.is_empty() {
        return Some(Comparator::Any);
    }
    Some(Comparator::Req(format!("{op}{}", concrete.join("."))))
}
