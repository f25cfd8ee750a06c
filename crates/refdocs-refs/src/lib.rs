//! Documentation ref model and URL parameter resolution.
//!
//! This crate is the pure core of refdocs. It never performs I/O: every
//! function operates on tag and branch lists fetched elsewhere (see
//! `refdocs-versions`), which keeps the resolution rules testable from
//! literal inputs.
//!
//! - [`Ref`] / [`VersionSet`]: tagged ref model over the known tags and branches
//! - [`VersionRange`]: npm-style semver range expressions
//! - [`validate_params`]: canonicalizes `/docs/:lang/:ref?/*` URL parameters
//! - [`select_ref`]: maps a version-or-branch parameter to a concrete ref
//! - [`is_language_code`]: ISO 639-1 detection
//!
//! # Example
//!
//! ```
//! use refdocs_refs::{ParamTriple, validate_params};
//!
//! let tags = vec!["1.0.0".to_owned(), "2.1.0".to_owned()];
//! let branches = vec!["main".to_owned()];
//!
//! // No ref given: redirect to the latest release.
//! let target = validate_params(&tags, &branches, &ParamTriple::new("en"), "en");
//! assert_eq!(target.as_deref(), Some("en/2.1.0"));
//!
//! // Already canonical.
//! let params = ParamTriple::new("en").with_ref("main");
//! assert_eq!(validate_params(&tags, &branches, &params, "en"), None);
//! ```

mod language;
mod params;
mod range;
mod select;
mod version;

pub use language::{is_language_code, language_name};
pub use params::{ParamTriple, validate_params};
pub use range::{RangeError, VersionRange, latest_tag, max_satisfying, parse_version};
pub use select::{LATEST_KEYWORD, select_ref};
pub use version::{Ref, VersionSet};
