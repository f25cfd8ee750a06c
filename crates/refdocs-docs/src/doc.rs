//! Documentation page record.

use serde::{Deserialize, Serialize};

/// A documentation page of one ref and language.
///
/// `file_path` is relative to the language root and uses `/` separators
/// (e.g. `guides/routing.md`, `api/index.md`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doc {
    /// Path of the markdown file relative to the language root.
    pub file_path: String,
    /// Language code of this copy of the page.
    pub lang: String,
    /// Ref the page was published under.
    #[serde(rename = "ref")]
    pub ref_: String,
    /// Page title (front matter > first H1 > file stem).
    pub title: String,
    /// Explicit position among siblings, if set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    /// Hidden pages are served but left out of menus.
    #[serde(default)]
    pub hidden: bool,
    /// False for placeholder pages without a body.
    pub has_content: bool,
    /// Disabled pages appear in menus but are not linked.
    #[serde(default)]
    pub disabled: bool,
    /// Raw markdown body, front matter removed.
    #[serde(default)]
    pub content: String,
}

impl Doc {
    /// Create an empty page.
    #[must_use]
    pub fn new(
        ref_: impl Into<String>,
        lang: impl Into<String>,
        file_path: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            lang: lang.into(),
            ref_: ref_.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set the markdown body; `has_content` follows whether it is blank.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self.has_content = !self.content.trim().is_empty();
        self
    }

    /// Set the sibling position.
    #[must_use]
    pub fn with_order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }

    /// Mark the page hidden.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Mark the page disabled.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}
