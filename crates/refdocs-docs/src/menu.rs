//! Navigation menu construction.
//!
//! The menu of a ref+language is rebuilt on every request from the flat page
//! listing. Pages are keyed by slug, sorted so that every parent precedes its
//! children, and linked with parent-index arrays before being assembled into
//! a [`MenuNode`] forest.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::warn;

use crate::doc::Doc;

/// Navigation tree node.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuNode {
    /// Display title.
    pub title: String,
    /// Page slug (file path without `.md` and trailing `/index`).
    pub slug: String,
    /// False for placeholder pages.
    pub has_content: bool,
    /// Shown but not linked.
    pub disabled: bool,
    /// Explicit position among siblings, if set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    /// Child nodes, each with a slug under this node's slug.
    pub children: Vec<MenuNode>,
}

/// Slug of a page file path: `guides/index.md` → `guides`,
/// `guides/routing.md` → `guides/routing`.
///
/// Only a trailing `/index` is removed, so the top-level `index.md` keeps
/// the slug `index`.
#[must_use]
pub fn slug_for(file_path: &str) -> &str {
    let without_ext = file_path.strip_suffix(".md").unwrap_or(file_path);
    without_ext.strip_suffix("/index").unwrap_or(without_ext)
}

/// Merge localized pages over English ones by file path.
///
/// The English listing defines which pages exist: each English page is
/// replaced by the localized page with the same file path, if any.
/// Localized pages without an English counterpart are left out.
#[must_use]
pub fn merge_docs(english: Vec<Doc>, localized: Vec<Doc>) -> Vec<Doc> {
    let mut localized: HashMap<String, Doc> = localized
        .into_iter()
        .map(|doc| (doc.file_path.clone(), doc))
        .collect();
    english
        .into_iter()
        .map(|doc| localized.remove(&doc.file_path).unwrap_or(doc))
        .collect()
}

/// Build the menu forest from a flat page listing.
///
/// Hidden pages are dropped. When `a.md` and `a/index.md` both exist they
/// share the slug `a`; the index page is kept. A page whose parent slug has
/// no page becomes a root.
#[must_use]
pub fn build_menu(docs: Vec<Doc>) -> Vec<MenuNode> {
    let mut by_slug: BTreeMap<String, Doc> = BTreeMap::new();
    for doc in docs.into_iter().filter(|doc| !doc.hidden) {
        let slug = slug_for(&doc.file_path).to_owned();
        match by_slug.get(&slug) {
            Some(existing) if is_index(&existing.file_path) || !is_index(&doc.file_path) => {
                warn!(
                    slug = %slug,
                    kept = %existing.file_path,
                    dropped = %doc.file_path,
                    "Duplicate menu slug"
                );
            }
            Some(existing) => {
                warn!(
                    slug = %slug,
                    kept = %doc.file_path,
                    dropped = %existing.file_path,
                    "Duplicate menu slug"
                );
                by_slug.insert(slug, doc);
            }
            None => {
                by_slug.insert(slug, doc);
            }
        }
    }

    let mut builder = MenuBuilder::default();
    for (slug, doc) in by_slug {
        builder.add_node(MenuNode {
            title: doc.title,
            slug,
            has_content: doc.has_content,
            disabled: doc.disabled,
            order: doc.order,
            children: Vec::new(),
        });
    }
    builder.build()
}

fn is_index(file_path: &str) -> bool {
    file_path == "index.md" || file_path.ends_with("/index.md")
}

/// Flat node list with parent/children relationships stored as indices.
///
/// Nodes must be added parents first.
#[derive(Default)]
struct MenuBuilder {
    nodes: Vec<MenuNode>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
    index: HashMap<String, usize>,
}

impl MenuBuilder {
    fn add_node(&mut self, node: MenuNode) -> usize {
        let idx = self.nodes.len();

        let parent_idx = node
            .slug
            .rsplit_once('/')
            .and_then(|(parent, _)| self.index.get(parent).copied());
        match parent_idx {
            Some(parent) => self.children[parent].push(idx),
            None => self.roots.push(idx),
        }

        self.index.insert(node.slug.clone(), idx);
        self.nodes.push(node);
        self.children.push(Vec::new());
        idx
    }

    /// Assemble the forest. Children always have higher indices than their
    /// parent, so a reverse pass sees every subtree complete.
    fn build(self) -> Vec<MenuNode> {
        let mut built: Vec<Option<MenuNode>> = Vec::with_capacity(self.nodes.len());
        built.resize_with(self.nodes.len(), || None);

        for (idx, mut node) in self.nodes.into_iter().enumerate().rev() {
            node.children = self.children[idx]
                .iter()
                .filter_map(|&child| built[child].take())
                .collect();
            built[idx] = Some(node);
        }

        self.roots
            .iter()
            .filter_map(|&root| built[root].take())
            .collect()
    }
}
