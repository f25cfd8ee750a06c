//! Documentation content for refdocs.
//!
//! - [`Doc`] page records and the [`DocStore`] trait, with
//!   [`MemoryDocStore`] and [`FsDocStore`] implementations
//! - [`build_menu`] turning a flat page listing into a [`MenuNode`] forest
//! - [`Docs`] resolving a ref and serving menus and pages, with English
//!   fallback for localized content

mod doc;
mod error;
mod front_matter;
mod fs;
mod memory;
mod menu;
mod service;
mod store;

pub use doc::Doc;
pub use error::DocsError;
pub use fs::FsDocStore;
pub use memory::MemoryDocStore;
pub use menu::{MenuNode, build_menu, merge_docs, slug_for};
pub use service::{Docs, FALLBACK_LANG, candidate_paths};
pub use store::{DocStore, StoreError, StoreErrorKind};
