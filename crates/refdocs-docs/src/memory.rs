//! In-memory content store.
//!
//! Provides [`MemoryDocStore`] for tests and for embedders that load pages
//! from elsewhere.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::doc::Doc;
use crate::store::{DocStore, StoreError};

/// Pages keyed by `(ref, lang)`.
#[derive(Debug, Default)]
pub struct MemoryDocStore {
    docs: RwLock<HashMap<(String, String), Vec<Doc>>>,
}

impl MemoryDocStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page, keyed by its own `ref_` and `lang`.
    #[must_use]
    pub fn with_doc(self, doc: Doc) -> Self {
        self.insert(doc);
        self
    }

    /// Add or replace a page.
    pub fn insert(&self, doc: Doc) {
        let mut docs = self.docs.write().unwrap_or_else(PoisonError::into_inner);
        let bucket = docs
            .entry((doc.ref_.clone(), doc.lang.clone()))
            .or_default();
        bucket.retain(|d| d.file_path != doc.file_path);
        bucket.push(doc);
    }
}

#[async_trait]
impl DocStore for MemoryDocStore {
    async fn find_many(&self, ref_: &str, lang: &str) -> Result<Vec<Doc>, StoreError> {
        let docs = self.docs.read().unwrap_or_else(PoisonError::into_inner);
        Ok(docs
            .get(&(ref_.to_owned(), lang.to_owned()))
            .cloned()
            .unwrap_or_default())
    }

    async fn find_first(
        &self,
        ref_: &str,
        lang: &str,
        file_paths: &[String],
    ) -> Result<Option<Doc>, StoreError> {
        let docs = self.docs.read().unwrap_or_else(PoisonError::into_inner);
        let Some(bucket) = docs.get(&(ref_.to_owned(), lang.to_owned())) else {
            return Ok(None);
        };
        Ok(file_paths
            .iter()
            .find_map(|path| bucket.iter().find(|d| &d.file_path == path))
            .cloned())
    }
}
