//! Filesystem content store.
//!
//! Provides [`FsDocStore`] reading pages from `<root>/<ref>/<lang>/**/*.md`.

use std::fs;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::doc::Doc;
use crate::front_matter::{first_heading, split_front_matter, title_from_stem};
use crate::store::{DocStore, StoreError, StoreErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Filesystem content store.
///
/// Each ref is a directory under the root with one subdirectory per
/// language. Files and directories starting with `.` or `_` are skipped.
///
/// # Example
///
/// ```ignore
/// use refdocs_docs::{DocStore, FsDocStore};
///
/// // content/main/en/guides/routing.md
/// let store = FsDocStore::new("content");
/// let docs = store.find_many("main", "en").await?;
/// ```
#[derive(Clone, Debug)]
pub struct FsDocStore {
    root: PathBuf,
}

impl FsDocStore {
    /// Create a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the pages of `ref_` in `lang`.
    fn lang_dir(&self, ref_: &str, lang: &str) -> Result<PathBuf, StoreError> {
        validate_path(ref_)?;
        validate_path(lang)?;
        Ok(self.root.join(ref_).join(lang))
    }

    fn scan(lang_dir: &Path, ref_: &str, lang: &str) -> Result<Vec<Doc>, StoreError> {
        if !lang_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut file_paths = Vec::new();
        scan_directory(lang_dir, "", &mut file_paths)?;

        file_paths
            .iter()
            .map(|file_path| load_doc(lang_dir, file_path, ref_, lang))
            .collect()
    }

    fn first(
        lang_dir: &Path,
        ref_: &str,
        lang: &str,
        file_paths: &[String],
    ) -> Result<Option<Doc>, StoreError> {
        for file_path in file_paths {
            validate_path(file_path)?;
            if lang_dir.join(file_path).is_file() {
                return load_doc(lang_dir, file_path, ref_, lang).map(Some);
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl DocStore for FsDocStore {
    async fn find_many(&self, ref_: &str, lang: &str) -> Result<Vec<Doc>, StoreError> {
        let lang_dir = self.lang_dir(ref_, lang)?;
        let (ref_, lang) = (ref_.to_owned(), lang.to_owned());

        tokio::task::spawn_blocking(move || Self::scan(&lang_dir, &ref_, &lang))
            .await
            .map_err(join_error)?
    }

    async fn find_first(
        &self,
        ref_: &str,
        lang: &str,
        file_paths: &[String],
    ) -> Result<Option<Doc>, StoreError> {
        let lang_dir = self.lang_dir(ref_, lang)?;
        let (ref_, lang) = (ref_.to_owned(), lang.to_owned());
        let file_paths = file_paths.to_vec();

        tokio::task::spawn_blocking(move || Self::first(&lang_dir, &ref_, &lang, &file_paths))
            .await
            .map_err(join_error)?
    }
}

/// Reject empty, absolute and `..` paths.
fn validate_path(path: &str) -> Result<(), StoreError> {
    let invalid = path.is_empty()
        || Path::new(path)
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));

    if invalid {
        return Err(StoreError::new(StoreErrorKind::InvalidPath)
            .with_path(path)
            .with_backend(BACKEND));
    }
    Ok(())
}

/// Collect markdown files below `dir` as `/`-separated relative paths.
fn scan_directory(dir: &Path, prefix: &str, out: &mut Vec<String>) -> Result<(), StoreError> {
    let entries =
        fs::read_dir(dir).map_err(|e| StoreError::io(e, dir).with_backend(BACKEND))?;

    let mut entries: Vec<_> = entries
        .filter_map(Result::ok)
        .map(|e| {
            let is_dir = e.file_type().is_ok_and(|t| t.is_dir());
            let name = e.file_name().to_string_lossy().into_owned();
            (e, is_dir, name)
        })
        .collect();
    entries.sort_by(|(_, _, a), (_, _, b)| a.cmp(b));

    for (entry, is_dir, name) in entries {
        if name.starts_with('.') || name.starts_with('_') {
            continue;
        }

        let rel_path = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}/{name}")
        };

        if is_dir {
            scan_directory(&entry.path(), &rel_path, out)?;
        } else if Path::new(&rel_path).extension().is_some_and(|e| e == "md") {
            out.push(rel_path);
        }
    }
    Ok(())
}

fn load_doc(lang_dir: &Path, file_path: &str, ref_: &str, lang: &str) -> Result<Doc, StoreError> {
    let full_path = lang_dir.join(file_path);
    let raw = fs::read_to_string(&full_path)
        .map_err(|e| StoreError::io(e, &full_path).with_backend(BACKEND))?;

    let (front_matter, body) = split_front_matter(&raw).map_err(|e| {
        StoreError::new(StoreErrorKind::InvalidData)
            .with_path(&full_path)
            .with_backend(BACKEND)
            .with_source(e)
    })?;

    let title = front_matter
        .title
        .or_else(|| first_heading(body))
        .unwrap_or_else(|| title_from_stem(stem_for(file_path)));

    Ok(Doc {
        file_path: file_path.to_owned(),
        lang: lang.to_owned(),
        ref_: ref_.to_owned(),
        title,
        order: front_matter.order,
        hidden: front_matter.hidden,
        has_content: !body.trim().is_empty(),
        disabled: front_matter.disabled,
        content: body.to_owned(),
    })
}

/// File stem, or the directory name for `<dir>/index.md`.
fn stem_for(file_path: &str) -> &str {
    let without_ext = file_path.strip_suffix(".md").unwrap_or(file_path);
    let without_index = without_ext.strip_suffix("/index").unwrap_or(without_ext);
    without_index
        .rsplit_once('/')
        .map_or(without_index, |(_, stem)| stem)
}

fn join_error(err: tokio::task::JoinError) -> StoreError {
    StoreError::new(StoreErrorKind::Other)
        .with_backend(BACKEND)
        .with_source(err)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "main/en/index.md", "# Welcome\n\nHello.");
        write(
            root,
            "main/en/guides/routing.md",
            "---\ntitle: Routing Guide\norder: 2\n---\n# Routing\n",
        );
        write(root, "main/en/guides/index.md", "---\nhidden: true\n---\n");
        write(root, "main/en/getting-started.md", "Plain text, no heading.");
        write(root, "main/en/_drafts/wip.md", "# WIP");
        write(root, "main/en/.hidden.md", "# Hidden file");
        write(root, "main/en/notes.txt", "not markdown");
        write(root, "main/fr/index.md", "# Bienvenue");
        dir
    }

    #[tokio::test]
    async fn test_find_many_scans_markdown_tree() {
        let dir = fixture();
        let store = FsDocStore::new(dir.path());

        let docs = store.find_many("main", "en").await.unwrap();

        let paths: Vec<&str> = docs.iter().map(|d| d.file_path.as_str()).collect();
        assert_eq!(
            paths,
            [
                "getting-started.md",
                "guides/index.md",
                "guides/routing.md",
                "index.md"
            ]
        );
    }

    #[tokio::test]
    async fn test_titles_and_front_matter() {
        let dir = fixture();
        let store = FsDocStore::new(dir.path());

        let docs = store.find_many("main", "en").await.unwrap();
        let by_path = |p: &str| docs.iter().find(|d| d.file_path == p).unwrap();

        let routing = by_path("guides/routing.md");
        assert_eq!(routing.title, "Routing Guide");
        assert_eq!(routing.order, Some(2));
        assert_eq!(routing.ref_, "main");
        assert_eq!(routing.lang, "en");

        let guides = by_path("guides/index.md");
        assert_eq!(guides.title, "Guides");
        assert!(guides.hidden);
        assert!(!guides.has_content);

        assert_eq!(by_path("index.md").title, "Welcome");
        assert_eq!(by_path("getting-started.md").title, "Getting Started");
    }

    #[tokio::test]
    async fn test_missing_ref_or_lang_is_empty() {
        let dir = fixture();
        let store = FsDocStore::new(dir.path());

        assert!(store.find_many("main", "de").await.unwrap().is_empty());
        assert!(store.find_many("1.0.0", "en").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_first_tries_candidates_in_order() {
        let dir = fixture();
        let store = FsDocStore::new(dir.path());
        let candidates = vec!["guides.md".to_owned(), "guides/index.md".to_owned()];

        let doc = store
            .find_first("main", "en", &candidates)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(doc.file_path, "guides/index.md");
        assert_eq!(
            store
                .find_first("main", "fr", &candidates)
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_path_traversal_is_rejected() {
        let dir = fixture();
        let store = FsDocStore::new(dir.path().join("main"));
        let candidates = vec!["../../etc/passwd.md".to_owned()];

        let err = store.find_first("en", "en", &candidates).await.unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::InvalidPath);

        let err = store.find_many("..", "en").await.unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::InvalidPath);
    }

    #[tokio::test]
    async fn test_broken_front_matter_is_invalid_data() {
        let dir = fixture();
        write(dir.path(), "dev/en/broken.md", "---\norder: [\n---\n");
        let store = FsDocStore::new(dir.path());

        let err = store.find_many("dev", "en").await.unwrap_err();

        assert_eq!(err.kind, StoreErrorKind::InvalidData);
    }

    #[test]
    fn test_stem_for() {
        assert_eq!(stem_for("guides/routing.md"), "routing");
        assert_eq!(stem_for("guides/index.md"), "guides");
        assert_eq!(stem_for("index.md"), "index");
    }
}
