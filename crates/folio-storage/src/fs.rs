//! Filesystem storage backend.
//!
//! Walks the content root with the `ignore` crate so `.gitignore` rules and
//! hidden files are handled the same way as in the editor tooling around the
//! content repository.

use std::path::{Path, PathBuf};

use glob::Pattern;
use ignore::WalkBuilder;

use crate::storage::{
    DEFAULT_META_FILENAME, SourceFile, SourceKind, Storage, StorageError, StorageErrorKind,
    validate_relative_path,
};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Filesystem storage rooted at a content directory.
#[derive(Debug)]
pub struct FsStorage {
    source_dir: PathBuf,
    meta_filename: String,
    excludes: Vec<Pattern>,
}

impl FsStorage {
    /// Create a new filesystem storage using `_meta.yaml` navigation maps.
    #[must_use]
    pub fn new(source_dir: PathBuf) -> Self {
        Self::with_meta_filename(source_dir, DEFAULT_META_FILENAME)
    }

    /// Create a new filesystem storage with a custom metadata filename.
    #[must_use]
    pub fn with_meta_filename(source_dir: PathBuf, meta_filename: &str) -> Self {
        Self {
            source_dir,
            meta_filename: meta_filename.to_owned(),
            excludes: Vec::new(),
        }
    }

    /// Exclude files matching any of the glob patterns (relative to the root).
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::InvalidPath`] for a malformed pattern.
    pub fn with_excludes(mut self, patterns: &[String]) -> Result<Self, StorageError> {
        self.excludes = patterns
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|e| {
                    StorageError::new(StorageErrorKind::InvalidPath)
                        .with_path(p)
                        .with_backend(BACKEND)
                        .with_source(e)
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(self)
    }

    /// Root directory this storage reads from.
    #[must_use]
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    fn is_excluded(&self, relative: &str) -> bool {
        self.excludes.iter().any(|p| p.matches(relative))
    }

    fn resolve(&self, path: &Path) -> Result<PathBuf, StorageError> {
        validate_relative_path(path).map_err(|e| e.with_backend(BACKEND))?;
        Ok(self.source_dir.join(path))
    }
}

/// Files and directories starting with `_` are private (partials, drafts
/// folders), except the navigation map itself.
fn is_private(name: &str, meta_filename: &str) -> bool {
    name.starts_with('_') && name != meta_filename
}

impl Storage for FsStorage {
    fn scan(&self) -> Result<Vec<SourceFile>, StorageError> {
        if !self.source_dir.is_dir() {
            return Err(StorageError::not_found(&self.source_dir).with_backend(BACKEND));
        }

        let meta_filename = self.meta_filename.clone();
        let walker = WalkBuilder::new(&self.source_dir)
            .hidden(true)
            .require_git(false)
            .filter_entry(move |entry| {
                entry.depth() == 0
                    || !is_private(&entry.file_name().to_string_lossy(), &meta_filename)
            })
            .build();

        let mut files = Vec::new();
        for result in walker {
            let entry = result.map_err(|e| {
                StorageError::new(StorageErrorKind::Other)
                    .with_backend(BACKEND)
                    .with_source(e)
            })?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            let Some(kind) = SourceKind::classify(&name, &self.meta_filename) else {
                continue;
            };

            let Ok(relative) = entry.path().strip_prefix(&self.source_dir) else {
                continue;
            };
            let relative_str = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if self.is_excluded(&relative_str) {
                tracing::debug!(path = %relative_str, "Excluded by pattern");
                continue;
            }

            files.push(SourceFile::new(relative_str, kind));
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        tracing::debug!(count = files.len(), root = %self.source_dir.display(), "Scanned sources");
        Ok(files)
    }

    fn read(&self, path: &Path) -> Result<String, StorageError> {
        let full = self.resolve(path)?;
        std::fs::read_to_string(&full)
            .map_err(|e| StorageError::io(e, Some(path.to_path_buf())).with_backend(BACKEND))
    }

    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).is_ok_and(|full| full.is_file())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn paths(files: &[SourceFile]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.path.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_fs_storage_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FsStorage>();
    }

    #[test]
    fn test_scan_missing_dir() {
        let storage = FsStorage::new(PathBuf::from("/nonexistent/folio/pages"));
        let err = storage.scan().unwrap_err();
        assert_eq!(err.kind, StorageErrorKind::NotFound);
    }

    #[test]
    fn test_scan_classifies_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "index.mdx", "# Home");
        write(dir.path(), "_meta.yaml", "index: Home");
        write(dir.path(), "blog/kafka.md", "# Kafka");
        write(dir.path(), "blog/_meta.yaml", "kafka: Kafka");
        write(dir.path(), "blog/diagram.png", "binary");

        let storage = FsStorage::new(dir.path().to_path_buf());
        let files = storage.scan().unwrap();

        assert_eq!(
            paths(&files),
            vec!["_meta.yaml", "blog/_meta.yaml", "blog/kafka.md", "index.mdx"]
        );
        assert_eq!(files[0].kind, SourceKind::Meta);
        assert_eq!(files[2].kind, SourceKind::Markdown);
        assert_eq!(files[3].kind, SourceKind::Mdx);
    }

    #[test]
    fn test_scan_skips_hidden_and_private() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "guide.md", "# Guide");
        write(dir.path(), ".drafts/secret.md", "# Secret");
        write(dir.path(), "_partials/snippet.md", "snippet");
        write(dir.path(), "_notes.md", "notes");

        let storage = FsStorage::new(dir.path().to_path_buf());
        assert_eq!(paths(&storage.scan().unwrap()), vec!["guide.md"]);
    }

    #[test]
    fn test_scan_honors_gitignore() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ".gitignore", "generated/\n");
        write(dir.path(), "guide.md", "# Guide");
        write(dir.path(), "generated/api.md", "# API");

        let storage = FsStorage::new(dir.path().to_path_buf());
        assert_eq!(paths(&storage.scan().unwrap()), vec!["guide.md"]);
    }

    #[test]
    fn test_scan_with_excludes() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "guide.md", "# Guide");
        write(dir.path(), "scratch/idea.md", "# Idea");

        let storage = FsStorage::new(dir.path().to_path_buf())
            .with_excludes(&["scratch/**".to_owned()])
            .unwrap();
        assert_eq!(paths(&storage.scan().unwrap()), vec!["guide.md"]);
    }

    #[test]
    fn test_with_excludes_rejects_bad_pattern() {
        let err = FsStorage::new(PathBuf::from("pages"))
            .with_excludes(&["[".to_owned()])
            .unwrap_err();
        assert_eq!(err.kind, StorageErrorKind::InvalidPath);
    }

    #[test]
    fn test_scan_custom_meta_filename() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "_meta.json", "{}");
        write(dir.path(), "_meta.yaml", "a: b");

        let storage = FsStorage::with_meta_filename(dir.path().to_path_buf(), "_meta.json");
        let files = storage.scan().unwrap();
        assert_eq!(paths(&files), vec!["_meta.json"]);
        assert_eq!(files[0].kind, SourceKind::Meta);
    }

    #[test]
    fn test_read_and_exists() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "docs/setup.md", "# Setup\n\nSteps.");

        let storage = FsStorage::new(dir.path().to_path_buf());
        assert_eq!(
            storage.read(Path::new("docs/setup.md")).unwrap(),
            "# Setup\n\nSteps."
        );
        assert!(storage.exists(Path::new("docs/setup.md")));
        assert!(!storage.exists(Path::new("docs/missing.md")));
        assert!(!storage.exists(Path::new("docs")));
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(dir.path().to_path_buf());
        let err = storage.read(Path::new("missing.md")).unwrap_err();
        assert_eq!(err.kind, StorageErrorKind::NotFound);
    }

    #[test]
    fn test_read_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(dir.path().join("pages"));
        let err = storage.read(Path::new("../folio.toml")).unwrap_err();
        assert_eq!(err.kind, StorageErrorKind::InvalidPath);
    }
}
