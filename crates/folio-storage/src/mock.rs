//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing without filesystem access.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::storage::{
    DEFAULT_META_FILENAME, SourceFile, SourceKind, Storage, StorageError, validate_relative_path,
};

/// Backend identifier for error messages.
const BACKEND: &str = "Mock";

/// Mock storage for testing.
///
/// Stores files in memory. Use the builder methods to configure the mock
/// with test data.
///
/// # Example
///
/// ```ignore
/// use std::path::Path;
/// use folio_storage::{MockStorage, Storage};
///
/// let storage = MockStorage::new()
///     .with_file("_meta.yaml", "guide: User Guide")
///     .with_file("guide.md", "# User Guide\n\nContent.");
///
/// let files = storage.scan().unwrap();
/// let content = storage.read(Path::new("guide.md")).unwrap();
/// ```
#[derive(Debug)]
pub struct MockStorage {
    files: BTreeMap<PathBuf, String>,
    meta_filename: String,
}

impl Default for MockStorage {
    fn default() -> Self {
        Self {
            files: BTreeMap::new(),
            meta_filename: DEFAULT_META_FILENAME.to_owned(),
        }
    }
}

impl MockStorage {
    /// Create a new empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different navigation map filename.
    #[must_use]
    pub fn with_meta_filename(mut self, meta_filename: &str) -> Self {
        meta_filename.clone_into(&mut self.meta_filename);
        self
    }

    /// Add a file with the given relative path and content.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }
}

impl Storage for MockStorage {
    fn scan(&self) -> Result<Vec<SourceFile>, StorageError> {
        Ok(self
            .files
            .keys()
            .filter_map(|path| {
                let name = path.file_name()?.to_string_lossy();
                let kind = SourceKind::classify(&name, &self.meta_filename)?;
                Some(SourceFile::new(path.clone(), kind))
            })
            .collect())
    }

    fn read(&self, path: &Path) -> Result<String, StorageError> {
        validate_relative_path(path).map_err(|e| e.with_backend(BACKEND))?;
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::not_found(path).with_backend(BACKEND))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}
