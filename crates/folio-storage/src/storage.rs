//! Storage trait and error types.
//!
//! Provides the core [`Storage`] trait for discovering and reading site sources,
//! along with [`StorageError`] for unified error handling across backends.
//!
//! # Path Convention
//!
//! All paths exchanged with a backend are **relative** to the content root and
//! use `/` separators regardless of platform:
//! - `index.mdx` - home page
//! - `blog/kafka-intro.md` - nested page
//! - `blog/_meta.yaml` - navigation map for `blog/`

use std::path::{Component, Path, PathBuf};

/// Default filename of per-directory navigation maps.
pub const DEFAULT_META_FILENAME: &str = "_meta.yaml";

/// What a discovered source file is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Plain Markdown (`.md`).
    Markdown,
    /// MDX (`.mdx`); Markdown plus import/export lines and JSX blocks.
    Mdx,
    /// Navigation metadata map.
    Meta,
}

impl SourceKind {
    /// Classify a file name.
    ///
    /// Returns `None` for files the site does not consume.
    #[must_use]
    pub fn classify(file_name: &str, meta_filename: &str) -> Option<Self> {
        if file_name == meta_filename {
            return Some(Self::Meta);
        }
        let (_, ext) = file_name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "md" | "markdown" => Some(Self::Markdown),
            "mdx" => Some(Self::Mdx),
            _ => None,
        }
    }

    /// Whether the file holds page content.
    #[must_use]
    pub fn is_content(self) -> bool {
        matches!(self, Self::Markdown | Self::Mdx)
    }
}

/// A source file found by [`Storage::scan`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the content root.
    pub path: PathBuf,
    /// File classification.
    pub kind: SourceKind,
}

impl SourceFile {
    /// Create a source file entry.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, kind: SourceKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Directory of the file relative to the content root (`""` at the root).
    #[must_use]
    pub fn dir(&self) -> String {
        self.path
            .parent()
            .map(path_to_slash)
            .unwrap_or_default()
    }

    /// File name without extension (the slug within its directory).
    #[must_use]
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Render a relative path with `/` separators.
fn path_to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Semantic error categories.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageErrorKind {
    /// Resource does not exist.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Invalid path (absolute or escaping the content root).
    InvalidPath,
    /// Other/unknown error category.
    Other,
}

/// Storage error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct StorageError {
    /// Semantic error category.
    pub kind: StorageErrorKind,
    /// Path context (if applicable).
    pub path: Option<PathBuf>,
    /// Backend identifier (e.g., "Fs", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StorageError {
    /// Create a new storage error.
    #[must_use]
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Downcast the source error to a concrete type.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.as_ref()?.downcast_ref()
    }

    /// Create a not found error with path.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(StorageErrorKind::NotFound).with_path(path)
    }

    /// Create a storage error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: Option<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => StorageErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => StorageErrorKind::PermissionDenied,
            _ => StorageErrorKind::Other,
        };
        let mut error = Self::new(kind).with_source(err);
        if let Some(p) = path {
            error = error.with_path(p);
        }
        error
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (path: foo/bar.md)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            StorageErrorKind::NotFound => "Not found",
            StorageErrorKind::PermissionDenied => "Permission denied",
            StorageErrorKind::InvalidPath => "Invalid path",
            StorageErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Reject paths that are absolute or climb out of the content root.
pub fn validate_relative_path(path: &Path) -> Result<(), StorageError> {
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes || path.as_os_str().is_empty() {
        return Err(StorageError::new(StorageErrorKind::InvalidPath).with_path(path));
    }
    Ok(())
}

/// Storage abstraction for site sources.
///
/// Implementations discover content and metadata files below a root and read
/// them back by relative path.
pub trait Storage: Send + Sync {
    /// Scan and return all source files, sorted by path.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if scanning fails (e.g., permission denied).
    fn scan(&self) -> Result<Vec<SourceFile>, StorageError>;

    /// Read a file's full text.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the file doesn't exist, can't be read, or
    /// the path is not a plain relative path.
    fn read(&self, path: &Path) -> Result<String, StorageError>;

    /// Check if a file exists at the given relative path.
    ///
    /// Returns `false` on errors (treats errors as "doesn't exist").
    fn exists(&self, path: &Path) -> bool;
}
