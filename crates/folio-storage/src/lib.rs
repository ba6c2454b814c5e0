//! Content storage abstraction for Folio.
//!
//! This crate provides a [`Storage`] trait for discovering and reading the
//! source files of a site. The site loader only ever talks to this trait, which
//! keeps it testable without touching the real filesystem.
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Storage`] trait with `scan()`, `read()`, and `exists()` methods
//! - [`FsStorage`] for a content directory on disk (honors `.gitignore`)
//! - [`MockStorage`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use folio_storage::{FsStorage, Storage};
//!
//! let storage = FsStorage::new(PathBuf::from("pages"));
//! for file in storage.scan()? {
//!     println!("{} ({:?})", file.path.display(), file.kind);
//! }
//! ```

mod fs;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use fs::FsStorage;
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use storage::{
    DEFAULT_META_FILENAME, SourceFile, SourceKind, Storage, StorageError, StorageErrorKind,
    validate_relative_path,
};
