//! Site loading errors.

use std::fmt::Write;
use std::path::PathBuf;

use folio_content::ContentError;
use folio_nav::NavError;
use folio_storage::StorageError;

/// Error returned by [`Site`](crate::Site) loading and queries.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// Scanning or reading the content tree failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// One or more content files are malformed; all of them are listed.
    #[error("{}", content_summary(.0))]
    Content(Vec<ContentError>),

    /// Navigation map parsing or tree validation failed.
    #[error(transparent)]
    Nav(#[from] NavError),

    /// Two source files map to the same URL path.
    #[error(
        "{} and {} both map to /{path}",
        .first.display(),
        .second.display()
    )]
    DuplicatePath {
        path: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// Source file whose URL belongs to a generated page.
    #[error("{} maps to /{path}, which is reserved for generated tag pages", .file.display())]
    ReservedPath { path: String, file: PathBuf },

    /// Two different tags produce the same tag page URL.
    #[error("tags `{first}` and `{second}` both map to /tags/{slug}")]
    TagCollision {
        slug: String,
        first: String,
        second: String,
    },

    /// No page or listing at the requested path.
    #[error("Page not found: /{0}")]
    NotFound(String),
}

fn content_summary(errors: &[ContentError]) -> String {
    if let [single] = errors {
        return single.to_string();
    }
    let mut out = format!("{} content files are invalid:", errors.len());
    for error in errors {
        let _ = write!(out, "\n  {error}");
    }
    out
}
