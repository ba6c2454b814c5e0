//! Site model for Folio.
//!
//! [`Site::load`] reads every source file from a [`Storage`](folio_storage::Storage),
//! validates content and navigation together, and answers the queries the
//! layout needs: rendered pages with breadcrumbs and prev/next links,
//! directory listings and tag groups.
//!
//! # Example
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::PathBuf;
//! use folio_site::{Site, SiteConfig};
//! use folio_storage::FsStorage;
//!
//! let dir = tempfile::tempdir()?;
//! std::fs::write(dir.path().join("index.md"), "# Home\n\nWelcome.")?;
//!
//! let storage = FsStorage::new(PathBuf::from(dir.path()));
//! let site = Site::load(&storage, SiteConfig::default())?;
//! let page = site.render("")?;
//! assert_eq!(page.title, "Home");
//! # Ok(())
//! # }
//! ```

mod error;
mod page;
mod site;

pub use error::SiteError;
pub use page::{Listing, ListingEntry, PageLink, PageRenderResult, TagGroup, tag_slug};
pub use site::{Site, SiteConfig};

// Re-exported for layout code
pub use folio_nav::{Breadcrumb, NavKind, NavNode, NavTree};
pub use folio_renderer::TocEntry;
