//! Content items for Folio.
//!
//! Turns a Markdown/MDX source file into a [`ContentItem`]: front matter is
//! parsed, the title resolved, the date validated, tags normalized, and the
//! source path mapped to its URL path.
//!
//! # Example
//!
//! ```ignore
//! use folio_content::ContentItem;
//! use folio_storage::{SourceFile, SourceKind};
//!
//! let file = SourceFile::new("blog/kafka.md", SourceKind::Markdown);
//! let item = ContentItem::parse(&file, "---\ndate: 2024-03-01\n---\n# Kafka\n")?;
//! assert_eq!(item.path, "blog/kafka");
//! assert_eq!(item.title, "Kafka");
//! ```

mod error;
mod front_matter;
mod item;

pub use error::ContentError;
pub use front_matter::{FrontMatter, Tags, parse_date};
pub use item::{ContentItem, first_heading, page_href, url_path_for};
