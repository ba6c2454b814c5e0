//! Navigation for Folio.
//!
//! Each content directory may carry a navigation map (`_meta.yaml` or
//! `_meta.json`) that orders, titles, hides and groups its entries. This
//! crate parses those maps ([`NavMap`]), resolves one directory's menu
//! ([`resolve_menu`]) and assembles the whole site's [`NavTree`].
//!
//! # Example
//!
//! ```ignore
//! use folio_nav::{NavMap, NavTreeBuilder};
//!
//! let mut builder = NavTreeBuilder::new("Docs");
//! builder.add_map("", NavMap::parse("_meta.yaml".as_ref(), "intro: Overview\n")?);
//! builder.add_page("", "intro", "Introduction");
//! let tree = builder.build()?;
//! assert_eq!(tree.root().children[0].title, "Overview");
//! ```

mod error;
mod map;
mod resolve;
mod tree;

pub use error::NavError;
pub use map::{DisplayMode, NavEntry, NavKind, NavMap};
pub use resolve::{MenuEntry, resolve_menu, resolve_menu_with, title_from_slug};
pub use tree::{Breadcrumb, INDEX_SLUG, NavNode, NavTree, NavTreeBuilder};
