//! Static HTML output for Folio sites.
//!
//! [`StaticSiteBuilder`] writes every page of a loaded [`Site`](folio_site::Site)
//! as `<path>/index.html`, plus generated listings, tag pages, `404.html`,
//! the stylesheet and an optional `sitemap.xml`.

mod assets;
mod builder;
pub mod template;

pub use builder::{BuildConfig, BuildError, BuildReport, StaticSiteBuilder};
pub use template::Theme;
