//! Markdown and MDX rendering for Folio.
//!
//! [`MarkdownRenderer`] turns one source document into an HTML fragment plus
//! the data the layout needs around it: the first H1 as title and a table of
//! contents. Along the way it:
//!
//! - assigns stable heading ids (`{#id}` overrides)
//! - rewrites links to `.md`/`.mdx` files into pretty URLs under the base path
//! - strips MDX `import`/`export` lines and `{/* */}` comments
//! - turns `<Callout>` blocks, `:::kind` containers and `> [!NOTE]` alerts
//!   into [`Callout`] markup
//!
//! # Example
//!
//! ```
//! use folio_renderer::{MarkdownRenderer, SourceFormat};
//!
//! let result = MarkdownRenderer::new()
//!     .with_base_path("/docs/")
//!     .render("# Hello\n\nSee [setup](setup.md).", SourceFormat::Markdown);
//! assert_eq!(result.title.as_deref(), Some("Hello"));
//! assert!(result.html.contains(r#"href="/docs/setup/""#));
//! ```

mod callout;
mod fence;
mod links;
mod preprocess;
mod renderer;
mod state;

pub use callout::{Callout, CalloutKind};
pub use links::rewrite_link;
pub use renderer::{MarkdownRenderer, RenderResult, SourceFormat};
pub use state::{TocEntry, escape_html, slugify};
