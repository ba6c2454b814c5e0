//! Query results handed to the layout.

use chrono::NaiveDate;
use folio_content::ContentItem;
use folio_nav::Breadcrumb;
use folio_renderer::{TocEntry, slugify};

/// Link to another page (prev/next, listings).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageLink {
    pub title: String,
    /// URL path without surrounding slashes.
    pub path: String,
}

/// A rendered page with its navigation context.
#[derive(Clone, Debug)]
pub struct PageRenderResult {
    /// Rendered body HTML.
    pub html: String,
    /// Resolved page title.
    pub title: String,
    /// Whether the body renders its own `# Heading` as the title.
    pub title_in_body: bool,
    pub toc: Vec<TocEntry>,
    pub warnings: Vec<String>,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub prev: Option<PageLink>,
    pub next: Option<PageLink>,
}

/// One child of a listing page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingEntry {
    pub title: String,
    pub path: String,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    /// Entry is a directory.
    pub is_section: bool,
}

/// Generated page for a directory without an index file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Listing {
    pub title: String,
    pub path: String,
    pub entries: Vec<ListingEntry>,
    pub breadcrumbs: Vec<Breadcrumb>,
}

/// Items sharing a tag.
#[derive(Clone, Debug)]
pub struct TagGroup<'a> {
    /// Tag as first written.
    pub name: String,
    /// URL segment under `tags/`.
    pub slug: String,
    /// Newest first, undated last, then by title.
    pub items: Vec<&'a ContentItem>,
}

/// URL segment of a tag page.
///
/// `+` and `#` are spelled out, so `C`, `C++` and `C#` get distinct pages.
#[must_use]
pub fn tag_slug(tag: &str) -> String {
    let mut spelled = String::with_capacity(tag.len());
    for c in tag.chars() {
        match c {
            '+' => spelled.push_str(" plus "),
            '#' => spelled.push_str(" sharp "),
            _ => spelled.push(c),
        }
    }
    slugify(&spelled)
}

impl TagGroup<'_> {
    /// URL path of the tag page.
    #[must_use]
    pub fn path(&self) -> String {
        format!("tags/{}", self.slug)
    }
}
