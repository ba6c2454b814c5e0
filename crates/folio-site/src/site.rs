//! Loaded site: content items, navigation tree and page rendering.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use folio_content::{ContentItem, page_href};
use folio_nav::{INDEX_SLUG, NavMap, NavNode, NavTree, NavTreeBuilder};
use folio_renderer::{MarkdownRenderer, SourceFormat};
use folio_storage::{SourceFile, Storage};
use rayon::prelude::*;

use crate::SiteError;
use crate::page::{Listing, ListingEntry, PageLink, PageRenderResult, TagGroup, tag_slug};

/// First URL segment of the generated tag pages.
const TAGS_SEGMENT: &str = "tags";

/// Configuration for [`Site::load`].
#[derive(Clone, Debug)]
pub struct SiteConfig {
    /// Site title, used for the navigation root.
    pub title: String,
    /// URL prefix; starts and ends with `/`.
    pub base_path: String,
    /// Build items marked `draft: true`.
    pub include_drafts: bool,
    /// Deepest heading level in page tables of contents.
    pub toc_depth: u8,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Folio".to_owned(),
            base_path: "/".to_owned(),
            include_drafts: false,
            toc_depth: 3,
        }
    }
}

/// A validated site.
///
/// Built in one pass by [`Site::load`] and immutable afterwards. Loading
/// fails unless every item parses and the navigation tree links each item
/// exactly once.
#[derive(Debug)]
pub struct Site {
    config: SiteConfig,
    /// Sorted by source path.
    items: Vec<ContentItem>,
    by_path: HashMap<String, usize>,
    nav: NavTree,
    renderer: MarkdownRenderer,
    drafts_skipped: usize,
}

impl Site {
    /// Scan `storage`, parse every item and map, and build the navigation tree.
    ///
    /// # Errors
    ///
    /// - [`SiteError::Storage`] if scanning or reading fails
    /// - [`SiteError::Content`] with every malformed content file
    /// - [`SiteError::Nav`] for unparseable maps, dangling entries or
    ///   unreachable items
    /// - [`SiteError::DuplicatePath`] if two files map to one URL
    /// - [`SiteError::ReservedPath`] if a file maps into `tags/`
    /// - [`SiteError::TagCollision`] if two tags share a tag page URL
    pub fn load(storage: &dyn Storage, config: SiteConfig) -> Result<Self, SiteError> {
        let files = storage.scan()?;
        let (content, maps): (Vec<SourceFile>, Vec<SourceFile>) =
            files.into_iter().partition(|f| f.kind.is_content());
        tracing::info!(
            content = content.len(),
            maps = maps.len(),
            "Scanned content tree"
        );

        let entries = parse_items(storage, content)?;

        let mut builder = NavTreeBuilder::new(config.title.clone());
        for file in maps {
            let text = storage.read(&file.path)?;
            let map = NavMap::parse(&file.path, &text)?;
            tracing::debug!(file = %file.path.display(), entries = map.len(), "Parsed navigation map");
            builder.add_map(file.dir(), map);
        }

        let mut items: Vec<ContentItem> = Vec::with_capacity(entries.len());
        let mut by_path: HashMap<String, usize> = HashMap::with_capacity(entries.len());
        let mut drafts_skipped = 0;
        for (file, item) in entries {
            let slug = nav_slug(&file, &item);
            if item.draft && !config.include_drafts {
                tracing::debug!(file = %file.path.display(), "Skipping draft");
                builder.add_excluded(&file.dir(), &slug);
                drafts_skipped += 1;
                continue;
            }
            if is_reserved(&item.path) {
                return Err(SiteError::ReservedPath {
                    path: item.path,
                    file: item.source,
                });
            }
            if let Some(&existing) = by_path.get(&item.path) {
                return Err(SiteError::DuplicatePath {
                    path: item.path,
                    first: items[existing].source.clone(),
                    second: item.source,
                });
            }
            builder.add_page(&file.dir(), &slug, item.title.clone());
            by_path.insert(item.path.clone(), items.len());
            items.push(item);
        }

        check_tag_slugs(&items)?;
        let nav = builder.build()?;
        nav.verify(items.iter().map(|item| item.path.as_str()))?;

        tracing::info!(
            items = items.len(),
            drafts = drafts_skipped,
            nav_nodes = nav.len(),
            "Loaded site"
        );

        let renderer = MarkdownRenderer::new()
            .with_base_path(config.base_path.clone())
            .with_toc_depth(config.toc_depth);

        Ok(Self {
            config,
            items,
            by_path,
            nav,
            renderer,
            drafts_skipped,
        })
    }

    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Built items, sorted by source path.
    #[must_use]
    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    /// Item at a URL path (no surrounding slashes).
    #[must_use]
    pub fn item(&self, path: &str) -> Option<&ContentItem> {
        self.by_path.get(path).map(|&i| &self.items[i])
    }

    #[must_use]
    pub fn nav(&self) -> &NavTree {
        &self.nav
    }

    /// Number of drafts left out of the build.
    #[must_use]
    pub fn drafts_skipped(&self) -> usize {
        self.drafts_skipped
    }

    /// Public URL of a path, with the base path.
    #[must_use]
    pub fn href(&self, path: &str) -> String {
        page_href(&self.config.base_path, path)
    }

    /// Render the item at `path` with its navigation context.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::NotFound`] if no item has this path.
    pub fn render(&self, path: &str) -> Result<PageRenderResult, SiteError> {
        let item = self
            .item(path)
            .ok_or_else(|| SiteError::NotFound(path.to_owned()))?;

        let format = if item.is_mdx() {
            SourceFormat::Mdx
        } else {
            SourceFormat::Markdown
        };
        let page_dir = SourceFile::new(item.source.clone(), item.kind).dir();
        let result = self
            .renderer
            .clone()
            .with_page_dir(page_dir)
            .render(&item.body, format);

        for warning in &result.warnings {
            tracing::warn!(file = %item.source.display(), "{warning}");
        }

        let (prev, next) = self.neighbors(path);
        Ok(PageRenderResult {
            html: result.html,
            title: item.title.clone(),
            title_in_body: result.title.is_some(),
            toc: result.toc,
            warnings: result.warnings,
            breadcrumbs: self.nav.breadcrumbs(path),
            prev,
            next,
        })
    }

    /// Previous and next visible pages in navigation order.
    fn neighbors(&self, path: &str) -> (Option<PageLink>, Option<PageLink>) {
        let order = self.nav.flatten();
        let Some(pos) = order.iter().position(|node| node.path == path) else {
            return (None, None);
        };
        let link = |node: &&NavNode| PageLink {
            title: node.title.clone(),
            path: node.path.clone(),
        };
        let prev = pos.checked_sub(1).and_then(|i| order.get(i)).map(link);
        let next = order.get(pos + 1).map(link);
        (prev, next)
    }

    /// Paths of directories that need a generated listing page.
    ///
    /// A directory gets one when it has no index file but some page below it.
    #[must_use]
    pub fn listing_paths(&self) -> Vec<&str> {
        fn walk<'a>(node: &'a NavNode, out: &mut Vec<&'a str>) {
            if node.is_dir && !node.has_content && subtree_has_content(node) {
                out.push(node.path.as_str());
            }
            for child in &node.children {
                walk(child, out);
            }
        }

        let mut out = Vec::new();
        walk(self.nav.root(), &mut out);
        out
    }

    /// Listing for a directory without an index page, children in
    /// navigation order.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::NotFound`] if `path` is not such a directory.
    pub fn listing(&self, path: &str) -> Result<Listing, SiteError> {
        let node = if path.is_empty() {
            Some(self.nav.root())
        } else {
            self.nav.find(path)
        };
        let node = node
            .filter(|n| n.is_dir && !n.has_content)
            .ok_or_else(|| SiteError::NotFound(path.to_owned()))?;

        let entries = node
            .visible_children()
            .filter(|child| child.is_linkable())
            .map(|child| {
                let item = self.item(&child.path);
                ListingEntry {
                    title: child.title.clone(),
                    path: child.path.clone(),
                    description: item.and_then(|i| i.description.clone()),
                    date: item.and_then(|i| i.date),
                    is_section: child.is_dir,
                }
            })
            .collect();

        Ok(Listing {
            title: node.title.clone(),
            path: node.path.clone(),
            entries,
            breadcrumbs: self.nav.breadcrumbs(path),
        })
    }

    /// Items grouped by tag, ordered by tag slug.
    ///
    /// Tags that differ only in case share one group; the first spelling
    /// seen names it.
    #[must_use]
    pub fn tags(&self) -> Vec<TagGroup<'_>> {
        let mut groups: BTreeMap<String, TagGroup<'_>> = BTreeMap::new();
        for item in &self.items {
            for tag in &item.tags {
                groups
                    .entry(tag.to_lowercase())
                    .or_insert_with(|| TagGroup {
                        name: tag.clone(),
                        slug: tag_slug(tag),
                        items: Vec::new(),
                    })
                    .items
                    .push(item);
            }
        }

        let mut groups: Vec<TagGroup<'_>> = groups.into_values().collect();
        groups.sort_by(|a, b| a.slug.cmp(&b.slug));
        for group in &mut groups {
            group.items.dedup_by(|a, b| a.path == b.path);
            group.items.sort_by(|a, b| {
                // Dated before undated, newest first
                (a.date.is_none(), Reverse(a.date), &a.title)
                    .cmp(&(b.date.is_none(), Reverse(b.date), &b.title))
            });
        }
        groups
    }
}

/// Navigation slug of a content file.
///
/// Index files of any case stand for their directory, as their URL does.
fn nav_slug(file: &SourceFile, item: &ContentItem) -> String {
    if item.is_index() {
        INDEX_SLUG.to_owned()
    } else {
        file.stem()
    }
}

/// Whether a URL path collides with the generated tag pages.
fn is_reserved(path: &str) -> bool {
    path.split('/')
        .next()
        .is_some_and(|first| first.eq_ignore_ascii_case(TAGS_SEGMENT))
}

/// Fail when two tags that differ beyond case share a tag page.
fn check_tag_slugs(items: &[ContentItem]) -> Result<(), SiteError> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for tag in items.iter().flat_map(|item| &item.tags) {
        let slug = tag_slug(tag);
        match seen.get(&slug) {
            Some(first) if first.to_lowercase() != tag.to_lowercase() => {
                return Err(SiteError::TagCollision {
                    slug,
                    first: (*first).to_owned(),
                    second: tag.clone(),
                });
            }
            Some(_) => {}
            None => {
                seen.insert(slug, tag.as_str());
            }
        }
    }
    Ok(())
}

fn subtree_has_content(node: &NavNode) -> bool {
    node.children
        .iter()
        .any(|child| child.has_content || subtree_has_content(child))
}

/// Read and parse content files in parallel.
///
/// Content errors are collected across all files; storage errors abort.
fn parse_items(
    storage: &dyn Storage,
    files: Vec<SourceFile>,
) -> Result<Vec<(SourceFile, ContentItem)>, SiteError> {
    let parsed: Vec<Result<(SourceFile, ContentItem), SiteError>> = files
        .into_par_iter()
        .map(|file| {
            let text = storage.read(&file.path)?;
            tracing::debug!(file = %file.path.display(), "Parsing content");
            let item = ContentItem::parse(&file, &text)
                .map_err(|e| SiteError::Content(vec![e]))?;
            Ok((file, item))
        })
        .collect();

    let mut entries = Vec::with_capacity(parsed.len());
    let mut errors = Vec::new();
    for result in parsed {
        match result {
            Ok(entry) => entries.push(entry),
            Err(SiteError::Content(mut errs)) => errors.append(&mut errs),
            Err(err) => return Err(err),
        }
    }

    if !errors.is_empty() {
        errors.sort_by(|a, b| a.path().cmp(b.path()));
        return Err(SiteError::Content(errors));
    }
    entries.sort_by(|a, b| a.0.path.cmp(&b.0.path));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    // Site is shared across server and build threads
    static_assertions::assert_impl_all!(super::Site: Send, Sync);

    use std::path::PathBuf;

    use folio_content::ContentError;
    use folio_nav::{Breadcrumb, NavError};
    use folio_storage::MockStorage;
    use pretty_assertions::assert_eq;

    use super::*;

    fn blog_storage() -> MockStorage {
        MockStorage::new()
            .with_file(
                "_meta.yaml",
                "index: Home\nguide: Guide\nblog:\n  title: Blog\n  type: page\n",
            )
            .with_file("index.md", "# Welcome\n\nHello.")
            .with_file(
                "guide.md",
                "---\ntitle: User Guide\n---\n\n## Install\n\nSee [home](./index.md).",
            )
            .with_file("blog/_meta.yaml", "index: Overview\n")
            .with_file("blog/index.md", "# Blog\n")
            .with_file(
                "blog/first-post.md",
                "---\ntitle: First\ndate: 2024-01-10\ntags: [rust, Release]\n---\nBody",
            )
            .with_file(
                "blog/second-post.mdx",
                "---\ntitle: Second\ndate: 2024-03-01\ntags: rust\n---\nimport X from 'y'\n\n:::info\nNew!\n:::\n",
            )
    }

    fn load(storage: &MockStorage) -> Result<Site, SiteError> {
        Site::load(storage, SiteConfig::default())
    }

    fn paths(items: &[&ContentItem]) -> Vec<String> {
        items.iter().map(|i| i.path.clone()).collect()
    }

    #[test]
    fn test_load_site() {
        let site = load(&blog_storage()).unwrap();
        let mut all: Vec<&str> = site.items().iter().map(|i| i.path.as_str()).collect();
        all.sort_unstable();
        assert_eq!(
            all,
            vec!["", "blog", "blog/first-post", "blog/second-post", "guide"]
        );
        assert_eq!(site.item("guide").unwrap().title, "User Guide");
        assert!(site.item("missing").is_none());

        let top: Vec<&str> = site.nav().top_pages().iter().map(|n| n.title.as_str()).collect();
        assert_eq!(top, vec!["Blog"]);
    }

    #[test]
    fn test_unmapped_items_use_item_titles() {
        let site = load(&blog_storage()).unwrap();
        let blog = site.nav().find("blog").unwrap();
        let titles: Vec<&str> = blog.children.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Overview", "First", "Second"]);
    }

    #[test]
    fn test_render_page_with_context() {
        let site = load(&blog_storage()).unwrap();
        let page = site.render("guide").unwrap();
        assert_eq!(page.title, "User Guide");
        assert!(!page.title_in_body);
        assert_eq!(page.toc[0].id, "install");
        assert!(page.html.contains(r#"href="/""#), "{}", page.html);
        assert_eq!(
            page.prev,
            Some(PageLink {
                title: "Home".to_owned(),
                path: String::new(),
            })
        );
        assert_eq!(page.next.map(|l| l.path).as_deref(), Some("blog"));
    }

    #[test]
    fn test_render_breadcrumbs_and_mdx() {
        let site = load(&blog_storage()).unwrap();
        let page = site.render("blog/second-post").unwrap();
        assert_eq!(
            page.breadcrumbs,
            vec![Breadcrumb {
                title: "Blog".to_owned(),
                path: "blog".to_owned(),
            }]
        );
        assert!(page.html.contains("callout-info"));
        assert!(!page.html.contains("import X"));
        assert!(page.next.is_none());
    }

    #[test]
    fn test_render_unknown_path() {
        let site = load(&blog_storage()).unwrap();
        assert!(matches!(site.render("nope"), Err(SiteError::NotFound(p)) if p == "nope"));
    }

    #[test]
    fn test_tags_newest_first() {
        let site = load(&blog_storage()).unwrap();
        let tags = site.tags();
        let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Release", "rust"]);
        assert_eq!(tags[1].path(), "tags/rust");
        assert_eq!(
            paths(&tags[1].items),
            vec!["blog/second-post", "blog/first-post"]
        );
    }

    #[test]
    fn test_tags_keep_symbols_apart() {
        let storage = MockStorage::new()
            .with_file("c.md", "---\ntitle: C basics\ntags: [C]\n---\n")
            .with_file("cpp.md", "---\ntitle: Modern C++\ntags: [C++]\n---\n")
            .with_file("cs.md", "---\ntitle: C# intro\ntags: [C#, c]\n---\n");
        let site = load(&storage).unwrap();
        let tags = site.tags();

        let summary: Vec<(&str, &str, Vec<String>)> = tags
            .iter()
            .map(|t| (t.name.as_str(), t.slug.as_str(), paths(&t.items)))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("C", "c", vec!["c".to_owned(), "cs".to_owned()]),
                ("C++", "c-plus-plus", vec!["cpp".to_owned()]),
                ("C#", "c-sharp", vec!["cs".to_owned()]),
            ]
        );
    }

    #[test]
    fn test_tag_slug_collision() {
        let storage = MockStorage::new()
            .with_file("a.md", "---\ntitle: A\ntags: [rust-lang]\n---\n")
            .with_file("b.md", "---\ntitle: B\ntags: [Rust Lang]\n---\n");
        let err = load(&storage).unwrap_err();
        assert!(
            matches!(&err, SiteError::TagCollision { slug, .. } if slug == "rust-lang"),
            "{err}"
        );
    }

    #[test]
    fn test_tag_pages_path_is_reserved() {
        let storage = MockStorage::new()
            .with_file("index.md", "# Home")
            .with_file("tags.md", "# Authored tags");
        let err = load(&storage).unwrap_err();
        assert!(
            matches!(&err, SiteError::ReservedPath { path, file } if path == "tags" && file == &PathBuf::from("tags.md")),
            "{err}"
        );

        let storage = MockStorage::new()
            .with_file("index.md", "# Home")
            .with_file("Tags/rust.md", "# Rust");
        assert!(matches!(load(&storage), Err(SiteError::ReservedPath { .. })));
    }

    #[test]
    fn test_similar_paths_are_not_reserved() {
        let storage = MockStorage::new()
            .with_file("index.md", "# Home")
            .with_file("tagsets.md", "# Tag sets")
            .with_file("guide/tags.md", "# Tagging guide");
        let site = load(&storage).unwrap();
        assert!(site.item("tagsets").is_some());
        assert!(site.item("guide/tags").is_some());
    }

    #[test]
    fn test_uppercase_index_file() {
        let storage = MockStorage::new()
            .with_file("index.md", "# Home")
            .with_file("guide/INDEX.md", "# Guide")
            .with_file("guide/setup.md", "# Setup");
        let site = load(&storage).unwrap();

        assert_eq!(site.item("guide").unwrap().title, "Guide");
        let guide = site.nav().find("guide").unwrap();
        assert!(guide.has_content);
        assert!(site.listing_paths().is_empty());
        assert_eq!(
            site.render("guide/setup").unwrap().breadcrumbs,
            vec![Breadcrumb {
                title: "Guide".to_owned(),
                path: "guide".to_owned(),
            }]
        );
    }

    #[test]
    fn test_all_content_errors_reported() {
        let storage = MockStorage::new()
            .with_file("a.md", "---\ntitle: A\n")
            .with_file("b.md", "No heading here")
            .with_file("c.md", "---\ndate: yesterday\ntitle: C\n---\n")
            .with_file("ok.md", "# Fine");
        let Err(SiteError::Content(errors)) = load(&storage) else {
            panic!("expected content errors");
        };
        let files: Vec<PathBuf> = errors.iter().map(|e| e.path().to_path_buf()).collect();
        assert_eq!(
            files,
            vec![PathBuf::from("a.md"), PathBuf::from("b.md"), PathBuf::from("c.md")]
        );
        assert!(matches!(errors[0], ContentError::UnterminatedFrontMatter { .. }));
        assert!(matches!(errors[1], ContentError::MissingTitle { .. }));
        assert!(matches!(errors[2], ContentError::InvalidDate { .. }));
    }

    #[test]
    fn test_dangling_map_entry() {
        let storage = MockStorage::new()
            .with_file("_meta.yaml", "intro: Overview\nmissing: Gone\n")
            .with_file("intro.md", "# Intro");
        let err = load(&storage).unwrap_err();
        assert!(
            matches!(&err, SiteError::Nav(NavError::DanglingEntry { dir, slug }) if dir.is_empty() && slug == "missing"),
            "{err}"
        );
    }

    #[test]
    fn test_duplicate_map_key_names_file() {
        let storage = MockStorage::new()
            .with_file("docs/_meta.json", r#"{"a": "A", "a": "Again"}"#)
            .with_file("docs/a.md", "# A");
        let storage = storage.with_meta_filename("_meta.json");
        let err = load(&storage).unwrap_err();
        assert!(matches!(&err, SiteError::Nav(NavError::DuplicateKey { key, .. }) if key == "a"));
        assert!(err.to_string().contains("docs/_meta.json"), "{err}");
    }

    #[test]
    fn test_drafts_excluded_unless_requested() {
        let storage = MockStorage::new()
            .with_file("_meta.yaml", "intro: Intro\nwip: Work in progress\n")
            .with_file("intro.md", "# Intro")
            .with_file("wip.md", "---\ntitle: WIP\ndraft: true\n---\n");

        let site = load(&storage).unwrap();
        assert!(site.item("wip").is_none());
        assert_eq!(site.drafts_skipped(), 1);
        assert!(site.nav().find("wip").unwrap().hidden);

        let config = SiteConfig {
            include_drafts: true,
            ..SiteConfig::default()
        };
        let site = Site::load(&storage, config).unwrap();
        assert_eq!(site.item("wip").unwrap().title, "WIP");
        assert!(!site.nav().find("wip").unwrap().hidden);
    }

    #[test]
    fn test_duplicate_url_path() {
        let storage = MockStorage::new()
            .with_file("blog.md", "# Blog")
            .with_file("blog/index.md", "# Blog index");
        let err = load(&storage).unwrap_err();
        assert!(
            matches!(&err, SiteError::DuplicatePath { path, .. } if path == "blog"),
            "{err}"
        );
    }

    #[test]
    fn test_listing_for_directory_without_index() {
        let storage = MockStorage::new()
            .with_file("index.md", "# Home")
            .with_file("guides/_meta.yaml", "setup: Setup\nadvanced: Advanced\n")
            .with_file("guides/setup.md", "---\ntitle: Setup\ndescription: Get going\n---\n")
            .with_file("guides/advanced/tuning.md", "# Tuning");
        let site = load(&storage).unwrap();

        assert_eq!(site.listing_paths(), vec!["guides", "guides/advanced"]);
        let listing = site.listing("guides").unwrap();
        assert_eq!(listing.title, "Guides");
        assert_eq!(
            listing.entries,
            vec![
                ListingEntry {
                    title: "Setup".to_owned(),
                    path: "guides/setup".to_owned(),
                    description: Some("Get going".to_owned()),
                    date: None,
                    is_section: false,
                },
                ListingEntry {
                    title: "Advanced".to_owned(),
                    path: "guides/advanced".to_owned(),
                    description: None,
                    date: None,
                    is_section: true,
                },
            ]
        );
        assert!(matches!(site.listing(""), Err(SiteError::NotFound(_))));
    }

    #[test]
    fn test_base_path_in_links() {
        let storage = MockStorage::new()
            .with_file("index.md", "# Home\n\n[Guide](guide.md)")
            .with_file("guide.md", "# Guide");
        let config = SiteConfig {
            base_path: "/docs/".to_owned(),
            ..SiteConfig::default()
        };
        let site = Site::load(&storage, config).unwrap();
        assert!(site.render("").unwrap().html.contains(r#"href="/docs/guide/""#));
        assert_eq!(site.href("guide"), "/docs/guide/");
        assert_eq!(site.href(""), "/docs/");
    }
}
