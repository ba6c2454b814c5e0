//! HTML layout for static pages.
//!
//! Pure composition: the navigation tree, the page and the theme come in as
//! parameters and a complete document comes out. Nothing here touches the
//! filesystem.

use std::fmt::Write;

use chrono::NaiveDate;
use folio_content::page_href;
use folio_renderer::escape_html as escape;
use folio_site::{Breadcrumb, Listing, NavNode, NavTree, PageLink, TagGroup, TocEntry};

/// Site-wide presentation settings.
#[derive(Clone, Debug)]
pub struct Theme {
    pub site_title: String,
    pub site_description: Option<String>,
    /// URL prefix; starts and ends with `/`.
    pub base_path: String,
    /// HTML shown in a strip above the navbar.
    pub banner: Option<String>,
    /// HTML shown in the footer; defaults to the site title.
    pub footer: Option<String>,
    /// Repository or project URL linked from the navbar.
    pub project_link: Option<String>,
    /// Render the search box markup.
    pub search: bool,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            site_title: "Folio".to_owned(),
            site_description: None,
            base_path: "/".to_owned(),
            banner: None,
            footer: None,
            project_link: None,
            search: true,
        }
    }
}

impl Theme {
    fn href(&self, path: &str) -> String {
        page_href(&self.base_path, path)
    }

    fn css_href(&self) -> String {
        format!("{}assets/folio.css", self.base_path)
    }
}

/// Tag link shown in a page header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagLink {
    pub name: String,
    pub path: String,
}

/// Everything the layout needs about the current page.
#[derive(Clone, Debug, Default)]
pub struct PageData {
    /// URL path without surrounding slashes.
    pub path: String,
    pub title: String,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub tags: Vec<TagLink>,
    /// Rendered body.
    pub content_html: String,
    /// Print the title as `<h1>`; off when the body has its own.
    pub show_title: bool,
    pub toc: Vec<TocEntry>,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub prev: Option<PageLink>,
    pub next: Option<PageLink>,
}

/// Render a complete HTML document.
#[must_use]
pub fn render_page(nav: &NavTree, page: &PageData, theme: &Theme) -> String {
    let mut html = String::with_capacity(8192 + page.content_html.len());

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    if page.title == theme.site_title || page.title.is_empty() {
        let _ = writeln!(html, "<title>{}</title>", escape(&theme.site_title));
    } else {
        let _ = writeln!(
            html,
            "<title>{} | {}</title>",
            escape(&page.title),
            escape(&theme.site_title)
        );
    }
    if let Some(description) = page.description.as_ref().or(theme.site_description.as_ref()) {
        let _ = writeln!(
            html,
            "<meta name=\"description\" content=\"{}\">",
            escape(description)
        );
    }
    let _ = writeln!(
        html,
        "<link rel=\"stylesheet\" href=\"{}\">",
        escape(&theme.css_href())
    );
    html.push_str("</head>\n<body>\n");

    if let Some(banner) = &theme.banner {
        let _ = writeln!(html, "<div class=\"banner\">{banner}</div>");
    }
    render_navbar(&mut html, nav, &page.path, theme);

    html.push_str("<div class=\"layout\">\n");
    render_sidebar(&mut html, nav, &page.path, theme);

    html.push_str("<main class=\"content\">\n");
    render_breadcrumbs(&mut html, &page.breadcrumbs, theme);
    html.push_str("<article>\n");
    render_page_header(&mut html, page);
    html.push_str(&page.content_html);
    html.push_str("\n</article>\n");
    render_prev_next(&mut html, page.prev.as_ref(), page.next.as_ref(), theme);
    html.push_str("</main>\n");

    render_toc(&mut html, &page.toc);
    html.push_str("</div>\n");

    render_footer(&mut html, theme);
    html.push_str("</body>\n</html>\n");
    html
}

fn render_navbar(html: &mut String, nav: &NavTree, path: &str, theme: &Theme) {
    html.push_str("<header class=\"navbar\">\n");
    let _ = writeln!(
        html,
        "<a class=\"navbar-title\" href=\"{}\">{}</a>",
        escape(&theme.href("")),
        escape(&theme.site_title)
    );

    let pages = nav.top_pages();
    if !pages.is_empty() {
        html.push_str("<nav class=\"navbar-links\">\n");
        for node in pages {
            let class = if node.is_active_for(path) {
                " class=\"active\""
            } else {
                ""
            };
            let _ = writeln!(
                html,
                "<a href=\"{}\"{class}>{}</a>",
                escape(&theme.href(&node.path)),
                escape(&node.title)
            );
        }
        html.push_str("</nav>\n");
    }

    if theme.search {
        html.push_str(
            "<form class=\"search\" role=\"search\"><input type=\"search\" \
             name=\"q\" placeholder=\"Search documentation…\" aria-label=\"Search\"></form>\n",
        );
    }
    if let Some(link) = &theme.project_link {
        let _ = writeln!(
            html,
            "<a class=\"project-link\" href=\"{}\">Project</a>",
            escape(link)
        );
    }
    html.push_str("</header>\n");
}

fn render_sidebar(html: &mut String, nav: &NavTree, path: &str, theme: &Theme) {
    let nodes = nav.sidebar(path);
    if nodes.is_empty() {
        return;
    }
    html.push_str("<aside class=\"sidebar\">\n<nav>\n<ul>\n");
    render_nav_items(html, &nodes, path, theme);
    html.push_str("</ul>\n</nav>\n</aside>\n");
}

/// Render menu nodes recursively.
///
/// A directory's `index` child is skipped: the directory entry links it.
fn render_nav_items(html: &mut String, nodes: &[&NavNode], path: &str, theme: &Theme) {
    for node in nodes {
        if node.is_group() {
            let _ = writeln!(html, "<li class=\"nav-group\">{}</li>", escape(&node.title));
            continue;
        }
        if !node.is_linkable() {
            continue;
        }

        let children: Vec<&NavNode> = node
            .visible_children()
            .filter(|c| !(c.path == node.path && !c.is_dir))
            .collect();

        let class = if node.path == path {
            " class=\"active\""
        } else if !children.is_empty() && node.is_active_for(path) {
            " class=\"open\""
        } else {
            ""
        };
        let _ = write!(
            html,
            "<li{class}><a href=\"{}\">{}</a>",
            escape(&theme.href(&node.path)),
            escape(&node.title)
        );
        if !children.is_empty() {
            html.push_str("\n<ul>\n");
            render_nav_items(html, &children, path, theme);
            html.push_str("</ul>\n");
        }
        html.push_str("</li>\n");
    }
}

fn render_breadcrumbs(html: &mut String, breadcrumbs: &[Breadcrumb], theme: &Theme) {
    if breadcrumbs.is_empty() {
        return;
    }
    html.push_str("<nav class=\"breadcrumbs\" aria-label=\"Breadcrumb\">\n<ol>\n");
    for crumb in breadcrumbs {
        let _ = writeln!(
            html,
            "<li><a href=\"{}\">{}</a></li>",
            escape(&theme.href(&crumb.path)),
            escape(&crumb.title)
        );
    }
    html.push_str("</ol>\n</nav>\n");
}

fn render_page_header(html: &mut String, page: &PageData) {
    let has_meta = page.description.is_some() || page.date.is_some() || !page.tags.is_empty();
    if !page.show_title && !has_meta {
        return;
    }
    html.push_str("<header class=\"page-header\">\n");
    if page.show_title {
        let _ = writeln!(html, "<h1>{}</h1>", escape(&page.title));
    }
    if let Some(description) = &page.description {
        let _ = writeln!(html, "<p class=\"page-description\">{}</p>", escape(description));
    }
    if let Some(date) = page.date {
        let _ = writeln!(
            html,
            "<time datetime=\"{}\">{}</time>",
            date.format("%Y-%m-%d"),
            date.format("%B %-d, %Y")
        );
    }
    if !page.tags.is_empty() {
        html.push_str("<ul class=\"tags\">");
        for tag in &page.tags {
            let _ = write!(
                html,
                "<li><a href=\"{}\">{}</a></li>",
                escape(&tag.path),
                escape(&tag.name)
            );
        }
        html.push_str("</ul>\n");
    }
    html.push_str("</header>\n");
}

fn render_prev_next(
    html: &mut String,
    prev: Option<&PageLink>,
    next: Option<&PageLink>,
    theme: &Theme,
) {
    if prev.is_none() && next.is_none() {
        return;
    }
    html.push_str("<nav class=\"prev-next\">\n");
    if let Some(link) = prev {
        let _ = writeln!(
            html,
            "<a class=\"prev\" href=\"{}\"><span>Previous</span>{}</a>",
            escape(&theme.href(&link.path)),
            escape(&link.title)
        );
    }
    if let Some(link) = next {
        let _ = writeln!(
            html,
            "<a class=\"next\" href=\"{}\"><span>Next</span>{}</a>",
            escape(&theme.href(&link.path)),
            escape(&link.title)
        );
    }
    html.push_str("</nav>\n");
}

fn render_toc(html: &mut String, toc: &[TocEntry]) {
    if toc.is_empty() {
        return;
    }
    html.push_str("<aside class=\"toc\">\n<h2>On this page</h2>\n<ul>\n");
    let min_level = toc.iter().map(|e| e.level).min().unwrap_or(2);
    for entry in toc {
        let depth = entry.level.saturating_sub(min_level);
        let class = if depth == 0 {
            String::new()
        } else {
            format!(" class=\"toc-depth-{depth}\"")
        };
        let _ = writeln!(
            html,
            "<li{class}><a href=\"#{}\">{}</a></li>",
            escape(&entry.id),
            escape(&entry.title)
        );
    }
    html.push_str("</ul>\n</aside>\n");
}

fn render_footer(html: &mut String, theme: &Theme) {
    html.push_str("<footer class=\"footer\">");
    match &theme.footer {
        Some(footer) => html.push_str(footer),
        None => {
            let _ = write!(html, "{}", escape(&theme.site_title));
        }
    }
    html.push_str("</footer>\n");
}

/// Body of a generated directory listing.
#[must_use]
pub fn listing_content(listing: &Listing, theme: &Theme) -> String {
    let mut html = String::from("<ul class=\"listing\">\n");
    for entry in &listing.entries {
        let class = if entry.is_section { " class=\"section\"" } else { "" };
        let _ = write!(
            html,
            "<li{class}><a href=\"{}\">{}</a>",
            escape(&theme.href(&entry.path)),
            escape(&entry.title)
        );
        if let Some(date) = entry.date {
            let _ = write!(
                html,
                " <time datetime=\"{}\">{}</time>",
                date.format("%Y-%m-%d"),
                date.format("%B %-d, %Y")
            );
        }
        if let Some(description) = &entry.description {
            let _ = write!(html, "<p>{}</p>", escape(description));
        }
        html.push_str("</li>\n");
    }
    html.push_str("</ul>");
    html
}

/// Body of the `tags/` index page.
#[must_use]
pub fn tag_index_content(tags: &[TagGroup<'_>], theme: &Theme) -> String {
    let mut html = String::from("<ul class=\"tag-index\">\n");
    for group in tags {
        let _ = writeln!(
            html,
            "<li><a href=\"{}\">{}</a> <span class=\"count\">{}</span></li>",
            escape(&theme.href(&group.path())),
            escape(&group.name),
            group.items.len()
        );
    }
    html.push_str("</ul>");
    html
}

/// Body of one tag page: its items, newest first.
#[must_use]
pub fn tag_content(group: &TagGroup<'_>, theme: &Theme) -> String {
    let mut html = String::from("<ul class=\"listing\">\n");
    for item in &group.items {
        let _ = write!(
            html,
            "<li><a href=\"{}\">{}</a>",
            escape(&theme.href(&item.path)),
            escape(&item.title)
        );
        if let Some(date) = item.date {
            let _ = write!(
                html,
                " <time datetime=\"{}\">{}</time>",
                date.format("%Y-%m-%d"),
                date.format("%B %-d, %Y")
            );
        }
        if let Some(description) = &item.description {
            let _ = write!(html, "<p>{}</p>", escape(description));
        }
        html.push_str("</li>\n");
    }
    html.push_str("</ul>");
    html
}

/// Body of the not-found page.
#[must_use]
pub fn not_found_content(theme: &Theme) -> String {
    format!(
        "<p>The page you are looking for does not exist.</p>\n<p><a href=\"{}\">Back to {}</a></p>",
        escape(&theme.href("")),
        escape(&theme.site_title)
    )
}
