//! Static site builder.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use folio_content::ContentItem;
use folio_renderer::escape_html;
use folio_site::{Site, SiteError, tag_slug};
use rayon::prelude::*;

use crate::assets::{STYLESHEET, STYLESHEET_PATH};
use crate::template::{
    PageData, TagLink, Theme, listing_content, not_found_content, render_page, tag_content,
    tag_index_content,
};

/// Configuration for static site building.
#[derive(Clone, Debug, Default)]
pub struct BuildConfig {
    pub theme: Theme,
    /// Absolute site URL (`https://example.com`); enables `sitemap.xml`.
    pub site_url: Option<String>,
    /// Directory copied verbatim into the output, if it exists.
    pub public_dir: Option<PathBuf>,
    /// Content directory; the output may not overlap it.
    pub source_dir: Option<PathBuf>,
    /// Remove the output directory before writing.
    pub clean: bool,
}

/// Counts of what a build wrote.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub pages: usize,
    pub listings: usize,
    pub tag_pages: usize,
    pub assets_copied: usize,
    pub warnings: usize,
}

/// Error returned by the static site builder.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: ignore::Error,
    },

    #[error("output directory {} overlaps {}", .output.display(), .other.display())]
    OutputOverlap { output: PathBuf, other: PathBuf },

    #[error(transparent)]
    Site(#[from] SiteError),
}

impl BuildError {
    fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

/// A composed document and where it goes.
struct OutputPage {
    /// URL path without surrounding slashes.
    path: String,
    html: String,
    warnings: usize,
}

/// Writes a [`Site`] as a tree of HTML files.
pub struct StaticSiteBuilder<'a> {
    site: &'a Site,
    config: BuildConfig,
}

impl<'a> StaticSiteBuilder<'a> {
    #[must_use]
    pub fn new(site: &'a Site, config: BuildConfig) -> Self {
        Self { site, config }
    }

    /// Build the site into `output_dir`.
    ///
    /// Pages are composed in parallel, then written.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::OutputOverlap`] if `output_dir` overlaps the
    /// source or public directory, [`BuildError::Io`] if any file cannot be
    /// written, [`BuildError::Walk`] if the public directory cannot be read.
    pub fn build(&self, output_dir: &Path) -> Result<BuildReport, BuildError> {
        self.check_output(output_dir)?;
        prepare_output(output_dir, self.config.clean)?;
        self.write_site(output_dir)
    }

    /// Build into a fresh sibling of `output_dir`, then swap it in.
    ///
    /// `output_dir` is left untouched when the build fails. On success the
    /// old tree is moved aside and removed.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub fn build_replacing(&self, output_dir: &Path) -> Result<BuildReport, BuildError> {
        self.check_output(output_dir)?;
        let staging = sibling_dir(output_dir, "staging")?;
        prepare_output(&staging, true)?;

        let report = match self.write_site(&staging) {
            Ok(report) => report,
            Err(err) => {
                discard(&staging);
                return Err(err);
            }
        };
        swap_in(&staging, output_dir)?;
        Ok(report)
    }

    /// Refuse output directories that contain or sit inside a build input.
    fn check_output(&self, output_dir: &Path) -> Result<(), BuildError> {
        let output = normalize(output_dir);
        let inputs = [&self.config.source_dir, &self.config.public_dir];
        for dir in inputs.into_iter().flatten() {
            let other = normalize(dir);
            if output.starts_with(&other) || other.starts_with(&output) {
                return Err(BuildError::OutputOverlap {
                    output: output_dir.to_path_buf(),
                    other: dir.clone(),
                });
            }
        }
        Ok(())
    }

    fn write_site(&self, output_dir: &Path) -> Result<BuildReport, BuildError> {
        let started = Instant::now();
        let mut report = BuildReport::default();

        if let Some(public_dir) = self.config.public_dir.as_deref()
            && public_dir.is_dir()
        {
            report.assets_copied = copy_dir(public_dir, output_dir)?;
            tracing::info!(count = report.assets_copied, "Copied public files");
        }

        let pages = self
            .site
            .items()
            .par_iter()
            .map(|item| self.compose_item(item))
            .collect::<Result<Vec<_>, SiteError>>()?;
        report.pages = pages.len();
        report.warnings = pages.iter().map(|p| p.warnings).sum();
        write_pages(output_dir, &pages)?;
        tracing::info!(count = report.pages, "Wrote pages");

        let listings = self
            .site
            .listing_paths()
            .par_iter()
            .map(|path| self.compose_listing(path))
            .collect::<Result<Vec<_>, SiteError>>()?;
        report.listings = listings.len();
        write_pages(output_dir, &listings)?;

        let tag_pages = self.compose_tag_pages();
        report.tag_pages = tag_pages.len();
        write_pages(output_dir, &tag_pages)?;

        write_file(&output_dir.join("404.html"), &self.compose_not_found())?;
        write_file(&output_dir.join(STYLESHEET_PATH), STYLESHEET)?;

        if let Some(url) = &self.config.site_url {
            let sitemap = self.sitemap(url, &listings, &tag_pages);
            write_file(&output_dir.join("sitemap.xml"), &sitemap)?;
        }

        tracing::info!(
            pages = report.pages,
            listings = report.listings,
            tag_pages = report.tag_pages,
            warnings = report.warnings,
            elapsed_ms = started.elapsed().as_millis(),
            "Build complete"
        );
        Ok(report)
    }

    fn compose_item(&self, item: &ContentItem) -> Result<OutputPage, SiteError> {
        let rendered = self.site.render(&item.path)?;
        let tags = item
            .tags
            .iter()
            .map(|tag| TagLink {
                name: tag.clone(),
                path: self.site.href(&format!("tags/{}", tag_slug(tag))),
            })
            .collect();

        let data = PageData {
            path: item.path.clone(),
            title: rendered.title,
            description: item.description.clone(),
            date: item.date,
            tags,
            content_html: rendered.html,
            show_title: !rendered.title_in_body,
            toc: rendered.toc,
            breadcrumbs: rendered.breadcrumbs,
            prev: rendered.prev,
            next: rendered.next,
        };
        Ok(OutputPage {
            path: item.path.clone(),
            html: render_page(self.site.nav(), &data, &self.config.theme),
            warnings: rendered.warnings.len(),
        })
    }

    fn compose_listing(&self, path: &str) -> Result<OutputPage, SiteError> {
        let listing = self.site.listing(path)?;
        let data = PageData {
            path: listing.path.clone(),
            title: listing.title.clone(),
            content_html: listing_content(&listing, &self.config.theme),
            show_title: true,
            breadcrumbs: listing.breadcrumbs,
            ..PageData::default()
        };
        Ok(OutputPage {
            path: listing.path,
            html: render_page(self.site.nav(), &data, &self.config.theme),
            warnings: 0,
        })
    }

    /// `tags/index.html` plus one page per tag; nothing when no item is tagged.
    fn compose_tag_pages(&self) -> Vec<OutputPage> {
        let groups = self.site.tags();
        if groups.is_empty() {
            return Vec::new();
        }
        let theme = &self.config.theme;
        let nav = self.site.nav();

        let mut pages = Vec::with_capacity(groups.len() + 1);
        let index = PageData {
            path: "tags".to_owned(),
            title: "Tags".to_owned(),
            content_html: tag_index_content(&groups, theme),
            show_title: true,
            ..PageData::default()
        };
        pages.push(OutputPage {
            path: index.path.clone(),
            html: render_page(nav, &index, theme),
            warnings: 0,
        });

        for group in &groups {
            let data = PageData {
                path: group.path(),
                title: format!("Tagged \u{201c}{}\u{201d}", group.name),
                content_html: tag_content(group, theme),
                show_title: true,
                ..PageData::default()
            };
            pages.push(OutputPage {
                path: data.path.clone(),
                html: render_page(nav, &data, theme),
                warnings: 0,
            });
        }
        pages
    }

    fn compose_not_found(&self) -> String {
        let data = PageData {
            path: "404".to_owned(),
            title: "Page not found".to_owned(),
            content_html: not_found_content(&self.config.theme),
            show_title: true,
            ..PageData::default()
        };
        render_page(self.site.nav(), &data, &self.config.theme)
    }

    /// `sitemap.xml` listing every page, listing and tag page.
    fn sitemap(&self, site_url: &str, listings: &[OutputPage], tags: &[OutputPage]) -> String {
        let origin = site_url.trim_end_matches('/');
        let mut xml = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
        );

        let mut entry = |path: &str, lastmod: Option<String>| {
            let _ = write!(
                xml,
                "  <url><loc>{}</loc>",
                escape_html(&format!("{origin}{}", self.site.href(path)))
            );
            if let Some(lastmod) = lastmod {
                let _ = write!(xml, "<lastmod>{lastmod}</lastmod>");
            }
            xml.push_str("</url>\n");
        };

        for item in self.site.items() {
            entry(&item.path, item.date.map(|d| d.format("%Y-%m-%d").to_string()));
        }
        for page in listings.iter().chain(tags) {
            entry(&page.path, None);
        }

        xml.push_str("</urlset>\n");
        xml
    }
}

fn prepare_output(output_dir: &Path, clean: bool) -> Result<(), BuildError> {
    if clean && output_dir.exists() {
        tracing::info!(path = %output_dir.display(), "Cleaning output directory");
        fs::remove_dir_all(output_dir).map_err(BuildError::io(output_dir))?;
    }
    fs::create_dir_all(output_dir).map_err(BuildError::io(output_dir))
}

/// `<parent>/.<name>.<suffix>` next to `output_dir`.
fn sibling_dir(output_dir: &Path, suffix: &str) -> Result<PathBuf, BuildError> {
    let Some(name) = output_dir.file_name() else {
        return Err(BuildError::Io {
            path: output_dir.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "output directory has no file name",
            ),
        });
    };
    Ok(output_dir.with_file_name(format!(".{}.{suffix}", name.to_string_lossy())))
}

/// Replace `output_dir` with `staging`, restoring the old tree on failure.
fn swap_in(staging: &Path, output_dir: &Path) -> Result<(), BuildError> {
    let previous = sibling_dir(output_dir, "previous")?;
    if previous.exists() {
        fs::remove_dir_all(&previous).map_err(BuildError::io(&previous))?;
    }
    let had_output = output_dir.exists();
    if had_output {
        fs::rename(output_dir, &previous).map_err(BuildError::io(output_dir))?;
    }
    if let Err(source) = fs::rename(staging, output_dir) {
        if had_output {
            let _ = fs::rename(&previous, output_dir);
        }
        discard(staging);
        return Err(BuildError::Io {
            path: output_dir.to_path_buf(),
            source,
        });
    }
    if had_output {
        discard(&previous);
    }
    Ok(())
}

fn discard(dir: &Path) {
    if let Err(err) = fs::remove_dir_all(dir) {
        tracing::warn!(path = %dir.display(), error = %err, "Failed to remove directory");
    }
}

/// Absolute form of `path` with symlinks resolved as far as it exists.
fn normalize(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    loop {
        if let Ok(mut real) = existing.canonicalize() {
            real.extend(missing.iter().rev().copied());
            return real;
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name);
                existing = parent;
            }
            _ => return absolute.clone(),
        }
    }
}

/// File for a URL path: `a/b` → `a/b/index.html`, `""` → `index.html`.
fn page_file(output_dir: &Path, path: &str) -> PathBuf {
    let mut file = output_dir.to_path_buf();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        file.push(segment);
    }
    file.push("index.html");
    file
}

fn write_pages(output_dir: &Path, pages: &[OutputPage]) -> Result<(), BuildError> {
    for page in pages {
        let file = page_file(output_dir, &page.path);
        tracing::debug!(file = %file.display(), "Writing page");
        write_file(&file, &page.html)?;
    }
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(BuildError::io(parent))?;
    }
    fs::write(path, contents).map_err(BuildError::io(path))
}

/// Copy every file below `from` into `to`, keeping relative paths.
///
/// Hidden and git-ignored files are copied too.
fn copy_dir(from: &Path, to: &Path) -> Result<usize, BuildError> {
    let mut copied = 0;
    for entry in ignore::WalkBuilder::new(from).standard_filters(false).build() {
        let entry = entry.map_err(|source| BuildError::Walk {
            path: from.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(from) else {
            continue;
        };
        let target = to.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(BuildError::io(parent))?;
        }
        fs::copy(entry.path(), &target).map_err(BuildError::io(entry.path()))?;
        copied += 1;
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use folio_site::SiteConfig;
    use folio_storage::MockStorage;
    use pretty_assertions::assert_eq;

    use super::*;

    fn site() -> Site {
        let storage = MockStorage::new()
            .with_file("_meta.yaml", "index: Home\nguides: Guides\nblog:\n  title: Blog\n  type: page\n")
            .with_file("index.md", "# Welcome\n\nStart with the [guides](guides/setup.md).")
            .with_file("guides/setup.md", "---\ntitle: Setup\ndescription: First steps\n---\n\n## Install\n")
            .with_file("blog/index.md", "# Blog")
            .with_file(
                "blog/launch.md",
                "---\ntitle: Launch\ndate: 2024-05-01\ntags: [news]\n---\n:::warning\nunclosed\n",
            )
            .with_file("blog/wip.md", "---\ntitle: WIP\ndraft: true\n---\n");
        Site::load(&storage, SiteConfig::default()).unwrap()
    }

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_build_writes_site() {
        let site = site();
        let out = tempfile::tempdir().unwrap();
        let report = StaticSiteBuilder::new(&site, BuildConfig::default())
            .build(out.path())
            .unwrap();

        assert_eq!(
            report,
            BuildReport {
                pages: 4,
                listings: 1,
                tag_pages: 2,
                assets_copied: 0,
                warnings: 1,
            }
        );

        let home = read(&out.path().join("index.html"));
        assert!(home.contains("<h1 id=\"welcome\">Welcome</h1>"));
        assert!(home.contains(r#"href="/guides/setup/""#));

        let setup = read(&out.path().join("guides/setup/index.html"));
        assert!(setup.contains("<h1>Setup</h1>"));
        assert!(setup.contains("First steps"));

        let listing = read(&out.path().join("guides/index.html"));
        assert!(listing.contains(r#"<ul class="listing">"#));
        assert!(listing.contains(r#"<a href="/guides/setup/">Setup</a>"#));

        let launch = read(&out.path().join("blog/launch/index.html"));
        assert!(launch.contains(r#"<a href="/tags/news/">news</a>"#));
        assert!(launch.contains("callout-warning"));

        assert!(out.path().join("tags/index.html").exists());
        assert!(out.path().join("tags/news/index.html").exists());
        assert!(!out.path().join("blog/wip/index.html").exists());
        assert!(read(&out.path().join("404.html")).contains("Page not found"));
        let css = read(&out.path().join("assets/folio.css"));
        assert!(css.contains(".callout"));
        assert!(css.contains(".align-center { text-align: center; }"));
        assert!(!out.path().join("sitemap.xml").exists());
    }

    #[test]
    fn test_sitemap_with_site_url() {
        let site = site();
        let out = tempfile::tempdir().unwrap();
        let config = BuildConfig {
            site_url: Some("https://docs.example.com/".to_owned()),
            ..BuildConfig::default()
        };
        StaticSiteBuilder::new(&site, config)
            .build(out.path())
            .unwrap();

        let sitemap = read(&out.path().join("sitemap.xml"));
        assert!(sitemap.contains("<loc>https://docs.example.com/</loc>"));
        assert!(sitemap.contains(
            "<loc>https://docs.example.com/blog/launch/</loc><lastmod>2024-05-01</lastmod>"
        ));
        assert!(sitemap.contains("<loc>https://docs.example.com/guides/</loc>"));
        assert!(sitemap.contains("<loc>https://docs.example.com/tags/news/</loc>"));
    }

    #[test]
    fn test_clean_removes_stale_files() {
        let site = site();
        let out = tempfile::tempdir().unwrap();
        let stale = out.path().join("old/index.html");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "old").unwrap();

        StaticSiteBuilder::new(&site, BuildConfig::default())
            .build(out.path())
            .unwrap();
        assert!(stale.exists());

        let config = BuildConfig {
            clean: true,
            ..BuildConfig::default()
        };
        StaticSiteBuilder::new(&site, config)
            .build(out.path())
            .unwrap();
        assert!(!stale.exists());
        assert!(out.path().join("index.html").exists());
    }

    #[test]
    fn test_public_dir_copied() {
        let site = site();
        let public = tempfile::tempdir().unwrap();
        fs::create_dir_all(public.path().join("img")).unwrap();
        fs::write(public.path().join("img/logo.svg"), "<svg/>").unwrap();
        fs::write(public.path().join("robots.txt"), "User-agent: *").unwrap();
        fs::write(public.path().join(".well-known"), "x").unwrap();

        let out = tempfile::tempdir().unwrap();
        let config = BuildConfig {
            public_dir: Some(public.path().to_path_buf()),
            ..BuildConfig::default()
        };
        let report = StaticSiteBuilder::new(&site, config)
            .build(out.path())
            .unwrap();

        assert_eq!(report.assets_copied, 3);
        assert_eq!(read(&out.path().join("img/logo.svg")), "<svg/>");
        assert!(out.path().join("robots.txt").exists());
    }

    #[test]
    fn test_missing_public_dir_is_skipped() {
        let site = site();
        let out = tempfile::tempdir().unwrap();
        let config = BuildConfig {
            public_dir: Some(out.path().join("does-not-exist")),
            ..BuildConfig::default()
        };
        let report = StaticSiteBuilder::new(&site, config)
            .build(&out.path().join("site"))
            .unwrap();
        assert_eq!(report.assets_copied, 0);
    }

    #[test]
    fn test_output_equal_to_public_dir_refused() {
        let site = site();
        let public = tempfile::tempdir().unwrap();
        let logo = public.path().join("logo.svg");
        fs::write(&logo, "<svg/>").unwrap();

        let config = BuildConfig {
            public_dir: Some(public.path().to_path_buf()),
            clean: true,
            ..BuildConfig::default()
        };
        let err = StaticSiteBuilder::new(&site, config)
            .build(public.path())
            .unwrap_err();

        assert!(matches!(err, BuildError::OutputOverlap { .. }));
        assert_eq!(read(&logo), "<svg/>");
    }

    #[test]
    fn test_output_containing_source_dir_refused() {
        let site = site();
        let root = tempfile::tempdir().unwrap();
        let source = root.path().join("pages");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("index.md"), "# Home").unwrap();

        let config = BuildConfig {
            source_dir: Some(source.clone()),
            clean: true,
            ..BuildConfig::default()
        };
        let builder = StaticSiteBuilder::new(&site, config);
        assert!(matches!(
            builder.build(root.path()),
            Err(BuildError::OutputOverlap { .. })
        ));
        assert!(matches!(
            builder.build(&source.join("out")),
            Err(BuildError::OutputOverlap { .. })
        ));
        assert!(source.join("index.md").exists());
    }

    #[test]
    fn test_build_replacing_swaps_output() {
        let site = site();
        let root = tempfile::tempdir().unwrap();
        let out = root.path().join("site");
        let stale = out.join("old/index.html");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "old").unwrap();

        let report = StaticSiteBuilder::new(&site, BuildConfig::default())
            .build_replacing(&out)
            .unwrap();

        assert_eq!(report.pages, 4);
        assert!(!stale.exists());
        assert!(out.join("index.html").exists());
        assert!(!root.path().join(".site.staging").exists());
        assert!(!root.path().join(".site.previous").exists());
    }

    #[test]
    fn test_failed_replacing_build_keeps_previous_output() {
        let site = site();
        let root = tempfile::tempdir().unwrap();
        let out = root.path().join("site");
        StaticSiteBuilder::new(&site, BuildConfig::default())
            .build(&out)
            .unwrap();

        // A public file named like a page directory makes the page write fail.
        let public = root.path().join("public");
        fs::create_dir_all(&public).unwrap();
        fs::write(public.join("guides"), "not a directory").unwrap();
        let config = BuildConfig {
            public_dir: Some(public),
            ..BuildConfig::default()
        };
        let err = StaticSiteBuilder::new(&site, config)
            .build_replacing(&out)
            .unwrap_err();

        assert!(matches!(err, BuildError::Io { .. }));
        assert!(read(&out.join("index.html")).contains("Welcome"));
        assert!(out.join("guides/setup/index.html").exists());
        assert!(!root.path().join(".site.staging").exists());
    }

    #[test]
    fn test_sibling_dir() {
        assert_eq!(
            sibling_dir(Path::new("/srv/site"), "staging").unwrap(),
            PathBuf::from("/srv/.site.staging")
        );
        assert!(sibling_dir(Path::new("/"), "staging").is_err());
    }

    #[test]
    fn test_page_file() {
        let root = Path::new("out");
        assert_eq!(page_file(root, ""), PathBuf::from("out/index.html"));
        assert_eq!(page_file(root, "a/b"), PathBuf::from("out/a/b/index.html"));
    }
}
