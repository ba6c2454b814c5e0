//! Parsed content items.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use chrono::NaiveDate;
use folio_storage::{SourceFile, SourceKind};
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::ContentError;
use crate::front_matter::{self, FrontMatter, parse_date};

/// A page or post with its resolved metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct ContentItem {
    /// URL path without slashes at either end (`""` for the home page).
    pub path: String,
    /// Source file relative to the content root.
    pub source: PathBuf,
    /// Markdown or MDX.
    pub kind: SourceKind,
    /// Resolved title: front matter first, then the first `# Heading`.
    pub title: String,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub tags: Vec<String>,
    pub draft: bool,
    /// Front matter keys without a dedicated field.
    pub extra: BTreeMap<String, serde_json::Value>,
    /// Body text after the front matter block.
    pub body: String,
}

impl ContentItem {
    /// Parse a source file's text into an item.
    ///
    /// # Errors
    ///
    /// Returns a [`ContentError`] naming `file.path` when the front matter is
    /// unterminated or invalid, the date is unparseable, or no title can be
    /// resolved.
    pub fn parse(file: &SourceFile, text: &str) -> Result<Self, ContentError> {
        let path = || file.path.clone();

        let sections =
            front_matter::split(text).ok_or_else(|| ContentError::UnterminatedFrontMatter {
                path: path(),
            })?;

        let front = match sections.yaml {
            Some(yaml) => {
                FrontMatter::from_yaml(yaml).map_err(|e| ContentError::InvalidFrontMatter {
                    path: path(),
                    message: e.to_string(),
                })?
            }
            None => FrontMatter::default(),
        };

        let date = match front.date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(parse_date(value).ok_or_else(|| ContentError::InvalidDate {
                path: path(),
                value: value.to_owned(),
            })?),
        };

        let title = non_blank(front.title)
            .or_else(|| first_heading(sections.body))
            .ok_or_else(|| ContentError::MissingTitle { path: path() })?;

        Ok(Self {
            path: url_path_for(&file.path),
            source: file.path.clone(),
            kind: file.kind,
            title,
            description: non_blank(front.description),
            date,
            tags: front.tags.map(front_matter::Tags::normalize).unwrap_or_default(),
            draft: front.draft,
            extra: front.extra,
            body: sections.body.to_owned(),
        })
    }

    /// Last URL segment (`""` for the home page).
    #[must_use]
    pub fn slug(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or_default()
    }

    /// Whether the item is a directory's `index` file.
    #[must_use]
    pub fn is_index(&self) -> bool {
        self.source
            .file_stem()
            .is_some_and(|stem| stem.eq_ignore_ascii_case("index"))
    }

    /// Whether the source is MDX.
    #[must_use]
    pub fn is_mdx(&self) -> bool {
        self.kind == SourceKind::Mdx
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Plain text of the first level-one heading.
#[must_use]
pub fn first_heading(body: &str) -> Option<String> {
    let options = Options::ENABLE_HEADING_ATTRIBUTES | Options::ENABLE_STRIKETHROUGH;
    let mut in_h1 = false;
    let mut text = String::new();

    for event in Parser::new_ext(body, options) {
        match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) => in_h1 = true,
            Event::End(TagEnd::Heading(HeadingLevel::H1)) => {
                let title = text.trim();
                if !title.is_empty() {
                    return Some(title.to_owned());
                }
                in_h1 = false;
                text.clear();
            }
            Event::Text(t) | Event::Code(t) if in_h1 => text.push_str(&t),
            _ => {}
        }
    }
    None
}

/// Map a source path to its URL path.
///
/// `index` files stand for their directory; other files drop the extension:
/// `index.md` → `""`, `blog/index.mdx` → `"blog"`, `blog/kafka.md` → `"blog/kafka"`.
#[must_use]
pub fn url_path_for(source: &Path) -> String {
    let mut segments: Vec<String> = source
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if let Some(last) = segments.pop() {
        let stem = Path::new(&last)
            .file_stem()
            .map_or_else(|| last.clone(), |s| s.to_string_lossy().into_owned());
        if !stem.eq_ignore_ascii_case("index") {
            segments.push(stem);
        }
    }
    segments.join("/")
}

/// Public URL of a page: `base_path` + `path` + `/`.
///
/// `base_path` must start and end with `/`.
#[must_use]
pub fn page_href(base_path: &str, path: &str) -> String {
    if path.is_empty() {
        base_path.to_owned()
    } else {
        format!("{base_path}{path}/")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn md(path: &str) -> SourceFile {
        SourceFile::new(path, SourceKind::Markdown)
    }

    #[test]
    fn test_parse_full_front_matter() {
        let text = "---\ntitle: Consumer groups\ndescription: How rebalancing works\ndate: 2024-03-01\ntags: kafka, streaming\nseries: kafka-101\n---\n# Ignored heading\n\nBody.\n";
        let item = ContentItem::parse(&md("blog/consumer-groups.md"), text).unwrap();

        assert_eq!(item.path, "blog/consumer-groups");
        assert_eq!(item.title, "Consumer groups");
        assert_eq!(item.description.as_deref(), Some("How rebalancing works"));
        assert_eq!(item.date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(item.tags, vec!["kafka", "streaming"]);
        assert!(!item.draft);
        assert_eq!(item.extra.get("series"), Some(&serde_json::json!("kafka-101")));
        assert_eq!(item.body, "# Ignored heading\n\nBody.\n");
        assert_eq!(item.slug(), "consumer-groups");
    }

    #[test]
    fn test_title_from_first_heading() {
        let item = ContentItem::parse(&md("guide.md"), "Intro text\n\n# Using `folio`\n").unwrap();
        assert_eq!(item.title, "Using folio");
    }

    #[test]
    fn test_blank_title_falls_back_to_heading() {
        let item = ContentItem::parse(&md("guide.md"), "---\ntitle: '  '\n---\n# Guide\n").unwrap();
        assert_eq!(item.title, "Guide");
    }

    #[test]
    fn test_heading_attributes_not_in_title() {
        let item = ContentItem::parse(&md("guide.md"), "# Guide {#start}\n").unwrap();
        assert_eq!(item.title, "Guide");
    }

    #[test]
    fn test_missing_title() {
        let err = ContentError::MissingTitle {
            path: PathBuf::from("notes.md"),
        };
        let result = ContentItem::parse(&md("notes.md"), "## Only a subsection\n");
        assert_eq!(result.unwrap_err().to_string(), err.to_string());
    }

    #[test]
    fn test_unterminated_front_matter() {
        let result = ContentItem::parse(&md("a.md"), "---\ntitle: A\n# A\n");
        assert!(matches!(
            result,
            Err(ContentError::UnterminatedFrontMatter { .. })
        ));
    }

    #[test]
    fn test_invalid_front_matter() {
        let result = ContentItem::parse(&md("a.md"), "---\ntitle: [oops\n---\n");
        let err = result.unwrap_err();
        assert!(matches!(err, ContentError::InvalidFrontMatter { .. }));
        assert_eq!(err.path(), Path::new("a.md"));
    }

    #[test]
    fn test_invalid_date() {
        let result = ContentItem::parse(&md("a.md"), "---\ntitle: A\ndate: next week\n---\n");
        match result {
            Err(ContentError::InvalidDate { value, .. }) => assert_eq!(value, "next week"),
            other => panic!("expected InvalidDate, got {other:?}"),
        }
    }

    #[test]
    fn test_draft_flag() {
        let item = ContentItem::parse(&md("a.md"), "---\ntitle: A\ndraft: true\n---\n").unwrap();
        assert!(item.draft);
    }

    #[test]
    fn test_index_items() {
        let root = ContentItem::parse(&md("index.md"), "# Home").unwrap();
        assert_eq!(root.path, "");
        assert_eq!(root.slug(), "");
        assert!(root.is_index());

        let blog = ContentItem::parse(&SourceFile::new("blog/index.mdx", SourceKind::Mdx), "# Blog")
            .unwrap();
        assert_eq!(blog.path, "blog");
        assert!(blog.is_index());
        assert!(blog.is_mdx());
    }

    #[test]
    fn test_url_path_for() {
        assert_eq!(url_path_for(Path::new("index.md")), "");
        assert_eq!(url_path_for(Path::new("about.mdx")), "about");
        assert_eq!(url_path_for(Path::new("a/b.mdx")), "a/b");
        assert_eq!(url_path_for(Path::new("a/index.md")), "a");
        assert_eq!(url_path_for(Path::new("a/b/INDEX.md")), "a/b");
    }

    #[test]
    fn test_page_href() {
        assert_eq!(page_href("/", ""), "/");
        assert_eq!(page_href("/", "a/b"), "/a/b/");
        assert_eq!(page_href("/docs/", "guide"), "/docs/guide/");
    }
}
