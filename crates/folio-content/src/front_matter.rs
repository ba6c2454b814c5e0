//! YAML front matter at the top of content files.
//!
//! ```text
//! ---
//! title: Kafka consumer groups
//! date: 2024-03-01
//! tags: [kafka, streaming]
//! ---
//! Body starts here.
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;

/// Raw front matter fields as written by the author.
#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    /// Page title (overrides the first `# Heading`).
    pub title: Option<String>,
    /// Short summary used in listings and `<meta name="description">`.
    pub description: Option<String>,
    /// Publication date, unparsed.
    pub date: Option<String>,
    /// Tags as a list or a comma-separated string.
    pub tags: Option<Tags>,
    /// Drafts are only built when drafts are included.
    pub draft: bool,
    /// Every other key.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// The two accepted spellings of `tags`.
#[derive(Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Tags {
    /// `tags: [a, b]`
    List(Vec<String>),
    /// `tags: a, b`
    Csv(String),
}

impl Tags {
    /// Trimmed, non-empty tags with duplicates removed (first occurrence wins).
    #[must_use]
    pub fn normalize(self) -> Vec<String> {
        let raw = match self {
            Self::List(list) => list,
            Self::Csv(csv) => csv.split(',').map(str::to_owned).collect(),
        };

        let mut tags: Vec<String> = Vec::with_capacity(raw.len());
        for tag in &raw {
            let tag = tag.trim();
            if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_owned());
            }
        }
        tags
    }
}

impl FrontMatter {
    /// Parse the YAML between the delimiters. Blank input yields defaults.
    pub(crate) fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }
}

/// A source file cut into its front matter block and body.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Sections<'a> {
    pub yaml: Option<&'a str>,
    pub body: &'a str,
}

/// Split off a leading `---` block.
///
/// The block must start on the first line. It ends at the next line that is
/// exactly `---` (or `...`). Returns `None` when the closing line is missing.
pub(crate) fn split(text: &str) -> Option<Sections<'_>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.split_inclusive('\n');

    let opens = lines.next().is_some_and(|line| line.trim_end() == "---");
    if !opens {
        return Some(Sections {
            yaml: None,
            body: text,
        });
    }

    let start = text.find('\n').map_or(text.len(), |i| i + 1);
    let mut offset = start;
    for line in lines {
        if matches!(line.trim_end(), "---" | "...") {
            return Some(Sections {
                yaml: Some(&text[start..offset]),
                body: &text[offset + line.len()..],
            });
        }
        offset += line.len();
    }
    None
}

/// Parse a front matter date.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM[:SS]` (also with `T`) and RFC 3339.
/// The time of day is dropped.
#[must_use]
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ];

    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}
