//! Per-document rendering state.

use std::collections::HashSet;

use pulldown_cmark::Alignment;

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocEntry {
    /// Heading level (2-6).
    pub level: u8,
    /// Heading text.
    pub title: String,
    /// Anchor id.
    pub id: String,
}

/// Escape text for HTML content and attribute values.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Anchor id for heading text.
///
/// Lowercases, keeps letters and digits, turns runs of anything else into a
/// single `-`. Text without any letters or digits yields `section`.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "section".to_owned()
    } else {
        slug
    }
}

/// Heading being collected.
#[derive(Debug)]
struct OpenHeading {
    level: u8,
    explicit_id: Option<String>,
    classes: Vec<String>,
    text: String,
    html: String,
}

/// Completed heading, ready to write.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Heading {
    pub level: u8,
    pub id: String,
    pub classes: Vec<String>,
    pub html: String,
}

/// Heading ids, table of contents and title extraction.
#[derive(Debug)]
pub(crate) struct HeadingState {
    open: Option<OpenHeading>,
    used_ids: HashSet<String>,
    toc: Vec<TocEntry>,
    title: Option<String>,
    toc_depth: u8,
}

impl HeadingState {
    pub(crate) fn new(toc_depth: u8) -> Self {
        Self {
            open: None,
            used_ids: HashSet::new(),
            toc: Vec::new(),
            title: None,
            toc_depth,
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.open.is_some()
    }

    pub(crate) fn start(&mut self, level: u8, explicit_id: Option<String>, classes: Vec<String>) {
        self.open = Some(OpenHeading {
            level,
            explicit_id,
            classes,
            text: String::new(),
            html: String::new(),
        });
    }

    /// Plain text (for ids, the title and the TOC).
    pub(crate) fn push_text(&mut self, text: &str) {
        if let Some(open) = &mut self.open {
            open.text.push_str(text);
        }
    }

    /// Rendered inline HTML.
    pub(crate) fn push_html(&mut self, html: &str) {
        if let Some(open) = &mut self.open {
            open.html.push_str(html);
        }
    }

    /// Close the open heading, assigning a unique id.
    ///
    /// An explicit `{#id}` is kept as written; generated ids get `-1`, `-2`
    /// suffixes on repeats.
    pub(crate) fn complete(&mut self) -> Option<Heading> {
        let open = self.open.take()?;
        let text = open.text.trim().to_owned();

        let id = match open.explicit_id {
            Some(id) => id,
            None => self.unique_id(&slugify(&text)),
        };
        self.used_ids.insert(id.clone());

        if open.level == 1 && self.title.is_none() && !text.is_empty() {
            self.title = Some(text.clone());
        } else if (2..=self.toc_depth).contains(&open.level) {
            self.toc.push(TocEntry {
                level: open.level,
                title: text,
                id: id.clone(),
            });
        }

        Some(Heading {
            level: open.level,
            id,
            classes: open.classes,
            html: open.html.trim().to_owned(),
        })
    }

    fn unique_id(&self, base: &str) -> String {
        if !self.used_ids.contains(base) {
            return base.to_owned();
        }
        (1..)
            .map(|n| format!("{base}-{n}"))
            .find(|candidate| !self.used_ids.contains(candidate))
            .unwrap_or_else(|| base.to_owned())
    }

    pub(crate) fn take_title(&mut self) -> Option<String> {
        self.title.take()
    }

    pub(crate) fn take_toc(&mut self) -> Vec<TocEntry> {
        std::mem::take(&mut self.toc)
    }
}

/// Table alignment and header tracking.
#[derive(Debug, Default)]
pub(crate) struct TableState {
    alignments: Vec<Alignment>,
    in_head: bool,
    cell: usize,
}

impl TableState {
    pub(crate) fn start(&mut self, alignments: Vec<Alignment>) {
        self.alignments = alignments;
        self.in_head = false;
        self.cell = 0;
    }

    pub(crate) fn start_head(&mut self) {
        self.in_head = true;
        self.cell = 0;
    }

    pub(crate) fn end_head(&mut self) {
        self.in_head = false;
    }

    pub(crate) fn start_row(&mut self) {
        self.cell = 0;
    }

    pub(crate) fn next_cell(&mut self) {
        self.cell += 1;
    }

    pub(crate) fn is_in_head(&self) -> bool {
        self.in_head
    }

    pub(crate) fn cell_tag(&self) -> &'static str {
        if self.in_head { "th" } else { "td" }
    }

    /// ` class="align-…"` for the current cell, or nothing.
    ///
    /// No inline `style` attributes: the preview server's CSP blocks them.
    pub(crate) fn alignment_class(&self) -> &'static str {
        match self.alignments.get(self.cell) {
            Some(Alignment::Left) => r#" class="align-left""#,
            Some(Alignment::Center) => r#" class="align-center""#,
            Some(Alignment::Right) => r#" class="align-right""#,
            Some(Alignment::None) | None => "",
        }
    }
}

/// Fenced/indented code block being collected.
#[derive(Debug, Default)]
pub(crate) struct CodeBlockState {
    active: bool,
    lang: Option<String>,
    content: String,
}

impl CodeBlockState {
    pub(crate) fn start(&mut self, lang: Option<String>) {
        self.active = true;
        self.lang = lang;
        self.content.clear();
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.content.push_str(text);
    }

    pub(crate) fn end(&mut self) -> (Option<String>, String) {
        self.active = false;
        (self.lang.take(), std::mem::take(&mut self.content))
    }
}

/// Image alt text being collected.
#[derive(Debug, Default)]
pub(crate) struct ImageState {
    depth: usize,
    alt: String,
}

impl ImageState {
    pub(crate) fn start(&mut self) {
        if self.depth == 0 {
            self.alt.clear();
        }
        self.depth += 1;
    }

    pub(crate) fn is_active(&self) -> bool {
        self.depth > 0
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.alt.push_str(text);
    }

    /// Returns the alt text once the outermost image closes.
    pub(crate) fn end(&mut self) -> Option<String> {
        self.depth = self.depth.saturating_sub(1);
        (self.depth == 0).then(|| std::mem::take(&mut self.alt))
    }
}
