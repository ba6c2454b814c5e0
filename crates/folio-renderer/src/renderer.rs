//! Markdown and MDX to HTML.

use std::collections::HashMap;
use std::fmt::Write;

use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::callout::Callout;
use crate::links::rewrite_link;
use crate::preprocess::preprocess;
use crate::state::{CodeBlockState, HeadingState, ImageState, TableState, TocEntry, escape_html};

/// Source dialect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SourceFormat {
    #[default]
    Markdown,
    /// Markdown plus `import`/`export` lines, `{/* */}` comments and
    /// `<Callout>` blocks.
    Mdx,
}

/// Result of rendering one document.
#[derive(Clone, Debug, Default)]
pub struct RenderResult {
    /// Rendered HTML fragment.
    pub html: String,
    /// Text of the first H1 heading.
    pub title: Option<String>,
    /// Table of contents entries.
    pub toc: Vec<TocEntry>,
    /// Non-fatal problems, e.g. unclosed callouts.
    pub warnings: Vec<String>,
}

/// Markdown renderer.
///
/// Configuration only; every [`render`](Self::render) call starts from fresh
/// state, so one renderer can be shared across threads.
#[derive(Clone, Debug)]
pub struct MarkdownRenderer {
    base_path: String,
    page_dir: String,
    toc_depth: u8,
}

impl MarkdownRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_path: "/".to_owned(),
            page_dir: String::new(),
            toc_depth: 3,
        }
    }

    /// URL prefix of the built site (starts and ends with `/`).
    #[must_use]
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Directory of the source file, relative to the content root.
    ///
    /// Relative Markdown links are resolved against it.
    #[must_use]
    pub fn with_page_dir(mut self, page_dir: impl Into<String>) -> Self {
        self.page_dir = page_dir.into();
        self
    }

    /// Deepest heading level included in the TOC.
    #[must_use]
    pub fn with_toc_depth(mut self, toc_depth: u8) -> Self {
        self.toc_depth = toc_depth;
        self
    }

    /// Parser options: GFM, footnotes and `{#id .class}` heading attributes.
    #[must_use]
    pub fn parser_options() -> Options {
        Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_GFM
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_HEADING_ATTRIBUTES
    }

    #[must_use]
    pub fn render(&self, source: &str, format: SourceFormat) -> RenderResult {
        let pre = preprocess(source, format == SourceFormat::Mdx);
        let mut writer = HtmlWriter::new(self);
        for event in Parser::new_ext(&pre.text, Self::parser_options()) {
            writer.process_event(event);
        }

        RenderResult {
            html: writer.output,
            title: writer.heading.take_title(),
            toc: writer.heading.take_toc(),
            warnings: pre.warnings,
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Per-document event processing state.
struct HtmlWriter<'r> {
    config: &'r MarkdownRenderer,
    output: String,
    code: CodeBlockState,
    table: TableState,
    image: ImageState,
    heading: HeadingState,
    pending_image: Option<(String, String)>,
    /// `true` for alerts, `false` for plain blockquotes.
    blockquote_stack: Vec<bool>,
    footnotes: HashMap<String, usize>,
}

impl<'r> HtmlWriter<'r> {
    fn new(config: &'r MarkdownRenderer) -> Self {
        Self {
            config,
            output: String::with_capacity(4096),
            code: CodeBlockState::default(),
            table: TableState::default(),
            image: ImageState::default(),
            heading: HeadingState::new(config.toc_depth),
            pending_image: None,
            blockquote_stack: Vec::new(),
            footnotes: HashMap::new(),
        }
    }

    /// Push content to output or heading buffer based on context.
    ///
    /// Markup inside image alt text is dropped.
    fn push_inline(&mut self, content: &str) {
        if self.image.is_active() {
            return;
        }
        if self.heading.is_active() {
            self.heading.push_html(content);
        } else {
            self.output.push_str(content);
        }
    }

    fn link(&self, url: &str) -> String {
        rewrite_link(url, &self.config.page_dir, &self.config.base_path)
    }

    /// Footnote number, assigned on first sight of the label.
    fn footnote_number(&mut self, label: &str) -> usize {
        let next = self.footnotes.len() + 1;
        *self.footnotes.entry(label.to_owned()).or_insert(next)
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) => self.output.push_str(&html),
            Event::InlineHtml(html) => self.push_inline(&html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => self.push_inline("<br>"),
            Event::Rule => self.output.push_str("<hr>"),
            Event::TaskListMarker(checked) => {
                self.output.push_str(if checked {
                    r#"<input type="checkbox" disabled checked> "#
                } else {
                    r#"<input type="checkbox" disabled> "#
                });
            }
            Event::FootnoteReference(label) => self.footnote_reference(&label),
            Event::InlineMath(_) | Event::DisplayMath(_) => {
                // Math options are not enabled
            }
        }
    }

    #[allow(clippy::too_many_lines)]
    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.output.push_str("<p>"),
            Tag::Heading {
                level, id, classes, ..
            } => {
                // Opening tag is written in end_tag once the id is known
                self.heading.start(
                    heading_level_to_num(level),
                    id.map(|id| id.to_string()),
                    classes.iter().map(ToString::to_string).collect(),
                );
            }
            Tag::BlockQuote(kind) => {
                if let Some(kind) = kind {
                    self.blockquote_stack.push(true);
                    self.output.push_str(&Callout::from_alert(kind).open_tag());
                } else {
                    self.blockquote_stack.push(false);
                    self.output.push_str("<blockquote>");
                }
            }
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(|lang| lang.trim_matches(|c| c == '{' || c == '}').to_owned())
                        .filter(|lang| !lang.is_empty()),
                    CodeBlockKind::Indented => None,
                };
                self.code.start(lang);
            }
            Tag::List(start) => match start {
                Some(1) => self.output.push_str("<ol>"),
                Some(n) => {
                    let _ = write!(self.output, r#"<ol start="{n}">"#);
                }
                None => self.output.push_str("<ul>"),
            },
            Tag::Item => self.output.push_str("<li>"),
            Tag::FootnoteDefinition(label) => {
                let number = self.footnote_number(&label);
                let id = escape_html(&label);
                let _ = write!(
                    self.output,
                    r##"<div class="footnote-definition" id="fn-{id}"><sup class="footnote-label"><a href="#fnref-{id}">{number}</a></sup>"##
                );
            }
            Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
            Tag::DefinitionList => self.output.push_str("<dl>"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::Table(alignments) => {
                self.table.start(alignments);
                self.output.push_str("<table>");
            }
            Tag::TableHead => {
                self.table.start_head();
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                self.table.start_row();
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let _ = write!(
                    self.output,
                    "<{}{}>",
                    self.table.cell_tag(),
                    self.table.alignment_class()
                );
            }
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            Tag::Strikethrough => self.push_inline("<del>"),
            Tag::Superscript => self.push_inline("<sup>"),
            Tag::Subscript => self.push_inline("<sub>"),
            Tag::Link {
                dest_url, title, ..
            } => {
                let href = self.link(&dest_url);
                let mut link_tag = format!(r#"<a href="{}""#, escape_html(&href));
                if !title.is_empty() {
                    let _ = write!(link_tag, r#" title="{}""#, escape_html(&title));
                }
                link_tag.push('>');
                self.push_inline(&link_tag);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                // Alt text is collected until the end tag
                self.image.start();
                if self.pending_image.is_none() {
                    self.pending_image = Some((self.link(&dest_url), title.to_string()));
                }
            }
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>"),
            TagEnd::Heading(_) => {
                if let Some(heading) = self.heading.complete() {
                    let class_attr = if heading.classes.is_empty() {
                        String::new()
                    } else {
                        format!(r#" class="{}""#, escape_html(&heading.classes.join(" ")))
                    };
                    let _ = write!(
                        self.output,
                        r#"<h{level} id="{id}"{class_attr}>{html}</h{level}>"#,
                        level = heading.level,
                        id = escape_html(&heading.id),
                        html = heading.html,
                    );
                }
            }
            TagEnd::BlockQuote(_) => {
                if self.blockquote_stack.pop() == Some(true) {
                    self.output.push_str(Callout::close_tag());
                } else {
                    self.output.push_str("</blockquote>");
                }
            }
            TagEnd::CodeBlock => {
                let (lang, content) = self.code.end();
                match lang {
                    Some(lang) => {
                        let _ = write!(
                            self.output,
                            r#"<pre><code class="language-{}">{}</code></pre>"#,
                            escape_html(&lang),
                            escape_html(&content)
                        );
                    }
                    None => {
                        let _ = write!(
                            self.output,
                            "<pre><code>{}</code></pre>",
                            escape_html(&content)
                        );
                    }
                }
            }
            TagEnd::List(ordered) => self.output.push_str(if ordered { "</ol>" } else { "</ul>" }),
            TagEnd::Item => self.output.push_str("</li>"),
            TagEnd::FootnoteDefinition => self.output.push_str("</div>"),
            TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
            TagEnd::DefinitionList => self.output.push_str("</dl>"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>"),
            TagEnd::Table => self.output.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.output.push_str("</tr></thead><tbody>");
                self.table.end_head();
            }
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => {
                let _ = write!(self.output, "</{}>", self.table.cell_tag());
                self.table.next_cell();
            }
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</del>"),
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
            TagEnd::Link => self.push_inline("</a>"),
            TagEnd::Image => {
                if let Some(alt) = self.image.end()
                    && let Some((src, title)) = self.pending_image.take()
                {
                    let mut img = format!(r#"<img src="{}""#, escape_html(&src));
                    if !title.is_empty() {
                        let _ = write!(img, r#" title="{}""#, escape_html(&title));
                    }
                    let _ = write!(img, r#" alt="{}">"#, escape_html(&alt));
                    self.push_inline(&img);
                }
            }
        }
    }

    fn text(&mut self, text: &str) {
        if self.code.is_active() {
            self.code.push_str(text);
        } else if self.image.is_active() {
            self.image.push_str(text);
        } else if self.heading.is_active() {
            self.heading.push_text(text);
            self.heading.push_html(&escape_html(text));
        } else {
            self.output.push_str(&escape_html(text));
        }
    }

    fn inline_code(&mut self, code: &str) {
        if self.image.is_active() {
            self.image.push_str(code);
            return;
        }
        self.heading.push_text(code);
        let html = format!("<code>{}</code>", escape_html(code));
        self.push_inline(&html);
    }

    fn soft_break(&mut self) {
        if self.image.is_active() {
            self.image.push_str(" ");
        } else if self.heading.is_active() {
            self.heading.push_text(" ");
            self.heading.push_html("\n");
        } else {
            self.output.push('\n');
        }
    }

    fn footnote_reference(&mut self, label: &CowStr<'_>) {
        let number = self.footnote_number(label);
        let id = escape_html(label);
        let html = format!(
            r##"<sup class="footnote-reference" id="fnref-{id}"><a href="#fn-{id}">{number}</a></sup>"##
        );
        self.push_inline(&html);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn render(markdown: &str) -> RenderResult {
        MarkdownRenderer::new().render(markdown, SourceFormat::Markdown)
    }

    fn render_mdx(markdown: &str) -> RenderResult {
        MarkdownRenderer::new().render(markdown, SourceFormat::Mdx)
    }

    #[test]
    fn test_basic_paragraph() {
        assert_eq!(render("Hello, world!").html, "<p>Hello, world!</p>");
    }

    #[test]
    fn test_heading_with_id_and_toc() {
        let result = render("## Section Title");
        assert_eq!(result.html, r#"<h2 id="section-title">Section Title</h2>"#);
        assert_eq!(
            result.toc,
            vec![TocEntry {
                level: 2,
                title: "Section Title".to_owned(),
                id: "section-title".to_owned(),
            }]
        );
    }

    #[test]
    fn test_title_extracted_and_rendered() {
        let result = render("# My Title\n\nSome content\n\n## Section");
        assert_eq!(result.title.as_deref(), Some("My Title"));
        assert!(result.html.contains(r#"<h1 id="my-title">My Title</h1>"#));
        assert_eq!(result.toc.len(), 1);
    }

    #[test]
    fn test_heading_attributes() {
        let result = render("## Install {#setup .wide}\n\n## Setup");
        assert!(
            result
                .html
                .contains(r#"<h2 id="setup" class="wide">Install</h2>"#),
            "{}",
            result.html
        );
        assert_eq!(result.toc[1].id, "setup-1");
    }

    #[test]
    fn test_toc_depth() {
        let markdown = "## Two\n\n### Three\n\n#### Four";
        let default = render(markdown);
        assert_eq!(default.toc.len(), 2);
        let deep = MarkdownRenderer::new()
            .with_toc_depth(4)
            .render(markdown, SourceFormat::Markdown);
        assert_eq!(deep.toc.len(), 3);
    }

    #[test]
    fn test_heading_with_inline_code() {
        let result = render("## Install `npm`");
        assert!(result.html.contains("<code>npm</code>"));
        assert_eq!(result.toc[0].title, "Install npm");
        assert_eq!(result.toc[0].id, "install-npm");
    }

    #[test]
    fn test_code_block() {
        let result = render("```rust\nfn main() { println!(\"<hi>\"); }\n```");
        assert_eq!(
            result.html,
            "<pre><code class=\"language-rust\">fn main() { println!(&quot;&lt;hi&gt;&quot;); }\n</code></pre>"
        );
    }

    #[test]
    fn test_alerts_become_callouts() {
        let result = render("> [!CAUTION]\n> Dangerous **operation**.");
        assert!(result.html.contains("callout callout-error"), "{}", result.html);
        assert!(result.html.contains(r#"<p class="callout-title">Caution</p>"#));
        assert!(result.html.contains("<strong>operation</strong>"));
        assert!(result.html.ends_with("</div></div>"));
        assert!(!result.html.contains("<blockquote>"));
    }

    #[test]
    fn test_regular_blockquote() {
        let result = render("> Just a quote");
        assert_eq!(result.html, "<blockquote><p>Just a quote</p></blockquote>");
    }

    #[test]
    fn test_container_callout() {
        let result = render(":::warning Heads up\nMind the **gap**.\n:::\n");
        assert!(result.html.contains("callout-warning"), "{}", result.html);
        assert!(result.html.contains("Heads up"));
        assert!(result.html.contains("<p>Mind the <strong>gap</strong>.</p>"));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_mdx_callout_and_imports() {
        let source = "import { Callout } from 'nextra/components'\n\n# Page\n\n<Callout type=\"info\" emoji=\"🔔\">\nRemember **this**.\n</Callout>\n";
        let result = render_mdx(source);
        assert_eq!(result.title.as_deref(), Some("Page"));
        assert!(!result.html.contains("import"));
        assert!(result.html.contains("callout-info"));
        assert!(result.html.contains("🔔"));
        assert!(
            result.html.contains("<p>Remember <strong>this</strong>.</p>"),
            "{}",
            result.html
        );
    }

    #[test]
    fn test_markdown_keeps_import_lines() {
        let result = render("import x from 'y'");
        assert_eq!(result.html, "<p>import x from &#39;y&#39;</p>");
    }

    #[test]
    fn test_unclosed_callout_warns() {
        let result = render(":::info\nOpen forever");
        assert_eq!(result.warnings.len(), 1);
        assert!(
            result.html.trim_end().ends_with("</div></div>"),
            "{}",
            result.html
        );
    }

    #[test]
    fn test_links_rewritten() {
        let result = MarkdownRenderer::new()
            .with_base_path("/docs/")
            .with_page_dir("guide")
            .render(
                "[Setup](./setup.md#install) [Home](../index.md) [Ext](https://x.org/a.md)",
                SourceFormat::Markdown,
            );
        assert!(result.html.contains(r#"href="/docs/guide/setup/#install""#));
        assert!(result.html.contains(r#"href="/docs/""#));
        assert!(result.html.contains(r#"href="https://x.org/a.md""#));
    }

    #[test]
    fn test_link_in_heading() {
        let result = render("## See [API](api.md)");
        assert_eq!(
            result.html,
            r#"<h2 id="see-api">See <a href="/api/">API</a></h2>"#
        );
    }

    #[test]
    fn test_image() {
        let result = MarkdownRenderer::new()
            .with_base_path("/docs/")
            .render(r#"![Logo *mark*](/img/logo.png "The logo")"#, SourceFormat::Markdown);
        assert_eq!(
            result.html,
            r#"<p><img src="/docs/img/logo.png" title="The logo" alt="Logo mark"></p>"#
        );
    }

    #[test]
    fn test_table_alignment() {
        let result = render("| A | B | C | D |\n|:--|--:|:-:|---|\n| 1 | 2 | 3 | 4 |");
        assert_eq!(
            result.html,
            concat!(
                r#"<table><thead><tr><th class="align-left">A</th><th class="align-right">B</th>"#,
                r#"<th class="align-center">C</th><th>D</th></tr></thead>"#,
                r#"<tbody><tr><td class="align-left">1</td><td class="align-right">2</td>"#,
                r#"<td class="align-center">3</td><td>4</td></tr></tbody></table>"#
            )
        );
        assert!(!result.html.contains("style="));
    }

    #[test]
    fn test_task_list() {
        let result = render("- [x] Done\n- [ ] Todo");
        assert!(result.html.contains(r#"<input type="checkbox" disabled checked> Done"#));
        assert!(result.html.contains(r#"<input type="checkbox" disabled> Todo"#));
    }

    #[test]
    fn test_strikethrough_and_emphasis() {
        let result = render("~~old~~ *new* **bold**");
        assert_eq!(
            result.html,
            "<p><del>old</del> <em>new</em> <strong>bold</strong></p>"
        );
    }

    #[test]
    fn test_footnotes() {
        let result = render("Claim[^src].\n\n[^src]: Source.");
        assert!(
            result
                .html
                .contains(r##"<sup class="footnote-reference" id="fnref-src"><a href="#fn-src">1</a></sup>"##),
            "{}",
            result.html
        );
        assert!(result.html.contains(r#"id="fn-src""#));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_raw_html_passes_through() {
        let result = render("<div class=\"hero\">Hi</div>\n\nText <kbd>K</kbd>");
        assert!(result.html.contains("<div class=\"hero\">Hi</div>"));
        assert!(result.html.contains("<kbd>K</kbd>"));
    }
}
