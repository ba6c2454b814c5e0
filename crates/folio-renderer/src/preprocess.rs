//! Line-based source rewriting before Markdown parsing.
//!
//! - MDX only: top-level `import`/`export` statements and standalone
//!   `{/* … */}` comments are dropped.
//! - `<Callout type=".." emoji="..">` … `</Callout>` and `:::kind [title]` …
//!   `:::` become callout HTML blocks. The opening and closing markup sit on
//!   their own lines surrounded by blank lines, so the content in between is
//!   still parsed as Markdown.
//!
//! Nothing inside fenced code is touched.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::callout::{Callout, CalloutKind};
use crate::fence::FenceTracker;
use crate::state::escape_html;

static CALLOUT_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<Callout\b([^>]*)>(.*)$").unwrap());

static CALLOUT_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_][\w-]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|\{\s*["']([^"']*)["']\s*\})"#)
        .unwrap()
});

static CONTAINER_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:{3,}\s*([A-Za-z][\w-]*)\s*(.*)$").unwrap());

const CALLOUT_CLOSE: &str = "</Callout>";

/// Which syntax opened a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Opener {
    Jsx,
    Colons,
}

#[derive(Debug)]
struct OpenContainer {
    opener: Opener,
    line: usize,
}

/// Rewritten source plus the problems found on the way.
#[derive(Debug, Default)]
pub(crate) struct Preprocessed {
    pub text: String,
    pub warnings: Vec<String>,
}

/// Statement being skipped across lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Skipping {
    /// `import`/`export` with unbalanced braces.
    Statement(i32),
    /// `{/*` not yet closed by `*/}`.
    Comment,
}

struct Preprocessor {
    mdx: bool,
    fence: FenceTracker,
    stack: Vec<OpenContainer>,
    skipping: Option<Skipping>,
    lines: Vec<String>,
    warnings: Vec<String>,
}

pub(crate) fn preprocess(source: &str, mdx: bool) -> Preprocessed {
    let mut pre = Preprocessor {
        mdx,
        fence: FenceTracker::new(),
        stack: Vec::new(),
        skipping: None,
        lines: Vec::with_capacity(source.len() / 32),
        warnings: Vec::new(),
    };

    for (idx, line) in source.lines().enumerate() {
        pre.line(line, idx + 1);
    }
    pre.finish()
}

impl Preprocessor {
    fn line(&mut self, line: &str, line_num: usize) {
        if let Some(skipping) = self.skipping {
            self.continue_skip(skipping, line);
            return;
        }

        let was_in_fence = self.fence.in_fence();
        let is_fence_marker = self.fence.update(line);
        if was_in_fence || is_fence_marker {
            self.lines.push(line.to_owned());
            return;
        }

        if self.mdx && self.strip_mdx(line) {
            return;
        }

        let trimmed = line.trim();
        if let Some(caps) = CALLOUT_OPEN_RE.captures(trimmed) {
            let callout = callout_from_attrs(&caps[1]);
            self.open(Opener::Jsx, &callout, line_num);
            let rest = caps.get(2).map_or("", |m| m.as_str());
            self.jsx_rest(rest, line_num);
            return;
        }

        if let Some(before) = trimmed.strip_suffix(CALLOUT_CLOSE) {
            if !before.trim().is_empty() {
                self.lines.push(before.to_owned());
            }
            self.close(Opener::Jsx, trimmed, line_num);
            return;
        }

        if is_container_close(trimmed) {
            self.close(Opener::Colons, trimmed, line_num);
            return;
        }

        if let Some(caps) = CONTAINER_OPEN_RE.captures(trimmed) {
            let title = container_title(caps.get(2).map_or("", |m| m.as_str()));
            let callout = Callout::new(CalloutKind::parse(&caps[1])).with_title(title);
            self.open(Opener::Colons, &callout, line_num);
            return;
        }

        self.lines.push(line.to_owned());
    }

    /// Text after `<Callout …>` on the same line.
    fn jsx_rest(&mut self, rest: &str, line_num: usize) {
        let rest = rest.trim();
        if let Some(inner) = rest.strip_suffix(CALLOUT_CLOSE) {
            if !inner.trim().is_empty() {
                self.lines.push(inner.trim().to_owned());
            }
            self.close(Opener::Jsx, CALLOUT_CLOSE, line_num);
        } else if !rest.is_empty() {
            self.lines.push(rest.to_owned());
        }
    }

    /// Returns `true` if the line was consumed as MDX syntax.
    fn strip_mdx(&mut self, line: &str) -> bool {
        if self.stack.is_empty() && (line.starts_with("import ") || line.starts_with("export ")) {
            let depth = brace_balance(line);
            if depth > 0 {
                self.skipping = Some(Skipping::Statement(depth));
            }
            self.lines.push(String::new());
            return true;
        }

        let trimmed = line.trim();
        if trimmed.starts_with("{/*") {
            if !trimmed.ends_with("*/}") {
                self.skipping = Some(Skipping::Comment);
            }
            self.lines.push(String::new());
            return true;
        }
        false
    }

    fn continue_skip(&mut self, skipping: Skipping, line: &str) {
        self.lines.push(String::new());
        self.skipping = match skipping {
            Skipping::Statement(depth) => {
                let depth = depth + brace_balance(line);
                (depth > 0).then_some(Skipping::Statement(depth))
            }
            Skipping::Comment => (!line.trim_end().ends_with("*/}")).then_some(Skipping::Comment),
        };
    }

    fn open(&mut self, opener: Opener, callout: &Callout, line_num: usize) {
        self.lines.push(String::new());
        self.lines.push(callout.open_tag());
        self.lines.push(String::new());
        self.stack.push(OpenContainer {
            opener,
            line: line_num,
        });
    }

    fn close(&mut self, opener: Opener, original: &str, line_num: usize) {
        if self.stack.last().is_some_and(|open| open.opener == opener) {
            self.stack.pop();
            self.push_close();
            return;
        }

        let what = match opener {
            Opener::Jsx => CALLOUT_CLOSE,
            Opener::Colons => ":::",
        };
        self.warnings
            .push(format!("line {line_num}: stray {what} with no matching opening"));
        self.lines.push(escape_html(original));
    }

    fn push_close(&mut self) {
        self.lines.push(String::new());
        self.lines.push(Callout::close_tag().to_owned());
        self.lines.push(String::new());
    }

    fn finish(mut self) -> Preprocessed {
        while let Some(open) = self.stack.pop() {
            let what = match open.opener {
                Opener::Jsx => "<Callout>",
                Opener::Colons => ":::",
            };
            self.warnings.push(format!(
                "line {}: unclosed {what} (closed at end of document)",
                open.line
            ));
            self.push_close();
        }

        let mut text = self.lines.join("\n");
        text.push('\n');
        Preprocessed {
            text,
            warnings: self.warnings,
        }
    }
}

fn is_container_close(trimmed: &str) -> bool {
    trimmed.len() >= 3 && trimmed.chars().all(|c| c == ':')
}

/// `[Title]`, `"Title"` or bare `Title` after `:::kind`.
fn container_title(raw: &str) -> String {
    let raw = raw.trim();
    let unwrapped = raw
        .strip_prefix('[')
        .and_then(|r| r.strip_suffix(']'))
        .or_else(|| raw.strip_prefix('"').and_then(|r| r.strip_suffix('"')))
        .unwrap_or(raw);
    unwrapped.trim().to_owned()
}

fn callout_from_attrs(attrs: &str) -> Callout {
    let values: HashMap<&str, &str> = CALLOUT_ATTR_RE
        .captures_iter(attrs)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str();
            let value = caps.get(2).or(caps.get(3)).or(caps.get(4))?.as_str();
            Some((name, value))
        })
        .collect();

    let mut callout = Callout::new(CalloutKind::parse(values.get("type").copied().unwrap_or("")));
    if let Some(icon) = values.get("emoji").or(values.get("icon")) {
        callout = callout.with_icon(*icon);
    }
    if let Some(title) = values.get("title") {
        callout = callout.with_title(*title);
    }
    callout
}

#[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
fn brace_balance(line: &str) -> i32 {
    let open = line.matches('{').count() as i32;
    let close = line.matches('}').count() as i32;
    open - close
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn non_blank(text: &str) -> Vec<&str> {
        text.lines().filter(|l| !l.trim().is_empty()).collect()
    }

    #[test]
    fn test_plain_markdown_unchanged() {
        let out = preprocess("# Title\n\nText\n", false);
        assert_eq!(out.text, "# Title\n\nText\n");
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_mdx_imports_and_exports_removed() {
        let src = "import { Tabs } from 'nextra/components'\nexport const meta = {\n  a: 1,\n}\n\n# Title\n";
        let out = preprocess(src, true);
        assert_eq!(non_blank(&out.text), vec!["# Title"]);
    }

    #[test]
    fn test_imports_kept_for_plain_markdown() {
        let out = preprocess("import x from 'y'\n", false);
        assert_eq!(non_blank(&out.text), vec!["import x from 'y'"]);
    }

    #[test]
    fn test_mdx_comments_removed() {
        let src = "{/* single */}\nText\n{/* multi\nline */}\nMore\n";
        let out = preprocess(src, true);
        assert_eq!(non_blank(&out.text), vec!["Text", "More"]);
    }

    #[test]
    fn test_fenced_code_untouched() {
        let src = "```mdx\nimport x from 'y'\n<Callout>\n:::\n```\n";
        let out = preprocess(src, true);
        assert_eq!(out.text, src);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_jsx_callout_block() {
        let src = "<Callout type=\"warning\" emoji=\"🔥\">\nBe **careful**.\n</Callout>\n";
        let out = preprocess(src, true);
        let lines = non_blank(&out.text);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("callout-warning"));
        assert!(lines[0].contains("🔥"));
        assert_eq!(lines[1], "Be **careful**.");
        assert_eq!(lines[2], Callout::close_tag());
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_jsx_callout_single_line() {
        let out = preprocess("<Callout type='info'>Short note.</Callout>\n", true);
        let lines = non_blank(&out.text);
        assert!(lines[0].contains("callout-info"));
        assert_eq!(lines[1], "Short note.");
        assert_eq!(lines[2], Callout::close_tag());
    }

    #[test]
    fn test_jsx_callout_brace_attribute() {
        let out = preprocess("<Callout type={\"error\"}>\nx\n</Callout>\n", true);
        assert!(out.text.contains("callout-error"));
    }

    #[test]
    fn test_unknown_type_falls_back() {
        let out = preprocess("<Callout type=\"shiny\">\nx\n</Callout>\n", true);
        assert!(out.text.contains("callout-default"));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_colon_container_with_title() {
        let out = preprocess(":::important [Read this]\nBody\n:::\n", false);
        let lines = non_blank(&out.text);
        assert!(lines[0].contains("callout-important"));
        assert!(lines[0].contains("Read this"));
        assert_eq!(lines[1], "Body");
        assert_eq!(lines[2], Callout::close_tag());
    }

    #[test]
    fn test_nested_containers() {
        let src = ":::info\nOuter\n<Callout type=\"error\">\nInner\n</Callout>\n:::\n";
        let out = preprocess(src, true);
        let lines = non_blank(&out.text);
        assert!(lines[0].contains("callout-info"));
        assert!(lines[2].contains("callout-error"));
        assert_eq!(lines[4], Callout::close_tag());
        assert_eq!(lines[5], Callout::close_tag());
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_unclosed_container_closed_with_warning() {
        let out = preprocess("Intro\n:::warning\nNever closed\n", false);
        assert_eq!(non_blank(&out.text).last(), Some(&Callout::close_tag()));
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("line 2"));
        assert!(out.warnings[0].contains("unclosed"));
    }

    #[test]
    fn test_stray_closers_warn_and_stay_text() {
        let out = preprocess("Text\n:::\n</Callout>\n", true);
        assert_eq!(out.warnings.len(), 2);
        assert!(out.warnings[0].contains("line 2"));
        let lines = non_blank(&out.text);
        assert_eq!(lines, vec!["Text", ":::", "&lt;/Callout&gt;"]);
    }

    #[test]
    fn test_mismatched_closer_is_stray() {
        let out = preprocess("<Callout>\nx\n:::\n</Callout>\n", true);
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("stray :::"));
    }

    #[test]
    fn test_container_title_forms() {
        assert_eq!(container_title("[Heads up]"), "Heads up");
        assert_eq!(container_title("\"Quoted\""), "Quoted");
        assert_eq!(container_title(" bare words "), "bare words");
        assert_eq!(container_title(""), "");
    }
}
