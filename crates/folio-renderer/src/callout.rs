//! Callout boxes.
//!
//! A callout is a styled container with a severity, an icon and child
//! content. Three source syntaxes end up here: `<Callout>` blocks in MDX,
//! `:::kind` containers and GitHub alerts (`> [!NOTE]`).
//!
//! Markup:
//!
//! ```html
//! <div class="callout callout-warning" role="note">
//!   <span class="callout-icon" aria-hidden="true">⚠️</span>
//!   <div class="callout-body"><p class="callout-title">Heads up</p>…</div>
//! </div>
//! ```
//!
//! The opening markup is always a single line so it can be spliced into
//! Markdown as an HTML block.

use std::fmt::Write;

use pulldown_cmark::BlockQuoteKind;

use crate::state::escape_html;

/// Callout severity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CalloutKind {
    #[default]
    Default,
    Info,
    Warning,
    Error,
    Important,
}

impl CalloutKind {
    pub const ALL: [Self; 5] = [
        Self::Default,
        Self::Info,
        Self::Warning,
        Self::Error,
        Self::Important,
    ];

    /// Parse a severity name, case-insensitively.
    ///
    /// GitHub alert names are accepted too (`note`, `tip`, `caution`).
    /// Anything unrecognized is [`CalloutKind::Default`].
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "info" | "note" => Self::Info,
            "warning" => Self::Warning,
            "error" | "caution" => Self::Error,
            "important" => Self::Important,
            _ => Self::Default,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Important => "important",
        }
    }

    /// Icon used when the author gives none.
    #[must_use]
    pub fn default_icon(self) -> &'static str {
        match self {
            Self::Default => "💡",
            Self::Info => "ℹ️",
            Self::Warning => "⚠️",
            Self::Error => "🚫",
            Self::Important => "❗",
        }
    }
}

impl From<BlockQuoteKind> for CalloutKind {
    fn from(kind: BlockQuoteKind) -> Self {
        match kind {
            BlockQuoteKind::Note => Self::Info,
            BlockQuoteKind::Tip => Self::Default,
            BlockQuoteKind::Important => Self::Important,
            BlockQuoteKind::Warning => Self::Warning,
            BlockQuoteKind::Caution => Self::Error,
        }
    }
}

/// A callout with its presentation options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Callout {
    pub kind: CalloutKind,
    /// Icon glyph; `None` uses the kind's default.
    pub icon: Option<String>,
    pub title: Option<String>,
}

impl Callout {
    #[must_use]
    pub fn new(kind: CalloutKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        let icon = icon.into();
        self.icon = (!icon.trim().is_empty()).then_some(icon);
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        self.title = (!title.trim().is_empty()).then_some(title);
        self
    }

    /// Callout for a GitHub alert; the alert name becomes the title.
    #[must_use]
    pub fn from_alert(kind: BlockQuoteKind) -> Self {
        let title = match kind {
            BlockQuoteKind::Note => "Note",
            BlockQuoteKind::Tip => "Tip",
            BlockQuoteKind::Important => "Important",
            BlockQuoteKind::Warning => "Warning",
            BlockQuoteKind::Caution => "Caution",
        };
        Self::new(kind.into()).with_title(title)
    }

    /// Opening markup, on one line.
    #[must_use]
    pub fn open_tag(&self) -> String {
        let icon = self
            .icon
            .as_deref()
            .unwrap_or_else(|| self.kind.default_icon());
        let mut out = format!(
            r#"<div class="callout callout-{}" role="note"><span class="callout-icon" aria-hidden="true">{}</span><div class="callout-body">"#,
            self.kind.as_str(),
            escape_html(icon)
        );
        if let Some(title) = &self.title {
            let _ = write!(out, r#"<p class="callout-title">{}</p>"#, escape_html(title));
        }
        out
    }

    /// Closing markup.
    #[must_use]
    pub fn close_tag() -> &'static str {
        "</div></div>"
    }

    /// Full callout around already rendered HTML.
    #[must_use]
    pub fn render(&self, body_html: &str) -> String {
        format!("{}{body_html}{}", self.open_tag(), Self::close_tag())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_every_kind_renders_its_class() {
        for kind in CalloutKind::ALL {
            let html = Callout::new(kind).render("<p>Body</p>");
            assert!(html.contains(&format!("callout-{}", kind.as_str())), "{html}");
            assert!(html.contains(kind.default_icon()));
            assert!(html.ends_with("<p>Body</p></div></div>"));
        }
    }

    #[test]
    fn test_unknown_kind_falls_back_to_default() {
        assert_eq!(CalloutKind::parse("fancy"), CalloutKind::Default);
        assert_eq!(CalloutKind::parse(""), CalloutKind::Default);
        let html = Callout::new(CalloutKind::parse("fancy")).render("x");
        assert!(html.contains("callout-default"));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(CalloutKind::parse("Warning"), CalloutKind::Warning);
        assert_eq!(CalloutKind::parse(" ERROR "), CalloutKind::Error);
        assert_eq!(CalloutKind::parse("note"), CalloutKind::Info);
        assert_eq!(CalloutKind::parse("tip"), CalloutKind::Default);
        assert_eq!(CalloutKind::parse("caution"), CalloutKind::Error);
        assert_eq!(CalloutKind::parse("important"), CalloutKind::Important);
    }

    #[test]
    fn test_alert_mapping() {
        assert_eq!(CalloutKind::from(BlockQuoteKind::Note), CalloutKind::Info);
        assert_eq!(CalloutKind::from(BlockQuoteKind::Tip), CalloutKind::Default);
        assert_eq!(CalloutKind::from(BlockQuoteKind::Caution), CalloutKind::Error);
        assert_eq!(CalloutKind::from(BlockQuoteKind::Warning), CalloutKind::Warning);
        assert_eq!(
            CalloutKind::from(BlockQuoteKind::Important),
            CalloutKind::Important
        );
        assert_eq!(
            Callout::from_alert(BlockQuoteKind::Tip).title.as_deref(),
            Some("Tip")
        );
    }

    #[test]
    fn test_custom_icon_and_title_are_escaped() {
        let html = Callout::new(CalloutKind::Info)
            .with_icon("<b>")
            .with_title("A & B")
            .open_tag();
        assert_eq!(
            html,
            r#"<div class="callout callout-info" role="note"><span class="callout-icon" aria-hidden="true">&lt;b&gt;</span><div class="callout-body"><p class="callout-title">A &amp; B</p>"#
        );
        assert!(!html.contains('\n'));
    }

    #[test]
    fn test_blank_icon_uses_default() {
        let callout = Callout::new(CalloutKind::Warning).with_icon("  ");
        assert_eq!(callout.icon, None);
        assert!(callout.open_tag().contains("⚠️"));
    }
}
