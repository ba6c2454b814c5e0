//! Content parsing errors.

use std::path::{Path, PathBuf};

/// Error produced while turning a source file into a [`ContentItem`](crate::ContentItem).
///
/// Every variant names the offending file so a build can report all broken
/// files at once.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// Opening `---` without a closing delimiter.
    #[error("{}: front matter is not closed by a `---` line", .path.display())]
    UnterminatedFrontMatter { path: PathBuf },

    /// Front matter is not valid YAML or has a field of the wrong type.
    #[error("{}: invalid front matter: {message}", .path.display())]
    InvalidFrontMatter { path: PathBuf, message: String },

    /// `date` could not be parsed.
    #[error(
        "{}: invalid date `{value}` (expected YYYY-MM-DD, YYYY-MM-DD HH:MM[:SS] or RFC 3339)",
        .path.display()
    )]
    InvalidDate { path: PathBuf, value: String },

    /// Neither a `title` field nor a `# Heading` in the body.
    #[error("{}: missing title (set `title` in front matter or start with a `# Heading`)", .path.display())]
    MissingTitle { path: PathBuf },
}

impl ContentError {
    /// Source file the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::UnterminatedFrontMatter { path }
            | Self::InvalidFrontMatter { path, .. }
            | Self::InvalidDate { path, .. }
            | Self::MissingTitle { path } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_file() {
        let err = ContentError::InvalidDate {
            path: PathBuf::from("blog/kafka.md"),
            value: "yesterday".to_owned(),
        };
        let message = err.to_string();
        assert!(message.starts_with("blog/kafka.md: "));
        assert!(message.contains("`yesterday`"));
        assert_eq!(err.path(), Path::new("blog/kafka.md"));
    }
}
