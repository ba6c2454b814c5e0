use std::path::PathBuf;

/// Navigation metadata and tree errors.
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    /// Map file is not valid YAML/JSON or has a malformed entry.
    #[error("{}: {message}", .file.display())]
    Parse { file: PathBuf, message: String },

    /// Same slug listed twice in one map.
    #[error("{}: duplicate key `{key}`", .file.display())]
    DuplicateKey { file: PathBuf, key: String },

    /// Map entry that names neither a content item nor a sub-directory.
    #[error("navigation entry `{slug}` in `{}` has no matching page or directory", display_dir(.dir))]
    DanglingEntry { dir: String, slug: String },

    /// Content item that no navigation node points at.
    #[error("page `/{path}` is not reachable from the navigation tree")]
    Unreachable { path: String },

    /// Content item linked from more than one navigation node.
    #[error("page `/{path}` appears {count} times in the navigation tree")]
    Ambiguous { path: String, count: usize },
}

fn display_dir(dir: &str) -> &str {
    if dir.is_empty() { "/" } else { dir }
}
