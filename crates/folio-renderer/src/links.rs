//! Link rewriting for rendered pages.

/// Rewrite a link destination for the built site.
///
/// - `./sibling.md` → `{base}dir/sibling/`
/// - `../other.mdx#usage` → `{base}other/#usage`
/// - `/guide/index.md` → `{base}guide/`
/// - `/images/logo.png` → `{base}images/logo.png`
///
/// `page_dir` is the directory of the source file, relative to the content
/// root; `base_path` starts and ends with `/`. External URLs, fragment-only
/// links and relative non-Markdown links are returned unchanged.
#[must_use]
pub fn rewrite_link(url: &str, page_dir: &str, base_path: &str) -> String {
    if is_external(url) || url.starts_with('#') {
        return url.to_owned();
    }

    let (path_part, fragment) = match url.find(['#', '?']) {
        Some(pos) => (&url[..pos], &url[pos..]),
        None => (url, ""),
    };

    let Some(stem) = markdown_stem(path_part) else {
        return match path_part.strip_prefix('/') {
            Some(absolute) => format!("{base_path}{absolute}{fragment}"),
            None => url.to_owned(),
        };
    };

    let resolved = match stem.strip_prefix('/') {
        Some(absolute) => resolve_relative_path(absolute, ""),
        None => resolve_relative_path(stem, page_dir),
    };
    let clean = if resolved == "index" {
        ""
    } else {
        resolved.strip_suffix("/index").unwrap_or(&resolved)
    };

    if clean.is_empty() {
        format!("{base_path}{fragment}")
    } else {
        format!("{base_path}{clean}/{fragment}")
    }
}

/// Protocol-relative or has a URL scheme (`https:`, `mailto:`, `tel:`…).
fn is_external(url: &str) -> bool {
    url.starts_with("//")
        || url.split_once(':').is_some_and(|(scheme, _)| {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        })
}

/// Path without its `.md`/`.mdx` extension, if it is a Markdown link.
fn markdown_stem(path: &str) -> Option<&str> {
    path.strip_suffix(".mdx")
        .or_else(|| path.strip_suffix(".md"))
        .filter(|stem| !stem.is_empty() && !stem.ends_with('/'))
}

/// Resolve `relative` against the directory `base`.
///
/// `..` never climbs above the content root.
fn resolve_relative_path(relative: &str, base: &str) -> String {
    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    for component in relative.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(component),
        }
    }
    segments.join("/")
}
