//! Site-wide navigation tree.
//!
//! The tree mirrors the content directory layout. Each directory's children
//! come from [`resolve_menu_with`], so map order, hidden entries and group
//! labels all carry over. A file and a directory with the same slug become
//! one node with both content and children.
//!
//! Nodes are stored nested; a path index maps each URL path to the child
//! indices leading to its first node, which keeps `find` and `breadcrumbs`
//! O(depth).

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::NavError;
use crate::map::{NavKind, NavMap};
use crate::resolve::resolve_menu_with;

/// Slug of a directory's landing page.
pub const INDEX_SLUG: &str = "index";

/// A node of the navigation tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavNode {
    /// Key within the parent directory (`""` for the root).
    pub slug: String,
    /// URL path without surrounding slashes.
    pub path: String,
    pub title: String,
    pub kind: NavKind,
    /// Left out of menus and prev/next (still built and reachable by URL).
    pub hidden: bool,
    /// A page exists at `path`.
    pub has_content: bool,
    /// Node stands for a directory.
    pub is_dir: bool,
    pub children: Vec<NavNode>,
}

impl NavNode {
    #[must_use]
    pub fn is_group(&self) -> bool {
        self.kind == NavKind::Group
    }

    /// Whether the node should render as a link.
    ///
    /// Directories always have a URL: their index page or a generated listing.
    #[must_use]
    pub fn is_linkable(&self) -> bool {
        !self.is_group() && (self.has_content || self.is_dir)
    }

    /// Children that belong in menus.
    pub fn visible_children(&self) -> impl Iterator<Item = &NavNode> {
        self.children.iter().filter(|c| !c.hidden)
    }

    /// Whether `path` is this node or lies below it.
    #[must_use]
    pub fn is_active_for(&self, path: &str) -> bool {
        if self.is_group() {
            return false;
        }
        self.path.is_empty()
            || path == self.path
            || path
                .strip_prefix(self.path.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Whether this node links the page at its own path, as opposed to
    /// borrowing it from an `index` child.
    fn backs_item(&self) -> bool {
        if self.is_group() || !self.has_content {
            return false;
        }
        !self.is_dir || !self.children.iter().any(|c| c.slug == INDEX_SLUG)
    }
}

/// One step of a breadcrumb trail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Breadcrumb {
    pub title: String,
    pub path: String,
}

/// Navigation tree for a whole site.
#[derive(Clone, Debug)]
pub struct NavTree {
    root: NavNode,
    path_index: HashMap<String, Vec<usize>>,
}

impl NavTree {
    /// Root node (the content directory itself).
    #[must_use]
    pub fn root(&self) -> &NavNode {
        &self.root
    }

    /// Number of nodes below the root.
    #[must_use]
    pub fn len(&self) -> usize {
        fn count(nodes: &[NavNode]) -> usize {
            nodes.iter().map(|n| 1 + count(&n.children)).sum()
        }
        count(&self.root.children)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// First node with the given URL path.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&NavNode> {
        let indices = self.path_index.get(path)?;
        let mut node = &self.root;
        for &i in indices {
            node = node.children.get(i)?;
        }
        Some(node)
    }

    /// Ancestors of `path`, outermost first.
    ///
    /// The root, group labels and nodes sharing the page's own path are
    /// left out.
    #[must_use]
    pub fn breadcrumbs(&self, path: &str) -> Vec<Breadcrumb> {
        let Some(indices) = self.path_index.get(path) else {
            return Vec::new();
        };

        let mut crumbs = Vec::new();
        let mut node = &self.root;
        for &i in indices.iter().take(indices.len().saturating_sub(1)) {
            let Some(child) = node.children.get(i) else {
                break;
            };
            node = child;
            if !node.is_group() && node.path != path {
                crumbs.push(Breadcrumb {
                    title: node.title.clone(),
                    path: node.path.clone(),
                });
            }
        }
        crumbs
    }

    /// Visible pages in document order, each path once.
    ///
    /// Hidden nodes are skipped together with their subtrees.
    #[must_use]
    pub fn flatten(&self) -> Vec<&NavNode> {
        fn walk<'a>(nodes: &'a [NavNode], seen: &mut HashSet<&'a str>, out: &mut Vec<&'a NavNode>) {
            for node in nodes {
                if node.hidden || node.is_group() {
                    continue;
                }
                if node.has_content && seen.insert(node.path.as_str()) {
                    out.push(node);
                }
                walk(&node.children, seen, out);
            }
        }

        let mut out = Vec::new();
        walk(&self.root.children, &mut HashSet::new(), &mut out);
        out
    }

    /// Visible top-level `page` entries, for the navbar.
    #[must_use]
    pub fn top_pages(&self) -> Vec<&NavNode> {
        self.root
            .visible_children()
            .filter(|n| n.kind == NavKind::Page)
            .collect()
    }

    /// Menu shown beside `path`.
    ///
    /// Inside a top-level `page` directory this is that directory's children;
    /// everywhere else it is the root documentation tree without `page`
    /// entries.
    #[must_use]
    pub fn sidebar(&self, path: &str) -> Vec<&NavNode> {
        let top = self
            .path_index
            .get(path)
            .and_then(|indices| indices.first())
            .and_then(|&i| self.root.children.get(i));

        match top {
            Some(section) if section.kind == NavKind::Page && section.is_dir => {
                section.visible_children().collect()
            }
            _ => self
                .root
                .visible_children()
                .filter(|n| n.kind != NavKind::Page)
                .collect(),
        }
    }

    /// Check that every item is linked exactly once and that no visible
    /// entry points at nothing.
    ///
    /// # Errors
    ///
    /// Returns the first violation found: [`NavError::DanglingEntry`],
    /// [`NavError::Unreachable`] or [`NavError::Ambiguous`].
    pub fn verify<'a, I>(&self, item_paths: I) -> Result<(), NavError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        fn walk<'n>(nodes: &'n [NavNode], counts: &mut HashMap<&'n str, usize>) -> Result<(), NavError> {
            for node in nodes {
                if node.backs_item() {
                    *counts.entry(node.path.as_str()).or_default() += 1;
                }
                if !node.is_group() && !node.is_dir && !node.has_content && !node.hidden {
                    return Err(NavError::DanglingEntry {
                        dir: parent_dir(node),
                        slug: node.slug.clone(),
                    });
                }
                walk(&node.children, counts)?;
            }
            Ok(())
        }

        let mut counts = HashMap::new();
        walk(&self.root.children, &mut counts)?;

        for path in item_paths {
            match counts.get(path).copied().unwrap_or(0) {
                1 => {}
                0 => {
                    return Err(NavError::Unreachable {
                        path: path.to_owned(),
                    });
                }
                count => {
                    return Err(NavError::Ambiguous {
                        path: path.to_owned(),
                        count,
                    });
                }
            }
        }
        Ok(())
    }

    fn index_paths(&mut self) {
        fn walk(nodes: &[NavNode], prefix: &mut Vec<usize>, index: &mut HashMap<String, Vec<usize>>) {
            for (i, node) in nodes.iter().enumerate() {
                prefix.push(i);
                if !node.is_group() && !index.contains_key(&node.path) {
                    index.insert(node.path.clone(), prefix.clone());
                }
                walk(&node.children, prefix, index);
                prefix.pop();
            }
        }

        let mut index = HashMap::new();
        walk(&self.root.children, &mut Vec::new(), &mut index);
        self.path_index = index;
    }
}

/// Directory a node's slug was listed in.
fn parent_dir(node: &NavNode) -> String {
    if node.slug == INDEX_SLUG {
        return node.path.clone();
    }
    node.path
        .rsplit_once('/')
        .map(|(dir, _)| dir.to_owned())
        .unwrap_or_default()
}

/// URL path of `slug` inside `dir`.
fn child_path(dir: &str, slug: &str) -> String {
    if slug == INDEX_SLUG {
        dir.to_owned()
    } else if dir.is_empty() {
        slug.to_owned()
    } else {
        format!("{dir}/{slug}")
    }
}

/// Collects pages and maps, then builds a [`NavTree`].
///
/// Directories are `/`-joined paths relative to the content root (`""` for
/// the root); stems are file names without extension.
#[derive(Debug, Default)]
pub struct NavTreeBuilder {
    root_title: String,
    maps: HashMap<String, NavMap>,
    pages: BTreeMap<String, BTreeSet<String>>,
    excluded: BTreeMap<String, BTreeSet<String>>,
    titles: HashMap<String, String>,
}

impl NavTreeBuilder {
    #[must_use]
    pub fn new(root_title: impl Into<String>) -> Self {
        Self {
            root_title: root_title.into(),
            ..Self::default()
        }
    }

    /// Register the navigation map of `dir`.
    pub fn add_map(&mut self, dir: impl Into<String>, map: NavMap) {
        self.maps.insert(dir.into(), map);
    }

    /// Register a page; `title` becomes the fallback title of its entry.
    pub fn add_page(&mut self, dir: &str, stem: &str, title: impl Into<String>) {
        self.titles.insert(child_path(dir, stem), title.into());
        self.pages
            .entry(dir.to_owned())
            .or_default()
            .insert(stem.to_owned());
    }

    /// Register a page that exists but is not built (a draft).
    ///
    /// Map entries pointing at it become hidden instead of dangling.
    pub fn add_excluded(&mut self, dir: &str, stem: &str) {
        self.excluded
            .entry(dir.to_owned())
            .or_default()
            .insert(stem.to_owned());
    }

    /// Build the tree.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::DanglingEntry`] when a map names a slug that is
    /// neither a page nor a directory with pages.
    pub fn build(self) -> Result<NavTree, NavError> {
        let children = self.build_dir("")?;
        let has_content = children.iter().any(|c| c.path.is_empty() && c.has_content);
        let mut tree = NavTree {
            root: NavNode {
                slug: String::new(),
                path: String::new(),
                title: self.root_title,
                kind: NavKind::Doc,
                hidden: false,
                has_content,
                is_dir: true,
                children,
            },
            path_index: HashMap::new(),
        };
        tree.index_paths();
        tracing::debug!(nodes = tree.len(), "Built navigation tree");
        Ok(tree)
    }

    /// Immediate sub-directories of `dir` that contain pages somewhere below.
    fn subdirs(&self, dir: &str) -> BTreeSet<String> {
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{dir}/")
        };
        self.pages
            .keys()
            .chain(self.excluded.keys())
            .filter_map(|d| {
                let rest = d.strip_prefix(prefix.as_str())?;
                let first = rest.split('/').next()?;
                (!first.is_empty()).then(|| first.to_owned())
            })
            .collect()
    }

    fn build_dir(&self, dir: &str) -> Result<Vec<NavNode>, NavError> {
        let files = self.pages.get(dir);
        let drafts = self.excluded.get(dir);
        let subdirs = self.subdirs(dir);

        let discovered: Vec<String> = files
            .into_iter()
            .flatten()
            .chain(drafts.into_iter().flatten())
            .chain(subdirs.iter())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let empty = NavMap::default();
        let map = self.maps.get(dir).unwrap_or(&empty);
        let menu = resolve_menu_with(dir, map, &discovered, |slug| {
            self.titles.get(&child_path(dir, slug)).cloned()
        })?;

        let mut nodes = Vec::with_capacity(menu.len());
        for entry in menu {
            let path = child_path(dir, &entry.slug);
            if entry.kind == NavKind::Group {
                nodes.push(NavNode {
                    slug: entry.slug,
                    path,
                    title: entry.title,
                    kind: entry.kind,
                    hidden: entry.hidden,
                    has_content: false,
                    is_dir: false,
                    children: Vec::new(),
                });
                continue;
            }

            let is_file = files.is_some_and(|f| f.contains(&entry.slug));
            let is_draft = !is_file && drafts.is_some_and(|d| d.contains(&entry.slug));
            let is_dir = entry.slug != INDEX_SLUG && subdirs.contains(&entry.slug);
            let children = if is_dir {
                self.build_dir(&path)?
            } else {
                Vec::new()
            };
            let has_content = is_file || children.iter().any(|c| c.path == path && c.has_content);
            let empty_dir = is_dir && !has_content && children.iter().all(|c| c.hidden);

            nodes.push(NavNode {
                slug: entry.slug,
                path,
                title: entry.title,
                kind: entry.kind,
                hidden: entry.hidden || (is_draft && !is_dir) || empty_dir,
                has_content,
                is_dir,
                children,
            });
        }
        Ok(nodes)
    }
}
