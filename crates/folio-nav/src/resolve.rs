//! Per-directory menu resolution.

use crate::map::{NavKind, NavMap};
use crate::NavError;

/// A resolved menu entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuEntry {
    pub slug: String,
    pub title: String,
    pub kind: NavKind,
    pub hidden: bool,
}

/// Resolve a directory's menu from its map and the slugs found on disk.
///
/// Mapped entries come first in map order. Discovered slugs that the map
/// does not mention follow, sorted, titled from the slug.
///
/// # Errors
///
/// Returns [`NavError::DanglingEntry`] when a non-group key names no
/// discovered slug.
pub fn resolve_menu(
    dir: &str,
    map: &NavMap,
    discovered: &[String],
) -> Result<Vec<MenuEntry>, NavError> {
    resolve_menu_with(dir, map, discovered, |_| None)
}

/// [`resolve_menu`] with a fallback title lookup.
///
/// `fallback_title(slug)` is consulted for entries without an explicit
/// title before deriving one from the slug.
///
/// # Errors
///
/// Returns [`NavError::DanglingEntry`] when a non-group key names no
/// discovered slug.
pub fn resolve_menu_with<F>(
    dir: &str,
    map: &NavMap,
    discovered: &[String],
    fallback_title: F,
) -> Result<Vec<MenuEntry>, NavError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut menu = Vec::with_capacity(map.len() + discovered.len());

    for (slug, entry) in map.iter() {
        if entry.kind != NavKind::Group && !discovered.iter().any(|d| d == slug) {
            return Err(NavError::DanglingEntry {
                dir: dir.to_owned(),
                slug: slug.to_owned(),
            });
        }
        let title = match &entry.title {
            Some(title) => title.clone(),
            None if entry.kind == NavKind::Group => title_from_slug(slug),
            None => fallback_title(slug).unwrap_or_else(|| title_from_slug(slug)),
        };
        menu.push(MenuEntry {
            slug: slug.to_owned(),
            title,
            kind: entry.kind,
            hidden: entry.is_hidden(),
        });
    }

    let mut unmapped: Vec<&String> = discovered.iter().filter(|s| !map.contains(s)).collect();
    unmapped.sort();
    unmapped.dedup();
    for slug in unmapped {
        menu.push(MenuEntry {
            slug: slug.clone(),
            title: fallback_title(slug).unwrap_or_else(|| title_from_slug(slug)),
            kind: NavKind::Doc,
            hidden: false,
        });
    }

    Ok(menu)
}

/// Derive a display title from a slug.
///
/// Separators (`-`, `_`) become spaces and each word is capitalized:
/// `kafka-consumer-groups` → `Kafka Consumer Groups`. Leading dashes, as used
/// for group keys like `---tools`, are dropped.
#[must_use]
pub fn title_from_slug(slug: &str) -> String {
    slug.trim_start_matches('-')
        .split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::map::{DisplayMode, NavEntry};

    fn slugs(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    fn pairs(menu: &[MenuEntry]) -> Vec<(&str, &str)> {
        menu.iter()
            .map(|e| (e.slug.as_str(), e.title.as_str()))
            .collect()
    }

    #[test]
    fn test_mapped_entries_keep_map_order() {
        let map = NavMap::from_entries([
            ("intro", NavEntry::titled("Overview")),
            ("guide", NavEntry::titled("Guide")),
        ]);
        let menu = resolve_menu("", &map, &slugs(&["guide", "intro"])).unwrap();
        assert_eq!(pairs(&menu), vec![("intro", "Overview"), ("guide", "Guide")]);
    }

    #[test]
    fn test_unmapped_slugs_follow_sorted() {
        let map = NavMap::from_entries([("intro", NavEntry::titled("Overview"))]);
        let menu = resolve_menu(
            "",
            &map,
            &slugs(&["zookeeper", "intro", "kafka-consumer-groups"]),
        )
        .unwrap();
        assert_eq!(
            pairs(&menu),
            vec![
                ("intro", "Overview"),
                ("kafka-consumer-groups", "Kafka Consumer Groups"),
                ("zookeeper", "Zookeeper"),
            ]
        );
        assert!(menu.iter().all(|e| e.kind == NavKind::Doc));
    }

    #[test]
    fn test_dangling_key_is_error() {
        let map = NavMap::from_entries([("missing", NavEntry::titled("Missing"))]);
        let err = resolve_menu("blog", &map, &slugs(&["present"])).unwrap_err();
        match err {
            NavError::DanglingEntry { dir, slug } => {
                assert_eq!(dir, "blog");
                assert_eq!(slug, "missing");
            }
            other => panic!("expected DanglingEntry, got {other:?}"),
        }
    }

    #[test]
    fn test_group_needs_no_content() {
        let map = NavMap::from_entries([
            (
                "---tools",
                NavEntry {
                    kind: NavKind::Group,
                    ..NavEntry::default()
                },
            ),
            ("cli", NavEntry::titled("CLI")),
        ]);
        let menu = resolve_menu("", &map, &slugs(&["cli"])).unwrap();
        assert_eq!(pairs(&menu), vec![("---tools", "Tools"), ("cli", "CLI")]);
        assert_eq!(menu[0].kind, NavKind::Group);
    }

    #[test]
    fn test_fallback_title_preferred_over_slug() {
        let map = NavMap::from_entries([(
            "setup",
            NavEntry {
                display: DisplayMode::Hidden,
                ..NavEntry::default()
            },
        )]);
        let menu = resolve_menu_with("", &map, &slugs(&["setup", "faq"]), |slug| {
            (slug == "setup").then(|| "Getting set up".to_owned())
        })
        .unwrap();
        assert_eq!(pairs(&menu), vec![("setup", "Getting set up"), ("faq", "Faq")]);
        assert!(menu[0].hidden);
        assert!(!menu[1].hidden);
    }

    #[test]
    fn test_title_from_slug() {
        assert_eq!(title_from_slug("kafka-consumer-groups"), "Kafka Consumer Groups");
        assert_eq!(title_from_slug("getting_started"), "Getting Started");
        assert_eq!(title_from_slug("---tools"), "Tools");
        assert_eq!(title_from_slug("index"), "Index");
        assert_eq!(title_from_slug(""), "");
    }
}
