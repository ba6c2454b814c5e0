//! Per-directory navigation maps (`_meta.yaml` / `_meta.json`).
//!
//! A map is an ordered list of `slug → entry` pairs. An entry is either a
//! plain title string or a record:
//!
//! ```yaml
//! index: Home
//! guide:
//!   title: Guide
//!   type: doc          # page | doc | separator (alias: group)
//! drafts:
//!   display: hidden    # normal | hidden
//! ```

use std::fmt;
use std::path::Path;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use crate::NavError;

/// What a navigation entry stands for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavKind {
    /// Top-level page shown in the navbar; owns its own sidebar.
    Page,
    /// Member of the documentation tree (the default).
    #[default]
    Doc,
    /// Label without a link, used to group the entries below it.
    #[serde(rename = "separator", alias = "group")]
    Group,
}

/// Whether an entry is listed in menus.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Normal,
    Hidden,
}

/// One value of a navigation map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NavEntry {
    /// Display title; `None` means "use the fallback title".
    pub title: Option<String>,
    pub kind: NavKind,
    pub display: DisplayMode,
}

impl NavEntry {
    /// Entry with a title and default kind.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.display == DisplayMode::Hidden
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct EntryRecord {
    title: Option<String>,
    #[serde(rename = "type", default)]
    kind: NavKind,
    #[serde(default)]
    display: DisplayMode,
}

impl<'de> Deserialize<'de> for NavEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntryVisitor;

        impl<'de> Visitor<'de> for EntryVisitor {
            type Value = NavEntry;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a title string or a {title, type, display} record")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<NavEntry, E> {
                Ok(NavEntry::titled(v))
            }

            fn visit_unit<E: de::Error>(self) -> Result<NavEntry, E> {
                Ok(NavEntry::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<NavEntry, A::Error> {
                let record =
                    EntryRecord::deserialize(de::value::MapAccessDeserializer::new(map))?;
                Ok(NavEntry {
                    title: record.title,
                    kind: record.kind,
                    display: record.display,
                })
            }
        }

        deserializer.deserialize_any(EntryVisitor)
    }
}

/// Ordered navigation map of one directory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NavMap {
    entries: Vec<(String, NavEntry)>,
    duplicates: Vec<String>,
}

impl<'de> Deserialize<'de> for NavMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MapVisitor;

        impl<'de> Visitor<'de> for MapVisitor {
            type Value = NavMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of slugs to navigation entries")
            }

            fn visit_unit<E: de::Error>(self) -> Result<NavMap, E> {
                Ok(NavMap::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<NavMap, A::Error> {
                let mut map = NavMap::default();
                while let Some((key, entry)) = access.next_entry::<String, NavEntry>()? {
                    if map.contains(&key) {
                        map.duplicates.push(key);
                    } else {
                        map.entries.push((key, entry));
                    }
                }
                Ok(map)
            }
        }

        deserializer.deserialize_any(MapVisitor)
    }
}

impl NavMap {
    /// Build a map from entries in order (last duplicate is recorded, not kept).
    #[must_use]
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, NavEntry)>,
        K: Into<String>,
    {
        let mut map = Self::default();
        for (key, entry) in entries {
            let key = key.into();
            if map.contains(&key) {
                map.duplicates.push(key);
            } else {
                map.entries.push((key, entry));
            }
        }
        map
    }

    /// Parse a map file, choosing YAML or JSON by extension.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::Parse`] for malformed input and
    /// [`NavError::DuplicateKey`] when a slug is listed twice.
    pub fn parse(file: &Path, text: &str) -> Result<Self, NavError> {
        let is_json = file
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let parsed = if text.trim().is_empty() {
            Ok(Self::default())
        } else if is_json {
            serde_json::from_str::<Self>(text).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str::<Self>(text).map_err(|e| e.to_string())
        };

        let map = parsed.map_err(|message| NavError::Parse {
            file: file.to_path_buf(),
            message,
        })?;
        map.ensure_unique(file)?;
        Ok(map)
    }

    /// Fail on the first slug listed more than once.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::DuplicateKey`] naming `file` and the slug.
    pub fn ensure_unique(&self, file: &Path) -> Result<(), NavError> {
        match self.duplicates.first() {
            Some(key) => Err(NavError::DuplicateKey {
                file: file.to_path_buf(),
                key: key.clone(),
            }),
            None => Ok(()),
        }
    }

    #[must_use]
    pub fn get(&self, slug: &str) -> Option<&NavEntry> {
        self.entries
            .iter()
            .find_map(|(key, entry)| (key == slug).then_some(entry))
    }

    #[must_use]
    pub fn contains(&self, slug: &str) -> bool {
        self.get(slug).is_some()
    }

    /// Entries in authored order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NavEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
