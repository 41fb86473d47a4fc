//! Persistent tags and layers.
//!
//! Unity keeps a project's tags and layers in `ProjectSettings/TagManager.asset`,
//! which is easy to lose when settings are reset or merged. This module keeps
//! the desired set in a small JSON store next to it and syncs the TagManager
//! against that store: missing entries are added, extra ones pruned.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::project::ProjectLayout;
use crate::vfs::FileSystem;

/// Store file, relative to the project root
pub const STORE_PATH: &str = "ProjectSettings/PersistentTagsAndLayers.json";

/// TagManager asset, relative to the project root
pub const TAG_MANAGER_PATH: &str = "ProjectSettings/TagManager.asset";

/// Tags Unity creates itself; never removed
pub const DEFAULT_TAGS: &[&str] = &[
    "Untagged",
    "Respawn",
    "Finish",
    "EditorOnly",
    "MainCamera",
    "Player",
    "GameController",
];

/// First layer slot available to users; 0..8 are built in
pub const FIRST_USER_LAYER: usize = 8;

pub const LAST_USER_LAYER: usize = 31;

const LAYER_COUNT: usize = LAST_USER_LAYER + 1;

#[derive(Error, Debug)]
pub enum TagError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TagManager.asset not found at {0}. Open the project in Unity once to generate ProjectSettings, then retry.")]
    TagManagerMissing(PathBuf),

    #[error("TagManager has no '{0}' property")]
    MissingProperty(&'static str),
}

/// Desired tags and layers, as saved on disk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagLayerStore {
    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub layers: Vec<String>,
}

impl TagLayerStore {
    pub fn new<T, L>(tags: T, layers: L) -> Self
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
        L: IntoIterator,
        L::Item: AsRef<str>,
    {
        TagLayerStore {
            tags: normalize(tags),
            layers: normalize(layers),
        }
    }
}

/// Trim names, drop empty ones and exact duplicates, keeping first-seen order
pub fn normalize<I>(names: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(|n| n.as_ref().trim().to_string())
        .filter(|n| !n.is_empty())
        .filter(|n| seen.insert(n.clone()))
        .collect()
}

/// Load the store, falling back to an empty one if it is missing or unreadable
pub fn load_store<F: FileSystem + ?Sized>(fs: &F, project: &ProjectLayout) -> TagLayerStore {
    let path = project.resolve(STORE_PATH);
    if !fs.is_file(&path) {
        return TagLayerStore::default();
    }

    let parsed = fs
        .read_to_string(&path)
        .map_err(TagError::from)
        .and_then(|json| serde_json::from_str::<TagLayerStore>(&json).map_err(TagError::from));

    match parsed {
        Ok(store) => TagLayerStore::new(store.tags, store.layers),
        Err(e) => {
            tracing::warn!("Ignoring unreadable store {}: {}", path.display(), e);
            TagLayerStore::default()
        }
    }
}

/// Normalize and save the desired tags and layers
pub fn save_store<F: FileSystem + ?Sized>(
    fs: &mut F,
    project: &ProjectLayout,
    store: &TagLayerStore,
) -> Result<TagLayerStore, TagError> {
    let store = TagLayerStore::new(&store.tags, &store.layers);
    let json = serde_json::to_string_pretty(&store)?;

    let path = project.resolve(STORE_PATH);
    if let Some(parent) = path.parent() {
        fs.create_dir_all(parent)?;
    }
    fs.write(&path, json.as_bytes())?;
    Ok(store)
}

/// A settings asset exposing named string arrays
pub trait SettingsDocument {
    fn string_array(&self, key: &str) -> Option<Vec<String>>;

    /// Replace an array; returns false if the document has no such key
    fn set_string_array(&mut self, key: &str, values: &[String]) -> bool;
}

/// Line-level view of a Unity YAML asset.
///
/// Only the edited sequences are re-rendered; every other line is kept
/// exactly as read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnityYamlDocument {
    lines: Vec<String>,
    line_ending: &'static str,
    trailing_newline: bool,
}

struct SequenceSpan {
    key_line: usize,
    indent: usize,
    items: std::ops::Range<usize>,
    inline_empty: bool,
}

impl UnityYamlDocument {
    pub fn parse(text: &str) -> Self {
        let line_ending = if text.contains("\r\n") { "\r\n" } else { "\n" };
        UnityYamlDocument {
            lines: text.lines().map(String::from).collect(),
            line_ending,
            trailing_newline: text.ends_with('\n'),
        }
    }

    pub fn to_text(&self) -> String {
        let mut text = self.lines.join(self.line_ending);
        if self.trailing_newline {
            text.push_str(self.line_ending);
        }
        text
    }

    fn find_sequence(&self, key: &str) -> Option<SequenceSpan> {
        let label = format!("{}:", key);
        let (key_line, indent, inline_empty) =
            self.lines.iter().enumerate().find_map(|(i, line)| {
                let body = line.trim_start();
                let rest = body.strip_prefix(&label)?;
                let indent = line.len() - body.len();
                match rest.trim() {
                    "" => Some((i, indent, false)),
                    "[]" => Some((i, indent, true)),
                    _ => None,
                }
            })?;

        let start = key_line + 1;
        let mut end = start;
        if !inline_empty {
            while let Some(line) = self.lines.get(end) {
                let body = line.trim_start();
                let item_indent = line.len() - body.len();
                if item_indent < indent || !body.starts_with('-') {
                    break;
                }
                end += 1;
            }
        }

        Some(SequenceSpan {
            key_line,
            indent,
            items: start..end,
            inline_empty,
        })
    }
}

fn parse_scalar(item: &str) -> String {
    let value = item.strip_prefix('-').unwrap_or(item).trim();
    if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        value[1..value.len() - 1].replace("''", "'")
    } else if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        value[1..value.len() - 1]
            .replace("\\\"", "\"")
            .replace("\\\\", "\\")
    } else {
        value.to_string()
    }
}

fn render_scalar(value: &str) -> String {
    const SPECIAL_START: &[char] = &[
        '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%', '@',
        '`',
    ];
    let needs_quotes = value.starts_with(SPECIAL_START)
        || value.starts_with(' ')
        || value.ends_with(' ')
        || value.contains(": ")
        || value.contains(" #");

    if needs_quotes {
        format!("'{}'", value.replace('\'', "''"))
    } else {
        value.to_string()
    }
}

impl SettingsDocument for UnityYamlDocument {
    fn string_array(&self, key: &str) -> Option<Vec<String>> {
        let span = self.find_sequence(key)?;
        Some(
            self.lines[span.items]
                .iter()
                .map(|l| parse_scalar(l.trim_start()))
                .collect(),
        )
    }

    fn set_string_array(&mut self, key: &str, values: &[String]) -> bool {
        let Some(span) = self.find_sequence(key) else {
            return false;
        };
        let pad = " ".repeat(span.indent);

        self.lines[span.key_line] = if values.is_empty() {
            format!("{}{}: []", pad, key)
        } else {
            format!("{}{}:", pad, key)
        };

        let rendered: Vec<String> = values
            .iter()
            .map(|v| format!("{}- {}", pad, render_scalar(v)))
            .collect();
        let items = if span.inline_empty {
            span.key_line + 1..span.key_line + 1
        } else {
            span.items
        };
        self.lines.splice(items, rendered);
        true
    }
}

/// What a sync changed
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub added_tags: Vec<String>,
    pub removed_tags: Vec<String>,
    pub added_layers: Vec<String>,
    pub removed_layers: Vec<String>,

    /// Layers that could not be added because every user slot is taken
    pub no_slot_layers: Vec<String>,
}

impl SyncReport {
    pub fn changed(&self) -> bool {
        !(self.added_tags.is_empty()
            && self.removed_tags.is_empty()
            && self.added_layers.is_empty()
            && self.removed_layers.is_empty())
    }
}

/// Make a TagManager document match `store`.
pub fn sync<D: SettingsDocument + ?Sized>(
    doc: &mut D,
    store: &TagLayerStore,
) -> Result<SyncReport, TagError> {
    let mut tags = doc.string_array("tags").ok_or(TagError::MissingProperty("tags"))?;
    let mut layers = doc
        .string_array("layers")
        .ok_or(TagError::MissingProperty("layers"))?;
    if layers.len() < LAYER_COUNT {
        layers.resize(LAYER_COUNT, String::new());
    }

    let desired_tags = normalize(&store.tags);
    let desired_layers = normalize(&store.layers);
    let mut report = SyncReport::default();

    for name in &desired_tags {
        if !tags.contains(name) {
            tags.push(name.clone());
            report.added_tags.push(name.clone());
        }
    }

    for name in &desired_layers {
        if layers.contains(name) {
            continue;
        }
        match (FIRST_USER_LAYER..=LAST_USER_LAYER).find(|&i| layers[i].is_empty()) {
            Some(slot) => {
                layers[slot] = name.clone();
                report.added_layers.push(name.clone());
            }
            None => report.no_slot_layers.push(name.clone()),
        }
    }

    tags.retain(|name| {
        let keep = name.is_empty()
            || DEFAULT_TAGS.contains(&name.as_str())
            || desired_tags.contains(name);
        if !keep {
            report.removed_tags.push(name.clone());
        }
        keep
    });

    for slot in &mut layers[FIRST_USER_LAYER..=LAST_USER_LAYER] {
        if !slot.is_empty() && !desired_layers.contains(slot) {
            report.removed_layers.push(std::mem::take(slot));
        }
    }

    if report.changed() {
        doc.set_string_array("tags", &tags);
        doc.set_string_array("layers", &layers);
    }

    for name in &report.no_slot_layers {
        tracing::warn!(
            "No free user layer slot for {} (valid slots are {}..{})",
            name,
            FIRST_USER_LAYER,
            LAST_USER_LAYER
        );
    }

    Ok(report)
}

/// Sync the project's TagManager.asset against its saved store.
pub fn sync_project<F: FileSystem + ?Sized>(
    fs: &mut F,
    project: &ProjectLayout,
) -> Result<SyncReport, TagError> {
    let store = load_store(&*fs, project);
    let path = project.resolve(TAG_MANAGER_PATH);
    if !fs.is_file(&path) {
        return Err(TagError::TagManagerMissing(path));
    }

    let mut doc = UnityYamlDocument::parse(&fs.read_to_string(&path)?);
    let report = sync(&mut doc, &store)?;

    if report.changed() {
        write_document(fs, &path, &doc)?;
    }
    Ok(report)
}

fn write_document<F: FileSystem + ?Sized>(
    fs: &mut F,
    path: &Path,
    doc: &UnityYamlDocument,
) -> Result<(), TagError> {
    fs.write(path, doc.to_text().as_bytes())?;
    tracing::info!("Updated {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::MemoryFileSystem;

    fn tag_manager(tags: &[&str], user_layers: &[(usize, &str)]) -> String {
        let mut text = String::from(
            "%YAML 1.1\n%TAG !u! tag:unity3d.com,2011:\n--- !u!78 &1\nTagManager:\n  serializedVersion: 2\n",
        );
        if tags.is_empty() {
            text.push_str("  tags: []\n");
        } else {
            text.push_str("  tags:\n");
            for t in tags {
                text.push_str(&format!("  - {}\n", t));
            }
        }
        text.push_str("  layers:\n");
        let builtin = ["Default", "TransparentFX", "Ignore Raycast", "", "Water", "UI", "", ""];
        for i in 0..32 {
            let name = if i < 8 {
                builtin[i].to_string()
            } else {
                user_layers
                    .iter()
                    .find(|(slot, _)| *slot == i)
                    .map(|(_, n)| n.to_string())
                    .unwrap_or_default()
            };
            text.push_str(&format!("  - {}\n", name));
        }
        text.push_str("  m_SortingLayers:\n  - name: Default\n    uniqueID: 0\n    locked: 0\n");
        text
    }

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize([" Enemy", "Enemy", "", "enemy", "  "]),
            vec!["Enemy", "enemy"]
        );
    }

    #[test]
    fn test_yaml_document_reads_arrays() {
        let doc = UnityYamlDocument::parse(&tag_manager(&["Enemy", "'Odd: one'"], &[(9, "Ground")]));
        assert_eq!(
            doc.string_array("tags").unwrap(),
            vec!["Enemy", "Odd: one"]
        );
        let layers = doc.string_array("layers").unwrap();
        assert_eq!(layers.len(), 32);
        assert_eq!(layers[2], "Ignore Raycast");
        assert_eq!(layers[9], "Ground");
        assert!(doc.string_array("missing").is_none());
    }

    #[test]
    fn test_yaml_document_unchanged_round_trip() {
        let text = tag_manager(&["Enemy"], &[(8, "Ground")]);
        let mut doc = UnityYamlDocument::parse(&text);
        let tags = doc.string_array("tags").unwrap();
        assert!(doc.set_string_array("tags", &tags));
        assert_eq!(doc.to_text(), text);
    }

    #[test]
    fn test_yaml_document_inline_empty() {
        let mut doc = UnityYamlDocument::parse(&tag_manager(&[], &[]));
        assert!(doc.string_array("tags").unwrap().is_empty());

        doc.set_string_array("tags", &["Enemy".to_string()]);
        assert!(doc.to_text().contains("  tags:\n  - Enemy\n  layers:\n"));

        doc.set_string_array("tags", &[]);
        assert!(doc.to_text().contains("  tags: []\n  layers:\n"));
    }

    #[test]
    fn test_sync_adds_and_prunes() {
        let mut doc = UnityYamlDocument::parse(&tag_manager(
            &["Player", "Old", "Enemy"],
            &[(8, "Stale"), (10, "Ground")],
        ));
        let store = TagLayerStore::new(["Enemy", "Pickup"], ["Ground", "Water", "Hitbox"]);

        let report = sync(&mut doc, &store).unwrap();

        assert_eq!(report.added_tags, vec!["Pickup"]);
        assert_eq!(report.removed_tags, vec!["Old"]);
        assert_eq!(report.added_layers, vec!["Hitbox"]);
        assert_eq!(report.removed_layers, vec!["Stale"]);
        assert!(report.no_slot_layers.is_empty());

        assert_eq!(
            doc.string_array("tags").unwrap(),
            vec!["Player", "Enemy", "Pickup"]
        );
        let layers = doc.string_array("layers").unwrap();
        // Stale still held slot 8 when Hitbox was placed
        assert_eq!(layers[8], "");
        assert_eq!(layers[9], "Hitbox");
        assert_eq!(layers[10], "Ground");
        assert_eq!(layers[4], "Water");
    }

    #[test]
    fn test_sync_reports_full_layer_table() {
        let user: Vec<(usize, String)> = (FIRST_USER_LAYER..=LAST_USER_LAYER)
            .map(|i| (i, format!("L{}", i)))
            .collect();
        let user_refs: Vec<(usize, &str)> = user.iter().map(|(i, n)| (*i, n.as_str())).collect();
        let mut doc = UnityYamlDocument::parse(&tag_manager(&[], &user_refs));

        let mut wanted: Vec<String> = user.iter().map(|(_, n)| n.clone()).collect();
        wanted.push("Extra".to_string());
        let store = TagLayerStore::new(Vec::<String>::new(), wanted);

        let report = sync(&mut doc, &store).unwrap();
        assert_eq!(report.no_slot_layers, vec!["Extra"]);
        assert!(!report.changed());
    }

    #[test]
    fn test_sync_pads_short_layer_array() {
        let text = "TagManager:\n  tags: []\n  layers:\n  - Default\n";
        let mut doc = UnityYamlDocument::parse(text);
        let store = TagLayerStore::new(Vec::<String>::new(), ["Ground"]);

        let report = sync(&mut doc, &store).unwrap();
        assert_eq!(report.added_layers, vec!["Ground"]);
        let layers = doc.string_array("layers").unwrap();
        assert_eq!(layers.len(), 32);
        assert_eq!(layers[8], "Ground");
    }

    #[test]
    fn test_sync_missing_property() {
        let mut doc = UnityYamlDocument::parse("TagManager:\n  layers:\n  - Default\n");
        let err = sync(&mut doc, &TagLayerStore::default()).unwrap_err();
        assert!(matches!(err, TagError::MissingProperty("tags")));
    }

    #[test]
    fn test_store_round_trip_and_sync_project() {
        let mut fs = MemoryFileSystem::new();
        let project = ProjectLayout::new("/proj");
        fs.insert("/proj/ProjectSettings/TagManager.asset", tag_manager(&["Old"], &[]));

        let saved = save_store(
            &mut fs,
            &project,
            &TagLayerStore {
                tags: vec![" Enemy ".into(), "Enemy".into()],
                layers: vec!["Ground".into()],
            },
        )
        .unwrap();
        assert_eq!(saved.tags, vec!["Enemy"]);
        assert_eq!(load_store(&fs, &project), saved);

        let report = sync_project(&mut fs, &project).unwrap();
        assert_eq!(report.added_tags, vec!["Enemy"]);
        assert_eq!(report.removed_tags, vec!["Old"]);

        let text = fs.get_str("/proj/ProjectSettings/TagManager.asset").unwrap();
        assert!(text.contains("  - Enemy\n"));
        assert!(!text.contains("Old"));
        assert!(text.contains("m_SortingLayers:"));

        // second run has nothing to do
        let again = sync_project(&mut fs, &project).unwrap();
        assert!(!again.changed());
    }

    #[test]
    fn test_load_store_tolerates_garbage() {
        let mut fs = MemoryFileSystem::new();
        let project = ProjectLayout::new("/proj");
        fs.insert("/proj/ProjectSettings/PersistentTagsAndLayers.json", "{ not json");
        assert_eq!(load_store(&fs, &project), TagLayerStore::default());
    }

    #[test]
    fn test_sync_project_without_tag_manager() {
        let mut fs = MemoryFileSystem::new();
        let project = ProjectLayout::new("/proj");
        let err = sync_project(&mut fs, &project).unwrap_err();
        assert!(matches!(err, TagError::TagManagerMissing(_)));
    }
}
