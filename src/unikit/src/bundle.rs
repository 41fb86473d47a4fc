//! Script bundles: many scripts concatenated into one text file.
//!
//! A bundle is a sequence of entries, each introduced by a header line
//! naming the file:
//!
//! ```text
//! ***Player.cs***
//! namespace Game
//! {
//!     class Player {}
//! }
//!
//! ***Enemy.cs***
//! ...
//! ```
//!
//! Bundles are handy for sharing a set of scripts in a single paste and for
//! applying edited copies back onto a project.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::project::ProjectLayout;
use crate::remap::META_EXTENSION;
use crate::vfs::FileSystem;

/// Marker surrounding the file name in an entry header
pub const HEADER_MARKER: &str = "***";

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// One file of a bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleEntry {
    /// File name with extension, e.g. `Player.cs`
    pub file_name: String,

    pub lines: Vec<String>,

    /// `"\r\n"` if any line of the entry used CRLF, else `"\n"`
    pub line_ending: &'static str,
}

impl BundleEntry {
    pub fn content(&self) -> String {
        self.lines.join(self.line_ending)
    }

    fn extension(&self) -> Option<&str> {
        Path::new(&self.file_name).extension().and_then(|e| e.to_str())
    }
}

/// What an import did with each entry
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportReport {
    /// Existing files replaced by an entry
    pub overwritten: Vec<PathBuf>,

    /// New scripts placed by namespace
    pub created: Vec<PathBuf>,

    /// Entries that could not be placed: no matching file, or a name or
    /// namespace that would leave `Assets`
    pub skipped: Vec<String>,
}

fn file_name_of(asset_path: &str) -> &str {
    asset_path.rsplit(['/', '\\']).next().unwrap_or(asset_path)
}

/// Concatenate scripts into bundle text, ordered case-insensitively by path
pub fn export_bundle<F: FileSystem + ?Sized>(
    fs: &F,
    project: &ProjectLayout,
    asset_paths: &[String],
) -> Result<String, BundleError> {
    let mut sorted: Vec<&String> = asset_paths.iter().collect();
    sorted.sort_by_key(|p| p.to_lowercase());

    let mut out = String::new();
    for (i, asset_path) in sorted.into_iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }

        let full = project.resolve(asset_path);
        let content = fs
            .read_to_string(&full)
            .map_err(|source| BundleError::Read {
                path: full.clone(),
                source,
            })?;

        out.push_str(HEADER_MARKER);
        out.push_str(file_name_of(asset_path));
        out.push_str(HEADER_MARKER);
        out.push('\n');
        out.push_str(&content);
        out.push('\n');
    }

    Ok(out)
}

/// File name of an export made at `timestamp`
pub fn export_file_name(project_name: &str, timestamp: DateTime<Utc>) -> String {
    format!("{}_{}.txt", project_name, timestamp.format("%Y-%m-%d_%H-%M-%S"))
}

/// Write a bundle of `asset_paths` into `export_dir`.
///
/// Returns the bundle path, or `None` when nothing was selected.
pub fn export_to_dir<F: FileSystem + ?Sized>(
    fs: &mut F,
    project: &ProjectLayout,
    asset_paths: &[String],
    export_dir: &Path,
    project_name: &str,
    timestamp: DateTime<Utc>,
) -> Result<Option<PathBuf>, BundleError> {
    if asset_paths.is_empty() {
        return Ok(None);
    }

    let text = export_bundle(&*fs, project, asset_paths)?;

    fs.create_dir_all(export_dir)
        .map_err(|source| BundleError::Write {
            path: export_dir.to_path_buf(),
            source,
        })?;

    let path = export_dir.join(export_file_name(project_name, timestamp));
    fs.write(&path, text.as_bytes())
        .map_err(|source| BundleError::Write {
            path: path.clone(),
            source,
        })?;

    tracing::info!("Exported {} scripts to {}", asset_paths.len(), path.display());
    Ok(Some(path))
}

fn header_name(line: &str) -> Option<&str> {
    let line = line.trim_end();
    if line.len() >= HEADER_MARKER.len() * 2
        && line.starts_with(HEADER_MARKER)
        && line.ends_with(HEADER_MARKER)
    {
        Some(line.trim_matches('*'))
    } else {
        None
    }
}

/// Split bundle text into entries.
///
/// Text before the first header is ignored. A repeated file name
/// (case-insensitive) keeps its first position and takes the later content.
pub fn parse_bundle(text: &str) -> Vec<BundleEntry> {
    let mut entries: Vec<BundleEntry> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut current: Option<BundleEntry> = None;

    let mut finish = |entry: BundleEntry, entries: &mut Vec<BundleEntry>| {
        match index.get(&entry.file_name.to_lowercase()) {
            Some(&i) => {
                entries[i].lines = entry.lines;
                entries[i].line_ending = entry.line_ending;
            }
            None => {
                index.insert(entry.file_name.to_lowercase(), entries.len());
                entries.push(entry);
            }
        }
    };

    for raw in text.split_inclusive('\n') {
        let (line, crlf) = match raw.strip_suffix('\n') {
            Some(body) => match body.strip_suffix('\r') {
                Some(body) => (body, true),
                None => (body, false),
            },
            None => (raw, false),
        };

        if let Some(name) = header_name(line) {
            if let Some(mut entry) = current.take() {
                // the blank separator line belongs to neither entry
                if entry.lines.last().is_some_and(|l| l.is_empty()) {
                    entry.lines.pop();
                }
                finish(entry, &mut entries);
            }
            current = Some(BundleEntry {
                file_name: name.to_string(),
                lines: Vec::new(),
                line_ending: "\n",
            });
        } else if let Some(entry) = current.as_mut() {
            if crlf {
                entry.line_ending = "\r\n";
            }
            entry.lines.push(line.to_string());
        }
    }

    if let Some(entry) = current {
        finish(entry, &mut entries);
    }

    entries
}

/// Folder for a new script, derived from its namespace declaration.
///
/// `Game.AI` under root `Assets` gives `Assets/Game/AI`. A namespace that
/// already starts with the root's segments (`Assets.Game.AI` under
/// `Assets/Game`) only contributes the rest.
///
/// Returns `None` when a namespace segment is not a plain identifier
/// (empty, `..`, or containing a path separator).
pub fn folder_for_entry(entry: &BundleEntry, root_folder: &str) -> Option<String> {
    let declared = entry
        .lines
        .iter()
        .find(|l| l.trim_start().starts_with("namespace "))
        .and_then(|l| l.split_whitespace().nth(1))
        .map(|n| n.trim_end_matches(['{', ';']));

    let Some(declared) = declared else {
        return Some(root_folder.to_string());
    };

    let segments: Vec<&str> = declared.split('.').collect();
    if !segments.iter().all(|s| is_identifier(s)) {
        return None;
    }
    let root_segments: Vec<&str> = root_folder.split('/').filter(|s| !s.is_empty()).collect();

    let rest = if segments.len() >= root_segments.len() && segments.starts_with(&root_segments) {
        &segments[root_segments.len()..]
    } else {
        &segments[..]
    };

    Some(
        rest.iter()
            .fold(root_folder.to_string(), |acc, seg| format!("{}/{}", acc, seg)),
    )
}

fn is_identifier(segment: &str) -> bool {
    !segment.is_empty() && segment.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '@')
}

/// A bundle file name must name a single file inside its folder
fn is_plain_file_name(name: &str) -> bool {
    !name.trim().is_empty() && !name.contains(['/', '\\', ':']) && !name.contains("..")
}

/// Apply bundle text to a project.
///
/// Each entry overwrites every file under `Assets` with the same name
/// (case-insensitive). Unmatched `.cs` entries are created in the folder
/// named by their namespace below `root_folder`.
pub fn import_bundle<F: FileSystem + ?Sized>(
    fs: &mut F,
    project: &ProjectLayout,
    text: &str,
    root_folder: &str,
) -> Result<ImportReport, BundleError> {
    let existing: Vec<PathBuf> = fs
        .walk_files(&project.assets_dir())
        .into_iter()
        .filter(|p| {
            !p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(META_EXTENSION))
        })
        .collect();

    let mut report = ImportReport::default();

    for entry in parse_bundle(text) {
        if !is_plain_file_name(&entry.file_name) {
            tracing::warn!("Refusing bundle entry with unsafe name {:?}", entry.file_name);
            report.skipped.push(entry.file_name);
            continue;
        }

        let content = entry.content();
        let wanted = entry.file_name.to_lowercase();

        let matches: Vec<&PathBuf> = existing
            .iter()
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.to_lowercase() == wanted)
            })
            .collect();

        for path in &matches {
            fs.write(path, content.as_bytes())
                .map_err(|source| BundleError::Write {
                    path: path.to_path_buf(),
                    source,
                })?;
            tracing::debug!("Overwrote {}", path.display());
            report.overwritten.push(path.to_path_buf());
        }
        if !matches.is_empty() {
            continue;
        }

        if !entry.extension().is_some_and(|e| e.eq_ignore_ascii_case("cs")) {
            tracing::warn!("No existing file for {}; skipping", entry.file_name);
            report.skipped.push(entry.file_name);
            continue;
        }

        let Some(folder) = folder_for_entry(&entry, root_folder) else {
            tracing::warn!("Refusing {}: namespace is not a folder path", entry.file_name);
            report.skipped.push(entry.file_name);
            continue;
        };
        let folder = project.resolve(&folder);
        fs.create_dir_all(&folder)
            .map_err(|source| BundleError::Write {
                path: folder.clone(),
                source,
            })?;

        let path = folder.join(&entry.file_name);
        fs.write(&path, content.as_bytes())
            .map_err(|source| BundleError::Write {
                path: path.clone(),
                source,
            })?;
        tracing::debug!("Created {}", path.display());
        report.created.push(path);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::MemoryFileSystem;
    use chrono::TimeZone;

    fn project_fs() -> (MemoryFileSystem, ProjectLayout) {
        let mut fs = MemoryFileSystem::new();
        fs.insert("/proj/Assets/Game/Player.cs", "class Player {}\n");
        fs.insert("/proj/Assets/Game/Player.cs.meta", "guid: x");
        fs.insert("/proj/Assets/Boot.cs", "class Boot {}");
        (fs, ProjectLayout::new("/proj"))
    }

    #[test]
    fn test_export_bundle_format() {
        let (fs, project) = project_fs();
        let text = export_bundle(
            &fs,
            &project,
            &["Assets/Game/Player.cs".to_string(), "Assets/Boot.cs".to_string()],
        )
        .unwrap();

        assert_eq!(
            text,
            "***Boot.cs***\nclass Boot {}\n\n***Player.cs***\nclass Player {}\n\n"
        );
    }

    #[test]
    fn test_export_then_parse_preserves_content() {
        let (fs, project) = project_fs();
        let text = export_bundle(
            &fs,
            &project,
            &["Assets/Game/Player.cs".to_string(), "Assets/Boot.cs".to_string()],
        )
        .unwrap();

        let entries = parse_bundle(&text);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].file_name, "Boot.cs");
        assert_eq!(entries[0].content(), "class Boot {}");
        assert_eq!(entries[1].file_name, "Player.cs");
        assert_eq!(entries[1].content(), "class Player {}\n");
    }

    #[test]
    fn test_export_missing_script_fails() {
        let (fs, project) = project_fs();
        let err = export_bundle(&fs, &project, &["Assets/Gone.cs".to_string()]).unwrap_err();
        assert!(matches!(err, BundleError::Read { .. }));
    }

    #[test]
    fn test_export_to_dir() {
        let (mut fs, project) = project_fs();
        let timestamp = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();

        let path = export_to_dir(
            &mut fs,
            &project,
            &["Assets/Boot.cs".to_string()],
            Path::new("/exports"),
            "MyGame",
            timestamp,
        )
        .unwrap()
        .unwrap();

        assert_eq!(path, PathBuf::from("/exports/MyGame_2024-03-09_14-05-07.txt"));
        assert!(fs.get_str(&path).unwrap().starts_with("***Boot.cs***"));

        let none = export_to_dir(&mut fs, &project, &[], Path::new("/exports"), "MyGame", timestamp);
        assert_eq!(none.unwrap(), None);
    }

    #[test]
    fn test_parse_ignores_preamble_and_merges_duplicates() {
        let text = "notes\n***A.cs***\none\n\n***b.cs***\ntwo\n\n***a.CS***\nthree";
        let entries = parse_bundle(text);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].file_name, "A.cs");
        assert_eq!(entries[0].content(), "three");
        assert_eq!(entries[1].content(), "two");
    }

    #[test]
    fn test_header_requires_both_markers() {
        assert_eq!(header_name("***A.cs***  "), Some("A.cs"));
        assert_eq!(header_name("***A.cs"), None);
        assert_eq!(header_name("****"), None);
    }

    fn entry(lines: &[&str]) -> BundleEntry {
        BundleEntry {
            file_name: "Brain.cs".to_string(),
            lines: lines.iter().map(|l| l.to_string()).collect(),
            line_ending: "\n",
        }
    }

    #[test]
    fn test_folder_for_entry() {
        let nested = entry(&["using X;", "namespace Game.AI {"]);
        assert_eq!(folder_for_entry(&nested, "Assets").as_deref(), Some("Assets/Game/AI"));
        assert_eq!(
            folder_for_entry(&nested, "Assets/Game").as_deref(),
            Some("Assets/Game/Game/AI")
        );

        let rooted = entry(&["namespace Assets.Game.AI;"]);
        assert_eq!(folder_for_entry(&rooted, "Assets").as_deref(), Some("Assets/Game/AI"));

        let bare = entry(&["class Brain {}"]);
        assert_eq!(folder_for_entry(&bare, "Assets").as_deref(), Some("Assets"));
    }

    #[test]
    fn test_folder_for_entry_rejects_path_segments() {
        assert_eq!(folder_for_entry(&entry(&["namespace Game...Up"]), "Assets"), None);
        assert_eq!(folder_for_entry(&entry(&["namespace ../../etc"]), "Assets"), None);
        assert_eq!(folder_for_entry(&entry(&["namespace Game..AI"]), "Assets"), None);
    }

    #[test]
    fn test_import_refuses_paths_outside_project() {
        let (mut fs, project) = project_fs();
        let before = fs.file_count();
        let text = "***../../../outside.cs***\nclass Evil {}\n\n\
                    ***Sub/Inner.cs***\nclass Inner {}\n\n\
                    ***Climb.cs***\nnamespace Game.../..\n{\n}\n";

        let report = import_bundle(&mut fs, &project, text, "Assets").unwrap();

        assert!(report.created.is_empty());
        assert!(report.overwritten.is_empty());
        assert_eq!(
            report.skipped,
            vec!["../../../outside.cs", "Sub/Inner.cs", "Climb.cs"]
        );
        assert_eq!(fs.file_count(), before);
    }

    #[test]
    fn test_crlf_entries_keep_line_endings() {
        let text = "***A.cs***\r\nclass A\r\n{\r\n}\r\n\r\n***B.cs***\nclass B {}\n";
        let entries = parse_bundle(text);

        assert_eq!(entries[0].line_ending, "\r\n");
        assert_eq!(entries[0].content(), "class A\r\n{\r\n}");
        assert_eq!(entries[1].line_ending, "\n");
        assert_eq!(entries[1].content(), "class B {}");
    }

    #[test]
    fn test_import_keeps_crlf() {
        let (mut fs, project) = project_fs();
        fs.insert("/proj/Assets/Win.cs", "old\r\n");
        // as exported: content, then the entry terminator
        let text = "***Win.cs***\nclass Win\r\n{\r\n}\r\n\n";

        import_bundle(&mut fs, &project, text, "Assets").unwrap();
        assert_eq!(fs.get_str("/proj/Assets/Win.cs"), Some("class Win\r\n{\r\n}\r\n"));
    }

    #[test]
    fn test_import_overwrites_and_creates() {
        let (mut fs, project) = project_fs();
        let text = "***player.cs***\nclass Player { int hp; }\n\n\
                    ***Brain.cs***\nnamespace Game.AI\n{\n}\n\n\
                    ***notes.txt***\nhello\n";

        let report = import_bundle(&mut fs, &project, text, "Assets").unwrap();

        assert_eq!(
            report.overwritten,
            vec![PathBuf::from("/proj/Assets/Game/Player.cs")]
        );
        assert_eq!(
            report.created,
            vec![PathBuf::from("/proj/Assets/Game/AI/Brain.cs")]
        );
        assert_eq!(report.skipped, vec!["notes.txt"]);

        assert_eq!(
            fs.get_str("/proj/Assets/Game/Player.cs"),
            Some("class Player { int hp; }")
        );
        assert_eq!(
            fs.get_str("/proj/Assets/Game/AI/Brain.cs"),
            Some("namespace Game.AI\n{\n}")
        );
        // sidecar untouched
        assert_eq!(fs.get_str("/proj/Assets/Game/Player.cs.meta"), Some("guid: x"));
    }
}
