//! GUID remapping for a folder of Unity assets.
//!
//! Copying a package folder between projects keeps the original GUIDs, which
//! collide with the source project. This module gives every `.meta` file in
//! a folder a fresh GUID and rewrites all references to the old GUIDs in
//! the folder's text assets (scenes, prefabs, materials, ...).
//!
//! The operation is best effort: files that cannot be read or written are
//! logged and skipped, and a failure part way through leaves a mix of old
//! and new GUIDs on disk.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::guid::Guid;
use crate::vfs::FileSystem;

/// Extension of Unity's asset sidecar files
pub const META_EXTENSION: &str = "meta";

/// Extensions never rewritten by the propagation pass
pub const BINARY_EXTENSIONS: &[&str] = &[
    "dll", "exe", "png", "jpg", "jpeg", "tga", "psd", "mp3", "wav", "ogg", "fbx", "anim", "mp4",
    "mov", "ttf", "otf", "aac", "webm",
];

#[derive(Error, Debug)]
pub enum RemapError {
    #[error("No folder selected")]
    EmptyPath,

    #[error("Selected directory does not exist: {0}")]
    NotADirectory(PathBuf),

    #[error("Failed to build GUID pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Counts reported after a remap
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RemapReport {
    /// Number of `.meta` files found under the root
    pub meta_files: usize,

    /// Number of distinct GUIDs given a new value
    pub remapped: usize,

    /// Number of files rewritten by the propagation pass
    pub files_changed: usize,

    /// Number of distinct files skipped because they could not be read or written
    pub skipped: usize,
}

/// Counts reported by [`propagate`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PropagateReport {
    pub files_changed: usize,
    pub skipped: usize,
}

static META_GUID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"guid:\s*([0-9a-f]{32})").expect("static pattern is valid"));

/// Whether the propagation pass treats `path` as binary
pub fn is_binary(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| BINARY_EXTENSIONS.iter().any(|b| e.eq_ignore_ascii_case(b)))
        .unwrap_or(false)
}

fn is_meta(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(META_EXTENSION))
        .unwrap_or(false)
}

/// Mapping from old GUIDs to freshly generated ones.
///
/// Every generated value is distinct from all other generated values and
/// from every old GUID known at the time it was generated.
#[derive(Debug, Default, Clone)]
pub struct IdentifierMap {
    map: HashMap<Guid, Guid>,
    issued: HashSet<Guid>,
}

impl IdentifierMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get(&self, old: &Guid) -> Option<&Guid> {
        self.map.get(old)
    }

    pub fn contains(&self, old: &Guid) -> bool {
        self.map.contains_key(old)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Guid, &Guid)> {
        self.map.iter()
    }

    /// Map `old` to a random new GUID, or return its existing mapping
    pub fn insert_fresh(&mut self, old: Guid) -> &Guid {
        self.insert_with(old, Guid::generate)
    }

    /// Map `old` to a new GUID drawn from `generate`, or return its existing mapping.
    ///
    /// Candidates that collide with an issued or known GUID are discarded.
    pub fn insert_with(&mut self, old: Guid, mut generate: impl FnMut() -> Guid) -> &Guid {
        if !self.map.contains_key(&old) {
            let fresh = loop {
                let candidate = generate();
                if candidate != old
                    && !self.issued.contains(&candidate)
                    && !self.map.contains_key(&candidate)
                {
                    break candidate;
                }
                tracing::debug!("Discarding colliding GUID candidate {}", candidate);
            };
            self.issued.insert(fresh.clone());
            self.map.insert(old.clone(), fresh);
        }
        &self.map[&old]
    }

    /// Compile the map into a single-pass substitution
    ///
    /// Returns `None` for an empty map.
    pub fn compile(&self) -> Result<Option<Substitution<'_>>, regex::Error> {
        if self.map.is_empty() {
            return Ok(None);
        }
        let mut keys: Vec<&str> = self.map.keys().map(Guid::as_str).collect();
        keys.sort_unstable();
        let pattern = keys.join("|");
        let regex = regex::RegexBuilder::new(&pattern)
            .size_limit(64 * (1 << 20))
            .build()?;
        Ok(Some(Substitution { regex, map: self }))
    }
}

/// Compiled form of an [`IdentifierMap`]
///
/// Occurrences are replaced left to right in one pass, so a replacement is
/// never itself replaced again.
pub struct Substitution<'a> {
    regex: Regex,
    map: &'a IdentifierMap,
}

impl Substitution<'_> {
    /// Replace every old GUID in `text`; `None` when nothing matched
    pub fn apply(&self, text: &str) -> Option<String> {
        if !self.regex.is_match(text) {
            return None;
        }
        let replaced = self.regex.replace_all(text, |caps: &regex::Captures<'_>| {
            let old = &caps[0];
            match self.map.map.get(old) {
                Some(new) => new.to_string(),
                None => old.to_string(),
            }
        });
        Some(replaced.into_owned())
    }
}

fn log_skip(path: &Path, action: &str, err: &io::Error) {
    if err.kind() == io::ErrorKind::InvalidData {
        tracing::debug!("Skipping non-text file {}", path.display());
    } else {
        tracing::warn!("Failed to {} {}: {}", action, path.display(), err);
    }
}

/// Give every `.meta` file under `root` a new GUID and update all references under `root`.
pub fn remap_guids<F: FileSystem + ?Sized>(
    fs: &mut F,
    root: &Path,
) -> Result<RemapReport, RemapError> {
    if root.as_os_str().is_empty() {
        return Err(RemapError::EmptyPath);
    }
    if !fs.is_dir(root) {
        return Err(RemapError::NotADirectory(root.to_path_buf()));
    }

    let meta_files: Vec<PathBuf> = fs
        .walk_files(root)
        .into_iter()
        .filter(|p| is_meta(p))
        .collect();

    let mut report = RemapReport {
        meta_files: meta_files.len(),
        ..Default::default()
    };
    if meta_files.is_empty() {
        tracing::info!("No .meta files found under {}", root.display());
        return Ok(report);
    }

    let mut map = IdentifierMap::new();
    let mut skipped = BTreeSet::new();
    for meta_path in &meta_files {
        if !remap_meta_file(fs, meta_path, &mut map) {
            skipped.insert(meta_path.clone());
        }
    }

    report.remapped = map.len();
    if map.is_empty() {
        tracing::info!("No GUIDs found to remap under {}", root.display());
        report.skipped = skipped.len();
        return Ok(report);
    }

    report.files_changed = propagate_into(fs, root, &map, &mut skipped)?;
    report.skipped = skipped.len();

    Ok(report)
}

/// Rewrite the first GUID of one `.meta` file. Returns false on I/O failure.
fn remap_meta_file<F: FileSystem + ?Sized>(
    fs: &mut F,
    meta_path: &Path,
    map: &mut IdentifierMap,
) -> bool {
    let text = match fs.read_to_string(meta_path) {
        Ok(t) => t,
        Err(e) => {
            log_skip(meta_path, "read", &e);
            return false;
        }
    };

    let Some(token) = META_GUID
        .captures(&text)
        .and_then(|caps| caps.get(1))
    else {
        tracing::debug!("No GUID in {}", meta_path.display());
        return true;
    };

    let old = match Guid::parse(token.as_str()) {
        Ok(g) => g,
        Err(_) => return true,
    };
    if map.contains(&old) {
        // Shared GUID; later occurrences are handled by propagation
        return true;
    }

    let new = map.insert_fresh(old).clone();
    let mut rewritten = String::with_capacity(text.len());
    rewritten.push_str(&text[..token.start()]);
    rewritten.push_str(new.as_str());
    rewritten.push_str(&text[token.end()..]);

    tracing::debug!("{}: {} -> {}", meta_path.display(), token.as_str(), new);
    if let Err(e) = fs.write(meta_path, rewritten.as_bytes()) {
        log_skip(meta_path, "write", &e);
        return false;
    }
    true
}

/// Replace every old GUID of `map` in all non-binary files under `root`.
pub fn propagate<F: FileSystem + ?Sized>(
    fs: &mut F,
    root: &Path,
    map: &IdentifierMap,
) -> Result<PropagateReport, RemapError> {
    let mut skipped = BTreeSet::new();
    let files_changed = propagate_into(fs, root, map, &mut skipped)?;
    Ok(PropagateReport {
        files_changed,
        skipped: skipped.len(),
    })
}

/// Propagation pass; unreadable or unwritable paths are added to `skipped`.
fn propagate_into<F: FileSystem + ?Sized>(
    fs: &mut F,
    root: &Path,
    map: &IdentifierMap,
    skipped: &mut BTreeSet<PathBuf>,
) -> Result<usize, RemapError> {
    let mut files_changed = 0;
    let Some(substitution) = map.compile()? else {
        return Ok(files_changed);
    };

    for path in fs.walk_files(root) {
        if is_binary(&path) {
            continue;
        }

        let text = match fs.read_to_string(&path) {
            Ok(t) => t,
            Err(e) => {
                log_skip(&path, "read", &e);
                skipped.insert(path);
                continue;
            }
        };

        let Some(updated) = substitution.apply(&text) else {
            continue;
        };
        if updated == text {
            continue;
        }

        match fs.write(&path, updated.as_bytes()) {
            Ok(()) => {
                tracing::debug!("Updated references in {}", path.display());
                files_changed += 1;
            }
            Err(e) => {
                log_skip(&path, "write", &e);
                skipped.insert(path);
            }
        }
    }

    Ok(files_changed)
}
