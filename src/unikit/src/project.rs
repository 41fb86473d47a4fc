//! Unity project layout and the host asset index seam.

use std::path::{Path, PathBuf};

/// Folder holding all project assets
pub const ASSETS_DIR: &str = "Assets";

/// Folder holding project-wide settings assets
pub const PROJECT_SETTINGS_DIR: &str = "ProjectSettings";

/// The host's asset index, told to pick up changes after files are rewritten.
pub trait AssetIndex {
    fn refresh(&mut self);
}

/// Paths of a Unity project rooted at a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ProjectLayout { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.root.join(ASSETS_DIR)
    }

    pub fn settings_dir(&self) -> PathBuf {
        self.root.join(PROJECT_SETTINGS_DIR)
    }

    /// Resolve a `/`-separated asset path (e.g. `Assets/Scripts/A.cs`)
    pub fn resolve(&self, asset_path: &str) -> PathBuf {
        asset_path
            .split(['/', '\\'])
            .filter(|s| !s.is_empty())
            .fold(self.root.clone(), |acc, seg| acc.join(seg))
    }

    /// Express an absolute path as a `/`-separated asset path, if it lies in the project
    pub fn asset_path(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }

    /// Whether `path` is the Assets folder or lies below it
    pub fn is_inside_assets(&self, path: &Path) -> bool {
        path.starts_with(self.assets_dir())
    }
}
