//! Command handlers for unikit CLI
//!
//! Each submodule handles one subcommand, with shared project and
//! selection helpers here.

pub mod bundle;
pub mod configure;
pub mod namespace;
pub mod package;
pub mod remap;
pub mod tags;
pub mod tree;

use crate::config::Config;
use anyhow::{bail, Result};
use std::path::PathBuf;
use unikit::project::ASSETS_DIR;
use unikit::tree::parse_file_types;
use unikit::{AssetIndex, FileSystem, ProjectLayout, SelectionState};

/// Resolve the project root and check it looks like a Unity project
pub fn open_project(config: &Config, flag: Option<PathBuf>) -> Result<ProjectLayout> {
    let project = ProjectLayout::new(config.project_root(flag)?);
    if !project.assets_dir().is_dir() {
        bail!(
            "{} is not a Unity project (no {} folder)",
            project.root().display(),
            ASSETS_DIR
        );
    }
    Ok(project)
}

/// Asset paths of every file of `file_types` picked out by `select`.
///
/// Each entry of `select` is an asset path of a file or folder; folders
/// select their whole subtree.
pub fn select_files<F: FileSystem + ?Sized>(
    fs: &F,
    project: &ProjectLayout,
    select: &[String],
    file_types: &str,
) -> Result<Vec<String>> {
    let types = parse_file_types(file_types);
    let Some(tree) = unikit::scan_project(fs, project, ASSETS_DIR, &types) else {
        bail!("No {} folder in {}", ASSETS_DIR, project.root().display());
    };

    let mut state = SelectionState::for_tree(&tree);
    for path in select {
        if !state.select(&tree, path) {
            bail!("{} is not a {} file or folder in the project", path, file_types);
        }
    }

    Ok(state.selected_files())
}

/// Tells the user Unity has to pick up rewritten files
#[derive(Debug, Default)]
pub struct ReimportNotice {
    requested: bool,
}

impl ReimportNotice {
    pub fn requested(&self) -> bool {
        self.requested
    }
}

impl AssetIndex for ReimportNotice {
    fn refresh(&mut self) {
        if !self.requested {
            tracing::info!("Project files changed; Unity will reimport them on focus");
        }
        self.requested = true;
    }
}
