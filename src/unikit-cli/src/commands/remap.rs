//! GUID remap command handler

use super::ReimportNotice;
use anyhow::{bail, Context, Result};
use std::path::Path;
use unikit::{AssetIndex, OsFileSystem, ProjectLayout};

/// Give every asset under `folder` a new GUID and update references under `folder`
///
/// Files outside `folder` keep the old GUIDs. Relative folders are taken
/// from the project root.
pub fn handle(project: &ProjectLayout, folder: &Path) -> Result<()> {
    let folder = project.root().join(folder);
    if !folder.is_dir() {
        bail!("Folder not found: {}", folder.display());
    }

    let mut fs = OsFileSystem;
    let report = unikit::remap_guids(&mut fs, &folder)
        .with_context(|| format!("Failed to remap GUIDs in {}", folder.display()))?;

    if report.meta_files == 0 {
        println!("No .meta files found.");
        return Ok(());
    }
    if report.remapped == 0 {
        println!("No GUIDs found to remap.");
        return Ok(());
    }

    println!("Meta files processed: {}", report.meta_files);
    println!("GUIDs remapped: {}", report.remapped);
    println!("Files updated: {}", report.files_changed);
    if report.skipped > 0 {
        println!("Files skipped: {} (run with -v for details)", report.skipped);
    }

    if project.is_inside_assets(&folder) {
        ReimportNotice::default().refresh();
    }

    Ok(())
}
