//! Script bundle export and import handlers

use super::{select_files, ReimportNotice};
use anyhow::{bail, Context, Result};
use chrono::Utc;
use std::fs;
use std::path::Path;
use unikit::{AssetIndex, OsFileSystem, ProjectLayout};

/// Write the selected files into one bundle in `out_dir`
pub fn export(
    project: &ProjectLayout,
    select: &[String],
    out_dir: &Path,
    name: Option<&str>,
    file_types: &str,
) -> Result<()> {
    let mut fs = OsFileSystem;
    let files = select_files(&fs, project, select, file_types)?;
    if files.is_empty() {
        bail!("Nothing selected to export");
    }

    let name = match name {
        Some(name) => name.to_string(),
        None => project_name(project),
    };

    let path = unikit::export_to_dir(&mut fs, project, &files, out_dir, &name, Utc::now())
        .context("Failed to export scripts")?
        .context("Nothing selected to export")?;

    println!("Exported {} files to {}", files.len(), path.display());
    Ok(())
}

/// Apply the bundle at `bundle` to the project
pub fn import(project: &ProjectLayout, bundle: &Path, root_folder: &str) -> Result<()> {
    let text = fs::read_to_string(bundle)
        .with_context(|| format!("Failed to read bundle {}", bundle.display()))?;

    let mut fs = OsFileSystem;
    let report = unikit::import_bundle(&mut fs, project, &text, root_folder)
        .with_context(|| format!("Failed to import {}", bundle.display()))?;

    println!(
        "Updated {} files, created {} files",
        report.overwritten.len(),
        report.created.len()
    );
    for path in &report.created {
        println!("  created {}", path.display());
    }
    for name in &report.skipped {
        println!("  skipped {}", name);
    }

    if !report.overwritten.is_empty() || !report.created.is_empty() {
        ReimportNotice::default().refresh();
    }

    Ok(())
}

fn project_name(project: &ProjectLayout) -> String {
    project
        .root()
        .canonicalize()
        .ok()
        .as_deref()
        .unwrap_or(project.root())
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Project".to_string())
}
