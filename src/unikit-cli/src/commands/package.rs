//! Package scaffold command handler

use super::ReimportNotice;
use anyhow::{Context, Result};
use unikit::scaffold::http_url;
use unikit::{AssetIndex, OsFileSystem, PackageRequest, ProjectLayout};

/// Create the package folder and print how to install it
pub fn handle(project: &ProjectLayout, request: &PackageRequest) -> Result<()> {
    let mut fs = OsFileSystem;
    let scaffold = unikit::create_package(&mut fs, project, request)
        .context("Failed to create package")?;

    println!("Created {}", scaffold.asset_folder);
    for file in &scaffold.files {
        println!("  {}", file.display());
    }
    println!();
    println!("Repository: {}", scaffold.repo_url);
    println!("Homepage:   {}", http_url(&scaffold.repo_url));
    println!("Install via Package Manager > Add package from git URL.");

    ReimportNotice::default().refresh();
    Ok(())
}
