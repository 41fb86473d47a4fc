//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting up unikit defaults.

use crate::config::Config;
use anyhow::Result;
use std::path::PathBuf;

/// Values to store; `None` leaves the current setting alone
#[derive(Debug, Default)]
pub struct Changes {
    pub project_root: Option<PathBuf>,
    pub exclude: Option<String>,
    pub file_types: Option<String>,
    pub export_dir: Option<PathBuf>,
    pub author: Option<String>,
    pub repo: Option<String>,
}

impl Changes {
    fn is_empty(&self) -> bool {
        self.project_root.is_none()
            && self.exclude.is_none()
            && self.file_types.is_none()
            && self.export_dir.is_none()
            && self.author.is_none()
            && self.repo.is_none()
    }
}

/// Handle the configure command
///
/// # Arguments
/// * `changes` - Settings to store as defaults
/// * `show` - If true, show current configuration
pub fn handle(changes: Changes, show: bool) -> Result<()> {
    let mut config = Config::load()?;

    if show {
        show_config(&config);
        return Ok(());
    }

    if changes.is_empty() {
        show_usage();
        return Ok(());
    }

    apply(&mut config, changes);
    config.save()?;

    println!("Configuration updated");
    if let Ok(path) = Config::config_path() {
        println!("Config saved to: {}", path.display());
    }

    Ok(())
}

fn apply(config: &mut Config, changes: Changes) {
    if let Some(root) = changes.project_root {
        config.project_root = Some(root);
    }
    if let Some(exclude) = changes.exclude {
        config.exclude = Some(exclude);
    }
    if let Some(types) = changes.file_types {
        config.file_types = Some(types);
    }
    if let Some(dir) = changes.export_dir {
        config.export_dir = Some(dir);
    }
    if let Some(author) = changes.author {
        config.author = Some(author);
    }
    if let Some(repo) = changes.repo {
        config.repo = Some(repo);
    }
}

/// Display current configuration
fn show_config(config: &Config) {
    fn line(label: &str, value: Option<String>) {
        match value {
            Some(v) => println!("{:<14}{}", label, v),
            None => println!("{:<14}(not set)", label),
        }
    }

    let path_str = |p: &Option<PathBuf>| p.as_ref().map(|p| p.display().to_string());
    line("Project root:", path_str(&config.project_root));
    line("Exclude:", config.exclude.clone());
    line("File types:", config.file_types.clone());
    line("Export dir:", path_str(&config.export_dir));
    line("Author:", config.author.clone());
    line("Repository:", config.repo.clone());

    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }
}

/// Show usage help for the configure command
fn show_usage() {
    println!("Usage: unikit configure --project-root PATH");
    println!("   or: unikit configure --exclude Scripts.Runtime --author NAME");
    println!("   or: unikit configure --show");
    println!();
    println!("Settings apply when the matching command-line flag is not given.");
}
