//! Configuration management for unikit CLI

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Default Unity project root
    pub project_root: Option<PathBuf>,

    /// Default namespace exclusions, dot separated
    pub exclude: Option<String>,

    /// Default file types for tree and export, e.g. ".cs .asset"
    pub file_types: Option<String>,

    /// Default directory for exported bundles
    pub export_dir: Option<PathBuf>,

    /// Default package author
    pub author: Option<String>,

    /// Default package repository root or template
    pub repo: Option<String>,
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("unikit");

        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration from file, or create default if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        toml::from_str(&contents).context("Failed to parse config file")
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory at {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(config_path, contents)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        Ok(())
    }

    /// Project root from the command line, then config, then the current directory
    pub fn project_root(&self, flag: Option<PathBuf>) -> Result<PathBuf> {
        match flag.or_else(|| self.project_root.clone()) {
            Some(root) => Ok(root),
            None => std::env::current_dir().context("Could not determine current directory"),
        }
    }

    pub fn exclude(&self) -> &str {
        self.exclude.as_deref().unwrap_or("")
    }

    pub fn file_types(&self) -> &str {
        self.file_types
            .as_deref()
            .unwrap_or(unikit::tree::DEFAULT_FILE_TYPES)
    }
}
