//! Core CLI definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::tags::TagsCommand;

#[derive(Parser)]
#[command(name = "unikit")]
#[command(about = "Unity project maintenance tools", long_about = None)]
pub struct Cli {
    /// Unity project root (uses configured default, then the current directory)
    #[arg(short, long, global = true, env = "UNIKIT_PROJECT")]
    pub project: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Give every asset in a folder a new GUID and update references inside it
    #[command(visible_alias = "r")]
    Remap {
        /// Folder to remap (e.g. a package copied from another project)
        folder: PathBuf,
    },

    /// Rewrite namespace declarations to match folder layout
    #[command(visible_alias = "ns")]
    Namespace {
        /// Scripts or folders to sort, as asset paths (e.g. Assets/Game)
        #[arg(required = true)]
        select: Vec<String>,

        /// Folder names to leave out of namespaces, dot separated (e.g. "Scripts.Runtime")
        #[arg(short, long)]
        exclude: Option<String>,
    },

    /// Show the folder tree of project scripts
    #[command(visible_alias = "t")]
    Tree {
        /// File types to list (e.g. ".cs .asset")
        #[arg(long)]
        types: Option<String>,

        /// Folder to start from
        #[arg(long, default_value = unikit::project::ASSETS_DIR)]
        root: String,

        /// Expand every folder
        #[arg(short, long)]
        all: bool,
    },

    /// Export scripts into a single text bundle
    #[command(visible_alias = "e")]
    Export {
        /// Scripts or folders to export, as asset paths
        #[arg(required = true)]
        select: Vec<String>,

        /// Directory to write the bundle to
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Bundle name prefix (defaults to the project folder name)
        #[arg(short, long)]
        name: Option<String>,

        /// File types included when a folder is selected
        #[arg(long)]
        types: Option<String>,
    },

    /// Apply a script bundle to the project
    #[command(visible_alias = "i")]
    Import {
        /// Bundle file produced by `export`
        bundle: PathBuf,

        /// Folder new scripts are placed under, by namespace
        #[arg(long, default_value = unikit::project::ASSETS_DIR)]
        root: String,
    },

    /// Persistent tags and layers
    Tags {
        #[command(subcommand)]
        command: TagsCommand,
    },

    /// Create a Git-hosted Unity package scaffold
    Package {
        /// Package name (e.g. MyCoolTool)
        name: String,

        /// Author name (uses configured default if not provided)
        #[arg(long)]
        author: Option<String>,

        /// Package version
        #[arg(long, default_value = unikit::scaffold::DEFAULT_VERSION)]
        version: String,

        /// Repository root or template with {repo} (uses configured default if not provided)
        #[arg(long)]
        repo: Option<String>,

        /// Asset folder to create the package in
        #[arg(long, default_value = unikit::project::ASSETS_DIR)]
        target: String,
    },

    /// Configure default settings
    #[command(visible_alias = "c")]
    Configure {
        /// Set default project root
        #[arg(long)]
        project_root: Option<PathBuf>,

        /// Set default namespace exclusions
        #[arg(long)]
        exclude: Option<String>,

        /// Set default file types for tree and export
        #[arg(long)]
        file_types: Option<String>,

        /// Set default export directory
        #[arg(long)]
        export_dir: Option<PathBuf>,

        /// Set default package author
        #[arg(long)]
        author: Option<String>,

        /// Set default package repository root
        #[arg(long)]
        repo: Option<String>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}
