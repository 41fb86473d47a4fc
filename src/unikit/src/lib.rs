//! # unikit
//!
//! Maintenance tools for Unity projects that work directly on the project's
//! files, without a running editor.
//!
//! This library provides functionality to:
//! - Give a copied folder of assets fresh GUIDs and fix the references inside it
//! - Rewrite C# namespace declarations to match the folder layout
//! - Export scripts into a single text bundle and apply bundles back
//! - Keep tags and layers in `TagManager.asset` in sync with a saved list
//! - Scaffold a Git-hosted Unity package
//!
//! All file access goes through [`vfs::FileSystem`], so every operation can
//! run against the real disk or an in-memory tree.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use unikit::{OsFileSystem, ProjectLayout};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut fs = OsFileSystem;
//!
//! // New GUIDs for a package copied in from another project
//! let report = unikit::remap_guids(&mut fs, Path::new("MyGame/Assets/Imported"))?;
//! println!("GUIDs remapped: {}", report.remapped);
//!
//! // Namespace from folder, dropping the "Scripts" segment
//! let project = ProjectLayout::new("MyGame");
//! let excluded = unikit::parse_excluded_words("Scripts");
//! unikit::sort_namespace(&mut fs, &project, "Assets/Game/Scripts/Player.cs", &excluded)?;
//! # Ok(())
//! # }
//! ```

pub mod bundle;
pub mod guid;
pub mod namespace;
pub mod project;
pub mod remap;
pub mod scaffold;
pub mod tags;
pub mod tree;
pub mod vfs;

// Re-export commonly used items
#[doc(inline)]
pub use bundle::{
    export_bundle, export_to_dir, import_bundle, parse_bundle, BundleEntry, BundleError,
    ImportReport,
};
#[doc(inline)]
pub use guid::{Guid, GuidError};
#[doc(inline)]
pub use namespace::{
    namespace_for_asset, namespace_for_folder, parse_excluded_words, rewrite_declaration,
    sort_namespace, NamespaceError, SortOutcome,
};
#[doc(inline)]
pub use project::{AssetIndex, ProjectLayout};
#[doc(inline)]
pub use remap::{propagate, remap_guids, IdentifierMap, RemapError, RemapReport};
#[doc(inline)]
pub use scaffold::{create_package, PackageRequest, PackageScaffold, ScaffoldError};
#[doc(inline)]
pub use tags::{sync_project, SyncReport, TagError, TagLayerStore, UnityYamlDocument};
#[doc(inline)]
pub use tree::{scan_project, FolderNode, Row, SelectionState};
#[doc(inline)]
pub use vfs::{FileSystem, MemoryFileSystem, OsFileSystem};
