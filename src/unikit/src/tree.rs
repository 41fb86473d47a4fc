//! Folder tree of project scripts and the selection made over it.
//!
//! The tree is plain data built from a list of asset paths. Expansion and
//! selection live in a separate [`SelectionState`] owned by the caller, so
//! several views can share one tree.

use std::collections::BTreeMap;

use crate::project::ProjectLayout;
use crate::vfs::FileSystem;

/// Default file type filter
pub const DEFAULT_FILE_TYPES: &str = ".cs .asset";

/// Parse a file type filter such as `".cs, .asset;.shader"`.
///
/// Entries are lowercased; entries not starting with `.` are ignored.
pub fn parse_file_types(raw: &str) -> Vec<String> {
    raw.split([' ', ',', ';'])
        .map(|t| t.trim().to_lowercase())
        .filter(|t| t.starts_with('.'))
        .collect()
}

/// A folder with its child folders and the files directly inside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderNode {
    pub name: String,

    /// Asset path of the folder, e.g. `Assets/Scripts`
    pub path: String,

    pub children: BTreeMap<String, FolderNode>,

    /// Asset paths of the files in this folder
    pub files: Vec<String>,
}

impl FolderNode {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        FolderNode {
            name: name.into(),
            path: path.into(),
            children: BTreeMap::new(),
            files: Vec::new(),
        }
    }

    /// Build a tree rooted at `root` from `/`-separated asset paths.
    ///
    /// Paths outside `root` are ignored.
    pub fn build<I, S>(root: &str, asset_paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let root = root.trim_end_matches('/');
        let name = root.rsplit('/').next().unwrap_or(root);
        let mut node = FolderNode::new(name, root);

        for asset_path in asset_paths {
            let asset_path = asset_path.as_ref().replace('\\', "/");
            let Some((folder, _)) = asset_path.rsplit_once('/') else {
                continue;
            };

            let relative = if folder == root {
                ""
            } else if let Some(rest) = folder.strip_prefix(root).and_then(|r| r.strip_prefix('/')) {
                rest
            } else {
                tracing::debug!("Ignoring {} outside {}", asset_path, root);
                continue;
            };

            let mut current = &mut node;
            let mut current_path = root.to_string();
            for part in relative.split('/').filter(|p| !p.is_empty()) {
                current_path = format!("{}/{}", current_path, part);
                current = current
                    .children
                    .entry(part.to_string())
                    .or_insert_with(|| FolderNode::new(part, current_path.clone()));
            }
            current.files.push(asset_path);
        }

        node
    }

    /// Find the folder with asset path `path`
    pub fn find(&self, path: &str) -> Option<&FolderNode> {
        if self.path == path {
            return Some(self);
        }
        self.children.values().find_map(|c| c.find(path))
    }

    /// Whether `file` is directly or indirectly in this folder
    pub fn contains_file(&self, file: &str) -> bool {
        self.files.iter().any(|f| f == file) || self.children.values().any(|c| c.contains_file(file))
    }

    /// Every file in this folder's subtree
    pub fn subtree_files(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_files(&mut out);
        out
    }

    fn collect_files<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.extend(self.files.iter().map(String::as_str));
        for child in self.children.values() {
            child.collect_files(out);
        }
    }

    fn sorted_children(&self) -> Vec<&FolderNode> {
        let mut children: Vec<&FolderNode> = self.children.values().collect();
        children.sort_by_key(|c| c.name.to_lowercase());
        children
    }

    fn sorted_files(&self) -> Vec<&str> {
        let mut files: Vec<&str> = self.files.iter().map(String::as_str).collect();
        files.sort_by_key(|f| f.to_lowercase());
        files
    }
}

/// Scan `root_folder` of a project for files with one of `file_types`.
///
/// Returns `None` if the root folder does not exist.
pub fn scan_project<F: FileSystem + ?Sized>(
    fs: &F,
    project: &ProjectLayout,
    root_folder: &str,
    file_types: &[String],
) -> Option<FolderNode> {
    let dir = project.resolve(root_folder);
    if !fs.is_dir(&dir) {
        return None;
    }

    let assets = fs
        .walk_files(&dir)
        .into_iter()
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .map(|e| file_types.contains(&format!(".{}", e.to_lowercase())))
                .unwrap_or(false)
        })
        .filter_map(|p| project.asset_path(&p));

    Some(FolderNode::build(root_folder, assets))
}

/// One line of the rendered tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row<'a> {
    Folder { node: &'a FolderNode, indent: usize },
    File { path: &'a str, indent: usize },
}

/// Expansion and selection state for one view of a [`FolderNode`] tree
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SelectionState {
    expanded: BTreeMap<String, bool>,
    selected_folders: BTreeMap<String, bool>,
    selected_files: BTreeMap<String, bool>,
}

impl SelectionState {
    /// Fresh state for `tree`: root expanded, everything else collapsed, nothing selected
    pub fn for_tree(tree: &FolderNode) -> Self {
        let mut state = SelectionState::default();
        state.register(tree);
        state.expanded.insert(tree.path.clone(), true);
        state
    }

    fn register(&mut self, node: &FolderNode) {
        self.expanded.insert(node.path.clone(), false);
        self.selected_folders.insert(node.path.clone(), false);
        for file in &node.files {
            self.selected_files.insert(file.clone(), false);
        }
        for child in node.children.values() {
            self.register(child);
        }
    }

    pub fn is_expanded(&self, path: &str) -> bool {
        self.expanded.get(path).copied().unwrap_or(false)
    }

    pub fn set_expanded(&mut self, path: &str, expanded: bool) {
        self.expanded.insert(path.to_string(), expanded);
    }

    /// Flip a folder's expansion, returning the new value
    pub fn toggle_expanded(&mut self, path: &str) -> bool {
        let expanded = !self.is_expanded(path);
        self.set_expanded(path, expanded);
        expanded
    }

    pub fn is_folder_selected(&self, path: &str) -> bool {
        self.selected_folders.get(path).copied().unwrap_or(false)
    }

    pub fn is_file_selected(&self, path: &str) -> bool {
        self.selected_files.get(path).copied().unwrap_or(false)
    }

    /// Select or deselect a folder and its whole subtree.
    ///
    /// Returns false if the folder is not in `tree`.
    pub fn set_folder_selected(&mut self, tree: &FolderNode, path: &str, selected: bool) -> bool {
        let Some(node) = tree.find(path) else {
            return false;
        };
        self.apply_to_subtree(node, selected);
        self.refresh_ancestors(tree, parent_of(path));
        true
    }

    fn apply_to_subtree(&mut self, node: &FolderNode, selected: bool) {
        self.selected_folders.insert(node.path.clone(), selected);
        for file in &node.files {
            self.selected_files.insert(file.clone(), selected);
        }
        for child in node.children.values() {
            self.apply_to_subtree(child, selected);
        }
    }

    /// Select or deselect one file, updating the folders above it.
    ///
    /// Returns false if the file is not in `tree`.
    pub fn set_file_selected(&mut self, tree: &FolderNode, file: &str, selected: bool) -> bool {
        if !tree.contains_file(file) {
            return false;
        }
        self.selected_files.insert(file.to_string(), selected);
        self.refresh_ancestors(tree, parent_of(file));
        true
    }

    /// Select a file or folder by asset path. Returns false if neither exists.
    pub fn select(&mut self, tree: &FolderNode, path: &str) -> bool {
        let path = path.replace('\\', "/");
        let path = path.trim_end_matches('/');
        self.set_folder_selected(tree, path, true) || self.set_file_selected(tree, path, true)
    }

    /// A folder is selected iff every file in its subtree is
    fn refresh_ancestors(&mut self, tree: &FolderNode, start: Option<&str>) {
        let mut current = start;
        while let Some(folder) = current {
            let Some(node) = tree.find(folder) else {
                break;
            };
            let all = node
                .subtree_files()
                .iter()
                .all(|f| self.is_file_selected(f));
            self.selected_folders.insert(folder.to_string(), all);

            if folder == tree.path {
                break;
            }
            current = parent_of(folder);
        }
    }

    /// Rows to render: each folder, then its files, then its child folders,
    /// descending only into expanded folders.
    pub fn visible_rows<'t>(&self, tree: &'t FolderNode) -> Vec<Row<'t>> {
        let mut rows = Vec::new();
        self.push_rows(tree, 0, &mut rows);
        rows
    }

    fn push_rows<'t>(&self, node: &'t FolderNode, indent: usize, rows: &mut Vec<Row<'t>>) {
        rows.push(Row::Folder { node, indent });
        if !self.is_expanded(&node.path) {
            return;
        }
        for path in node.sorted_files() {
            rows.push(Row::File {
                path,
                indent: indent + 1,
            });
        }
        for child in node.sorted_children() {
            self.push_rows(child, indent + 1, rows);
        }
    }

    /// Selected file paths, sorted
    pub fn selected_files(&self) -> Vec<String> {
        self.selected_files
            .iter()
            .filter(|(_, s)| **s)
            .map(|(p, _)| p.clone())
            .collect()
    }

    pub fn any_selected(&self) -> bool {
        self.selected_files.values().any(|s| *s) || self.selected_folders.values().any(|s| *s)
    }

    /// Folder to place new content in: the folder of the first selected
    /// file, else the first selected folder, else `root`.
    pub fn target_folder(&self, root: &str) -> String {
        if let Some(folder) = self
            .selected_files
            .iter()
            .filter(|(_, s)| **s)
            .find_map(|(p, _)| parent_of(p))
        {
            return folder.to_string();
        }

        self.selected_folders
            .iter()
            .find(|(_, s)| **s)
            .map(|(p, _)| p.clone())
            .unwrap_or_else(|| root.to_string())
    }
}

fn parent_of(path: &str) -> Option<&str> {
    path.rsplit_once('/').map(|(parent, _)| parent).filter(|p| !p.is_empty())
}
