//! Folder tree command handler

use anyhow::{bail, Result};
use unikit::tree::parse_file_types;
use unikit::{FolderNode, OsFileSystem, ProjectLayout, Row, SelectionState};

/// Print the tree of project files of `file_types` under `root`
pub fn handle(project: &ProjectLayout, root: &str, file_types: &str, all: bool) -> Result<()> {
    let types = parse_file_types(file_types);
    if types.is_empty() {
        bail!("No file types given (expected e.g. \".cs .asset\")");
    }

    let Some(tree) = unikit::scan_project(&OsFileSystem, project, root, &types) else {
        bail!("Folder not found: {}", project.resolve(root).display());
    };

    print!("{}", render(&tree, all));
    Ok(())
}

fn render(tree: &FolderNode, all: bool) -> String {
    let mut state = SelectionState::for_tree(tree);
    if all {
        expand_all(&mut state, tree);
    } else {
        // Top-level folders open so the first screen is useful
        for child in tree.children.values() {
            state.set_expanded(&child.path, true);
        }
    }

    let mut out = String::new();
    for row in state.visible_rows(tree) {
        match row {
            Row::Folder { node, indent } => {
                let marker = if node.children.is_empty() && node.files.is_empty() {
                    ""
                } else if state.is_expanded(&node.path) {
                    "- "
                } else {
                    "+ "
                };
                out.push_str(&format!("{}{}{}/\n", "  ".repeat(indent), marker, node.name));
            }
            Row::File { path, indent } => {
                let name = path.rsplit('/').next().unwrap_or(path);
                out.push_str(&format!("{}{}\n", "  ".repeat(indent), name));
            }
        }
    }
    out
}

fn expand_all(state: &mut SelectionState, node: &FolderNode) {
    state.set_expanded(&node.path, true);
    for child in node.children.values() {
        expand_all(state, child);
    }
}
