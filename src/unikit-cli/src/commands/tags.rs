//! Persistent tags and layers command handlers

use super::ReimportNotice;
use anyhow::{bail, Context, Result};
use unikit::tags::{load_store, save_store, SettingsDocument, STORE_PATH, TAG_MANAGER_PATH};
use unikit::{AssetIndex, FileSystem, OsFileSystem, ProjectLayout, TagLayerStore, UnityYamlDocument};

/// Show the saved store next to what TagManager.asset currently holds
pub fn show(project: &ProjectLayout) -> Result<()> {
    let fs = OsFileSystem;
    let store = load_store(&fs, project);

    println!("Saved ({}):", STORE_PATH);
    print_list("Tags", &store.tags);
    print_list("Layers", &store.layers);

    let path = project.resolve(TAG_MANAGER_PATH);
    if fs.is_file(&path) {
        let text = fs
            .read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let doc = UnityYamlDocument::parse(&text);
        let layers: Vec<String> = doc
            .string_array("layers")
            .unwrap_or_default()
            .into_iter()
            .skip(unikit::tags::FIRST_USER_LAYER)
            .filter(|l| !l.is_empty())
            .collect();

        println!();
        println!("Project ({}):", TAG_MANAGER_PATH);
        print_list("Tags", &doc.string_array("tags").unwrap_or_default());
        print_list("User layers", &layers);
    }

    Ok(())
}

/// Replace the saved tags and layers
pub fn save(project: &ProjectLayout, tags: Vec<String>, layers: Vec<String>) -> Result<()> {
    if tags.is_empty() && layers.is_empty() {
        bail!("Nothing to save (use --tag and --layer)");
    }

    let mut fs = OsFileSystem;
    let store = save_store(&mut fs, project, &TagLayerStore::new(tags, layers))
        .context("Failed to save tags and layers")?;

    println!(
        "Saved {} tags and {} layers to {}",
        store.tags.len(),
        store.layers.len(),
        STORE_PATH
    );
    Ok(())
}

/// Apply the saved store to TagManager.asset
pub fn sync(project: &ProjectLayout) -> Result<()> {
    if !project.settings_dir().is_dir() {
        bail!("No ProjectSettings folder in {}", project.root().display());
    }

    let mut fs = OsFileSystem;
    let report = unikit::sync_project(&mut fs, project).context("Failed to sync tags and layers")?;

    if !report.changed() {
        println!("Tags and layers already in sync.");
        return Ok(());
    }

    print_change("Added tags", &report.added_tags);
    print_change("Removed tags", &report.removed_tags);
    print_change("Added layers", &report.added_layers);
    print_change("Cleared layers", &report.removed_layers);
    if !report.no_slot_layers.is_empty() {
        println!(
            "No free layer slot for: {}",
            report.no_slot_layers.join(", ")
        );
    }

    ReimportNotice::default().refresh();
    Ok(())
}

fn print_list(label: &str, names: &[String]) {
    if names.is_empty() {
        println!("  {}: (none)", label);
    } else {
        println!("  {}: {}", label, names.join(", "));
    }
}

fn print_change(label: &str, names: &[String]) {
    if !names.is_empty() {
        println!("{}: {}", label, names.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_save_requires_names() {
        let dir = tempfile::tempdir().unwrap();
        let project = ProjectLayout::new(dir.path());
        assert!(save(&project, vec![], vec![]).is_err());
    }

    #[test]
    fn test_save_writes_store() {
        let dir = tempfile::tempdir().unwrap();
        let project = ProjectLayout::new(dir.path());

        save(
            &project,
            vec!["Enemy".to_string(), " Enemy ".to_string()],
            vec!["Ground".to_string()],
        )
        .unwrap();

        let store = load_store(&OsFileSystem, &project);
        assert_eq!(store.tags, vec!["Enemy"]);
        assert_eq!(store.layers, vec!["Ground"]);
        assert!(dir.path().join(STORE_PATH).is_file());
    }

    #[test]
    fn test_sync_without_tag_manager_fails() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("ProjectSettings")).unwrap();
        let project = ProjectLayout::new(dir.path());

        assert!(sync(&project).is_err());
    }

    #[test]
    fn test_show_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let project = ProjectLayout::new(dir.path());
        show(&project).unwrap();
    }
}
