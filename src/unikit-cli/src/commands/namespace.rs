//! Namespace sorting command handler

use super::{select_files, ReimportNotice};
use anyhow::{Context, Result};
use unikit::{AssetIndex, OsFileSystem, ProjectLayout, SortOutcome};

/// Rewrite namespaces of the selected scripts to match their folders
pub fn handle(project: &ProjectLayout, select: &[String], exclude: &str) -> Result<()> {
    let mut fs = OsFileSystem;
    let scripts = select_files(&fs, project, select, ".cs")?;
    let excluded = unikit::parse_excluded_words(exclude);

    let counts = sort_all(&mut fs, project, &scripts, &excluded)?;

    println!("Namespaces updated: {}", counts.rewritten);
    if counts.removed > 0 {
        println!("Namespaces removed: {}", counts.removed);
    }
    if counts.no_declaration > 0 {
        println!("Scripts without a namespace: {}", counts.no_declaration);
    }

    if counts.rewritten + counts.removed > 0 {
        ReimportNotice::default().refresh();
    }

    Ok(())
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Counts {
    rewritten: usize,
    removed: usize,
    no_declaration: usize,
}

fn sort_all(
    fs: &mut OsFileSystem,
    project: &ProjectLayout,
    scripts: &[String],
    excluded: &[String],
) -> Result<Counts> {
    let mut counts = Counts::default();

    for script in scripts {
        let outcome = unikit::sort_namespace(fs, project, script, excluded)
            .with_context(|| format!("Failed to sort namespace of {}", script))?;

        match outcome {
            SortOutcome::Rewritten { .. } => counts.rewritten += 1,
            SortOutcome::Removed => counts.removed += 1,
            SortOutcome::NoDeclaration => counts.no_declaration += 1,
            SortOutcome::Missing => {
                tracing::warn!("{} disappeared before it could be sorted", script);
            }
        }
    }

    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_sort_selected_folder() {
        let dir = tempfile::tempdir().unwrap();
        let scripts = dir.path().join("Assets").join("Game").join("Scripts");
        fs::create_dir_all(&scripts).unwrap();
        fs::write(
            scripts.join("Player.cs"),
            "namespace Old.Place\n{\n    class Player {}\n}\n",
        )
        .unwrap();
        fs::write(scripts.join("Util.cs"), "static class Util {}\n").unwrap();

        let project = ProjectLayout::new(dir.path());
        handle(&project, &["Assets/Game".to_string()], "Scripts").unwrap();

        let player = fs::read_to_string(scripts.join("Player.cs")).unwrap();
        assert!(player.starts_with("namespace Game\n"));
        assert_eq!(
            fs::read_to_string(scripts.join("Util.cs")).unwrap(),
            "static class Util {}\n"
        );
    }

    #[test]
    fn test_counts() {
        let dir = tempfile::tempdir().unwrap();
        let assets = dir.path().join("Assets");
        fs::create_dir_all(&assets).unwrap();
        fs::write(assets.join("Root.cs"), "namespace Old;\nclass Root {}\n").unwrap();
        fs::write(assets.join("Plain.cs"), "class Plain {}\n").unwrap();

        let project = ProjectLayout::new(dir.path());
        let scripts = vec!["Assets/Plain.cs".to_string(), "Assets/Root.cs".to_string()];
        let counts = sort_all(&mut OsFileSystem, &project, &scripts, &[]).unwrap();

        assert_eq!(
            counts,
            Counts {
                rewritten: 0,
                removed: 1,
                no_declaration: 1,
            }
        );
    }
}
