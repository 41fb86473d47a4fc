//! Namespace sorting for C# scripts.
//!
//! A script's namespace is derived from its folder below `Assets`:
//! `Assets/Game/Player/Movement.cs` belongs in `Game.Player`. Segments the
//! user excludes (e.g. `Scripts`, `Runtime`) are dropped from the result.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use crate::project::{ProjectLayout, ASSETS_DIR};
use crate::vfs::FileSystem;

/// Replaces a declaration when no namespace remains
pub const REMOVED_MARKER: &str = "// namespace removed by tool";

#[derive(Error, Debug)]
pub enum NamespaceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of sorting one script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortOutcome {
    /// The script does not exist
    Missing,

    /// The script has no namespace declaration line
    NoDeclaration,

    /// The declaration now names `namespace`
    Rewritten { namespace: String },

    /// Every segment was excluded and the declaration was replaced by [`REMOVED_MARKER`]
    Removed,
}

static DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*namespace\s+)([^\s{;]+)(\s*[{;])?").expect("static pattern is valid")
});

/// Parse a user-entered exclusion list such as `"Scripts.Runtime"`.
///
/// Quotes are stripped, the rest is split on `.`, and duplicates are dropped
/// case-insensitively keeping the first spelling.
pub fn parse_excluded_words(raw: &str) -> Vec<String> {
    let cleaned: String = raw.chars().filter(|c| *c != '"' && *c != '\'').collect();

    let mut seen = HashSet::new();
    cleaned
        .trim()
        .split('.')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_lowercase()))
        .map(String::from)
        .collect()
}

/// Drop excluded segments from a dotted namespace
fn sanitize(namespace: &str, excluded: &[String]) -> String {
    let excluded: HashSet<String> = excluded
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect();

    namespace
        .split('.')
        .filter(|p| !p.is_empty())
        .filter(|p| !excluded.contains(&p.to_lowercase()))
        .collect::<Vec<_>>()
        .join(".")
}

/// Namespace for scripts in `folder`, an asset path such as `Assets/Foo/Bar`
pub fn namespace_for_folder(folder: &str, excluded: &[String]) -> String {
    let folder = folder.replace('\\', "/");
    let folder = folder.trim_end_matches('/');

    let prefix = format!("{}/", ASSETS_DIR);
    let trimmed = if folder == ASSETS_DIR {
        ""
    } else {
        folder.strip_prefix(&prefix).unwrap_or(folder)
    };

    sanitize(&trimmed.replace('/', "."), excluded)
}

/// Namespace for the script at `asset_path`, e.g. `Assets/Foo/Bar/Baz.cs`
pub fn namespace_for_asset(asset_path: &str, excluded: &[String]) -> String {
    let normalized = asset_path.replace('\\', "/");
    let folder = match normalized.rfind('/') {
        Some(idx) => &normalized[..idx],
        None => "",
    };
    namespace_for_folder(folder, excluded)
}

/// Rewrite the first namespace declaration in `text`.
///
/// Only the declared name changes; indentation and anything following the
/// name on that line (`{`, `;`, comments) are kept. An empty `namespace`
/// replaces the whole line with [`REMOVED_MARKER`], including a `{` that
/// shared it. Returns `None` when no line declares a namespace.
pub fn rewrite_declaration(text: &str, namespace: &str) -> Option<String> {
    let pattern = &*DECLARATION;
    let mut out = String::with_capacity(text.len() + namespace.len());
    let mut rewritten = false;

    for line in text.split_inclusive('\n') {
        if rewritten {
            out.push_str(line);
            continue;
        }

        let (body, ending) = split_line_ending(line);
        let Some(caps) = pattern.captures(body) else {
            out.push_str(line);
            continue;
        };

        if namespace.is_empty() {
            out.push_str(REMOVED_MARKER);
        } else {
            let name = caps.get(2)?;
            out.push_str(&body[..name.start()]);
            out.push_str(namespace);
            out.push_str(&body[name.end()..]);
        }
        out.push_str(ending);
        rewritten = true;
    }

    rewritten.then_some(out)
}

fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

/// Rewrite the namespace of the script at `asset_path` to match its folder.
pub fn sort_namespace<F: FileSystem + ?Sized>(
    fs: &mut F,
    project: &ProjectLayout,
    asset_path: &str,
    excluded: &[String],
) -> Result<SortOutcome, NamespaceError> {
    let full_path = project.resolve(asset_path);
    if !fs.is_file(&full_path) {
        return Ok(SortOutcome::Missing);
    }

    let namespace = namespace_for_asset(asset_path, excluded);
    sort_file(fs, &full_path, &namespace)
}

fn sort_file<F: FileSystem + ?Sized>(
    fs: &mut F,
    path: &Path,
    namespace: &str,
) -> Result<SortOutcome, NamespaceError> {
    let text = fs.read_to_string(path)?;
    let Some(updated) = rewrite_declaration(&text, namespace) else {
        tracing::debug!("No namespace declaration in {}", path.display());
        return Ok(SortOutcome::NoDeclaration);
    };

    if updated != text {
        fs.write(path, updated.as_bytes())?;
    }

    if namespace.is_empty() {
        tracing::info!("Removed namespace from {}", path.display());
        Ok(SortOutcome::Removed)
    } else {
        tracing::info!("{} -> namespace {}", path.display(), namespace);
        Ok(SortOutcome::Rewritten {
            namespace: namespace.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::MemoryFileSystem;

    fn words(raw: &str) -> Vec<String> {
        parse_excluded_words(raw)
    }

    #[test]
    fn test_namespace_from_folder() {
        assert_eq!(namespace_for_folder("Assets/Foo/Bar", &[]), "Foo.Bar");
        assert_eq!(namespace_for_folder("Assets/Foo/Bar", &words("Foo")), "Bar");
        assert_eq!(namespace_for_folder("Assets/Foo/Bar", &words("foo.BAR")), "");
        assert_eq!(namespace_for_folder("Assets", &[]), "");
    }

    #[test]
    fn test_namespace_outside_assets_keeps_all_segments() {
        assert_eq!(
            namespace_for_folder("Packages/Tools/Editor", &words("Editor")),
            "Packages.Tools"
        );
    }

    #[test]
    fn test_namespace_for_asset() {
        assert_eq!(
            namespace_for_asset("Assets\\Game\\Scripts\\Player.cs", &words("Scripts")),
            "Game"
        );
        assert_eq!(namespace_for_asset("Assets/Player.cs", &[]), "");
    }

    #[test]
    fn test_dotted_folder_names_split() {
        assert_eq!(
            namespace_for_folder("Assets/Company.Product/Core", &words("Product")),
            "Company.Core"
        );
    }

    #[test]
    fn test_parse_excluded_words() {
        assert_eq!(
            words(" \"Scripts.Runtime. scripts..'Editor'\" "),
            vec!["Scripts", "Runtime", "Editor"]
        );
        assert!(words("   ").is_empty());
        assert!(words("''").is_empty());
    }

    #[test]
    fn test_rewrite_block_form() {
        let text = "using System;\n\nnamespace Old.Name\n{\n    class A {}\n}\n";
        let out = rewrite_declaration(text, "Foo.Bar").unwrap();
        assert_eq!(out, "using System;\n\nnamespace Foo.Bar\n{\n    class A {}\n}\n");
    }

    #[test]
    fn test_rewrite_block_form_same_line() {
        let text = "namespace Old {\r\n  class A {}\r\n}\r\n";
        let out = rewrite_declaration(text, "New").unwrap();
        assert_eq!(out, "namespace New {\r\n  class A {}\r\n}\r\n");
    }

    #[test]
    fn test_rewrite_terminator_form() {
        let text = "namespace Old.Name;\n\nclass A {}\n";
        let out = rewrite_declaration(text, "Foo").unwrap();
        assert_eq!(out, "namespace Foo;\n\nclass A {}\n");
    }

    #[test]
    fn test_rewrite_only_first_declaration() {
        let text = "namespace A\n{\n}\nnamespace B\n{\n}";
        let out = rewrite_declaration(text, "C").unwrap();
        assert_eq!(out, "namespace C\n{\n}\nnamespace B\n{\n}");
    }

    #[test]
    fn test_empty_namespace_inserts_marker() {
        let text = "namespace Old;\nclass A {}\n";
        let out = rewrite_declaration(text, "").unwrap();
        assert_eq!(out, format!("{}\nclass A {{}}\n", REMOVED_MARKER));
        assert!(!out.contains("namespace ;"));
    }

    #[test]
    fn test_empty_namespace_replaces_whole_line() {
        // a brace on its own line survives, a same-line brace goes with the line
        let own_line = "namespace Old\n{\n  class A {}\n}\n";
        assert_eq!(
            rewrite_declaration(own_line, "").unwrap(),
            format!("{}\n{{\n  class A {{}}\n}}\n", REMOVED_MARKER)
        );

        let same_line = "namespace Old {\n  class A {}\n}\n";
        assert_eq!(
            rewrite_declaration(same_line, "").unwrap(),
            format!("{}\n  class A {{}}\n}}\n", REMOVED_MARKER)
        );
    }

    #[test]
    fn test_no_declaration() {
        assert_eq!(rewrite_declaration("class A {}\n// namespace\n", "Foo"), None);
    }

    #[test]
    fn test_sort_namespace_rewrites_file() {
        let mut fs = MemoryFileSystem::new();
        let project = ProjectLayout::new("/proj");
        fs.insert(
            "/proj/Assets/Game/Scripts/Player.cs",
            "namespace Wrong\n{\n    class Player {}\n}\n",
        );

        let outcome = sort_namespace(
            &mut fs,
            &project,
            "Assets/Game/Scripts/Player.cs",
            &words("Scripts"),
        )
        .unwrap();

        assert_eq!(
            outcome,
            SortOutcome::Rewritten {
                namespace: "Game".to_string()
            }
        );
        assert_eq!(
            fs.get_str("/proj/Assets/Game/Scripts/Player.cs"),
            Some("namespace Game\n{\n    class Player {}\n}\n")
        );
    }

    #[test]
    fn test_sort_namespace_removes_when_all_excluded() {
        let mut fs = MemoryFileSystem::new();
        let project = ProjectLayout::new("/proj");
        fs.insert("/proj/Assets/Scripts/A.cs", "namespace X;\nclass A {}\n");

        let outcome =
            sort_namespace(&mut fs, &project, "Assets/Scripts/A.cs", &words("Scripts")).unwrap();
        assert_eq!(outcome, SortOutcome::Removed);
        assert!(fs
            .get_str("/proj/Assets/Scripts/A.cs")
            .unwrap()
            .starts_with(REMOVED_MARKER));
    }

    #[test]
    fn test_sort_namespace_without_declaration_is_untouched() {
        let mut fs = MemoryFileSystem::new();
        let project = ProjectLayout::new("/proj");
        let original = "class A {}\r\n\r\n";
        fs.insert("/proj/Assets/Foo/A.cs", original);

        let outcome = sort_namespace(&mut fs, &project, "Assets/Foo/A.cs", &[]).unwrap();
        assert_eq!(outcome, SortOutcome::NoDeclaration);
        assert_eq!(fs.get("/proj/Assets/Foo/A.cs"), Some(original.as_bytes()));
    }

    #[test]
    fn test_sort_namespace_missing_file() {
        let mut fs = MemoryFileSystem::new();
        let project = ProjectLayout::new("/proj");
        let outcome = sort_namespace(&mut fs, &project, "Assets/Nope.cs", &[]).unwrap();
        assert_eq!(outcome, SortOutcome::Missing);
        assert_eq!(fs.file_count(), 0);
    }
}
