//! Scaffolding for a Unity package hosted on GitHub.
//!
//! Creates `<target>/<Name>/` with a `.gitignore`, a UPM `package.json` and a
//! `README.md`, wired to the repository the package will be pushed to.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::project::ProjectLayout;
use crate::vfs::FileSystem;

pub const DEFAULT_BASE_NAME: &str = "RepoName";
pub const DEFAULT_AUTHOR: &str = "You";
pub const DEFAULT_VERSION: &str = "0.1.0";

/// Minimum Unity version written into `package.json`
pub const UNITY_VERSION: &str = "2020.1";

const GITIGNORE: &str = "# Unity generated folders
[Ll]ibrary/
[Tt]emp/
[Oo]bj/
[Bb]uild/
[Bb]uilds/
[Ll]ogs/
[Mm]emoryCaptures/
UserSettings/
ProjectSettings/EditorBuildSettings.asset

# Unity cache
sysinfo.txt
*.pidb
*.suo
*.user
*.userprefs
*.csproj
*.unityproj
*.sln
*.svd
*.pdb
*.mdb

# Visual Studio
.vs/

# Asset meta data should only be ignored when the corresponding asset is also ignored
*.booproj
*.pidb.meta
*.pdb.meta
*.mdb.meta

# Ignore crash logs
*.stackdump

# Rider / VS Code / JetBrains
.idea/
.vscode/
*.DotSettings

# Build artifacts
*.apk
*.aab
*.unitypackage

# Custom ignored files
*.asset
*.asset.meta
*.bat
*.bat.meta
";

#[derive(Error, Debug)]
pub enum ScaffoldError {
    #[error("Target folder does not exist: {0}")]
    TargetMissing(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Inputs for a new package; blank fields fall back to defaults
#[derive(Debug, Clone, Default)]
pub struct PackageRequest {
    pub base_name: String,
    pub author: String,
    pub version: String,

    /// Repository root or template, e.g. `git@github.com:me` or
    /// `https://github.com/me/{repo}`
    pub repo: String,

    /// Asset folder to create the package in, e.g. `Assets`
    pub target_folder: String,
}

/// A created package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageScaffold {
    /// Asset path of the package folder
    pub asset_folder: String,
    pub repo_url: String,
    pub files: Vec<PathBuf>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PackageManifest<'a> {
    name: String,
    version: &'a str,
    display_name: String,
    description: &'a str,
    unity: &'a str,
    documentation_url: String,
    author: ManifestAuthor<'a>,
}

#[derive(Serialize)]
struct ManifestAuthor<'a> {
    name: &'a str,
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default
    } else {
        trimmed
    }
}

fn ends_with_git(s: &str) -> bool {
    s.len() >= 4 && s.as_bytes()[s.len() - 4..].eq_ignore_ascii_case(b".git")
}

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\{repo\}").expect("static pattern is valid"));

/// Clone URL for `repo_name` given a repository root or template
pub fn repo_url(template: &str, repo_name: &str) -> String {
    let root = template.trim();
    if root.is_empty() {
        return format!("git@github.com:GithubUserName/{}.git", repo_name);
    }

    if PLACEHOLDER.is_match(root) {
        let mut replaced = PLACEHOLDER
            .replace_all(root, regex::NoExpand(repo_name))
            .into_owned();
        if !ends_with_git(&replaced) {
            replaced.push_str(".git");
        }
        return replaced;
    }

    if ends_with_git(root) {
        return root.to_string();
    }

    // scp-like `user@host:path` and full URLs are both extended with a path segment
    let root = root.trim_end_matches(['/', '\\']);
    format!("{}/{}.git", root, repo_name)
}

static SSH_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^git@([^:]+):(.+?)(\.git)?$").expect("static pattern is valid"));

/// Browser URL for a clone URL
pub fn http_url(repo_url: &str) -> String {
    let url = repo_url.trim();
    if let Some(caps) = SSH_URL.captures(url) {
        return format!("https://{}/{}", &caps[1], &caps[2]);
    }
    if url.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("http")) && ends_with_git(url) {
        return url[..url.len() - 4].to_string();
    }
    url.to_string()
}

/// Package id fragment: lowercase ascii, digits, `-` and `_`
pub fn slug(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' || ch == '_' {
            out.push(ch);
        } else if ch.is_whitespace() || ch == '.' || ch == '/' {
            out.push('-');
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        "noname".to_string()
    } else {
        trimmed.to_string()
    }
}

/// `MyCoolTool` -> `My Cool Tool`
pub fn display_name(base_name: &str) -> String {
    let mut out = String::with_capacity(base_name.len() + 4);
    for (i, ch) in base_name.chars().enumerate() {
        if i > 0 && ch.is_ascii_uppercase() {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

/// Render `package.json` for a package
pub fn package_json(
    base_name: &str,
    author: &str,
    version: &str,
    repo_url: &str,
) -> Result<String, serde_json::Error> {
    let manifest = PackageManifest {
        name: format!("com.{}.{}", slug(author), slug(base_name)),
        version,
        display_name: display_name(base_name),
        description: "",
        unity: UNITY_VERSION,
        documentation_url: format!("{}/#readme", http_url(repo_url)),
        author: ManifestAuthor { name: author },
    };
    let mut json = serde_json::to_string_pretty(&manifest)?;
    json.push('\n');
    Ok(json)
}

fn readme(base_name: &str, repo_url: &str) -> String {
    format!(
        "# {}\n\n## Installation\n\nAdd the package through the Package Manager with \"Add package from git URL\":\n\n```\n{}\n```\n",
        display_name(base_name),
        repo_url
    )
}

/// Create the package folder and its files.
pub fn create_package<F: FileSystem + ?Sized>(
    fs: &mut F,
    project: &ProjectLayout,
    request: &PackageRequest,
) -> Result<PackageScaffold, ScaffoldError> {
    let base_name = or_default(&request.base_name, DEFAULT_BASE_NAME);
    let author = or_default(&request.author, DEFAULT_AUTHOR);
    let version = or_default(&request.version, DEFAULT_VERSION);

    let target = request.target_folder.trim().trim_end_matches(['/', '\\']);
    if target.is_empty() || !fs.is_dir(&project.resolve(target)) {
        return Err(ScaffoldError::TargetMissing(request.target_folder.clone()));
    }

    let asset_folder = format!("{}/{}", target.replace('\\', "/"), base_name);
    let folder = project.resolve(&asset_folder);
    fs.create_dir_all(&folder)?;

    let repo_url = repo_url(&request.repo, base_name);
    let files = vec![
        (folder.join(".gitignore"), GITIGNORE.to_string()),
        (
            folder.join("package.json"),
            package_json(base_name, author, version, &repo_url)?,
        ),
        (folder.join("README.md"), readme(base_name, &repo_url)),
    ];

    let mut written = Vec::with_capacity(files.len());
    for (path, content) in files {
        fs.write(&path, content.as_bytes())?;
        written.push(path);
    }

    tracing::info!("Created package scaffold at {} ({})", asset_folder, repo_url);
    Ok(PackageScaffold {
        asset_folder,
        repo_url,
        files: written,
    })
}
