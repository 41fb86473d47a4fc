//! File system access used by every tool in this crate.
//!
//! The tools never touch `std::fs` directly. They go through [`FileSystem`],
//! which is implemented for the real disk ([`OsFileSystem`]) and for an
//! in-memory tree ([`MemoryFileSystem`]) used by the tests.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Narrow file system interface.
pub trait FileSystem {
    /// Read a whole file as bytes
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Replace a whole file's contents
    fn write(&mut self, path: &Path, data: &[u8]) -> io::Result<()>;

    /// Create a directory and all missing parents
    fn create_dir_all(&mut self, path: &Path) -> io::Result<()>;

    fn is_file(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// All regular files below `root`, recursively, in sorted order.
    ///
    /// Entries that cannot be visited are silently left out.
    fn walk_files(&self, root: &Path) -> Vec<PathBuf>;

    /// Read a file as UTF-8 text
    ///
    /// Content that is not valid UTF-8 is reported as `InvalidData`.
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let data = self.read(path)?;
        String::from_utf8(data).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

/// The real file system
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write(&mut self, path: &Path, data: &[u8]) -> io::Result<()> {
        fs::write(path, data)
    }

    fn create_dir_all(&mut self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn walk_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .collect();
        files.sort();
        files
    }
}

/// In-memory file tree
///
/// Parent directories are created implicitly on write. Individual paths can
/// be marked as unreadable or unwritable to exercise error paths.
#[derive(Debug, Default, Clone)]
pub struct MemoryFileSystem {
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: BTreeSet<PathBuf>,
    deny_read: BTreeSet<PathBuf>,
    deny_write: BTreeSet<PathBuf>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, creating its parent directories
    pub fn insert(&mut self, path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) {
        let path = path.into();
        self.add_ancestors(&path);
        self.files.insert(path, data.into());
    }

    /// Get a file's contents
    pub fn get(&self, path: impl AsRef<Path>) -> Option<&[u8]> {
        self.files.get(path.as_ref()).map(Vec::as_slice)
    }

    /// Get a file's contents as text, if it exists and is UTF-8
    pub fn get_str(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.get(path).and_then(|d| std::str::from_utf8(d).ok())
    }

    /// Make reads of `path` fail with `PermissionDenied`
    pub fn deny_read(&mut self, path: impl Into<PathBuf>) {
        self.deny_read.insert(path.into());
    }

    /// Make writes to `path` fail with `PermissionDenied`
    pub fn deny_write(&mut self, path: impl Into<PathBuf>) {
        self.deny_write.insert(path.into());
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    fn add_ancestors(&mut self, path: &Path) {
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(ancestor.to_path_buf());
        }
    }
}

fn denied(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::PermissionDenied,
        format!("access denied: {}", path.display()),
    )
}

impl FileSystem for MemoryFileSystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        if self.deny_read.contains(path) {
            return Err(denied(path));
        }
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", path.display()),
            )
        })
    }

    fn write(&mut self, path: &Path, data: &[u8]) -> io::Result<()> {
        if self.deny_write.contains(path) {
            return Err(denied(path));
        }
        if self.dirs.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("is a directory: {}", path.display()),
            ));
        }
        self.insert(path.to_path_buf(), data.to_vec());
        Ok(())
    }

    fn create_dir_all(&mut self, path: &Path) -> io::Result<()> {
        if self.files.contains_key(path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("file exists: {}", path.display()),
            ));
        }
        self.add_ancestors(path);
        self.dirs.insert(path.to_path_buf());
        Ok(())
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.contains(path)
    }

    fn walk_files(&self, root: &Path) -> Vec<PathBuf> {
        self.files
            .keys()
            .filter(|p| p.starts_with(root) && p.as_path() != root)
            .cloned()
            .collect()
    }
}
