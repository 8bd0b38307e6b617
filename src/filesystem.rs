//! Filesystem capability consumed by the overlay
//!
//! Everything the overlay knows about the outside world goes through the
//! [`FileSystem`] trait: existence checks, stat, reads, directory listings and
//! recursive walks. Two implementations ship with the crate:
//!
//! - [`HostFs`] talks to the real disk via `std::fs` and `walkdir`.
//! - [`MemoryFS`] keeps a tree of files in memory, which is handy for tests
//!   and for overlays over generated content.
//!
//! Errors are returned as [`Error::Io`](crate::error::Error::Io) (or
//! [`Error::Walk`](crate::error::Error::Walk)) with the original error kind
//! intact.

use crate::error::{Error, Result};
use crate::path::to_posix;
use glob::Pattern;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// The type of a filesystem object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    File,
    Directory,
    Symlink,
}

impl FileKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FileKind::File => "file",
            FileKind::Directory => "directory",
            FileKind::Symlink => "symlink",
        }
    }
}

/// Stat result for one filesystem object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileMeta {
    /// Object type
    pub kind: FileKind,
    /// Size in bytes (0 for directories in memory)
    pub len: u64,
    /// Last modification time, when the platform reports one
    pub modified: Option<SystemTime>,
    /// Permission bits (e.g. `0o644`)
    pub mode: u32,
    /// Whether the object is read-only for its owner
    pub readonly: bool,
}

impl FileMeta {
    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }

    pub fn is_symlink(&self) -> bool {
        self.kind == FileKind::Symlink
    }
}

impl From<&std::fs::Metadata> for FileMeta {
    fn from(metadata: &std::fs::Metadata) -> Self {
        let file_type = metadata.file_type();
        let kind = if file_type.is_symlink() {
            FileKind::Symlink
        } else if file_type.is_dir() {
            FileKind::Directory
        } else {
            FileKind::File
        };
        let readonly = metadata.permissions().readonly();

        #[cfg(unix)]
        let mode = {
            use std::os::unix::fs::PermissionsExt;
            metadata.permissions().mode() & 0o7777
        };
        #[cfg(not(unix))]
        let mode = match (kind, readonly) {
            (FileKind::Directory, _) => 0o755,
            (_, true) => 0o444,
            (_, false) => 0o644,
        };

        Self {
            kind,
            len: metadata.len(),
            modified: metadata.modified().ok(),
            mode,
            readonly,
        }
    }
}

/// Options for a recursive walk
///
/// Patterns are glob patterns matched against the posix-style path of each
/// entry relative to the walked directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkOptions {
    /// When non-empty, only entries matching at least one glob are returned.
    pub globs: Vec<String>,
    /// Entries matching any of these are skipped; matching directories are
    /// not descended into.
    pub ignore: Vec<String>,
    /// Whether directory entries are returned.
    pub directories: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            globs: Vec::new(),
            ignore: Vec::new(),
            directories: true,
        }
    }
}

impl WalkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an include glob
    pub fn with_glob(mut self, pattern: impl Into<String>) -> Self {
        self.globs.push(pattern.into());
        self
    }

    /// Add an ignore glob
    pub fn with_ignore(mut self, pattern: impl Into<String>) -> Self {
        self.ignore.push(pattern.into());
        self
    }

    /// Return files (and symlinks) only
    pub fn files_only(mut self) -> Self {
        self.directories = false;
        self
    }
}

/// Compiled form of [`WalkOptions`]
pub(crate) struct WalkFilter {
    globs: Vec<Pattern>,
    ignore: Vec<Pattern>,
    directories: bool,
}

impl WalkFilter {
    pub(crate) fn new(options: &WalkOptions) -> Result<Self> {
        let compile = |patterns: &[String]| -> Result<Vec<Pattern>> {
            patterns
                .iter()
                .map(|p| Pattern::new(p).map_err(Error::Glob))
                .collect()
        };

        Ok(Self {
            globs: compile(&options.globs)?,
            ignore: compile(&options.ignore)?,
            directories: options.directories,
        })
    }

    pub(crate) fn is_ignored(&self, relative: &str) -> bool {
        self.ignore.iter().any(|p| p.matches(relative))
    }

    pub(crate) fn accepts(&self, relative: &str, is_dir: bool) -> bool {
        if is_dir && !self.directories {
            return false;
        }
        self.globs.is_empty() || self.globs.iter().any(|p| p.matches(relative))
    }
}

/// One item produced by [`FileSystem::walk`]
#[derive(Debug, Clone, PartialEq)]
pub struct WalkEntry {
    /// Posix-style path relative to the walked directory
    pub relative_path: String,
    /// Absolute host path
    pub full_path: PathBuf,
    pub metadata: FileMeta,
}

/// Host filesystem calls the overlay is built on
///
/// Implementations must be shareable across threads: the asynchronous
/// directory listing issues reads from the rayon pool.
pub trait FileSystem: Send + Sync + std::fmt::Debug {
    /// Whether anything exists at `path` (following symlinks)
    fn exists(&self, path: &Path) -> bool;

    /// Stat `path`, following symlinks
    fn stat(&self, path: &Path) -> Result<FileMeta>;

    /// Stat `path` without following a final symlink
    fn lstat(&self, path: &Path) -> Result<FileMeta>;

    /// Read the whole file at `path`
    fn read_file(&self, path: &Path) -> Result<Vec<u8>>;

    /// Names of the immediate children of the directory at `path`
    fn read_dir(&self, path: &Path) -> Result<Vec<String>>;

    /// Recursively enumerate everything below `path`
    fn walk(&self, path: &Path, options: &WalkOptions) -> Result<Vec<WalkEntry>>;
}

/// [`FileSystem`] backed by the real disk
#[derive(Debug, Clone, Copy, Default)]
pub struct HostFs;

impl FileSystem for HostFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn stat(&self, path: &Path) -> Result<FileMeta> {
        Ok(FileMeta::from(&std::fs::metadata(path)?))
    }

    fn lstat(&self, path: &Path) -> Result<FileMeta> {
        Ok(FileMeta::from(&std::fs::symlink_metadata(path)?))
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(std::fs::read(path)?)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(path)? {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    fn walk(&self, path: &Path, options: &WalkOptions) -> Result<Vec<WalkEntry>> {
        let filter = WalkFilter::new(options)?;
        let relative_of = |p: &Path| to_posix(p.strip_prefix(path).unwrap_or(p));

        let walker = WalkDir::new(path)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !filter.is_ignored(&relative_of(e.path())));

        let mut entries = Vec::new();
        for entry in walker {
            let entry = entry?;
            let relative_path = relative_of(entry.path());
            if !filter.accepts(&relative_path, entry.file_type().is_dir()) {
                continue;
            }
            let metadata = FileMeta::from(&entry.metadata()?);
            entries.push(WalkEntry {
                relative_path,
                full_path: entry.into_path(),
                metadata,
            });
        }

        Ok(entries)
    }
}

/// Represents a file with content and metadata
#[derive(Debug, Clone)]
pub struct File {
    /// File content as bytes
    pub content: Vec<u8>,
    /// File permissions (simplified as u32)
    pub permissions: u32,
    /// File modification time
    pub modified_time: SystemTime,
}

impl File {
    /// Create a new file with content
    pub fn new(content: Vec<u8>) -> Self {
        Self {
            content,
            permissions: 0o644,
            modified_time: SystemTime::now(),
        }
    }

    /// Create a new file from string content
    pub fn from_string(content: &str) -> Self {
        Self::new(content.as_bytes().to_vec())
    }

    /// Get file size in bytes
    pub fn size(&self) -> usize {
        self.content.len()
    }

    fn meta(&self) -> FileMeta {
        FileMeta {
            kind: FileKind::File,
            len: self.content.len() as u64,
            modified: Some(self.modified_time),
            mode: self.permissions,
            readonly: self.permissions & 0o200 == 0,
        }
    }
}

/// In-memory [`FileSystem`]
///
/// Files are keyed by absolute path. Directories exist implicitly as the
/// ancestors of every file, or explicitly via [`MemoryFS::add_dir`].
#[derive(Debug, Clone, Default)]
pub struct MemoryFS {
    files: HashMap<PathBuf, File>,
    dirs: BTreeSet<PathBuf>,
}

impl MemoryFS {
    /// Create a new empty filesystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or update a file
    pub fn add_file<P: AsRef<Path>>(&mut self, path: P, file: File) -> Result<()> {
        let path = Self::key(path.as_ref())?;
        if self.is_dir(&path) {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("is a directory: {}", path.display()),
            )
            .into());
        }
        self.ensure_no_file_ancestor(&path)?;
        self.files.insert(path, file);
        Ok(())
    }

    /// Add a file with string content
    pub fn add_file_string<P: AsRef<Path>>(&mut self, path: P, content: &str) -> Result<()> {
        self.add_file(path, File::from_string(content))
    }

    /// Add an (empty) directory
    pub fn add_dir<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = Self::key(path.as_ref())?;
        if self.files.contains_key(&path) {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("not a directory: {}", path.display()),
            )
            .into());
        }
        self.ensure_no_file_ancestor(&path)?;
        self.dirs.insert(path);
        Ok(())
    }

    /// Get a file by path
    pub fn get_file<P: AsRef<Path>>(&self, path: P) -> Option<&File> {
        self.files.get(&crate::path::normalize(path.as_ref()))
    }

    /// Remove a file
    pub fn remove_file<P: AsRef<Path>>(&mut self, path: P) -> Option<File> {
        self.files.remove(&crate::path::normalize(path.as_ref()))
    }

    /// Get the number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if filesystem is empty
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.dirs.is_empty()
    }

    fn key(path: &Path) -> Result<PathBuf> {
        if !path.is_absolute() {
            return Err(Error::invalid_argument(format!(
                "MemoryFS paths must be absolute: {}",
                path.display()
            )));
        }
        Ok(crate::path::normalize(path))
    }

    /// A path cannot live below a file
    fn ensure_no_file_ancestor(&self, path: &Path) -> Result<()> {
        match path.ancestors().skip(1).find(|a| self.files.contains_key(*a)) {
            Some(file) => Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("not a directory: {}", file.display()),
            )
            .into()),
            None => Ok(()),
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.iter().any(|d| d.starts_with(path))
            || self
                .files
                .keys()
                .any(|f| f != path && f.starts_with(path))
    }

    /// Every path strictly below `dir`, files and implied directories alike
    fn descendants(&self, dir: &Path) -> BTreeSet<PathBuf> {
        let mut out = BTreeSet::new();
        for known in self.files.keys().chain(self.dirs.iter()) {
            if let Ok(rest) = known.strip_prefix(dir) {
                let mut current = dir.to_path_buf();
                for component in rest.components() {
                    current.push(component);
                    out.insert(current.clone());
                }
            }
        }
        out
    }

    fn not_found(path: &Path) -> Error {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("no such file or directory: {}", path.display()),
        )
        .into()
    }
}

impl FileSystem for MemoryFS {
    fn exists(&self, path: &Path) -> bool {
        let path = crate::path::normalize(path);
        self.files.contains_key(&path) || self.is_dir(&path)
    }

    fn stat(&self, path: &Path) -> Result<FileMeta> {
        let path = crate::path::normalize(path);
        if let Some(file) = self.files.get(&path) {
            return Ok(file.meta());
        }
        if self.is_dir(&path) {
            return Ok(FileMeta {
                kind: FileKind::Directory,
                len: 0,
                modified: None,
                mode: 0o755,
                readonly: false,
            });
        }
        Err(Self::not_found(&path))
    }

    fn lstat(&self, path: &Path) -> Result<FileMeta> {
        self.stat(path)
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        let path = crate::path::normalize(path);
        if let Some(file) = self.files.get(&path) {
            return Ok(file.content.clone());
        }
        if self.is_dir(&path) {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("is a directory: {}", path.display()),
            )
            .into());
        }
        Err(Self::not_found(&path))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<String>> {
        let path = crate::path::normalize(path);
        if self.files.contains_key(&path) {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("not a directory: {}", path.display()),
            )
            .into());
        }
        if !self.is_dir(&path) {
            return Err(Self::not_found(&path));
        }

        let names: BTreeSet<String> = self
            .descendants(&path)
            .iter()
            .filter(|p| p.parent() == Some(path.as_path()))
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();
        Ok(names.into_iter().collect())
    }

    fn walk(&self, path: &Path, options: &WalkOptions) -> Result<Vec<WalkEntry>> {
        let root = crate::path::normalize(path);
        if !self.is_dir(&root) {
            return Err(Self::not_found(&root));
        }
        let filter = WalkFilter::new(options)?;

        let mut entries = Vec::new();
        for full_path in self.descendants(&root) {
            let relative = full_path.strip_prefix(&root).unwrap_or(&full_path);
            let relative_path = to_posix(relative);

            // an ignored ancestor prunes the whole subtree
            let mut prefix = PathBuf::new();
            let pruned = relative.components().any(|c| {
                prefix.push(c);
                filter.is_ignored(&to_posix(&prefix))
            });
            if pruned {
                continue;
            }

            let metadata = self.stat(&full_path)?;
            if !filter.accepts(&relative_path, metadata.is_dir()) {
                continue;
            }
            entries.push(WalkEntry {
                relative_path,
                full_path,
                metadata,
            });
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn memory_tree() -> MemoryFS {
        let mut fs = MemoryFS::new();
        fs.add_file_string("/r/a.txt", "a").unwrap();
        fs.add_file_string("/r/sub/b.js", "b").unwrap();
        fs.add_file_string("/r/sub/deep/c.js", "c").unwrap();
        fs.add_dir("/r/empty").unwrap();
        fs
    }

    #[test]
    fn test_memory_exists_and_stat() {
        let fs = memory_tree();
        assert!(fs.exists(Path::new("/r")));
        assert!(fs.exists(Path::new("/r/sub")));
        assert!(fs.exists(Path::new("/r/sub/b.js")));
        assert!(fs.exists(Path::new("/r/empty")));
        assert!(!fs.exists(Path::new("/r/missing")));

        assert!(fs.stat(Path::new("/r/sub")).unwrap().is_dir());
        let meta = fs.stat(Path::new("/r/a.txt")).unwrap();
        assert!(meta.is_file());
        assert_eq!(meta.len, 1);
        assert_eq!(meta.mode, 0o644);

        let err = fs.stat(Path::new("/r/missing")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_memory_requires_absolute_paths() {
        let mut fs = MemoryFS::new();
        assert!(fs.add_file_string("relative.txt", "x").is_err());
    }

    #[test]
    fn test_memory_rejects_paths_below_a_file() {
        let mut fs = MemoryFS::new();
        fs.add_file_string("/r/x", "file").unwrap();

        let err = fs.add_file_string("/r/x/y", "nested").unwrap_err();
        assert_eq!(
            err.io_error().map(|e| e.kind()),
            Some(io::ErrorKind::NotADirectory)
        );
        assert!(fs.add_dir("/r/x/sub").is_err());
        assert!(fs.stat(Path::new("/r/x")).unwrap().is_file());
        assert!(!fs.exists(Path::new("/r/x/y")));
    }

    #[test]
    fn test_memory_read_dir() {
        let fs = memory_tree();
        let names = fs.read_dir(Path::new("/r")).unwrap();
        assert_eq!(names, vec!["a.txt", "empty", "sub"]);

        let err = fs.read_dir(Path::new("/r/a.txt")).unwrap_err();
        assert_eq!(
            err.io_error().map(|e| e.kind()),
            Some(io::ErrorKind::NotADirectory)
        );
        assert!(fs.read_dir(Path::new("/nope")).unwrap_err().is_not_found());
    }

    #[test]
    fn test_memory_walk_with_options() {
        let fs = memory_tree();
        let all: Vec<String> = fs
            .walk(Path::new("/r"), &WalkOptions::default())
            .unwrap()
            .into_iter()
            .map(|e| e.relative_path)
            .collect();
        assert_eq!(
            all,
            vec!["a.txt", "empty", "sub", "sub/b.js", "sub/deep", "sub/deep/c.js"]
        );

        let files: Vec<String> = fs
            .walk(Path::new("/r"), &WalkOptions::new().files_only())
            .unwrap()
            .into_iter()
            .map(|e| e.relative_path)
            .collect();
        assert_eq!(files, vec!["a.txt", "sub/b.js", "sub/deep/c.js"]);

        let pruned: Vec<String> = fs
            .walk(Path::new("/r"), &WalkOptions::new().with_ignore("sub"))
            .unwrap()
            .into_iter()
            .map(|e| e.relative_path)
            .collect();
        assert_eq!(pruned, vec!["a.txt", "empty"]);
    }

    #[test]
    fn test_host_read_dir_and_stat() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("one.txt"), "1").unwrap();
        fs::create_dir(temp.path().join("nested")).unwrap();

        let mut names = HostFs.read_dir(temp.path()).unwrap();
        names.sort();
        assert_eq!(names, vec!["nested", "one.txt"]);

        assert!(HostFs.stat(&temp.path().join("nested")).unwrap().is_dir());
        assert_eq!(HostFs.read_file(&temp.path().join("one.txt")).unwrap(), b"1");

        let err = HostFs.read_dir(&temp.path().join("missing")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_host_walk_globs_and_ignore() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("src/deep")).unwrap();
        fs::create_dir_all(temp.path().join("node_modules/pkg")).unwrap();
        fs::write(temp.path().join("src/app.js"), "").unwrap();
        fs::write(temp.path().join("src/deep/util.js"), "").unwrap();
        fs::write(temp.path().join("src/readme.md"), "").unwrap();
        fs::write(temp.path().join("node_modules/pkg/index.js"), "").unwrap();

        let options = WalkOptions::new()
            .with_glob("*.js")
            .with_ignore("node_modules");
        let found: Vec<String> = HostFs
            .walk(temp.path(), &options)
            .unwrap()
            .into_iter()
            .map(|e| e.relative_path)
            .collect();
        assert_eq!(found, vec!["src/app.js", "src/deep/util.js"]);
    }

    #[test]
    fn test_host_walk_entries_are_sorted_and_carry_metadata() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("b")).unwrap();
        fs::write(temp.path().join("b/inner.txt"), "xyz").unwrap();
        fs::write(temp.path().join("a.txt"), "").unwrap();

        let entries = HostFs.walk(temp.path(), &WalkOptions::default()).unwrap();
        let paths: Vec<&str> = entries.iter().map(|e| e.relative_path.as_str()).collect();
        assert_eq!(paths, vec!["a.txt", "b", "b/inner.txt"]);
        assert!(entries[1].metadata.is_dir());
        assert_eq!(entries[2].metadata.len, 3);
        assert_eq!(entries[2].full_path, temp.path().join("b/inner.txt"));
    }
}
