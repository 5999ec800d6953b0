//! Filesystem access capability.
//!
//! # Overview
//!
//! Every filesystem touch the scanner, hasher and deletion code make goes
//! through the [`FileSystem`] trait. [`LocalFs`] talks to the real disk;
//! [`MemoryFs`](super::memory::MemoryFs) keeps a tree in memory so the
//! engine can be exercised without fixtures on disk.
//!
//! Directory traversal is part of the trait: the default [`FileSystem::walk`]
//! is a depth-first walk built on [`FileSystem::read_dir`], and [`LocalFs`]
//! overrides it with `walkdir`. Both yield entries in the same order
//! (pre-order, siblings sorted by file name).

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Kind of a directory entry, as reported without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file
    File,
    /// Directory
    Dir,
    /// Symbolic link (never followed)
    Symlink,
    /// Sockets, FIFOs, devices
    Other,
}

impl EntryKind {
    fn from_file_type(file_type: std::fs::FileType) -> Self {
        if file_type.is_symlink() {
            Self::Symlink
        } else if file_type.is_dir() {
            Self::Dir
        } else if file_type.is_file() {
            Self::File
        } else {
            Self::Other
        }
    }
}

/// Result of a single stat call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryMetadata {
    /// Entry kind
    pub kind: EntryKind,
    /// Length in bytes (meaningful for files only)
    pub len: u64,
}

/// A child returned by [`FileSystem::read_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Full path of the child
    pub path: PathBuf,
    /// Kind of the child
    pub kind: EntryKind,
}

/// An entry produced while walking a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Full path of the entry
    pub path: PathBuf,
    /// Kind of the entry
    pub kind: EntryKind,
    /// Depth below the walk root (direct children are depth 1)
    pub depth: usize,
}

/// Failure to list a directory (or otherwise advance the walk).
#[derive(Debug)]
pub struct WalkError {
    /// Path that could not be read
    pub path: PathBuf,
    /// Underlying error
    pub source: io::Error,
}

/// Options for [`FileSystem::walk`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkOptions {
    /// Maximum depth to descend to. `Some(1)` lists direct children only.
    pub max_depth: Option<usize>,
    /// Skip entries whose name starts with `.` and do not descend into them.
    pub skip_hidden: bool,
}

impl WalkOptions {
    fn descends_into(&self, depth: usize) -> bool {
        self.max_depth.map_or(true, |max| depth < max)
    }
}

/// Iterator type returned by [`FileSystem::walk`].
pub type WalkIter<'a> = Box<dyn Iterator<Item = Result<WalkEntry, WalkError>> + Send + 'a>;

/// Capability for reading and removing files.
///
/// Implementations must be shareable across the hashing thread pool.
pub trait FileSystem: Send + Sync {
    /// Resolve `path` to the absolute form used for every reported path.
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;

    /// Stat a path without following symlinks.
    fn metadata(&self, path: &Path) -> io::Result<EntryMetadata>;

    /// List the children of a directory, in any order.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Open a regular file for streaming reads.
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>>;

    /// Remove a file permanently.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Move a file to the platform trash.
    fn trash_file(&self, path: &Path) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("trash is not available for {}", path.display()),
        ))
    }

    /// Walk the tree below `root` (the root itself is not yielded).
    fn walk<'a>(&'a self, root: &Path, options: WalkOptions) -> WalkIter<'a> {
        Box::new(SortedWalk::new(self, root, options))
    }
}

/// Returns true for names starting with `.` (other than `.` and `..`).
#[must_use]
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.') && name != "." && name != "..")
}

/// Depth-first walk over [`FileSystem::read_dir`] with siblings sorted by name.
struct SortedWalk<'a, F: ?Sized> {
    fs: &'a F,
    options: WalkOptions,
    stack: Vec<(std::vec::IntoIter<DirEntry>, usize)>,
    pending: Option<WalkError>,
}

impl<'a, F: FileSystem + ?Sized> SortedWalk<'a, F> {
    fn new(fs: &'a F, root: &Path, options: WalkOptions) -> Self {
        let mut walk = Self {
            fs,
            options,
            stack: Vec::new(),
            pending: None,
        };
        walk.push_dir(root, 1);
        walk
    }

    fn push_dir(&mut self, dir: &Path, depth: usize) {
        match self.fs.read_dir(dir) {
            Ok(mut children) => {
                children.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
                self.stack.push((children.into_iter(), depth));
            }
            Err(source) => {
                self.pending = Some(WalkError {
                    path: dir.to_path_buf(),
                    source,
                });
            }
        }
    }
}

impl<F: FileSystem + ?Sized> Iterator for SortedWalk<'_, F> {
    type Item = Result<WalkEntry, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(err) = self.pending.take() {
                return Some(Err(err));
            }

            let (entry, depth) = {
                let (children, depth) = self.stack.last_mut()?;
                match children.next() {
                    Some(entry) => (entry, *depth),
                    None => {
                        self.stack.pop();
                        continue;
                    }
                }
            };

            if self.options.skip_hidden && is_hidden(&entry.path) {
                continue;
            }

            if entry.kind == EntryKind::Dir && self.options.descends_into(depth) {
                self.push_dir(&entry.path, depth + 1);
            }

            return Some(Ok(WalkEntry {
                path: entry.path,
                kind: entry.kind,
                depth,
            }));
        }
    }
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    /// Create a handle to the local filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for LocalFs {
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::canonicalize(path)
    }

    fn metadata(&self, path: &Path) -> io::Result<EntryMetadata> {
        let metadata = std::fs::symlink_metadata(path)?;
        Ok(EntryMetadata {
            kind: EntryKind::from_file_type(metadata.file_type()),
            len: metadata.len(),
        })
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        std::fs::read_dir(path)?
            .map(|entry| {
                let entry = entry?;
                Ok(DirEntry {
                    path: entry.path(),
                    kind: EntryKind::from_file_type(entry.file_type()?),
                })
            })
            .collect()
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(std::fs::File::open(path)?))
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn trash_file(&self, path: &Path) -> io::Result<()> {
        trash::delete(path).map_err(|e| io::Error::other(e.to_string()))
    }

    fn walk<'a>(&'a self, root: &Path, options: WalkOptions) -> WalkIter<'a> {
        let mut walker = WalkDir::new(root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name();
        if let Some(max_depth) = options.max_depth {
            walker = walker.max_depth(max_depth);
        }

        let root = root.to_path_buf();
        let skip_hidden = options.skip_hidden;

        let iter = walker
            .into_iter()
            .filter_entry(move |e| !(skip_hidden && e.depth() > 0 && is_hidden(e.path())))
            .map(move |result| match result {
                Ok(entry) => Ok(WalkEntry {
                    path: entry.path().to_path_buf(),
                    kind: EntryKind::from_file_type(entry.file_type()),
                    depth: entry.depth(),
                }),
                Err(err) => {
                    let path = err.path().map_or_else(|| root.clone(), Path::to_path_buf);
                    let source = err
                        .into_io_error()
                        .unwrap_or_else(|| io::Error::other("filesystem loop detected"));
                    Err(WalkError { path, source })
                }
            });

        Box::new(iter)
    }
}
