//! In-memory [`FileSystem`] for tests.
//!
//! Paths are treated literally: no normalization, no current directory.
//! Failures can be injected per path to simulate permission errors and
//! files that vanish between the walk and the hashing phase.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::fs::{DirEntry, EntryKind, EntryMetadata, FileSystem};

#[derive(Debug, Clone)]
enum Node {
    File(Vec<u8>),
    Dir,
    Symlink(PathBuf),
}

impl Node {
    fn kind(&self) -> EntryKind {
        match self {
            Node::File(_) => EntryKind::File,
            Node::Dir => EntryKind::Dir,
            Node::Symlink(_) => EntryKind::Symlink,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    nodes: BTreeMap<PathBuf, Node>,
    deny_stat: BTreeSet<PathBuf>,
    deny_open: BTreeSet<PathBuf>,
    deny_list: BTreeSet<PathBuf>,
    deny_remove: BTreeSet<PathBuf>,
    trashed: Vec<PathBuf>,
}

/// A filesystem that lives entirely in memory.
///
/// # Example
///
/// ```
/// use dupescan::scanner::{FileSystem, MemoryFs};
/// use std::path::Path;
///
/// let fs = MemoryFs::new();
/// fs.add_file("/data/a.txt", "hello");
/// assert_eq!(fs.metadata(Path::new("/data/a.txt")).unwrap().len, 5);
/// ```
#[derive(Debug, Default)]
pub struct MemoryFs {
    state: Mutex<State>,
}

impl MemoryFs {
    /// Create an empty filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn insert(&self, path: PathBuf, node: Node) {
        let mut state = self.state();
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            state
                .nodes
                .entry(ancestor.to_path_buf())
                .or_insert(Node::Dir);
        }
        state.nodes.insert(path, node);
    }

    /// Create a directory (and its ancestors).
    pub fn add_dir(&self, path: impl Into<PathBuf>) {
        self.insert(path.into(), Node::Dir);
    }

    /// Create or overwrite a file (ancestors are created as directories).
    pub fn add_file(&self, path: impl Into<PathBuf>, contents: impl AsRef<[u8]>) {
        self.insert(path.into(), Node::File(contents.as_ref().to_vec()));
    }

    /// Create a symbolic link pointing at `target`.
    pub fn add_symlink(&self, path: impl Into<PathBuf>, target: impl Into<PathBuf>) {
        self.insert(path.into(), Node::Symlink(target.into()));
    }

    /// Remove an entry behind the scanner's back.
    pub fn remove(&self, path: impl AsRef<Path>) {
        self.state().nodes.remove(path.as_ref());
    }

    /// Make stat calls on `path` fail with `PermissionDenied`.
    pub fn deny_stat(&self, path: impl Into<PathBuf>) {
        self.state().deny_stat.insert(path.into());
    }

    /// Make opening `path` fail with `PermissionDenied`.
    pub fn deny_open(&self, path: impl Into<PathBuf>) {
        self.state().deny_open.insert(path.into());
    }

    /// Make listing the directory `path` fail with `PermissionDenied`.
    pub fn deny_list(&self, path: impl Into<PathBuf>) {
        self.state().deny_list.insert(path.into());
    }

    /// Make removing `path` fail with `PermissionDenied`.
    pub fn deny_remove(&self, path: impl Into<PathBuf>) {
        self.state().deny_remove.insert(path.into());
    }

    /// Whether an entry exists at `path`.
    #[must_use]
    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.state().nodes.contains_key(path.as_ref())
    }

    /// Contents of the file at `path`, if it is a file.
    #[must_use]
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        match self.state().nodes.get(path.as_ref()) {
            Some(Node::File(data)) => Some(data.clone()),
            _ => None,
        }
    }

    /// Paths moved to the trash, in order.
    #[must_use]
    pub fn trashed(&self) -> Vec<PathBuf> {
        self.state().trashed.clone()
    }

    fn take_file(&self, path: &Path) -> io::Result<()> {
        let mut state = self.state();
        if state.deny_remove.contains(path) {
            return Err(denied(path));
        }
        match state.nodes.get(path) {
            Some(Node::Dir) => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{} is a directory", path.display()),
            )),
            Some(_) => {
                state.nodes.remove(path);
                Ok(())
            }
            None => Err(not_found(path)),
        }
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{}: no such file or directory", path.display()),
    )
}

fn denied(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::PermissionDenied,
        format!("{}: permission denied", path.display()),
    )
}

impl FileSystem for MemoryFs {
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        let state = self.state();
        match state.nodes.get(path) {
            Some(Node::Symlink(target)) if state.nodes.contains_key(target) => Ok(target.clone()),
            Some(Node::Symlink(_)) | None => Err(not_found(path)),
            Some(_) => Ok(path.to_path_buf()),
        }
    }

    fn metadata(&self, path: &Path) -> io::Result<EntryMetadata> {
        let state = self.state();
        if state.deny_stat.contains(path) {
            return Err(denied(path));
        }
        let node = state.nodes.get(path).ok_or_else(|| not_found(path))?;
        let len = match node {
            Node::File(data) => data.len() as u64,
            _ => 0,
        };
        Ok(EntryMetadata {
            kind: node.kind(),
            len,
        })
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let state = self.state();
        if state.deny_list.contains(path) {
            return Err(denied(path));
        }
        match state.nodes.get(path) {
            Some(Node::Dir) => {}
            Some(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!("{} is not a directory", path.display()),
                ))
            }
            None => return Err(not_found(path)),
        }

        Ok(state
            .nodes
            .iter()
            .filter(|(child, _)| child.parent() == Some(path))
            .map(|(child, node)| DirEntry {
                path: child.clone(),
                kind: node.kind(),
            })
            .collect())
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        let state = self.state();
        if state.deny_open.contains(path) {
            return Err(denied(path));
        }
        match state.nodes.get(path) {
            Some(Node::File(data)) => Ok(Box::new(Cursor::new(data.clone()))),
            Some(_) => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{} is not a regular file", path.display()),
            )),
            None => Err(not_found(path)),
        }
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.take_file(path)
    }

    fn trash_file(&self, path: &Path) -> io::Result<()> {
        self.take_file(path)?;
        self.state().trashed.push(path.to_path_buf());
        Ok(())
    }
}
