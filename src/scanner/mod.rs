//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Deterministic directory walking (siblings sorted by name)
//! - Streaming SHA-256 content hashing
//! - A filesystem capability so the engine runs against disk or memory
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`fs`]: The [`FileSystem`] trait and the real-disk [`LocalFs`]
//! - [`memory`]: [`MemoryFs`], an in-memory filesystem for tests
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: SHA-256 file hashing (streaming)
//!
//! # Example
//!
//! ```
//! use dupescan::scanner::{MemoryFs, Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let fs = MemoryFs::new();
//! fs.add_file("/data/a.txt", "hello");
//! fs.add_file("/data/empty.txt", "");
//!
//! let walker = Walker::new(&fs, Path::new("/data"), WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod fs;
pub mod hasher;
pub mod memory;
pub mod walker;

use std::io;
use std::path::{Path, PathBuf};

// Re-export main types
pub use fs::{is_hidden, EntryKind, EntryMetadata, FileSystem, LocalFs, WalkOptions};
pub use hasher::{hash_to_hex, Hash, Hasher, CHUNK_SIZE};
pub use memory::MemoryFs;
pub use walker::Walker;

/// A regular file discovered by the walker.
///
/// `ordinal` is the file's position in traversal order and decides which
/// member of a duplicate group is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Path to the file, rooted at the canonical scan root
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// SHA-256 of the contents, filled in by the hashing phase
    pub digest: Option<Hash>,
    /// Position in traversal order (0-based)
    pub ordinal: usize,
}

impl FileRecord {
    /// Create a record that has not been hashed yet.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, ordinal: usize) -> Self {
        Self {
            path,
            size,
            digest: None,
            ordinal,
        }
    }

    /// Return the record with its digest set.
    #[must_use]
    pub fn with_digest(mut self, digest: Hash) -> Self {
        self.digest = Some(digest);
        self
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkerConfig {
    /// Descend into subdirectories. When false only direct children of the
    /// root are considered.
    pub recursive: bool,

    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,

    /// Minimum file size to include (in bytes). Files smaller than this are
    /// skipped; the default of 1 excludes empty files.
    pub min_size: u64,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            skip_hidden: true,
            min_size: 1,
        }
    }
}

impl WalkerConfig {
    /// Set whether subdirectories are walked.
    #[must_use]
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Set whether hidden entries are skipped.
    #[must_use]
    pub fn with_skip_hidden(mut self, skip_hidden: bool) -> Self {
        self.skip_hidden = skip_hidden;
        self
    }

    /// Set the minimum file size.
    #[must_use]
    pub fn with_min_size(mut self, min_size: u64) -> Self {
        self.min_size = min_size;
        self
    }

    pub(crate) fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            max_depth: if self.recursive { None } else { Some(1) },
            skip_hidden: self.skip_hidden,
        }
    }
}

/// Errors that can occur during directory scanning.
///
/// None of these abort a scan; they are collected as warnings.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A file could not be hashed.
    #[error(transparent)]
    Hash(#[from] HashError),
}

impl ScanError {
    /// Classify an I/O error by kind.
    #[must_use]
    pub fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// The path the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::PermissionDenied(path) | Self::NotFound(path) | Self::Io { path, .. } => path,
            Self::Hash(err) => err.path(),
        }
    }
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl HashError {
    /// Classify an I/O error by kind.
    #[must_use]
    pub fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// The path the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(path) | Self::PermissionDenied(path) | Self::Io { path, .. } => path,
        }
    }
}
