//! Per-group duplicate deletion.
//!
//! # Overview
//!
//! [`delete_group`] removes every member of a [`DuplicateGroup`] except the
//! first, which is kept. Each removal is attempted independently: a
//! failure is recorded in the [`DeletionReport`] and the batch carries on.
//!
//! # Safety
//!
//! - The kept file is checked before anything is removed. If it is gone,
//!   nothing in the group is touched, so the last copy survives.
//! - Each candidate is re-stat'ed first; a file whose size no longer matches
//!   the group is reported as [`DeleteError::Modified`] and left alone.
//!
//! Deletion never prompts. Asking the user is the caller's job.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::actions::{delete_group, DeleteConfig};
//! use dupescan::scanner::LocalFs;
//! use std::path::Path;
//!
//! let result = dupescan::scan(Path::new("."), true, 1).unwrap();
//! for group in &result.groups {
//!     let report = delete_group(&LocalFs, group, &DeleteConfig::default());
//!     println!("{}", report.summary());
//! }
//! ```

use std::io;
use std::path::{Path, PathBuf};

use bytesize::ByteSize;
use thiserror::Error;

use crate::duplicates::DuplicateGroup;
use crate::scanner::{EntryKind, FileSystem};

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// File size changed since the scan.
    #[error("file modified since scan: {path} (size {expected} -> {actual})")]
    Modified {
        /// Candidate path
        path: PathBuf,
        /// Size recorded by the scan
        expected: u64,
        /// Size found now
        actual: u64,
    },

    /// The kept copy is gone, so this duplicate is the last one left.
    #[error("kept copy {keep} is missing, refusing to delete {path}")]
    KeepMissing {
        /// Candidate path
        path: PathBuf,
        /// The group's kept path
        keep: PathBuf,
    },

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed {
        /// Candidate path
        path: PathBuf,
        /// Platform message
        message: String,
    },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Candidate path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::Modified { path: p, .. }
            | Self::KeepMissing { path: p, .. }
            | Self::TrashFailed { path: p, .. }
            | Self::Io { path: p, .. } => p,
        }
    }

    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// How files are removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeleteMode {
    /// Unlink the file.
    #[default]
    Permanent,
    /// Move the file to the platform trash.
    Trash,
}

/// Configuration for deletion operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfig {
    /// Removal mode.
    pub mode: DeleteMode,
    /// Re-stat each candidate and skip it if its size changed.
    pub verify_size: bool,
    /// Refuse to touch a group whose kept file no longer exists.
    pub verify_keep: bool,
}

impl Default for DeleteConfig {
    fn default() -> Self {
        Self {
            mode: DeleteMode::Permanent,
            verify_size: true,
            verify_keep: true,
        }
    }
}

impl DeleteConfig {
    /// Config that moves files to the trash.
    #[must_use]
    pub fn trash() -> Self {
        Self {
            mode: DeleteMode::Trash,
            ..Self::default()
        }
    }

    /// Set the removal mode.
    #[must_use]
    pub fn with_mode(mut self, mode: DeleteMode) -> Self {
        self.mode = mode;
        self
    }

    /// Enable/disable size verification.
    #[must_use]
    pub fn with_verify_size(mut self, verify: bool) -> Self {
        self.verify_size = verify;
        self
    }

    /// Enable/disable the kept-file check.
    #[must_use]
    pub fn with_verify_keep(mut self, verify: bool) -> Self {
        self.verify_keep = verify;
        self
    }
}

/// A file that was removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
    /// Whether deletion was permanent (true) or to trash (false).
    pub permanent: bool,
}

/// Outcome of [`delete_group`].
#[derive(Debug, Default)]
pub struct DeletionReport {
    /// The member that was kept, if the group was not empty.
    pub kept: Option<PathBuf>,
    /// Files that were removed, in group order.
    pub deleted: Vec<DeleteResult>,
    /// Files that could not be removed, in group order.
    pub failures: Vec<DeleteError>,
    /// Total bytes freed.
    pub bytes_freed: u64,
}

impl DeletionReport {
    /// Number of successful deletions.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.deleted.len()
    }

    /// Number of failed deletions.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Check if all deletions succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        let freed = ByteSize::b(self.bytes_freed);
        if self.all_succeeded() {
            format!("Deleted {} file(s), freed {}", self.success_count(), freed)
        } else {
            format!(
                "Deleted {} file(s), {} failed, freed {}",
                self.success_count(),
                self.failure_count(),
                freed
            )
        }
    }
}

/// Remove a single file.
///
/// When `expected_size` is given the file is re-stat'ed first and left in
/// place if its size differs.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if deletion is not allowed
/// - `Modified` if the size no longer matches
/// - `TrashFailed` if the trash operation fails
pub fn delete_file(
    fs: &dyn FileSystem,
    path: &Path,
    expected_size: Option<u64>,
    mode: DeleteMode,
) -> Result<DeleteResult, DeleteError> {
    let metadata = fs
        .metadata(path)
        .map_err(|e| DeleteError::from_io(path, e))?;

    if let Some(expected) = expected_size {
        if metadata.kind != EntryKind::File || metadata.len != expected {
            log::warn!(
                "File modified since scan: {} (size changed from {} to {})",
                path.display(),
                expected,
                metadata.len
            );
            return Err(DeleteError::Modified {
                path: path.to_path_buf(),
                expected,
                actual: metadata.len,
            });
        }
    }

    match mode {
        DeleteMode::Permanent => {
            fs.remove_file(path).map_err(|e| {
                log::error!("Permanent delete failed for {}: {}", path.display(), e);
                DeleteError::from_io(path, e)
            })?;
            log::info!("Permanently deleted: {} ({} bytes)", path.display(), metadata.len);
        }
        DeleteMode::Trash => {
            fs.trash_file(path).map_err(|e| {
                log::error!("Trash operation failed for {}: {}", path.display(), e);
                DeleteError::TrashFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
            })?;
            log::info!("Moved to trash: {} ({} bytes)", path.display(), metadata.len);
        }
    }

    Ok(DeleteResult {
        path: path.to_path_buf(),
        size: metadata.len,
        permanent: mode == DeleteMode::Permanent,
    })
}

/// Delete every member of `group` except the first.
///
/// Never fails as a whole; per-file outcomes are in the report.
pub fn delete_group(
    fs: &dyn FileSystem,
    group: &DuplicateGroup,
    config: &DeleteConfig,
) -> DeletionReport {
    let Some(keep) = group.keep() else {
        return DeletionReport::default();
    };

    let mut report = DeletionReport {
        kept: Some(keep.path.clone()),
        ..Default::default()
    };

    if config.verify_keep && !keep_exists(fs, &keep.path) {
        log::warn!(
            "Kept file {} is missing, leaving {} duplicate(s) in place",
            keep.path.display(),
            group.duplicate_count()
        );
        report.failures = group
            .duplicates()
            .iter()
            .map(|file| DeleteError::KeepMissing {
                path: file.path.clone(),
                keep: keep.path.clone(),
            })
            .collect();
        return report;
    }

    let expected_size = config.verify_size.then_some(group.size);
    for file in group.duplicates() {
        if file.path == keep.path {
            log::warn!("Skipping kept path listed twice: {}", file.path.display());
            continue;
        }
        match delete_file(fs, &file.path, expected_size, config.mode) {
            Ok(result) => {
                report.bytes_freed += result.size;
                report.deleted.push(result);
            }
            Err(e) => {
                log::warn!("Failed to delete {}: {}", file.path.display(), e);
                report.failures.push(e);
            }
        }
    }

    log::debug!(
        "Group {}: {}",
        group.hash_hex(),
        report.summary()
    );

    report
}

fn keep_exists(fs: &dyn FileSystem, path: &Path) -> bool {
    fs.metadata(path)
        .is_ok_and(|meta| meta.kind == EntryKind::File)
}
