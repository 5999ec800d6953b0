//! Directory walker producing [`FileRecord`]s in traversal order.
//!
//! # Overview
//!
//! The [`Walker`] drives [`FileSystem::walk`], keeps regular files only,
//! stats each of them exactly once and applies the size filter. Every
//! record it yields carries its ordinal in traversal order; that ordinal is
//! what makes "first discovered" well defined later on.
//!
//! Traversal is depth-first with siblings sorted by file name, so two
//! walks over the same tree always yield the same sequence.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{LocalFs, Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig::default().with_min_size(1024);
//! let walker = Walker::new(&LocalFs, Path::new("/home/user/Downloads"), config);
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("#{} {}: {} bytes", file.ordinal, file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::fs::{EntryKind, FileSystem, WalkEntry};
use super::{FileRecord, ScanError, WalkerConfig};
use crate::progress::ProgressCallback;

/// Directory walker for file discovery.
pub struct Walker<'a> {
    /// Filesystem to walk
    fs: &'a dyn FileSystem,
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback, notified once per accepted file
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for Walker<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walker")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish_non_exhaustive()
    }
}

impl<'a> Walker<'a> {
    /// Create a new walker for the given path.
    ///
    /// # Arguments
    ///
    /// * `fs` - Filesystem to read from
    /// * `path` - Root directory to scan
    /// * `config` - Walker configuration options
    #[must_use]
    pub fn new(fs: &'a dyn FileSystem, path: &Path, config: WalkerConfig) -> Self {
        Self {
            fs,
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
            progress_callback: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// The flag is checked before each directory entry is processed. Once it
    /// is set the iterator ends.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Walk the directory tree, yielding file records.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration. Ordinals count accepted files only, starting at zero.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileRecord, ScanError>> + '_ {
        let mut next_ordinal = 0usize;

        self.fs
            .walk(&self.root, self.config.walk_options())
            .take_while(move |_| {
                if self.is_shutdown_requested() {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                    return false;
                }
                true
            })
            .filter_map(move |result| match result {
                Ok(entry) => {
                    let record = self.process_entry(entry, next_ordinal)?;
                    if let Ok(ref file) = record {
                        next_ordinal += 1;
                        if let Some(ref callback) = self.progress_callback {
                            callback.on_progress(next_ordinal, file.path.to_string_lossy().as_ref());
                        }
                    }
                    Some(record)
                }
                Err(e) => {
                    log::warn!("Cannot read {}: {}", e.path.display(), e.source);
                    Some(Err(ScanError::from_io(&e.path, e.source)))
                }
            })
    }

    /// Turn a walk entry into a record, or `None` if it is filtered out.
    fn process_entry(
        &self,
        entry: WalkEntry,
        ordinal: usize,
    ) -> Option<Result<FileRecord, ScanError>> {
        if entry.kind != EntryKind::File {
            if entry.kind == EntryKind::Symlink {
                log::trace!("Skipping symlink: {}", entry.path.display());
            }
            return None;
        }

        let metadata = match self.fs.metadata(&entry.path) {
            Ok(m) => m,
            Err(e) => return Some(Err(self.handle_io_error(&entry.path, e))),
        };

        // The entry may have been replaced since it was listed
        if metadata.kind != EntryKind::File {
            return None;
        }

        if metadata.len < self.config.min_size {
            log::trace!(
                "Skipping file due to size filter ({}): {}",
                metadata.len,
                entry.path.display()
            );
            return None;
        }

        Some(Ok(FileRecord::new(entry.path, metadata.len, ordinal)))
    }

    /// Handle I/O errors during file access.
    fn handle_io_error(&self, path: &Path, error: std::io::Error) -> ScanError {
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => log::warn!("Permission denied: {}", path.display()),
            std::io::ErrorKind::NotFound => {
                log::debug!("File not found (may have been deleted): {}", path.display());
            }
            _ => log::warn!("I/O error for {}: {}", path.display(), error),
        }
        ScanError::from_io(path, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::memory::MemoryFs;
    use crate::scanner::LocalFs;
    use std::fs::{self, File};
    use std::io::Write;
    use std::sync::atomic::AtomicUsize;
    use tempfile::TempDir;

    fn memory_tree() -> MemoryFs {
        let fs = MemoryFs::new();
        fs.add_file("/root/b.txt", "bbbb");
        fs.add_file("/root/a.txt", "aaaa");
        fs.add_file("/root/empty.txt", "");
        fs.add_file("/root/sub/c.txt", "cccc");
        fs.add_file("/root/.hidden/d.txt", "dddd");
        fs.add_file("/root/.e.txt", "eeee");
        fs.add_symlink("/root/link.txt", "/root/a.txt");
        fs
    }

    fn collect(walker: &Walker<'_>) -> Vec<FileRecord> {
        walker.walk().filter_map(Result::ok).collect()
    }

    fn paths(records: &[FileRecord]) -> Vec<&str> {
        records
            .iter()
            .map(|r| r.path.to_str().unwrap())
            .collect()
    }

    #[test]
    fn test_walker_defaults() {
        let fs = memory_tree();
        let walker = Walker::new(&fs, Path::new("/root"), WalkerConfig::default());
        let files = collect(&walker);

        assert_eq!(
            paths(&files),
            vec!["/root/a.txt", "/root/b.txt", "/root/sub/c.txt"]
        );
        let ordinals: Vec<_> = files.iter().map(|f| f.ordinal).collect();
        assert_eq!(ordinals, vec![0, 1, 2]);
        assert!(files.iter().all(|f| f.size == 4 && f.digest.is_none()));
    }

    #[test]
    fn test_walker_non_recursive() {
        let fs = memory_tree();
        let config = WalkerConfig::default().with_recursive(false);
        let walker = Walker::new(&fs, Path::new("/root"), config);

        assert_eq!(
            paths(&collect(&walker)),
            vec!["/root/a.txt", "/root/b.txt"]
        );
    }

    #[test]
    fn test_walker_includes_hidden_and_empty_when_asked() {
        let fs = memory_tree();
        let config = WalkerConfig::default()
            .with_skip_hidden(false)
            .with_min_size(0);
        let walker = Walker::new(&fs, Path::new("/root"), config);

        assert_eq!(
            paths(&collect(&walker)),
            vec![
                "/root/.e.txt",
                "/root/.hidden/d.txt",
                "/root/a.txt",
                "/root/b.txt",
                "/root/empty.txt",
                "/root/sub/c.txt",
            ]
        );
    }

    #[test]
    fn test_walker_min_size_boundary() {
        let fs = MemoryFs::new();
        fs.add_file("/r/nine", [0u8; 9]);
        fs.add_file("/r/ten", [0u8; 10]);
        fs.add_file("/r/eleven", [0u8; 11]);

        let config = WalkerConfig::default().with_min_size(10);
        let walker = Walker::new(&fs, Path::new("/r"), config);

        assert_eq!(paths(&collect(&walker)), vec!["/r/eleven", "/r/ten"]);
    }

    #[test]
    fn test_walker_reports_errors_and_continues() {
        let fs = memory_tree();
        fs.deny_stat("/root/a.txt");
        fs.deny_list("/root/sub");

        let walker = Walker::new(&fs, Path::new("/root"), WalkerConfig::default());
        let results: Vec<_> = walker.walk().collect();

        let ok: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(ok.len(), 1);
        assert_eq!(ok[0].path, PathBuf::from("/root/b.txt"));
        assert_eq!(ok[0].ordinal, 0);

        let errors: Vec<_> = results.iter().filter_map(|r| r.as_ref().err()).collect();
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| matches!(e, ScanError::PermissionDenied(_))));
        assert_eq!(errors[0].path(), Path::new("/root/a.txt"));
        assert_eq!(errors[1].path(), Path::new("/root/sub"));
    }

    #[test]
    fn test_walker_shutdown_flag() {
        let fs = memory_tree();
        let flag = Arc::new(AtomicBool::new(true));
        let walker = Walker::new(&fs, Path::new("/root"), WalkerConfig::default())
            .with_shutdown_flag(flag);

        assert_eq!(walker.walk().count(), 0);
    }

    #[test]
    fn test_walker_reports_progress() {
        struct Counter(AtomicUsize);
        impl ProgressCallback for Counter {
            fn on_phase_start(&self, _: &str, _: usize) {}
            fn on_progress(&self, current: usize, _: &str) {
                self.0.store(current, Ordering::SeqCst);
            }
            fn on_phase_end(&self, _: &str) {}
        }

        let fs = memory_tree();
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        let walker = Walker::new(&fs, Path::new("/root"), WalkerConfig::default())
            .with_progress_callback(counter.clone());

        assert_eq!(walker.walk().count(), 3);
        assert_eq!(counter.0.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_walker_on_disk() {
        let dir = TempDir::new().unwrap();
        let mut f = File::create(dir.path().join("file1.txt")).unwrap();
        writeln!(f, "Hello, world!").unwrap();
        fs::create_dir(dir.path().join("subdir")).unwrap();
        let mut f = File::create(dir.path().join("subdir").join("nested.txt")).unwrap();
        writeln!(f, "Nested file content").unwrap();
        File::create(dir.path().join("empty.txt")).unwrap();

        let walker = Walker::new(&LocalFs, dir.path(), WalkerConfig::default());
        let files = collect(&walker);

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, dir.path().join("file1.txt"));
        assert_eq!(files[1].path, dir.path().join("subdir").join("nested.txt"));
        assert_eq!(files[0].size, 14);
    }

    #[cfg(unix)]
    #[test]
    fn test_walker_skips_symlinks_on_disk() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("real.txt"), "content").unwrap();
        std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("link.txt"))
            .unwrap();

        let walker = Walker::new(&LocalFs, dir.path(), WalkerConfig::default());
        let files = collect(&walker);

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, dir.path().join("real.txt"));
    }
}
