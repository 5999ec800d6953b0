//! Duplicate finder implementation with two-phase detection.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Walk**: Collect regular files in traversal order (see [`crate::scanner::Walker`])
//! 2. **Phase 1 - Size grouping**: Group files by size (see [`crate::duplicates::groups`])
//! 3. **Phase 2 - Content hash**: SHA-256 every file that shares its size with another
//!
//! Phase 2 runs on a bounded rayon pool. Results come back in input order,
//! so the first member of every group is the first one discovered no matter
//! which worker finished first.
//!
//! # Example
//!
//! ```
//! use dupescan::duplicates::{DuplicateFinder, FinderConfig};
//! use dupescan::scanner::MemoryFs;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let fs = Arc::new(MemoryFs::new());
//! fs.add_file("/data/a.txt", "hello");
//! fs.add_file("/data/b.txt", "hello");
//! fs.add_file("/data/c.txt", "world");
//!
//! let finder = DuplicateFinder::with_filesystem(FinderConfig::default(), fs);
//! let result = finder.find_duplicates(Path::new("/data")).unwrap();
//!
//! assert_eq!(result.groups.len(), 1);
//! assert_eq!(result.summary.reclaimable_space, 5);
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use indexmap::IndexMap;
use rayon::prelude::*;

use super::{group_by_size, DuplicateGroup, SizeGroup};
use crate::progress::ProgressCallback;
use crate::scanner::{
    EntryKind, FileRecord, FileSystem, Hash, HashError, Hasher, LocalFs, ScanError, Walker,
    WalkerConfig,
};

/// Files above this size are logged at debug level when hashed.
const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024;

// ============================================================================
// Phase 2: Content hashing
// ============================================================================

/// Configuration for the content hashing phase.
#[derive(Clone)]
pub struct HashPhaseConfig {
    /// Number of I/O threads for parallel hashing.
    pub io_threads: usize,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for HashPhaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashPhaseConfig")
            .field("io_threads", &self.io_threads)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for HashPhaseConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl HashPhaseConfig {
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Statistics from the content hashing phase.
#[derive(Debug, Default)]
pub struct HashPhaseStats {
    /// Total files that entered the phase
    pub input_files: usize,
    /// Number of files successfully hashed
    pub hashed_files: usize,
    /// Bytes read while hashing
    pub bytes_hashed: u64,
    /// Files that could not be read and were dropped
    pub failed_files: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Duplicate files, not counting the kept copy of each group
    pub duplicate_files: usize,
    /// Bytes that deleting every duplicate would free
    pub wasted_space: u64,
    /// Whether the phase stopped early because of a shutdown request
    pub interrupted: bool,
    /// Per-file failures, in input order
    pub errors: Vec<HashError>,
}

/// Hash every file of every size group and keep the digests that collide.
///
/// Files are hashed in the order the size groups yield them; a file that
/// cannot be read is dropped from its group and recorded in
/// [`HashPhaseStats::errors`]. The returned groups are sorted by the
/// ordinal of their first member.
#[must_use]
pub fn hash_phase(
    size_groups: IndexMap<u64, SizeGroup>,
    fs: &dyn FileSystem,
    hasher: &Hasher,
    config: &HashPhaseConfig,
) -> (Vec<DuplicateGroup>, HashPhaseStats) {
    let all_files: Vec<FileRecord> = size_groups
        .into_values()
        .flat_map(|group| group.files)
        .collect();

    let mut stats = HashPhaseStats {
        input_files: all_files.len(),
        ..Default::default()
    };

    if all_files.is_empty() {
        log::debug!("Phase 2: No files to process");
        return (Vec::new(), stats);
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start("hashing", all_files.len());
    }

    log::info!("Phase 2: Computing content hashes for {} files", all_files.len());

    let completed = AtomicUsize::new(0);
    let hash_one = |file: FileRecord| -> (FileRecord, Option<Result<Hash, HashError>>) {
        if config.is_shutdown_requested() {
            return (file, None);
        }

        if file.size > LARGE_FILE_THRESHOLD {
            log::debug!(
                "Hashing large file ({} MB): {}",
                file.size / (1024 * 1024),
                file.path.display()
            );
        }

        let result = hasher.hash_file(fs, &file.path);
        if let Err(ref e) = result {
            log::warn!("Failed to hash {}: {}", file.path.display(), e);
        }

        if let Some(ref callback) = config.progress_callback {
            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
            callback.on_progress(done, file.path.to_string_lossy().as_ref());
            callback.on_item_completed(file.size);
        }

        (file, Some(result))
    };

    // Limited parallelism keeps the disk from thrashing
    let hash_results: Vec<_> = match rayon::ThreadPoolBuilder::new()
        .num_threads(config.io_threads.max(1))
        .build()
    {
        Ok(pool) => pool.install(|| all_files.into_par_iter().map(&hash_one).collect()),
        Err(e) => {
            log::warn!("Failed to create hashing thread pool, hashing sequentially: {}", e);
            all_files.into_iter().map(&hash_one).collect()
        }
    };

    if config.is_shutdown_requested() {
        stats.interrupted = true;
        log::info!("Phase 2: Interrupted by shutdown signal");
    }

    let mut digest_groups: IndexMap<Hash, Vec<FileRecord>> = IndexMap::new();
    for (file, result) in hash_results {
        match result {
            Some(Ok(hash)) => {
                stats.hashed_files += 1;
                stats.bytes_hashed += file.size;
                digest_groups
                    .entry(hash)
                    .or_default()
                    .push(file.with_digest(hash));
            }
            Some(Err(e)) => {
                stats.failed_files += 1;
                stats.errors.push(e);
            }
            None => {}
        }
    }

    let mut duplicate_groups: Vec<DuplicateGroup> = digest_groups
        .into_iter()
        .filter(|(_, files)| files.len() > 1)
        .map(|(hash, files)| {
            let size = files.first().map_or(0, |f| f.size);
            log::debug!(
                "Duplicate group {}: {} files, {} bytes each",
                crate::scanner::hash_to_hex(&hash),
                files.len(),
                size
            );
            DuplicateGroup::new(hash, size, files)
        })
        .collect();
    duplicate_groups.sort_by_key(|g| g.keep().map_or(usize::MAX, |f| f.ordinal));

    stats.duplicate_groups = duplicate_groups.len();
    stats.duplicate_files = duplicate_groups.iter().map(DuplicateGroup::duplicate_count).sum();
    stats.wasted_space = duplicate_groups.iter().map(DuplicateGroup::wasted_space).sum();

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end("hashing");
    }

    log::info!(
        "Phase 2 complete: {} groups, {} duplicates, {} bytes reclaimable",
        stats.duplicate_groups,
        stats.duplicate_files,
        stats.wasted_space
    );

    (duplicate_groups, stats)
}

// ============================================================================
// DuplicateFinder - Pipeline Orchestrator
// ============================================================================

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of I/O threads for parallel hashing.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("walker_config", &self.walker_config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            walker_config: WalkerConfig::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the I/O thread count (at least one).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the shutdown flag for graceful termination.
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

    fn hash_phase_config(&self) -> HashPhaseConfig {
        HashPhaseConfig {
            io_threads: self.io_threads,
            shutdown_flag: self.shutdown_flag.clone(),
            progress_callback: self.progress_callback.clone(),
        }
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Total number of files that passed the walk filters
    pub total_files: usize,
    /// Total size of those files in bytes
    pub total_size: u64,
    /// Number of files eliminated by size grouping (unique sizes)
    pub eliminated_by_size: usize,
    /// Number of files successfully hashed
    pub hashed_files: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding the kept copies)
    pub duplicate_files: usize,
    /// Σ size × (members − 1) over all groups
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
}

impl ScanSummary {
    /// Calculate the percentage of scanned bytes held by duplicates.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize::b(self.total_size).to_string()
    }
}

/// Outcome of a completed scan.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Confirmed duplicate groups, ordered by the ordinal of their kept file
    pub groups: Vec<DuplicateGroup>,
    /// Counters and sizes
    pub summary: ScanSummary,
    /// Entries that were skipped because they could not be read
    pub warnings: Vec<ScanError>,
}

impl ScanResult {
    /// Whether any duplicates were found.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }
}

/// Errors that abort a scan.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The root does not exist or is not a directory.
    #[error("Not a directory: {0}")]
    InvalidDirectory(PathBuf),
}

/// Duplicate finder that orchestrates the detection pipeline.
///
/// # Example
///
/// ```no_run
/// use dupescan::duplicates::{DuplicateFinder, FinderConfig};
/// use std::path::Path;
///
/// let config = FinderConfig::default().with_io_threads(4);
/// let finder = DuplicateFinder::new(config);
///
/// let result = finder.find_duplicates(Path::new("/some/path")).unwrap();
///
/// println!("Found {} duplicate groups", result.summary.duplicate_groups);
/// println!("Reclaimable space: {}", result.summary.reclaimable_display());
/// ```
pub struct DuplicateFinder {
    config: FinderConfig,
    fs: Arc<dyn FileSystem>,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a finder that reads the local filesystem.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self::with_filesystem(config, Arc::new(LocalFs::new()))
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Create a finder over any [`FileSystem`].
    #[must_use]
    pub fn with_filesystem(config: FinderConfig, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            config,
            fs,
            hasher: Hasher::new(),
        }
    }

    /// The filesystem this finder reads from.
    #[must_use]
    pub fn filesystem(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// Find all duplicate files below `path`.
    ///
    /// Every reported path is rooted at the canonical form of `path`.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - The path does not exist or is not a directory
    /// - The scan is interrupted by shutdown signal
    ///
    /// Unreadable entries never fail the scan; they end up in
    /// [`ScanResult::warnings`].
    pub fn find_duplicates(&self, path: &Path) -> Result<ScanResult, FinderError> {
        let start_time = Instant::now();

        let root = self.validate_root(path)?;
        log::info!("Starting duplicate scan of {}", root.display());

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("walking", 0);
            callback.on_message(&format!("Walking {}", root.display()));
        }

        let mut walker = Walker::new(self.fs.as_ref(), &root, self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }
        if let Some(ref callback) = self.config.progress_callback {
            walker = walker.with_progress_callback(callback.clone());
        }

        let mut files = Vec::new();
        let mut warnings = Vec::new();
        for result in walker.walk() {
            match result {
                Ok(file) => files.push(file),
                Err(e) => warnings.push(e),
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("walking");
        }

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let mut result = self.find_duplicates_from_files(files)?;
        warnings.append(&mut result.warnings);
        result.warnings = warnings;
        result.summary.scan_duration = start_time.elapsed();

        if !result.warnings.is_empty() {
            log::warn!("Skipped {} unreadable entries", result.warnings.len());
        }

        Ok(result)
    }

    /// Run the grouping and hashing phases over records collected elsewhere.
    ///
    /// `files` must be in traversal order with ascending ordinals.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Interrupted`] if shutdown is requested.
    pub fn find_duplicates_from_files(
        &self,
        files: Vec<FileRecord>,
    ) -> Result<ScanResult, FinderError> {
        let start_time = Instant::now();
        let mut result = ScanResult::default();

        log::info!("Phase 1: Grouping {} files by size...", files.len());
        let (size_groups, size_stats) = group_by_size(files);

        result.summary.total_files = size_stats.total_files;
        result.summary.total_size = size_stats.total_size;
        result.summary.eliminated_by_size = size_stats.eliminated_unique;

        log::info!(
            "Phase 1 complete: {} → {} files ({:.1}% eliminated, {} total)",
            size_stats.total_files,
            size_stats.potential_duplicates,
            size_stats.elimination_rate(),
            ByteSize::b(size_stats.total_size)
        );

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        if size_groups.is_empty() {
            log::info!("No potential duplicates found after size grouping");
            result.summary.scan_duration = start_time.elapsed();
            return Ok(result);
        }

        let (groups, hash_stats) = hash_phase(
            size_groups,
            self.fs.as_ref(),
            &self.hasher,
            &self.config.hash_phase_config(),
        );

        if hash_stats.interrupted {
            return Err(FinderError::Interrupted);
        }

        result.summary.hashed_files = hash_stats.hashed_files;
        result.summary.duplicate_groups = hash_stats.duplicate_groups;
        result.summary.duplicate_files = hash_stats.duplicate_files;
        result.summary.reclaimable_space = hash_stats.wasted_space;
        result.summary.scan_duration = start_time.elapsed();
        result.warnings = hash_stats.errors.into_iter().map(ScanError::from).collect();
        result.groups = groups;

        Ok(result)
    }

    fn validate_root(&self, path: &Path) -> Result<PathBuf, FinderError> {
        let invalid = || FinderError::InvalidDirectory(path.to_path_buf());

        let root = self.fs.canonicalize(path).map_err(|e| {
            log::debug!("Cannot resolve {}: {}", path.display(), e);
            invalid()
        })?;
        match self.fs.metadata(&root) {
            Ok(meta) if meta.kind == EntryKind::Dir => Ok(root),
            _ => Err(invalid()),
        }
    }
}

impl Default for DuplicateFinder {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for DuplicateFinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuplicateFinder")
            .field("config", &self.config)
            .field("hasher", &self.hasher)
            .finish_non_exhaustive()
    }
}
