//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (Phase 1)
//! - SHA-256 content comparison (Phase 2)
//! - Duplicate group management

pub mod finder;
pub mod groups;

use std::path::Path;

pub use finder::{
    hash_phase, DuplicateFinder, FinderConfig, FinderError, HashPhaseConfig, HashPhaseStats,
    ScanResult, ScanSummary,
};
pub use groups::{group_by_size, DuplicateGroup, GroupingStats, SizeGroup};

use crate::scanner::WalkerConfig;

/// Scan `root` on the local filesystem with default settings otherwise.
///
/// # Errors
///
/// Returns [`FinderError::InvalidDirectory`] if `root` is missing or not a
/// directory.
///
/// # Example
///
/// ```no_run
/// let result = dupescan::scan(std::path::Path::new("."), true, 1).unwrap();
/// for group in &result.groups {
///     println!("{} x{}", group.hash_hex(), group.len());
/// }
/// ```
pub fn scan(root: &Path, recursive: bool, min_size: u64) -> Result<ScanResult, FinderError> {
    let walker_config = WalkerConfig::default()
        .with_recursive(recursive)
        .with_min_size(min_size);
    DuplicateFinder::new(FinderConfig::default().with_walker_config(walker_config))
        .find_duplicates(root)
}
