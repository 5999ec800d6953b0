//! dupescan - duplicate file detection
//!
//! Files are grouped by size, same-size files are confirmed with a SHA-256
//! content digest, and each group lists its members in traversal order so
//! that the first one can be kept when the rest are deleted.
//!
//! ```no_run
//! use std::path::Path;
//!
//! let result = dupescan::scan(Path::new("."), true, 1).unwrap();
//! println!("{} reclaimable", result.summary.reclaimable_display());
//! ```

pub mod actions;
pub mod app;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

pub use app::run_app;
pub use duplicates::scan;
