//! File actions module.
//!
//! The only action is deletion of duplicates: every member of a group
//! except the first is removed, either permanently or to the system trash.
//!
//! ```no_run
//! use dupescan::actions::{delete_group, DeleteConfig};
//! use dupescan::scanner::LocalFs;
//!
//! let result = dupescan::scan(std::path::Path::new("."), true, 1).unwrap();
//! if let Some(group) = result.groups.first() {
//!     let report = delete_group(&LocalFs, group, &DeleteConfig::trash());
//!     println!("{}", report.summary());
//! }
//! ```

pub mod delete;

// Re-export commonly used types
pub use delete::{
    delete_file, delete_group, DeleteConfig, DeleteError, DeleteMode, DeleteResult,
    DeletionReport,
};
