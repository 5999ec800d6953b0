//! Output formatters for duplicate scan results.
//!
//! This module provides different output formats for scan results:
//! - Text for people at a terminal
//! - JSON for automation and scripting
//! - CSV for spreadsheet import
//!
//! # Example
//!
//! ```no_run
//! use dupescan::error::ExitCode;
//! use dupescan::output::json::JsonOutput;
//! use std::path::Path;
//!
//! let result = dupescan::scan(Path::new("."), true, 1).unwrap();
//! let output = JsonOutput::new(&result, ExitCode::Success);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

pub mod csv;
pub mod json;
pub mod text;

// Re-export main types
pub use csv::CsvOutput;
pub use json::JsonOutput;
pub use text::TextOutput;
