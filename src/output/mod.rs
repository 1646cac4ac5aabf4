//! Output writers for parsed stacks.
//!
//! This module renders results in the supported formats:
//! - Full stack listings in dump form
//! - Aligned summary tables
//! - JSON reports

pub mod json;
pub mod text;

// Re-export main functions
pub use json::{write_json_report, DumpReport};
pub use text::{write_full, write_summary};
