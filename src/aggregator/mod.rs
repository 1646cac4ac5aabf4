//! Ordering and aggregation of parsed stacks.
//!
//! This module turns a filtered stack view into:
//! - A sorted view (by wait time, goroutine id or depth)
//! - A per-top-frame summary with occurrence counts

pub mod sorter;
pub mod summary;

// Re-export main types and functions
pub use sorter::{sort_stacks, SortKey};
pub use summary::{summarize, total_count, SummaryEntry};
