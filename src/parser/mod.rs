//! Stack dump parsing and the parsed data model.
//!
//! This module handles:
//! - Splitting raw dump text into goroutine stacks
//! - Reading header states and wait durations
//! - Defining the Stack/Frame model

pub mod duration;
pub mod goroutine_dump;
pub mod schema;

// Re-export main types
pub use duration::{parse_flag_duration, parse_header_duration};
pub use goroutine_dump::{parse_header, parse_stacks, parse_str, LinePrefix};
pub use schema::{CreatedBy, ElidedGap, Frame, Stack, StackHeader};
