//! CLI command implementations.
//!
//! Commands orchestrate the various library components to perform user tasks.

pub mod inspect;
pub mod models;

// Re-export main command functions
pub use inspect::{execute_inspect, open_input, validate_args};
pub use models::{InputSource, InspectArgs, OutputMode};
