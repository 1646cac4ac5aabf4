//! Configuration and constants for the CLI.

/// Current JSON report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Input argument that selects standard input
pub const STDIN_ARG: &str = "-";

// Line markers of the goroutine dump format
pub const HEADER_PREFIX: &str = "goroutine ";
pub const CREATED_BY_PREFIX: &str = "created by ";
pub const CREATED_IN_GOROUTINE: &str = " in goroutine ";
pub const ELIDED_FRAMES_MARKER: &str = "...additional frames elided...";
pub const ELIDED_GAP_PREFIX: &str = "...";
pub const ELIDED_GAP_SUFFIX: &str = " frames elided...";

/// Spaces between the function column and the count column of the summary table
pub const SUMMARY_COLUMN_GAP: usize = 2;

/// Environment variable consulted when `--line-prefix` is not given
pub const LINE_PREFIX_ENV: &str = "STACKPARSE_LINE_PREFIX";
