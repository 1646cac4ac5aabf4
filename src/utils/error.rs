//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while opening the dump input
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read standard input: {0}")]
    Stdin(#[source] std::io::Error),
}

/// Errors that can occur during stack dump parsing
///
/// Every syntax variant carries the 1-based line number of the offending line.
/// Any of them aborts the whole parse.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("line {line}: invalid goroutine id '{id}'")]
    InvalidGoroutineId { line: usize, id: String },

    #[error("line {line}: goroutine header has no [state]")]
    MissingState { line: usize },

    #[error("line {line}: goroutine header is not terminated by ']:'")]
    UnterminatedHeader { line: usize },

    #[error("line {line}: goroutine header has an empty state")]
    EmptyState { line: usize },

    #[error("line {line}: unrecognized duration unit '{unit}'")]
    UnknownDurationUnit { line: usize, unit: String },

    #[error("line {line}: invalid wait duration '{text}'")]
    InvalidDuration { line: usize, text: String },

    #[error("line {line}: goroutine {id} has no frames")]
    MissingFrames { line: usize, id: u64 },

    #[error("line {line}: goroutine {id} ends with a function line but no location line")]
    TruncatedFrame { line: usize, id: u64 },

    #[error("line {line}: invalid frame location '{text}'")]
    InvalidLocation { line: usize, text: String },

    #[error("line {line}: frame found after 'created by' in goroutine {id}")]
    FrameAfterCreatedBy { line: usize, id: u64 },

    #[error("Failed to read stack dump: {0}")]
    ReadFailed(#[from] std::io::Error),
}

/// Errors caused by invalid command-line values
#[derive(Error, Debug)]
pub enum ArgumentError {
    #[error("invalid duration '{value}': {reason}")]
    InvalidDuration { value: String, reason: String },

    #[error("unknown sorting parameter '{0}' (options: goronum, stacksize, waittime)")]
    UnknownSortKey(String),

    #[error("unrecognized output type '{0}' (valid options are: full, summary, json)")]
    UnknownOutputMode(String),

    #[error("output type '{0}' is not implemented")]
    UnimplementedOutputMode(String),

    #[error("invalid line prefix pattern '{pattern}': {source}")]
    InvalidLinePrefix {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("input path cannot be empty (use '-' for standard input)")]
    EmptyInputPath,
}
