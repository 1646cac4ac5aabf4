//! Stackparse
//!
//! Parsing, filtering and summarizing of Go goroutine stack dumps.
//!
//! This crate provides the core implementation for the
//! `stackparse` CLI tool.
//!
//! ## Getting Started
//!
//! Most users should install and use the CLI:
//!
//! ```bash
//! cargo install stackparse
//! stackparse --wait-more-than=10m --summary goroutines.txt
//! ```
//!
//! As a library:
//!
//! ```no_run
//! use stackparse::aggregator::{sort_stacks, SortKey};
//! use stackparse::filter::{apply_filters, Filter};
//! use stackparse::parser::parse_str;
//!
//! let dump = std::fs::read_to_string("goroutines.txt")?;
//! let stacks = parse_str(&dump, None)?;
//! let mut view = apply_filters(&stacks, &[Filter::StateMatch("chan".into())]);
//! sort_stacks(&mut view, SortKey::WaitTime);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod aggregator;
pub mod commands;
pub mod filter;
pub mod output;
pub mod parser;
pub mod utils;
