//! Plain-text renderers: full stack listings and the summary table.

use crate::aggregator::SummaryEntry;
use crate::parser::Stack;
use crate::utils::config::SUMMARY_COLUMN_GAP;
use std::io::{self, Write};

/// Write each stack in dump form followed by a blank line
pub fn write_full<W: Write>(writer: &mut W, stacks: &[&Stack]) -> io::Result<()> {
    for stack in stacks {
        writeln!(writer, "{}", stack)?;
    }
    writer.flush()
}

/// Write a two-column table of top frame function and count
///
/// The function column is padded to the widest name.
pub fn write_summary<W: Write>(writer: &mut W, entries: &[SummaryEntry<'_>]) -> io::Result<()> {
    let width = entries
        .iter()
        .map(|e| e.function().chars().count())
        .max()
        .unwrap_or(0);

    for entry in entries {
        writeln!(
            writer,
            "{:<width$}{:gap$}{}",
            entry.function(),
            "",
            entry.count,
            width = width,
            gap = SUMMARY_COLUMN_GAP
        )?;
    }
    writer.flush()
}
