//! Group stacks by the function they are suspended in.
//!
//! Answers "how many goroutines are stuck at F": one entry per distinct top
//! frame function, least common first.

use crate::parser::Stack;
use log::debug;
use std::collections::HashMap;

/// One group of stacks sharing a top frame function
#[derive(Debug, Clone)]
pub struct SummaryEntry<'a> {
    /// First stack encountered in the group
    pub representative: &'a Stack,

    /// Number of stacks in the group
    pub count: usize,
}

impl<'a> SummaryEntry<'a> {
    /// Top frame function shared by the group
    pub fn function(&self) -> &'a str {
        &self.representative.top_frame().function
    }
}

/// Build the summary
///
/// **Public** - main entry point for aggregation
///
/// # Arguments
/// * `stacks` - Stacks in the order representatives should be chosen
///
/// # Returns
/// One entry per distinct top frame function, ordered by ascending count.
/// Groups with equal counts keep first-encounter order.
pub fn summarize<'a, I>(stacks: I) -> Vec<SummaryEntry<'a>>
where
    I: IntoIterator<Item = &'a Stack>,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut entries: Vec<SummaryEntry<'a>> = Vec::new();

    for stack in stacks {
        let function = stack.top_frame().function.as_str();
        match index.get(function) {
            Some(&slot) => entries[slot].count += 1,
            None => {
                index.insert(function, entries.len());
                entries.push(SummaryEntry {
                    representative: stack,
                    count: 1,
                });
            }
        }
    }

    // sort_by is stable
    entries.sort_by(|a, b| a.count.cmp(&b.count));

    debug!("Summarized into {} distinct top frames", entries.len());

    entries
}

/// Total stacks covered by a summary
pub fn total_count(entries: &[SummaryEntry<'_>]) -> usize {
    entries.iter().map(|e| e.count).sum()
}
