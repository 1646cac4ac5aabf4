//! Orderings over stack views.
//!
//! Sorting reorders `&Stack` handles only; the parsed stacks are untouched.
//! All orderings are ascending and stable.

use crate::parser::Stack;
use crate::utils::error::ArgumentError;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Selectable sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Wait duration, shortest first
    #[default]
    WaitTime,

    /// Goroutine id
    GoroutineId,

    /// Number of frames
    StackSize,
}

impl SortKey {
    /// Compare two stacks under this key
    pub fn compare(&self, a: &Stack, b: &Stack) -> Ordering {
        match self {
            SortKey::WaitTime => a.wait().cmp(&b.wait()),
            SortKey::GoroutineId => a.id().cmp(&b.id()),
            SortKey::StackSize => a.depth().cmp(&b.depth()),
        }
    }

    /// Flag value naming this key
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::WaitTime => "waittime",
            SortKey::GoroutineId => "goronum",
            SortKey::StackSize => "stacksize",
        }
    }
}

impl FromStr for SortKey {
    type Err = ArgumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waittime" => Ok(SortKey::WaitTime),
            "goronum" => Ok(SortKey::GoroutineId),
            "stacksize" => Ok(SortKey::StackSize),
            other => Err(ArgumentError::UnknownSortKey(other.to_string())),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort stack handles in place, keeping the input order of equal stacks
pub fn sort_stacks(stacks: &mut [&Stack], key: SortKey) {
    stacks.sort_by(|a, b| key.compare(a, b));
}
