//! Stack predicates and their conjunction.
//!
//! A [`Filter`] decides keep/drop for one stack. A list of filters keeps the
//! stacks for which every filter holds, so the order of the list never
//! changes the result.

use crate::parser::Stack;
use std::fmt;
use std::time::Duration;

/// A predicate over one stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Some frame's function name or `file:line` contains the substring
    FrameMatch(String),

    /// The stack has waited strictly longer than the duration
    WaitGreaterThan(Duration),

    /// The state label contains the substring
    StateMatch(String),

    /// Logical complement
    Negate(Box<Filter>),
}

impl Filter {
    /// Evaluate against `stack`
    pub fn matches(&self, stack: &Stack) -> bool {
        match self {
            Filter::FrameMatch(needle) => stack.frames().iter().any(|f| f.matches(needle)),
            Filter::WaitGreaterThan(limit) => stack.wait() > *limit,
            Filter::StateMatch(needle) => stack.state().contains(needle.as_str()),
            Filter::Negate(inner) => !inner.matches(stack),
        }
    }

    /// Wrap in [`Filter::Negate`]
    pub fn negate(self) -> Self {
        Filter::Negate(Box::new(self))
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::FrameMatch(needle) => write!(f, "frame contains '{}'", needle),
            Filter::WaitGreaterThan(limit) => write!(f, "wait > {:?}", limit),
            Filter::StateMatch(needle) => write!(f, "state contains '{}'", needle),
            Filter::Negate(inner) => write!(f, "not ({})", inner),
        }
    }
}

/// Keep the stacks for which every filter holds
///
/// **Public** - main entry point for filtering
///
/// Relative order of the survivors is preserved and an empty filter list
/// keeps everything. Accepts either the parsed stacks or an already
/// filtered view.
pub fn apply_filters<'a, I>(stacks: I, filters: &[Filter]) -> Vec<&'a Stack>
where
    I: IntoIterator<Item = &'a Stack>,
{
    stacks
        .into_iter()
        .filter(|stack| filters.iter().all(|filter| filter.matches(stack)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    const DUMP: &str = "\
goroutine 1 [running]:
main.main()
\t/app/main.go:10 +0x1d

goroutine 2 [chan receive, 5 minutes]:
main.worker(0xc000010000)
\t/app/worker.go:22 +0x45
";

    #[test]
    fn test_frame_match() {
        let stacks = parse_str(DUMP, None).unwrap();
        let kept = apply_filters(&stacks, &[Filter::FrameMatch("worker".to_string())]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id(), 2);
    }

    #[test]
    fn test_frame_match_is_case_sensitive() {
        let stacks = parse_str(DUMP, None).unwrap();
        assert!(apply_filters(&stacks, &[Filter::FrameMatch("Worker".to_string())]).is_empty());
    }

    #[test]
    fn test_wait_greater_than_is_strict() {
        let stacks = parse_str(DUMP, None).unwrap();
        let five_minutes = Filter::WaitGreaterThan(Duration::from_secs(300));
        assert!(apply_filters(&stacks, &[five_minutes]).is_empty());
    }

    #[test]
    fn test_empty_filter_list_is_identity() {
        let stacks = parse_str(DUMP, None).unwrap();
        assert_eq!(apply_filters(&stacks, &[]).len(), 2);
    }

    #[test]
    fn test_display() {
        let filter = Filter::StateMatch("select".to_string()).negate();
        assert_eq!(filter.to_string(), "not (state contains 'select')");
    }
}
