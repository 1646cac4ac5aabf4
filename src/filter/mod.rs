//! Filter engine over parsed stacks.

pub mod predicate;

pub use predicate::{apply_filters, Filter};
