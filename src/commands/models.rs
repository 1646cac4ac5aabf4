use crate::aggregator::SortKey;
use crate::filter::Filter;
use crate::parser::LinePrefix;
use crate::utils::config::STDIN_ARG;
use crate::utils::error::ArgumentError;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Where the dump is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// `-` selects standard input, anything else is a path
    pub fn from_arg(arg: &str) -> Self {
        if arg == STDIN_ARG {
            InputSource::Stdin
        } else {
            InputSource::File(PathBuf::from(arg))
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::Stdin => f.write_str("<stdin>"),
            InputSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Every stack in dump form
    #[default]
    Full,

    /// Top frame function and goroutine count per group
    Summary,

    /// Parsed model as a JSON report
    Json,
}

impl FromStr for OutputMode {
    type Err = ArgumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(OutputMode::Full),
            "summary" => Ok(OutputMode::Summary),
            "json" => Ok(OutputMode::Json),
            "top" => Err(ArgumentError::UnimplementedOutputMode(s.to_string())),
            other => Err(ArgumentError::UnknownOutputMode(other.to_string())),
        }
    }
}

/// Arguments for the inspect pipeline
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct InspectArgs {
    /// Dump to read
    pub input: InputSource,

    /// Predicates every printed stack must satisfy
    pub filters: Vec<Filter>,

    /// Ordering of the printed stacks
    pub sort: SortKey,

    /// Compiled pattern stripped from the start of each line
    pub line_prefix: Option<LinePrefix>,

    /// Output format
    pub output: OutputMode,
}

impl Default for InspectArgs {
    fn default() -> Self {
        Self {
            input: InputSource::Stdin,
            filters: Vec::new(),
            sort: SortKey::default(),
            line_prefix: None,
            output: OutputMode::default(),
        }
    }
}
