//! Stackparse CLI
//!
//! Filters, sorts and summarizes Go goroutine stack dumps.

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use std::io;
use std::time::Duration;

use stackparse::aggregator::SortKey;
use stackparse::commands::{execute_inspect, validate_args, InputSource, InspectArgs, OutputMode};
use stackparse::filter::Filter;
use stackparse::parser::{parse_flag_duration, LinePrefix};
use stackparse::utils::config::{LINE_PREFIX_ENV, STDIN_ARG};
use stackparse::utils::ArgumentError;

const AFTER_HELP: &str = "\
Filters are combined: a stack is printed only if it passes every filter.
DURATION values look like 30s, 10m, 1h30m or 250ms.

Examples:
  stackparse --fm=net/http --wait-more-than=10m goroutines.txt
  stackparse --state-match='chan receive' --sort=goronum goroutines.txt
  journalctl -u app | stackparse --line-prefix='^.*app\\[\\d+\\]: ' -s -";

/// Stackparse - inspect Go goroutine stack dumps
#[derive(Parser, Debug)]
#[command(name = "stackparse")]
#[command(version, about, long_about = None, after_help = AFTER_HELP)]
struct Cli {
    /// Stack dump file, or '-' for standard input
    #[arg(default_value = STDIN_ARG)]
    file: String,

    /// Print only stacks with a frame containing TEXT
    #[arg(long = "frame-match", visible_alias = "fm", value_name = "TEXT")]
    frame_match: Vec<String>,

    /// Print only stacks with no frame containing TEXT
    #[arg(long = "frame-not-match", visible_alias = "fnm", value_name = "TEXT")]
    frame_not_match: Vec<String>,

    /// Print only stacks blocked for more than DURATION
    #[arg(long, value_name = "DURATION", value_parser = parse_flag_duration)]
    wait_more_than: Vec<Duration>,

    /// Print only stacks blocked for at most DURATION
    #[arg(long, value_name = "DURATION", value_parser = parse_flag_duration)]
    wait_less_than: Vec<Duration>,

    /// Print only stacks whose state contains TEXT
    #[arg(long, value_name = "TEXT")]
    state_match: Vec<String>,

    /// Print only stacks whose state does not contain TEXT
    #[arg(long, value_name = "TEXT")]
    state_not_match: Vec<String>,

    /// Sort order: stacksize, goronum or waittime
    #[arg(long, value_name = "KEY", default_value = "waittime")]
    sort: SortKey,

    /// Regex stripped from the start of every line (e.g. a log prefix)
    #[arg(long, value_name = "PATTERN", env = LINE_PREFIX_ENV)]
    line_prefix: Option<String>,

    /// Output type: full, summary or json
    #[arg(long, value_name = "MODE", default_value = "full")]
    output: OutputMode,

    /// Print a summary of top frames and goroutine counts
    #[arg(short, long)]
    summary: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Build the pipeline arguments
    ///
    /// **Private** - flag surface to library types
    ///
    /// # Errors
    /// * `ArgumentError::InvalidLinePrefix` - `--line-prefix` is not a valid regex
    fn into_inspect_args(self) -> Result<InspectArgs, ArgumentError> {
        let mut filters = Vec::new();

        filters.extend(self.frame_match.into_iter().map(Filter::FrameMatch));
        filters.extend(
            self.frame_not_match
                .into_iter()
                .map(|text| Filter::FrameMatch(text).negate()),
        );
        filters.extend(self.wait_more_than.into_iter().map(Filter::WaitGreaterThan));
        filters.extend(
            self.wait_less_than
                .into_iter()
                .map(|limit| Filter::WaitGreaterThan(limit).negate()),
        );
        filters.extend(self.state_match.into_iter().map(Filter::StateMatch));
        filters.extend(
            self.state_not_match
                .into_iter()
                .map(|text| Filter::StateMatch(text).negate()),
        );

        let line_prefix = self
            .line_prefix
            .as_deref()
            .filter(|pattern| !pattern.is_empty())
            .map(LinePrefix::new)
            .transpose()?;

        Ok(InspectArgs {
            input: InputSource::from_arg(&self.file),
            filters,
            sort: self.sort,
            line_prefix,
            output: if self.summary {
                OutputMode::Summary
            } else {
                self.output
            },
        })
    }
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging; stdout is reserved for results
    let log_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let args = cli.into_inspect_args()?;

    // Validate args first
    validate_args(&args)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute_inspect(&args, &mut out)?;

    Ok(())
}
