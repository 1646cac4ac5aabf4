//! Inspect command implementation.
//!
//! The inspect command:
//! 1. Opens the dump (file or stdin)
//! 2. Parses every goroutine stack
//! 3. Applies the filters
//! 4. Sorts the survivors
//! 5. Writes the selected output

use super::models::{InputSource, InspectArgs, OutputMode};
use crate::aggregator::{sort_stacks, summarize, total_count};
use crate::filter::apply_filters;
use crate::output::{write_full, write_json_report, write_summary};
use crate::parser::{parse_stacks, Stack};
use crate::utils::error::{ArgumentError, InputError};
use anyhow::{Context, Result};
use log::{debug, info};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::time::Instant;

/// Execute the inspect command
///
/// **Public** - main entry point called from main.rs
///
/// # Arguments
/// * `args` - Inspect command arguments
/// * `writer` - Destination of the rendered output (stdout in the CLI)
///
/// # Errors
/// * Input cannot be opened or read
/// * Malformed dump
/// * Output write failures
pub fn execute_inspect<W: Write>(args: &InspectArgs, writer: &mut W) -> Result<()> {
    let start_time = Instant::now();

    info!("Reading goroutine dump from {}", args.input);
    let reader = open_input(&args.input)?;

    let stacks = parse_stacks(reader, args.line_prefix.as_ref())
        .with_context(|| format!("Failed to parse goroutine dump from {}", args.input))?;
    info!("Parsed {} goroutines", stacks.len());

    let mut view = apply_filters(&stacks, &args.filters);
    debug!(
        "{} of {} goroutines passed {} filter(s)",
        view.len(),
        stacks.len(),
        args.filters.len()
    );
    for filter in &args.filters {
        debug!("  filter: {}", filter);
    }

    sort_stacks(&mut view, args.sort);
    debug!("Sorted by {}", args.sort);

    write_output(args.output, &view, writer).context("Failed to write output")?;

    debug!(
        "Inspect completed in {:.3}s",
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

fn write_output<W: Write>(mode: OutputMode, view: &[&Stack], writer: &mut W) -> Result<()> {
    match mode {
        OutputMode::Full => write_full(writer, view)?,
        OutputMode::Summary => {
            let entries = summarize(view.iter().copied());
            debug!(
                "{} distinct top frames over {} goroutines",
                entries.len(),
                total_count(&entries)
            );
            write_summary(writer, &entries)?;
        }
        OutputMode::Json => write_json_report(writer, view)?,
    }
    Ok(())
}

/// Open the dump for buffered reading
///
/// **Public** - also used by tests
///
/// Standard input is read fully up front so a broken pipe surfaces as an
/// input error rather than a parse error.
pub fn open_input(input: &InputSource) -> Result<Box<dyn BufRead>, InputError> {
    match input {
        InputSource::Stdin => {
            let mut buf = Vec::new();
            io::stdin()
                .lock()
                .read_to_end(&mut buf)
                .map_err(InputError::Stdin)?;
            Ok(Box::new(io::Cursor::new(buf)))
        }
        InputSource::File(path) => {
            let file = File::open(path).map_err(|source| InputError::Open {
                path: path.clone(),
                source,
            })?;
            Ok(Box::new(BufReader::new(file)))
        }
    }
}

/// Validate inspect arguments
///
/// **Public** - can be called before execute_inspect for early validation
///
/// # Returns
/// Ok if arguments are valid, the first `ArgumentError` found otherwise
pub fn validate_args(args: &InspectArgs) -> Result<(), ArgumentError> {
    if let InputSource::File(path) = &args.input {
        if path.as_os_str().is_empty() {
            return Err(ArgumentError::EmptyInputPath);
        }
    }

    Ok(())
}
