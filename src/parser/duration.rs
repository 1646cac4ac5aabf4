//! Duration parsing for dump headers and command-line flags.
//!
//! Two syntaxes are handled:
//! - Header annotations written by the runtime: `5 minutes`, `1 second`
//! - Flag values such as `10m`, `30s`, `1h30m`, read with `humantime`
//!
//! Both normalize to [`std::time::Duration`].

use crate::utils::error::ArgumentError;
use std::time::Duration;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;
const NANOS_PER_MIN: u128 = 60 * NANOS_PER_SEC;
const NANOS_PER_HOUR: u128 = 60 * NANOS_PER_MIN;

/// Why a header duration could not be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderDurationError {
    /// The count is not an unsigned integer
    InvalidCount,
    /// The unit word is not one the runtime prints
    UnknownUnit(String),
}

/// Nanoseconds per unit word, singular or plural
fn unit_word_nanos(word: &str) -> Option<u128> {
    let singular = word.strip_suffix('s').unwrap_or(word);
    match singular {
        "nanosecond" => Some(1),
        "microsecond" => Some(NANOS_PER_MICRO),
        "millisecond" => Some(NANOS_PER_MILLI),
        "second" => Some(NANOS_PER_SEC),
        "minute" => Some(NANOS_PER_MIN),
        "hour" => Some(NANOS_PER_HOUR),
        _ => None,
    }
}

/// Parse a header wait annotation such as `5 minutes`
pub fn parse_header_duration(text: &str) -> Result<Duration, HeaderDurationError> {
    let mut parts = text.split_whitespace();
    let count = parts.next().unwrap_or_default();
    let unit = parts.collect::<Vec<_>>().join(" ");

    let count: u64 = count
        .parse()
        .map_err(|_| HeaderDurationError::InvalidCount)?;
    let per_unit =
        unit_word_nanos(&unit).ok_or_else(|| HeaderDurationError::UnknownUnit(unit.clone()))?;

    Ok(nanos_to_duration(count as u128 * per_unit))
}

/// Parse a flag duration like `10m`, `1h30m` or `250ms`
///
/// Any syntax `humantime` understands is accepted, including `0` and long
/// unit names (`10 minutes`).
pub fn parse_flag_duration(value: &str) -> Result<Duration, ArgumentError> {
    humantime::parse_duration(value.trim()).map_err(|e| ArgumentError::InvalidDuration {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn nanos_to_duration(nanos: u128) -> Duration {
    let secs = u64::try_from(nanos / NANOS_PER_SEC).unwrap_or(u64::MAX);
    let subsec = (nanos % NANOS_PER_SEC) as u32;
    Duration::new(secs, subsec)
}
