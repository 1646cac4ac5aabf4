//! Parser for Go goroutine stack dumps.
//!
//! Turns the text printed by the Go runtime (panics, `SIGQUIT`,
//! `debug.Stack`, `/debug/pprof/goroutine?debug=2`) into [`Stack`]s:
//!
//! ```text
//! goroutine 7 [chan receive, 5 minutes]:
//! main.worker(0xc000010000)
//!         /app/main.go:42 +0x1d
//! created by main.main in goroutine 1
//!         /app/main.go:17 +0x5a
//! ```
//!
//! The scan is a single forward pass over the lines. Any malformed input
//! aborts the whole parse with a [`ParseError`].

use super::duration::{parse_header_duration, HeaderDurationError};
use super::schema::{CreatedBy, ElidedGap, Frame, Stack, StackHeader};
use crate::utils::config::{
    CREATED_BY_PREFIX, CREATED_IN_GOROUTINE, ELIDED_FRAMES_MARKER, ELIDED_GAP_PREFIX,
    ELIDED_GAP_SUFFIX, HEADER_PREFIX,
};
use crate::utils::error::{ArgumentError, ParseError};
use log::{debug, warn};
use regex::Regex;
use std::io::BufRead;
use std::mem;
use std::time::Duration;

/// Printed instead of frames for goroutines running on another thread
const UNAVAILABLE_STACK_MARKER: &str = "goroutine running on other thread";

/// A pattern stripped from the start of every line before parsing
///
/// Used for dumps captured through a logger, e.g. journald lines such as
/// `Jan 02 15:04:05 host app[812]: goroutine 1 [running]:`.
#[derive(Debug, Clone)]
pub struct LinePrefix {
    pattern: Regex,
}

impl LinePrefix {
    /// Compile `pattern`, anchored at the start of the line
    ///
    /// # Errors
    /// * `ArgumentError::InvalidLinePrefix` - the pattern is not a valid regex
    pub fn new(pattern: &str) -> Result<Self, ArgumentError> {
        Regex::new(&format!("^(?:{})", pattern))
            .map(|pattern| Self { pattern })
            .map_err(|source| ArgumentError::InvalidLinePrefix {
                pattern: pattern.to_string(),
                source,
            })
    }

    /// Remove the prefix from `line` if it matches
    pub fn strip<'a>(&self, line: &'a str) -> &'a str {
        match self.pattern.find(line) {
            Some(m) => &line[m.end()..],
            None => line,
        }
    }
}

/// Parse a whole dump from a reader
///
/// **Public** - main entry point for parsing
///
/// # Arguments
/// * `reader` - Dump text, consumed to end-of-input
/// * `line_prefix` - Optional prefix stripped from every line
///
/// # Returns
/// Stacks in the order they appear in the dump. Empty input yields an empty
/// vector.
///
/// Lines are decoded as lossy UTF-8: invalid bytes become `U+FFFD` instead of
/// failing the read, so binary noise around the dump is skipped like any
/// other text outside a goroutine.
///
/// # Errors
/// * `ParseError::ReadFailed` - the reader failed
/// * Any syntax variant of `ParseError` - the dump is malformed
pub fn parse_stacks<R: BufRead>(
    reader: R,
    line_prefix: Option<&LinePrefix>,
) -> Result<Vec<Stack>, ParseError> {
    let mut parser = DumpParser::new(line_prefix);

    for (index, bytes) in reader.split(b'\n').enumerate() {
        let bytes = bytes?;
        parser.feed(index + 1, &String::from_utf8_lossy(&bytes))?;
    }

    let stacks = parser.finish()?;
    debug!("Parsed {} goroutine stacks", stacks.len());
    Ok(stacks)
}

/// Parse a dump held in memory
pub fn parse_str(text: &str, line_prefix: Option<&LinePrefix>) -> Result<Vec<Stack>, ParseError> {
    parse_stacks(text.as_bytes(), line_prefix)
}

/// Line awaiting its `file:line` companion
#[derive(Debug)]
enum PendingLine {
    Frame {
        function: String,
        args: Option<String>,
    },
    Creator {
        function: String,
        parent_id: Option<u64>,
    },
}

/// Stack under construction
#[derive(Debug)]
struct StackBuilder {
    header: StackHeader,
    frames: Vec<Frame>,
    created_by: Option<CreatedBy>,
    frames_elided: bool,
    elided_gap: Option<ElidedGap>,
}

impl StackBuilder {
    fn new(header: StackHeader) -> Self {
        Self {
            header,
            frames: Vec::new(),
            created_by: None,
            frames_elided: false,
            elided_gap: None,
        }
    }

    fn id(&self) -> u64 {
        self.header.id
    }

    fn build(self, line: usize) -> Result<Stack, ParseError> {
        let id = self.id();
        let gap = self.elided_gap;
        let stack = Stack::new(self.header, self.frames, self.created_by, self.frames_elided)
            .ok_or(ParseError::MissingFrames { line, id })?;
        Ok(match gap {
            Some(gap) => stack.with_elided_gap(gap),
            None => stack,
        })
    }
}

#[derive(Debug)]
enum ParseState {
    AwaitHeader,
    ExpectFunctionLine(StackBuilder),
    ExpectLocationLine(StackBuilder, PendingLine),
    AwaitNextOrEof(StackBuilder),
}

struct DumpParser<'p> {
    line_prefix: Option<&'p LinePrefix>,
    state: ParseState,
    stacks: Vec<Stack>,
    last_line: usize,
}

impl<'p> DumpParser<'p> {
    fn new(line_prefix: Option<&'p LinePrefix>) -> Self {
        Self {
            line_prefix,
            state: ParseState::AwaitHeader,
            stacks: Vec::new(),
            last_line: 0,
        }
    }

    fn feed(&mut self, line_no: usize, raw: &str) -> Result<(), ParseError> {
        self.last_line = line_no;

        let stripped = match self.line_prefix {
            Some(prefix) => prefix.strip(raw),
            None => raw,
        };
        let line = stripped.trim();

        let state = mem::replace(&mut self.state, ParseState::AwaitHeader);
        self.state = match state {
            ParseState::AwaitHeader => {
                if is_header(line) {
                    ParseState::ExpectFunctionLine(StackBuilder::new(parse_header(line_no, line)?))
                } else {
                    if !line.is_empty() {
                        debug!("line {}: skipping text outside a goroutine", line_no);
                    }
                    ParseState::AwaitHeader
                }
            }

            ParseState::ExpectFunctionLine(builder) => {
                if line.starts_with(UNAVAILABLE_STACK_MARKER) {
                    warn!(
                        "goroutine {} has no stack in the dump, skipping it",
                        builder.id()
                    );
                    ParseState::AwaitHeader
                } else if line.is_empty()
                    || is_header(line)
                    || line.starts_with(CREATED_BY_PREFIX)
                    || line == ELIDED_FRAMES_MARKER
                    || elided_gap_count(line).is_some()
                {
                    return Err(ParseError::MissingFrames {
                        line: line_no,
                        id: builder.id(),
                    });
                } else {
                    let (function, args) = split_call(line);
                    ParseState::ExpectLocationLine(builder, PendingLine::Frame { function, args })
                }
            }

            ParseState::ExpectLocationLine(mut builder, pending) => {
                if line.is_empty() || is_header(line) {
                    return Err(ParseError::TruncatedFrame {
                        line: line_no,
                        id: builder.id(),
                    });
                }
                let (file, number, offset) = parse_location(line_no, line)?;
                match pending {
                    PendingLine::Frame { function, args } => builder.frames.push(Frame {
                        function,
                        args,
                        file,
                        line: number,
                        offset,
                    }),
                    PendingLine::Creator {
                        function,
                        parent_id,
                    } => {
                        builder.created_by = Some(CreatedBy {
                            function,
                            parent_id,
                            file,
                            line: number,
                            offset,
                        })
                    }
                }
                ParseState::AwaitNextOrEof(builder)
            }

            ParseState::AwaitNextOrEof(mut builder) => {
                if line.is_empty() {
                    self.stacks.push(builder.build(line_no)?);
                    ParseState::AwaitHeader
                } else if is_header(line) {
                    self.stacks.push(builder.build(line_no)?);
                    ParseState::ExpectFunctionLine(StackBuilder::new(parse_header(line_no, line)?))
                } else if builder.created_by.is_some() {
                    return Err(ParseError::FrameAfterCreatedBy {
                        line: line_no,
                        id: builder.id(),
                    });
                } else if let Some(rest) = line.strip_prefix(CREATED_BY_PREFIX) {
                    let (function, parent_id) = parse_creator(rest);
                    ParseState::ExpectLocationLine(
                        builder,
                        PendingLine::Creator {
                            function,
                            parent_id,
                        },
                    )
                } else if line == ELIDED_FRAMES_MARKER {
                    builder.frames_elided = true;
                    ParseState::AwaitNextOrEof(builder)
                } else if let Some(count) = elided_gap_count(line) {
                    builder.elided_gap = Some(ElidedGap {
                        after: builder.frames.len(),
                        count,
                    });
                    ParseState::AwaitNextOrEof(builder)
                } else {
                    let (function, args) = split_call(line);
                    ParseState::ExpectLocationLine(builder, PendingLine::Frame { function, args })
                }
            }
        };

        Ok(())
    }

    fn finish(mut self) -> Result<Vec<Stack>, ParseError> {
        let line = self.last_line;
        match mem::replace(&mut self.state, ParseState::AwaitHeader) {
            ParseState::AwaitHeader => {}
            ParseState::ExpectFunctionLine(builder) => {
                return Err(ParseError::MissingFrames {
                    line,
                    id: builder.id(),
                })
            }
            ParseState::ExpectLocationLine(builder, _) => {
                return Err(ParseError::TruncatedFrame {
                    line,
                    id: builder.id(),
                })
            }
            ParseState::AwaitNextOrEof(builder) => self.stacks.push(builder.build(line)?),
        }
        Ok(self.stacks)
    }
}

fn is_header(line: &str) -> bool {
    line.starts_with(HEADER_PREFIX)
}

/// Count from a `...N frames elided...` line
fn elided_gap_count(line: &str) -> Option<u64> {
    line.strip_prefix(ELIDED_GAP_PREFIX)?
        .strip_suffix(ELIDED_GAP_SUFFIX)?
        .parse()
        .ok()
}

/// Parse `goroutine <id> [<state>(, <N> <unit>)?(, <annotation>)*]:`
///
/// Tokens between the id and `[` (e.g. `gp=0xc000002380 m=0`) are ignored.
pub fn parse_header(line_no: usize, line: &str) -> Result<StackHeader, ParseError> {
    let rest = line.strip_prefix(HEADER_PREFIX).unwrap_or(line).trim_start();

    let id_text = rest
        .split(|c: char| c.is_whitespace() || c == '[')
        .next()
        .unwrap_or_default();
    let id: u64 = id_text.parse().map_err(|_| ParseError::InvalidGoroutineId {
        line: line_no,
        id: id_text.to_string(),
    })?;

    let open = rest
        .find('[')
        .ok_or(ParseError::MissingState { line: line_no })?;
    let body = rest[open + 1..]
        .trim_end()
        .strip_suffix("]:")
        .ok_or(ParseError::UnterminatedHeader { line: line_no })?;

    let mut elements = body.split(',').map(str::trim);
    let state = elements.next().unwrap_or_default();
    if state.is_empty() {
        return Err(ParseError::EmptyState { line: line_no });
    }

    let mut wait = Duration::ZERO;
    let mut annotations = Vec::new();
    for element in elements {
        if element.starts_with(|c: char| c.is_ascii_digit()) {
            wait = parse_header_duration(element).map_err(|e| match e {
                HeaderDurationError::UnknownUnit(unit) => ParseError::UnknownDurationUnit {
                    line: line_no,
                    unit,
                },
                HeaderDurationError::InvalidCount => ParseError::InvalidDuration {
                    line: line_no,
                    text: element.to_string(),
                },
            })?;
        } else if !element.is_empty() {
            annotations.push(element.to_string());
        }
    }

    Ok(StackHeader {
        id,
        state: state.to_string(),
        wait,
        annotations,
        raw: line.to_string(),
    })
}

/// Split `pkg.(*T).method(0x1, {0x2, 0x3})` into function name and raw args
///
/// The args are the trailing balanced parenthesized group; the function name
/// may itself contain parentheses.
fn split_call(line: &str) -> (String, Option<String>) {
    if !line.ends_with(')') {
        return (line.to_string(), None);
    }

    let mut depth = 0usize;
    for (idx, ch) in line.char_indices().rev() {
        match ch {
            ')' => depth += 1,
            '(' => {
                depth -= 1;
                if depth == 0 {
                    if idx == 0 {
                        break;
                    }
                    return (
                        line[..idx].to_string(),
                        Some(line[idx + 1..line.len() - 1].to_string()),
                    );
                }
            }
            _ => {}
        }
    }

    (line.to_string(), None)
}

/// Parse `/path/to/file.go:123 +0x1d` (anything after the offset is ignored)
fn parse_location(line_no: usize, line: &str) -> Result<(String, u32, Option<u64>), ParseError> {
    let invalid = || ParseError::InvalidLocation {
        line: line_no,
        text: line.to_string(),
    };

    let (location, tail) = match line.find(" +") {
        Some(pos) => (&line[..pos], Some(&line[pos + 2..])),
        None => (line.split_whitespace().next().unwrap_or_default(), None),
    };

    let offset = match tail {
        Some(tail) => {
            let token = tail.split_whitespace().next().unwrap_or_default();
            let hex = token.strip_prefix("0x").ok_or_else(invalid)?;
            Some(u64::from_str_radix(hex, 16).map_err(|_| invalid())?)
        }
        None => None,
    };

    let (file, number) = location.rsplit_once(':').ok_or_else(invalid)?;
    if file.is_empty() {
        return Err(invalid());
    }
    let number: u32 = number.parse().map_err(|_| invalid())?;

    Ok((file.to_string(), number, offset))
}

/// Split `main.main in goroutine 1` into creator function and parent id
fn parse_creator(rest: &str) -> (String, Option<u64>) {
    if let Some((function, parent)) = rest.rsplit_once(CREATED_IN_GOROUTINE) {
        if let Ok(parent_id) = parent.trim().parse() {
            return (function.to_string(), Some(parent_id));
        }
    }
    (rest.to_string(), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header_with_wait() {
        let header = parse_header(1, "goroutine 12 [chan receive, 5 minutes]:").unwrap();
        assert_eq!(header.id, 12);
        assert_eq!(header.state, "chan receive");
        assert_eq!(header.wait, Duration::from_secs(300));
        assert!(header.annotations.is_empty());
    }

    #[test]
    fn test_parse_header_annotations() {
        let header =
            parse_header(1, "goroutine 1 [syscall, 9 minutes, locked to thread]:").unwrap();
        assert_eq!(header.state, "syscall");
        assert_eq!(header.wait, Duration::from_secs(540));
        assert_eq!(header.annotations, vec!["locked to thread".to_string()]);
    }

    #[test]
    fn test_parse_header_runtime_tokens() {
        let header = parse_header(1, "goroutine 3 gp=0xc000002380 m=0 mp=0x5a1c20 [running]:")
            .unwrap();
        assert_eq!(header.id, 3);
        assert_eq!(header.state, "running");
    }

    #[test]
    fn test_parse_header_errors() {
        assert!(matches!(
            parse_header(4, "goroutine abc [running]:"),
            Err(ParseError::InvalidGoroutineId { line: 4, .. })
        ));
        assert!(matches!(
            parse_header(1, "goroutine 1 running:"),
            Err(ParseError::MissingState { .. })
        ));
        assert!(matches!(
            parse_header(1, "goroutine 1 [running:"),
            Err(ParseError::UnterminatedHeader { .. })
        ));
        assert!(matches!(
            parse_header(1, "goroutine 1 []:"),
            Err(ParseError::EmptyState { .. })
        ));
        assert!(matches!(
            parse_header(1, "goroutine 1 [select, 3 weeks]:"),
            Err(ParseError::UnknownDurationUnit { .. })
        ));
    }

    #[test]
    fn test_split_call() {
        assert_eq!(
            split_call("main.main()"),
            ("main.main".to_string(), Some(String::new()))
        );
        assert_eq!(
            split_call("net/http.(*conn).serve(0xc0001b2000, {0x7f8f28, 0xc0000a0000})"),
            (
                "net/http.(*conn).serve".to_string(),
                Some("0xc0001b2000, {0x7f8f28, 0xc0000a0000}".to_string())
            )
        );
        assert_eq!(
            split_call("main.(*Server).Run(...)"),
            ("main.(*Server).Run".to_string(), Some("...".to_string()))
        );
        assert_eq!(split_call("runtime.goexit"), ("runtime.goexit".to_string(), None));
    }

    #[test]
    fn test_parse_location() {
        assert_eq!(
            parse_location(1, "/usr/local/go/src/runtime/proc.go:363 +0xd6").unwrap(),
            ("/usr/local/go/src/runtime/proc.go".to_string(), 363, Some(0xd6))
        );
        assert_eq!(
            parse_location(1, "/app/main.go:9").unwrap(),
            ("/app/main.go".to_string(), 9, None)
        );
        assert_eq!(
            parse_location(1, "/app/main.go:9 +0x1d fp=0xc000 sp=0xc000 pc=0x4a").unwrap(),
            ("/app/main.go".to_string(), 9, Some(0x1d))
        );
        assert!(parse_location(1, "main.main()").is_err());
        assert!(parse_location(1, "/app/main.go:nine").is_err());
    }

    #[test]
    fn test_elided_gap_count() {
        assert_eq!(elided_gap_count("...7 frames elided..."), Some(7));
        assert_eq!(elided_gap_count("...100 frames elided..."), Some(100));
        assert_eq!(elided_gap_count(ELIDED_FRAMES_MARKER), None);
        assert_eq!(elided_gap_count("...x frames elided..."), None);
    }

    #[test]
    fn test_parse_creator() {
        assert_eq!(
            parse_creator("main.main in goroutine 1"),
            ("main.main".to_string(), Some(1))
        );
        assert_eq!(parse_creator("main.main"), ("main.main".to_string(), None));
    }

    #[test]
    fn test_line_prefix_strip() {
        let prefix = LinePrefix::new(r"\w+ \d+ [\d:]+ \S+ app\[\d+\]: ").unwrap();
        assert_eq!(
            prefix.strip("Jan 02 15:04:05 host app[812]: goroutine 1 [running]:"),
            "goroutine 1 [running]:"
        );
        assert_eq!(prefix.strip("goroutine 1 [running]:"), "goroutine 1 [running]:");
    }

    #[test]
    fn test_line_prefix_invalid() {
        assert!(matches!(
            LinePrefix::new("app[("),
            Err(ArgumentError::InvalidLinePrefix { .. })
        ));
    }
}
