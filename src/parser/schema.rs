//! In-memory model of a parsed goroutine dump.
//!
//! A dump is an ordered list of [`Stack`]s, one per goroutine. Stacks are
//! built once by the parser and never mutated afterwards; filtering and
//! sorting work on `&Stack` views.

use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// One call-stack entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    /// Fully qualified function name (e.g. `net/http.(*conn).serve`)
    pub function: String,

    /// Raw argument text between the trailing parentheses, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,

    /// Source file path
    pub file: String,

    /// Source line number
    pub line: u32,

    /// Program counter offset within the function (`+0x1d`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

impl Frame {
    /// `file:line` as printed in the dump
    pub fn location(&self) -> String {
        format!("{}:{}", self.file, self.line)
    }

    /// True if the function name or the rendered location contains `needle`
    ///
    /// Equivalent to searching `location()` without building the string.
    pub fn matches(&self, needle: &str) -> bool {
        if self.function.contains(needle) || self.file.contains(needle) {
            return true;
        }

        let mut buf = [0u8; 10];
        let digits = line_digits(self.line, &mut buf);
        if digits.contains(needle) {
            return true;
        }

        // Matches spanning the `:` between file and line
        needle.match_indices(':').any(|(pos, _)| {
            self.file.ends_with(&needle[..pos]) && digits.starts_with(&needle[pos + 1..])
        })
    }
}

/// Decimal text of `line` written into `buf`
fn line_digits(line: u32, buf: &mut [u8; 10]) -> &str {
    use std::io::Write as _;

    let len = {
        let mut rest = &mut buf[..];
        // u32::MAX has ten digits
        let _ = write!(rest, "{}", line);
        10 - rest.len()
    };
    std::str::from_utf8(&buf[..len]).unwrap_or_default()
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.args {
            Some(args) => writeln!(f, "{}({})", self.function, args)?,
            None => writeln!(f, "{}", self.function)?,
        }
        write!(f, "\t{}:{}", self.file, self.line)?;
        if let Some(offset) = self.offset {
            write!(f, " +{:#x}", offset)?;
        }
        Ok(())
    }
}

/// The `created by` trailer of a stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedBy {
    pub function: String,

    /// Parent goroutine, printed by newer runtimes as `in goroutine N`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<u64>,

    pub file: String,
    pub line: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

impl fmt::Display for CreatedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "created by {}", self.function)?;
        if let Some(parent) = self.parent_id {
            write!(f, " in goroutine {}", parent)?;
        }
        write!(f, "\n\t{}:{}", self.file, self.line)?;
        if let Some(offset) = self.offset {
            write!(f, " +{:#x}", offset)?;
        }
        Ok(())
    }
}

/// Frames the runtime left out of the middle of a deep stack
///
/// Printed as `...N frames elided...` between the innermost and outermost
/// frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ElidedGap {
    /// Number of printed frames before the gap
    pub after: usize,

    /// Frames left out
    pub count: u64,
}

/// A goroutine captured in the dump
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stack {
    id: u64,
    state: String,

    #[serde(rename = "wait_seconds", serialize_with = "serialize_secs")]
    wait: Duration,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    annotations: Vec<String>,

    frames: Vec<Frame>,

    #[serde(skip_serializing_if = "Option::is_none")]
    created_by: Option<CreatedBy>,

    frames_elided: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    elided_gap: Option<ElidedGap>,

    header: String,
}

/// Header fields of a stack, as read from its `goroutine N [...]:` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackHeader {
    pub id: u64,
    pub state: String,
    pub wait: Duration,
    pub annotations: Vec<String>,
    pub raw: String,
}

impl Stack {
    /// Assemble a stack from its header and frames
    ///
    /// Returns `None` if `frames` is empty or the state is blank; the parser
    /// reports those cases as errors before reaching here.
    pub fn new(
        header: StackHeader,
        frames: Vec<Frame>,
        created_by: Option<CreatedBy>,
        frames_elided: bool,
    ) -> Option<Self> {
        if frames.is_empty() || header.state.trim().is_empty() {
            return None;
        }
        Some(Self {
            id: header.id,
            state: header.state,
            wait: header.wait,
            annotations: header.annotations,
            frames,
            created_by,
            frames_elided,
            elided_gap: None,
            header: header.raw,
        })
    }

    /// Record frames elided from the middle of the stack
    pub fn with_elided_gap(mut self, gap: ElidedGap) -> Self {
        self.elided_gap = Some(gap);
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    /// Time spent in the current state; zero when the header has no annotation
    pub fn wait(&self) -> Duration {
        self.wait
    }

    /// Extra header annotations such as `locked to thread`
    pub fn annotations(&self) -> &[String] {
        &self.annotations
    }

    /// Frames in dump order, point of suspension first. Never empty.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn top_frame(&self) -> &Frame {
        &self.frames[0]
    }

    /// Number of frames
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn created_by(&self) -> Option<&CreatedBy> {
        self.created_by.as_ref()
    }

    /// True if the runtime printed `...additional frames elided...`
    pub fn frames_elided(&self) -> bool {
        self.frames_elided
    }

    /// Gap printed as `...N frames elided...`, if any
    pub fn elided_gap(&self) -> Option<ElidedGap> {
        self.elided_gap
    }

    /// The header line exactly as it appeared (after prefix stripping)
    pub fn header(&self) -> &str {
        &self.header
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header)?;
        for (index, frame) in self.frames.iter().enumerate() {
            if let Some(gap) = self.elided_gap.filter(|gap| gap.after == index) {
                writeln!(f, "{}", gap)?;
            }
            writeln!(f, "{}", frame)?;
        }
        if let Some(gap) = self.elided_gap.filter(|gap| gap.after >= self.frames.len()) {
            writeln!(f, "{}", gap)?;
        }
        if self.frames_elided {
            writeln!(f, "{}", crate::utils::config::ELIDED_FRAMES_MARKER)?;
        }
        if let Some(created_by) = &self.created_by {
            writeln!(f, "{}", created_by)?;
        }
        Ok(())
    }
}

impl fmt::Display for ElidedGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "...{} frames elided...", self.count)
    }
}

fn serialize_secs<S: Serializer>(wait: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(wait.as_secs_f64())
}
