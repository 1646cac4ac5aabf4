//! JSON report writer.
//!
//! Serializes a stack view into a versioned JSON document for tooling that
//! wants the parsed model rather than dump text.

use crate::parser::Stack;
use crate::utils::config::SCHEMA_VERSION;
use chrono::Utc;
use log::debug;
use serde::Serialize;
use std::io::Write;

/// Top-level JSON document
#[derive(Debug, Clone, Serialize)]
pub struct DumpReport<'a> {
    /// Schema version for compatibility checking
    pub version: String,

    /// Timestamp when the report was generated (RFC 3339, UTC)
    pub generated_at: String,

    /// Number of stacks in the report
    pub total_stacks: usize,

    /// Stacks after filtering and sorting
    pub stacks: Vec<&'a Stack>,
}

impl<'a> DumpReport<'a> {
    pub fn new(stacks: &[&'a Stack]) -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            generated_at: Utc::now().to_rfc3339(),
            total_stacks: stacks.len(),
            stacks: stacks.to_vec(),
        }
    }
}

/// Write the report as pretty-printed JSON
///
/// # Errors
/// * `serde_json::Error` - serialization or the underlying write failed
pub fn write_json_report<W: Write>(
    writer: &mut W,
    stacks: &[&Stack],
) -> Result<(), serde_json::Error> {
    let report = DumpReport::new(stacks);
    debug!("Writing JSON report with {} stacks", report.total_stacks);

    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer).map_err(serde_json::Error::io)?;
    writer.flush().map_err(serde_json::Error::io)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    #[test]
    fn test_json_report_fields() {
        let dump = "\
goroutine 9 [semacquire, 3 minutes, locked to thread]:
sync.runtime_Semacquire(0xc0000b4008)
\t/go/src/runtime/sema.go:62 +0x27
created by main.main
\t/app/main.go:14 +0x3c
";
        let stacks = parse_str(dump, None).unwrap();
        let view: Vec<&Stack> = stacks.iter().collect();

        let mut out = Vec::new();
        write_json_report(&mut out, &view).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(json["version"], SCHEMA_VERSION);
        assert_eq!(json["total_stacks"], 1);

        let stack = &json["stacks"][0];
        assert_eq!(stack["id"], 9);
        assert_eq!(stack["state"], "semacquire");
        assert_eq!(stack["wait_seconds"], 180.0);
        assert_eq!(stack["annotations"][0], "locked to thread");
        assert_eq!(stack["frames"][0]["function"], "sync.runtime_Semacquire");
        assert_eq!(stack["frames"][0]["line"], 62);
        assert_eq!(stack["created_by"]["function"], "main.main");
        assert!(stack["created_by"].get("parent_id").is_none());
    }
}
