//! Input list reading and the plain-text report.

use std::fs;
use std::io;
use std::path::Path;

use crate::lookup::{LookupError, LookupRecord};

const RULE_WIDTH: usize = 80;

/// Read the entries to look up: one per line, trimmed, blanks dropped.
pub fn read_entries(path: &Path) -> Result<Vec<String>, LookupError> {
    let data = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LookupError::InputNotFound(path.to_path_buf()),
        _ => LookupError::InputRead {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    Ok(parse_entries(&data))
}

pub fn parse_entries(data: &str) -> Vec<String> {
    data.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Render the full report text.
pub fn render(records: &[LookupRecord]) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);

    let mut out = String::new();
    out.push_str(&heavy);
    out.push('\n');
    out.push_str("IP/DNS LOOKUP RESULTS\n");
    out.push_str(&heavy);
    out.push_str("\n\n");

    for r in records {
        out.push_str(&format!("Input: {}\n", r.input));
        out.push_str(&format!("IP Address: {}\n", r.ip));
        out.push_str(&format!("Owner: {}\n", r.owner));
        out.push_str(&format!("Region: {}\n", r.region));
        out.push_str(&format!("API Used: {}\n", r.provider_used));
        out.push_str(&light);
        out.push_str("\n\n");
    }
    out
}

/// Write the report, replacing whatever is at `path`.
pub fn write_report(path: &Path, records: &[LookupRecord]) -> Result<(), LookupError> {
    fs::write(path, render(records)).map_err(|source| LookupError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })
}
