//! Raw stats text → canonical tokenizable lines.
//!
//! The collector writes one player per line with field fragments joined by
//! spaces. DOM text extraction glues some labels together ("GroundDuels") and
//! leaves unit suffixes on age/height; this pass undoes both.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Unit suffixes removed as plain substrings, in this order.
const UNIT_SUFFIXES: [&str; 2] = ["yrs", "cm"];

/// Inserted wherever a lower-case letter runs into an upper-case one.
pub const BOUNDARY: char = '|';

/// Normalize a whole blob, line by line. Line count is preserved.
pub fn normalize(raw: &str) -> String {
    raw.lines().map(normalize_line).collect::<Vec<_>>().join("\n")
}

/// Strip units, collapse whitespace, mark case boundaries.
///
/// Units go first and leave no gap behind, so "25yrs188cm" becomes the single
/// token "25188".
pub fn normalize_line(line: &str) -> String {
    let stripped = UNIT_SUFFIXES
        .iter()
        .fold(line.to_string(), |acc, unit| acc.replace(unit, ""));
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    mark_case_boundaries(&collapsed)
}

fn mark_case_boundaries(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    let mut prev: Option<char> = None;
    for c in s.chars() {
        if prev.is_some_and(|p| p.is_ascii_lowercase()) && c.is_ascii_uppercase() {
            out.push(BOUNDARY);
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

/// Read raw stats, normalize, write the result. Returns the line count.
pub fn format_stats_file(input: &Path, output: &Path) -> Result<usize> {
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read raw stats {:?}", input))?;

    let formatted = normalize(&raw);
    let lines = raw.lines().count();

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Could not create dir {:?}", parent))?;
    }
    std::fs::write(output, formatted)
        .with_context(|| format!("Failed to write formatted stats {:?}", output))?;

    info!("Formatted {} lines: {:?} -> {:?}", lines, input, output);
    Ok(lines)
}
