//! Stage file readers: collected profile links and raw stats lines.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One link per line; blank lines and surrounding whitespace are dropped.
pub fn load_links(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read links {:?}", path))?;
    let links: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();

    debug!("{:?}: {} links", path, links.len());
    Ok(links)
}

/// Concatenate several raw stats files (main scrape plus re-scrapes) into one
/// blob, one player per line. Missing files are an error.
pub fn load_stats_text(paths: &[PathBuf]) -> Result<String> {
    let mut text = String::new();
    for path in paths {
        let part = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read stats {:?}", path))?;
        text.push_str(&part);
        if !part.is_empty() && !part.ends_with('\n') {
            text.push('\n');
        }
    }

    info!("Loaded {} stats lines from {} file(s)", text.lines().count(), paths.len());
    Ok(text)
}
