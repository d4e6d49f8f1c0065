//! Duplicate removal and failed-scrape detection.

use crate::models::PlayerRecord;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Index of the slug in a `/`-split profile link:
/// `https:` / `` / host / `player` / **slug** / id
const SLUG_SEGMENT: usize = 4;

#[derive(Debug, Default)]
pub struct DedupOutcome {
    pub records: Vec<PlayerRecord>,
    pub removed: usize,
}

/// Keep the first record per (given name, family name, age, height, club).
pub fn dedup_records(records: Vec<PlayerRecord>) -> DedupOutcome {
    let before = records.len();
    let mut seen = HashSet::new();
    let unique: Vec<PlayerRecord> = records
        .into_iter()
        .filter(|r| seen.insert(r.key()))
        .collect();

    let removed = before - unique.len();
    info!("Removed {} duplicates ({} -> {})", removed, before, unique.len());
    DedupOutcome { records: unique, removed }
}

/// Keep the first occurrence of every link line.
pub fn dedup_links<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    lines
        .iter()
        .map(|l| l.as_ref())
        .filter(|l| seen.insert(*l))
        .map(str::to_string)
        .collect()
}

pub fn dedup_links_file(input: &Path, output: &Path) -> Result<(usize, usize)> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read links {:?}", input))?;
    let lines: Vec<&str> = text.lines().collect();
    let unique = dedup_links(&lines);

    let mut out = unique.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    std::fs::write(output, out).with_context(|| format!("Failed to write links {:?}", output))?;

    info!("Deduplicated links: {} -> {} ({:?})", lines.len(), unique.len(), output);
    Ok((lines.len(), unique.len()))
}

/// Player slug of a profile link, e.g.
/// `https://www.sofascore.com/player/kevin-de-bruyne/70996` → `kevin-de-bruyne`.
///
/// Taken from the raw text: no percent-encoding, query strings stay attached.
/// The collector writes the slug into stats lines the same way.
pub fn slug_from_link(link: &str) -> Option<String> {
    link.split('/')
        .nth(SLUG_SEGMENT)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Links whose slug never shows up as the first token of a stats line, in link
/// order. Links without a slug are ignored.
pub fn find_missing_scrapes<S: AsRef<str>>(links: &[S], stats_text: &str) -> Vec<String> {
    let scraped: HashSet<&str> = stats_text
        .lines()
        .filter_map(|l| l.split_whitespace().next())
        .collect();

    let missing: Vec<String> = links
        .iter()
        .map(|l| l.as_ref())
        .filter(|link| {
            slug_from_link(link).is_some_and(|slug| !scraped.contains(slug.as_str()))
        })
        .map(str::to_string)
        .collect();

    info!("Found {} missing scrapes out of {} links", missing.len(), links.len());
    missing
}
