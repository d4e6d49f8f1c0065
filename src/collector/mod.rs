//! Contract with the browser layer that visits profile pages.
//!
//! The driver itself lives outside this crate. It implements `ProfileSource`,
//! hands back one `RawPlayerFields` per page, and this module turns those into
//! raw stats lines, the input of the formatting stage.

use crate::models::RawPlayerFields;
use crate::processing::dedup::slug_from_link;
use anyhow::{Context, Result};
use std::io::Write;
use thiserror::Error;
use tracing::{debug, info};

const UNKNOWN_CLUB: &str = "Unknown";

// ── Source trait ──────────────────────────────────────────────────────────────

/// Swappable profile page source.
pub trait ProfileSource {
    /// `Ok(None)` when the page has no usable data (inactive player, no graph).
    fn scrape_profile(&mut self, url: &str) -> Result<Option<RawPlayerFields>>;
}

// ── Rendering ─────────────────────────────────────────────────────────────────

/// A field without which the profile cannot yield a parseable stats line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MissingField {
    #[error("no nationality")]
    Nationality,
    #[error("no league")]
    League,
    #[error("no positions")]
    Positions,
    #[error("no performance graph")]
    PerformanceGraph,
}

/// Render collected fields as one raw stats line:
/// slug, league, nationality, club, positions, age, height, five stats,
/// market value, strengths, weaknesses, preferred foot.
pub fn render_stats_line(fields: &RawPlayerFields) -> Result<String, MissingField> {
    let nationality = present(&fields.nationality).ok_or(MissingField::Nationality)?;
    let league = present(&fields.league).ok_or(MissingField::League)?;
    if fields.positions.is_empty() {
        return Err(MissingField::Positions);
    }
    if present(&fields.stats[0]).is_none() {
        return Err(MissingField::PerformanceGraph);
    }

    let mut parts: Vec<&str> = vec![
        fields.slug.as_str(),
        league,
        nationality,
        present(&fields.club).unwrap_or(UNKNOWN_CLUB),
    ];
    parts.extend(fields.positions.iter().map(String::as_str));
    parts.push(or_blank(&fields.age));
    parts.push(or_blank(&fields.height));
    parts.extend(fields.stats.iter().map(or_blank));
    parts.push(or_blank(&fields.market_value));
    parts.push(or_blank(&fields.strengths));
    parts.push(or_blank(&fields.weaknesses));
    parts.push(or_blank(&fields.preferred_foot));

    Ok(parts.join(" "))
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.trim().is_empty())
}

fn or_blank(field: &Option<String>) -> &str {
    field.as_deref().unwrap_or("")
}

/// Keep only digits, `.`, the `M`/`K` multipliers and `€`, in page order:
/// "12.5M €" → "12.5M€".
pub fn extract_market_value(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, 'M' | 'K' | '.' | '€'))
        .collect()
}

// ── Driver loop ───────────────────────────────────────────────────────────────

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ScrapeStats {
    pub scraped: usize,
    pub skipped: usize,
}

/// Visit `links[start_index..]`, appending one stats line per usable profile
/// to `sink`. Source errors abort the run; the index logged with each profile
/// is what to resume from.
pub fn scrape_all<S, W>(source: &mut S, links: &[String], start_index: usize, sink: &mut W) -> Result<ScrapeStats>
where
    S: ProfileSource,
    W: Write,
{
    let total = links.len();
    let mut stats = ScrapeStats::default();
    info!("Scraping stats for {} players (starting at index {})", total, start_index);

    for (i, url) in links.iter().enumerate().skip(start_index) {
        let label = slug_from_link(url).unwrap_or_else(|| url.clone());

        let fields = source
            .scrape_profile(url)
            .with_context(|| format!("scrape_profile({}) at index {}", url, i))?;

        match fields.as_ref().map(render_stats_line) {
            Some(Ok(line)) => {
                writeln!(sink, "{}", line).context("Failed to write stats line")?;
                stats.scraped += 1;
                info!("[{}/{}] Scraped: {}", i + 1, total, label);
            }
            Some(Err(missing)) => {
                debug!("Skipping {} - {}", label, missing);
                stats.skipped += 1;
                info!("[{}/{}] Skipped: {}", i + 1, total, label);
            }
            None => {
                stats.skipped += 1;
                info!("[{}/{}] Skipped: {}", i + 1, total, label);
            }
        }
    }

    Ok(stats)
}

/// Slugs to re-scrape by name search: the explicit names if any were given,
/// otherwise the slugs of the links that produced no stats line.
pub fn rescrape_targets(names: &[String], missing_links: &[String]) -> Vec<String> {
    if !names.is_empty() {
        return names.to_vec();
    }
    missing_links.iter().filter_map(|l| slug_from_link(l)).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::processing::{normalizer::normalize_line, parser::RecordParser};
    use std::collections::HashMap;

    fn fields() -> RawPlayerFields {
        RawPlayerFields {
            slug: "kevin-de-bruyne".into(),
            league: Some("Premier League".into()),
            nationality: Some("BEL".into()),
            club: Some("Manchester City".into()),
            positions: vec!["MC".into(), "AM".into()],
            age: Some("32 yrs".into()),
            height: Some("181 cm".into()),
            stats: ["95", "92", "93", "88", "91"].map(|s| Some(s.to_string())),
            market_value: Some(extract_market_value("85M €")),
            strengths: Some("Passing|Key passes".into()),
            weaknesses: Some("AerialDuels".into()),
            preferred_foot: Some("Right".into()),
        }
    }

    #[test]
    fn test_render_stats_line() {
        assert_eq!(
            render_stats_line(&fields()).unwrap(),
            "kevin-de-bruyne Premier League BEL Manchester City MC AM 32 yrs 181 cm 95 92 93 88 91 85M€ Passing|Key passes AerialDuels Right"
        );
    }

    #[test]
    fn test_rendered_line_survives_format_and_parse() {
        let line = normalize_line(&render_stats_line(&fields()).unwrap());
        let rec = RecordParser::default().parse_line(&line).unwrap();
        assert_eq!(rec.role(), Role::Outfield);
        assert_eq!(rec.age, "32");
        assert_eq!(rec.height, "181");
        assert_eq!(rec.market_value, "85M€");
        assert_eq!(rec.strengths, vec!["Passing", "Key passes Aerial", "Duels"]);
    }

    #[test]
    fn test_missing_mandatory_fields() {
        let mut f = fields();
        f.nationality = None;
        assert_eq!(render_stats_line(&f), Err(MissingField::Nationality));

        let mut f = fields();
        f.league = Some("  ".into());
        assert_eq!(render_stats_line(&f), Err(MissingField::League));

        let mut f = fields();
        f.positions.clear();
        assert_eq!(render_stats_line(&f), Err(MissingField::Positions));

        let mut f = fields();
        f.stats[0] = None;
        assert_eq!(render_stats_line(&f), Err(MissingField::PerformanceGraph));
    }

    #[test]
    fn test_missing_club_becomes_unknown() {
        let mut f = fields();
        f.club = None;
        f.stats[3] = None;
        let line = render_stats_line(&f).unwrap();
        assert!(line.contains("BEL Unknown MC AM"));
        assert!(line.contains("93  91"));
    }

    #[test]
    fn test_extract_market_value() {
        assert_eq!(extract_market_value("Value: 12.5M €"), "12.5M€");
        assert_eq!(extract_market_value("750K €"), "750K€");
        assert_eq!(extract_market_value("-"), "");
    }

    struct FakeSource {
        pages: HashMap<String, Option<RawPlayerFields>>,
        visited: Vec<String>,
    }

    impl ProfileSource for FakeSource {
        fn scrape_profile(&mut self, url: &str) -> Result<Option<RawPlayerFields>> {
            self.visited.push(url.to_string());
            match self.pages.get(url) {
                Some(page) => Ok(page.clone()),
                None => anyhow::bail!("page did not load"),
            }
        }
    }

    fn links() -> Vec<String> {
        ["a", "b", "c"]
            .iter()
            .map(|s| format!("https://www.sofascore.com/player/{}/1", s))
            .collect()
    }

    #[test]
    fn test_scrape_all_resumes_and_skips() {
        let links = links();
        let mut incomplete = fields();
        incomplete.slug = "b".into();
        incomplete.positions.clear();
        let mut complete = fields();
        complete.slug = "c".into();

        let mut source = FakeSource {
            pages: HashMap::from([
                (links[1].clone(), Some(incomplete)),
                (links[2].clone(), Some(complete)),
            ]),
            visited: Vec::new(),
        };

        let mut sink = Vec::new();
        let stats = scrape_all(&mut source, &links, 1, &mut sink).unwrap();
        assert_eq!(stats, ScrapeStats { scraped: 1, skipped: 1 });
        assert_eq!(source.visited, links[1..].to_vec());

        let out = String::from_utf8(sink).unwrap();
        assert_eq!(out.lines().count(), 1);
        assert!(out.starts_with("c Premier League BEL"));
    }

    #[test]
    fn test_scrape_all_propagates_source_errors() {
        let links = links();
        let mut source = FakeSource { pages: HashMap::new(), visited: Vec::new() };
        let mut sink = Vec::new();
        assert!(scrape_all(&mut source, &links, 0, &mut sink).is_err());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_rescrape_targets() {
        let missing = links();
        assert_eq!(rescrape_targets(&[], &missing), vec!["a", "b", "c"]);
        let names = vec!["david-raya".to_string()];
        assert_eq!(rescrape_targets(&names, &missing), names);
    }
}
