//! Normalized stats lines → `PlayerRecord`s.
//!
//! A line carries no field separators, only token shapes. The scan walks the
//! tokens through four stages:
//!
//! ```text
//! SeekNationality ──► SeekPosition ──► CollectStats ──► Done
//!        │                  │                │
//!   NoNationality       NoPosition    InsufficientStats
//! ```
//!
//! Every exit other than `Done` drops the line with a `SkipReason`; a dropped
//! line never aborts the rest of the parse.

use crate::models::{
    PlayerRecord, Role, RoleStats, GOALKEEPER_CODE, MARKET_VALUE_MARKERS, NON_POSITION_UPPER,
    NO_STRENGTHS, NO_WEAKNESSES, POSITION_CODES,
};
use crate::processing::normalizer::BOUNDARY;
use anyhow::{Context, Result};
use std::ops::Range;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Age, height, five role stats, market value.
const STAT_BLOCK_LEN: usize = 8;

/// Positions never sit among the first tokens (slug, league, nationality).
const MIN_POSITION_INDEX: usize = 4;

const NO_WEAKNESS_MARKER: &str = "No outstanding weakness";
const NO_STRENGTH_MARKER: &str = "No outstanding strength";

// ── Rules ─────────────────────────────────────────────────────────────────────

/// Fixed lookup tables the scan matches token shapes against.
#[derive(Debug, Clone, Copy)]
pub struct TokenRules {
    pub min_tokens: usize,
    pub goalkeeper_code: &'static str,
    /// Known codes; a position-shaped token outside this list is still accepted.
    pub position_codes: &'static [&'static str],
    pub excluded_codes: &'static [&'static str],
    pub market_value_markers: &'static [&'static str],
}

pub const DEFAULT_RULES: TokenRules = TokenRules {
    min_tokens: 10,
    goalkeeper_code: GOALKEEPER_CODE,
    position_codes: POSITION_CODES,
    excluded_codes: NON_POSITION_UPPER,
    market_value_markers: MARKET_VALUE_MARKERS,
};

impl Default for TokenRules {
    fn default() -> Self {
        DEFAULT_RULES
    }
}

impl TokenRules {
    /// Three characters, upper-case, starting with a letter: "BEL", "ENG".
    pub fn is_nationality(&self, token: &str) -> bool {
        token.chars().count() == 3
            && token.chars().next().is_some_and(char::is_alphabetic)
            && is_upper(token)
    }

    /// One or two upper-case characters past the header tokens, not a known
    /// club/competition fragment.
    pub fn is_position(&self, token: &str, index: usize) -> bool {
        index >= MIN_POSITION_INDEX
            && (1..=2).contains(&token.chars().count())
            && is_upper(token)
            && !self.excluded_codes.iter().any(|c| *c == token)
    }

    fn is_market_value(&self, token: &str) -> bool {
        self.market_value_markers.iter().any(|m| token.contains(*m))
    }
}

/// At least one cased character and no lower-case ones ("A1" counts, "12" doesn't).
fn is_upper(token: &str) -> bool {
    token.chars().any(char::is_uppercase) && !token.chars().any(char::is_lowercase)
}

// ── Errors / report ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("too short ({found} tokens, need {required})")]
    TooShort { found: usize, required: usize },

    #[error("no nationality found")]
    NoNationality,

    #[error("no position found")]
    NoPosition,

    #[error("insufficient stats data ({found} tokens after positions, need 8)")]
    InsufficientStats { found: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedLine {
    /// 1-based.
    pub line: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Default)]
pub struct ParseReport {
    pub records: Vec<PlayerRecord>,
    pub dropped: Vec<DroppedLine>,
}

impl ParseReport {
    pub fn lines_seen(&self) -> usize {
        self.records.len() + self.dropped.len()
    }
}

// ── Scan ──────────────────────────────────────────────────────────────────────

/// Token indices of the structural landmarks of a valid line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Layout {
    nationality: usize,
    positions: Range<usize>,
}

impl Layout {
    fn stats(&self) -> Range<usize> {
        self.positions.end..self.positions.end + STAT_BLOCK_LEN
    }
}

enum ScanState {
    SeekNationality,
    SeekPosition { nationality: usize },
    CollectStats { nationality: usize, positions: Range<usize> },
    Done(Layout),
}

fn scan(tokens: &[&str], rules: &TokenRules) -> Result<Layout, SkipReason> {
    let mut state = ScanState::SeekNationality;
    loop {
        state = match state {
            ScanState::SeekNationality => {
                let nationality = (1..tokens.len())
                    .find(|&i| rules.is_nationality(tokens[i]))
                    .ok_or(SkipReason::NoNationality)?;
                ScanState::SeekPosition { nationality }
            }

            ScanState::SeekPosition { nationality } => {
                let start = (nationality + 1..tokens.len())
                    .find(|&i| rules.is_position(tokens[i], i))
                    .ok_or(SkipReason::NoPosition)?;
                let end = (start..tokens.len())
                    .find(|&i| !rules.is_position(tokens[i], i))
                    .unwrap_or(tokens.len());
                ScanState::CollectStats { nationality, positions: start..end }
            }

            ScanState::CollectStats { nationality, positions } => {
                let found = tokens.len() - positions.end;
                if found < STAT_BLOCK_LEN {
                    return Err(SkipReason::InsufficientStats { found });
                }
                ScanState::Done(Layout { nationality, positions })
            }

            ScanState::Done(layout) => return Ok(layout),
        }
    }
}

// ── Parser ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct RecordParser {
    rules: TokenRules,
}

impl RecordParser {
    pub fn new(rules: TokenRules) -> Self {
        Self { rules }
    }

    pub fn parse_line(&self, line: &str) -> Result<PlayerRecord, SkipReason> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < self.rules.min_tokens {
            return Err(SkipReason::TooShort {
                found: tokens.len(),
                required: self.rules.min_tokens,
            });
        }

        let layout = scan(&tokens, &self.rules)?;

        let (given_name, family_name) = tokens[0].split_once('-').unwrap_or((tokens[0], ""));

        let positions: Vec<String> = tokens[layout.positions.clone()]
            .iter()
            .map(|s| s.to_string())
            .collect();
        for code in &positions {
            if !self.rules.position_codes.iter().any(|c| *c == code.as_str()) {
                debug!("Unrecognised position code {:?} for {}", code, tokens[0]);
            }
        }

        let stats = &tokens[layout.stats()];
        let role = Role::for_first_position(&positions[0], self.rules.goalkeeper_code);
        let values: [String; 5] = std::array::from_fn(|i| stats[2 + i].to_string());

        let (strengths, weaknesses) = split_strengths_weaknesses(&tokens, &self.rules);

        Ok(PlayerRecord {
            given_name: given_name.to_string(),
            family_name: family_name.to_string(),
            league: tokens[1..layout.nationality].join(" "),
            nationality: tokens[layout.nationality].to_string(),
            club: tokens[layout.nationality + 1..layout.positions.start].join(" "),
            positions,
            age: stats[0].to_string(),
            height: stats[1].to_string(),
            role_stats: RoleStats::from_values(role, values),
            market_value: stats[7].to_string(),
            strengths,
            weaknesses,
            preferred_foot: tokens[tokens.len() - 1].to_string(),
        })
    }

    /// Parse every line, keeping input order. Dropped lines are logged and
    /// reported, never fatal.
    pub fn parse(&self, text: &str) -> ParseReport {
        let mut report = ParseReport::default();

        for (i, line) in text.lines().enumerate() {
            match self.parse_line(line) {
                Ok(record) => report.records.push(record),
                Err(reason) => {
                    warn!("Line {}: {}, skipping", i + 1, reason);
                    report.dropped.push(DroppedLine { line: i + 1, reason });
                }
            }
        }

        report
    }
}

pub fn parse(text: &str) -> ParseReport {
    RecordParser::default().parse(text)
}

pub fn parse_stats_file(path: &Path) -> Result<ParseReport> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read formatted stats {:?}", path))?;
    let report = parse(&text);
    info!(
        "Parsed {} players from {:?} ({} lines dropped)",
        report.records.len(),
        path,
        report.dropped.len()
    );
    Ok(report)
}

// ── Strengths / weaknesses ────────────────────────────────────────────────────

/// Everything after the market value, minus the trailing preferred foot, split
/// on the boundary marker.
///
/// Strength and weakness items are only told apart by the "No outstanding …"
/// placeholders. Without a weakness placeholder every item lands in strengths.
fn split_strengths_weaknesses(tokens: &[&str], rules: &TokenRules) -> (Vec<String>, Vec<String>) {
    let mut tail: Vec<&str> = tokens
        .iter()
        .position(|t| rules.is_market_value(t))
        .map(|i| tokens[i + 1..].to_vec())
        .unwrap_or_default();
    tail.pop();

    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();

    if !tail.is_empty() {
        let joined = tail.join(" ");
        let mut in_weaknesses = false;
        for part in joined.split(BOUNDARY).map(str::trim).filter(|p| !p.is_empty()) {
            if part.contains(NO_WEAKNESS_MARKER) {
                weaknesses = vec![NO_WEAKNESSES.to_string()];
                in_weaknesses = true;
            } else if part.contains(NO_STRENGTH_MARKER) {
                strengths = vec![NO_STRENGTHS.to_string()];
            } else if in_weaknesses {
                weaknesses.push(part.to_string());
            } else {
                strengths.push(part.to_string());
            }
        }
    }

    if strengths.is_empty() {
        strengths.push(NO_STRENGTHS.to_string());
    }
    if weaknesses.is_empty() {
        weaknesses.push(NO_WEAKNESSES.to_string());
    }
    (strengths, weaknesses)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const DE_BRUYNE: &str = "kevin-de-bruyne Premier League BEL Manchester City MC AM 32 181 95 92 93 88 91 85M€ Vision|Passing No outstanding weaknesses Right";
    const RAYA: &str = "david-raya Premier League ESP Arsenal GK 28 183 74 70 68 81 66 35M€ No outstanding strengths High|Claims Right";

    #[test]
    fn test_parse_outfield_line() {
        let rec = parse_line(DE_BRUYNE).unwrap();
        assert_eq!(rec.given_name, "kevin");
        assert_eq!(rec.family_name, "de-bruyne");
        assert_eq!(rec.league, "Premier League");
        assert_eq!(rec.nationality, "BEL");
        assert_eq!(rec.club, "Manchester City");
        assert_eq!(rec.positions, vec!["MC", "AM"]);
        assert_eq!(rec.age, "32");
        assert_eq!(rec.height, "181");
        assert_eq!(
            rec.role_stats,
            RoleStats::Outfield {
                attacking: "95".into(),
                creativity: "92".into(),
                technical: "93".into(),
                defending: "88".into(),
                tactical: "91".into(),
            }
        );
        assert_eq!(rec.market_value, "85M€");
        assert_eq!(rec.preferred_foot, "Right");
    }

    #[test]
    fn test_weakness_placeholder_swallows_its_part() {
        // "Passing No outstanding weaknesses" is one pipe part once joined
        let rec = parse_line(DE_BRUYNE).unwrap();
        assert_eq!(rec.strengths, vec!["Vision"]);
        assert_eq!(rec.weaknesses, vec![NO_WEAKNESSES]);
        assert!(!rec.has_weaknesses());
    }

    #[test]
    fn test_parse_goalkeeper_line() {
        let rec = parse_line(RAYA).unwrap();
        assert_eq!(rec.role(), Role::Goalkeeper);
        assert_eq!(rec.club, "Arsenal");
        assert_eq!(rec.positions, vec!["GK"]);
        match &rec.role_stats {
            RoleStats::Goalkeeper { saves, aerial, .. } => {
                assert_eq!(saves, "74");
                assert_eq!(aerial, "66");
            }
            other => panic!("expected goalkeeper stats, got {:?}", other),
        }
        // the placeholder swallows the item it was joined to, later items are kept
        assert_eq!(rec.strengths, vec![NO_STRENGTHS, "Claims"]);
        assert_eq!(rec.weaknesses, vec![NO_WEAKNESSES]);
    }

    #[test]
    fn test_items_without_placeholder_all_go_to_strengths() {
        let line = "luka-modric LaLiga CRO Real Madrid MC 38 172 70 90 92 65 89 5M€ Passing|Vision Aerial duels|Tackling Right";
        let rec = parse_line(line).unwrap();
        assert_eq!(rec.strengths, vec!["Passing", "Vision Aerial duels", "Tackling"]);
        assert_eq!(rec.weaknesses, vec![NO_WEAKNESSES]);
    }

    #[test]
    fn test_items_after_weakness_placeholder_go_to_weaknesses() {
        let line = "a-b League ENG Club ST 25 180 80 70 75 40 60 2M€ Finishing|No outstanding weaknesses|Aerial Right";
        let rec = parse_line(line).unwrap();
        assert_eq!(rec.strengths, vec!["Finishing"]);
        assert_eq!(rec.weaknesses, vec![NO_WEAKNESSES, "Aerial"]);
    }

    #[test]
    fn test_no_market_marker_gives_placeholders() {
        let line = "a-b League ENG Club ST 25 180 80 70 75 40 60 2000000 Finishing Right";
        let rec = parse_line(line).unwrap();
        assert_eq!(rec.market_value, "2000000");
        assert_eq!(rec.strengths, vec![NO_STRENGTHS]);
        assert_eq!(rec.weaknesses, vec![NO_WEAKNESSES]);
    }

    #[test]
    fn test_market_value_then_only_foot() {
        let line = "a-b League ENG Club ST 25 180 80 70 75 40 60 750K€ Left";
        let rec = parse_line(line).unwrap();
        assert_eq!(rec.market_value, "750K€");
        assert_eq!(rec.strengths, vec![NO_STRENGTHS]);
        assert_eq!(rec.weaknesses, vec![NO_WEAKNESSES]);
        assert_eq!(rec.preferred_foot, "Left");
    }

    #[test]
    fn test_slug_without_hyphen() {
        let line = "pedri LaLiga ESP Barcelona MC 21 174 70 85 88 60 80 90M€ Passing Right";
        let rec = parse_line(line).unwrap();
        assert_eq!(rec.given_name, "pedri");
        assert_eq!(rec.family_name, "");
    }

    #[test]
    fn test_excluded_codes_are_club_tokens() {
        let line = "a-b Serie A ITA AS Roma FC DC DL 27 185 40 45 60 85 78 20M€ Tackling Left";
        let rec = parse_line(line).unwrap();
        assert_eq!(rec.league, "Serie A");
        assert_eq!(rec.club, "AS Roma FC");
        assert_eq!(rec.positions, vec!["DC", "DL"]);
    }

    #[test]
    fn test_position_run_stops_at_first_non_position() {
        let line = "a-b League ENG Club DC DL 27 DR 185 40 45 60 85 78 20M€ Right";
        let rec = parse_line(line).unwrap();
        assert_eq!(rec.positions, vec!["DC", "DL"]);
        assert_eq!(rec.age, "27");
        assert_eq!(rec.height, "DR");
    }

    #[test]
    fn test_too_short_is_dropped() {
        let err = parse_line("a-b League ENG Club MC 25 180").unwrap_err();
        assert_eq!(err, SkipReason::TooShort { found: 7, required: 10 });
    }

    #[test]
    fn test_no_nationality_is_dropped() {
        let line = "a-b League England Club MC 25 180 80 70 75 40 60 2M€ Right";
        assert_eq!(parse_line(line).unwrap_err(), SkipReason::NoNationality);
    }

    #[test]
    fn test_no_position_is_dropped() {
        let line = "a-b League ENG Some Club Name 25 180 80 70 75 40 60 2M€ Right";
        assert_eq!(parse_line(line).unwrap_err(), SkipReason::NoPosition);
    }

    #[test]
    fn test_insufficient_stats_is_dropped() {
        let line = "a-b League ENG Club Name MC 25 180 80 70 75 40";
        assert_eq!(
            parse_line(line).unwrap_err(),
            SkipReason::InsufficientStats { found: 6 }
        );
    }

    #[test]
    fn test_header_tokens_never_positions() {
        // "MC" at index 3 sits in the header, the scan must skip it
        let rules = TokenRules::default();
        assert!(!rules.is_position("MC", 3));
        assert!(rules.is_position("MC", 4));
        assert!(!rules.is_position("FC", 6));
        assert!(!rules.is_position("Mc", 6));
        assert!(!rules.is_position("32", 6));
        assert!(!rules.is_position("ABC", 6));
    }

    #[test]
    fn test_nationality_shape() {
        let rules = TokenRules::default();
        assert!(rules.is_nationality("BEL"));
        assert!(rules.is_nationality("B12"));
        assert!(!rules.is_nationality("1M€"));
        assert!(!rules.is_nationality("Bel"));
        assert!(!rules.is_nationality("BELG"));
    }

    #[test]
    fn test_parse_keeps_order_and_reports_drops() {
        let text = format!("{}\nshort line here\n{}\n", DE_BRUYNE, RAYA);
        let report = parse(&text);
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[0].family_name, "de-bruyne");
        assert_eq!(report.records[1].family_name, "raya");
        assert_eq!(report.dropped.len(), 1);
        assert_eq!(report.dropped[0].line, 2);
        assert_eq!(report.lines_seen(), 3);
    }

    #[test]
    fn test_normalized_input_round() {
        let raw = "kevin-de-bruyne Premier League BEL Manchester City MC AM 32yrs 181cm 95 92 93 88 91 85M€ KeyPasses Vision No outstanding weaknesses Right";
        let line = crate::processing::normalizer::normalize_line(raw);
        let rec = parse_line(&line).unwrap();
        assert_eq!(rec.age, "32");
        assert_eq!(rec.height, "181");
        assert_eq!(rec.strengths, vec!["Key"]);
        assert_eq!(rec.weaknesses, vec![NO_WEAKNESSES]);
    }

    fn parse_line(line: &str) -> Result<PlayerRecord, SkipReason> {
        RecordParser::default().parse_line(line)
    }
}
