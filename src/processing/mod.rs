//! Text processing stages: raw stats → normalized lines → player records.

pub mod dedup;
pub mod normalizer;
pub mod parser;

pub use dedup::{dedup_records, find_missing_scrapes, slug_from_link, DedupOutcome};
pub use normalizer::{format_stats_file, normalize};
pub use parser::{parse_stats_file, ParseReport, RecordParser, SkipReason};
