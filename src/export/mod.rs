//! Tabular export of parsed player records.

use crate::config::ExportConfig;
use crate::models::{PlayerRecord, RoleStats};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Tsv,
    /// One JSON object per line
    Jsonl,
}

/// Column order of the CSV/TSV export. Both stat groups get columns; the
/// group of the other role stays blank.
pub const COLUMNS: [&str; 23] = [
    "given_name",
    "family_name",
    "league",
    "nationality",
    "club",
    "positions",
    "age",
    "height",
    "role",
    "saves",
    "anticipation",
    "tactical_gk",
    "distribution",
    "aerial",
    "attacking",
    "creativity",
    "technical",
    "defending",
    "tactical",
    "market_value",
    "strengths",
    "weaknesses",
    "preferred_foot",
];

pub fn record_to_row(r: &PlayerRecord, list_sep: &str) -> Vec<String> {
    let mut row = vec![
        r.given_name.clone(),
        r.family_name.clone(),
        r.league.clone(),
        r.nationality.clone(),
        r.club.clone(),
        r.positions.join(list_sep),
        r.age.clone(),
        r.height.clone(),
        r.role().as_str().to_string(),
    ];

    let values = r.role_stats.values().map(str::to_string);
    let blank = || std::array::from_fn::<String, 5, _>(|_| String::new());
    let (gk, outfield) = match r.role_stats {
        RoleStats::Goalkeeper { .. } => (values, blank()),
        RoleStats::Outfield { .. } => (blank(), values),
    };
    row.extend(gk);
    row.extend(outfield);

    row.push(r.market_value.clone());
    row.push(r.strengths.join(list_sep));
    row.push(r.weaknesses.join(list_sep));
    row.push(r.preferred_foot.clone());
    row
}

/// Write records in input order. Returns the number of rows written.
pub fn write_records<W: Write>(records: &[PlayerRecord], writer: W, cfg: &ExportConfig) -> Result<usize> {
    match cfg.format {
        ExportFormat::Csv => write_delimited(records, writer, b',', cfg),
        ExportFormat::Tsv => write_delimited(records, writer, b'\t', cfg),
        ExportFormat::Jsonl => write_jsonl(records, writer),
    }
}

fn write_delimited<W: Write>(records: &[PlayerRecord], writer: W, delimiter: u8, cfg: &ExportConfig) -> Result<usize> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_writer(writer);

    if cfg.include_headers {
        wtr.write_record(COLUMNS)?;
    }
    for r in records {
        wtr.write_record(record_to_row(r, &cfg.list_separator))
            .with_context(|| format!("write row {}-{}", r.given_name, r.family_name))?;
    }
    wtr.flush()?;
    Ok(records.len())
}

fn write_jsonl<W: Write>(records: &[PlayerRecord], mut writer: W) -> Result<usize> {
    for r in records {
        serde_json::to_writer(&mut writer, r)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(records.len())
}

pub fn export_to_file(records: &[PlayerRecord], path: &Path, cfg: &ExportConfig) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Could not create dir {:?}", parent))?;
    }
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    let n = write_records(records, BufWriter::new(file), cfg)?;
    info!("Exported {} players to {:?} ({:?})", n, path, cfg.format);
    Ok(n)
}
