//! Pipeline orchestrator: ties the processing stages to the stage files.
//!
//! ## Stages
//!
//! `format()`: raw stats file → normalized stats file (one line per player).
//!
//! `export()`: normalized file → parse → dedup → CSV/TSV/JSONL.
//!
//! `run()`: both of the above, using the paths from config.
//!
//! `store()`: normalized file → parse → dedup → DuckDB upsert, logged as a
//!   load run. Idempotent: re-loading the same file updates rows in place.

use crate::config::AppConfig;
use crate::export::export_to_file;
use crate::processing::{dedup_records, format_stats_file, parse_stats_file};
use crate::storage::Repository;
use crate::utils::Timer;
use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

pub struct Pipeline {
    config: AppConfig,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn format(&self, input: &Path, output: &Path) -> Result<usize> {
        let timer = Timer::start("Format stats");
        let lines = format_stats_file(input, output)?;
        timer.stop();
        Ok(lines)
    }

    pub fn export(&self, input: &Path, output: &Path) -> Result<PipelineStats> {
        let timer = Timer::start("Export players");

        let report = parse_stats_file(input)?;
        let lines_seen = report.lines_seen();
        let lines_dropped = report.dropped.len();
        let records_parsed = report.records.len();

        let deduped = dedup_records(report.records);
        let records_written = export_to_file(&deduped.records, output, &self.config.export)?;

        let stats = PipelineStats {
            lines_seen,
            records_parsed,
            lines_dropped,
            duplicates_removed: deduped.removed,
            records_written,
            elapsed: timer.stop(),
        };
        stats.log();
        Ok(stats)
    }

    /// Format the raw stats file, then export it.
    pub fn run(&self) -> Result<PipelineStats> {
        let paths = &self.config.paths;
        self.format(&paths.stats_file, &paths.formatted_file)?;
        self.export(&paths.formatted_file, &paths.export_file)
    }

    pub fn store(&self, input: &Path) -> Result<PipelineStats> {
        let timer = Timer::start("Store players");
        let repo = Repository::open(&self.config.storage.db_path)
            .context("Failed to open DuckDB")?;

        if self.config.storage.run_migrations {
            repo.run_migrations()?;
        }

        let run_id = repo.begin_load_run(input)?;

        let loaded = parse_stats_file(input).and_then(|report| {
            let lines_seen = report.lines_seen();
            let lines_dropped = report.dropped.len();
            let records_parsed = report.records.len();
            let deduped = dedup_records(report.records);
            let written = repo.upsert_players(&deduped.records, &self.config.export.list_separator)?;
            Ok((lines_seen, records_parsed, lines_dropped, deduped.removed, written))
        });

        let (lines_seen, records_parsed, lines_dropped, duplicates_removed, records_written) =
            match loaded {
                Ok(counts) => counts,
                Err(e) => {
                    let msg = format!("{:#}", e);
                    if let Err(log_err) = repo.finish_load_run(run_id, 0, 0, Some(&msg)) {
                        warn!("Could not close load run {}: {:#}", run_id, log_err);
                    }
                    return Err(e);
                }
            };

        repo.finish_load_run(run_id, records_written, lines_dropped, None)?;

        let stats = PipelineStats {
            lines_seen,
            records_parsed,
            lines_dropped,
            duplicates_removed,
            records_written,
            elapsed: timer.stop(),
        };
        stats.log();
        info!("{} players in DB", repo.player_count()?);
        Ok(stats)
    }
}

#[derive(Debug)]
pub struct PipelineStats {
    pub lines_seen: usize,
    pub records_parsed: usize,
    pub lines_dropped: usize,
    pub duplicates_removed: usize,
    pub records_written: usize,
    pub elapsed: Duration,
}

impl PipelineStats {
    fn log(&self) {
        info!(
            "=== Done: {} lines | {} parsed | {} dropped | {} duplicates | {} written ===",
            self.lines_seen,
            self.records_parsed,
            self.lines_dropped,
            self.duplicates_removed,
            self.records_written,
        );
    }
}
