use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use sofa_stats::collector::rescrape_targets;
use sofa_stats::config::AppConfig;
use sofa_stats::export::ExportFormat;
use sofa_stats::loader::{load_links, load_stats_text};
use sofa_stats::pipeline::Pipeline;
use sofa_stats::processing::dedup::dedup_links_file;
use sofa_stats::processing::find_missing_scrapes;
use sofa_stats::storage::Repository;
use sofa_stats::utils::{fmt_number, Timer};

#[derive(Parser)]
#[command(name = "sofa-stats", about = "SofaScore player stats formatter and exporter", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize a raw stats file (strip units, mark strength boundaries)
    Format {
        /// Raw stats file (default: paths.stats_file)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Normalized output (default: paths.formatted_file)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse a normalized stats file, drop duplicates and write the export
    Export {
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Overrides export.format
        #[arg(short, long, value_enum)]
        format: Option<ExportFormat>,
    },

    /// Format then export, using the configured paths
    Pipeline,

    /// List profile links that produced no stats line
    Missing {
        #[arg(short, long)]
        links: Option<PathBuf>,
        /// Stats files to check against; repeatable (default: paths.stats_file)
        #[arg(short, long)]
        stats: Vec<PathBuf>,
        /// Print re-scrape search slugs instead of links
        #[arg(long)]
        slugs: bool,
        /// Explicit slugs to re-scrape; used instead of the missing ones
        #[arg(long, num_args = 1.., requires = "slugs")]
        names: Vec<String>,
    },

    /// Drop repeated lines from a profile links file
    DedupLinks {
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Defaults to rewriting the input in place
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse a normalized stats file and upsert it into DuckDB
    Store {
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Show database statistics
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "sofa_stats=info,warn",
        1 => "sofa_stats=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let mut config = AppConfig::load()?;

    match cli.command {
        Command::Format { input, output } => {
            let input = input.unwrap_or_else(|| config.paths.stats_file.clone());
            let output = output.unwrap_or_else(|| config.paths.formatted_file.clone());
            let lines = Pipeline::new(config).format(&input, &output)?;
            info!("Done: {} lines formatted", lines);
        }

        Command::Export { input, output, format } => {
            let input = input.unwrap_or_else(|| config.paths.formatted_file.clone());
            let output = output.unwrap_or_else(|| config.paths.export_file.clone());
            if let Some(format) = format {
                config.export.format = format;
            }
            let stats = Pipeline::new(config).export(&input, &output)?;
            info!("Done: {} players exported in {:.2?}", stats.records_written, stats.elapsed);
        }

        Command::Pipeline => {
            let stats = Pipeline::new(config).run()?;
            info!("Done: {} players exported in {:.2?}", stats.records_written, stats.elapsed);
        }

        Command::Missing { links, stats, slugs, names } => {
            let _t = Timer::start("Missing scrape check");
            let links = load_links(&links.unwrap_or_else(|| config.paths.links_file.clone()))?;
            let stats = if stats.is_empty() { vec![config.paths.stats_file.clone()] } else { stats };
            let text = load_stats_text(&stats)?;

            let missing = find_missing_scrapes(&links, &text);
            info!("{} of {} links have no stats line", missing.len(), links.len());

            let out = if slugs { rescrape_targets(&names, &missing) } else { missing };
            for line in &out {
                println!("{}", line);
            }
        }

        Command::DedupLinks { input, output } => {
            let input = input.unwrap_or_else(|| config.paths.links_file.clone());
            let output = output.unwrap_or_else(|| input.clone());
            let (before, after) = dedup_links_file(&input, &output)?;
            info!("Done: {} duplicate links removed", before - after);
        }

        Command::Store { input } => {
            let input = input.unwrap_or_else(|| config.paths.formatted_file.clone());
            let stats = Pipeline::new(config).store(&input)?;
            info!("Done: {} players stored in {:.2?}", stats.records_written, stats.elapsed);
        }

        Command::Stats => {
            let repo = Repository::open(&config.storage.db_path)?;
            repo.run_migrations()?;
            let players = repo.player_count()?;
            let clubs = repo.club_count()?;
            let runs = repo.run_count()?;
            println!("─────────────────────────────────");
            println!("  SofaScore stats: database");
            println!("─────────────────────────────────");
            println!("  Players   : {}", fmt_number(players));
            println!("  Clubs     : {}", fmt_number(clubs));
            println!("  Load runs : {}", fmt_number(runs));
            let top = repo.top_nationalities(5)?;
            if !top.is_empty() {
                println!("  Top nationalities:");
                for (nat, n) in &top {
                    println!("    {:<4} {}", nat, fmt_number(*n));
                }
            }
            println!("─────────────────────────────────");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_need_slugs() {
        assert!(Cli::try_parse_from(["sofa-stats", "missing", "--names", "a-b"]).is_err());

        let cli = Cli::try_parse_from(["sofa-stats", "missing", "--slugs", "--names", "a-b", "c-d"]).unwrap();
        match cli.command {
            Command::Missing { slugs, names, .. } => {
                assert!(slugs);
                assert_eq!(names, vec!["a-b", "c-d"]);
            }
            _ => panic!("expected the missing command"),
        }
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["sofa-stats", "stats", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
