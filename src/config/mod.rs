use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use crate::export::ExportFormat;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Stage files
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    #[serde(default = "default_links_file")]
    pub links_file: PathBuf,

    /// Raw lines as written by the collector
    #[serde(default = "default_stats_file")]
    pub stats_file: PathBuf,

    #[serde(default = "default_formatted_file")]
    pub formatted_file: PathBuf,

    #[serde(default = "default_export_file")]
    pub export_file: PathBuf,
}

/// Tabular export
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub format: ExportFormat,

    /// Joins positions / strengths / weaknesses inside one cell
    #[serde(default = "default_list_separator")]
    pub list_separator: String,

    #[serde(default = "default_true")]
    pub include_headers: bool,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_links_file() -> PathBuf {
    PathBuf::from("output/player_links.txt")
}
fn default_stats_file() -> PathBuf {
    PathBuf::from("output/player_stats.txt")
}
fn default_formatted_file() -> PathBuf {
    PathBuf::from("output/player_stats_formatted.txt")
}
fn default_export_file() -> PathBuf {
    PathBuf::from("output/sofascore_stats.csv")
}
fn default_list_separator() -> String {
    ",".to_string()
}
fn default_db_path() -> PathBuf {
    PathBuf::from("output/sofa_stats.duckdb")
}
fn default_true() -> bool {
    true
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            links_file: default_links_file(),
            stats_file: default_stats_file(),
            formatted_file: default_formatted_file(),
            export_file: default_export_file(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::default(),
            list_separator: default_list_separator(),
            include_headers: true,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            run_migrations: true,
        }
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("SOFA").separator("__"))
            .build()?;

        let app_cfg: AppConfig = cfg.try_deserialize().unwrap_or_else(|e| {
            warn!("Invalid configuration ({}), using defaults", e);
            AppConfig::default()
        });
        Ok(app_cfg)
    }
}
