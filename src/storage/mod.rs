use crate::models::{PlayerRecord, RoleStats};
use anyhow::{Context, Result};
use chrono::Utc;
use duckdb::{params, Connection};
use std::path::Path;
use tracing::info;

// ── Schema ────────────────────────────────────────────────────────────────────

const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS players (
    given_name      VARCHAR NOT NULL,
    family_name     VARCHAR NOT NULL,
    age             VARCHAR NOT NULL,
    height          VARCHAR NOT NULL,
    club            VARCHAR NOT NULL,
    league          VARCHAR NOT NULL,
    nationality     VARCHAR NOT NULL,
    positions       VARCHAR NOT NULL,
    role            VARCHAR NOT NULL,
    -- Goalkeeper graph (NULL for outfield players)
    saves           VARCHAR,
    anticipation    VARCHAR,
    tactical_gk     VARCHAR,
    distribution    VARCHAR,
    aerial          VARCHAR,
    -- Outfield graph (NULL for goalkeepers)
    attacking       VARCHAR,
    creativity      VARCHAR,
    technical       VARCHAR,
    defending       VARCHAR,
    tactical        VARCHAR,
    market_value    VARCHAR NOT NULL,
    strengths       VARCHAR NOT NULL,
    weaknesses      VARCHAR NOT NULL,
    preferred_foot  VARCHAR NOT NULL,
    loaded_at       TIMESTAMP NOT NULL,
    PRIMARY KEY (given_name, family_name, age, height, club)
);

CREATE SEQUENCE IF NOT EXISTS load_run_ids START 1;

CREATE TABLE IF NOT EXISTS load_runs (
    id              INTEGER PRIMARY KEY DEFAULT nextval('load_run_ids'),
    started_at      TIMESTAMP NOT NULL,
    finished_at     TIMESTAMP,
    status          VARCHAR NOT NULL DEFAULT 'running',
    source_file     VARCHAR,
    players_loaded  INTEGER DEFAULT 0,
    lines_dropped   INTEGER DEFAULT 0,
    error_msg       VARCHAR
);

CREATE TABLE IF NOT EXISTS schema_version (
    version     INTEGER PRIMARY KEY,
    applied_at  TIMESTAMP NOT NULL
);
"#;

// Upserted player columns stay unindexed: DuckDB refuses ON CONFLICT updates
// of indexed columns.
const INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_runs_started ON load_runs (started_at);
"#;

// ── Repository ────────────────────────────────────────────────────────────────

pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Could not create dir {:?}", parent))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open DuckDB at {:?}", path))?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self { conn: Connection::open_in_memory()? })
    }

    pub fn run_migrations(&self) -> Result<()> {
        info!("Running migrations…");
        self.conn.execute_batch(DDL).context("DDL failed")?;
        self.conn.execute_batch(INDEXES).context("Index creation failed")?;
        self.conn.execute(
            "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (1, ?)",
            params![Utc::now().naive_utc()],
        )?;
        info!("Migrations done.");
        Ok(())
    }

    // ── Players ───────────────────────────────────────────────────────────────

    /// Upsert by player identity. Re-running on the same data updates rows in place.
    /// List columns (positions, strengths, weaknesses) are joined with `list_sep`.
    pub fn upsert_players(&self, players: &[PlayerRecord], list_sep: &str) -> Result<usize> {
        if players.is_empty() { return Ok(0); }

        let now = Utc::now().naive_utc();
        let tx = self.conn.unchecked_transaction()?;
        let sql = r#"
            INSERT INTO players
                (given_name, family_name, age, height, club,
                 league, nationality, positions, role,
                 saves, anticipation, tactical_gk, distribution, aerial,
                 attacking, creativity, technical, defending, tactical,
                 market_value, strengths, weaknesses, preferred_foot, loaded_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (given_name, family_name, age, height, club) DO UPDATE SET
                league         = excluded.league,
                nationality    = excluded.nationality,
                positions      = excluded.positions,
                role           = excluded.role,
                saves          = excluded.saves,
                anticipation   = excluded.anticipation,
                tactical_gk    = excluded.tactical_gk,
                distribution   = excluded.distribution,
                aerial         = excluded.aerial,
                attacking      = excluded.attacking,
                creativity     = excluded.creativity,
                technical      = excluded.technical,
                defending      = excluded.defending,
                tactical       = excluded.tactical,
                market_value   = excluded.market_value,
                strengths      = excluded.strengths,
                weaknesses     = excluded.weaknesses,
                preferred_foot = excluded.preferred_foot,
                loaded_at      = excluded.loaded_at
        "#;

        for p in players {
            let (gk, outfield) = match &p.role_stats {
                RoleStats::Goalkeeper { .. } => (Some(p.role_stats.values()), None),
                RoleStats::Outfield { .. } => (None, Some(p.role_stats.values())),
            };
            let gk = |i: usize| gk.map(|v| v[i]);
            let of = |i: usize| outfield.map(|v| v[i]);

            tx.execute(sql, params![
                p.given_name, p.family_name, p.age, p.height, p.club,
                p.league, p.nationality, p.positions.join(list_sep), p.role().as_str(),
                gk(0), gk(1), gk(2), gk(3), gk(4),
                of(0), of(1), of(2), of(3), of(4),
                p.market_value, p.strengths.join(list_sep), p.weaknesses.join(list_sep),
                p.preferred_foot, now,
            ]).with_context(|| format!("upsert player {}-{}", p.given_name, p.family_name))?;
        }

        tx.commit()?;
        Ok(players.len())
    }

    pub fn player_count(&self) -> Result<i64> {
        let mut s = self.conn.prepare("SELECT COUNT(*) FROM players")?;
        Ok(s.query_row([], |r| r.get(0))?)
    }

    pub fn club_count(&self) -> Result<i64> {
        let mut s = self.conn.prepare("SELECT COUNT(DISTINCT club) FROM players")?;
        Ok(s.query_row([], |r| r.get(0))?)
    }

    /// Player counts per nationality, largest first.
    pub fn top_nationalities(&self, limit: usize) -> Result<Vec<(String, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT nationality, COUNT(*) AS n FROM players GROUP BY nationality ORDER BY n DESC, nationality LIMIT ?",
        )?;
        let rows = stmt
            .query_map(params![limit as i64], |r| Ok((r.get(0)?, r.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // ── Load run log ──────────────────────────────────────────────────────────

    pub fn begin_load_run(&self, source: &Path) -> Result<i64> {
        let id: i64 = self.conn.query_row(
            "INSERT INTO load_runs (started_at, status, source_file) VALUES (?, 'running', ?) RETURNING id",
            params![Utc::now().naive_utc(), source.display().to_string()],
            |r| r.get(0),
        )?;
        Ok(id)
    }

    pub fn finish_load_run(
        &self, run_id: i64, loaded: usize, dropped: usize, error: Option<&str>,
    ) -> Result<()> {
        self.conn.execute(
            r#"UPDATE load_runs SET
               finished_at = ?, status = ?,
               players_loaded = ?, lines_dropped = ?, error_msg = ?
               WHERE id = ?"#,
            params![
                Utc::now().naive_utc(),
                if error.is_none() { "success" } else { "error" },
                loaded as i64, dropped as i64, error, run_id,
            ],
        )?;
        Ok(())
    }

    pub fn run_count(&self) -> Result<i64> {
        let mut s = self.conn.prepare("SELECT COUNT(*) FROM load_runs WHERE status = 'success'")?;
        Ok(s.query_row([], |r| r.get(0))?)
    }
}
