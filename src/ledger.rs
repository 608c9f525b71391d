use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use crate::config::app_data_dir;
use crate::grading::{BetType, GradingResult, Outcome, RecommendationRecord};
use crate::matchup::MatchupKey;

/// Append-only weekly pick ledger. A row is written once at analysis time
/// and mutated exactly once when the grader attaches the outcome; the
/// `graded_at IS NULL` guard makes re-grading a no-op.

pub fn default_ledger_path() -> Option<PathBuf> {
    app_data_dir().map(|dir| dir.join("recommendations.sqlite"))
}

pub fn open_ledger(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open ledger db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS recommendations (
            season INTEGER NOT NULL,
            week INTEGER NOT NULL,
            matchup TEXT NOT NULL,
            bet_type TEXT NOT NULL,
            recommendation TEXT NOT NULL,
            spread_line REAL,
            total_line REAL,
            confidence REAL,
            created_at TEXT NOT NULL,
            outcome TEXT,
            margin REAL,
            graded_at TEXT,
            PRIMARY KEY (season, week, matchup, bet_type)
        );
        CREATE INDEX IF NOT EXISTS idx_recommendations_week
            ON recommendations (season, week);
        "#,
    )
    .context("init ledger schema")?;
    Ok(())
}

/// Insert a pick. Returns false when a pick for the same
/// (season, week, matchup, bet_type) already exists; the week stays
/// append-only, a re-run never rewrites an earlier pick.
pub fn record_pick(conn: &Connection, record: &RecommendationRecord) -> Result<bool> {
    let inserted = conn
        .execute(
            r#"
            INSERT INTO recommendations
                (season, week, matchup, bet_type, recommendation,
                 spread_line, total_line, confidence, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT (season, week, matchup, bet_type) DO NOTHING
            "#,
            params![
                record.season,
                record.week,
                record.matchup.as_str(),
                record.bet_type.label(),
                record.recommendation,
                record.spread_line,
                record.total_line,
                record.confidence,
                Utc::now().to_rfc3339(),
            ],
        )
        .context("insert recommendation")?;
    Ok(inserted > 0)
}

/// Attach a grade, once. Rows already carrying a grade are left untouched.
pub fn apply_grade(
    conn: &Connection,
    season: u16,
    week: u8,
    matchup: &MatchupKey,
    bet_type: BetType,
    result: &GradingResult,
) -> Result<bool> {
    let updated = conn
        .execute(
            r#"
            UPDATE recommendations
            SET outcome = ?1, margin = ?2, graded_at = ?3
            WHERE season = ?4 AND week = ?5 AND matchup = ?6 AND bet_type = ?7
              AND graded_at IS NULL
            "#,
            params![
                result.outcome.label(),
                result.margin,
                Utc::now().to_rfc3339(),
                season,
                week,
                matchup.as_str(),
                bet_type.label(),
            ],
        )
        .context("apply grade")?;
    Ok(updated > 0)
}

pub fn load_week(conn: &Connection, season: u16, week: u8) -> Result<Vec<RecommendationRecord>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT season, week, matchup, bet_type, recommendation,
                   spread_line, total_line, confidence, outcome, margin
            FROM recommendations
            WHERE season = ?1 AND week = ?2
            ORDER BY matchup, bet_type
            "#,
        )
        .context("prepare week query")?;

    let rows = stmt
        .query_map(params![season, week], |row| {
            Ok(RawRow {
                season: row.get(0)?,
                week: row.get(1)?,
                matchup: row.get(2)?,
                bet_type: row.get(3)?,
                recommendation: row.get(4)?,
                spread_line: row.get(5)?,
                total_line: row.get(6)?,
                confidence: row.get(7)?,
                outcome: row.get(8)?,
                margin: row.get(9)?,
            })
        })
        .context("query week")?;

    let mut out = Vec::new();
    for row in rows {
        let raw = row.context("read ledger row")?;
        let Some(record) = raw.into_record() else {
            // A row with labels this code never wrote; skip rather than guess.
            continue;
        };
        out.push(record);
    }
    Ok(out)
}

pub fn week_outcome_counts(
    conn: &Connection,
    season: u16,
    week: u8,
    outcome: Outcome,
) -> Result<u32> {
    let count: Option<u32> = conn
        .query_row(
            "SELECT COUNT(*) FROM recommendations
             WHERE season = ?1 AND week = ?2 AND outcome = ?3",
            params![season, week, outcome.label()],
            |row| row.get(0),
        )
        .optional()
        .context("count outcomes")?;
    Ok(count.unwrap_or(0))
}

struct RawRow {
    season: u16,
    week: u8,
    matchup: String,
    bet_type: String,
    recommendation: String,
    spread_line: Option<f64>,
    total_line: Option<f64>,
    confidence: Option<f64>,
    outcome: Option<String>,
    margin: Option<f64>,
}

impl RawRow {
    fn into_record(self) -> Option<RecommendationRecord> {
        let bet_type = match self.bet_type.as_str() {
            "spread" => BetType::Spread,
            "total" => BetType::Total,
            "combo" => BetType::Combo,
            _ => return None,
        };
        let outcome = match self.outcome {
            Some(raw) => Some(Outcome::parse(&raw)?),
            None => None,
        };
        let (away, home) = self.matchup.split_once('@')?;
        Some(RecommendationRecord {
            season: self.season,
            week: self.week,
            matchup: crate::matchup::build_key(away, home),
            bet_type,
            recommendation: self.recommendation,
            spread_line: self.spread_line,
            total_line: self.total_line,
            confidence: self.confidence,
            outcome,
            margin: self.margin,
        })
    }
}
