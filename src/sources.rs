use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Row shapes for the four scraped collaborator tables. Everything arrives
/// as text; parsing into numbers is the market/report layer's job so a
/// malformed field only blanks that field.

/// One bookmaker board row: one matchup+market snapshot.
///
/// Some boards supply separate away/home fields, others only a single
/// free-text `matchup` string ("New York Jets @ New England Patriots").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OddsBoardRow {
    #[serde(default)]
    pub away: Option<String>,
    #[serde(default)]
    pub home: Option<String>,
    #[serde(default)]
    pub matchup: Option<String>,
    pub market: String,
    #[serde(default)]
    pub line: Option<String>,
    #[serde(default)]
    pub bets_pct: Option<String>,
    #[serde(default)]
    pub money_pct: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Referee/crew trend row, keyed by the free-text query string it was
/// scraped under. Records arrive as "W-L" text, percentages as "57%".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefereeTrendRow {
    pub query: String,
    #[serde(default)]
    pub referee: Option<String>,
    #[serde(default)]
    pub games: Option<String>,
    #[serde(default)]
    pub su_record: Option<String>,
    #[serde(default)]
    pub ats_record: Option<String>,
    #[serde(default)]
    pub ou_record: Option<String>,
    #[serde(default)]
    pub home_win_pct: Option<String>,
    #[serde(default)]
    pub over_pct: Option<String>,
}

/// Injury/weather row. This source keys by (home, away) raw text, in that
/// order; the matcher normalizes the named fields so the order is explicit
/// rather than inferred.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InjuryWeatherRow {
    pub home: String,
    pub away: String,
    #[serde(default)]
    pub injuries: Option<String>,
    #[serde(default)]
    pub weather: Option<String>,
}

/// Authoritative schedule/results row. Team fields may be codes or full
/// names; scores are absent until the game finishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub season: u16,
    pub week: u8,
    pub away: String,
    pub home: String,
    #[serde(default)]
    pub away_score: Option<i32>,
    #[serde(default)]
    pub home_score: Option<i32>,
}

pub fn parse_odds_board_json(raw: &str) -> Result<Vec<OddsBoardRow>> {
    parse_rows(raw).context("invalid odds board json")
}

pub fn parse_referee_trends_json(raw: &str) -> Result<Vec<RefereeTrendRow>> {
    parse_rows(raw).context("invalid referee trends json")
}

pub fn parse_injury_weather_json(raw: &str) -> Result<Vec<InjuryWeatherRow>> {
    parse_rows(raw).context("invalid injury/weather json")
}

pub fn parse_schedule_json(raw: &str) -> Result<Vec<ScheduleRow>> {
    parse_rows(raw).context("invalid schedule json")
}

// A literal `null` body (empty scrape) is an empty table, not an error.
fn parse_rows<T: serde::de::DeserializeOwned>(raw: &str) -> Result<Vec<T>, serde_json::Error> {
    let rows: Option<Vec<T>> = serde_json::from_str(raw)?;
    Ok(rows.unwrap_or_default())
}

pub fn load_odds_board(path: &Path) -> Result<Vec<OddsBoardRow>> {
    let raw = read(path)?;
    parse_odds_board_json(&raw)
}

pub fn load_referee_trends(path: &Path) -> Result<Vec<RefereeTrendRow>> {
    let raw = read(path)?;
    parse_referee_trends_json(&raw)
}

pub fn load_injury_weather(path: &Path) -> Result<Vec<InjuryWeatherRow>> {
    let raw = read(path)?;
    parse_injury_weather_json(&raw)
}

pub fn load_schedule(path: &Path) -> Result<Vec<ScheduleRow>> {
    let raw = read(path)?;
    parse_schedule_json(&raw)
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

/// Lenient timestamp parsing for quote snapshots: RFC 3339 first, then the
/// bare formats the scrapers actually emit.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{parse_odds_board_json, parse_schedule_json, parse_timestamp};

    #[test]
    fn null_body_is_empty_table() {
        assert!(parse_odds_board_json("null").expect("null parses").is_empty());
        assert!(parse_schedule_json("null").expect("null parses").is_empty());
    }

    #[test]
    fn odds_row_tolerates_missing_fields() {
        let raw = r#"[{"matchup":"NYJ @ NE","market":"Spread"}]"#;
        let rows = parse_odds_board_json(raw).expect("parses");
        assert_eq!(rows.len(), 1);
        assert!(rows[0].away.is_none());
        assert!(rows[0].bets_pct.is_none());
    }

    #[test]
    fn timestamp_accepts_rfc3339_and_bare_formats() {
        assert!(parse_timestamp("2025-11-09T17:25:00Z").is_some());
        assert!(parse_timestamp("2025-11-09 17:25").is_some());
        assert!(parse_timestamp("kickoff").is_none());
    }
}
