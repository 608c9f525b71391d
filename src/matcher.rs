use serde::{Deserialize, Serialize};

use crate::matchup::MatchupKey;
use crate::sources::{InjuryWeatherRow, OddsBoardRow, RefereeTrendRow, ScheduleRow};
use crate::teams;

/// How a source row names its teams.
///
/// `Fields` is the normal case (separate away/home columns) and only ever
/// takes the exact-key path. `FreeText` is a single matchup string and may
/// fall back to token matching when the exact path misses.
#[derive(Debug, Clone, Copy)]
pub enum RowTeams<'a> {
    Fields { away: &'a str, home: &'a str },
    FreeText(&'a str),
}

pub trait SourceTeams {
    fn teams(&self) -> RowTeams<'_>;
}

impl SourceTeams for OddsBoardRow {
    fn teams(&self) -> RowTeams<'_> {
        match (self.away.as_deref(), self.home.as_deref()) {
            (Some(away), Some(home)) => RowTeams::Fields { away, home },
            _ => RowTeams::FreeText(self.matchup.as_deref().unwrap_or("")),
        }
    }
}

impl SourceTeams for RefereeTrendRow {
    fn teams(&self) -> RowTeams<'_> {
        RowTeams::FreeText(&self.query)
    }
}

impl SourceTeams for InjuryWeatherRow {
    fn teams(&self) -> RowTeams<'_> {
        // Source JSON lists home first; the named fields carry the order.
        RowTeams::Fields {
            away: &self.away,
            home: &self.home,
        }
    }
}

impl SourceTeams for ScheduleRow {
    fn teams(&self) -> RowTeams<'_> {
        RowTeams::Fields {
            away: &self.away,
            home: &self.home,
        }
    }
}

/// Aggregate data-quality tallies for one weekly run. One bad row never
/// aborts the run; it shows up here instead of silently zeroing a field.
/// `matched`/`unmatched` count lookups; `unknown_team` counts rows, filled
/// once per table by `count_unknown_team_rows`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCounts {
    pub matched: usize,
    pub unmatched: usize,
    pub unknown_team: usize,
}

impl MatchCounts {
    pub fn record_lookup(&mut self, hit: bool) {
        if hit {
            self.matched += 1;
        } else {
            self.unmatched += 1;
        }
    }

    pub fn merge(&mut self, other: MatchCounts) {
        self.matched += other.matched;
        self.unmatched += other.unmatched;
        self.unknown_team += other.unknown_team;
    }
}

/// Find the single row for a canonical matchup key, or `None`.
///
/// Exact-key matching (normalize both team fields, rebuild the key) is the
/// primary path. The token fallback applies only to free-text rows, and it
/// requires BOTH teams to resolve in away-then-home order; one shared team
/// is never enough, and a reversed key never matches.
pub fn find_match<'a, T: SourceTeams>(
    key: &MatchupKey,
    rows: &'a [T],
    counts: &mut MatchCounts,
) -> Option<&'a T> {
    let found = scan(key, rows).into_iter().next();
    counts.record_lookup(found.is_some());
    found
}

/// All rows for a matchup (e.g. the odds board carries one row per market
/// per snapshot). Counts one lookup, hit iff at least one row qualified.
pub fn find_all<'a, T: SourceTeams>(
    key: &MatchupKey,
    rows: &'a [T],
    counts: &mut MatchCounts,
) -> Vec<&'a T> {
    let found = scan(key, rows);
    counts.record_lookup(!found.is_empty());
    found
}

/// Rows whose named team fields fail normalization. Tallied once per table
/// so the count stays a row count no matter how many lookups scan it.
pub fn count_unknown_team_rows<T: SourceTeams>(rows: &[T]) -> usize {
    rows.iter()
        .filter(|row| row_key_exact(row.teams()).is_err())
        .count()
}

fn scan<'a, T: SourceTeams>(key: &MatchupKey, rows: &'a [T]) -> Vec<&'a T> {
    let mut exact: Vec<&'a T> = Vec::new();
    for row in rows {
        if let Ok(Some(row_key)) = row_key_exact(row.teams())
            && &row_key == key
        {
            exact.push(row);
        }
    }
    if !exact.is_empty() {
        return exact;
    }

    let Some((away, home)) = key.sides() else {
        return Vec::new();
    };
    rows.iter()
        .filter(|row| match row.teams() {
            RowTeams::FreeText(text) => free_text_matches(text, away, home),
            RowTeams::Fields { .. } => false,
        })
        .collect()
}

fn row_key_exact(teams: RowTeams<'_>) -> Result<Option<MatchupKey>, teams::UnknownTeamError> {
    match teams {
        RowTeams::Fields { away, home } => {
            let away = teams::normalize(away)?;
            let home = teams::normalize(home)?;
            Ok(Some(crate::matchup::build_key(away, home)))
        }
        RowTeams::FreeText(text) => {
            let Some((left, right)) = split_matchup_text(text) else {
                return Ok(None);
            };
            // Exact path only when both whole sides are recognizable names;
            // anything fuzzier is the fallback's job.
            match (teams::try_normalize(left), teams::try_normalize(right)) {
                (Some(away), Some(home)) => Ok(Some(crate::matchup::build_key(away, home))),
                _ => Ok(None),
            }
        }
    }
}

fn free_text_matches(text: &str, away: &str, home: &str) -> bool {
    if let Some((left, right)) = split_matchup_text(text) {
        let left_codes = recognized_codes(left);
        let right_codes = recognized_codes(right);
        return left_codes == [away] && right_codes == [home];
    }
    // No separator: take recognizable team tokens in order of appearance
    // and demand exactly away-then-home. Order stands in for direction, so
    // a reversed mention stays a miss.
    recognized_codes(text) == [away, home]
}

fn split_matchup_text(text: &str) -> Option<(&str, &str)> {
    if let Some((left, right)) = text.split_once('@') {
        return Some((left.trim(), right.trim()));
    }
    for sep in [" at ", " AT ", " At ", " vs. ", " vs ", " VS "] {
        if let Some((left, right)) = text.split_once(sep) {
            return Some((left.trim(), right.trim()));
        }
    }
    None
}

/// Distinct canonical codes recognized in `text`, in order of appearance.
/// Tries the longest token window first so "New York Jets" resolves as one
/// name rather than stranding "New York".
fn recognized_codes(text: &str) -> Vec<&'static str> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut codes: Vec<&'static str> = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let mut advanced = false;
        for window in (1..=3.min(tokens.len() - i)).rev() {
            let candidate = tokens[i..i + window].join(" ");
            if let Some(code) = teams::try_normalize(&candidate) {
                if !codes.contains(&code) {
                    codes.push(code);
                }
                i += window;
                advanced = true;
                break;
            }
        }
        if !advanced {
            i += 1;
        }
    }
    codes
}

#[cfg(test)]
mod tests {
    use super::{MatchCounts, count_unknown_team_rows, find_match, free_text_matches};
    use crate::matchup::build_key;
    use crate::sources::{OddsBoardRow, RefereeTrendRow};

    fn odds_row(away: &str, home: &str) -> OddsBoardRow {
        OddsBoardRow {
            away: Some(away.to_string()),
            home: Some(home.to_string()),
            matchup: None,
            market: "Spread".to_string(),
            line: None,
            bets_pct: None,
            money_pct: None,
            timestamp: None,
        }
    }

    #[test]
    fn exact_key_match_after_normalization() {
        let rows = vec![
            odds_row("New York Jets", "New England Patriots"),
            odds_row("Kansas City Chiefs", "Buffalo Bills"),
        ];
        let mut counts = MatchCounts::default();
        let key = build_key("NYJ", "NE");
        let hit = find_match(&key, &rows, &mut counts).expect("row matches");
        assert_eq!(hit.away.as_deref(), Some("New York Jets"));
        assert_eq!(counts.matched, 1);
    }

    #[test]
    fn reversed_key_never_matches() {
        let rows = vec![odds_row("New York Jets", "New England Patriots")];
        let mut counts = MatchCounts::default();
        let key = build_key("NE", "NYJ");
        assert!(find_match(&key, &rows, &mut counts).is_none());
        assert_eq!(counts.unmatched, 1);
    }

    #[test]
    fn unknown_team_rows_are_counted_and_skipped() {
        let rows = vec![odds_row("Hartford Whalers", "New England Patriots")];
        assert_eq!(count_unknown_team_rows(&rows), 1);
        let mut counts = MatchCounts::default();
        let key = build_key("NYJ", "NE");
        assert!(find_match(&key, &rows, &mut counts).is_none());
    }

    #[test]
    fn unknown_team_row_counts_once_no_matter_how_many_lookups() {
        let rows = vec![
            odds_row("Hartford Whalers", "New England Patriots"),
            odds_row("Kansas City Chiefs", "Buffalo Bills"),
        ];
        // One bad row stays one bad row across a whole slate of lookups.
        assert_eq!(count_unknown_team_rows(&rows), 1);

        let mut counts = MatchCounts::default();
        for key in [
            build_key("NYJ", "NE"),
            build_key("KC", "BUF"),
            build_key("DAL", "PHI"),
        ] {
            let _ = find_match(&key, &rows, &mut counts);
        }
        assert_eq!(counts.unknown_team, 0);
        assert_eq!(counts.matched, 1);
        assert_eq!(counts.unmatched, 2);
    }

    #[test]
    fn free_text_fallback_requires_both_teams() {
        assert!(free_text_matches(
            "Jets at Patriots referee trends",
            "NYJ",
            "NE"
        ));
        // One shared team must never be enough.
        assert!(!free_text_matches("Jets bye week notes", "NYJ", "NE"));
        // Reversed order is a different game, not a fallback.
        assert!(!free_text_matches("Patriots at Jets", "NYJ", "NE"));
    }

    #[test]
    fn referee_query_matches_via_fallback() {
        let rows = vec![
            RefereeTrendRow {
                query: "New York Jets at New England Patriots crew".to_string(),
                referee: Some("C. Blakeman".to_string()),
                games: None,
                su_record: None,
                ats_record: None,
                ou_record: None,
                home_win_pct: None,
                over_pct: None,
            },
            RefereeTrendRow {
                query: "Bills at Dolphins crew".to_string(),
                referee: None,
                games: None,
                su_record: None,
                ats_record: None,
                ou_record: None,
                home_win_pct: None,
                over_pct: None,
            },
        ];
        let mut counts = MatchCounts::default();
        let key = build_key("NYJ", "NE");
        let hit = find_match(&key, &rows, &mut counts).expect("fallback matches");
        assert_eq!(hit.referee.as_deref(), Some("C. Blakeman"));
    }
}
