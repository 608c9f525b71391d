use serde::{Deserialize, Serialize};

use crate::config::AnalyzerConfig;
use crate::grading::{FinalScore, GradingResult, Pick, grade_pick};
use crate::market::{
    ConsensusFlags, Market, MarketQuote, MarketSignal, Side, compute_consensus,
};
use crate::matchup::{Matchup, MatchupKey};
use crate::matcher::{MatchCounts, count_unknown_team_rows, find_all, find_match};
use crate::sources::{InjuryWeatherRow, OddsBoardRow, RefereeTrendRow, ScheduleRow};
use crate::teams;

/// Referee/crew context with records parsed out of "W-L" text. Fields fail
/// soft: a malformed record blanks that field only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefereeContext {
    pub referee: Option<String>,
    pub games: Option<f64>,
    pub su: Option<(u32, u32)>,
    pub ats: Option<(u32, u32)>,
    pub ou: Option<(u32, u32)>,
    pub home_win_pct: Option<f64>,
    pub over_pct: Option<f64>,
}

impl RefereeContext {
    fn from_row(row: &RefereeTrendRow) -> RefereeContext {
        RefereeContext {
            referee: row.referee.clone(),
            games: row.games.as_deref().and_then(parse_count),
            su: row.su_record.as_deref().and_then(parse_record),
            ats: row.ats_record.as_deref().and_then(parse_record),
            ou: row.ou_record.as_deref().and_then(parse_record),
            home_win_pct: row.home_win_pct.as_deref().and_then(parse_pct_text),
            over_pct: row.over_pct.as_deref().and_then(parse_pct_text),
        }
    }
}

/// One matchup's assembled row: raw differentials, bands, consensus flags,
/// and context. All three market differentials stay independent; nothing
/// here averages across markets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekReportRow {
    pub matchup: MatchupKey,
    pub away: String,
    pub home: String,
    pub spread: Option<MarketSignal>,
    pub total: Option<MarketSignal>,
    pub moneyline: Option<MarketSignal>,
    /// Latest away-side spread line / O-U number, for phrasing picks.
    pub spread_line_away: Option<f64>,
    pub total_line: Option<f64>,
    /// Latest-minus-earliest line per market, when >=2 timestamped
    /// snapshots exist.
    pub spread_move: Option<f64>,
    pub total_move: Option<f64>,
    pub moneyline_move: Option<f64>,
    pub consensus: ConsensusFlags,
    pub referee: Option<RefereeContext>,
    pub injuries: Option<String>,
    pub weather: Option<String>,
    pub recommendation: Option<Pick>,
    pub result: Option<GradingResult>,
}

/// Row-scoped failure tallies for the whole run. One bad row never aborts
/// the week, it gets counted here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekReportStats {
    pub odds: MatchCounts,
    pub referee: MatchCounts,
    pub injury: MatchCounts,
    pub skipped_schedule_rows: usize,
    pub unknown_markets: usize,
    pub unparsed_quote_fields: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekReport {
    pub season: u16,
    pub week: u8,
    pub rows: Vec<WeekReportRow>,
    pub stats: WeekReportStats,
}

/// Assemble the weekly report from the four collaborator tables. Pure: same
/// tables in, same report out.
pub fn build_week_report(
    week: u8,
    schedule: &[ScheduleRow],
    odds: &[OddsBoardRow],
    referees: &[RefereeTrendRow],
    injuries: &[InjuryWeatherRow],
    cfg: &AnalyzerConfig,
) -> WeekReport {
    let mut stats = WeekReportStats::default();
    stats.odds.unknown_team = count_unknown_team_rows(odds);
    stats.referee.unknown_team = count_unknown_team_rows(referees);
    stats.injury.unknown_team = count_unknown_team_rows(injuries);
    let mut rows = Vec::new();

    for game in schedule
        .iter()
        .filter(|g| g.season == cfg.season && g.week == week)
    {
        let (away, home) = match (teams::normalize(&game.away), teams::normalize(&game.home)) {
            (Ok(away), Ok(home)) => (away, home),
            _ => {
                // Schedule rows are supposed to be authoritative; a bad one
                // is skipped and surfaced in the stats.
                stats.skipped_schedule_rows += 1;
                continue;
            }
        };
        let matchup = Matchup {
            season: game.season,
            week: game.week,
            away: away.to_string(),
            home: home.to_string(),
        };
        let key = matchup.key();

        let board = find_all(&key, odds, &mut stats.odds);
        let (signals, lines, moves) = derive_market_signals(&board, &mut stats);

        let consensus = compute_consensus(
            signals.spread.as_ref(),
            signals.total.as_ref(),
            signals.moneyline.as_ref(),
            cfg.consensus_threshold,
        );
        let recommendation =
            build_recommendation(&consensus, lines.spread_line_away, lines.total_line);

        let result = match (recommendation, game.away_score, game.home_score) {
            (Some(pick), Some(away_score), Some(home_score)) => Some(grade_pick(
                pick,
                FinalScore {
                    away: away_score,
                    home: home_score,
                },
            )),
            _ => None,
        };

        let referee =
            find_match(&key, referees, &mut stats.referee).map(RefereeContext::from_row);
        let injury_row = find_match(&key, injuries, &mut stats.injury);

        rows.push(WeekReportRow {
            matchup: key,
            away: matchup.away,
            home: matchup.home,
            spread: signals.spread,
            total: signals.total,
            moneyline: signals.moneyline,
            spread_line_away: lines.spread_line_away,
            total_line: lines.total_line,
            spread_move: moves.spread,
            total_move: moves.total,
            moneyline_move: moves.moneyline,
            consensus,
            referee,
            injuries: injury_row.and_then(|r| r.injuries.clone()),
            weather: injury_row.and_then(|r| r.weather.clone()),
            recommendation,
            result,
        });
    }

    WeekReport {
        season: cfg.season,
        week,
        rows,
        stats,
    }
}

#[derive(Default)]
struct Signals {
    spread: Option<MarketSignal>,
    total: Option<MarketSignal>,
    moneyline: Option<MarketSignal>,
}

#[derive(Default)]
struct Lines {
    spread_line_away: Option<f64>,
    total_line: Option<f64>,
}

#[derive(Default)]
struct Moves {
    spread: Option<f64>,
    total: Option<f64>,
    moneyline: Option<f64>,
}

fn derive_market_signals(
    board: &[&OddsBoardRow],
    stats: &mut WeekReportStats,
) -> (Signals, Lines, Moves) {
    let mut signals = Signals::default();
    let mut lines = Lines::default();
    let mut moves = Moves::default();

    for market in [Market::Spread, Market::Total, Market::Moneyline] {
        let mut quotes: Vec<MarketQuote> = Vec::new();
        for row in board {
            let Some(row_market) = Market::parse(&row.market) else {
                continue;
            };
            if row_market != market {
                continue;
            }
            let quote = MarketQuote::from_board_row(market, row);
            stats.unparsed_quote_fields += unparsed_fields(row, &quote);
            quotes.push(quote);
        }
        // Latest snapshot scores; earliest timestamped one anchors movement.
        let Some(latest) = quotes
            .iter()
            .max_by_key(|q| q.fetched_at)
        else {
            continue;
        };
        let movement = line_movement(&quotes);

        let signal = MarketSignal::from_quote(latest);
        match market {
            Market::Spread => {
                lines.spread_line_away = latest.line_away;
                moves.spread = movement;
                signals.spread = Some(signal);
            }
            Market::Total => {
                lines.total_line = latest.line_away;
                moves.total = movement;
                signals.total = Some(signal);
            }
            Market::Moneyline => {
                moves.moneyline = movement;
                signals.moneyline = Some(signal);
            }
        }
    }

    stats.unknown_markets += board
        .iter()
        .filter(|row| Market::parse(&row.market).is_none())
        .count();

    (signals, lines, moves)
}

fn line_movement(quotes: &[MarketQuote]) -> Option<f64> {
    let mut timestamped: Vec<&MarketQuote> = quotes
        .iter()
        .filter(|q| q.fetched_at.is_some() && q.line_away.is_some())
        .collect();
    if timestamped.len() < 2 {
        return None;
    }
    timestamped.sort_by_key(|q| q.fetched_at);
    let first = timestamped.first()?.line_away?;
    let last = timestamped.last()?.line_away?;
    Some(last - first)
}

/// Text fields that were present but yielded no number on either slot.
fn unparsed_fields(row: &OddsBoardRow, quote: &MarketQuote) -> usize {
    let mut n = 0;
    if present(&row.bets_pct) && quote.bets_away.is_none() && quote.bets_home.is_none() {
        n += 1;
    }
    if present(&row.money_pct) && quote.money_away.is_none() && quote.money_home.is_none() {
        n += 1;
    }
    if present(&row.line) && quote.line_away.is_none() && quote.line_home.is_none() {
        n += 1;
    }
    n
}

fn present(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}

/// Turn the consensus flags into a phrased pick. Spread+total consensus
/// together produce a combination bet; either alone produces a single leg.
fn build_recommendation(
    consensus: &ConsensusFlags,
    spread_line_away: Option<f64>,
    total_line: Option<f64>,
) -> Option<Pick> {
    // A consensus flag without a usable line cannot be phrased; that leg is
    // dropped rather than sinking the other one.
    let spread_leg = match (consensus.sharp_consensus, consensus.sharp_side, spread_line_away) {
        (true, Some(side), Some(line_away)) => {
            let line = match side {
                Side::Away => line_away,
                Side::Home => -line_away,
            };
            Some((side, line))
        }
        _ => None,
    };
    let total_leg = match (consensus.total_consensus, consensus.total_side, total_line) {
        (true, Some(direction), Some(line)) => Some((direction, line)),
        _ => None,
    };

    match (spread_leg, total_leg) {
        (Some(spread), Some(total)) => Some(Pick::Combo { spread, total }),
        (Some((side, line)), None) => Some(Pick::Spread { side, line }),
        (None, Some((direction, line))) => Some(Pick::Total { direction, line }),
        (None, None) => None,
    }
}

fn parse_record(raw: &str) -> Option<(u32, u32)> {
    let (wins, losses) = raw.trim().split_once('-')?;
    Some((
        wins.trim().parse::<u32>().ok()?,
        losses.trim().parse::<u32>().ok()?,
    ))
}

fn parse_count(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}

fn parse_pct_text(raw: &str) -> Option<f64> {
    raw.trim().trim_end_matches('%').trim().parse::<f64>().ok()
}
