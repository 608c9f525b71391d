use std::fs;
use std::path::PathBuf;

use nfl_sharp::config::AnalyzerConfig;
use nfl_sharp::grading::Outcome;
use nfl_sharp::market::{Band, OverUnder, Side};
use nfl_sharp::report::build_week_report;
use nfl_sharp::sources::{
    parse_injury_weather_json, parse_odds_board_json, parse_referee_trends_json,
    parse_schedule_json,
};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn fixture_report() -> nfl_sharp::report::WeekReport {
    let schedule = parse_schedule_json(&read_fixture("schedule.json")).expect("schedule parses");
    let odds = parse_odds_board_json(&read_fixture("odds_board.json")).expect("odds parse");
    let referees =
        parse_referee_trends_json(&read_fixture("referee_trends.json")).expect("referees parse");
    let injuries =
        parse_injury_weather_json(&read_fixture("injuries.json")).expect("injuries parse");

    let cfg = AnalyzerConfig {
        season: 2025,
        consensus_threshold: 10.0,
        ..AnalyzerConfig::default()
    };
    build_week_report(10, &schedule, &odds, &referees, &injuries, &cfg)
}

#[test]
fn assembles_only_the_requested_week() {
    let report = fixture_report();
    assert_eq!(report.rows.len(), 2);
    assert_eq!(report.rows[0].matchup.as_str(), "NYJ@NE");
    assert_eq!(report.rows[1].matchup.as_str(), "KC@BUF");
}

#[test]
fn differentials_come_from_the_latest_snapshot() {
    let report = fixture_report();
    let row = &report.rows[0];

    let spread = row.spread.expect("spread signal");
    assert_eq!(spread.differential_away, Some(12.0));
    assert_eq!(spread.band, Band::Moderate);

    let moneyline = row.moneyline.expect("moneyline signal");
    assert_eq!(moneyline.differential_away, Some(11.0));

    let total = row.total.expect("total signal");
    assert_eq!(total.differential_away, Some(-15.0));
    assert_eq!(total.band, Band::Strong);

    // The three markets stay independent; movement only where two
    // timestamped snapshots exist.
    assert_eq!(row.spread_move, Some(-0.5));
    assert_eq!(row.total_move, None);
    assert_eq!(row.moneyline_move, None);
}

#[test]
fn consensus_flags_and_recommendation() {
    let report = fixture_report();
    let row = &report.rows[0];

    assert!(row.consensus.sharp_consensus);
    assert_eq!(row.consensus.sharp_side, Some(Side::Away));
    assert!(row.consensus.total_consensus);
    assert_eq!(row.consensus.total_side, Some(OverUnder::Under));

    let pick = row.recommendation.expect("combo pick");
    assert_eq!(pick.phrase(), "AWAY on spread -3.5 and UNDER 44.5");

    // Final score is on the schedule row, so the pick grades in-report.
    let result = row.result.expect("graded");
    assert_eq!(result.outcome, Outcome::Win);
}

#[test]
fn missing_money_pct_is_blank_not_zero() {
    let report = fixture_report();
    let row = &report.rows[1];

    let spread = row.spread.expect("spread row exists for KC@BUF");
    assert_eq!(spread.differential_away, None);
    assert_eq!(spread.band, Band::None);
    assert!(!row.consensus.sharp_consensus);
    assert!(row.recommendation.is_none());
    assert_eq!(report.stats.unparsed_quote_fields, 1);
}

#[test]
fn context_rows_join_per_matchup() {
    let report = fixture_report();
    let row = &report.rows[0];

    let referee = row.referee.as_ref().expect("referee context");
    assert_eq!(referee.referee.as_deref(), Some("C. Blakeman"));
    assert_eq!(referee.su, Some((9, 5)));
    assert_eq!(referee.over_pct, Some(57.0));
    assert!(row.injuries.as_deref().is_some_and(|s| s.contains("NYJ")));
    assert!(row.weather.is_some());

    // The second game has no referee or injury rows; fields stay blank.
    let other = &report.rows[1];
    assert!(other.referee.is_none());
    assert!(other.injuries.is_none());

    assert_eq!(report.stats.odds.matched, 2);
    assert_eq!(report.stats.referee.matched, 1);
    assert_eq!(report.stats.referee.unmatched, 1);
    assert_eq!(report.stats.injury.matched, 1);
    assert_eq!(report.stats.injury.unmatched, 1);
}
