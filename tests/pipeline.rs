use rand::SeedableRng;
use rand::rngs::StdRng;
use rusqlite::Connection;

use nfl_sharp::config::AnalyzerConfig;
use nfl_sharp::grading::{FinalScore, Outcome, RecommendationRecord, grade_recommendation};
use nfl_sharp::ledger;
use nfl_sharp::matcher::{MatchCounts, find_match};
use nfl_sharp::report::build_week_report;
use nfl_sharp::synth::generate_week;

// End-to-end over a synthetic slate: generate tables, assemble the report,
// log the picks, grade them against the same schedule.
#[test]
fn synthetic_week_flows_through_report_and_grading() {
    let mut rng = StdRng::seed_from_u64(42);
    let tables = generate_week(2025, 10, &mut rng, true);

    let cfg = AnalyzerConfig {
        season: 2025,
        consensus_threshold: 10.0,
        ..AnalyzerConfig::default()
    };
    let report = build_week_report(
        10,
        &tables.schedule,
        &tables.odds,
        &tables.referees,
        &tables.injuries,
        &cfg,
    );

    assert_eq!(report.rows.len(), 16);
    assert_eq!(report.stats.odds.matched, 16);
    assert_eq!(report.stats.odds.unknown_team, 0);
    assert_eq!(report.stats.skipped_schedule_rows, 0);
    // Every game carries all three market signals.
    for row in &report.rows {
        assert!(row.spread.is_some());
        assert!(row.total.is_some());
        assert!(row.moneyline.is_some());
        assert!(row.referee.is_some());
        assert!(row.injuries.is_some());
    }

    let conn = Connection::open_in_memory().expect("db");
    ledger::init_schema(&conn).expect("schema");

    let mut logged = 0usize;
    for row in &report.rows {
        let Some(pick) = row.recommendation else {
            continue;
        };
        let record = RecommendationRecord::new(2025, 10, row.matchup.clone(), pick);
        assert!(ledger::record_pick(&conn, &record).expect("insert"));
        logged += 1;
    }

    let mut counts = MatchCounts::default();
    for record in ledger::load_week(&conn, 2025, 10).expect("load") {
        let game =
            find_match(&record.matchup, &tables.schedule, &mut counts).expect("schedule row");
        let score = FinalScore {
            away: game.away_score.expect("scores generated"),
            home: game.home_score.expect("scores generated"),
        };
        let result = grade_recommendation(&record.recommendation, score);
        // Logged phrases always come from Pick::phrase, so they parse back.
        assert_ne!(result.outcome, Outcome::NoBet);
        assert!(ledger::apply_grade(
            &conn,
            2025,
            10,
            &record.matchup,
            record.bet_type,
            &result
        )
        .expect("grade"));
    }

    let graded: usize = [
        Outcome::Win,
        Outcome::Loss,
        Outcome::Push,
        Outcome::WinPush,
    ]
    .into_iter()
    .map(|o| ledger::week_outcome_counts(&conn, 2025, 10, o).expect("count") as usize)
    .sum();
    assert_eq!(graded, logged);
}
