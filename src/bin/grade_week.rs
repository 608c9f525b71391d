use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};

use nfl_sharp::config::AnalyzerConfig;
use nfl_sharp::grading::{FinalScore, Outcome, grade_recommendation};
use nfl_sharp::ledger;
use nfl_sharp::matcher::{MatchCounts, find_match};
use nfl_sharp::sources;

// Usage: grade_week <week> [data_dir]
//
// Loads final scores from <data_dir>/schedule.json, grades every ungraded
// pick in the week's ledger, and prints the tally. Already-graded rows are
// never touched again.
fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cfg = AnalyzerConfig::from_env();

    let week: u8 = std::env::args()
        .nth(1)
        .context("usage: grade_week <week> [data_dir]")?
        .parse()
        .context("week must be a number")?;
    let data_dir = std::env::args()
        .nth(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));

    let schedule = sources::load_schedule(&data_dir.join("schedule.json"))?;

    let ledger_path = cfg
        .ledger_path
        .clone()
        .or_else(ledger::default_ledger_path)
        .context("no ledger path available")?;
    let conn = ledger::open_ledger(&ledger_path)?;
    let records = ledger::load_week(&conn, cfg.season, week)?;
    if records.is_empty() {
        println!("[INFO] No picks logged for week {week}");
        return Ok(());
    }

    let mut counts = MatchCounts::default();
    let mut tally: HashMap<&'static str, u32> = HashMap::new();
    let mut pending = 0usize;

    for record in &records {
        if record.outcome.is_some() {
            continue;
        }
        // Same matcher semantics as the report join: exact key, no
        // reversed-order forgiveness.
        let Some(game) = find_match(&record.matchup, &schedule, &mut counts) else {
            println!(
                "[WARN] {} has no schedule row yet; left ungraded",
                record.matchup
            );
            pending += 1;
            continue;
        };
        let (Some(away_score), Some(home_score)) = (game.away_score, game.home_score) else {
            pending += 1;
            continue;
        };
        let result = grade_recommendation(
            &record.recommendation,
            FinalScore {
                away: away_score,
                home: home_score,
            },
        );
        if result.outcome == Outcome::NoBet {
            println!(
                "[WARN] Unrecognized recommendation text {:?}; graded NO_BET",
                record.recommendation
            );
        }
        if ledger::apply_grade(
            &conn,
            record.season,
            record.week,
            &record.matchup,
            record.bet_type,
            &result,
        )? {
            *tally.entry(result.outcome.label()).or_insert(0) += 1;
        }
    }

    for outcome in [
        Outcome::Win,
        Outcome::Loss,
        Outcome::Push,
        Outcome::WinPush,
        Outcome::NoBet,
    ] {
        let graded_now = tally.get(outcome.label()).copied().unwrap_or(0);
        let total = ledger::week_outcome_counts(&conn, cfg.season, week, outcome)?;
        if total > 0 || graded_now > 0 {
            println!("[INFO] {:<9} {total} (+{graded_now} this run)", outcome.label());
        }
    }
    if pending > 0 {
        println!("[INFO] {pending} picks still waiting on final scores");
    }

    Ok(())
}
