use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use nfl_sharp::config::AnalyzerConfig;
use nfl_sharp::export::{write_report_json, write_report_xlsx};
use nfl_sharp::grading::RecommendationRecord;
use nfl_sharp::ledger;
use nfl_sharp::report::build_week_report;
use nfl_sharp::sources;

// Usage: weekly_report <week> [data_dir] [out_dir]
//
// Reads the scraped tables from <data_dir>/{schedule,odds_board,
// referee_trends,injuries}.json, writes the assembled report next to them,
// and logs any consensus picks into the ledger.
fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cfg = AnalyzerConfig::from_env();

    let week: u8 = std::env::args()
        .nth(1)
        .context("usage: weekly_report <week> [data_dir] [out_dir]")?
        .parse()
        .context("week must be a number")?;
    let data_dir = arg_path(2, "data");
    let out_dir = arg_path(3, "out");

    let schedule = sources::load_schedule(&data_dir.join("schedule.json"))?;
    let odds = load_or_empty(&data_dir.join("odds_board.json"), sources::load_odds_board);
    let referees = load_or_empty(
        &data_dir.join("referee_trends.json"),
        sources::load_referee_trends,
    );
    let injuries = load_or_empty(
        &data_dir.join("injuries.json"),
        sources::load_injury_weather,
    );

    let report = build_week_report(week, &schedule, &odds, &referees, &injuries, &cfg);

    println!(
        "[INFO] Week {} of {}: {} matchups assembled",
        report.week,
        report.season,
        report.rows.len()
    );
    for row in &report.rows {
        let spread = row
            .spread
            .and_then(|s| s.differential_away)
            .map(|d| format!("{d:+.1}"))
            .unwrap_or_else(|| "--".to_string());
        let pick = row
            .recommendation
            .map(|p| p.phrase())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "[INFO]   {:<8} spread diff {:>6}  band {:<8} pick: {}",
            row.matchup.as_str(),
            spread,
            row.spread.map(|s| s.band.label()).unwrap_or("none"),
            pick
        );
    }
    let stats = &report.stats;
    println!(
        "[INFO] Data quality: odds {}/{} matched, referees {}/{}, injuries {}/{}",
        stats.odds.matched,
        stats.odds.matched + stats.odds.unmatched,
        stats.referee.matched,
        stats.referee.matched + stats.referee.unmatched,
        stats.injury.matched,
        stats.injury.matched + stats.injury.unmatched,
    );
    if stats.odds.unknown_team + stats.referee.unknown_team + stats.injury.unknown_team > 0 {
        println!(
            "[WARN] {} rows carried unknown team names and were skipped",
            stats.odds.unknown_team + stats.referee.unknown_team + stats.injury.unknown_team
        );
    }
    if stats.unparsed_quote_fields > 0 {
        println!(
            "[WARN] {} quote fields failed to parse (left blank, not zeroed)",
            stats.unparsed_quote_fields
        );
    }

    let json_path = out_dir.join(format!("week_{week:02}_report.json"));
    write_report_json(&json_path, &report)?;
    let xlsx_path = out_dir.join(format!("week_{week:02}_report.xlsx"));
    write_report_xlsx(&xlsx_path, &report)?;
    println!(
        "[INFO] Wrote {} and {}",
        json_path.display(),
        xlsx_path.display()
    );

    if cfg.log_recommendations {
        record_picks(&cfg, &report)?;
    }

    Ok(())
}

fn record_picks(cfg: &AnalyzerConfig, report: &nfl_sharp::report::WeekReport) -> Result<()> {
    let Some(path) = cfg
        .ledger_path
        .clone()
        .or_else(ledger::default_ledger_path)
    else {
        println!("[WARN] No ledger path available; picks not logged");
        return Ok(());
    };
    let conn = ledger::open_ledger(&path)?;

    let mut logged = 0usize;
    for row in &report.rows {
        let Some(pick) = row.recommendation else {
            continue;
        };
        let mut record =
            RecommendationRecord::new(report.season, report.week, row.matchup.clone(), pick);
        record.confidence = strongest_differential(row);
        if ledger::record_pick(&conn, &record)? {
            logged += 1;
        }
    }
    println!("[INFO] Logged {logged} picks to {}", path.display());
    Ok(())
}

// Confidence is just the strongest raw differential behind the pick; the
// per-market bands stay visible in the report itself.
fn strongest_differential(row: &nfl_sharp::report::WeekReportRow) -> Option<f64> {
    [row.spread, row.moneyline, row.total]
        .into_iter()
        .filter_map(|signal| signal.and_then(|s| s.differential_away))
        .map(f64::abs)
        .max_by(|a, b| a.total_cmp(b))
}

fn arg_path(idx: usize, default: &str) -> PathBuf {
    std::env::args()
        .nth(idx)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

fn load_or_empty<T>(path: &Path, loader: fn(&Path) -> Result<Vec<T>>) -> Vec<T> {
    match loader(path) {
        Ok(rows) => rows,
        Err(err) => {
            println!("[WARN] {}: {err:#}; treating as empty", path.display());
            Vec::new()
        }
    }
}
