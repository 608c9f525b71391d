use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;

use nfl_sharp::config::{AnalyzerConfig, env_bool};
use nfl_sharp::synth::generate_week;

// Usage: fake_week <week> [out_dir]
//
// Writes a synthetic week of source tables for offline runs. Set
// SYNTH_WITH_SCORES=1 to include final scores (so grade_week has something
// to chew on) and SYNTH_SEED to make the slate reproducible.
fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cfg = AnalyzerConfig::from_env();

    let week: u8 = std::env::args()
        .nth(1)
        .context("usage: fake_week <week> [out_dir]")?
        .parse()
        .context("week must be a number")?;
    let out_dir = std::env::args()
        .nth(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));

    let with_scores = env_bool("SYNTH_WITH_SCORES", false);
    let mut rng = match std::env::var("SYNTH_SEED")
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
    {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let tables = generate_week(cfg.season, week, &mut rng, with_scores);

    fs::create_dir_all(&out_dir).with_context(|| format!("create {}", out_dir.display()))?;
    write_json(&out_dir.join("schedule.json"), &tables.schedule)?;
    write_json(&out_dir.join("odds_board.json"), &tables.odds)?;
    write_json(&out_dir.join("referee_trends.json"), &tables.referees)?;
    write_json(&out_dir.join("injuries.json"), &tables.injuries)?;

    println!(
        "[INFO] Wrote synthetic week {week} ({} games, scores: {}) to {}",
        tables.schedule.len(),
        if with_scores { "yes" } else { "no" },
        out_dir.display()
    );
    Ok(())
}

fn write_json<T: serde::Serialize>(path: &std::path::Path, rows: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(rows).context("serialize table")?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
