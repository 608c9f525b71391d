use rand::Rng;
use rand::seq::SliceRandom;

use crate::sources::{InjuryWeatherRow, OddsBoardRow, RefereeTrendRow, ScheduleRow};
use crate::teams;

/// Synthetic source tables for one week: a full 16-game slate with odds
/// snapshots, referee queries, and injury/weather rows shaped exactly like
/// the scraped feeds. Used by the fake_week binary, benches, and offline
/// demo runs.
#[derive(Debug, Clone)]
pub struct SynthWeek {
    pub schedule: Vec<ScheduleRow>,
    pub odds: Vec<OddsBoardRow>,
    pub referees: Vec<RefereeTrendRow>,
    pub injuries: Vec<InjuryWeatherRow>,
}

const REFEREES: &[&str] = &[
    "C. Blakeman",
    "S. Hochuli",
    "B. Allen",
    "C. Cheffers",
    "A. Eccles",
    "T. Corrente",
];

const WEATHER: &[&str] = &[
    "Clear, 55F",
    "Rain, wind 15mph",
    "Dome",
    "Snow flurries, 28F",
    "Overcast, 40F",
];

pub fn generate_week(season: u16, week: u8, rng: &mut impl Rng, with_scores: bool) -> SynthWeek {
    let mut codes: Vec<&'static str> = teams::all_codes().collect();
    codes.shuffle(rng);

    let mut schedule = Vec::new();
    let mut odds = Vec::new();
    let mut referees = Vec::new();
    let mut injuries = Vec::new();

    for pair in codes.chunks_exact(2) {
        let (away, home) = (pair[0], pair[1]);
        let away_name = teams::display_name(away).unwrap_or(away);
        let home_name = teams::display_name(home).unwrap_or(home);

        let spread = (rng.gen_range(-20..=20) as f64) / 2.0;
        let total = 37.0 + (rng.gen_range(0..=24) as f64) / 2.0;

        let (away_score, home_score) = if with_scores {
            (Some(rng.gen_range(3..=45)), Some(rng.gen_range(3..=45)))
        } else {
            (None, None)
        };
        schedule.push(ScheduleRow {
            season,
            week,
            away: away.to_string(),
            home: home.to_string(),
            away_score,
            home_score,
        });

        // Two timestamped snapshots per market so line movement shows up.
        for (market, line_text) in [
            ("Spread", format!("{:+} | {:+}", spread, -spread)),
            ("Total", format!("{total}")),
            ("Moneyline", String::new()),
        ] {
            for (hour, drift) in [(9, 0.0), (16, half_point(rng))] {
                let moved = match market {
                    "Spread" => format!("{:+} | {:+}", spread + drift, -(spread + drift)),
                    "Total" => format!("{}", total + drift),
                    _ => line_text.clone(),
                };
                let bets_away = rng.gen_range(25..=75);
                let money_away = (bets_away as i64 + rng.gen_range(-20..=20)).clamp(5, 95);
                odds.push(OddsBoardRow {
                    away: Some(away_name.to_string()),
                    home: Some(home_name.to_string()),
                    matchup: None,
                    market: market.to_string(),
                    line: (!moved.is_empty()).then_some(moved),
                    bets_pct: Some(format!("{bets_away}% | {}%", 100 - bets_away)),
                    money_pct: Some(format!("{money_away}% | {}%", 100 - money_away)),
                    timestamp: Some(format!("2025-11-09T{hour:02}:00:00Z")),
                });
            }
        }

        let wins = rng.gen_range(4..=10u32);
        referees.push(RefereeTrendRow {
            query: format!("{away_name} at {home_name} referee trends"),
            referee: Some(REFEREES[rng.gen_range(0..REFEREES.len())].to_string()),
            games: Some("14".to_string()),
            su_record: Some(format!("{wins}-{}", 14 - wins)),
            ats_record: Some(format!("{}-{}", 14 - wins, wins)),
            ou_record: Some(format!("{wins}-{}", 14 - wins)),
            home_win_pct: Some(format!("{}%", rng.gen_range(35..=65))),
            over_pct: Some(format!("{}%", rng.gen_range(35..=65))),
        });

        // Injury feed keys by (home, away), matching the real source.
        injuries.push(InjuryWeatherRow {
            home: home_name.to_string(),
            away: away_name.to_string(),
            injuries: Some(format!(
                "{home_name}: WR questionable; {away_name}: LT out"
            )),
            weather: Some(WEATHER[rng.gen_range(0..WEATHER.len())].to_string()),
        });
    }

    SynthWeek {
        schedule,
        odds,
        referees,
        injuries,
    }
}

fn half_point(rng: &mut impl Rng) -> f64 {
    (rng.gen_range(-3..=3) as f64) / 2.0
}

#[cfg(test)]
mod tests {
    use super::generate_week;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn full_slate_with_three_markets_each() {
        let mut rng = StdRng::seed_from_u64(7);
        let week = generate_week(2025, 10, &mut rng, false);
        assert_eq!(week.schedule.len(), 16);
        // 3 markets x 2 snapshots per game.
        assert_eq!(week.odds.len(), 16 * 6);
        assert_eq!(week.referees.len(), 16);
        assert_eq!(week.injuries.len(), 16);
        assert!(week.schedule.iter().all(|g| g.away_score.is_none()));
    }
}
