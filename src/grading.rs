use serde::{Deserialize, Serialize};

use crate::market::{OverUnder, Side};
use crate::matchup::MatchupKey;

/// Line sign convention, stated once: a NEGATIVE line marks the favorite.
/// A pick's line is quoted for the picked side ("AWAY on spread -3.5"
/// means the away team laying 3.5). Both sides grade through the same
/// signed cover formula; there is no separate home-side branch.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BetType {
    Spread,
    Total,
    Combo,
}

impl BetType {
    pub fn label(self) -> &'static str {
        match self {
            BetType::Spread => "spread",
            BetType::Total => "total",
            BetType::Combo => "combo",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
    Push,
    /// Combination bet where one leg pushed and the other won. Kept
    /// distinct from Win so the ledger doesn't flatten refund-grade legs.
    WinPush,
    NoBet,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Win => "WIN",
            Outcome::Loss => "LOSS",
            Outcome::Push => "PUSH",
            Outcome::WinPush => "WIN-PUSH",
            Outcome::NoBet => "NO_BET",
        }
    }

    pub fn parse(raw: &str) -> Option<Outcome> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "WIN" => Some(Outcome::Win),
            "LOSS" => Some(Outcome::Loss),
            "PUSH" => Some(Outcome::Push),
            "WIN-PUSH" | "WIN_PUSH" => Some(Outcome::WinPush),
            "NO_BET" | "NO BET" => Some(Outcome::NoBet),
            _ => None,
        }
    }
}

/// Signed margin kept for diagnostics: for spreads it is the cover value,
/// for totals the distance from the line, for combos the binding (lowest)
/// leg margin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradingResult {
    pub outcome: Outcome,
    pub margin: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalScore {
    pub away: i32,
    pub home: i32,
}

impl FinalScore {
    /// Away-minus-home, the one signed margin every grade derives from.
    pub fn signed_margin(self) -> f64 {
        f64::from(self.away - self.home)
    }

    pub fn total(self) -> f64 {
        f64::from(self.away + self.home)
    }
}

/// A parsed recommendation. Parsing is deterministic over a fixed phrase
/// set; anything outside it grades NO_BET rather than guessing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Pick {
    Spread { side: Side, line: f64 },
    Total { direction: OverUnder, line: f64 },
    Combo { spread: (Side, f64), total: (OverUnder, f64) },
}

impl Pick {
    pub fn bet_type(self) -> BetType {
        match self {
            Pick::Spread { .. } => BetType::Spread,
            Pick::Total { .. } => BetType::Total,
            Pick::Combo { .. } => BetType::Combo,
        }
    }

    /// Render in the canonical phrasing the parser recognizes, so logged
    /// recommendations always round-trip.
    pub fn phrase(self) -> String {
        match self {
            Pick::Spread { side, line } => format!("{} on spread {:+}", side.label(), line),
            Pick::Total { direction, line } => format!("{} {}", direction.label(), line),
            Pick::Combo { spread, total } => format!(
                "{} on spread {:+} and {} {}",
                spread.0.label(),
                spread.1,
                total.0.label(),
                total.1
            ),
        }
    }
}

/// Recognized phrasings:
///   "AWAY on spread -3.5" / "HOME on spread +3.5"
///   "OVER 43.5" / "UNDER 43.5"
///   "<spread leg> and <total leg>"  (combination)
pub fn parse_recommendation(text: &str) -> Option<Pick> {
    let trimmed = text.trim();
    if let Some((left, right)) = split_once_word(trimmed, "and") {
        let spread = parse_spread_leg(left)?;
        let total = parse_total_leg(right)?;
        return Some(Pick::Combo { spread, total });
    }
    if let Some((side, line)) = parse_spread_leg(trimmed) {
        return Some(Pick::Spread { side, line });
    }
    if let Some((direction, line)) = parse_total_leg(trimmed) {
        return Some(Pick::Total { direction, line });
    }
    None
}

fn parse_spread_leg(text: &str) -> Option<(Side, f64)> {
    let mut words = text.split_whitespace();
    let side = match words.next()?.to_ascii_uppercase().as_str() {
        "AWAY" => Side::Away,
        "HOME" => Side::Home,
        _ => return None,
    };
    if !words.next()?.eq_ignore_ascii_case("on") {
        return None;
    }
    if !words.next()?.eq_ignore_ascii_case("spread") {
        return None;
    }
    let line = parse_line_number(words.next()?)?;
    if words.next().is_some() {
        return None;
    }
    Some((side, line))
}

fn parse_total_leg(text: &str) -> Option<(OverUnder, f64)> {
    let mut words = text.split_whitespace();
    let direction = match words.next()?.to_ascii_uppercase().as_str() {
        "OVER" => OverUnder::Over,
        "UNDER" => OverUnder::Under,
        _ => return None,
    };
    let line = parse_line_number(words.next()?)?;
    if words.next().is_some() {
        return None;
    }
    Some((direction, line))
}

fn parse_line_number(raw: &str) -> Option<f64> {
    raw.trim().trim_start_matches('+').parse::<f64>().ok()
}

// Split on a lone connective word so team-ish text can't smuggle one in.
fn split_once_word<'a>(text: &'a str, word: &str) -> Option<(&'a str, &'a str)> {
    let lower = text.to_ascii_lowercase();
    let needle = format!(" {word} ");
    let idx = lower.find(&needle)?;
    Some((&text[..idx], &text[idx + needle.len()..]))
}

/// Grade a parsed pick against the authoritative final score.
pub fn grade_pick(pick: Pick, score: FinalScore) -> GradingResult {
    match pick {
        Pick::Spread { side, line } => grade_leg(spread_cover(side, line, score)),
        Pick::Total { direction, line } => grade_leg(total_cover(direction, line, score)),
        Pick::Combo { spread, total } => {
            let spread_cover = spread_cover(spread.0, spread.1, score);
            let total_cover = total_cover(total.0, total.1, score);
            grade_combo(spread_cover, total_cover)
        }
    }
}

/// Grade raw recommendation text; unrecognized phrasing is NO_BET.
pub fn grade_recommendation(text: &str, score: FinalScore) -> GradingResult {
    match parse_recommendation(text) {
        Some(pick) => grade_pick(pick, score),
        None => GradingResult {
            outcome: Outcome::NoBet,
            margin: 0.0,
        },
    }
}

/// Cover value for the picked side: positive wins, zero pushes. The home
/// side is the exact mirror of the away side through the signed margin.
fn spread_cover(side: Side, line: f64, score: FinalScore) -> f64 {
    let side_margin = match side {
        Side::Away => score.signed_margin(),
        Side::Home => -score.signed_margin(),
    };
    side_margin + line
}

fn total_cover(direction: OverUnder, line: f64, score: FinalScore) -> f64 {
    match direction {
        OverUnder::Over => score.total() - line,
        OverUnder::Under => line - score.total(),
    }
}

fn grade_leg(cover: f64) -> GradingResult {
    let outcome = if cover > 0.0 {
        Outcome::Win
    } else if cover < 0.0 {
        Outcome::Loss
    } else {
        Outcome::Push
    };
    GradingResult {
        outcome,
        margin: cover,
    }
}

fn grade_combo(spread_cover: f64, total_cover: f64) -> GradingResult {
    let margin = spread_cover.min(total_cover);
    let legs = (grade_leg(spread_cover).outcome, grade_leg(total_cover).outcome);
    let outcome = match legs {
        (Outcome::Loss, _) | (_, Outcome::Loss) => Outcome::Loss,
        (Outcome::Win, Outcome::Win) => Outcome::Win,
        (Outcome::Push, Outcome::Push) => Outcome::Push,
        // One push, one win: refund-grade leg, kept distinct from a clean win.
        _ => Outcome::WinPush,
    };
    GradingResult { outcome, margin }
}

/// A logged pick for one matchup. Created at analysis time; the grader
/// later fills `outcome`/`margin` exactly once (the ledger enforces that).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub season: u16,
    pub week: u8,
    pub matchup: MatchupKey,
    pub bet_type: BetType,
    pub recommendation: String,
    pub spread_line: Option<f64>,
    pub total_line: Option<f64>,
    pub confidence: Option<f64>,
    pub outcome: Option<Outcome>,
    pub margin: Option<f64>,
}

impl RecommendationRecord {
    pub fn new(season: u16, week: u8, matchup: MatchupKey, pick: Pick) -> RecommendationRecord {
        let (spread_line, total_line) = match pick {
            Pick::Spread { line, .. } => (Some(line), None),
            Pick::Total { line, .. } => (None, Some(line)),
            Pick::Combo { spread, total } => (Some(spread.1), Some(total.1)),
        };
        RecommendationRecord {
            season,
            week,
            matchup,
            bet_type: pick.bet_type(),
            recommendation: pick.phrase(),
            spread_line,
            total_line,
            confidence: None,
            outcome: None,
            margin: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        FinalScore, Outcome, Pick, grade_pick, grade_recommendation, parse_recommendation,
    };
    use crate::market::{OverUnder, Side};

    fn score(away: i32, home: i32) -> FinalScore {
        FinalScore { away, home }
    }

    #[test]
    fn away_cover_wins_when_margin_beats_line() {
        let result = grade_recommendation("AWAY on spread -3.5", score(24, 20));
        assert_eq!(result.outcome, Outcome::Win);
        assert!((result.margin - 0.5).abs() < 1e-9);
    }

    #[test]
    fn home_side_mirrors_away_side() {
        let result = grade_recommendation("HOME on spread +3.5", score(24, 20));
        assert_eq!(result.outcome, Outcome::Loss);
        assert!((result.margin + 0.5).abs() < 1e-9);
    }

    #[test]
    fn whole_number_line_can_push() {
        let result = grade_recommendation("AWAY on spread -4", score(24, 20));
        assert_eq!(result.outcome, Outcome::Push);
        assert_eq!(result.margin, 0.0);
    }

    #[test]
    fn totals_grade_over_and_under() {
        let s = score(24, 20); // total 44
        assert_eq!(grade_recommendation("OVER 43.5", s).outcome, Outcome::Win);
        assert_eq!(grade_recommendation("UNDER 43.5", s).outcome, Outcome::Loss);

        let on_the_number = score(23, 21); // total 44
        assert_eq!(
            grade_recommendation("OVER 44", on_the_number).outcome,
            Outcome::Push
        );
        assert_eq!(
            grade_recommendation("UNDER 44", on_the_number).outcome,
            Outcome::Push
        );
    }

    #[test]
    fn combo_needs_both_legs() {
        let both_win = grade_recommendation("AWAY on spread -3.5 and OVER 43.5", score(24, 20));
        assert_eq!(both_win.outcome, Outcome::Win);

        let spread_lost = grade_recommendation("AWAY on spread -3.5 and OVER 43.5", score(23, 21));
        assert_eq!(spread_lost.outcome, Outcome::Loss);
    }

    #[test]
    fn combo_push_plus_win_is_win_push() {
        // Spread pushes (margin 4 vs -4), total clears.
        let result = grade_recommendation("AWAY on spread -4 and OVER 43.5", score(24, 20));
        assert_eq!(result.outcome, Outcome::WinPush);

        // Both legs on the number.
        let result = grade_recommendation("AWAY on spread -4 and OVER 44", score(24, 20));
        assert_eq!(result.outcome, Outcome::Push);
    }

    #[test]
    fn unrecognized_phrasing_is_no_bet() {
        assert_eq!(
            grade_recommendation("hammer the Jets", score(24, 20)).outcome,
            Outcome::NoBet
        );
        assert_eq!(
            grade_recommendation("", score(24, 20)).outcome,
            Outcome::NoBet
        );
        assert_eq!(
            grade_recommendation("AWAY on spread", score(24, 20)).outcome,
            Outcome::NoBet
        );
    }

    #[test]
    fn parser_round_trips_canonical_phrases() {
        for pick in [
            Pick::Spread {
                side: Side::Away,
                line: -3.5,
            },
            Pick::Total {
                direction: OverUnder::Under,
                line: 41.0,
            },
            Pick::Combo {
                spread: (Side::Home, 2.5),
                total: (OverUnder::Over, 47.5),
            },
        ] {
            let parsed = parse_recommendation(&pick.phrase()).expect("round-trips");
            assert_eq!(parsed, pick);
        }
    }

    #[test]
    fn picked_side_line_sign_follows_favorite_convention() {
        // Home favorite laying 6.5, home wins by 7.
        let result = grade_pick(
            Pick::Spread {
                side: Side::Home,
                line: -6.5,
            },
            score(13, 20),
        );
        assert_eq!(result.outcome, Outcome::Win);
    }
}
