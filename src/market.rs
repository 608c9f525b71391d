use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sources::{OddsBoardRow, parse_timestamp};

/// Percentage-pair slot convention, fixed once and used by every caller:
/// the FIRST value belongs to the away side, the SECOND to the home side.
/// For the total market the same slots mean Over (first) / Under (second).

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
    Spread,
    Total,
    Moneyline,
}

impl Market {
    pub fn parse(raw: &str) -> Option<Market> {
        let s = raw.trim().to_ascii_lowercase();
        match s.as_str() {
            "spread" | "ats" | "ps" | "point spread" => Some(Market::Spread),
            "total" | "totals" | "o/u" | "ou" | "over/under" => Some(Market::Total),
            "moneyline" | "money line" | "ml" | "h2h" => Some(Market::Moneyline),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Market::Spread => "Spread",
            Market::Total => "Total",
            Market::Moneyline => "Moneyline",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Away,
    Home,
}

impl Side {
    pub fn label(self) -> &'static str {
        match self {
            Side::Away => "AWAY",
            Side::Home => "HOME",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverUnder {
    Over,
    Under,
}

impl OverUnder {
    pub fn label(self) -> &'static str {
        match self {
            OverUnder::Over => "OVER",
            OverUnder::Under => "UNDER",
        }
    }
}

/// One bookmaker snapshot for a matchup+market. All numeric fields are
/// `None` when the source text failed to parse; `None` means "no signal",
/// which is not the same thing as a confirmed 0.0 split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    pub market: Market,
    /// Away-side line for Spread/Moneyline; the O/U number for Total.
    pub line_away: Option<f64>,
    pub line_home: Option<f64>,
    pub bets_away: Option<f64>,
    pub bets_home: Option<f64>,
    pub money_away: Option<f64>,
    pub money_home: Option<f64>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl MarketQuote {
    /// Build a quote from one odds board row's text fields. Never fails:
    /// unparseable fields come back as `None`.
    pub fn from_board_row(market: Market, row: &OddsBoardRow) -> MarketQuote {
        let (line_away, line_home) = match row.line.as_deref() {
            Some(raw) => parse_line_pair(raw),
            None => (None, None),
        };
        let (bets_away, bets_home) = match row.bets_pct.as_deref() {
            Some(raw) => parse_pct_pair(raw),
            None => (None, None),
        };
        let (money_away, money_home) = match row.money_pct.as_deref() {
            Some(raw) => parse_pct_pair(raw),
            None => (None, None),
        };
        MarketQuote {
            market,
            line_away,
            line_home,
            bets_away,
            bets_home,
            money_away,
            money_home,
            fetched_at: row.timestamp.as_deref().and_then(parse_timestamp),
        }
    }

    pub fn bets_pct(&self, side: Side) -> Option<f64> {
        match side {
            Side::Away => self.bets_away,
            Side::Home => self.bets_home,
        }
    }

    pub fn money_pct(&self, side: Side) -> Option<f64> {
        match side {
            Side::Away => self.money_away,
            Side::Home => self.money_home,
        }
    }
}

/// `money%(side) − bets%(side)`. Positive means sharp money sits heavier on
/// `side` than the ticket count alone suggests. `None` when either input is
/// missing; that is "no signal", never zero.
pub fn compute_differential(quote: &MarketQuote, side: Side) -> Option<f64> {
    Some(quote.money_pct(side)? - quote.bets_pct(side)?)
}

/// Strength bands over |differential|, applied per market. The band rides
/// alongside the raw number in reports; it never replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Band {
    Strong,
    Moderate,
    Slight,
    None,
}

pub const BAND_STRONG: f64 = 15.0;
pub const BAND_MODERATE: f64 = 10.0;
pub const BAND_SLIGHT: f64 = 5.0;

impl Band {
    pub fn from_differential(diff: Option<f64>) -> Band {
        let Some(diff) = diff else {
            return Band::None;
        };
        let mag = diff.abs();
        if mag >= BAND_STRONG {
            Band::Strong
        } else if mag >= BAND_MODERATE {
            Band::Moderate
        } else if mag >= BAND_SLIGHT {
            Band::Slight
        } else {
            Band::None
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Band::Strong => "strong",
            Band::Moderate => "moderate",
            Band::Slight => "slight",
            Band::None => "none",
        }
    }
}

/// One market's derived signal for a matchup. `differential_away` is the
/// away-side number (home mirrors it); for Total the same field is the
/// Over-side number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketSignal {
    pub market: Market,
    pub differential_away: Option<f64>,
    pub band: Band,
}

impl MarketSignal {
    pub fn from_quote(quote: &MarketQuote) -> MarketSignal {
        let differential_away = compute_differential(quote, Side::Away);
        MarketSignal {
            market: quote.market,
            differential_away,
            band: Band::from_differential(differential_away),
        }
    }

    pub fn differential(&self, side: Side) -> Option<f64> {
        match side {
            Side::Away => self.differential_away,
            Side::Home => self.differential_away.map(|d| -d),
        }
    }

    /// Side the sharp money leans toward, if there is any signal at all.
    pub fn lean(&self) -> Option<Side> {
        let diff = self.differential_away?;
        if diff > 0.0 {
            Some(Side::Away)
        } else if diff < 0.0 {
            Some(Side::Home)
        } else {
            None
        }
    }
}

/// Consensus flags, kept separate: team-direction consensus comes from the
/// spread and moneyline markets agreeing; the total market flags the O/U
/// side on its own. The two are never blended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsensusFlags {
    pub sharp_consensus: bool,
    pub sharp_side: Option<Side>,
    pub total_consensus: bool,
    pub total_side: Option<OverUnder>,
}

pub fn compute_consensus(
    spread: Option<&MarketSignal>,
    total: Option<&MarketSignal>,
    moneyline: Option<&MarketSignal>,
    threshold: f64,
) -> ConsensusFlags {
    let mut flags = ConsensusFlags {
        sharp_consensus: false,
        sharp_side: None,
        total_consensus: false,
        total_side: None,
    };

    if let (Some(spread), Some(moneyline)) = (spread, moneyline)
        && let (Some(sd), Some(md)) = (spread.differential_away, moneyline.differential_away)
        && sd.signum() == md.signum()
        && sd.abs() >= threshold
        && md.abs() >= threshold
        && let Some(side) = spread.lean()
    {
        flags.sharp_consensus = true;
        flags.sharp_side = Some(side);
    }

    if let Some(total) = total
        && let Some(td) = total.differential_away
        && td.abs() >= threshold
    {
        flags.total_consensus = true;
        // Over occupies the away slot of the pair convention.
        flags.total_side = Some(if td > 0.0 {
            OverUnder::Over
        } else {
            OverUnder::Under
        });
    }

    flags
}

/// Parse `"60% | 40%"` into `(Some(60.0), Some(40.0))`, a lone `"60%"` into
/// `(Some(60.0), None)`. Each slot fails soft and independently.
pub fn parse_pct_pair(raw: &str) -> (Option<f64>, Option<f64>) {
    let (left, right) = split_pair(raw);
    (parse_pct(left), right.and_then(parse_pct))
}

/// Same slot convention for line text, e.g. `"-3.5 | +3.5"` or `"43.5"`.
pub fn parse_line_pair(raw: &str) -> (Option<f64>, Option<f64>) {
    let (left, right) = split_pair(raw);
    (parse_signed(left), right.and_then(parse_signed))
}

fn split_pair(raw: &str) -> (&str, Option<&str>) {
    for sep in ['|', '/'] {
        if let Some((left, right)) = raw.split_once(sep) {
            return (left, Some(right));
        }
    }
    (raw, None)
}

fn parse_pct(raw: &str) -> Option<f64> {
    parse_signed(raw.trim().trim_end_matches('%'))
}

fn parse_signed(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() || s == "-" {
        return None;
    }
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'))
        .collect();
    let cleaned = cleaned.trim_start_matches('+');
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    cleaned.parse::<f64>().ok()
}
