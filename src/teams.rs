use std::collections::HashMap;

use once_cell::sync::Lazy;
use thiserror::Error;

/// Raised when a team name/abbreviation is not in the alias table.
///
/// This is deliberately fatal for the row that produced it: passing the raw
/// string through unchanged produces plausible-looking keys that never join.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown team name or code: {0:?}")]
pub struct UnknownTeamError(pub String);

/// One entry per franchise: canonical code first, then every alias we accept.
/// Aliases include the full display name, the nickname on its own,
/// abbreviation variants, and codes from before relocations (OAK, SD, STL).
const TEAM_TABLE: &[(&str, &[&str])] = &[
    ("ARI", &["Arizona Cardinals", "Cardinals", "ARZ"]),
    ("ATL", &["Atlanta Falcons", "Falcons"]),
    ("BAL", &["Baltimore Ravens", "Ravens", "BLT"]),
    ("BUF", &["Buffalo Bills", "Bills"]),
    ("CAR", &["Carolina Panthers", "Panthers"]),
    ("CHI", &["Chicago Bears", "Bears"]),
    ("CIN", &["Cincinnati Bengals", "Bengals"]),
    ("CLE", &["Cleveland Browns", "Browns", "CLV"]),
    ("DAL", &["Dallas Cowboys", "Cowboys"]),
    ("DEN", &["Denver Broncos", "Broncos"]),
    ("DET", &["Detroit Lions", "Lions"]),
    ("GB", &["Green Bay Packers", "Packers", "GNB"]),
    ("HOU", &["Houston Texans", "Texans", "HST"]),
    ("IND", &["Indianapolis Colts", "Colts"]),
    ("JAX", &["Jacksonville Jaguars", "Jaguars", "JAC"]),
    ("KC", &["Kansas City Chiefs", "Chiefs", "KAN"]),
    ("LV", &["Las Vegas Raiders", "Raiders", "LVR", "OAK", "Oakland Raiders"]),
    (
        "LAC",
        &[
            "Los Angeles Chargers",
            "LA Chargers",
            "Chargers",
            "SD",
            "SDG",
            "San Diego Chargers",
        ],
    ),
    (
        "LA",
        &[
            "Los Angeles Rams",
            "LA Rams",
            "Rams",
            "LAR",
            "STL",
            "St. Louis Rams",
            "St Louis Rams",
        ],
    ),
    ("MIA", &["Miami Dolphins", "Dolphins"]),
    ("MIN", &["Minnesota Vikings", "Vikings"]),
    ("NE", &["New England Patriots", "Patriots", "NWE"]),
    ("NO", &["New Orleans Saints", "Saints", "NOR"]),
    ("NYG", &["New York Giants", "NY Giants", "Giants"]),
    ("NYJ", &["New York Jets", "NY Jets", "Jets"]),
    ("PHI", &["Philadelphia Eagles", "Eagles"]),
    ("PIT", &["Pittsburgh Steelers", "Steelers"]),
    ("SEA", &["Seattle Seahawks", "Seahawks"]),
    ("SF", &["San Francisco 49ers", "49ers", "SFO", "Niners"]),
    ("TB", &["Tampa Bay Buccaneers", "Buccaneers", "Bucs", "TAM"]),
    ("TEN", &["Tennessee Titans", "Titans"]),
    (
        "WAS",
        &[
            "Washington Commanders",
            "Commanders",
            "WSH",
            "Washington Football Team",
            "Washington Redskins",
            "Redskins",
        ],
    ),
];

static ALIAS_MAP: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for (code, aliases) in TEAM_TABLE {
        map.insert(fold(code), *code);
        for alias in *aliases {
            map.insert(fold(alias), *code);
        }
    }
    map
});

/// Canonicalize a team name or abbreviation.
///
/// Accepts full display names ("Washington Commanders"), abbreviation
/// variants ("WSH"), and relocated-franchise codes ("OAK" -> "LV").
/// Unknown input is an error, never a pass-through.
pub fn normalize(raw: &str) -> Result<&'static str, UnknownTeamError> {
    let folded = fold(raw);
    if folded.is_empty() {
        return Err(UnknownTeamError(raw.to_string()));
    }
    ALIAS_MAP
        .get(&folded)
        .copied()
        .ok_or_else(|| UnknownTeamError(raw.trim().to_string()))
}

/// Non-failing variant for callers that treat misses as "not a team token".
pub fn try_normalize(raw: &str) -> Option<&'static str> {
    normalize(raw).ok()
}

pub fn all_codes() -> impl Iterator<Item = &'static str> {
    TEAM_TABLE.iter().map(|(code, _)| *code)
}

pub fn display_name(code: &str) -> Option<&'static str> {
    TEAM_TABLE
        .iter()
        .find(|(c, _)| *c == code)
        .and_then(|(_, aliases)| aliases.first().copied())
}

/// Case/punctuation-insensitive key: uppercase alphanumerics, single
/// spaces. Dots are deleted rather than spaced so dotted abbreviations
/// ("N.Y. Jets") fold to the same key as their undotted alias.
fn fold(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_uppercase());
        } else if ch != '.' {
            cleaned.push(' ');
        }
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::{TEAM_TABLE, all_codes, fold, normalize};
    use std::collections::HashMap;

    #[test]
    fn normalize_is_idempotent_on_every_code() {
        for code in all_codes() {
            let once = normalize(code).expect("canonical code resolves");
            let twice = normalize(once).expect("resolves again");
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn every_alias_maps_to_exactly_one_code() {
        let mut seen: HashMap<String, &str> = HashMap::new();
        for (code, aliases) in TEAM_TABLE {
            for alias in std::iter::once(code).chain(aliases.iter()) {
                let folded = fold(alias);
                if let Some(prev) = seen.insert(folded, *code) {
                    assert_eq!(prev, *code, "alias {alias:?} maps to two codes");
                }
            }
        }
    }

    #[test]
    fn relocated_codes_resolve_to_current_franchise() {
        assert_eq!(normalize("OAK").unwrap(), "LV");
        assert_eq!(normalize("SD").unwrap(), "LAC");
        assert_eq!(normalize("STL").unwrap(), "LA");
        assert_eq!(normalize("JAC").unwrap(), "JAX");
    }

    #[test]
    fn full_names_and_variants_resolve() {
        assert_eq!(normalize("Washington Commanders").unwrap(), "WAS");
        assert_eq!(normalize("WSH").unwrap(), "WAS");
        assert_eq!(normalize("new england patriots").unwrap(), "NE");
        assert_eq!(normalize("N.Y. Jets").unwrap(), "NYJ");
        assert_eq!(normalize("S.F.").unwrap(), "SF");
        assert_eq!(normalize("St. Louis Rams").unwrap(), "LA");
    }

    #[test]
    fn unknown_input_is_an_error() {
        assert!(normalize("Hartford Whalers").is_err());
        assert!(normalize("").is_err());
        assert!(normalize("   ").is_err());
    }
}
