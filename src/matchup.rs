use serde::{Deserialize, Serialize};
use std::fmt;

pub const KEY_SEPARATOR: char = '@';

/// Directional join key for one game: `AWAY@HOME`, away listed first.
///
/// Inputs must already be canonical codes (`teams::normalize`); no
/// normalization happens here. Equality is exact-string, so a reversed key
/// is a different key and never matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchupKey(String);

impl MatchupKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split back into (away, home). Keys built by `build_key` always split.
    pub fn sides(&self) -> Option<(&str, &str)> {
        self.0.split_once(KEY_SEPARATOR)
    }
}

impl fmt::Display for MatchupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn build_key(away_canonical: &str, home_canonical: &str) -> MatchupKey {
    MatchupKey(format!("{away_canonical}{KEY_SEPARATOR}{home_canonical}"))
}

/// One scheduled game in one (season, week). Codes are canonical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matchup {
    pub season: u16,
    pub week: u8,
    pub away: String,
    pub home: String,
}

impl Matchup {
    pub fn key(&self) -> MatchupKey {
        build_key(&self.away, &self.home)
    }
}

#[cfg(test)]
mod tests {
    use super::build_key;

    #[test]
    fn key_is_directional() {
        let forward = build_key("NYJ", "NE");
        let reversed = build_key("NE", "NYJ");
        assert_eq!(forward.as_str(), "NYJ@NE");
        assert_ne!(forward, reversed);
    }

    #[test]
    fn sides_round_trip() {
        let key = build_key("KC", "BUF");
        assert_eq!(key.sides(), Some(("KC", "BUF")));
    }
}
