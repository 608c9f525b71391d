use std::env;
use std::path::PathBuf;

/// Runtime knobs, all env-driven so weekly cron runs can retune without a
/// rebuild. Binaries call `dotenvy::dotenv().ok()` before `from_env`.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub season: u16,
    /// Minimum |differential| (in percentage points) for either consensus
    /// flag to fire.
    pub consensus_threshold: f64,
    /// When false, consensus picks are reported but never written to the
    /// ledger.
    pub log_recommendations: bool,
    pub ledger_path: Option<PathBuf>,
}

const DEFAULT_SEASON: u16 = 2025;
const DEFAULT_CONSENSUS_THRESHOLD: f64 = 10.0;

impl AnalyzerConfig {
    pub fn from_env() -> Self {
        let season = env::var("NFL_SEASON")
            .ok()
            .and_then(|v| v.trim().parse::<u16>().ok())
            .unwrap_or(DEFAULT_SEASON);
        let consensus_threshold = env::var("CONSENSUS_THRESHOLD")
            .ok()
            .and_then(|v| v.trim().parse::<f64>().ok())
            .unwrap_or(DEFAULT_CONSENSUS_THRESHOLD)
            .clamp(1.0, 50.0);
        let log_recommendations = env_bool("LOG_RECOMMENDATIONS", true);
        let ledger_path = env::var("LEDGER_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        Self {
            season,
            consensus_threshold,
            log_recommendations,
            ledger_path,
        }
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            season: DEFAULT_SEASON,
            consensus_threshold: DEFAULT_CONSENSUS_THRESHOLD,
            log_recommendations: true,
            ledger_path: None,
        }
    }
}

pub fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|v| {
            let t = v.trim().to_ascii_lowercase();
            !(t.is_empty() || t == "0" || t == "false" || t == "off" || t == "no")
        })
        .unwrap_or(default)
}

/// Data directory for the ledger and exports: XDG first, then ~/.local/share.
pub fn app_data_dir() -> Option<PathBuf> {
    if let Ok(base) = env::var("XDG_DATA_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join("nfl_sharp"));
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".local").join("share").join("nfl_sharp"))
}
