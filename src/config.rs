use crate::core::stats;
use crate::core::status;

/// Runtime configuration, built once at process start and passed by reference
/// into whatever needs it. Reads `.env` via dotenvy; every field has a
/// working default so the binaries run without any environment at all
/// (fetching is skipped when no API key is present).
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub fred_api_key: String,
    /// Optional pro-tier key; the public CoinGecko API works without one.
    pub coingecko_api_key: String,
    /// How far back collectors request history, in days.
    pub lookback_days: i64,
    /// Lookback windows for change statistics.
    pub change_windows: Vec<i64>,
    /// Percentage-point threshold separating "slightly" from full
    /// bullish/bearish in the status classifier.
    pub status_threshold: f64,
}

impl Settings {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://liquidity.db?mode=rwc".to_string()),
            fred_api_key: std::env::var("FRED_API_KEY").unwrap_or_default(),
            coingecko_api_key: std::env::var("COINGECKO_API_KEY").unwrap_or_default(),
            lookback_days: std::env::var("LOOKBACK_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(730),
            change_windows: std::env::var("CHANGE_WINDOWS")
                .ok()
                .and_then(|v| parse_windows(&v))
                .unwrap_or_else(|| stats::DEFAULT_WINDOWS.to_vec()),
            status_threshold: std::env::var("STATUS_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(status::SIGNIFICANCE_THRESHOLD),
        }
    }
}

/// Parse a comma-separated window list like `7,30,90`. Any bad or
/// non-positive entry rejects the whole value so defaults apply.
fn parse_windows(raw: &str) -> Option<Vec<i64>> {
    let windows: Vec<i64> = raw
        .split(',')
        .map(|part| part.trim().parse().ok())
        .collect::<Option<_>>()?;

    if windows.is_empty() || windows.iter().any(|&d| d <= 0) {
        return None;
    }
    Some(windows)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://liquidity.db?mode=rwc".to_string(),
            fred_api_key: String::new(),
            coingecko_api_key: String::new(),
            lookback_days: 730,
            change_windows: stats::DEFAULT_WINDOWS.to_vec(),
            status_threshold: status::SIGNIFICANCE_THRESHOLD,
        }
    }
}
