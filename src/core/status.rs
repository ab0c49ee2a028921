use serde::{Deserialize, Serialize};

/// Whether a rising value of an indicator signals loosening or tightening
/// liquidity conditions. RRP and TGA drain liquidity when they rise, so they
/// are `DownIsLoose`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    UpIsLoose,
    DownIsLoose,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::UpIsLoose => "up_is_loose",
            Direction::DownIsLoose => "down_is_loose",
        }
    }
}

/// Five-level market status derived from the 30-day change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Bullish,
    SlightlyBullish,
    Neutral,
    SlightlyBearish,
    Bearish,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Bullish => "bullish",
            Status::SlightlyBullish => "slightly_bullish",
            Status::Neutral => "neutral",
            Status::SlightlyBearish => "slightly_bearish",
            Status::Bearish => "bearish",
        }
    }
}

/// Status paired with its display color and glyph, the shape the frontend
/// renders directly.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatusInfo {
    pub status: Status,
    pub color: &'static str,
    pub emoji: &'static str,
}

/// Change magnitude (percentage points) separating "slightly" from the full
/// bullish/bearish call. Hardcoded policy carried over as-is; override via
/// `Settings::status_threshold`.
pub const SIGNIFICANCE_THRESHOLD: f64 = 2.0;

/// Maps a 30-day change percentage onto a market status.
///
/// A missing change (young series, zero-valued reference) is neutral rather
/// than an error. The threshold comparison is strict: exactly +2.0% with the
/// default threshold is still only slightly bullish.
pub fn determine_status(
    change_pct_30d: Option<f64>,
    direction: Direction,
    threshold: f64,
) -> StatusInfo {
    let change = match change_pct_30d {
        Some(v) => v,
        None => {
            return StatusInfo {
                status: Status::Neutral,
                color: "yellow",
                emoji: "🟡",
            }
        }
    };

    let is_positive = match direction {
        Direction::UpIsLoose => change > 0.0,
        Direction::DownIsLoose => change < 0.0,
    };
    let significant = change.abs() > threshold;

    let status = match (is_positive, significant) {
        (true, true) => Status::Bullish,
        (true, false) => Status::SlightlyBullish,
        (false, true) => Status::Bearish,
        (false, false) => Status::SlightlyBearish,
    };

    let (color, emoji) = if is_positive {
        ("green", "🟢")
    } else {
        ("red", "🔴")
    };

    StatusInfo {
        status,
        color,
        emoji,
    }
}
