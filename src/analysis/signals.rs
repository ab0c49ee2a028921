use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analysis::IndicatorOverview;
use crate::core::status::Direction;

/// Change magnitudes (percentage points, absolute) that make a move worth
/// flagging at each severity.
pub const INFO_CHANGE_PCT: f64 = 2.0;
pub const WARNING_CHANGE_PCT: f64 = 5.0;
pub const CRITICAL_CHANGE_PCT: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

/// A detected market signal, persisted to `signal_events`.
#[derive(Debug, Clone, Serialize)]
pub struct Signal {
    pub indicator_id: String,
    pub indicator_name: String,
    pub signal_type: String,
    pub severity: Severity,
    pub description: String,
    pub current_value: f64,
    pub change_pct: Option<f64>,
    pub detected_at: DateTime<Utc>,
}

/// Scans indicator snapshots for notable 7-day and 30-day moves.
pub fn detect_signals(overviews: &[IndicatorOverview]) -> Vec<Signal> {
    let mut signals = Vec::new();

    for item in overviews {
        let current_value = match item.current_value {
            Some(v) => v,
            None => continue,
        };

        for period in ["7d", "30d"] {
            if let Some(stat) = item.changes.get(period) {
                if let Some(signal) =
                    check_change_signal(item, stat.change_pct, current_value, period)
                {
                    signals.push(signal);
                }
            }
        }
    }

    signals
}

fn check_change_signal(
    item: &IndicatorOverview,
    change_pct: f64,
    current_value: f64,
    period: &str,
) -> Option<Signal> {
    let abs_change = change_pct.abs();

    let severity = if abs_change >= CRITICAL_CHANGE_PCT {
        Severity::Critical
    } else if abs_change >= WARNING_CHANGE_PCT {
        Severity::Warning
    } else if abs_change >= INFO_CHANGE_PCT {
        Severity::Info
    } else {
        return None;
    };

    let loosening = match item.direction {
        Direction::UpIsLoose => change_pct > 0.0,
        Direction::DownIsLoose => change_pct < 0.0,
    };
    let trend = if loosening { "expanding" } else { "contracting" };

    Some(Signal {
        indicator_id: item.id.clone(),
        indicator_name: item.name.clone(),
        signal_type: "trend_change".to_string(),
        severity,
        description: format!(
            "{} {} change {:+.2}%, liquidity {}",
            item.name, period, change_pct, trend
        ),
        current_value,
        change_pct: Some(change_pct),
        detected_at: Utc::now(),
    })
}

/// Flags two indicators whose 30-day moves point in opposite directions,
/// both by more than 3 percent.
pub fn detect_divergence(a: &IndicatorOverview, b: &IndicatorOverview) -> Option<Signal> {
    let pct_a = a.changes.get("30d")?.change_pct;
    let pct_b = b.changes.get("30d")?.change_pct;

    if pct_a * pct_b < 0.0 && pct_a.abs() > 3.0 && pct_b.abs() > 3.0 {
        return Some(Signal {
            indicator_id: format!("{}_{}", a.id, b.id),
            indicator_name: format!("{} vs {}", a.name, b.name),
            signal_type: "divergence".to_string(),
            severity: Severity::Warning,
            description: format!(
                "Divergence: {} ({:+.1}%) and {} ({:+.1}%) are moving in opposite directions",
                a.name, pct_a, b.name, pct_b
            ),
            current_value: 0.0,
            change_pct: None,
            detected_at: Utc::now(),
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::stats::ChangeStat;
    use crate::core::status::{determine_status, SIGNIFICANCE_THRESHOLD};
    use std::collections::BTreeMap;

    fn overview(id: &str, direction: Direction, changes: &[(&str, f64)]) -> IndicatorOverview {
        let mut map = BTreeMap::new();
        for (label, pct) in changes {
            map.insert(
                label.to_string(),
                ChangeStat {
                    change: 0.0,
                    change_pct: *pct,
                    from_value: 100.0,
                    from_date: Utc::now(),
                },
            );
        }

        let change_30d = map.get("30d").map(|c| c.change_pct);
        IndicatorOverview {
            id: id.to_string(),
            name: id.to_string(),
            market: "us".to_string(),
            category: "liquidity".to_string(),
            unit: "B USD".to_string(),
            direction,
            is_primary: false,
            current_value: Some(100.0),
            current_date: Some(Utc::now()),
            changes: map,
            status: determine_status(change_30d, direction, SIGNIFICANCE_THRESHOLD),
        }
    }

    #[test]
    fn test_small_moves_stay_silent() {
        let item = overview("m2_us", Direction::UpIsLoose, &[("7d", 0.5), ("30d", 1.9)]);
        assert!(detect_signals(&[item]).is_empty());
    }

    #[test]
    fn test_severity_ladder() {
        let item = overview(
            "rrp",
            Direction::DownIsLoose,
            &[("7d", -3.0), ("30d", -12.0)],
        );
        let signals = detect_signals(&[item]);
        assert_eq!(signals.len(), 2);
        assert_eq!(signals[0].severity, Severity::Info);
        assert_eq!(signals[1].severity, Severity::Critical);
        // RRP falling releases liquidity.
        assert!(signals[1].description.contains("expanding"));
    }

    #[test]
    fn test_direction_wording() {
        let item = overview("fed_balance_sheet", Direction::UpIsLoose, &[("30d", -6.0)]);
        let signals = detect_signals(&[item]);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].severity, Severity::Warning);
        assert!(signals[0].description.contains("contracting"));
    }

    #[test]
    fn test_missing_current_value_skips_indicator() {
        let mut item = overview("tga", Direction::DownIsLoose, &[("30d", 20.0)]);
        item.current_value = None;
        assert!(detect_signals(&[item]).is_empty());
    }

    #[test]
    fn test_divergence_requires_opposite_signs_and_magnitude() {
        let a = overview("net_liquidity", Direction::UpIsLoose, &[("30d", 4.0)]);
        let b = overview("m2_us", Direction::UpIsLoose, &[("30d", -3.5)]);
        let sig = detect_divergence(&a, &b).unwrap();
        assert_eq!(sig.signal_type, "divergence");
        assert_eq!(sig.severity, Severity::Warning);

        // Same sign: no divergence.
        let c = overview("m2_us", Direction::UpIsLoose, &[("30d", 3.5)]);
        assert!(detect_divergence(&a, &c).is_none());

        // Opposite but too small.
        let d = overview("m2_us", Direction::UpIsLoose, &[("30d", -2.0)]);
        assert!(detect_divergence(&a, &d).is_none());
    }
}
