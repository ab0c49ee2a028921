use crate::models::DataPoint;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Lookback windows (days) used when none are configured.
pub const DEFAULT_WINDOWS: [i64; 4] = [7, 30, 90, 365];

/// Change of the latest value against a historical reference point.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChangeStat {
    pub change: f64,
    pub change_pct: f64,
    pub from_value: f64,
    pub from_date: DateTime<Utc>,
}

/// Result of [`calculate_change_stats`]: the latest observation plus one
/// [`ChangeStat`] per lookback window, keyed by label ("7d", "30d", ...).
#[derive(Debug, Default, Serialize)]
pub struct ChangeStats {
    pub current_value: Option<f64>,
    pub current_date: Option<DateTime<Utc>>,
    pub changes: BTreeMap<String, ChangeStat>,
}

/// Computes windowed change statistics for a single indicator's series.
///
/// Input order does not matter; points are sorted ascending first. For each
/// window the reference is the point *closest in time* to `latest - W days`,
/// not an interpolated value, so sparse series compare against whatever
/// observation actually exists near the target. A reference value of exactly
/// 0 would blow up the percentage, so that window is omitted rather than
/// clamped. Empty input returns the default (no current value, no changes).
pub fn calculate_change_stats(points: &[DataPoint], windows: &[i64]) -> ChangeStats {
    if points.is_empty() {
        return ChangeStats::default();
    }

    let mut sorted: Vec<&DataPoint> = points.iter().collect();
    sorted.sort_by_key(|dp| dp.timestamp);
    let latest = sorted[sorted.len() - 1];

    let mut changes = BTreeMap::new();

    for &days in windows {
        let target = latest.timestamp - Duration::days(days);

        // Nearest-point scan in chronological order. Strict `<` means the
        // first point reaching the minimal distance wins a tie.
        let mut closest: Option<&DataPoint> = None;
        let mut min_diff = i64::MAX;
        for &dp in &sorted {
            let diff = (dp.timestamp - target).num_seconds().abs();
            if diff < min_diff {
                min_diff = diff;
                closest = Some(dp);
            }
        }

        if let Some(reference) = closest {
            if reference.value != 0.0 {
                let change = latest.value - reference.value;
                let change_pct = change / reference.value * 100.0;
                changes.insert(
                    format!("{}d", days),
                    ChangeStat {
                        change: round_to(change, 4),
                        change_pct: round_to(change_pct, 2),
                        from_value: reference.value,
                        from_date: reference.timestamp,
                    },
                );
            }
        }
    }

    ChangeStats {
        current_value: Some(latest.value),
        current_date: Some(latest.timestamp),
        changes,
    }
}

fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn create_datapoint(date: &str, value: f64) -> DataPoint {
        DataPoint::new(
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
                .and_utc(),
            "test",
            value,
            "test",
            "us",
        )
    }

    #[test]
    fn test_empty_input_yields_default() {
        let stats = calculate_change_stats(&[], &DEFAULT_WINDOWS);
        assert!(stats.current_value.is_none());
        assert!(stats.current_date.is_none());
        assert!(stats.changes.is_empty());
    }

    #[test]
    fn test_single_point_has_current_but_self_referential_changes() {
        let points = vec![create_datapoint("2024-06-01", 50.0)];
        let stats = calculate_change_stats(&points, &[30]);
        assert_eq!(stats.current_value, Some(50.0));
        // The only candidate reference is the latest point itself: zero change.
        let stat = stats.changes.get("30d").unwrap();
        assert_eq!(stat.change, 0.0);
        assert_eq!(stat.change_pct, 0.0);
    }

    #[test]
    fn test_nearest_point_over_gap() {
        // 60-day gap: nearest to (Mar 2 - 30d = Feb 1) is Jan 1, 31 days away.
        let points = vec![
            create_datapoint("2024-01-01", 100.0),
            create_datapoint("2024-03-02", 90.0),
        ];
        let stats = calculate_change_stats(&points, &[30]);
        let stat = stats.changes.get("30d").unwrap();
        assert_eq!(stat.change, -10.0);
        assert_eq!(stat.change_pct, -10.0);
        assert_eq!(stat.from_value, 100.0);
    }

    #[test]
    fn test_tie_break_prefers_first_in_scan_order() {
        // Latest 2024-04-10, window 30d -> target 2024-03-11.
        // Mar 6 and Mar 16 are both 5 days away; Mar 6 is scanned first.
        let points = vec![
            create_datapoint("2024-03-06", 10.0),
            create_datapoint("2024-03-16", 20.0),
            create_datapoint("2024-04-10", 30.0),
        ];
        let stats = calculate_change_stats(&points, &[30]);
        let stat = stats.changes.get("30d").unwrap();
        assert_eq!(stat.from_value, 10.0);
    }

    #[test]
    fn test_strictly_closer_point_wins() {
        // Distances to target 2024-03-11: Mar 6 -> 5d, Mar 16 -> 5d, Mar 8 -> 3d.
        let points = vec![
            create_datapoint("2024-03-06", 10.0),
            create_datapoint("2024-03-08", 15.0),
            create_datapoint("2024-03-16", 20.0),
            create_datapoint("2024-04-10", 30.0),
        ];
        let stats = calculate_change_stats(&points, &[30]);
        assert_eq!(stats.changes.get("30d").unwrap().from_value, 15.0);
    }

    #[test]
    fn test_zero_reference_skips_window() {
        let points = vec![
            create_datapoint("2024-01-01", 0.0),
            create_datapoint("2024-01-31", 10.0),
        ];
        let stats = calculate_change_stats(&points, &[30]);
        assert!(stats.changes.get("30d").is_none());
        assert_eq!(stats.current_value, Some(10.0));
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let a = vec![
            create_datapoint("2024-01-01", 100.0),
            create_datapoint("2024-01-15", 105.0),
            create_datapoint("2024-01-31", 110.0),
        ];
        let b = vec![a[2].clone(), a[0].clone(), a[1].clone()];

        let stats_a = calculate_change_stats(&a, &DEFAULT_WINDOWS);
        let stats_b = calculate_change_stats(&b, &DEFAULT_WINDOWS);
        assert_eq!(stats_a.current_value, stats_b.current_value);
        assert_eq!(stats_a.changes, stats_b.changes);
    }

    #[test]
    fn test_rounding() {
        let points = vec![
            create_datapoint("2024-01-01", 3.0),
            create_datapoint("2024-01-08", 4.0),
        ];
        let stats = calculate_change_stats(&points, &[7]);
        let stat = stats.changes.get("7d").unwrap();
        assert_eq!(stat.change, 1.0);
        // 1/3 * 100 = 33.333... -> 33.33 at 2 decimal places.
        assert_eq!(stat.change_pct, 33.33);
    }
}
