use crate::models::DataPoint;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// One row of the aligned table: the primary value plus the two
/// forward-filled secondary values for that date.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRow {
    pub date: NaiveDate,
    pub values: [f64; 3],
}

/// Collapse a series to one value per calendar date. Later occurrences win,
/// so intraday revisions override earlier prints for the same day.
fn dedup_by_date(points: &[DataPoint]) -> BTreeMap<NaiveDate, f64> {
    let mut map = BTreeMap::new();
    for dp in points {
        map.insert(dp.timestamp.date_naive(), dp.value);
    }
    map
}

/// Aligns up to three time series onto the primary series' date axis.
///
/// Financial data comes at mixed cadences (daily balance sheet vs. weekly
/// treasury prints), so the secondaries are forward-filled: each primary date
/// gets the most recent secondary value at or before it. Before a secondary
/// has published anything its column reads 0.0, and a fully empty secondary
/// stays an all-zero column. An empty primary yields no rows at all.
pub fn align_series(
    primary: &[DataPoint],
    secondary_a: &[DataPoint],
    secondary_b: &[DataPoint],
) -> Vec<AlignedRow> {
    let primary = dedup_by_date(primary);
    if primary.is_empty() {
        return Vec::new();
    }

    let sec_a = dedup_by_date(secondary_a);
    let sec_b = dedup_by_date(secondary_b);

    let mut iter_a = sec_a.iter().peekable();
    let mut iter_b = sec_b.iter().peekable();
    let mut fill_a = 0.0;
    let mut fill_b = 0.0;

    let mut rows = Vec::with_capacity(primary.len());

    // Single forward pass: primary dates are sorted, so each secondary
    // iterator only ever advances.
    for (date, value) in &primary {
        while let Some((d, v)) = iter_a.peek() {
            if *d <= date {
                fill_a = **v;
                iter_a.next();
            } else {
                break;
            }
        }
        while let Some((d, v)) = iter_b.peek() {
            if *d <= date {
                fill_b = **v;
                iter_b.next();
            } else {
                break;
            }
        }

        rows.push(AlignedRow {
            date: *date,
            values: [*value, fill_a, fill_b],
        });
    }

    rows
}
