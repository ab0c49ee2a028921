use crate::core::timeseries::align_series;
use crate::models::DataPoint;
use serde_json::json;

/// Derives US net liquidity from its three components:
///
///   Net Liquidity = Fed Balance Sheet - RRP - TGA
///
/// Inputs must already be normalized to the same unit (billions USD, handled
/// by the registry's unit divisors). RRP and TGA are forward-filled onto the
/// balance sheet's date axis; each output point carries the three input
/// values in its metadata so a derived number can always be traced back.
///
/// The formula is deliberately fixed. A different composite is a different
/// calculator, not a parameter of this one.
pub fn calculate_net_liquidity(
    fed_balance: &[DataPoint],
    rrp: &[DataPoint],
    tga: &[DataPoint],
) -> Vec<DataPoint> {
    align_series(fed_balance, rrp, tga)
        .into_iter()
        .map(|row| {
            let [fed, rrp, tga] = row.values;
            DataPoint {
                timestamp: row.date.and_hms_opt(0, 0, 0).unwrap().and_utc(),
                indicator_id: "net_liquidity".to_string(),
                value: fed - rrp - tga,
                source: "calculated".to_string(),
                market: "us".to_string(),
                metadata: json!({ "fed": fed, "rrp": rrp, "tga": tga }),
            }
        })
        .collect()
}
