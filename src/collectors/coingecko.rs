use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::Collector;
use crate::models::DataPoint;
use crate::registry::IndicatorDef;

const BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Collector for CoinGecko cryptocurrency market data. Works without an API
/// key on the public tier; a pro key is attached as a header when present.
pub struct CoinGeckoCollector {
    client: Client,
}

impl CoinGeckoCollector {
    pub fn new(api_key: String) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("LiquidityMonitor/1.0"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if !api_key.is_empty() {
            if let Ok(value) = HeaderValue::from_str(&api_key) {
                headers.insert("x-cg-pro-api-key", value);
            }
        }

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }

    /// Parse a `/coins/{id}/market_chart` payload. Entries are
    /// `[timestamp_ms, value]` pairs; malformed or null entries are skipped.
    fn parse_market_chart(json: &Value, def: &IndicatorDef) -> Result<Vec<DataPoint>> {
        let entries = json["prices"]
            .as_array()
            .ok_or_else(|| anyhow!("No prices found in CoinGecko response"))?;

        let mut points = Vec::new();

        for entry in entries {
            let pair = match entry.as_array() {
                Some(pair) if pair.len() == 2 => pair,
                _ => continue,
            };
            // Timestamps arrive in milliseconds, sometimes as floats.
            if let (Some(ts_ms), Some(value)) = (pair[0].as_f64(), pair[1].as_f64()) {
                if let Some(timestamp) = DateTime::<Utc>::from_timestamp_millis(ts_ms as i64) {
                    points.push(DataPoint::new(
                        timestamp,
                        def.id,
                        value / def.unit_divisor,
                        "CoinGecko",
                        def.market,
                    ));
                }
            }
        }

        Ok(points)
    }

    /// Parse the `/global` payload into a single current-value point.
    fn parse_global_mcap(json: &Value, def: &IndicatorDef) -> Result<Vec<DataPoint>> {
        let total = json["data"]["total_market_cap"]["usd"]
            .as_f64()
            .ok_or_else(|| anyhow!("No total market cap in CoinGecko response"))?;

        Ok(vec![DataPoint::new(
            Utc::now(),
            def.id,
            total / def.unit_divisor,
            "CoinGecko",
            def.market,
        )])
    }
}

#[async_trait]
impl Collector for CoinGeckoCollector {
    fn source_name(&self) -> &str {
        "CoinGecko"
    }

    async fn fetch(
        &self,
        def: &IndicatorDef,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<DataPoint>> {
        let series_id = def
            .series_id
            .ok_or_else(|| anyhow!("Indicator '{}' has no CoinGecko series ID", def.id))?;

        debug!("CoinGecko fetch: {} ({})", def.id, series_id);

        if series_id == "TOTAL_MCAP" {
            let resp = self
                .client
                .get(format!("{}/global", BASE_URL))
                .send()
                .await?;
            if !resp.status().is_success() {
                return Err(anyhow!("CoinGecko API error: {}", resp.status()));
            }
            let json: Value = resp.json().await?;
            return Self::parse_global_mcap(&json, def);
        }

        // Everything else is a per-coin price history; the series ID carries
        // the coin slug ("PRICE_BITCOIN" -> "bitcoin").
        let coin_id = series_id
            .strip_prefix("PRICE_")
            .unwrap_or(series_id)
            .to_lowercase();
        let days = (end_date - start_date).num_days().max(1);

        let days_param = days.to_string();
        let resp = self
            .client
            .get(format!("{}/coins/{}/market_chart", BASE_URL, coin_id))
            .query(&[
                ("vs_currency", "usd"),
                ("days", days_param.as_str()),
                ("interval", "daily"),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("CoinGecko API error: {} - {}", status, body));
        }

        let json: Value = resp.json().await?;
        Self::parse_market_chart(&json, def)
    }

    async fn health_check(&self) -> bool {
        let resp = self
            .client
            .get(format!("{}/ping", BASE_URL))
            .send()
            .await;

        matches!(resp, Ok(r) if r.status().is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry;
    use serde_json::json;

    #[test]
    fn test_parse_market_chart() {
        let def = registry::get("btc_price").unwrap();
        let json_data = json!({
            "prices": [
                [1704067200000i64, 42000.5],
                [1704153600000i64, 43100.0]
            ]
        });

        let points = CoinGeckoCollector::parse_market_chart(&json_data, def).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].value, 42000.5);
        assert_eq!(points[0].indicator_id, "btc_price");
        assert_eq!(points[0].source, "CoinGecko");
        assert_eq!(points[0].market, "crypto");
        assert!(points[0].timestamp < points[1].timestamp);
    }

    #[test]
    fn test_parse_skips_malformed_entries() {
        let def = registry::get("btc_price").unwrap();
        let json_data = json!({
            "prices": [
                [1704067200000i64, null],
                [1704153600000i64],
                [1704240000000i64, 43500.0]
            ]
        });

        let points = CoinGeckoCollector::parse_market_chart(&json_data, def).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].value, 43500.0);
    }

    #[test]
    fn test_parse_global_mcap_applies_unit_divisor() {
        // Total mcap comes back in raw USD; the registry stores billions.
        let def = registry::get("total_crypto_mcap").unwrap();
        let json_data = json!({
            "data": { "total_market_cap": { "usd": 3.5e12 } }
        });

        let points = CoinGeckoCollector::parse_global_mcap(&json_data, def).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].value, 3_500.0);
    }

    #[test]
    fn test_parse_invalid_format() {
        let def = registry::get("btc_price").unwrap();
        let json_data = json!({ "error": "coin not found" });
        assert!(CoinGeckoCollector::parse_market_chart(&json_data, def).is_err());
        assert!(CoinGeckoCollector::parse_global_mcap(&json_data, def).is_err());
    }
}
