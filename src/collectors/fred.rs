use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use super::Collector;
use crate::models::DataPoint;
use crate::registry::IndicatorDef;

const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";

/// Collector for Federal Reserve Economic Data (FRED).
pub struct FredCollector {
    api_key: String,
    client: Client,
}

impl FredCollector {
    pub fn new(api_key: String) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("LiquidityMonitor/1.0"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { api_key, client }
    }

    /// Parse the FRED observations payload into normalized points.
    /// FRED reports missing observations as "." -- those are skipped.
    fn parse_observations(json: &Value, def: &IndicatorDef) -> Result<Vec<DataPoint>> {
        let observations = json["observations"]
            .as_array()
            .ok_or_else(|| anyhow!("No observations found in FRED response"))?;

        let mut points = Vec::new();

        for obs in observations {
            if let (Some(date_str), Some(value_str)) = (obs["date"].as_str(), obs["value"].as_str())
            {
                if value_str == "." {
                    continue;
                }

                if let Ok(value) = value_str.parse::<f64>() {
                    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")?;
                    let timestamp = date.and_hms_opt(0, 0, 0).unwrap().and_utc();

                    points.push(DataPoint::new(
                        timestamp,
                        def.id,
                        value / def.unit_divisor,
                        "FRED",
                        def.market,
                    ));
                }
            }
        }

        Ok(points)
    }
}

#[async_trait]
impl Collector for FredCollector {
    fn source_name(&self) -> &str {
        "FRED"
    }

    async fn fetch(
        &self,
        def: &IndicatorDef,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<DataPoint>> {
        let api_key = self.api_key.trim();
        if api_key.is_empty() {
            return Err(anyhow!("FRED API key not configured"));
        }
        if api_key.len() != 32 {
            warn!("FRED API key length is {}, expected 32", api_key.len());
        }

        let series_id = def
            .series_id
            .ok_or_else(|| anyhow!("Indicator '{}' has no FRED series ID", def.id))?;

        debug!("FRED fetch: {} ({})", def.id, series_id);

        let start = start_date.to_string();
        let end = end_date.to_string();
        let resp = self
            .client
            .get(BASE_URL)
            .query(&[
                ("series_id", series_id),
                ("api_key", api_key),
                ("file_type", "json"),
                ("observation_start", start.as_str()),
                ("observation_end", end.as_str()),
                ("sort_order", "asc"),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("FRED API error: {} - {}", status, body));
        }

        let json: Value = resp.json().await?;
        Self::parse_observations(&json, def)
    }

    async fn health_check(&self) -> bool {
        let resp = self
            .client
            .get("https://api.stlouisfed.org/fred/series")
            .query(&[
                ("series_id", "GNPCA"),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
            ])
            .send()
            .await;

        matches!(resp, Ok(r) if r.status().is_success())
    }
}
