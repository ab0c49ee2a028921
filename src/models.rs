use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Standardized data point format. Every collector and calculator produces
/// these; the pipeline passes them by value between stages.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DataPoint {
    pub timestamp: DateTime<Utc>,
    pub indicator_id: String,
    pub value: f64,
    pub source: String,
    pub market: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl DataPoint {
    /// Build a raw point with empty metadata.
    pub fn new(
        timestamp: DateTime<Utc>,
        indicator_id: impl Into<String>,
        value: f64,
        source: impl Into<String>,
        market: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            indicator_id: indicator_id.into(),
            value,
            source: source.into(),
            market: market.into(),
            metadata: serde_json::Value::Null,
        }
    }
}

/// Indicator metadata row as stored in the `indicators` table.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Indicator {
    pub id: String,
    pub name: String,
    pub source: String,
    pub series_id: Option<String>,
    pub market: String,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub unit_divisor: f64,
    pub direction: String,
    pub is_primary: bool,
    pub is_computed: bool,
}
