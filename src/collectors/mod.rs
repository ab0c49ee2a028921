use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::DataPoint;
use crate::registry::IndicatorDef;

pub mod coingecko;
pub mod fred;

/// Capability interface for data sources. The pipeline only ever sees this
/// trait; which provider an indicator comes from is a registry concern.
#[async_trait]
pub trait Collector: Send + Sync {
    fn source_name(&self) -> &str;

    /// Fetch an indicator's observations for the given date range, already
    /// normalized (unit divisor applied) and tagged with source and market.
    async fn fetch(
        &self,
        def: &IndicatorDef,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<DataPoint>>;

    /// Cheap availability check; failing collectors are skipped, not fatal.
    async fn health_check(&self) -> bool {
        true
    }
}
