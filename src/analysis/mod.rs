use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::BTreeMap;

use crate::config::Settings;
use crate::core::stats::{calculate_change_stats, ChangeStat};
use crate::core::status::{determine_status, Direction, StatusInfo};
use crate::db;
use crate::registry::{self, IndicatorDef};

pub mod signals;

/// Per-indicator snapshot: latest value, windowed changes, and the derived
/// market status. This is the shape the API layer serializes as-is.
#[derive(Debug, Serialize)]
pub struct IndicatorOverview {
    pub id: String,
    pub name: String,
    pub market: String,
    pub category: String,
    pub unit: String,
    pub direction: Direction,
    pub is_primary: bool,
    pub current_value: Option<f64>,
    pub current_date: Option<DateTime<Utc>>,
    pub changes: BTreeMap<String, ChangeStat>,
    pub status: StatusInfo,
}

/// Builds the snapshot for one indicator from stored data. Everything here
/// is recomputed per call; nothing derived is treated as authoritative.
pub async fn build_overview(
    pool: &SqlitePool,
    def: &IndicatorDef,
    settings: &Settings,
) -> Result<IndicatorOverview> {
    let points = db::get_data_points(pool, def.id, None).await?;
    let stats = calculate_change_stats(&points, &settings.change_windows);

    let change_30d = stats.changes.get("30d").map(|c| c.change_pct);
    let status = determine_status(change_30d, def.direction, settings.status_threshold);

    Ok(IndicatorOverview {
        id: def.id.to_string(),
        name: def.name.to_string(),
        market: def.market.to_string(),
        category: def.category.to_string(),
        unit: def.unit.to_string(),
        direction: def.direction,
        is_primary: def.is_primary,
        current_value: stats.current_value,
        current_date: stats.current_date,
        changes: stats.changes,
        status,
    })
}

/// Snapshots for every indicator in a market, primary indicator first.
pub async fn market_overview(
    pool: &SqlitePool,
    market: &str,
    settings: &Settings,
) -> Result<Vec<IndicatorOverview>> {
    let mut defs = registry::for_market(market);
    defs.sort_by_key(|def| !def.is_primary);

    let mut overviews = Vec::with_capacity(defs.len());
    for def in defs {
        overviews.push(build_overview(pool, def, settings).await?);
    }

    Ok(overviews)
}
