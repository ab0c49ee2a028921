use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use tracing::{error, info, warn};

use crate::collectors::Collector;
use crate::config::Settings;
use crate::core::liquidity;
use crate::db;
use crate::models::DataPoint;
use crate::registry::{self, IndicatorDef};

/// Fetches every provider-backed indicator and stores it. Each collector is
/// health-checked once up front; an unhealthy collector is skipped along with
/// its indicators, and one failing indicator is logged and skipped so the
/// rest of the pass still lands. Returns the number of indicators
/// successfully refreshed.
pub async fn refresh_fetched(
    pool: &SqlitePool,
    collectors: &[&dyn Collector],
    settings: &Settings,
) -> Result<usize> {
    let end_date = Utc::now().date_naive();
    let start_date = end_date - Duration::days(settings.lookback_days);

    let mut healthy: Vec<&dyn Collector> = Vec::new();
    for &collector in collectors {
        if collector.health_check().await {
            healthy.push(collector);
        } else {
            warn!("{}: health check failed, skipping its indicators", collector.source_name());
        }
    }

    let mut refreshed = 0;
    for def in registry::fetched() {
        let collector = match healthy.iter().find(|c| c.source_name() == def.source_name()) {
            Some(collector) => *collector,
            None => {
                warn!("{}: no available collector for {}", def.id, def.source_name());
                continue;
            }
        };

        match collector.fetch(def, start_date, end_date).await {
            Ok(points) if points.is_empty() => {
                warn!("{}: {} returned no observations", def.id, collector.source_name());
            }
            Ok(points) => {
                let saved = db::save_data_points(pool, &points).await?;
                info!("{}: saved {} points from {}", def.id, saved, collector.source_name());
                refreshed += 1;
            }
            Err(e) => {
                error!("{}: fetch failed: {:#}", def.id, e);
            }
        }
    }

    Ok(refreshed)
}

/// Recomputes derived indicators from their stored dependencies. Registry
/// order puts dependencies before dependents, so one pass is enough.
pub async fn refresh_computed(pool: &SqlitePool) -> Result<()> {
    for def in registry::computed() {
        match compute(pool, def).await {
            Ok(points) if points.is_empty() => {
                warn!("{}: no input data yet, skipping", def.id);
            }
            Ok(points) => {
                let saved = db::save_data_points(pool, &points).await?;
                info!("{}: computed and saved {} points", def.id, saved);
            }
            Err(e) => {
                error!("{}: computation failed: {:#}", def.id, e);
            }
        }
    }

    Ok(())
}

async fn compute(pool: &SqlitePool, def: &IndicatorDef) -> Result<Vec<DataPoint>> {
    let mut inputs = Vec::with_capacity(def.dependencies.len());
    for dep in def.dependencies {
        inputs.push(db::get_data_points(pool, dep, None).await?);
    }

    match def.id {
        // Dependency order: [fed_balance_sheet, rrp, tga].
        "net_liquidity" => {
            if inputs.len() < 3 {
                return Err(anyhow!("net_liquidity requires 3 inputs: Fed assets, RRP, TGA"));
            }
            Ok(liquidity::calculate_net_liquidity(
                &inputs[0], &inputs[1], &inputs[2],
            ))
        }
        other => Err(anyhow!("no calculator registered for '{}'", other)),
    }
}
