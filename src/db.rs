use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use tracing::info;

use crate::analysis::signals::Signal;
use crate::models::{DataPoint, Indicator};
use crate::registry;

pub async fn init(database_url: &str) -> Result<SqlitePool> {
    info!("Connecting to SQLite database: {}", database_url);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database initialized");
    Ok(pool)
}

/// Upserts every registry indicator into the `indicators` table so that
/// stored data always joins against current metadata.
pub async fn seed_indicators(pool: &SqlitePool) -> Result<()> {
    for def in registry::all() {
        sqlx::query(
            "INSERT INTO indicators
                (id, name, source, series_id, market, category, unit, unit_divisor, direction, is_primary, is_computed)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             ON CONFLICT (id) DO UPDATE
             SET name = EXCLUDED.name,
                 source = EXCLUDED.source,
                 series_id = EXCLUDED.series_id,
                 market = EXCLUDED.market,
                 category = EXCLUDED.category,
                 unit = EXCLUDED.unit,
                 unit_divisor = EXCLUDED.unit_divisor,
                 direction = EXCLUDED.direction,
                 is_primary = EXCLUDED.is_primary,
                 is_computed = EXCLUDED.is_computed,
                 updated_at = CURRENT_TIMESTAMP",
        )
        .bind(def.id)
        .bind(def.name)
        .bind(def.source_name())
        .bind(def.series_id)
        .bind(def.market)
        .bind(def.category)
        .bind(def.unit)
        .bind(def.unit_divisor)
        .bind(def.direction.as_str())
        .bind(def.is_primary)
        .bind(def.is_computed())
        .execute(pool)
        .await?;
    }

    info!("Seeded {} indicators from registry", registry::all().len());
    Ok(())
}

/// Saves data points, replacing any existing observation for the same
/// (indicator_id, timestamp) key. Returns the number of points written.
pub async fn save_data_points(pool: &SqlitePool, points: &[DataPoint]) -> Result<u64> {
    if points.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;

    for dp in points {
        let metadata = if dp.metadata.is_null() {
            None
        } else {
            Some(dp.metadata.to_string())
        };

        sqlx::query(
            "INSERT INTO data_points (indicator_id, timestamp, value, source, market, metadata)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (indicator_id, timestamp) DO UPDATE
             SET value = EXCLUDED.value,
                 source = EXCLUDED.source,
                 metadata = EXCLUDED.metadata",
        )
        .bind(&dp.indicator_id)
        .bind(dp.timestamp)
        .bind(dp.value)
        .bind(&dp.source)
        .bind(&dp.market)
        .bind(metadata)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(points.len() as u64)
}

fn row_to_data_point(row: &sqlx::sqlite::SqliteRow) -> Result<DataPoint> {
    let metadata = row
        .try_get::<Option<String>, _>("metadata")?
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or(serde_json::Value::Null);

    Ok(DataPoint {
        timestamp: row.try_get("timestamp")?,
        indicator_id: row.try_get("indicator_id")?,
        value: row.try_get("value")?,
        source: row.try_get("source")?,
        market: row.try_get("market")?,
        metadata,
    })
}

/// Fetches an indicator's full series, ascending by timestamp. Pass `since`
/// to limit how far back the query reaches.
pub async fn get_data_points(
    pool: &SqlitePool,
    indicator_id: &str,
    since: Option<DateTime<Utc>>,
) -> Result<Vec<DataPoint>> {
    let rows = match since {
        Some(cutoff) => {
            sqlx::query(
                "SELECT indicator_id, timestamp, value, source, market, metadata
                 FROM data_points
                 WHERE indicator_id = $1 AND timestamp >= $2
                 ORDER BY timestamp ASC",
            )
            .bind(indicator_id)
            .bind(cutoff)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query(
                "SELECT indicator_id, timestamp, value, source, market, metadata
                 FROM data_points
                 WHERE indicator_id = $1
                 ORDER BY timestamp ASC",
            )
            .bind(indicator_id)
            .fetch_all(pool)
            .await?
        }
    };

    rows.iter().map(row_to_data_point).collect()
}

pub async fn get_latest_data_point(
    pool: &SqlitePool,
    indicator_id: &str,
) -> Result<Option<DataPoint>> {
    let row = sqlx::query(
        "SELECT indicator_id, timestamp, value, source, market, metadata
         FROM data_points
         WHERE indicator_id = $1
         ORDER BY timestamp DESC
         LIMIT 1",
    )
    .bind(indicator_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(row_to_data_point).transpose()
}

pub async fn get_all_indicators(pool: &SqlitePool) -> Result<Vec<Indicator>> {
    let rows = sqlx::query(
        "SELECT id, name, source, series_id, market, category, unit, unit_divisor,
                direction, is_primary, is_computed
         FROM indicators
         ORDER BY market, is_primary DESC, id",
    )
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(Indicator {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                source: row.try_get("source")?,
                series_id: row.try_get("series_id")?,
                market: row.try_get("market")?,
                category: row.try_get("category")?,
                unit: row.try_get("unit")?,
                unit_divisor: row.try_get("unit_divisor")?,
                direction: row.try_get("direction")?,
                is_primary: row.try_get("is_primary")?,
                is_computed: row.try_get("is_computed")?,
            })
        })
        .collect()
}

/// Records a detected signal event.
pub async fn save_signal(pool: &SqlitePool, signal: &Signal) -> Result<()> {
    sqlx::query(
        "INSERT INTO signal_events
            (indicator_id, indicator_name, signal_type, severity, description,
             current_value, change_pct, detected_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(&signal.indicator_id)
    .bind(&signal.indicator_name)
    .bind(&signal.signal_type)
    .bind(signal.severity.as_str())
    .bind(&signal.description)
    .bind(signal.current_value)
    .bind(signal.change_pct)
    .bind(signal.detected_at)
    .execute(pool)
    .await?;

    Ok(())
}
