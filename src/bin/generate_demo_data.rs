use anyhow::Result;
use chrono::{Duration, Utc};
use rand::Rng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use liquidity_monitor::config::Settings;
use liquidity_monitor::core::refresh;
use liquidity_monitor::db;
use liquidity_monitor::models::DataPoint;
use liquidity_monitor::registry::{self, IndicatorDef};

/// Seeds a year of synthetic indicator data so the dashboard works without
/// any API keys. Values are a random walk with a mild trend and seasonality,
/// scaled to each indicator's real-world ballpark (billions USD / percent).
struct SeriesProfile {
    base: f64,
    volatility: f64,
    trend: f64,
}

fn profile(indicator_id: &str) -> SeriesProfile {
    match indicator_id {
        "fed_balance_sheet" => SeriesProfile {
            base: 6_800.0,
            volatility: 0.005,
            trend: -0.0001,
        },
        "rrp" => SeriesProfile {
            base: 300.0,
            volatility: 0.03,
            trend: -0.002,
        },
        "tga" => SeriesProfile {
            base: 750.0,
            volatility: 0.05,
            trend: 0.0,
        },
        "m2_us" => SeriesProfile {
            base: 21_000.0,
            volatility: 0.003,
            trend: 0.0001,
        },
        "fed_funds_rate" => SeriesProfile {
            base: 4.5,
            volatility: 0.01,
            trend: -0.0001,
        },
        "us_10y" => SeriesProfile {
            base: 4.2,
            volatility: 0.02,
            trend: 0.0,
        },
        "btc_price" => SeriesProfile {
            base: 95_000.0,
            volatility: 0.025,
            trend: 0.001,
        },
        "eth_price" => SeriesProfile {
            base: 3_200.0,
            volatility: 0.03,
            trend: 0.0005,
        },
        "total_crypto_mcap" => SeriesProfile {
            base: 3_500.0,
            volatility: 0.025,
            trend: 0.001,
        },
        _ => SeriesProfile {
            base: 100.0,
            volatility: 0.02,
            trend: 0.0,
        },
    }
}

fn generate_series(def: &IndicatorDef, days: i64, rng: &mut impl Rng) -> Vec<DataPoint> {
    let p = profile(def.id);
    let mut value = p.base;
    let end = Utc::now();

    let mut points = Vec::with_capacity(days as usize);
    for i in (1..=days).rev() {
        let timestamp = (end - Duration::days(i))
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc();

        value *= 1.0 + p.trend;
        value *= 1.0 + rng.gen_range(-p.volatility..p.volatility);
        let seasonal = (i as f64 / 30.0 * std::f64::consts::PI).sin() * p.volatility * 0.5;
        value *= 1.0 + seasonal;

        points.push(DataPoint::new(timestamp, def.id, value, "demo", def.market));
    }

    points
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env();
    let pool = db::init(&settings.database_url).await?;
    db::seed_indicators(&pool).await?;

    let mut rng = rand::thread_rng();
    for def in registry::fetched() {
        let points = generate_series(def, 365, &mut rng);
        let saved = db::save_data_points(&pool, &points).await?;
        info!("{}: seeded {} demo points", def.id, saved);
    }

    refresh::refresh_computed(&pool).await?;
    info!("Demo data ready");
    Ok(())
}
