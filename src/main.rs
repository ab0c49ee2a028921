use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use liquidity_monitor::analysis::{self, signals};
use liquidity_monitor::collectors::coingecko::CoinGeckoCollector;
use liquidity_monitor::collectors::fred::FredCollector;
use liquidity_monitor::collectors::Collector;
use liquidity_monitor::config::Settings;
use liquidity_monitor::core::refresh;
use liquidity_monitor::db;

const MARKETS: &[(&str, &str)] = &[("us", "US LIQUIDITY"), ("crypto", "CRYPTO")];

/// One-shot refresh + dashboard. Fetches raw indicators (FRED needs an API
/// key, CoinGecko does not), recomputes derived series, and prints the
/// current market picture. Scheduling lives outside this binary: run it from
/// cron if you want it periodic.
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

    let mut collectors: Vec<Box<dyn Collector>> = vec![Box::new(CoinGeckoCollector::new(
        settings.coingecko_api_key.clone(),
    ))];
    if settings.fred_api_key.is_empty() {
        warn!("FRED_API_KEY not set; skipping FRED fetch (run generate_demo_data to seed demo series)");
    } else {
        collectors.push(Box::new(FredCollector::new(settings.fred_api_key.clone())));
    }

    let collector_refs: Vec<&dyn Collector> = collectors.iter().map(|c| c.as_ref()).collect();
    let refreshed = refresh::refresh_fetched(&pool, &collector_refs, &settings).await?;
    info!("Refreshed {} raw indicators", refreshed);

    refresh::refresh_computed(&pool).await?;

    let indicators = db::get_all_indicators(&pool).await?;
    info!("{} indicators registered", indicators.len());

    let mut all_overviews = Vec::new();
    for &(market, title) in MARKETS {
        let overviews = analysis::market_overview(&pool, market, &settings).await?;

        println!();
        println!("=================== {:^16} ===================", title);
        for item in &overviews {
            let value = item
                .current_value
                .map(|v| format!("{:.2} {}", v, item.unit))
                .unwrap_or_else(|| "no data".to_string());
            let change = item
                .changes
                .get("30d")
                .map(|c| format!("{:+.2}%", c.change_pct))
                .unwrap_or_else(|| "n/a".to_string());
            println!(
                "{} {:<32} {:>18}  30d {:>8}  {}",
                item.status.emoji,
                item.name,
                value,
                change,
                item.status.status.as_str()
            );
        }
        println!("====================================================");

        all_overviews.extend(overviews);
    }

    let detected = signals::detect_signals(&all_overviews);
    if detected.is_empty() {
        println!("No notable signals.");
    } else {
        println!("Signals:");
        for signal in &detected {
            println!("  [{}] {}", signal.severity.as_str(), signal.description);
            db::save_signal(&pool, signal).await?;
        }
    }

    Ok(())
}
