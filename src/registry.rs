use once_cell::sync::Lazy;
use serde::Serialize;

use crate::core::status::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SourceType {
    Fred,
    CoinGecko,
    Calculated,
}

/// Static definition of one indicator: where it comes from, how to normalize
/// it, and how its movements should be read.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorDef {
    pub id: &'static str,
    pub name: &'static str,
    pub source: SourceType,
    /// Provider symbol (FRED series ID, CoinGecko coin slug). None for
    /// computed indicators.
    pub series_id: Option<&'static str>,
    pub market: &'static str,
    pub category: &'static str,
    pub unit: &'static str,
    /// Raw provider value is divided by this at fetch time. FRED mixes
    /// millions and billions across series; everything is stored in billions
    /// USD so the net liquidity subtraction is unit-safe.
    pub unit_divisor: f64,
    pub direction: Direction,
    pub is_primary: bool,
    /// Indicator IDs a computed indicator is derived from, in the order the
    /// calculator expects them.
    pub dependencies: &'static [&'static str],
}

impl IndicatorDef {
    pub fn is_computed(&self) -> bool {
        self.source == SourceType::Calculated
    }

    pub fn source_name(&self) -> &'static str {
        match self.source {
            SourceType::Fred => "FRED",
            SourceType::CoinGecko => "CoinGecko",
            SourceType::Calculated => "calculated",
        }
    }
}

// ============================================================================
// STATIC INDICATOR CATALOG (Lazy initialization, iterated at startup)
// ============================================================================

static INDICATORS: Lazy<Vec<IndicatorDef>> = Lazy::new(|| {
    vec![
        // --- US liquidity complex -------------------------------------------
        IndicatorDef {
            id: "fed_balance_sheet",
            name: "Fed Balance Sheet",
            source: SourceType::Fred,
            series_id: Some("WALCL"), // millions of dollars
            market: "us",
            category: "liquidity",
            unit: "B USD",
            unit_divisor: 1_000.0,
            direction: Direction::UpIsLoose,
            is_primary: false,
            dependencies: &[],
        },
        IndicatorDef {
            id: "rrp",
            name: "Overnight Reverse Repo",
            source: SourceType::Fred,
            series_id: Some("RRPONTSYD"), // billions of dollars
            market: "us",
            category: "liquidity",
            unit: "B USD",
            unit_divisor: 1.0,
            direction: Direction::DownIsLoose,
            is_primary: false,
            dependencies: &[],
        },
        IndicatorDef {
            id: "tga",
            name: "Treasury General Account",
            source: SourceType::Fred,
            series_id: Some("WTREGEN"), // billions of dollars
            market: "us",
            category: "liquidity",
            unit: "B USD",
            unit_divisor: 1.0,
            direction: Direction::DownIsLoose,
            is_primary: false,
            dependencies: &[],
        },
        IndicatorDef {
            id: "net_liquidity",
            name: "Net Liquidity (Fed - RRP - TGA)",
            source: SourceType::Calculated,
            series_id: None,
            market: "us",
            category: "liquidity",
            unit: "B USD",
            unit_divisor: 1.0,
            direction: Direction::UpIsLoose,
            is_primary: true,
            dependencies: &["fed_balance_sheet", "rrp", "tga"],
        },
        // --- US macro -------------------------------------------------------
        IndicatorDef {
            id: "m2_us",
            name: "M2 Money Stock",
            source: SourceType::Fred,
            series_id: Some("M2SL"), // billions of dollars
            market: "us",
            category: "macro",
            unit: "B USD",
            unit_divisor: 1.0,
            direction: Direction::UpIsLoose,
            is_primary: false,
            dependencies: &[],
        },
        IndicatorDef {
            id: "fed_funds_rate",
            name: "Federal Funds Rate",
            source: SourceType::Fred,
            series_id: Some("DFF"),
            market: "us",
            category: "macro",
            unit: "%",
            unit_divisor: 1.0,
            direction: Direction::DownIsLoose,
            is_primary: false,
            dependencies: &[],
        },
        IndicatorDef {
            id: "us_10y",
            name: "US 10Y Treasury Yield",
            source: SourceType::Fred,
            series_id: Some("DGS10"),
            market: "us",
            category: "macro",
            unit: "%",
            unit_divisor: 1.0,
            direction: Direction::DownIsLoose,
            is_primary: false,
            dependencies: &[],
        },
        // --- Crypto ---------------------------------------------------------
        IndicatorDef {
            id: "btc_price",
            name: "Bitcoin Price",
            source: SourceType::CoinGecko,
            series_id: Some("PRICE_BITCOIN"),
            market: "crypto",
            category: "price",
            unit: "USD",
            unit_divisor: 1.0,
            direction: Direction::UpIsLoose,
            is_primary: true,
            dependencies: &[],
        },
        IndicatorDef {
            id: "eth_price",
            name: "Ethereum Price",
            source: SourceType::CoinGecko,
            series_id: Some("PRICE_ETHEREUM"),
            market: "crypto",
            category: "price",
            unit: "USD",
            unit_divisor: 1.0,
            direction: Direction::UpIsLoose,
            is_primary: false,
            dependencies: &[],
        },
        IndicatorDef {
            id: "total_crypto_mcap",
            name: "Total Crypto Market Cap",
            source: SourceType::CoinGecko,
            series_id: Some("TOTAL_MCAP"), // raw USD from /global
            market: "crypto",
            category: "breadth",
            unit: "B USD",
            unit_divisor: 1_000_000_000.0,
            direction: Direction::UpIsLoose,
            is_primary: false,
            dependencies: &[],
        },
    ]
});

pub fn all() -> &'static [IndicatorDef] {
    &INDICATORS
}

pub fn get(id: &str) -> Option<&'static IndicatorDef> {
    INDICATORS.iter().find(|def| def.id == id)
}

/// Indicators pulled from an external provider.
pub fn fetched() -> Vec<&'static IndicatorDef> {
    INDICATORS.iter().filter(|def| !def.is_computed()).collect()
}

/// Indicators derived from already-stored series. Listed after their
/// dependencies so a single pass resolves them.
pub fn computed() -> Vec<&'static IndicatorDef> {
    INDICATORS.iter().filter(|def| def.is_computed()).collect()
}

pub fn for_market(market: &str) -> Vec<&'static IndicatorDef> {
    INDICATORS
        .iter()
        .filter(|def| def.market == market)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let mut ids: Vec<&str> = INDICATORS.iter().map(|d| d.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), INDICATORS.len());
    }

    #[test]
    fn test_computed_dependencies_exist() {
        for def in computed() {
            assert!(!def.dependencies.is_empty(), "{} has no inputs", def.id);
            for dep in def.dependencies {
                assert!(get(dep).is_some(), "{} depends on unknown {}", def.id, dep);
            }
        }
    }

    #[test]
    fn test_fetched_indicators_have_series_ids() {
        for def in fetched() {
            assert!(def.series_id.is_some(), "{} missing series_id", def.id);
        }
    }

    #[test]
    fn test_net_liquidity_is_primary_for_us() {
        let primary: Vec<_> = for_market("us")
            .into_iter()
            .filter(|d| d.is_primary)
            .collect();
        assert_eq!(primary.len(), 1);
        assert_eq!(primary[0].id, "net_liquidity");
    }

    #[test]
    fn test_each_market_has_one_primary() {
        let mut markets: Vec<&str> = INDICATORS.iter().map(|d| d.market).collect();
        markets.sort();
        markets.dedup();
        assert!(markets.contains(&"crypto"));
        for market in markets {
            let primary: Vec<_> = for_market(market)
                .into_iter()
                .filter(|d| d.is_primary)
                .collect();
            assert_eq!(primary.len(), 1, "market {} primaries", market);
        }
    }
}
