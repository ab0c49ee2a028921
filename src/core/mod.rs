pub mod liquidity;
pub mod refresh;
pub mod stats;
pub mod status;
pub mod timeseries;
