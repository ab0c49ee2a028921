//! Macro liquidity monitoring backend.
//!
//! Raw indicator series come in through [`collectors`], land in SQLite via
//! [`db`], and the pure pipeline in [`core`] derives net liquidity, change
//! statistics, and a five-level market status from whatever is stored.

pub mod analysis;
pub mod collectors;
pub mod config;
pub mod core;
pub mod db;
pub mod models;
pub mod registry;
