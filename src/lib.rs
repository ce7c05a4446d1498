//! Swap-pattern monitor.
//!
//! Watches a chain for swaps through a configured router, aggregates the matches per
//! target asset in each block and, when an asset crosses the configured activity and
//! volume thresholds, buys it and sends an alert.
//!
//! - `bootstrap`: wiring of clients, pipeline and scanner from a configuration
//! - `models`: configuration, RPC projections and domain types
//! - `services`: blockchain access, scanning, filtering, trading, triggers and alerts
//! - `utils`: logging, metrics, HTTP and retry helpers

pub mod bootstrap;
pub mod models;
pub mod services;
pub mod utils;
