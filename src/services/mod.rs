//! Core services of the swap monitor.
//!
//! - `blockchain`: JSON-RPC client, transports and endpoint selection
//! - `blockwatcher`: block scanning, replay and cursor persistence
//! - `filter`: swap matching, asset extraction, aggregation and thresholds
//! - `notification`: alert channels
//! - `trade`: purchase execution
//! - `trigger`: dispatch of threshold crossings

pub mod blockchain;
pub mod blockwatcher;
pub mod filter;
pub mod notification;
pub mod trade;
pub mod trigger;
