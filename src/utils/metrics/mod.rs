//! Metrics module for the application.
//!
//! - This module contains the global Prometheus registry.
//! - Defines the scanner, trigger and trade metrics.

pub mod server;
use lazy_static::lazy_static;
use prometheus::{Encoder, Gauge, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

lazy_static! {
	// Global Prometheus registry.
	pub static ref REGISTRY: Registry = Registry::new();

	// Counter of blocks fully processed by the scanner.
	pub static ref BLOCKS_PROCESSED: IntCounter = {
		let counter = IntCounter::new("blocks_processed_total", "Blocks fully matched, aggregated and evaluated").unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	// Counter of transactions that passed the router and selector filter.
	pub static ref MATCHED_TRANSACTIONS: IntCounter = {
		let counter = IntCounter::new("matched_transactions_total", "Transactions matching the swap pattern").unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	// Counter of positive threshold evaluations.
	pub static ref TRIGGERS: IntCounter = {
		let counter = IntCounter::new("triggers_total", "Positive threshold evaluations").unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	// Purchases by outcome (the failure kind, `success` or `simulated`).
	pub static ref PURCHASES: IntCounterVec = {
		let counter = IntCounterVec::new(
			Opts::new("purchases_total", "Purchase attempts by outcome"),
			&["outcome"]
		).unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	// Counter of endpoint reselections after transient failures.
	pub static ref ENDPOINT_RECONNECTS: IntCounter = {
		let counter = IntCounter::new("endpoint_reconnects_total", "Endpoint selections triggered by failures").unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	// Gauge holding the scan cursor.
	pub static ref LAST_CHECKED_BLOCK: Gauge = {
		let gauge = Gauge::new("last_checked_block", "Highest fully processed block").unwrap();
		REGISTRY.register(Box::new(gauge.clone())).unwrap();
		gauge
	};
}

/// Gather all metrics and encode into the provided format.
pub fn gather_metrics() -> Result<Vec<u8>, Box<dyn std::error::Error>> {
	let encoder = TextEncoder::new();
	let metric_families = REGISTRY.gather();
	let mut buffer = Vec::new();
	encoder.encode(&metric_families, &mut buffer)?;
	Ok(buffer)
}

/// Records a fully processed block and moves the cursor gauge.
pub fn record_block_processed(block_number: u64) {
	BLOCKS_PROCESSED.inc();
	LAST_CHECKED_BLOCK.set(block_number as f64);
}

/// Records the outcome label of a purchase attempt.
pub fn record_purchase(outcome: &str) {
	PURCHASES.with_label_values(&[outcome]).inc();
}
