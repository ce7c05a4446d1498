//! Per-block aggregation of matched swaps by asset.

use alloy::primitives::{Address, U256};
use std::collections::HashMap;

use crate::models::{MatchRecord, TransactionView};

/// Match records for a single block, one per asset
#[derive(Debug, Clone, Default)]
pub struct BlockAggregate {
	records: HashMap<Address, MatchRecord>,
}

impl BlockAggregate {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds one matched transaction to its asset's record
	pub fn fold(&mut self, asset: Address, tx: TransactionView, volume: U256) {
		self.records
			.entry(asset)
			.or_insert_with(|| MatchRecord::new(asset))
			.record(tx, volume);
	}

	pub fn get(&self, asset: &Address) -> Option<&MatchRecord> {
		self.records.get(asset)
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	/// Total matched transactions across all assets
	pub fn match_count(&self) -> u64 {
		self.records.values().map(|record| record.match_count).sum()
	}

	/// Consumes the aggregate, returning records ordered by asset address
	pub fn into_records(self) -> Vec<MatchRecord> {
		let mut records: Vec<MatchRecord> = self.records.into_values().collect();
		records.sort_by(|a, b| a.asset.cmp(&b.asset));
		records
	}
}
