//! Per-block matching, aggregation and trigger models.

use alloy::primitives::{Address, TxHash, U256};
use serde::{Deserialize, Serialize};

use crate::models::TransactionView;

/// Activity aggregated for one asset within one block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
	pub asset: Address,
	pub match_count: u64,
	/// Sum of reference-token transfers, in the token's smallest unit
	pub total_reference_volume: U256,
	pub transactions: Vec<TransactionView>,
}

impl MatchRecord {
	pub fn new(asset: Address) -> Self {
		Self {
			asset,
			match_count: 0,
			total_reference_volume: U256::ZERO,
			transactions: Vec::new(),
		}
	}

	/// Adds one matched transaction and the reference volume it moved
	pub fn record(&mut self, tx: TransactionView, volume: U256) {
		self.match_count += 1;
		self.total_reference_volume = self.total_reference_volume.saturating_add(volume);
		self.transactions.push(tx);
	}

	pub fn tx_hashes(&self) -> Vec<TxHash> {
		self.transactions.iter().map(|tx| tx.hash).collect()
	}
}

/// Minimum activity an asset needs within one block to trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdPolicy {
	pub min_match_count: u64,
	/// Minimum reference volume in the token's smallest unit
	pub min_volume: U256,
}

impl ThresholdPolicy {
	pub const DEFAULT_MIN_MATCH_COUNT: u64 = 10;
	pub const DEFAULT_MIN_VOLUME_UNITS: u64 = 500;

	pub fn new(min_match_count: u64, min_volume: U256) -> Self {
		Self {
			min_match_count,
			min_volume,
		}
	}

	/// Default policy with the volume bound scaled to `decimals`
	pub fn with_decimals(decimals: u8) -> Self {
		let scale = U256::from(10u64).pow(U256::from(decimals));
		Self::new(
			Self::DEFAULT_MIN_MATCH_COUNT,
			U256::from(Self::DEFAULT_MIN_VOLUME_UNITS).saturating_mul(scale),
		)
	}
}

/// A positive threshold evaluation handed to the dispatcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerEvent {
	pub block_number: u64,
	pub record: MatchRecord,
	pub policy: ThresholdPolicy,
	pub reference_decimals: u8,
}
