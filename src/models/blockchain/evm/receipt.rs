//! EVM transaction receipt data structures.

use alloy::primitives::{Log, TxHash, U64};
use serde::{Deserialize, Serialize};

/// Subset of `eth_getTransactionReceipt` used for volume accounting and confirmations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EVMReceipt {
	pub transaction_hash: TxHash,
	#[serde(default)]
	pub block_number: Option<U64>,
	#[serde(default)]
	pub gas_used: U64,
	/// `0x1` on success, `0x0` on revert; absent on pre-Byzantium chains
	#[serde(default)]
	pub status: Option<U64>,
	#[serde(default)]
	pub logs: Vec<Log>,
}

impl EVMReceipt {
	/// Whether execution succeeded; receipts without a status field count as successful
	pub fn succeeded(&self) -> bool {
		self.status.map(|status| status == U64::from(1)).unwrap_or(true)
	}

	pub fn block_number(&self) -> Option<u64> {
		self.block_number.map(|number| number.to::<u64>())
	}

	pub fn gas_used(&self) -> u64 {
		self.gas_used.to::<u64>()
	}
}
