//! EVM transaction data structures.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use serde::{Deserialize, Serialize};

/// Read-only projection of a chain transaction
///
/// Deserializes directly from the transaction objects returned by `eth_getBlockByNumber`
/// and `eth_getTransactionByHash`, keeping only the fields the pattern matcher consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
	pub hash: TxHash,
	#[serde(default)]
	pub from: Option<Address>,
	/// Recipient, `None` for contract creation
	#[serde(default)]
	pub to: Option<Address>,
	#[serde(rename = "input", default)]
	pub data: Bytes,
	#[serde(default)]
	pub value: U256,
}

impl TransactionView {
	/// Leading four bytes of the calldata, if present
	pub fn selector(&self) -> Option<[u8; 4]> {
		self.data.get(..4).and_then(|bytes| bytes.try_into().ok())
	}

	/// Whether the transaction calls `address`
	pub fn is_call_to(&self, address: &Address) -> bool {
		self.to.as_ref() == Some(address)
	}
}
