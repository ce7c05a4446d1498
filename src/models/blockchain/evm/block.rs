//! EVM block data structures.

use alloy::primitives::{TxHash, B256, U64};
use serde::{Deserialize, Serialize};

use super::TransactionView;

/// Entry of a block's transaction list
///
/// Nodes return full objects when asked for them, but some only ever return hashes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockTransaction {
	Full(TransactionView),
	Hash(TxHash),
}

/// Block header plus transaction list, as returned by `eth_getBlockByNumber`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EVMBlock {
	pub number: U64,
	#[serde(default)]
	pub hash: Option<B256>,
	#[serde(default)]
	pub timestamp: U64,
	#[serde(default)]
	pub transactions: Vec<BlockTransaction>,
}

impl EVMBlock {
	/// Get the block number
	pub fn number(&self) -> u64 {
		self.number.to::<u64>()
	}

	/// Transactions delivered with their bodies
	pub fn full_transactions(&self) -> impl Iterator<Item = &TransactionView> {
		self.transactions.iter().filter_map(|tx| match tx {
			BlockTransaction::Full(view) => Some(view),
			BlockTransaction::Hash(_) => None,
		})
	}

	/// Hashes of transactions delivered without a body
	pub fn hashes_without_body(&self) -> Vec<TxHash> {
		self.transactions
			.iter()
			.filter_map(|tx| match tx {
				BlockTransaction::Hash(hash) => Some(*hash),
				BlockTransaction::Full(_) => None,
			})
			.collect()
	}
}
