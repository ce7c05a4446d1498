//! Block filtering: matching, extraction, volume accounting and aggregation.

use futures::future::join_all;
use tracing::instrument;

use crate::{
	models::{EVMBlock, TransactionView},
	services::{
		blockchain::EvmClientTrait,
		filter::{
			aggregate::BlockAggregate, calldata::ExtractionError, error::FilterError,
			matcher::PatternMatcher,
		},
	},
	utils::metrics::MATCHED_TRANSACTIONS,
};

/// Turns a block into per-asset match records
#[derive(Debug, Clone)]
pub struct FilterService {
	matcher: PatternMatcher,
}

impl FilterService {
	pub fn new(matcher: PatternMatcher) -> Self {
		Self { matcher }
	}

	pub fn matcher(&self) -> &PatternMatcher {
		&self.matcher
	}

	/// Matches every transaction in `block` and aggregates the matches by asset
	///
	/// Transaction bodies missing from the block and receipts of matched transactions are
	/// fetched concurrently. A transient failure fetching a body fails the whole block so
	/// it can be retried; a failed receipt only loses that transaction's volume.
	///
	/// # Arguments
	/// * `client` - Chain client for bodies and receipts
	/// * `block` - The block to process
	///
	/// # Returns
	/// * `Result<BlockAggregate, FilterError>` - One record per matched asset
	#[instrument(skip_all, fields(block = block.number()))]
	pub async fn filter_block<C: EvmClientTrait>(
		&self,
		client: &C,
		block: &EVMBlock,
	) -> Result<BlockAggregate, FilterError> {
		let transactions = self.collect_transactions(client, block).await?;

		let mut candidates = Vec::new();
		for tx in transactions {
			if !self.matcher.matches(&tx) {
				continue;
			}
			MATCHED_TRANSACTIONS.inc();

			match self.matcher.extract_asset(&tx) {
				Ok(asset) => candidates.push((asset, tx)),
				Err(e @ ExtractionError::UnrecognizedEncoding { .. }) => {
					tracing::warn!("Skipping {}: {}", tx.hash, e);
				}
				Err(e) => {
					tracing::debug!("Skipping {}: {}", tx.hash, e);
				}
			}
		}

		tracing::debug!("{} matched transactions with an asset", candidates.len());

		let receipts = join_all(
			candidates
				.iter()
				.map(|(_, tx)| client.get_transaction_receipt(tx.hash)),
		)
		.await;

		let mut aggregate = BlockAggregate::new();
		for ((asset, tx), receipt) in candidates.into_iter().zip(receipts) {
			let volume = match receipt {
				Ok(Some(receipt)) => self.matcher.transfer_volume(&receipt),
				Ok(None) => {
					tracing::warn!("No receipt for {}, counting zero volume", tx.hash);
					Default::default()
				}
				Err(e) => {
					tracing::warn!(
						"Failed to fetch receipt for {}, counting zero volume: {}",
						tx.hash,
						e
					);
					Default::default()
				}
			};
			aggregate.fold(asset, tx, volume);
		}

		Ok(aggregate)
	}

	/// Full transaction objects of `block`, fetching bodies the node left out
	async fn collect_transactions<C: EvmClientTrait>(
		&self,
		client: &C,
		block: &EVMBlock,
	) -> Result<Vec<TransactionView>, FilterError> {
		let mut transactions: Vec<TransactionView> = block.full_transactions().cloned().collect();

		let missing = block.hashes_without_body();
		if missing.is_empty() {
			return Ok(transactions);
		}

		tracing::debug!("Fetching {} transaction bodies", missing.len());
		let fetched = join_all(missing.iter().map(|hash| client.get_transaction(*hash))).await;

		for (hash, result) in missing.iter().zip(fetched) {
			match result {
				Ok(Some(tx)) => transactions.push(tx),
				Ok(None) => tracing::warn!("Transaction {} not found", hash),
				Err(e) if e.is_transient() => {
					return Err(FilterError::network_error(format!(
						"failed to fetch transaction {}: {}",
						hash, e
					)))
				}
				Err(e) => tracing::warn!("Skipping transaction {}: {}", hash, e),
			}
		}

		Ok(transactions)
	}
}
