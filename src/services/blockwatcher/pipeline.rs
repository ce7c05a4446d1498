//! Per-block processing shared by the live loop and replays.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::{
	models::{ThresholdPolicy, TriggerEvent},
	services::{
		blockchain::EvmClientTrait,
		blockwatcher::error::BlockWatcherError,
		filter::{evaluate, FilterService},
		trigger::{TriggerDispatcherTrait, TriggerReport},
	},
};

/// Processes one block end to end
#[async_trait]
pub trait BlockHandler: Send + Sync {
	/// Fetches, matches, aggregates, evaluates and dispatches `block_number`
	///
	/// Returns once every trigger in the block has been dispatched.
	async fn handle_block(&self, block_number: u64) -> Result<Vec<TriggerReport>, BlockWatcherError>;
}

/// The matching pipeline: fetch, filter, evaluate, dispatch
pub struct BlockPipeline<C> {
	client: C,
	filter: FilterService,
	policy: ThresholdPolicy,
	reference_decimals: u8,
	dispatcher: Arc<dyn TriggerDispatcherTrait>,
}

impl<C: EvmClientTrait> BlockPipeline<C> {
	pub fn new(
		client: C,
		filter: FilterService,
		policy: ThresholdPolicy,
		reference_decimals: u8,
		dispatcher: Arc<dyn TriggerDispatcherTrait>,
	) -> Self {
		Self {
			client,
			filter,
			policy,
			reference_decimals,
			dispatcher,
		}
	}

	pub fn policy(&self) -> &ThresholdPolicy {
		&self.policy
	}
}

#[async_trait]
impl<C: EvmClientTrait> BlockHandler for BlockPipeline<C> {
	#[instrument(skip(self))]
	async fn handle_block(&self, block_number: u64) -> Result<Vec<TriggerReport>, BlockWatcherError> {
		let block = self.client.get_block(block_number).await?;
		let aggregate = self.filter.filter_block(&self.client, &block).await?;

		let mut reports = Vec::new();
		for record in aggregate.into_records() {
			if !evaluate(&record, &self.policy) {
				debug!(
					"{} below threshold: {} matches, volume {}",
					record.asset, record.match_count, record.total_reference_volume
				);
				continue;
			}

			let event = TriggerEvent {
				block_number,
				record,
				policy: self.policy,
				reference_decimals: self.reference_decimals,
			};
			match self.dispatcher.dispatch(&event).await {
				Ok(outcome) => reports.push(TriggerReport { event, outcome }),
				Err(e) => warn!("dispatch for {} failed: {}", event.record.asset, e),
			}
		}

		Ok(reports)
	}
}
