use async_trait::async_trait;
use mockall::mock;

use surge_monitor::{
	models::{PurchaseOptions, PurchaseRequest, TriggerEvent},
	services::{
		blockwatcher::{BlockHandler, BlockWatcherError, CursorStorage},
		notification::{AlertPayload, NotificationError, Notifier},
		trade::{PurchaseResult, TradeExecutorTrait},
		trigger::{DispatchOutcome, TriggerDispatcherTrait, TriggerError, TriggerReport},
	},
};

mock! {
	pub TradeExecutor {}

	#[async_trait]
	impl TradeExecutorTrait for TradeExecutor {
		async fn purchase(&self, request: &PurchaseRequest, options: &PurchaseOptions) -> PurchaseResult;
	}
}

mock! {
	pub Notifier {}

	#[async_trait]
	impl Notifier for Notifier {
		fn name(&self) -> &'static str;
		async fn notify(&self, payload: &AlertPayload) -> Result<(), NotificationError>;
	}
}

mock! {
	pub TriggerDispatcher {}

	#[async_trait]
	impl TriggerDispatcherTrait for TriggerDispatcher {
		async fn dispatch(&self, event: &TriggerEvent) -> Result<DispatchOutcome, TriggerError>;
	}
}

mock! {
	pub BlockHandler {}

	#[async_trait]
	impl BlockHandler for BlockHandler {
		async fn handle_block(&self, block_number: u64) -> Result<Vec<TriggerReport>, BlockWatcherError>;
	}
}

mock! {
	pub CursorStorage {}

	#[async_trait]
	impl CursorStorage for CursorStorage {
		async fn get_last_processed_block(&self, monitor: &str) -> Result<Option<u64>, BlockWatcherError>;
		async fn save_last_processed_block(&self, monitor: &str, block_number: u64) -> Result<(), BlockWatcherError>;
	}
}
