//! Alerting through the process log.

use async_trait::async_trait;
use tracing::info;

use crate::services::notification::{AlertPayload, NotificationError, Notifier};

/// Emits alerts as structured `tracing` events
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl LogNotifier {
	pub fn new() -> Self {
		Self
	}
}

#[async_trait]
impl Notifier for LogNotifier {
	fn name(&self) -> &'static str {
		"log"
	}

	async fn notify(&self, payload: &AlertPayload) -> Result<(), NotificationError> {
		info!(
			block = payload.block_number,
			asset = %payload.asset,
			match_count = payload.match_count,
			volume = %payload.total_volume,
			purchase = payload.purchase.as_deref().unwrap_or("none"),
			"trading conditions met"
		);
		Ok(())
	}
}
