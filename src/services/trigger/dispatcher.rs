//! Trigger dispatch: purchase first, then alert.
//!
//! Dispatch is awaited by the scanner, so the cursor only moves past a block once every
//! trigger in it has been handled.

use alloy::primitives::utils::format_units;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::{
	models::{PurchaseOptions, PurchaseRequest, PurchaseSuccess, TriggerEvent},
	services::{
		notification::{AlertPayload, NotificationService},
		trade::{PurchaseResult, TradeExecutorTrait},
		trigger::error::TriggerError,
	},
	utils::metrics::TRIGGERS,
};

/// Whether dispatch acts for real or only simulates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
	/// Purchases with the live budget and sends alerts
	#[default]
	Live,
	/// Dry-run purchases with the replay budget; no alerts
	Replay,
}

/// What dispatching one trigger did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
	pub alerts_delivered: usize,
	/// `None` when trading is disabled
	pub purchase: Option<PurchaseResult>,
}

/// A trigger and its dispatch outcome, as reported by replays
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerReport {
	pub event: TriggerEvent,
	pub outcome: DispatchOutcome,
}

/// Handles positive threshold evaluations
#[async_trait]
pub trait TriggerDispatcherTrait: Send + Sync {
	async fn dispatch(&self, event: &TriggerEvent) -> Result<DispatchOutcome, TriggerError>;
}

/// Dispatches triggers to the trade executor and the alert channels
pub struct TriggerDispatcher {
	executor: Option<Arc<dyn TradeExecutorTrait>>,
	notifications: NotificationService,
	mode: DispatchMode,
	budget: String,
	explorer_url: String,
}

impl TriggerDispatcher {
	/// Creates a new dispatcher
	///
	/// # Arguments
	/// * `executor` - Trade executor, `None` to only alert
	/// * `notifications` - Alert channels, used in live mode only
	/// * `mode` - Live or replay behavior
	/// * `budget` - Whole reference units spent per trigger
	/// * `explorer_url` - Base URL for links in alerts
	pub fn new(
		executor: Option<Arc<dyn TradeExecutorTrait>>,
		notifications: NotificationService,
		mode: DispatchMode,
		budget: impl Into<String>,
		explorer_url: impl Into<String>,
	) -> Self {
		Self {
			executor,
			notifications,
			mode,
			budget: budget.into(),
			explorer_url: explorer_url.into(),
		}
	}

	pub fn mode(&self) -> DispatchMode {
		self.mode
	}
}

/// One-line description of a purchase outcome for alerts
pub fn purchase_summary(result: &PurchaseResult) -> String {
	match result {
		Ok(PurchaseSuccess::Executed {
			symbol,
			tx_hash,
			received_amount,
			..
		}) => format!("bought {} {} in {}", received_amount, symbol, tx_hash),
		Ok(PurchaseSuccess::Simulated {
			symbol,
			quoted_amount,
			..
		}) => format!("simulated, quoted {} {}", quoted_amount, symbol),
		Err(e) => format!("failed ({}): {}", e.kind, e.message),
	}
}

#[async_trait]
impl TriggerDispatcherTrait for TriggerDispatcher {
	#[instrument(skip_all, fields(block = event.block_number, asset = %event.record.asset))]
	async fn dispatch(&self, event: &TriggerEvent) -> Result<DispatchOutcome, TriggerError> {
		TRIGGERS.inc();
		info!(
			"trigger: {} matches, volume {}",
			event.record.match_count,
			format_units(event.record.total_reference_volume, event.reference_decimals)
				.unwrap_or_else(|_| event.record.total_reference_volume.to_string())
		);

		let purchase = match &self.executor {
			Some(executor) => {
				let request = PurchaseRequest::new(event.record.asset.to_string(), &self.budget);
				let options = PurchaseOptions {
					dry_run: self.mode == DispatchMode::Replay,
					fee_tier: None,
				};
				Some(executor.purchase(&request, &options).await)
			}
			None => None,
		};

		if self.mode == DispatchMode::Replay {
			return Ok(DispatchOutcome {
				alerts_delivered: 0,
				purchase,
			});
		}

		let mut payload = AlertPayload::from_event(event, &self.explorer_url);
		if let Some(result) = &purchase {
			payload = payload.with_purchase(purchase_summary(result));
		}

		let alerts_delivered = self.notifications.execute(&payload).await;
		if alerts_delivered == 0 && !self.notifications.is_empty() {
			warn!("no alert channel accepted block {}", event.block_number);
			return Err(TriggerError::delivery_error(format!(
				"alert for block {} reached none of {} channels",
				event.block_number,
				self.notifications.len()
			)));
		}

		Ok(DispatchOutcome {
			alerts_delivered,
			purchase,
		})
	}
}
