//! Test helper utilities for monitor configuration
//!
//! - `MonitorConfigBuilder`: Builder for creating test MonitorConfig instances

use alloy::primitives::Address;

use crate::models::{
	CalldataSchema, MonitorConfig, ReferenceFunding, SwapRoute, TelegramSettings,
};

/// Builder for creating test MonitorConfig instances
#[derive(Default)]
pub struct MonitorConfigBuilder {
	config: MonitorConfig,
}

impl MonitorConfigBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn name(mut self, name: &str) -> Self {
		self.config.name = name.to_string();
		self
	}

	pub fn rpc_urls(mut self, urls: Vec<String>) -> Self {
		self.config.network.rpc_urls = urls;
		self
	}

	pub fn chain_id(mut self, chain_id: u64) -> Self {
		self.config.network.chain_id = Some(chain_id);
		self
	}

	pub fn probe_timeout_ms(mut self, timeout_ms: u64) -> Self {
		self.config.network.probe_timeout_ms = timeout_ms;
		self
	}

	pub fn schema(mut self, selector: &str, schema: CalldataSchema) -> Self {
		self.config.pattern.selector = selector.to_string();
		self.config.pattern.schema = schema;
		self
	}

	pub fn router(mut self, router: Address) -> Self {
		self.config.pattern.router = router;
		self.config.trade.router = router;
		self
	}

	pub fn policy(mut self, min_match_count: u64, min_volume: &str) -> Self {
		self.config.policy.min_match_count = min_match_count;
		self.config.policy.min_volume = min_volume.to_string();
		self
	}

	pub fn poll_interval_ms(mut self, interval_ms: u64) -> Self {
		self.config.scanner.poll_interval_ms = interval_ms;
		self
	}

	pub fn budget(mut self, budget: &str) -> Self {
		self.config.trade.budget = budget.to_string();
		self
	}

	pub fn funding(mut self, funding: ReferenceFunding) -> Self {
		self.config.trade.funding = funding;
		self
	}

	pub fn route(mut self, route: SwapRoute) -> Self {
		self.config.trade.route = route;
		self
	}

	pub fn max_slippage_bps(mut self, bps: u16) -> Self {
		self.config.trade.max_slippage_bps = Some(bps);
		self
	}

	/// Confirmation polling tuned for tests
	pub fn confirmation(mut self, max_attempts: u32, interval_ms: u64) -> Self {
		self.config.trade.confirmation.max_attempts = max_attempts;
		self.config.trade.confirmation.interval_ms = interval_ms;
		self
	}

	pub fn telegram(mut self, token: &str, chat_ids: &[&str]) -> Self {
		self.config.alerts.telegram = Some(TelegramSettings {
			token: token.to_string(),
			chat_ids: chat_ids.iter().map(|id| id.to_string()).collect(),
			disable_web_preview: true,
		});
		self
	}

	pub fn build(self) -> MonitorConfig {
		self.config
	}
}
