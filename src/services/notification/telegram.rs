//! Telegram notification implementation.
//!
//! Sends the rendered alert to every configured chat through the Bot API
//! `sendMessage` endpoint.

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use reqwest_retry::DefaultRetryableStrategy;
use std::time::Duration;
use tracing::{debug, warn};

use crate::{
	models::TelegramSettings,
	services::notification::{AlertPayload, NotificationError, Notifier},
	utils::http::{
		build_base_client, create_retryable_http_client, HttpRetryConfig, HttpTimeouts,
	},
};

const DEFAULT_BASE_URL: &str = "https://api.telegram.org";
const SEND_INTERVAL: Duration = Duration::from_millis(100);

/// Implementation of Telegram notifications via the Bot API
pub struct TelegramNotifier {
	client: ClientWithMiddleware,
	base_url: String,
	/// Telegram bot token
	token: String,
	/// Chats the alert is delivered to, in order
	chat_ids: Vec<String>,
	disable_web_preview: bool,
	send_interval: Duration,
}

impl TelegramNotifier {
	/// Creates a new Telegram notifier instance
	///
	/// # Arguments
	/// * `base_url` - Bot API base URL, `https://api.telegram.org` when `None`
	/// * `settings` - Token, chat ids and preview flag
	pub fn new(
		base_url: Option<String>,
		settings: &TelegramSettings,
	) -> Result<Self, NotificationError> {
		if settings.token.trim().is_empty() {
			return Err(NotificationError::config_error("telegram token is empty"));
		}

		let base_client = build_base_client(HttpTimeouts::default()).map_err(|e| {
			NotificationError::internal_error(format!("failed to build HTTP client: {}", e))
		})?;

		Ok(Self {
			client: create_retryable_http_client::<DefaultRetryableStrategy>(
				&HttpRetryConfig::notifications(),
				base_client,
				None,
			),
			base_url: base_url
				.unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
				.trim_end_matches('/')
				.to_string(),
			token: settings.token.clone(),
			chat_ids: settings.chat_ids.clone(),
			disable_web_preview: settings.disable_web_preview,
			send_interval: SEND_INTERVAL,
		})
	}

	/// Overrides the pause between consecutive chats
	pub fn with_send_interval(mut self, send_interval: Duration) -> Self {
		self.send_interval = send_interval;
		self
	}

	pub fn construct_url(&self, chat_id: &str, message: &str) -> String {
		format!(
			"{}/bot{}/sendMessage?chat_id={}&text={}&parse_mode=Markdown&\
			 disable_web_page_preview={}",
			self.base_url,
			self.token,
			urlencoding::encode(chat_id),
			urlencoding::encode(message),
			self.disable_web_preview
		)
	}

	async fn send(&self, chat_id: &str, message: &str) -> Result<(), NotificationError> {
		let url = self.construct_url(chat_id, message);
		let response = self.client.get(&url).send().await?;

		if !response.status().is_success() {
			return Err(NotificationError::network_error(format!(
				"Telegram returned {} for chat {}",
				response.status(),
				chat_id
			)));
		}
		Ok(())
	}
}

#[async_trait]
impl Notifier for TelegramNotifier {
	fn name(&self) -> &'static str {
		"telegram"
	}

	/// Delivers the alert to every chat; one failing chat does not stop the rest
	///
	/// # Returns
	/// * `Result<(), NotificationError>` - Error only if no chat received the alert
	async fn notify(&self, payload: &AlertPayload) -> Result<(), NotificationError> {
		if self.chat_ids.is_empty() {
			debug!("no telegram chats configured");
			return Ok(());
		}

		let message = payload.to_markdown();
		let mut delivered = 0usize;

		for (index, chat_id) in self.chat_ids.iter().enumerate() {
			match self.send(chat_id, &message).await {
				Ok(()) => delivered += 1,
				Err(e) => warn!("failed to alert chat {}: {}", chat_id, e),
			}
			if index + 1 < self.chat_ids.len() {
				tokio::time::sleep(self.send_interval).await;
			}
		}

		if delivered == 0 {
			return Err(NotificationError::network_error(format!(
				"alert for block {} reached none of {} chats",
				payload.block_number,
				self.chat_ids.len()
			)));
		}
		debug!(
			"alert for block {} delivered to {}/{} chats",
			payload.block_number,
			delivered,
			self.chat_ids.len()
		);
		Ok(())
	}
}
