//! Alert delivery for triggered assets.
//!
//! - `Notifier`: one alert channel
//! - `TelegramNotifier`: Bot API delivery to every configured chat
//! - `LogNotifier`: structured log events
//! - `NotificationService`: fans one payload out to all channels

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

mod error;
mod logger;
mod payload;
mod telegram;

pub use error::NotificationError;
pub use logger::LogNotifier;
pub use payload::AlertPayload;
pub use telegram::TelegramNotifier;

use crate::models::AlertSettings;

/// One alert channel
#[async_trait]
pub trait Notifier: Send + Sync {
	fn name(&self) -> &'static str;

	async fn notify(&self, payload: &AlertPayload) -> Result<(), NotificationError>;
}

/// Delivers alerts to every configured channel
#[derive(Clone, Default)]
pub struct NotificationService {
	notifiers: Vec<Arc<dyn Notifier>>,
}

impl NotificationService {
	pub fn new(notifiers: Vec<Arc<dyn Notifier>>) -> Self {
		Self { notifiers }
	}

	/// Builds the log channel plus Telegram when it is configured
	pub fn from_settings(settings: &AlertSettings) -> Result<Self, NotificationError> {
		let mut notifiers: Vec<Arc<dyn Notifier>> = vec![Arc::new(LogNotifier::new())];
		if let Some(telegram) = &settings.telegram {
			notifiers.push(Arc::new(TelegramNotifier::new(None, telegram)?));
		}
		Ok(Self::new(notifiers))
	}

	pub fn len(&self) -> usize {
		self.notifiers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.notifiers.is_empty()
	}

	/// Sends `payload` to each channel and returns how many accepted it
	pub async fn execute(&self, payload: &AlertPayload) -> usize {
		let mut delivered = 0;
		for notifier in &self.notifiers {
			match notifier.notify(payload).await {
				Ok(()) => delivered += 1,
				Err(e) => warn!("{} notifier failed: {}", notifier.name(), e),
			}
		}
		delivered
	}
}
