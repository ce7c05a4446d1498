//! HTTP client construction shared by the RPC transport and the notifiers.
//!
//! Every outbound client is a plain `reqwest::Client` wrapped in retry middleware. The plain
//! client stays available for calls that must not be retried, such as endpoint liveness
//! probes.

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{
	policies::ExponentialBackoff, Jitter, RetryTransientMiddleware, RetryableStrategy,
};
use std::time::Duration;

/// Configuration for HTTP retry policies
#[derive(Debug, Clone)]
pub struct HttpRetryConfig {
	/// Maximum number of retries for transient errors
	pub max_retries: u32,
	/// Base duration for exponential backoff calculations
	pub base_for_backoff: u32,
	/// Initial backoff duration before the first retry
	pub initial_backoff: Duration,
	/// Maximum backoff duration for retries
	pub max_backoff: Duration,
	/// Jitter to apply to the backoff duration
	pub jitter: Jitter,
}

impl Default for HttpRetryConfig {
	fn default() -> Self {
		Self {
			max_retries: 3,
			base_for_backoff: 2,
			initial_backoff: Duration::from_millis(250),
			max_backoff: Duration::from_secs(10),
			jitter: Jitter::Full,
		}
	}
}

impl HttpRetryConfig {
	/// Retry policy for notification delivery, where a late message is worth little
	pub fn notifications() -> Self {
		Self {
			max_retries: 2,
			max_backoff: Duration::from_secs(2),
			..Self::default()
		}
	}

	fn backoff(&self) -> ExponentialBackoff {
		ExponentialBackoff::builder()
			.base(self.base_for_backoff)
			.retry_bounds(self.initial_backoff, self.max_backoff)
			.jitter(self.jitter)
			.build_with_max_retries(self.max_retries)
	}
}

/// Timeouts applied to the underlying `reqwest::Client`
#[derive(Debug, Clone, Copy)]
pub struct HttpTimeouts {
	pub request: Duration,
	pub connect: Duration,
}

impl Default for HttpTimeouts {
	fn default() -> Self {
		Self {
			request: Duration::from_secs(30),
			connect: Duration::from_secs(20),
		}
	}
}

/// Builds the pooled base client every retrying client wraps
pub fn build_base_client(timeouts: HttpTimeouts) -> Result<reqwest::Client, reqwest::Error> {
	reqwest::ClientBuilder::new()
		.pool_idle_timeout(Duration::from_secs(90))
		.pool_max_idle_per_host(32)
		.timeout(timeouts.request)
		.connect_timeout(timeouts.connect)
		.build()
}

/// Creates a retryable HTTP client with middleware
///
/// # Arguments
/// * `config` - Configuration for retry policies
/// * `base_client` - The base HTTP client to wrap
/// * `custom_strategy` - Optional strategy deciding which failures are retried
pub fn create_retryable_http_client<S>(
	config: &HttpRetryConfig,
	base_client: reqwest::Client,
	custom_strategy: Option<S>,
) -> ClientWithMiddleware
where
	S: RetryableStrategy + Send + Sync + 'static,
{
	let retry_policy = config.backoff();

	if let Some(strategy) = custom_strategy {
		ClientBuilder::new(base_client).with(
			RetryTransientMiddleware::new_with_policy_and_strategy(retry_policy, strategy),
		)
	} else {
		ClientBuilder::new(base_client)
			.with(RetryTransientMiddleware::new_with_policy(retry_policy))
	}
	.build()
}
