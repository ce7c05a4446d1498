//! Retry policies for transient failures in async operations.
//!
//! Policies are `backon` builders; callers drive them with `backon::Retryable` and decide
//! per error whether another attempt is worthwhile.

use backon::{ConstantBuilder, ExponentialBuilder};
use std::time::Duration;

/// Configuration for retry behavior
#[derive(Clone, Debug)]
pub struct RetryConfig {
	/// Maximum number of retry attempts after the first failure
	pub max_retries: u32,

	/// Initial delay between retry attempts
	/// This delay will be exponentially increased with each retry
	pub initial_delay: Duration,

	/// Maximum delay between retry attempts
	/// The exponential backoff will not exceed this delay
	pub max_delay: Duration,
}

impl Default for RetryConfig {
	/// Creates a default retry configuration with:
	/// - 3 maximum retries
	/// - 1 second initial delay
	/// - 8 seconds maximum delay
	fn default() -> Self {
		Self {
			max_retries: 3,
			initial_delay: Duration::from_secs(1),
			max_delay: Duration::from_secs(8),
		}
	}
}

impl RetryConfig {
	/// Exponential backoff honouring this configuration
	pub fn backoff(&self) -> ExponentialBuilder {
		ExponentialBuilder::default()
			.with_min_delay(self.initial_delay)
			.with_max_delay(self.max_delay)
			.with_max_times(self.max_retries as usize)
	}
}

/// Fixed-interval polling with `attempts` tries in total
///
/// # Arguments
/// * `attempts` - Total number of tries, including the first
/// * `interval` - Delay between consecutive tries
pub fn polling(attempts: u32, interval: Duration) -> ConstantBuilder {
	ConstantBuilder::default()
		.with_delay(interval)
		.with_max_times(attempts.saturating_sub(1) as usize)
}
