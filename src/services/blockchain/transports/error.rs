//! Transport error types.

use thiserror::Error;

/// Errors raised while talking to an RPC endpoint
#[derive(Debug, Error)]
pub enum TransportError {
	/// Endpoint answered with a non-success HTTP status
	#[error("HTTP error: status {status} from {url}: {body}")]
	Http { status: u16, url: String, body: String },

	/// Request never produced a response (connect failure, timeout, reset)
	#[error("Network error: {0}")]
	Network(String),

	/// Response body was not valid JSON
	#[error("Failed to parse response: {0}")]
	ResponseParse(String),

	/// Request body could not be serialized
	#[error("Failed to serialize request: {0}")]
	RequestSerialization(String),

	/// Every configured endpoint failed its probe
	#[error("No endpoint available: all {0} candidates failed their probe")]
	NoEndpointAvailable(usize),

	#[error("Invalid URL: {0}")]
	InvalidUrl(String),
}

impl TransportError {
	/// Whether reselecting an endpoint and retrying later can succeed
	pub fn is_transient(&self) -> bool {
		match self {
			Self::Network(_) | Self::NoEndpointAvailable(_) => true,
			Self::Http { status, .. } => *status == 429 || *status >= 500,
			Self::ResponseParse(_) | Self::RequestSerialization(_) | Self::InvalidUrl(_) => false,
		}
	}
}
