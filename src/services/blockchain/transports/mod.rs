//! Network transport for the chain client.
//!
//! - `EndpointManager`: ordered endpoint selection and request sending
//! - `HttpTransportClient`: JSON-RPC over HTTP with liveness probes

mod endpoint_manager;
mod error;
mod http;

pub use endpoint_manager::EndpointManager;
pub use error::TransportError;
pub use http::HttpTransportClient;

use reqwest_retry::{
	default_on_request_failure, default_on_request_success, Retryable, RetryableStrategy,
};
use serde::Serialize;
use serde_json::{json, Value};

/// Base trait for blockchain transport clients
#[async_trait::async_trait]
pub trait BlockchainTransport: Send + Sync {
	/// Get the URL of the active endpoint, if one has been selected
	async fn get_current_url(&self) -> Option<String>;

	/// Send a raw JSON-RPC request to the active endpoint
	async fn send_raw_request<P>(
		&self,
		method: &str,
		params: Option<P>,
	) -> Result<Value, TransportError>
	where
		P: Into<Value> + Send + Clone + Serialize;

	/// Builds the JSON-RPC 2.0 envelope for a request
	async fn customize_request<P>(&self, method: &str, params: Option<P>) -> Value
	where
		P: Into<Value> + Send + Clone + Serialize,
	{
		json!({
			"jsonrpc": "2.0",
			"id": 1,
			"method": method,
			"params": params.map(|p| p.into())
		})
	}

	/// Re-runs endpoint selection from the top of the list
	async fn reconnect(&self) -> Result<String, TransportError>;
}

/// Extension trait for transports whose active endpoint can be switched
#[async_trait::async_trait]
pub trait RotatingTransport: BlockchainTransport {
	/// Probes `url` once; `Ok` means it is fit to become the active endpoint
	async fn try_connect(&self, url: &str) -> Result<(), TransportError>;

	/// Points the transport at `url`
	async fn update_client(&self, url: &str) -> Result<(), TransportError>;
}

/// Retries connection failures and 5xx/429 responses, nothing else
pub struct TransientErrorRetryStrategy;

impl RetryableStrategy for TransientErrorRetryStrategy {
	fn handle(
		&self,
		res: &Result<reqwest::Response, reqwest_middleware::Error>,
	) -> Option<Retryable> {
		match res {
			Ok(success) => default_on_request_success(success),
			Err(error) => default_on_request_failure(error),
		}
	}
}
