//! HTTP transport implementation for JSON-RPC endpoints.
//!
//! Regular requests go through a retrying middleware client. Liveness probes use the
//! plain client underneath so a dead endpoint costs exactly one request per selection.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use url::Url;

use crate::{
	models::NetworkSettings,
	services::blockchain::transports::{
		BlockchainTransport, EndpointManager, RotatingTransport, TransientErrorRetryStrategy,
		TransportError,
	},
	utils::http::{build_base_client, create_retryable_http_client, HttpRetryConfig, HttpTimeouts},
};

/// JSON-RPC over HTTP with ordered endpoint selection
///
/// Cloning is cheap; clones share the endpoint state.
#[derive(Clone, Debug)]
pub struct HttpTransportClient {
	/// Plain client used for probes
	pub client: reqwest::Client,
	endpoint_manager: EndpointManager,
}

impl HttpTransportClient {
	/// Creates a transport over the configured endpoints without selecting one
	///
	/// The first request, or an explicit `connect`, performs the selection.
	pub fn new(network: &NetworkSettings) -> Result<Self, TransportError> {
		let client = build_base_client(HttpTimeouts::default())
			.map_err(|e| TransportError::Network(format!("failed to build HTTP client: {}", e)))?;

		let retrying_client = create_retryable_http_client(
			&HttpRetryConfig::default(),
			client.clone(),
			Some(TransientErrorRetryStrategy),
		);

		let endpoint_manager = EndpointManager::new(retrying_client, network.rpc_urls.clone())
			.with_probe_timeout(network.probe_timeout());

		Ok(Self {
			client,
			endpoint_manager,
		})
	}

	/// Creates a transport and selects its first endpoint
	///
	/// # Returns
	/// * `Result<Self, TransportError>` - `NoEndpointAvailable` if every endpoint fails
	pub async fn connect(network: &NetworkSettings) -> Result<Self, TransportError> {
		let transport = Self::new(network)?;
		transport.endpoint_manager.select(&transport).await?;
		Ok(transport)
	}

	pub fn endpoint_manager(&self) -> &EndpointManager {
		&self.endpoint_manager
	}
}

#[async_trait]
impl BlockchainTransport for HttpTransportClient {
	async fn get_current_url(&self) -> Option<String> {
		self.endpoint_manager.active_url.read().await.clone()
	}

	async fn send_raw_request<P>(
		&self,
		method: &str,
		params: Option<P>,
	) -> Result<Value, TransportError>
	where
		P: Into<Value> + Send + Clone + Serialize,
	{
		self.endpoint_manager
			.send_raw_request(self, method, params)
			.await
	}

	async fn reconnect(&self) -> Result<String, TransportError> {
		self.endpoint_manager.reconnect(self).await
	}
}

#[async_trait]
impl RotatingTransport for HttpTransportClient {
	/// Sends one `eth_blockNumber` request with the plain client
	///
	/// The endpoint passes if it answers 2xx with a JSON-RPC `result`.
	async fn try_connect(&self, url: &str) -> Result<(), TransportError> {
		let url = Url::parse(url).map_err(|_| TransportError::InvalidUrl(url.to_string()))?;

		let probe = json!({
			"jsonrpc": "2.0",
			"id": 1,
			"method": "eth_blockNumber",
			"params": []
		});

		let response = self
			.client
			.post(url.clone())
			.json(&probe)
			.send()
			.await
			.map_err(|e| TransportError::Network(format!("probe to {} failed: {}", url, e)))?;

		let status = response.status();
		if !status.is_success() {
			return Err(TransportError::Http {
				status: status.as_u16(),
				url: url.to_string(),
				body: response.text().await.unwrap_or_default(),
			});
		}

		let body: Value = response
			.json()
			.await
			.map_err(|e| TransportError::ResponseParse(e.to_string()))?;

		if body.get("result").is_some_and(|result| !result.is_null()) {
			Ok(())
		} else {
			Err(TransportError::ResponseParse(format!(
				"probe to {} returned no result: {}",
				url, body
			)))
		}
	}

	/// Validates `url`; the endpoint manager records it as active
	async fn update_client(&self, url: &str) -> Result<(), TransportError> {
		Url::parse(url).map_err(|_| TransportError::InvalidUrl(url.to_string()))?;
		Ok(())
	}
}
