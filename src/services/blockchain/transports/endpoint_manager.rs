//! Selects the active RPC endpoint and sends requests to it
//!
//! Endpoints are probed strictly in configuration order and the first healthy one wins.
//! Selection happens at startup and again whenever the caller reconnects after a transient
//! failure; it always restarts from the top of the list so a recovered primary is
//! preferred over a fallback.
use reqwest_middleware::ClientWithMiddleware;
use serde::Serialize;
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use tokio::sync::{Mutex, RwLock};

use crate::{
	models::{Endpoint, EndpointStatus},
	services::blockchain::transports::{RotatingTransport, TransportError},
	utils::metrics::ENDPOINT_RECONNECTS,
};

/// Default bound on a single liveness probe
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Ordered endpoint list plus the currently active endpoint
///
/// # Fields
/// * `active_url` - The active endpoint, `None` until a selection succeeds
/// * `endpoints` - Candidates in priority order with their last observed status
/// * `client` - Retrying client used for regular requests
/// * `probe_timeout` - Upper bound on each liveness probe
/// * `rotation_lock` - Serialises selections
#[derive(Clone, Debug)]
pub struct EndpointManager {
	pub active_url: Arc<RwLock<Option<String>>>,
	pub endpoints: Arc<RwLock<Vec<Endpoint>>>,
	client: ClientWithMiddleware,
	probe_timeout: Duration,
	rotation_lock: Arc<Mutex<()>>,
}

impl EndpointManager {
	/// Creates a manager over `urls`, in priority order, with no active endpoint
	pub fn new(client: ClientWithMiddleware, urls: Vec<String>) -> Self {
		Self {
			active_url: Arc::new(RwLock::new(None)),
			endpoints: Arc::new(RwLock::new(urls.into_iter().map(Endpoint::new).collect())),
			client,
			probe_timeout: DEFAULT_PROBE_TIMEOUT,
			rotation_lock: Arc::new(Mutex::new(())),
		}
	}

	pub fn with_probe_timeout(mut self, probe_timeout: Duration) -> Self {
		self.probe_timeout = probe_timeout;
		self
	}

	/// Snapshot of the candidates and their last observed status
	pub async fn endpoints(&self) -> Vec<Endpoint> {
		self.endpoints.read().await.clone()
	}

	/// Probes every endpoint in order and activates the first one that answers
	///
	/// Each endpoint is probed once, bounded by the probe timeout. Dead endpoints are still
	/// probed; their status only records what the last selection saw.
	///
	/// # Arguments
	/// * `transport` - The transport performing the probes
	///
	/// # Returns
	/// * `Result<String, TransportError>` - The selected URL, or `NoEndpointAvailable`
	pub async fn select<T: RotatingTransport>(&self, transport: &T) -> Result<String, TransportError> {
		let _guard = self.rotation_lock.lock().await;

		let urls: Vec<String> = self
			.endpoints
			.read()
			.await
			.iter()
			.map(|endpoint| endpoint.url.clone())
			.collect();

		for (index, url) in urls.iter().enumerate() {
			let probe = tokio::time::timeout(self.probe_timeout, transport.try_connect(url)).await;

			match probe {
				Ok(Ok(())) => {
					transport.update_client(url).await?;
					self.set_status(index, EndpointStatus::Live).await;
					*self.active_url.write().await = Some(url.clone());
					tracing::info!("Connected to RPC endpoint {}", url);
					return Ok(url.clone());
				}
				Ok(Err(e)) => {
					tracing::warn!("RPC endpoint {} failed its probe: {}", url, e);
				}
				Err(_) => {
					tracing::warn!(
						"RPC endpoint {} did not answer within {:?}",
						url,
						self.probe_timeout
					);
				}
			}
			self.set_status(index, EndpointStatus::Dead).await;
		}

		*self.active_url.write().await = None;
		tracing::error!("All {} RPC endpoints failed", urls.len());
		Err(TransportError::NoEndpointAvailable(urls.len()))
	}

	/// Drops the active endpoint and selects again from the top of the list
	pub async fn reconnect<T: RotatingTransport>(
		&self,
		transport: &T,
	) -> Result<String, TransportError> {
		ENDPOINT_RECONNECTS.inc();
		*self.active_url.write().await = None;
		self.select(transport).await
	}

	async fn set_status(&self, index: usize, status: EndpointStatus) {
		if let Some(endpoint) = self.endpoints.write().await.get_mut(index) {
			endpoint.status = status;
		}
	}

	async fn mark_dead(&self, url: &str) {
		if let Some(endpoint) = self
			.endpoints
			.write()
			.await
			.iter_mut()
			.find(|endpoint| endpoint.url == url)
		{
			endpoint.status = EndpointStatus::Dead;
		}
	}

	/// Sends a raw JSON-RPC request to the active endpoint
	///
	/// Selects an endpoint first if none is active. Failures are reported, not rotated
	/// around: the scanner decides when to reconnect.
	///
	/// # Arguments
	/// * `transport` - The transport building the request envelope
	/// * `method` - The RPC method name to call
	/// * `params` - The parameters for the RPC method call
	///
	/// # Returns
	/// * `Result<Value, TransportError>` - The JSON-RPC response object or an error
	pub async fn send_raw_request<
		T: RotatingTransport,
		P: Into<Value> + Send + Clone + Serialize,
	>(
		&self,
		transport: &T,
		method: &str,
		params: Option<P>,
	) -> Result<Value, TransportError> {
		let active = self.active_url.read().await.clone();
		let url = match active {
			Some(url) => url,
			None => self.select(transport).await?,
		};

		let request_body = transport.customize_request(method, params).await;
		let request_body = serde_json::to_string(&request_body).map_err(|e| {
			tracing::error!("Failed to serialize request body: {}", e);
			TransportError::RequestSerialization(e.to_string())
		})?;

		let response = match self
			.client
			.post(&url)
			.header("Content-Type", "application/json")
			.body(request_body)
			.send()
			.await
		{
			Ok(response) => response,
			Err(e) => {
				tracing::warn!("Network error while sending {} to {}: {}", method, url, e);
				self.mark_dead(&url).await;
				return Err(TransportError::Network(format!(
					"failed to send {} to {}: {}",
					method, url, e
				)));
			}
		};

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			tracing::warn!(
				"Request {} to {} failed with status {}: {}",
				method,
				url,
				status,
				body
			);
			return Err(TransportError::Http {
				status: status.as_u16(),
				url,
				body,
			});
		}

		response
			.json()
			.await
			.map_err(|e| TransportError::ResponseParse(e.to_string()))
	}
}
