use async_trait::async_trait;
use mockall::mock;
use serde::Serialize;
use serde_json::Value;

use surge_monitor::services::blockchain::{BlockchainTransport, TransportError};

// Mock implementation of an EVM transport client.
// Used for testing the typed JSON-RPC wrappers of the EVM client.
// Provides functionality to simulate raw JSON-RPC request handling.
mock! {
	pub EVMTransportClient {
		pub async fn send_raw_request(&self, method: &str, params: Option<Value>) -> Result<Value, TransportError>;
		pub async fn get_current_url(&self) -> Option<String>;
		pub async fn reconnect(&self) -> Result<String, TransportError>;
	}

	impl Clone for EVMTransportClient {
		fn clone(&self) -> Self;
	}
}

#[async_trait]
impl BlockchainTransport for MockEVMTransportClient {
	async fn get_current_url(&self) -> Option<String> {
		self.get_current_url().await
	}

	async fn send_raw_request<P>(
		&self,
		method: &str,
		params: Option<P>,
	) -> Result<Value, TransportError>
	where
		P: Into<Value> + Send + Clone + Serialize,
	{
		self.send_raw_request(method, params.map(|p| p.into()))
			.await
	}

	async fn reconnect(&self) -> Result<String, TransportError> {
		self.reconnect().await
	}
}
