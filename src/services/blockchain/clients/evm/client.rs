//! EVM-compatible blockchain client implementation.
//!
//! Typed wrappers over the handful of JSON-RPC methods the monitor and the trade executor
//! need. JSON-RPC error objects are surfaced as `BlockChainError::RpcError` with their
//! code, message and data intact so callers can classify them.

use alloy::{
	primitives::{Address, Bytes, TxHash, U128, U256, U64},
	rpc::types::TransactionRequest,
};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};

use crate::{
	models::{EVMBlock, EVMReceipt, NetworkSettings, TransactionView},
	services::blockchain::{
		client::BlockChainClient,
		transports::{BlockchainTransport, HttpTransportClient},
		BlockChainError,
	},
};

/// Client implementation for Ethereum Virtual Machine (EVM) compatible blockchains
#[derive(Clone)]
pub struct EvmClient<T: Send + Sync + Clone> {
	/// The underlying transport for RPC communication
	transport: T,
}

impl<T: Send + Sync + Clone> EvmClient<T> {
	/// Creates a new EVM client instance with a specific transport client
	pub fn new_with_transport(transport: T) -> Self {
		Self { transport }
	}
}

impl EvmClient<HttpTransportClient> {
	/// Creates a new EVM client and selects its first endpoint
	///
	/// # Arguments
	/// * `network` - Network settings containing the ordered RPC endpoints
	///
	/// # Returns
	/// * `Result<Self, BlockChainError>` - New client instance or connection error
	pub async fn new(network: &NetworkSettings) -> Result<Self, BlockChainError> {
		let transport = HttpTransportClient::connect(network).await?;
		Ok(Self::new_with_transport(transport))
	}
}

/// Extended functionality specific to EVM-compatible blockchains
#[async_trait]
pub trait EvmClientTrait: BlockChainClient {
	/// Retrieves a transaction by hash, `None` if the node does not know it
	async fn get_transaction(
		&self,
		transaction_hash: TxHash,
	) -> Result<Option<TransactionView>, BlockChainError>;

	/// Retrieves a transaction receipt, `None` while the transaction is pending
	async fn get_transaction_receipt(
		&self,
		transaction_hash: TxHash,
	) -> Result<Option<EVMReceipt>, BlockChainError>;

	/// Executes a read-only call against the latest block
	async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, BlockChainError>;

	/// Native balance of `address` at the latest block
	async fn get_balance(&self, address: Address) -> Result<U256, BlockChainError>;

	async fn estimate_gas(&self, request: &TransactionRequest) -> Result<u64, BlockChainError>;

	async fn get_gas_price(&self) -> Result<u128, BlockChainError>;

	/// Pending nonce of `address`
	async fn get_transaction_count(&self, address: Address) -> Result<u64, BlockChainError>;

	async fn get_chain_id(&self) -> Result<u64, BlockChainError>;

	/// Broadcasts a signed, EIP-2718 encoded transaction
	async fn send_raw_transaction(&self, raw: Bytes) -> Result<TxHash, BlockChainError>;
}

/// Pulls `result` out of a JSON-RPC response, turning an `error` member into `RpcError`
fn extract_result(method: &str, mut response: Value) -> Result<Value, BlockChainError> {
	if let Some(error) = response.get("error").filter(|error| !error.is_null()) {
		let code = error.get("code").and_then(Value::as_i64).unwrap_or_default();
		let message = error
			.get("message")
			.and_then(Value::as_str)
			.unwrap_or("unknown error")
			.to_string();
		let data = error.get("data").map(|data| match data {
			Value::String(data) => data.clone(),
			other => other.to_string(),
		});
		return Err(BlockChainError::rpc_error(code, message, data));
	}

	response
		.get_mut("result")
		.map(Value::take)
		.ok_or_else(|| {
			BlockChainError::request_error(format!("Missing 'result' field in {} response", method))
		})
}

fn to_param<S: Serialize>(value: &S) -> Result<Value, BlockChainError> {
	serde_json::to_value(value).map_err(|e| {
		BlockChainError::internal_error(format!("Failed to serialize request parameter: {}", e))
	})
}

impl<T: Send + Sync + Clone + BlockchainTransport> EvmClient<T> {
	async fn request(&self, method: &str, params: Value) -> Result<Value, BlockChainError> {
		let response = self.transport.send_raw_request(method, Some(params)).await?;
		extract_result(method, response)
	}

	async fn request_as<R: DeserializeOwned>(
		&self,
		method: &str,
		params: Value,
	) -> Result<R, BlockChainError> {
		let result = self.request(method, params).await?;
		serde_json::from_value(result).map_err(|e| {
			BlockChainError::request_error(format!("Failed to parse {} result: {}", method, e))
		})
	}
}

#[async_trait]
impl<T: Send + Sync + Clone + BlockchainTransport> EvmClientTrait for EvmClient<T> {
	async fn get_transaction(
		&self,
		transaction_hash: TxHash,
	) -> Result<Option<TransactionView>, BlockChainError> {
		self.request_as(
			"eth_getTransactionByHash",
			json!([format!("{}", transaction_hash)]),
		)
		.await
	}

	async fn get_transaction_receipt(
		&self,
		transaction_hash: TxHash,
	) -> Result<Option<EVMReceipt>, BlockChainError> {
		self.request_as(
			"eth_getTransactionReceipt",
			json!([format!("{}", transaction_hash)]),
		)
		.await
	}

	async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, BlockChainError> {
		self.request_as(
			"eth_call",
			json!([
				{
					"to": format!("{}", to),
					"data": format!("{}", data)
				},
				"latest"
			]),
		)
		.await
	}

	async fn get_balance(&self, address: Address) -> Result<U256, BlockChainError> {
		self.request_as("eth_getBalance", json!([format!("{}", address), "latest"]))
			.await
	}

	async fn estimate_gas(&self, request: &TransactionRequest) -> Result<u64, BlockChainError> {
		let gas: U64 = self
			.request_as("eth_estimateGas", json!([to_param(request)?]))
			.await?;
		Ok(gas.to::<u64>())
	}

	async fn get_gas_price(&self) -> Result<u128, BlockChainError> {
		let price: U128 = self.request_as("eth_gasPrice", json!([])).await?;
		Ok(price.to::<u128>())
	}

	async fn get_transaction_count(&self, address: Address) -> Result<u64, BlockChainError> {
		let nonce: U64 = self
			.request_as(
				"eth_getTransactionCount",
				json!([format!("{}", address), "pending"]),
			)
			.await?;
		Ok(nonce.to::<u64>())
	}

	async fn get_chain_id(&self) -> Result<u64, BlockChainError> {
		let chain_id: U64 = self.request_as("eth_chainId", json!([])).await?;
		Ok(chain_id.to::<u64>())
	}

	async fn send_raw_transaction(&self, raw: Bytes) -> Result<TxHash, BlockChainError> {
		self.request_as("eth_sendRawTransaction", json!([format!("{}", raw)]))
			.await
	}
}

#[async_trait]
impl<T: Send + Sync + Clone + BlockchainTransport> BlockChainClient for EvmClient<T> {
	async fn get_latest_block_number(&self) -> Result<u64, BlockChainError> {
		let number: U64 = self.request_as("eth_blockNumber", json!([])).await?;
		Ok(number.to::<u64>())
	}

	async fn get_block(&self, block_number: u64) -> Result<EVMBlock, BlockChainError> {
		let block: Option<EVMBlock> = self
			.request_as(
				"eth_getBlockByNumber",
				json!([format!("0x{:x}", block_number), true]),
			)
			.await?;

		block.ok_or_else(|| BlockChainError::block_not_found(block_number))
	}

	async fn reconnect(&self) -> Result<String, BlockChainError> {
		Ok(self.transport.reconnect().await?)
	}

	async fn current_endpoint(&self) -> Option<String> {
		self.transport.get_current_url().await
	}
}
