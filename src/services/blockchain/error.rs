//! Blockchain error types and handling.
//!
//! Errors raised by the chain client. Each constructor logs the error once at creation.

use log::error;

use crate::services::blockchain::transports::TransportError;

/// Represents possible errors that can occur during blockchain operations
#[derive(Debug)]
pub enum BlockChainError {
	/// Errors related to network connectivity issues
	ConnectionError(String),

	/// Errors related to malformed requests or invalid responses
	RequestError(String),

	/// A JSON-RPC error object returned by the node
	RpcError {
		code: i64,
		message: String,
		/// Raw `data` member, usually hex-encoded revert data
		data: Option<String>,
	},

	/// When a requested block cannot be found on the blockchain
	///
	/// Contains the block number that was not found
	BlockNotFound(u64),

	/// Errors related to transaction processing
	TransactionError(String),

	/// Internal errors within the blockchain client
	InternalError(String),
}

impl BlockChainError {
	/// Formats the error message based on the error type
	fn format_message(&self) -> String {
		match self {
			Self::ConnectionError(msg) => format!("Connection error: {}", msg),
			Self::RequestError(msg) => format!("Request error: {}", msg),
			Self::RpcError { code, message, .. } => format!("RPC error {}: {}", code, message),
			Self::BlockNotFound(number) => format!("Block not found: {}", number),
			Self::TransactionError(msg) => format!("Transaction error: {}", msg),
			Self::InternalError(msg) => format!("Internal error: {}", msg),
		}
	}

	/// Creates a new connection error with logging
	pub fn connection_error(msg: impl Into<String>) -> Self {
		let error = Self::ConnectionError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new request error with logging
	pub fn request_error(msg: impl Into<String>) -> Self {
		let error = Self::RequestError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new JSON-RPC error with logging
	pub fn rpc_error(code: i64, message: impl Into<String>, data: Option<String>) -> Self {
		let error = Self::RpcError {
			code,
			message: message.into(),
			data,
		};
		error!("{}", error.format_message());
		error
	}

	/// Creates a new block not found error
	///
	/// Logged at debug: the block is usually just not propagated yet.
	pub fn block_not_found(number: u64) -> Self {
		let error = Self::BlockNotFound(number);
		log::debug!("{}", error.format_message());
		error
	}

	/// Creates a new transaction error with logging
	pub fn transaction_error(msg: impl Into<String>) -> Self {
		let error = Self::TransactionError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new internal error with logging
	pub fn internal_error(msg: impl Into<String>) -> Self {
		let error = Self::InternalError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Whether the failure may clear after reconnecting or waiting
	pub fn is_transient(&self) -> bool {
		matches!(self, Self::ConnectionError(_) | Self::BlockNotFound(_))
	}
}

// Standard error trait implementations
impl std::fmt::Display for BlockChainError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.format_message())
	}
}

impl std::error::Error for BlockChainError {}

/// Transient transport failures become connection errors, the rest request errors
impl From<TransportError> for BlockChainError {
	fn from(err: TransportError) -> Self {
		if err.is_transient() {
			Self::connection_error(err.to_string())
		} else {
			Self::request_error(err.to_string())
		}
	}
}
