//! Block watcher error types and handling.
//!
//! Errors raised while scanning and processing blocks. Transient errors leave the cursor
//! where it is so the same block is retried; the rest are logged and the block is
//! skipped.

use log::error;
use std::{error::Error, fmt};

use crate::services::{
	blockchain::BlockChainError, filter::FilterError, trigger::TriggerError,
};

/// Represents possible errors during block scanning
#[derive(Debug)]
pub enum BlockWatcherError {
	/// Endpoint or network failures; the block should be retried
	NetworkError(String),
	/// Failures processing an individual block
	ProcessingError(String),
	/// Cursor persistence failures
	StorageError(String),
}

impl BlockWatcherError {
	/// Formats the error message based on the error type
	fn format_message(&self) -> String {
		match self {
			Self::NetworkError(msg) => format!("Network error: {}", msg),
			Self::ProcessingError(msg) => format!("Processing error: {}", msg),
			Self::StorageError(msg) => format!("Storage error: {}", msg),
		}
	}

	/// Creates a new network error with logging
	pub fn network_error(msg: impl Into<String>) -> Self {
		let error = Self::NetworkError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new processing error with logging
	pub fn processing_error(msg: impl Into<String>) -> Self {
		let error = Self::ProcessingError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new storage error with logging
	pub fn storage_error(msg: impl Into<String>) -> Self {
		let error = Self::StorageError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Whether the same block should be retried after reconnecting
	pub fn is_transient(&self) -> bool {
		matches!(self, Self::NetworkError(_))
	}
}

impl fmt::Display for BlockWatcherError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.format_message())
	}
}

impl Error for BlockWatcherError {}

impl From<BlockChainError> for BlockWatcherError {
	fn from(error: BlockChainError) -> Self {
		if error.is_transient() {
			Self::network_error(error.to_string())
		} else {
			Self::processing_error(error.to_string())
		}
	}
}

impl From<FilterError> for BlockWatcherError {
	fn from(error: FilterError) -> Self {
		if error.is_transient() {
			Self::network_error(error.to_string())
		} else {
			Self::processing_error(error.to_string())
		}
	}
}

impl From<TriggerError> for BlockWatcherError {
	fn from(error: TriggerError) -> Self {
		Self::processing_error(error.to_string())
	}
}
