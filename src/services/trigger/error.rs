//! Trigger error types and handling.
//!
//! Provides error types for dispatching trigger events, including alert delivery
//! failures and configuration issues.

use log::error;
use std::{error::Error, fmt};

/// Represents possible errors during trigger operations
#[derive(Debug)]
pub enum TriggerError {
	/// When no alert channel accepted the event
	DeliveryError(String),
	/// When trigger execution fails
	ExecutionError(String),
	/// When trigger configuration is invalid
	ConfigurationError(String),
}

impl TriggerError {
	/// Formats the error message based on the error type
	fn format_message(&self) -> String {
		match self {
			TriggerError::DeliveryError(msg) => format!("Trigger delivery error: {}", msg),
			TriggerError::ExecutionError(msg) => format!("Trigger execution error: {}", msg),
			TriggerError::ConfigurationError(msg) => {
				format!("Trigger configuration error: {}", msg)
			}
		}
	}

	/// Creates a new delivery error with logging
	pub fn delivery_error(msg: impl Into<String>) -> Self {
		let error = TriggerError::DeliveryError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new execution error with logging
	pub fn execution_error(msg: impl Into<String>) -> Self {
		let error = TriggerError::ExecutionError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new configuration error with logging
	pub fn configuration_error(msg: impl Into<String>) -> Self {
		let error = TriggerError::ConfigurationError(msg.into());
		error!("{}", error.format_message());
		error
	}
}

impl fmt::Display for TriggerError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.format_message())
	}
}

impl Error for TriggerError {}
