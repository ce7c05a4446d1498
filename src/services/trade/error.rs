//! Trade error types.

use serde::Serialize;
use thiserror::Error;

use crate::models::{FailureKind, PurchaseSuccess};

/// A failed purchase, classified by `FailureKind`
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{kind}: {message}")]
pub struct TradeError {
	pub kind: FailureKind,
	pub message: String,
}

impl TradeError {
	pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
		Self {
			kind,
			message: message.into(),
		}
	}

	pub fn invalid_input(message: impl Into<String>) -> Self {
		Self::new(FailureKind::InvalidInput, message)
	}
}

/// Outcome of a purchase attempt
pub type PurchaseResult = Result<PurchaseSuccess, TradeError>;
