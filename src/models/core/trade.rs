//! Purchase request, outcome and failure taxonomy.

use alloy::primitives::{Address, TxHash, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure taxonomy shared by the transport, scanner and trade paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
	NoEndpointAvailable,
	TransientRpcFailure,
	InvalidInput,
	InsufficientFunds,
	MetadataUnavailable,
	NoLiquidity,
	SlippageExceeded,
	DeadlineExceeded,
	ExecutionReverted,
	ConfirmationTimeout,
	UnclassifiedExecutionError,
}

impl FailureKind {
	/// Stable snake_case label, also used as the metrics outcome
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::NoEndpointAvailable => "no_endpoint_available",
			Self::TransientRpcFailure => "transient_rpc_failure",
			Self::InvalidInput => "invalid_input",
			Self::InsufficientFunds => "insufficient_funds",
			Self::MetadataUnavailable => "metadata_unavailable",
			Self::NoLiquidity => "no_liquidity",
			Self::SlippageExceeded => "slippage_exceeded",
			Self::DeadlineExceeded => "deadline_exceeded",
			Self::ExecutionReverted => "execution_reverted",
			Self::ConfirmationTimeout => "confirmation_timeout",
			Self::UnclassifiedExecutionError => "unclassified_execution_error",
		}
	}
}

impl fmt::Display for FailureKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A purchase of `asset_address` spending `budget_amount` whole reference units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRequest {
	pub asset_address: String,
	pub budget_amount: String,
}

impl PurchaseRequest {
	pub fn new(asset_address: impl Into<String>, budget_amount: impl Into<String>) -> Self {
		Self {
			asset_address: asset_address.into(),
			budget_amount: budget_amount.into(),
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurchaseOptions {
	/// Stop after quoting; nothing is signed or sent
	pub dry_run: bool,
	/// Overrides the configured pool fee tier
	pub fee_tier: Option<u32>,
}

/// Metadata read from the target token before trading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
	pub decimals: u8,
	pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PurchaseSuccess {
	Executed {
		asset: Address,
		symbol: String,
		tx_hash: TxHash,
		block_number: Option<u64>,
		gas_used: u64,
		received_amount: U256,
		quoted_amount: U256,
	},
	Simulated {
		asset: Address,
		symbol: String,
		quoted_amount: U256,
		needs_approval: bool,
	},
}

impl PurchaseSuccess {
	pub fn asset(&self) -> Address {
		match self {
			Self::Executed { asset, .. } | Self::Simulated { asset, .. } => *asset,
		}
	}

	pub fn quoted_amount(&self) -> U256 {
		match self {
			Self::Executed { quoted_amount, .. } | Self::Simulated { quoted_amount, .. } => {
				*quoted_amount
			}
		}
	}

	/// Label recorded in the purchases metric
	pub fn outcome(&self) -> &'static str {
		match self {
			Self::Executed { .. } => "success",
			Self::Simulated { .. } => "simulated",
		}
	}
}
