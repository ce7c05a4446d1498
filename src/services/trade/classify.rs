//! Classification of node errors into purchase failure kinds.
//!
//! Structured JSON-RPC error codes are checked first. Message substrings are the fallback
//! for nodes that report everything as a generic error.

use crate::{models::FailureKind, services::blockchain::BlockChainError};

const INSUFFICIENT_FUNDS: [&str; 4] = [
	"insufficient funds",
	"insufficient balance",
	"invalid balance",
	"exceeds balance",
];
const NO_LIQUIDITY: [&str; 3] = ["pool might not exist", "no liquidity", "quote"];
const SLIPPAGE: [&str; 2] = ["slippage", "too little received"];
const DEADLINE: [&str; 2] = ["deadline", "transaction too old"];
const REVERTED: [&str; 1] = ["execution reverted"];

/// Node rejected the transaction for lack of funds
const CODE_SERVER_ERROR: i64 = -32000;
const CODE_INSUFFICIENT_FUNDS: i64 = -32010;
/// Execution reverted, with revert data in `data`
const CODE_EXECUTION_REVERTED: i64 = 3;
const CODE_EXECUTION_REVERTED_ALT: i64 = -32015;

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
	needles.iter().any(|needle| haystack.contains(needle))
}

/// Classifies a free-form error message
pub fn classify_message(message: &str) -> FailureKind {
	let message = message.to_lowercase();

	if contains_any(&message, &INSUFFICIENT_FUNDS) {
		FailureKind::InsufficientFunds
	} else if contains_any(&message, &NO_LIQUIDITY) {
		FailureKind::NoLiquidity
	} else if contains_any(&message, &SLIPPAGE) {
		FailureKind::SlippageExceeded
	} else if contains_any(&message, &DEADLINE) {
		FailureKind::DeadlineExceeded
	} else if contains_any(&message, &REVERTED) {
		FailureKind::ExecutionReverted
	} else {
		FailureKind::UnclassifiedExecutionError
	}
}

/// Decodes `Error(string)` or `Panic(uint256)` revert data given as hex
fn revert_reason(data: &str) -> Option<String> {
	let bytes = hex::decode(data.trim().trim_matches('"').trim_start_matches("0x")).ok()?;
	alloy::sol_types::decode_revert_reason(&bytes)
}

/// Classifies a JSON-RPC error object
///
/// # Arguments
/// * `code` - The JSON-RPC error code
/// * `message` - The error message
/// * `data` - The raw `data` member, if any
pub fn classify_rpc_error(code: i64, message: &str, data: Option<&str>) -> FailureKind {
	match code {
		CODE_INSUFFICIENT_FUNDS => FailureKind::InsufficientFunds,
		CODE_SERVER_ERROR if contains_any(&message.to_lowercase(), &INSUFFICIENT_FUNDS) => {
			FailureKind::InsufficientFunds
		}
		CODE_EXECUTION_REVERTED | CODE_EXECUTION_REVERTED_ALT => {
			let reason = data.and_then(revert_reason);
			let kind = classify_message(&format!(
				"{} {}",
				message,
				reason.unwrap_or_default()
			));
			match kind {
				FailureKind::UnclassifiedExecutionError => FailureKind::ExecutionReverted,
				kind => kind,
			}
		}
		_ => classify_message(message),
	}
}

/// Classifies any chain client error
pub fn classify_blockchain_error(error: &BlockChainError) -> FailureKind {
	match error {
		BlockChainError::RpcError {
			code,
			message,
			data,
		} => classify_rpc_error(*code, message, data.as_deref()),
		BlockChainError::ConnectionError(_) | BlockChainError::BlockNotFound(_) => {
			FailureKind::TransientRpcFailure
		}
		other => classify_message(&other.to_string()),
	}
}
