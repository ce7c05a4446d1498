//! Purchase execution and failure classification.
//!
//! - `executor`: quotes, approves and swaps through the configured router
//! - `classify`: maps node errors onto `FailureKind`
//! - `error`: the `TradeError` returned by failed purchases

mod classify;
mod error;
mod executor;

pub use classify::{classify_blockchain_error, classify_message, classify_rpc_error};
pub use error::{PurchaseResult, TradeError};
pub use executor::{
	min_amount_out, parse_amount, signer_from_key, TradeExecutor, TradeExecutorTrait,
};
