//! Swap pattern matching and reference-volume accounting.

use alloy::{
	primitives::{Address, U256},
	sol_types::SolEvent,
};

use crate::{
	models::{EVMReceipt, PatternSettings, TransactionView, IERC20},
	services::filter::calldata::{CalldataDecoder, ExtractionError},
};

/// Recognises swaps sent to one router with one function selector
#[derive(Debug, Clone)]
pub struct PatternMatcher {
	router: Address,
	selector: [u8; 4],
	reference_token: Address,
	decoder: CalldataDecoder,
}

impl PatternMatcher {
	pub fn new(
		router: Address,
		selector: [u8; 4],
		reference_token: Address,
		decoder: CalldataDecoder,
	) -> Self {
		Self {
			router,
			selector,
			reference_token,
			decoder,
		}
	}

	/// Builds a matcher from validated pattern settings
	///
	/// Returns `None` if the selector is not 4 bytes of hex.
	pub fn from_settings(pattern: &PatternSettings) -> Option<Self> {
		Some(Self::new(
			pattern.router,
			pattern.selector_bytes()?,
			pattern.reference_token,
			CalldataDecoder::new(pattern.schema.clone()),
		))
	}

	pub fn reference_token(&self) -> Address {
		self.reference_token
	}

	/// Whether `tx` calls the router with the configured selector
	pub fn matches(&self, tx: &TransactionView) -> bool {
		tx.is_call_to(&self.router) && tx.data.starts_with(&self.selector)
	}

	pub fn extract_asset(&self, tx: &TransactionView) -> Result<Address, ExtractionError> {
		self.decoder.extract_asset(&tx.data)
	}

	/// Sum of reference-token `Transfer` values in `receipt`
	///
	/// Logs from other contracts and logs that do not decode as `Transfer` are ignored.
	pub fn transfer_volume(&self, receipt: &EVMReceipt) -> U256 {
		receipt
			.logs
			.iter()
			.filter(|log| log.address == self.reference_token)
			.filter_map(|log| IERC20::Transfer::decode_log_data(&log.data).ok())
			.fold(U256::ZERO, |total, transfer| {
				total.saturating_add(transfer.value)
			})
	}
}
