//! Extraction of the target asset from swap calldata.
//!
//! Each supported router layout is a `CalldataSchema` variant. Calldata that does not
//! decode under the configured schema is reported as `UnrecognizedEncoding` rather than
//! guessed at, so a router upgrade shows up in the logs instead of as silent misses.

use alloy::{
	primitives::{aliases::U24, Address, Bytes},
	sol_types::SolCall,
};
use std::str::FromStr;
use thiserror::Error;

use crate::models::{CalldataSchema, ISwapRouter};

const ADDRESS_LEN: usize = 20;
const FEE_LEN: usize = 3;
const HOP_LEN: usize = FEE_LEN + ADDRESS_LEN;
const ADDRESS_HEX_LEN: usize = ADDRESS_LEN * 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
	/// Calldata is not laid out the way the configured schema expects
	#[error("calldata does not decode as {schema}: {reason}")]
	UnrecognizedEncoding { schema: &'static str, reason: String },

	#[error("calldata too short: {len} bytes")]
	Truncated { len: usize },

	#[error("marker {0:?} not found in calldata")]
	MarkerNotFound(String),

	#[error("invalid address in calldata: {0}")]
	InvalidAddress(String),
}

/// Decodes the target asset out of router calldata under one schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalldataDecoder {
	schema: CalldataSchema,
}

impl CalldataDecoder {
	/// Creates a decoder; marker schemas are matched case-insensitively
	pub fn new(schema: CalldataSchema) -> Self {
		let schema = match schema {
			CalldataSchema::Marker { marker } => CalldataSchema::Marker {
				marker: marker.trim_start_matches("0x").to_lowercase(),
			},
			other => other,
		};
		Self { schema }
	}

	pub fn schema(&self) -> &CalldataSchema {
		&self.schema
	}

	/// Returns the asset the swap buys
	///
	/// # Arguments
	/// * `data` - Full calldata including the 4-byte selector
	pub fn extract_asset(&self, data: &[u8]) -> Result<Address, ExtractionError> {
		match &self.schema {
			CalldataSchema::UniswapV3ExactInput => decode_exact_input(data),
			CalldataSchema::UniswapV3ExactInputSingle => decode_exact_input_single(data),
			CalldataSchema::Marker { marker } => extract_after_marker(data, marker),
		}
	}
}

fn decode_exact_input(data: &[u8]) -> Result<Address, ExtractionError> {
	if data.len() < 4 {
		return Err(ExtractionError::Truncated { len: data.len() });
	}
	let call = ISwapRouter::exactInputCall::abi_decode(data).map_err(|e| {
		ExtractionError::UnrecognizedEncoding {
			schema: "exactInput",
			reason: e.to_string(),
		}
	})?;
	asset_from_path(&call.params.path)
}

fn decode_exact_input_single(data: &[u8]) -> Result<Address, ExtractionError> {
	if data.len() < 4 {
		return Err(ExtractionError::Truncated { len: data.len() });
	}
	let call = ISwapRouter::exactInputSingleCall::abi_decode(data).map_err(|e| {
		ExtractionError::UnrecognizedEncoding {
			schema: "exactInputSingle",
			reason: e.to_string(),
		}
	})?;
	Ok(call.params.tokenOut)
}

/// Final token of a packed `token (fee token)+` swap path
pub fn asset_from_path(path: &[u8]) -> Result<Address, ExtractionError> {
	if path.len() < ADDRESS_LEN + HOP_LEN || (path.len() - ADDRESS_LEN) % HOP_LEN != 0 {
		return Err(ExtractionError::UnrecognizedEncoding {
			schema: "exactInput",
			reason: format!("path of {} bytes is not 20 + 23k", path.len()),
		});
	}
	Ok(Address::from_slice(&path[path.len() - ADDRESS_LEN..]))
}

/// Packs `token_in`, then each `(fee, token)` hop, into a router path
pub fn encode_path(token_in: Address, hops: &[(u32, Address)]) -> Bytes {
	let mut path = Vec::with_capacity(ADDRESS_LEN + hops.len() * HOP_LEN);
	path.extend_from_slice(token_in.as_slice());
	for (fee, token) in hops {
		path.extend_from_slice(&U24::from(*fee).to_be_bytes::<FEE_LEN>());
		path.extend_from_slice(token.as_slice());
	}
	Bytes::from(path)
}

/// Reads the 40 hex characters following the last occurrence of `marker`
fn extract_after_marker(data: &[u8], marker: &str) -> Result<Address, ExtractionError> {
	let encoded = hex::encode(data);
	let position = encoded
		.rfind(marker)
		.ok_or_else(|| ExtractionError::MarkerNotFound(marker.to_string()))?;

	let start = position + marker.len();
	let candidate = encoded
		.get(start..start + ADDRESS_HEX_LEN)
		.ok_or(ExtractionError::Truncated { len: data.len() })?;

	Address::from_str(candidate).map_err(|e| ExtractionError::InvalidAddress(e.to_string()))
}
