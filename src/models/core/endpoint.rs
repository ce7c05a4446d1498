//! RPC endpoint model.

use serde::{Deserialize, Serialize};

/// Last observed health of an endpoint
///
/// Status is informational; a `Dead` endpoint is still probed on the next selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointStatus {
	#[default]
	Unknown,
	Live,
	Dead,
}

/// A candidate RPC endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
	pub url: String,
	#[serde(default)]
	pub status: EndpointStatus,
}

impl Endpoint {
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			url: url.into(),
			status: EndpointStatus::Unknown,
		}
	}

	pub fn is_live(&self) -> bool {
		self.status == EndpointStatus::Live
	}
}
