//! Monitor configuration model.
//!
//! A `MonitorConfig` describes one deployment: which endpoints to use, which swap pattern
//! to watch, when activity is significant enough to act on, and how to trade and alert.
//! Every section has defaults reproducing the Story mainnet deployment, so an empty
//! `{"name": "..."}` file is a complete configuration.

use alloy::primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

pub const DEFAULT_RPC_URLS: [&str; 3] = [
	"https://mainnet.storyrpc.io",
	"https://rpc.story.foundation",
	"https://story-rpc.ankr.com",
];
pub const DEFAULT_EXPLORER_URL: &str = "https://www.storyscan.io";
pub const DEFAULT_ROUTER: Address = address!("1062916B1Be3c034C1dC6C26f682Daf1861A3909");
pub const DEFAULT_QUOTER: Address = address!("865E2Bff1d5f9a01b91196D31126C2e432bC0F6C");
pub const DEFAULT_REFERENCE_TOKEN: Address = address!("1514000000000000000000000000000000000000");
pub const EXACT_INPUT_SELECTOR: &str = "0xc04b8d59";
pub const EXACT_INPUT_SINGLE_SELECTOR: &str = "0x414bf389";

/// Fee tiers accepted by the swap router
pub const SUPPORTED_FEE_TIERS: [u32; 4] = [100, 500, 3000, 10000];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorConfig {
	pub name: String,
	#[serde(default)]
	pub network: NetworkSettings,
	#[serde(default)]
	pub pattern: PatternSettings,
	#[serde(default)]
	pub policy: PolicySettings,
	#[serde(default)]
	pub scanner: ScannerSettings,
	#[serde(default)]
	pub trade: TradeSettings,
	#[serde(default)]
	pub alerts: AlertSettings,
}

impl Default for MonitorConfig {
	fn default() -> Self {
		Self {
			name: "story_mainnet".to_string(),
			network: NetworkSettings::default(),
			pattern: PatternSettings::default(),
			policy: PolicySettings::default(),
			scanner: ScannerSettings::default(),
			trade: TradeSettings::default(),
			alerts: AlertSettings::default(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkSettings {
	/// Candidate endpoints, probed in order
	pub rpc_urls: Vec<String>,
	pub chain_id: Option<u64>,
	pub probe_timeout_ms: u64,
	pub explorer_url: String,
}

impl Default for NetworkSettings {
	fn default() -> Self {
		Self {
			rpc_urls: DEFAULT_RPC_URLS.iter().map(|url| url.to_string()).collect(),
			chain_id: None,
			probe_timeout_ms: 10_000,
			explorer_url: DEFAULT_EXPLORER_URL.to_string(),
		}
	}
}

impl NetworkSettings {
	pub fn probe_timeout(&self) -> Duration {
		Duration::from_millis(self.probe_timeout_ms)
	}
}

/// Calldata layouts the extractor understands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CalldataSchema {
	/// `exactInput((bytes,address,uint256,uint256,uint256))`; asset is the last path token
	UniswapV3ExactInput,
	/// `exactInputSingle(...)`; asset is `tokenOut`
	UniswapV3ExactInputSingle,
	/// Asset is the 40 hex chars after the last occurrence of `marker`
	Marker { marker: String },
}

impl CalldataSchema {
	/// Selector this schema decodes, if it is bound to one
	pub fn expected_selector(&self) -> Option<&'static str> {
		match self {
			Self::UniswapV3ExactInput => Some(EXACT_INPUT_SELECTOR),
			Self::UniswapV3ExactInputSingle => Some(EXACT_INPUT_SINGLE_SELECTOR),
			Self::Marker { .. } => None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatternSettings {
	pub router: Address,
	/// 4-byte function selector as `0x`-prefixed hex
	pub selector: String,
	pub schema: CalldataSchema,
	/// Token whose transfers are summed as volume and spent on purchases
	pub reference_token: Address,
}

impl Default for PatternSettings {
	fn default() -> Self {
		Self {
			router: DEFAULT_ROUTER,
			selector: EXACT_INPUT_SELECTOR.to_string(),
			schema: CalldataSchema::UniswapV3ExactInput,
			reference_token: DEFAULT_REFERENCE_TOKEN,
		}
	}
}

impl PatternSettings {
	/// Decoded selector bytes, `None` if the configured hex is malformed
	pub fn selector_bytes(&self) -> Option<[u8; 4]> {
		let bytes = hex::decode(self.selector.trim_start_matches("0x")).ok()?;
		bytes.try_into().ok()
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicySettings {
	pub min_match_count: u64,
	/// Whole reference units, scaled by the reference decimals at startup
	pub min_volume: String,
}

impl Default for PolicySettings {
	fn default() -> Self {
		Self {
			min_match_count: 10,
			min_volume: "500".to_string(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScannerSettings {
	pub poll_interval_ms: u64,
	pub persist_cursor: bool,
	pub storage_path: PathBuf,
}

impl Default for ScannerSettings {
	fn default() -> Self {
		Self {
			poll_interval_ms: 3000,
			persist_cursor: false,
			storage_path: PathBuf::from("data"),
		}
	}
}

impl ScannerSettings {
	pub fn poll_interval(&self) -> Duration {
		Duration::from_millis(self.poll_interval_ms)
	}
}

/// Which swap entry point purchases use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapRoute {
	#[default]
	ExactInputSingle,
	ExactInput,
}

/// How the reference token is held by the trading wallet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceFunding {
	/// Chain-native balance sent as `value`; no allowance needed
	#[default]
	Native,
	/// ERC-20 balance spent through a router allowance
	Erc20,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfirmationSettings {
	pub max_attempts: u32,
	pub interval_ms: u64,
}

impl Default for ConfirmationSettings {
	fn default() -> Self {
		Self {
			max_attempts: 60,
			interval_ms: 2000,
		}
	}
}

impl ConfirmationSettings {
	pub fn interval(&self) -> Duration {
		Duration::from_millis(self.interval_ms)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TradeSettings {
	pub enabled: bool,
	/// Whole reference units spent per live purchase
	pub budget: String,
	/// Whole reference units used for dry-run purchases during replay
	pub replay_budget: String,
	pub router: Address,
	pub quoter: Address,
	pub fee_tier: u32,
	pub route: SwapRoute,
	pub deadline_secs: u64,
	pub default_gas_limit: u64,
	pub approve_gas_limit: u64,
	pub gas_multiplier: u64,
	/// `None` sends the swap with a zero minimum output
	pub max_slippage_bps: Option<u16>,
	pub funding: ReferenceFunding,
	pub confirmation: ConfirmationSettings,
}

impl Default for TradeSettings {
	fn default() -> Self {
		Self {
			enabled: true,
			budget: "100".to_string(),
			replay_budget: "0.2".to_string(),
			router: DEFAULT_ROUTER,
			quoter: DEFAULT_QUOTER,
			fee_tier: 3000,
			route: SwapRoute::default(),
			deadline_secs: 1200,
			default_gas_limit: 350_000,
			approve_gas_limit: 120_000,
			gas_multiplier: 2,
			max_slippage_bps: None,
			funding: ReferenceFunding::default(),
			confirmation: ConfirmationSettings::default(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramSettings {
	pub token: String,
	pub chat_ids: Vec<String>,
	#[serde(default = "default_disable_web_preview")]
	pub disable_web_preview: bool,
}

fn default_disable_web_preview() -> bool {
	true
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlertSettings {
	pub telegram: Option<TelegramSettings>,
}
