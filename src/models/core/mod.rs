//! Core domain models for the swap monitor.
//!
//! - `monitor`: deployment configuration
//! - `endpoint`: RPC endpoints and their health
//! - `scan`: the scan cursor and monitor status
//! - `matching`: per-block match records, threshold policy and trigger events
//! - `trade`: purchase requests, outcomes and the failure taxonomy

mod endpoint;
mod matching;
mod monitor;
mod scan;
mod trade;

pub use endpoint::{Endpoint, EndpointStatus};
pub use matching::{MatchRecord, ThresholdPolicy, TriggerEvent};
pub use monitor::{
	AlertSettings, CalldataSchema, ConfirmationSettings, MonitorConfig, NetworkSettings,
	PatternSettings, PolicySettings, ReferenceFunding, ScannerSettings, SwapRoute,
	TelegramSettings, TradeSettings, DEFAULT_EXPLORER_URL, DEFAULT_QUOTER,
	DEFAULT_REFERENCE_TOKEN, DEFAULT_ROUTER, DEFAULT_RPC_URLS, EXACT_INPUT_SELECTOR,
	EXACT_INPUT_SINGLE_SELECTOR, SUPPORTED_FEE_TIERS,
};
pub use scan::{MonitorStatus, ScanCursor, ScanMode};
pub use trade::{
	FailureKind, PurchaseOptions, PurchaseRequest, PurchaseSuccess, TokenMetadata,
};
