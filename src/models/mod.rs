//! Domain models and data structures for swap-pattern monitoring.
//!
//! - `blockchain`: RPC projections of EVM blocks, transactions and receipts
//! - `config`: Configuration loading and validation
//! - `core`: Core domain models (configuration, cursor, matches, purchases)

mod blockchain;
mod config;
mod core;

pub use blockchain::evm::{
	BlockTransaction, EVMBlock, EVMReceipt, IQuoter, ISwapRouter, TransactionView, IERC20,
};

pub use core::{
	AlertSettings, CalldataSchema, ConfirmationSettings, Endpoint, EndpointStatus, FailureKind,
	MatchRecord, MonitorConfig, MonitorStatus, NetworkSettings, PatternSettings, PolicySettings,
	PurchaseOptions, PurchaseRequest, PurchaseSuccess, ReferenceFunding, ScanCursor, ScanMode,
	ScannerSettings, SwapRoute, TelegramSettings, ThresholdPolicy, TokenMetadata, TradeSettings,
	TriggerEvent, DEFAULT_EXPLORER_URL, DEFAULT_QUOTER, DEFAULT_REFERENCE_TOKEN, DEFAULT_ROUTER,
	DEFAULT_RPC_URLS, EXACT_INPUT_SELECTOR, EXACT_INPUT_SINGLE_SELECTOR, SUPPORTED_FEE_TIERS,
};

pub use config::{signing_key_from_env, ConfigError, ConfigLoader, DEFAULT_CONFIG_DIR};
