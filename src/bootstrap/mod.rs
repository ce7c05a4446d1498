//! Bootstrap module for wiring services from a monitor configuration.
//!
//! The CLI drives everything through these helpers. Each one builds a single piece and
//! takes its collaborators as arguments, so tests can swap the chain client for a mock.
//!
//! # Pieces
//! - `connect_client`: HTTP client with an endpoint already selected
//! - `read_token_decimals`: one-off `decimals()` read of the reference token
//! - `create_trade_executor`: executor with the signing key attached when present
//! - `create_dispatcher`: purchase-then-alert dispatch for live or replay runs
//! - `create_block_pipeline` / `create_scanner`: the per-block handler and its loop
//! - `build_scanner`: all of the above against the live network

use alloy::{
	primitives::{utils::parse_units, Address, Bytes, U256},
	sol_types::SolCall,
};
use anyhow::{anyhow, Context};
use std::sync::Arc;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::{
	models::{
		signing_key_from_env, MonitorConfig, NetworkSettings, PolicySettings, ThresholdPolicy,
		IERC20,
	},
	services::{
		blockchain::{BlockChainClient, EvmClient, EvmClientTrait, HttpTransportClient},
		blockwatcher::{BlockHandler, BlockPipeline, BlockScanner, FileCursorStorage},
		filter::{FilterService, PatternMatcher},
		notification::NotificationService,
		trade::{parse_amount, signer_from_key, TradeExecutor, TradeExecutorTrait},
		trigger::{DispatchMode, TriggerDispatcher, TriggerDispatcherTrait},
	},
};

/// Type alias for results at the binary boundary
pub type Result<T> = std::result::Result<T, anyhow::Error>;

/// Chain client used against real endpoints
pub type LiveClient = EvmClient<HttpTransportClient>;

/// Scanner wired with the live client and the matching pipeline
pub type LiveScanner = BlockScanner<LiveClient, BlockPipeline<LiveClient>>;

/// Builds the HTTP client and selects the first healthy endpoint
///
/// # Errors
/// Fails when no configured endpoint answers the liveness probe.
pub async fn connect_client(network: &NetworkSettings) -> Result<LiveClient> {
	let client = EvmClient::new(network)
		.await
		.context("no RPC endpoint available")?;
	if let Some(url) = client.current_endpoint().await {
		info!("connected to {}", url);
	}
	Ok(client)
}

/// Reads the `decimals()` of an ERC-20 token
pub async fn read_token_decimals<C: EvmClientTrait>(client: &C, token: Address) -> Result<u8> {
	let output = client
		.call(token, Bytes::from(IERC20::decimalsCall {}.abi_encode()))
		.await
		.with_context(|| format!("failed to read decimals of {}", token))?;
	let decimals = IERC20::decimalsCall::abi_decode_returns(&output)
		.with_context(|| format!("invalid decimals() output from {}", token))?;
	Ok(decimals)
}

/// Scales the configured policy to the reference token's smallest unit
///
/// A literal zero volume gives a count-only policy. A non-zero volume that rounds to
/// zero is rejected.
pub fn threshold_policy(settings: &PolicySettings, decimals: u8) -> Result<ThresholdPolicy> {
	let raw = settings.min_volume.trim();
	let literal_zero = raw.contains('0') && raw.chars().all(|c| c == '0' || c == '.');
	if literal_zero && parse_units(raw, decimals).is_ok() {
		return Ok(ThresholdPolicy::new(settings.min_match_count, U256::ZERO));
	}

	let min_volume = parse_amount(raw, decimals).ok_or_else(|| {
		anyhow!(
			"min_volume {} is not representable with {} decimals",
			settings.min_volume,
			decimals
		)
	})?;
	Ok(ThresholdPolicy::new(settings.min_match_count, min_volume))
}

/// Creates the trade executor, signing with `signing_key` when one is given
///
/// Without a key the executor can still quote and simulate.
pub fn create_trade_executor<C: EvmClientTrait>(
	client: C,
	config: &MonitorConfig,
	reference_decimals: u8,
	signing_key: Option<&Zeroizing<String>>,
) -> Result<TradeExecutor<C>> {
	let executor = TradeExecutor::new(
		client,
		config.trade.clone(),
		config.pattern.reference_token,
		reference_decimals,
	)
	.with_chain_id(config.network.chain_id);

	match signing_key {
		Some(key) => {
			let signer = signer_from_key(key)?;
			info!("trading from {}", signer.address());
			Ok(executor.with_signer(signer))
		}
		None => {
			warn!("PRIVATE_KEY not set, purchases can only be simulated");
			Ok(executor)
		}
	}
}

/// Creates the trigger dispatcher for `mode`
///
/// Replays spend the replay budget and never alert.
pub fn create_dispatcher(
	executor: Option<Arc<dyn TradeExecutorTrait>>,
	config: &MonitorConfig,
	mode: DispatchMode,
) -> Result<TriggerDispatcher> {
	let (notifications, budget) = match mode {
		DispatchMode::Live => (
			NotificationService::from_settings(&config.alerts)?,
			config.trade.budget.clone(),
		),
		DispatchMode::Replay => (
			NotificationService::default(),
			config.trade.replay_budget.clone(),
		),
	};

	Ok(TriggerDispatcher::new(
		executor,
		notifications,
		mode,
		budget,
		config.network.explorer_url.clone(),
	))
}

/// Creates the fetch, filter, evaluate and dispatch pipeline
pub fn create_block_pipeline<C: EvmClientTrait>(
	client: C,
	config: &MonitorConfig,
	reference_decimals: u8,
	dispatcher: Arc<dyn TriggerDispatcherTrait>,
) -> Result<BlockPipeline<C>> {
	let matcher = PatternMatcher::from_settings(&config.pattern)
		.ok_or_else(|| anyhow!("invalid selector {}", config.pattern.selector))?;
	let policy = threshold_policy(&config.policy, reference_decimals)?;

	Ok(BlockPipeline::new(
		client,
		FilterService::new(matcher),
		policy,
		reference_decimals,
		dispatcher,
	))
}

/// Creates the scanner, persisting its cursor when the configuration asks for it
pub fn create_scanner<C: BlockChainClient, H: BlockHandler>(
	config: &MonitorConfig,
	client: C,
	handler: Arc<H>,
) -> BlockScanner<C, H> {
	let scanner = BlockScanner::new(
		config.name.clone(),
		client,
		handler,
		config.scanner.poll_interval(),
	);

	if config.scanner.persist_cursor {
		scanner.with_storage(Arc::new(FileCursorStorage::new(
			&config.scanner.storage_path,
		)))
	} else {
		scanner
	}
}

/// Connects and wires the complete scanner for `mode`
///
/// # Errors
/// Fails when no endpoint is reachable, when the reference token's decimals cannot be
/// read or when the signing key is malformed.
pub async fn build_scanner(config: &MonitorConfig, mode: DispatchMode) -> Result<LiveScanner> {
	let client = connect_client(&config.network).await?;
	let reference_decimals = read_token_decimals(&client, config.pattern.reference_token).await?;
	info!(
		"reference token {} has {} decimals",
		config.pattern.reference_token, reference_decimals
	);

	let executor: Option<Arc<dyn TradeExecutorTrait>> = if config.trade.enabled {
		let signing_key = signing_key_from_env();
		Some(Arc::new(create_trade_executor(
			client.clone(),
			config,
			reference_decimals,
			signing_key.as_ref(),
		)?))
	} else {
		info!("trading disabled, triggers only alert");
		None
	};

	let dispatcher = Arc::new(create_dispatcher(executor, config, mode)?);
	let pipeline = create_block_pipeline(client.clone(), config, reference_decimals, dispatcher)?;

	Ok(create_scanner(config, client, Arc::new(pipeline)))
}
