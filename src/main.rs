//! Swap-pattern monitor entry point.
//!
//! Loads the monitor configuration, then runs one of four commands:
//! - `monitor` (default): polls the chain until Ctrl+C, buying and alerting on triggers
//! - `replay`: feeds a fixed block range through the same pipeline with dry-run purchases
//! - `purchase`: one manual purchase, exit code 1 on failure
//! - `status`: selects an endpoint and prints the scanner status as JSON

use surge_monitor::{
	bootstrap::{
		build_scanner, connect_client, create_trade_executor, read_token_decimals, Result,
	},
	models::{signing_key_from_env, MonitorConfig, PurchaseOptions, PurchaseRequest},
	services::{
		trade::TradeExecutorTrait,
		trigger::{DispatchMode, TriggerReport},
	},
	utils::{logging::setup_logging, metrics::server::create_metrics_server},
};

use clap::{value_parser, Arg, ArgMatches, Command};
use dotenvy::dotenv;
use serde::Serialize;
use std::{
	env::{set_var, var},
	path::PathBuf,
};
use tracing::{error, info};

const DEFAULT_SIM_START_BLOCK: u64 = 8_381_002;
const DEFAULT_SIM_BLOCK_COUNT: u64 = 10;

/// JSON summary printed after a replay
#[derive(Serialize)]
struct ReplaySummary {
	start_block: u64,
	block_count: u64,
	last_checked_block: Option<u64>,
	triggers: Vec<TriggerReport>,
}

fn cli() -> Command {
	Command::new("surge-monitor")
		.version(env!("CARGO_PKG_VERSION"))
		.about(
			"Watches a chain for bursts of swaps into the same asset and buys the asset when \
			 activity and volume cross the configured thresholds.",
		)
		.arg(
			Arg::new("config")
				.long("config")
				.global(true)
				.help("Monitor configuration file (default: built-in deployment settings)")
				.value_name("PATH"),
		)
		.arg(
			Arg::new("log-file")
				.long("log-file")
				.global(true)
				.help("Write logs to file instead of stdout")
				.action(clap::ArgAction::SetTrue),
		)
		.arg(
			Arg::new("log-level")
				.long("log-level")
				.global(true)
				.help("Set log level (trace, debug, info, warn, error)")
				.value_name("LEVEL"),
		)
		.arg(
			Arg::new("log-path")
				.long("log-path")
				.global(true)
				.help("Path to store log files (default: logs/)")
				.value_name("PATH"),
		)
		.arg(
			Arg::new("metrics-address")
				.long("metrics-address")
				.global(true)
				.help("Address to start the metrics server on (default: 127.0.0.1:8081)")
				.value_name("HOST:PORT"),
		)
		.arg(
			Arg::new("metrics")
				.long("metrics")
				.global(true)
				.help("Enable metrics server")
				.action(clap::ArgAction::SetTrue),
		)
		.subcommand(Command::new("monitor").about("Monitor the chain until interrupted"))
		.subcommand(
			Command::new("replay")
				.about("Replay a block range with simulated purchases and no alerts")
				.arg(
					Arg::new("start")
						.long("start")
						.help("First block (default: SIM_START_BLOCK or 8381002)")
						.value_name("BLOCK")
						.value_parser(value_parser!(u64)),
				)
				.arg(
					Arg::new("count")
						.long("count")
						.help("Number of blocks (default: SIM_BLOCK_COUNT or 10)")
						.value_name("COUNT")
						.value_parser(value_parser!(u64)),
				),
		)
		.subcommand(
			Command::new("purchase")
				.about("Buy an asset with the reference token")
				.arg(
					Arg::new("asset")
						.help("Address of the token to buy")
						.required(true),
				)
				.arg(
					Arg::new("amount")
						.help("Whole reference units to spend")
						.required(true),
				)
				.arg(
					Arg::new("fee")
						.help("Pool fee tier (default: configured fee tier)")
						.value_parser(value_parser!(u32)),
				)
				.arg(
					Arg::new("dry-run")
						.long("dry-run")
						.help("Quote only; nothing is signed or sent")
						.action(clap::ArgAction::SetTrue),
				),
		)
		.subcommand(Command::new("status").about("Print connection and cursor status as JSON"))
}

/// Block count argument, then its environment variable, then the default
fn block_arg(matches: &ArgMatches, name: &str, env_key: &str, default: u64) -> Result<u64> {
	if let Some(value) = matches.get_one::<u64>(name) {
		return Ok(*value);
	}
	match var(env_key) {
		Ok(value) => value
			.trim()
			.parse()
			.map_err(|e| anyhow::anyhow!("invalid {}: {}", env_key, e)),
		Err(_) => Ok(default),
	}
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}

/// Runs the live loop until Ctrl+C or until the metrics server exits
async fn run_monitor(config: &MonitorConfig, matches: &ArgMatches) -> Result<()> {
	let mut scanner = build_scanner(config, DispatchMode::Live).await?;
	scanner.initialise_cursor(None).await?;

	// Check if metrics should be enabled from either CLI flag or env var
	let metrics_enabled =
		matches.get_flag("metrics") || var("METRICS_ENABLED").map(|v| v == "true").unwrap_or(false);
	let metrics_address = matches
		.get_one::<String>("metrics-address")
		.map(|s| s.to_string())
		.unwrap_or_else(|| "127.0.0.1:8081".to_string());

	let metrics_server = if metrics_enabled {
		match create_metrics_server(metrics_address) {
			Ok(server) => Some(server),
			Err(e) => {
				error!("Failed to create metrics server: {}", e);
				None
			}
		}
	} else {
		info!("Metrics server disabled. Use --metrics flag or METRICS_ENABLED=true to enable");
		None
	};

	let handle = scanner.start();
	info!("Monitor started. Press Ctrl+C to shutdown");

	let ctrl_c = tokio::signal::ctrl_c();
	if let Some(metrics_future) = metrics_server {
		tokio::select! {
			result = ctrl_c => {
				if let Err(e) = result {
					error!("Error waiting for Ctrl+C: {}", e);
				}
				info!("Shutdown signal received, stopping monitor...");
			}
			result = metrics_future => {
				if let Err(e) = result {
					error!("Metrics server error: {}", e);
				}
				info!("Metrics server stopped, stopping monitor...");
			}
		}
	} else {
		let _ = ctrl_c.await;
		info!("Shutdown signal received, stopping monitor...");
	}

	let scanner = handle.stop().await?;
	info!(
		"Shutdown complete at block {:?}",
		scanner.cursor().last_checked_block()
	);
	Ok(())
}

async fn run_replay(config: &MonitorConfig, matches: &ArgMatches) -> Result<()> {
	let start_block = block_arg(matches, "start", "SIM_START_BLOCK", DEFAULT_SIM_START_BLOCK)?;
	let block_count = block_arg(matches, "count", "SIM_BLOCK_COUNT", DEFAULT_SIM_BLOCK_COUNT)?;

	let mut scanner = build_scanner(config, DispatchMode::Replay).await?;
	let triggers = scanner.replay(start_block, block_count).await?;

	print_json(&ReplaySummary {
		start_block,
		block_count,
		last_checked_block: scanner.cursor().last_checked_block(),
		triggers,
	})
}

/// Runs one purchase and returns whether it succeeded
async fn run_purchase(config: &MonitorConfig, matches: &ArgMatches) -> Result<bool> {
	let asset = matches
		.get_one::<String>("asset")
		.ok_or_else(|| anyhow::anyhow!("asset is required"))?;
	let amount = matches
		.get_one::<String>("amount")
		.ok_or_else(|| anyhow::anyhow!("amount is required"))?;
	let options = PurchaseOptions {
		dry_run: matches.get_flag("dry-run"),
		fee_tier: matches.get_one::<u32>("fee").copied(),
	};

	let client = connect_client(&config.network).await?;
	let decimals = read_token_decimals(&client, config.pattern.reference_token).await?;
	let signing_key = signing_key_from_env();
	let executor = create_trade_executor(client, config, decimals, signing_key.as_ref())?;

	match executor
		.purchase(&PurchaseRequest::new(asset, amount), &options)
		.await
	{
		Ok(success) => {
			print_json(&success)?;
			Ok(true)
		}
		Err(e) => {
			print_json(&e)?;
			Ok(false)
		}
	}
}

async fn run_status(config: &MonitorConfig) -> Result<()> {
	let mut scanner = build_scanner(config, DispatchMode::Live).await?;
	scanner.initialise_cursor(None).await?;
	print_json(&scanner.status().await)
}

/// Main entry point for the swap-pattern monitor.
///
/// # Errors
/// Returns an error if the configuration is invalid, if no endpoint is reachable at
/// startup or if the selected command fails.
#[tokio::main]
async fn main() -> Result<()> {
	let matches = cli().get_matches();

	// Load environment variables from .env file
	dotenv().ok();

	// Only apply CLI options if the corresponding environment variables are NOT already set
	if matches.get_flag("log-file") && var("LOG_MODE").is_err() {
		set_var("LOG_MODE", "file");
	}

	if let Some(level) = matches.get_one::<String>("log-level") {
		if var("LOG_LEVEL").is_err() {
			set_var("LOG_LEVEL", level);
		}
	}

	if let Some(path) = matches.get_one::<String>("log-path") {
		if var("LOG_DATA_DIR").is_err() {
			set_var("LOG_DATA_DIR", path);
		}
	}

	setup_logging().unwrap_or_else(|e| {
		error!("Failed to setup logging: {}", e);
	});

	let config_path = matches.get_one::<String>("config").map(PathBuf::from);
	let config = MonitorConfig::load_or_default(config_path.as_deref())?;
	info!("Loaded monitor {}", config.name);

	match matches.subcommand() {
		Some(("replay", sub)) => run_replay(&config, sub).await,
		Some(("purchase", sub)) => {
			if !run_purchase(&config, sub).await? {
				std::process::exit(1);
			}
			Ok(())
		}
		Some(("status", _)) => run_status(&config).await,
		Some(("monitor", sub)) => run_monitor(&config, sub).await,
		_ => run_monitor(&config, &matches).await,
	}
}
