//! Monitor configuration loading, environment overrides and validation.

use alloy::primitives::utils::{parse_units, ParseUnits};
use std::{env, fs, path::Path};
use zeroize::Zeroizing;

use crate::models::{
	config::error::ConfigError, CalldataSchema, ConfigLoader, MonitorConfig, TelegramSettings,
	SUPPORTED_FEE_TIERS,
};

/// Directory searched by `load_all` when no path is given
pub const DEFAULT_CONFIG_DIR: &str = "config/monitors";

/// Reads the signing key from `PRIVATE_KEY`.
///
/// The key never appears in configuration files.
pub fn signing_key_from_env() -> Option<Zeroizing<String>> {
	env::var("PRIVATE_KEY")
		.ok()
		.filter(|key| !key.trim().is_empty())
		.map(Zeroizing::new)
}

impl MonitorConfig {
	/// Loads `path` if it exists, otherwise the built-in deployment defaults, then applies
	/// environment overrides and validates.
	pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
		let mut config = match path {
			Some(path) if path.exists() => {
				let file = fs::File::open(path)?;
				serde_json::from_reader(file)?
			}
			Some(path) => {
				return Err(ConfigError::file_error(format!(
					"config file {} not found",
					path.display()
				)))
			}
			None => Self::default(),
		};

		config.apply_env_overrides()?;
		config.validate()?;
		Ok(config)
	}

	/// Applies `RPC_URL`, `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_IDS` from the process
	/// environment
	pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
		self.apply_overrides_from(|key| env::var(key).ok())
	}

	/// Applies overrides read through `lookup`
	pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

		if let Some(rpc_url) = non_empty("RPC_URL") {
			let rpc_url = rpc_url.trim().to_string();
			url::Url::parse(&rpc_url).map_err(|e| {
				ConfigError::environment_error(format!("RPC_URL is not a valid URL: {}", e))
			})?;
			self.network.rpc_urls.retain(|url| url != &rpc_url);
			self.network.rpc_urls.insert(0, rpc_url);
		}

		let chat_ids = non_empty("TELEGRAM_CHAT_IDS").map(|ids| {
			ids.split(',')
				.map(|id| id.trim().to_string())
				.filter(|id| !id.is_empty())
				.collect::<Vec<_>>()
		});

		match (non_empty("TELEGRAM_BOT_TOKEN"), self.alerts.telegram.as_mut()) {
			(Some(token), Some(telegram)) => telegram.token = token,
			(Some(token), None) => {
				self.alerts.telegram = Some(TelegramSettings {
					token,
					chat_ids: Vec::new(),
					disable_web_preview: true,
				})
			}
			(None, _) => {}
		}

		if let (Some(chat_ids), Some(telegram)) = (chat_ids, self.alerts.telegram.as_mut()) {
			telegram.chat_ids = chat_ids;
		}

		Ok(())
	}
}

fn validate_url(field: &str, value: &str) -> Result<(), ConfigError> {
	let url = url::Url::parse(value)?;
	if !matches!(url.scheme(), "http" | "https") {
		return Err(ConfigError::validation_error(format!(
			"{} must use http or https: {}",
			field, value
		)));
	}
	Ok(())
}

/// Accepts decimal amounts strictly greater than zero
fn validate_amount(field: &str, value: &str, allow_zero: bool) -> Result<(), ConfigError> {
	match parse_units(value.trim(), 18) {
		Ok(ParseUnits::U256(amount)) if allow_zero || !amount.is_zero() => Ok(()),
		_ => Err(ConfigError::validation_error(format!(
			"{} must be a {} decimal amount, got {:?}",
			field,
			if allow_zero { "non-negative" } else { "positive" },
			value
		))),
	}
}

impl ConfigLoader for MonitorConfig {
	/// Load all monitor configurations from a directory
	///
	/// Every JSON file in the directory (default `config/monitors`) is parsed and
	/// validated. Invalid files are skipped.
	fn load_all<T>(path: Option<&Path>) -> Result<T, ConfigError>
	where
		T: FromIterator<(String, Self)>,
	{
		let monitor_dir = path.unwrap_or(Path::new(DEFAULT_CONFIG_DIR));
		let mut pairs = Vec::new();

		if !monitor_dir.exists() {
			return Err(ConfigError::file_error("monitors directory not found"));
		}

		for entry in fs::read_dir(monitor_dir)? {
			let entry = entry?;
			let path = entry.path();

			if !Self::is_json_file(&path) {
				continue;
			}

			let name = path
				.file_stem()
				.and_then(|s| s.to_str())
				.unwrap_or("unknown")
				.to_string();

			if let Ok(monitor) = Self::load_from_path(&path) {
				pairs.push((name, monitor));
			}
		}

		Ok(T::from_iter(pairs))
	}

	fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
		let file = fs::File::open(path)?;
		let config: MonitorConfig = serde_json::from_reader(file)?;

		config.validate()?;

		Ok(config)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.name.trim().is_empty() {
			return Err(ConfigError::validation_error("Monitor name is required"));
		}

		if self.network.rpc_urls.is_empty() {
			return Err(ConfigError::validation_error(
				"At least one RPC URL is required",
			));
		}
		for url in &self.network.rpc_urls {
			validate_url("rpc_urls", url)?;
		}
		validate_url("explorer_url", &self.network.explorer_url)?;
		if self.network.probe_timeout_ms == 0 {
			return Err(ConfigError::validation_error(
				"probe_timeout_ms must be greater than zero",
			));
		}

		if self.pattern.selector_bytes().is_none() {
			return Err(ConfigError::validation_error(format!(
				"Selector must be 4 bytes of hex: {}",
				self.pattern.selector
			)));
		}
		if let Some(expected) = self.pattern.schema.expected_selector() {
			if !self.pattern.selector.eq_ignore_ascii_case(expected) {
				return Err(ConfigError::validation_error(format!(
					"Schema {:?} decodes selector {}, but {} is configured",
					self.pattern.schema, expected, self.pattern.selector
				)));
			}
		}
		if let CalldataSchema::Marker { marker } = &self.pattern.schema {
			if marker.is_empty() || !marker.chars().all(|c| c.is_ascii_hexdigit()) {
				return Err(ConfigError::validation_error(format!(
					"Marker must be non-empty hex: {:?}",
					marker
				)));
			}
		}

		validate_amount("policy.min_volume", &self.policy.min_volume, true)?;

		if self.scanner.poll_interval_ms < 100 {
			return Err(ConfigError::validation_error(
				"poll_interval_ms must be at least 100",
			));
		}

		let trade = &self.trade;
		validate_amount("trade.budget", &trade.budget, false)?;
		validate_amount("trade.replay_budget", &trade.replay_budget, false)?;
		if !SUPPORTED_FEE_TIERS.contains(&trade.fee_tier) {
			return Err(ConfigError::validation_error(format!(
				"Fee tier {} is not one of {:?}",
				trade.fee_tier, SUPPORTED_FEE_TIERS
			)));
		}
		if trade.max_slippage_bps.is_some_and(|bps| bps > 10_000) {
			return Err(ConfigError::validation_error(
				"max_slippage_bps must not exceed 10000",
			));
		}
		if trade.gas_multiplier < 1 {
			return Err(ConfigError::validation_error(
				"gas_multiplier must be at least 1",
			));
		}
		if trade.confirmation.max_attempts == 0 {
			return Err(ConfigError::validation_error(
				"confirmation.max_attempts must be at least 1",
			));
		}

		if let Some(telegram) = &self.alerts.telegram {
			if telegram.token.trim().is_empty() {
				return Err(ConfigError::validation_error(
					"Telegram bot token is required",
				));
			}
		}

		Ok(())
	}
}
