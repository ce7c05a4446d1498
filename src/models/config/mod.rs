//! Configuration loading and validation.
//!
//! Monitor configurations are JSON files. Loading parses with `serde_json`, applies
//! environment overrides where the caller asks for them, and validates before the
//! configuration reaches any service.

use std::path::Path;

mod error;
mod monitor_config;

pub use error::ConfigError;
pub use monitor_config::{signing_key_from_env, DEFAULT_CONFIG_DIR};

/// Common interface for loading configuration files
pub trait ConfigLoader: Sized {
	fn load_all<T>(path: Option<&Path>) -> Result<T, ConfigError>
	where
		T: FromIterator<(String, Self)>;

	fn load_from_path(path: &Path) -> Result<Self, ConfigError>;

	fn validate(&self) -> Result<(), ConfigError>;

	fn is_json_file(path: &Path) -> bool {
		path.extension()
			.map(|ext| ext.to_string_lossy().to_lowercase() == "json")
			.unwrap_or(false)
	}
}
