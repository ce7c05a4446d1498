//! Logging utilities for the application
//!
//! Logging is built on `tracing_subscriber`. Output goes to stdout by default; setting
//! `LOG_MODE=file` switches to a daily rolling file under `LOG_DATA_DIR` (default `logs/`).
//!
//! The level is taken from `LOG_LEVEL` when set, otherwise from `RUST_LOG`, falling back to
//! `info`. Error constructors across the crate log through the `log` facade, which the
//! subscriber picks up via its `tracing-log` bridge.
use std::env;

use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Directory used for log files when `LOG_DATA_DIR` is not set
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Prefix of the rolling log file names
pub const LOG_FILE_PREFIX: &str = "surge-monitor.log";

type LoggingError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Setup logging for the application
///
/// Reads `LOG_MODE` to decide between stdout and file output.
pub fn setup_logging() -> Result<(), LoggingError> {
	let mode = env::var("LOG_MODE").unwrap_or_default();

	if mode.eq_ignore_ascii_case("file") {
		let log_dir = env::var("LOG_DATA_DIR").unwrap_or_else(|_| DEFAULT_LOG_DIR.to_string());
		std::fs::create_dir_all(&log_dir)?;
		let appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
		init_subscriber(appender, false)
	} else {
		setup_logging_with_writer(std::io::stdout)
	}
}

/// Setup logging for the application with a custom writer
///
/// Used by tests to capture output and by `setup_logging` for stdout.
pub fn setup_logging_with_writer<W>(writer: W) -> Result<(), LoggingError>
where
	W: for<'writer> tracing_subscriber::fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
	init_subscriber(writer, true)
}

/// Builds the level filter from `LOG_LEVEL`, then `RUST_LOG`, then `info`
fn build_filter() -> EnvFilter {
	match env::var("LOG_LEVEL") {
		Ok(level) if !level.trim().is_empty() => EnvFilter::new(level),
		_ => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
	}
}

fn init_subscriber<W>(writer: W, ansi: bool) -> Result<(), LoggingError>
where
	W: for<'writer> tracing_subscriber::fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
	tracing_subscriber::registry()
		.with(build_filter())
		.with(
			fmt::layer()
				.with_writer(writer)
				.event_format(
					fmt::format()
						.with_level(true)
						.with_target(true)
						.with_thread_ids(false)
						.with_thread_names(false)
						.with_ansi(ansi)
						.compact(),
				)
				.fmt_fields(fmt::format::PrettyFields::new()),
		)
		.try_init()?;
	Ok(())
}
