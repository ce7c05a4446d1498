//! Cursor persistence.
//!
//! The last fully processed block is stored as plain text in
//! `{storage_path}/{monitor}_last_block.txt`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::services::blockwatcher::error::BlockWatcherError;

/// Persists the scan cursor between runs
#[async_trait]
pub trait CursorStorage: Send + Sync {
	/// Last processed block of `monitor`, `None` if nothing was stored yet
	async fn get_last_processed_block(
		&self,
		monitor: &str,
	) -> Result<Option<u64>, BlockWatcherError>;

	async fn save_last_processed_block(
		&self,
		monitor: &str,
		block: u64,
	) -> Result<(), BlockWatcherError>;
}

/// File-backed cursor storage
#[derive(Debug, Clone)]
pub struct FileCursorStorage {
	storage_path: PathBuf,
}

impl FileCursorStorage {
	pub fn new(storage_path: impl AsRef<Path>) -> Self {
		Self {
			storage_path: storage_path.as_ref().to_path_buf(),
		}
	}

	fn cursor_file(&self, monitor: &str) -> PathBuf {
		self.storage_path.join(format!("{}_last_block.txt", monitor))
	}
}

#[async_trait]
impl CursorStorage for FileCursorStorage {
	async fn get_last_processed_block(
		&self,
		monitor: &str,
	) -> Result<Option<u64>, BlockWatcherError> {
		let file_path = self.cursor_file(monitor);

		if !file_path.exists() {
			return Ok(None);
		}

		let content = tokio::fs::read_to_string(&file_path).await.map_err(|e| {
			BlockWatcherError::storage_error(format!(
				"Failed to read {}: {}",
				file_path.display(),
				e
			))
		})?;
		let block_number = content.trim().parse().map_err(|e| {
			BlockWatcherError::storage_error(format!(
				"Invalid block number in {}: {}",
				file_path.display(),
				e
			))
		})?;
		Ok(Some(block_number))
	}

	async fn save_last_processed_block(
		&self,
		monitor: &str,
		block: u64,
	) -> Result<(), BlockWatcherError> {
		tokio::fs::create_dir_all(&self.storage_path)
			.await
			.map_err(|e| {
				BlockWatcherError::storage_error(format!(
					"Failed to create {}: {}",
					self.storage_path.display(),
					e
				))
			})?;

		let file_path = self.cursor_file(monitor);
		tokio::fs::write(&file_path, block.to_string())
			.await
			.map_err(|e| {
				BlockWatcherError::storage_error(format!(
					"Failed to write {}: {}",
					file_path.display(),
					e
				))
			})
	}
}
