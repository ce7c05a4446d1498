//! Scan cursor and scanner status models.

use serde::{Deserialize, Serialize};

/// Watermark of the highest fully processed block
///
/// The cursor only moves forward; attempts to set it at or below its current value are
/// ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanCursor {
	last_checked_block: Option<u64>,
}

impl ScanCursor {
	/// An uninitialised cursor; the scanner pins it to the chain height on first tick
	pub fn new() -> Self {
		Self::default()
	}

	/// A cursor whose next block to process is `block + 1`
	pub fn starting_at(block: u64) -> Self {
		Self {
			last_checked_block: Some(block),
		}
	}

	pub fn last_checked_block(&self) -> Option<u64> {
		self.last_checked_block
	}

	pub fn is_initialised(&self) -> bool {
		self.last_checked_block.is_some()
	}

	/// Moves the watermark to `block`.
	///
	/// Returns `false` and leaves the cursor untouched when `block` does not advance it.
	pub fn advance(&mut self, block: u64) -> bool {
		match self.last_checked_block {
			Some(current) if block <= current => false,
			_ => {
				self.last_checked_block = Some(block);
				true
			}
		}
	}

	/// Next block to process, if the cursor is initialised
	pub fn next_block(&self) -> Option<u64> {
		self.last_checked_block.map(|block| block.saturating_add(1))
	}
}

/// Which driver is feeding blocks to the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
	Live,
	Replay,
}

/// Snapshot of a monitor instance's connection and progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorStatus {
	pub rpc_connected: bool,
	pub current_rpc: Option<String>,
	pub monitoring_active: bool,
	pub last_checked_block: Option<u64>,
	pub mode: ScanMode,
}
