//! Block tracking for the scanner.
//!
//! Keeps a short history of processed blocks to flag:
//! - Out-of-order block processing
//! - Duplicate block processing
//!
//! The scanner owns its tracker, so no locking is involved.

use std::collections::VecDeque;

/// Result of checking a processed block for issues
#[derive(Debug, Clone, PartialEq)]
pub enum BlockCheckResult {
	/// Block is valid
	Ok,
	/// Duplicate block detected
	Duplicate { last_seen: u64 },
	/// Block received out of order
	OutOfOrder { expected: u64, received: u64 },
}

/// Monitors the sequence of processed blocks for one scanner
#[derive(Debug, Clone)]
pub struct BlockTracker {
	/// The last N processed blocks
	processed_history: VecDeque<u64>,
	/// Expected next processed block number
	expected_next: Option<u64>,
	/// Maximum number of blocks to keep in history
	history_size: usize,
}

impl BlockTracker {
	/// Creates a new BlockTracker instance.
	///
	/// # Arguments
	///
	/// * `history_size` - The maximum number of recent blocks to track
	pub fn new(history_size: usize) -> Self {
		Self {
			processed_history: VecDeque::with_capacity(history_size),
			expected_next: None,
			history_size,
		}
	}

	/// The highest recently processed block, if any
	pub fn last_block(&self) -> Option<u64> {
		self.processed_history.iter().max().copied()
	}

	/// Checks a processed block for duplicates or out-of-order issues
	///
	/// The block is always recorded; only in-order or ahead blocks move the expectation.
	pub fn check_processed_block(&mut self, block_number: u64) -> BlockCheckResult {
		let expected = *self.expected_next.get_or_insert(block_number);

		if self.processed_history.contains(&block_number) {
			let last_seen = *self.processed_history.back().unwrap_or(&block_number);
			return BlockCheckResult::Duplicate { last_seen };
		}

		let result = if block_number < expected {
			BlockCheckResult::OutOfOrder {
				expected,
				received: block_number,
			}
		} else {
			self.expected_next = Some(block_number + 1);
			BlockCheckResult::Ok
		};

		self.processed_history.push_back(block_number);
		while self.processed_history.len() > self.history_size {
			self.processed_history.pop_front();
		}

		result
	}

	/// Lowers the expected next block to `start_block` before a rescan of earlier blocks
	pub fn reset_expected_next(&mut self, start_block: u64) {
		match self.expected_next {
			Some(expected) if expected <= start_block => {}
			_ => self.expected_next = Some(start_block),
		}
	}
}
