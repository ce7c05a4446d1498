//! Block scanner: the polling loop and the replay driver.
//!
//! One `BlockScanner` owns the client, the cursor and the block handler. The live loop
//! polls the chain height, processes every new block in order and advances the cursor
//! after each one. A replay feeds a fixed range through the same handler.

use backon::Retryable;
use std::{sync::Arc, time::Duration};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{error, info, instrument, warn};

use crate::{
	models::{MonitorStatus, ScanCursor, ScanMode},
	services::{
		blockchain::BlockChainClient,
		blockwatcher::{
			error::BlockWatcherError,
			pipeline::BlockHandler,
			storage::CursorStorage,
			tracker::{BlockCheckResult, BlockTracker},
		},
		trigger::TriggerReport,
	},
	utils::{metrics::record_block_processed, retry::RetryConfig},
};

const TRACKER_HISTORY_SIZE: usize = 100;

/// Lifecycle of a scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerState {
	Idle,
	Polling,
}

/// Scans blocks for one monitor
pub struct BlockScanner<C, H> {
	name: String,
	client: C,
	handler: Arc<H>,
	cursor: ScanCursor,
	tracker: BlockTracker,
	storage: Option<Arc<dyn CursorStorage>>,
	poll_interval: Duration,
	retry: RetryConfig,
	mode: ScanMode,
	state: ScannerState,
}

/// Handle to a scanner running on its own task
pub struct ScannerHandle<C, H> {
	stop_tx: watch::Sender<bool>,
	task: JoinHandle<BlockScanner<C, H>>,
}

impl<C, H> ScannerHandle<C, H> {
	/// Signals the loop to stop and waits for the in-flight tick to finish
	///
	/// # Returns
	/// * The scanner, back in `Idle` state
	pub async fn stop(self) -> Result<BlockScanner<C, H>, BlockWatcherError> {
		// The loop also stops if every receiver is gone, so a send error is harmless
		let _ = self.stop_tx.send(true);
		self.task.await.map_err(|e| {
			BlockWatcherError::processing_error(format!("Scanner task failed: {}", e))
		})
	}
}

impl<C: BlockChainClient, H: BlockHandler> BlockScanner<C, H> {
	/// Creates a new scanner with an uninitialised cursor
	///
	/// # Arguments
	/// * `name` - Monitor name, used to key the persisted cursor
	/// * `client` - Chain client used for the height and for reconnecting
	/// * `handler` - Per-block pipeline
	/// * `poll_interval` - Sleep between ticks of the live loop
	pub fn new(name: impl Into<String>, client: C, handler: Arc<H>, poll_interval: Duration) -> Self {
		Self {
			name: name.into(),
			client,
			handler,
			cursor: ScanCursor::new(),
			tracker: BlockTracker::new(TRACKER_HISTORY_SIZE),
			storage: None,
			poll_interval,
			retry: RetryConfig::default(),
			mode: ScanMode::Live,
			state: ScannerState::Idle,
		}
	}

	/// Persists the cursor after every processed block
	pub fn with_storage(mut self, storage: Arc<dyn CursorStorage>) -> Self {
		self.storage = Some(storage);
		self
	}

	pub fn with_retry(mut self, retry: RetryConfig) -> Self {
		self.retry = retry;
		self
	}

	pub fn cursor(&self) -> ScanCursor {
		self.cursor
	}

	pub fn state(&self) -> ScannerState {
		self.state
	}

	pub fn mode(&self) -> ScanMode {
		self.mode
	}

	/// Initialises the cursor from storage, then `start_block`
	///
	/// If neither is available the cursor stays unset and the first tick pins it to the
	/// chain height.
	///
	/// # Arguments
	/// * `start_block` - First block to process when nothing was persisted
	pub async fn initialise_cursor(
		&mut self,
		start_block: Option<u64>,
	) -> Result<(), BlockWatcherError> {
		if let Some(storage) = &self.storage {
			if let Some(block) = storage.get_last_processed_block(&self.name).await? {
				info!("resuming {} after persisted block {}", self.name, block);
				self.cursor = ScanCursor::starting_at(block);
				return Ok(());
			}
		}

		if let Some(start) = start_block {
			self.cursor = ScanCursor::starting_at(start.saturating_sub(1));
			self.tracker.reset_expected_next(start);
		}
		Ok(())
	}

	/// Snapshot of connection and progress
	pub async fn status(&self) -> MonitorStatus {
		let current_rpc = self.client.current_endpoint().await;
		MonitorStatus {
			rpc_connected: current_rpc.is_some(),
			current_rpc,
			monitoring_active: self.state == ScannerState::Polling,
			last_checked_block: self.cursor.last_checked_block(),
			mode: self.mode,
		}
	}

	async fn reconnect(&self) {
		match self.client.reconnect().await {
			Ok(url) => info!("switched to endpoint {}", url),
			Err(e) => error!("reconnect failed: {}", e),
		}
	}

	async fn advance_cursor(&mut self, block_number: u64) {
		if !self.cursor.advance(block_number) {
			return;
		}
		record_block_processed(block_number);

		// Replayed history must not overwrite the live cursor
		if self.mode == ScanMode::Replay {
			return;
		}
		if let Some(storage) = &self.storage {
			if let Err(e) = storage
				.save_last_processed_block(&self.name, block_number)
				.await
			{
				warn!("cursor not persisted: {}", e);
			}
		}
	}

	fn track(&mut self, block_number: u64) {
		match self.tracker.check_processed_block(block_number) {
			BlockCheckResult::Ok => {}
			BlockCheckResult::Duplicate { last_seen } => {
				warn!(
					"block {} processed again (last seen {})",
					block_number, last_seen
				);
			}
			BlockCheckResult::OutOfOrder { expected, received } => {
				warn!(
					"block {} processed out of order, expected {}",
					received, expected
				);
			}
		}
	}

	/// Runs one iteration of the live loop
	///
	/// Processes every block between the cursor and the chain height. A transient
	/// failure ends the tick without advancing past the failed block and triggers a
	/// reconnect; any other failure skips the block.
	///
	/// # Returns
	/// * `Result<Vec<TriggerReport>, BlockWatcherError>` - Reports of the blocks processed
	#[instrument(skip_all, fields(monitor = %self.name))]
	pub async fn tick(&mut self) -> Result<Vec<TriggerReport>, BlockWatcherError> {
		let height = match self.client.get_latest_block_number().await {
			Ok(height) => height,
			Err(e) => {
				let error = BlockWatcherError::from(e);
				if error.is_transient() {
					self.reconnect().await;
				}
				return Err(error);
			}
		};

		let Some(next) = self.cursor.next_block() else {
			info!("starting at chain height {}", height);
			self.cursor = ScanCursor::starting_at(height);
			return Ok(Vec::new());
		};

		let mut reports = Vec::new();
		for block_number in next..=height {
			match self.handler.handle_block(block_number).await {
				Ok(block_reports) => reports.extend(block_reports),
				Err(e) if e.is_transient() => {
					warn!("block {} will be retried: {}", block_number, e);
					self.reconnect().await;
					return Err(e);
				}
				Err(e) => error!("skipping block {}: {}", block_number, e),
			}

			self.track(block_number);
			self.advance_cursor(block_number).await;
		}

		Ok(reports)
	}

	/// The live loop: tick, then sleep until the next poll or a stop signal
	///
	/// The stop flag is checked before every tick; a tick in flight always completes.
	pub async fn run(&mut self, mut stop: watch::Receiver<bool>) {
		self.mode = ScanMode::Live;
		self.state = ScannerState::Polling;
		info!("{} polling every {:?}", self.name, self.poll_interval);

		loop {
			if *stop.borrow() {
				break;
			}

			if let Err(e) = self.tick().await {
				warn!("tick failed: {}", e);
			}

			tokio::select! {
				_ = tokio::time::sleep(self.poll_interval) => {}
				changed = stop.changed() => {
					if changed.is_err() {
						break;
					}
				}
			}
		}

		self.state = ScannerState::Idle;
		info!("{} stopped", self.name);
	}

	/// Processes `count` blocks starting at `start` without sleeping
	///
	/// Transient failures reconnect and retry the block with exponential backoff. Other
	/// failures skip the block. The persisted cursor is left untouched.
	///
	/// # Returns
	/// * `Result<Vec<TriggerReport>, BlockWatcherError>` - Every trigger in the range, or
	///   the transient error that exhausted the retries
	pub async fn replay(
		&mut self,
		start: u64,
		count: u64,
	) -> Result<Vec<TriggerReport>, BlockWatcherError> {
		self.mode = ScanMode::Replay;
		self.cursor = ScanCursor::starting_at(start.saturating_sub(1));
		self.tracker.reset_expected_next(start);
		info!("replaying {} blocks from {}", count, start);

		let mut reports = Vec::new();
		for block_number in start..start.saturating_add(count) {
			let client = &self.client;
			let handler = &self.handler;
			let result = (|| async move {
				match handler.handle_block(block_number).await {
					Err(e) if e.is_transient() => {
						if let Err(reconnect) = client.reconnect().await {
							warn!("reconnect failed: {}", reconnect);
						}
						Err(e)
					}
					other => other,
				}
			})
			.retry(self.retry.backoff())
			.when(BlockWatcherError::is_transient)
			.await;

			match result {
				Ok(block_reports) => reports.extend(block_reports),
				Err(e) if e.is_transient() => return Err(e),
				Err(e) => error!("skipping block {}: {}", block_number, e),
			}

			self.track(block_number);
			self.advance_cursor(block_number).await;
		}

		info!(
			"replay finished with {} triggers over {} blocks",
			reports.len(),
			count
		);
		Ok(reports)
	}
}

impl<C, H> BlockScanner<C, H>
where
	C: BlockChainClient + 'static,
	H: BlockHandler + 'static,
{
	/// Moves the scanner onto its own task and starts polling
	pub fn start(mut self) -> ScannerHandle<C, H> {
		let (stop_tx, stop_rx) = watch::channel(false);
		self.state = ScannerState::Polling;

		let task = tokio::spawn(async move {
			self.run(stop_rx).await;
			self
		});

		ScannerHandle { stop_tx, task }
	}
}
