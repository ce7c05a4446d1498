use alloy::primitives::{Address, U256};
use std::{
	sync::{
		atomic::{AtomicUsize, Ordering},
		Arc, Mutex,
	},
	time::Duration,
};
use tempfile::tempdir;

use crate::integration::mocks::{MockBlockHandler, MockCursorStorage, MockEvmClientTrait};
use surge_monitor::{
	models::{MatchRecord, ScanMode, ThresholdPolicy, TriggerEvent},
	services::{
		blockwatcher::{
			BlockScanner, BlockWatcherError, CursorStorage, FileCursorStorage, ScannerState,
		},
		trigger::{DispatchOutcome, TriggerReport},
	},
	utils::retry::RetryConfig,
};

const NAME: &str = "surge";

/// Client reporting `heights` in turn, repeating the last one
fn client_with_heights(heights: Vec<u64>) -> MockEvmClientTrait {
	let index = AtomicUsize::new(0);
	let mut client = MockEvmClientTrait::new();
	client.expect_get_latest_block_number().returning(move || {
		let i = index.fetch_add(1, Ordering::SeqCst).min(heights.len() - 1);
		Ok(heights[i])
	});
	client
}

/// Handler that records every block it is asked to process
fn recording_handler(seen: Arc<Mutex<Vec<u64>>>) -> MockBlockHandler {
	let mut handler = MockBlockHandler::new();
	handler.expect_handle_block().returning(move |block_number| {
		seen.lock().unwrap().push(block_number);
		Ok(Vec::new())
	});
	handler
}

fn report(block_number: u64) -> TriggerReport {
	TriggerReport {
		event: TriggerEvent {
			block_number,
			record: MatchRecord::new(Address::repeat_byte(0xaa)),
			policy: ThresholdPolicy::new(10, U256::from(500u64)),
			reference_decimals: 18,
		},
		outcome: DispatchOutcome {
			alerts_delivered: 0,
			purchase: None,
		},
	}
}

fn fast_retry() -> RetryConfig {
	RetryConfig {
		max_retries: 2,
		initial_delay: Duration::from_millis(1),
		max_delay: Duration::from_millis(2),
	}
}

#[tokio::test]
async fn test_first_tick_pins_cursor_to_chain_height() {
	let mut handler = MockBlockHandler::new();
	handler.expect_handle_block().times(0);

	let mut scanner = BlockScanner::new(
		NAME,
		client_with_heights(vec![250]),
		Arc::new(handler),
		Duration::from_millis(10),
	);
	scanner.initialise_cursor(None).await.unwrap();
	assert_eq!(scanner.cursor().last_checked_block(), None);

	let reports = scanner.tick().await.unwrap();

	assert!(reports.is_empty());
	assert_eq!(scanner.cursor().last_checked_block(), Some(250));
}

#[tokio::test]
async fn test_cursor_never_regresses_when_height_goes_back() {
	let seen = Arc::new(Mutex::new(Vec::new()));
	let mut scanner = BlockScanner::new(
		NAME,
		client_with_heights(vec![100, 103, 101, 103, 110]),
		Arc::new(recording_handler(seen.clone())),
		Duration::from_millis(10),
	);
	scanner.initialise_cursor(Some(100)).await.unwrap();

	let mut watermarks = Vec::new();
	for _ in 0..5 {
		scanner.tick().await.unwrap();
		watermarks.push(scanner.cursor().last_checked_block().unwrap());
	}

	assert_eq!(watermarks, vec![100, 103, 103, 103, 110]);
	assert_eq!(*seen.lock().unwrap(), (100..=110).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_transient_failure_retries_the_block_after_reconnecting() {
	let mut client = client_with_heights(vec![12]);
	client
		.expect_reconnect()
		.times(1)
		.returning(|| Ok("http://fallback".to_string()));

	let attempts = Arc::new(Mutex::new(Vec::new()));
	let calls = attempts.clone();
	let mut handler = MockBlockHandler::new();
	handler.expect_handle_block().returning(move |block_number| {
		let mut calls = calls.lock().unwrap();
		calls.push(block_number);
		if block_number == 12 && calls.iter().filter(|b| **b == 12).count() == 1 {
			Err(BlockWatcherError::network_error("connection reset"))
		} else {
			Ok(Vec::new())
		}
	});

	let mut scanner =
		BlockScanner::new(NAME, client, Arc::new(handler), Duration::from_millis(10));
	scanner.initialise_cursor(Some(11)).await.unwrap();

	assert!(scanner.tick().await.unwrap_err().is_transient());
	assert_eq!(scanner.cursor().last_checked_block(), Some(11));

	scanner.tick().await.unwrap();
	assert_eq!(scanner.cursor().last_checked_block(), Some(12));
	assert_eq!(*attempts.lock().unwrap(), vec![11, 12, 12]);
}

#[tokio::test]
async fn test_height_failure_reconnects() {
	let mut client = MockEvmClientTrait::new();
	client.expect_get_latest_block_number().times(1).returning(|| {
		Err(surge_monitor::services::blockchain::BlockChainError::connection_error(
			"timed out",
		))
	});
	client
		.expect_reconnect()
		.times(1)
		.returning(|| Ok("http://fallback".to_string()));
	let mut handler = MockBlockHandler::new();
	handler.expect_handle_block().times(0);

	let mut scanner =
		BlockScanner::new(NAME, client, Arc::new(handler), Duration::from_millis(10));
	scanner.initialise_cursor(Some(5)).await.unwrap();

	assert!(scanner.tick().await.is_err());
	assert_eq!(scanner.cursor().last_checked_block(), Some(4));
}

#[tokio::test]
async fn test_permanent_failure_skips_the_block() {
	let mut client = client_with_heights(vec![13]);
	client.expect_reconnect().times(0);

	let mut handler = MockBlockHandler::new();
	handler.expect_handle_block().returning(|block_number| {
		if block_number == 12 {
			Err(BlockWatcherError::processing_error("malformed block"))
		} else {
			Ok(vec![report(block_number)])
		}
	});

	let mut scanner =
		BlockScanner::new(NAME, client, Arc::new(handler), Duration::from_millis(10));
	scanner.initialise_cursor(Some(11)).await.unwrap();

	let reports = scanner.tick().await.unwrap();

	assert_eq!(
		reports
			.iter()
			.map(|r| r.event.block_number)
			.collect::<Vec<_>>(),
		vec![11, 13]
	);
	assert_eq!(scanner.cursor().last_checked_block(), Some(13));
}

#[tokio::test]
async fn test_persisted_cursor_is_resumed_and_saved() {
	let mut storage = MockCursorStorage::new();
	storage
		.expect_get_last_processed_block()
		.withf(|monitor| monitor == NAME)
		.times(1)
		.returning(|_| Ok(Some(500)));
	storage
		.expect_save_last_processed_block()
		.withf(|monitor, block| monitor == NAME && (501..=502).contains(block))
		.times(2)
		.returning(|_, _| Ok(()));

	let seen = Arc::new(Mutex::new(Vec::new()));
	let mut scanner = BlockScanner::new(
		NAME,
		client_with_heights(vec![502]),
		Arc::new(recording_handler(seen.clone())),
		Duration::from_millis(10),
	)
	.with_storage(Arc::new(storage));

	// A start block is ignored once something was persisted
	scanner.initialise_cursor(Some(10)).await.unwrap();
	assert_eq!(scanner.cursor().last_checked_block(), Some(500));

	scanner.tick().await.unwrap();
	assert_eq!(*seen.lock().unwrap(), vec![501, 502]);
}

#[tokio::test]
async fn test_save_failure_still_advances_the_cursor() {
	let mut storage = MockCursorStorage::new();
	storage
		.expect_get_last_processed_block()
		.returning(|_| Ok(None));
	storage
		.expect_save_last_processed_block()
		.returning(|_, _| Err(BlockWatcherError::storage_error("disk full")));

	let seen = Arc::new(Mutex::new(Vec::new()));
	let mut scanner = BlockScanner::new(
		NAME,
		client_with_heights(vec![3]),
		Arc::new(recording_handler(seen)),
		Duration::from_millis(10),
	)
	.with_storage(Arc::new(storage));
	scanner.initialise_cursor(Some(1)).await.unwrap();

	scanner.tick().await.unwrap();

	assert_eq!(scanner.cursor().last_checked_block(), Some(3));
}

#[tokio::test]
async fn test_file_storage_round_trips_the_cursor() {
	let dir = tempdir().unwrap();
	let storage = FileCursorStorage::new(dir.path());

	assert_eq!(storage.get_last_processed_block(NAME).await.unwrap(), None);

	storage.save_last_processed_block(NAME, 8_381_002).await.unwrap();

	assert_eq!(
		storage.get_last_processed_block(NAME).await.unwrap(),
		Some(8_381_002)
	);
	assert!(dir.path().join("surge_last_block.txt").exists());
}

#[tokio::test]
async fn test_start_and_stop() {
	let seen = Arc::new(Mutex::new(Vec::new()));
	let mut client = client_with_heights(vec![20, 21, 22]);
	client.expect_current_endpoint().returning(|| None);

	let mut scanner = BlockScanner::new(
		NAME,
		client,
		Arc::new(recording_handler(seen.clone())),
		Duration::from_millis(5),
	);
	scanner.initialise_cursor(Some(20)).await.unwrap();

	let handle = scanner.start();
	tokio::time::sleep(Duration::from_millis(100)).await;
	let scanner = handle.stop().await.unwrap();

	assert_eq!(scanner.state(), ScannerState::Idle);
	assert_eq!(scanner.mode(), ScanMode::Live);
	assert_eq!(scanner.cursor().last_checked_block(), Some(22));
	assert_eq!(*seen.lock().unwrap(), vec![20, 21, 22]);
	assert!(!scanner.status().await.monitoring_active);
}

#[tokio::test]
async fn test_replay_processes_the_range_in_order() {
	let mut client = MockEvmClientTrait::new();
	client.expect_get_latest_block_number().times(0);
	client
		.expect_reconnect()
		.times(1)
		.returning(|| Ok("http://fallback".to_string()));

	let attempts = Arc::new(Mutex::new(Vec::new()));
	let calls = attempts.clone();
	let mut handler = MockBlockHandler::new();
	handler.expect_handle_block().returning(move |block_number| {
		let mut calls = calls.lock().unwrap();
		calls.push(block_number);
		match block_number {
			8_381_003 if calls.len() == 2 => Err(BlockWatcherError::network_error("reset")),
			8_381_003 => Ok(vec![report(block_number)]),
			_ => Ok(Vec::new()),
		}
	});

	let mut scanner =
		BlockScanner::new(NAME, client, Arc::new(handler), Duration::from_secs(60))
			.with_retry(fast_retry());

	let reports = scanner.replay(8_381_002, 3).await.unwrap();

	assert_eq!(scanner.mode(), ScanMode::Replay);
	assert_eq!(reports.len(), 1);
	assert_eq!(reports[0].event.block_number, 8_381_003);
	assert_eq!(scanner.cursor().last_checked_block(), Some(8_381_004));
	assert_eq!(
		*attempts.lock().unwrap(),
		vec![8_381_002, 8_381_003, 8_381_003, 8_381_004]
	);
}

#[tokio::test]
async fn test_replay_gives_up_after_retries() {
	let mut client = MockEvmClientTrait::new();
	client
		.expect_reconnect()
		.times(3)
		.returning(|| Ok("http://fallback".to_string()));

	let mut handler = MockBlockHandler::new();
	handler
		.expect_handle_block()
		.times(3)
		.returning(|_| Err(BlockWatcherError::network_error("down")));

	let mut scanner =
		BlockScanner::new(NAME, client, Arc::new(handler), Duration::from_secs(60))
			.with_retry(fast_retry());

	let result = scanner.replay(100, 5).await;

	assert!(result.unwrap_err().is_transient());
	assert_eq!(scanner.cursor().last_checked_block(), Some(99));
}

#[tokio::test]
async fn test_replay_leaves_the_persisted_cursor_alone() {
	let dir = tempdir().unwrap();
	let storage = Arc::new(FileCursorStorage::new(dir.path()));
	storage.save_last_processed_block(NAME, 1_000).await.unwrap();

	let seen = Arc::new(Mutex::new(Vec::new()));
	let mut client = MockEvmClientTrait::new();
	client.expect_get_latest_block_number().times(0);

	let mut scanner = BlockScanner::new(
		NAME,
		client,
		Arc::new(recording_handler(seen.clone())),
		Duration::from_secs(60),
	)
	.with_storage(storage.clone());

	scanner.replay(10, 2).await.unwrap();

	assert_eq!(*seen.lock().unwrap(), vec![10, 11]);
	assert_eq!(scanner.cursor().last_checked_block(), Some(11));
	assert_eq!(
		storage.get_last_processed_block(NAME).await.unwrap(),
		Some(1_000)
	);
}

#[tokio::test]
async fn test_replay_never_saves_through_storage() {
	let mut storage = MockCursorStorage::new();
	storage.expect_save_last_processed_block().times(0);

	let mut client = MockEvmClientTrait::new();
	client.expect_get_latest_block_number().times(0);

	let mut scanner = BlockScanner::new(
		NAME,
		client,
		Arc::new(recording_handler(Arc::new(Mutex::new(Vec::new())))),
		Duration::from_secs(60),
	)
	.with_storage(Arc::new(storage));

	let reports = scanner.replay(8_381_002, 3).await.unwrap();

	assert!(reports.is_empty());
	assert_eq!(scanner.cursor().last_checked_block(), Some(8_381_004));
}

#[tokio::test]
async fn test_status_reports_connection_and_progress() {
	let mut client = client_with_heights(vec![42]);
	client
		.expect_current_endpoint()
		.returning(|| Some("http://primary".to_string()));
	let mut handler = MockBlockHandler::new();
	handler.expect_handle_block().returning(|_| Ok(Vec::new()));

	let mut scanner =
		BlockScanner::new(NAME, client, Arc::new(handler), Duration::from_millis(10));
	scanner.initialise_cursor(Some(42)).await.unwrap();
	scanner.tick().await.unwrap();

	let status = scanner.status().await;

	assert!(status.rpc_connected);
	assert_eq!(status.current_rpc.as_deref(), Some("http://primary"));
	assert!(!status.monitoring_active);
	assert_eq!(status.last_checked_block, Some(42));
	assert_eq!(status.mode, ScanMode::Live);
}
