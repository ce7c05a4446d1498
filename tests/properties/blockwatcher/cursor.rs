use async_trait::async_trait;
use proptest::{prelude::*, test_runner::Config};
use std::{
	sync::{Arc, Mutex},
	time::Duration,
};

use crate::properties::strategies::heights_strategy;
use surge_monitor::{
	models::EVMBlock,
	services::{
		blockchain::{BlockChainClient, BlockChainError},
		blockwatcher::{BlockHandler, BlockScanner, BlockWatcherError},
		trigger::TriggerReport,
	},
};

/// Client whose chain height follows a script
#[derive(Clone)]
struct ScriptedChain {
	heights: Arc<Mutex<Vec<u64>>>,
}

#[async_trait]
impl BlockChainClient for ScriptedChain {
	async fn get_latest_block_number(&self) -> Result<u64, BlockChainError> {
		let mut heights = self.heights.lock().unwrap();
		if heights.len() > 1 {
			Ok(heights.remove(0))
		} else {
			Ok(heights[0])
		}
	}

	async fn get_block(&self, block_number: u64) -> Result<EVMBlock, BlockChainError> {
		Err(BlockChainError::block_not_found(block_number))
	}

	async fn reconnect(&self) -> Result<String, BlockChainError> {
		Ok("http://scripted".to_string())
	}

	async fn current_endpoint(&self) -> Option<String> {
		Some("http://scripted".to_string())
	}
}

/// Handler failing transiently on the listed blocks, once each
struct FlakyHandler {
	flaky: Mutex<Vec<u64>>,
	processed: Mutex<Vec<u64>>,
}

#[async_trait]
impl BlockHandler for FlakyHandler {
	async fn handle_block(&self, block_number: u64) -> Result<Vec<TriggerReport>, BlockWatcherError> {
		let mut flaky = self.flaky.lock().unwrap();
		if let Some(index) = flaky.iter().position(|b| *b == block_number) {
			flaky.remove(index);
			return Err(BlockWatcherError::network_error("flaky"));
		}
		self.processed.lock().unwrap().push(block_number);
		Ok(Vec::new())
	}
}

proptest! {
	#![proptest_config(Config {
		failure_persistence: None,
		cases: 64,
		..Config::default()
	})]

	#[test]
	fn test_cursor_is_monotonic_and_blocks_are_processed_once_in_order(
		heights in heights_strategy(),
		flaky in prop::collection::vec(1_000u64..1_040, 0..4),
	) {
		let runtime = tokio::runtime::Builder::new_current_thread()
			.enable_all()
			.build()
			.unwrap();

		let max_height = heights.iter().copied().max().unwrap();
		// The chain settles at its highest point so every failed block gets retried
		let mut script = heights.clone();
		script.push(max_height);

		let handler = Arc::new(FlakyHandler {
			flaky: Mutex::new(flaky),
			processed: Mutex::new(Vec::new()),
		});
		let client = ScriptedChain {
			heights: Arc::new(Mutex::new(script.clone())),
		};
		let mut scanner =
			BlockScanner::new("prop", client, handler.clone(), Duration::from_millis(1));

		let watermarks = runtime.block_on(async {
			scanner.initialise_cursor(Some(1_000)).await.unwrap();
			let mut watermarks = Vec::new();
			for _ in 0..script.len() + 4 {
				let _ = scanner.tick().await;
				watermarks.push(scanner.cursor().last_checked_block());
			}
			watermarks
		});

		for pair in watermarks.windows(2) {
			prop_assert!(pair[0] <= pair[1]);
		}

		let processed = handler.processed.lock().unwrap().clone();
		let expected: Vec<u64> = (1_000..=max_height).collect();
		prop_assert_eq!(processed, expected);
		prop_assert_eq!(scanner.cursor().last_checked_block(), Some(max_height));
	}
}
