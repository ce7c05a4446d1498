//! Core blockchain client interface.
//!
//! The scanner depends only on this trait; trading and matching use the EVM extension in
//! `clients::evm`.

use async_trait::async_trait;

use crate::{models::EVMBlock, services::blockchain::BlockChainError};

/// Defines the core interface for blockchain clients
#[async_trait]
pub trait BlockChainClient: Send + Sync + Clone {
	/// Retrieves the latest block number from the blockchain
	///
	/// # Returns
	/// * `Result<u64, BlockChainError>` - The latest block number or an error
	async fn get_latest_block_number(&self) -> Result<u64, BlockChainError>;

	/// Retrieves one block with full transaction objects
	///
	/// # Arguments
	/// * `block_number` - The block to fetch
	///
	/// # Returns
	/// * `Result<EVMBlock, BlockChainError>` - The block, or `BlockNotFound` if the node does
	///   not have it yet
	async fn get_block(&self, block_number: u64) -> Result<EVMBlock, BlockChainError>;

	/// Re-runs endpoint selection and returns the newly active URL
	async fn reconnect(&self) -> Result<String, BlockChainError>;

	/// URL of the active endpoint, if any
	async fn current_endpoint(&self) -> Option<String>;
}
