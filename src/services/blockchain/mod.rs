//! Blockchain client interfaces and implementations.
//!
//! - `BlockChainClient`: block access used by the scanner
//! - `EvmClientTrait`: receipts, calls and transaction submission used by matching and
//!   trading
//! - `transports`: JSON-RPC over HTTP with ordered endpoint selection
//! - Error handling for blockchain operations

mod client;
mod clients;
mod error;
mod transports;

pub use client::BlockChainClient;
pub use clients::{EvmClient, EvmClientTrait};
pub use error::BlockChainError;
pub use transports::{
	BlockchainTransport, EndpointManager, HttpTransportClient, RotatingTransport,
	TransientErrorRetryStrategy, TransportError,
};
