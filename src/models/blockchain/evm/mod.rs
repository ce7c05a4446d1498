//! EVM-specific data structures.

mod abi;
mod block;
mod receipt;
mod transaction;

pub use abi::{IQuoter, ISwapRouter, IERC20};
pub use block::{BlockTransaction, EVMBlock};
pub use receipt::EVMReceipt;
pub use transaction::TransactionView;
