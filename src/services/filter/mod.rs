//! Swap pattern filtering and per-block aggregation.
//!
//! - `calldata`: versioned extraction of the target asset from router calldata
//! - `matcher`: router/selector matching and reference-token volume
//! - `aggregate`: per-asset match records for one block
//! - `threshold`: pure threshold evaluation
//! - `FilterService`: runs the above over a block

mod aggregate;
mod calldata;
mod error;
mod filter_service;
mod matcher;
mod threshold;

pub use aggregate::BlockAggregate;
pub use calldata::{asset_from_path, encode_path, CalldataDecoder, ExtractionError};
pub use error::FilterError;
pub use filter_service::FilterService;
pub use matcher::PatternMatcher;
pub use threshold::evaluate;
