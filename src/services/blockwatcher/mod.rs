//! Block scanning.
//!
//! - `BlockScanner`: owned cursor, live polling loop and replay driver
//! - `BlockPipeline`: fetch, filter, evaluate and dispatch one block
//! - `BlockTracker`: duplicate and out-of-order detection
//! - `CursorStorage`: optional cursor persistence

mod error;
mod pipeline;
mod service;
mod storage;
mod tracker;

pub use error::BlockWatcherError;
pub use pipeline::{BlockHandler, BlockPipeline};
pub use service::{BlockScanner, ScannerHandle, ScannerState};
pub use storage::{CursorStorage, FileCursorStorage};
pub use tracker::{BlockCheckResult, BlockTracker};
