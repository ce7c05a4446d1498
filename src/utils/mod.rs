//! Utility modules for common functionality.
//!
//! This module provides various utility functions and types that are used across
//! the application. Currently includes:
//!
//! - http: Retrying HTTP client construction
//! - logging: Logging utilities
//! - metrics: Metrics utilities
//! - retry: Backoff and polling policies
//! - tests: Builders for test fixtures

pub mod http;
pub mod logging;
pub mod metrics;
pub mod retry;
pub mod tests;
