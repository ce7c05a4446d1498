//! Chain data as consumed by the monitor.
//!
//! Only EVM-compatible chains are supported. The types here are narrow projections of
//! the JSON-RPC payloads.

pub mod evm;
