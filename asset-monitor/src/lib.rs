//! Asset monitor: polls an asset, compares readings against thresholds, and
//! records debounced alerts to an append-only log.

pub mod api;
pub mod api_client;
pub mod clock;
pub mod config;
pub mod debounce;
pub mod error;
pub mod evaluator;
pub mod monitor;
pub mod sink;
pub mod source;
pub mod tracing;
pub mod types;
