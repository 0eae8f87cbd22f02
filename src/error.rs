//! Engine error types

use std::time::Duration;
use thiserror::Error;

/// Errors raised while running a dispatch cycle
#[derive(Debug, Error)]
pub enum EngineError {
    /// A snapshot fetch for one symbol failed or timed out
    #[error("Data fetch failed for {symbol}: {reason}")]
    DataFetch { symbol: String, reason: String },
    /// The dispatch sink reported it is not ready
    #[error("Dispatch sink unavailable")]
    SinkUnavailable,
    /// The cycle did not finish before its deadline
    #[error("Cycle timed out after {0:?}")]
    CycleTimeout(Duration),
    /// The cycle panicked and was isolated at the cycle boundary
    #[error("Cycle panicked: {0}")]
    CyclePanicked(String),
}

/// Startup configuration errors. Always fatal.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A required parameter is absent
    #[error("Missing required configuration: {0}")]
    Missing(&'static str),
    /// A parameter is present but unusable
    #[error("Invalid configuration for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
