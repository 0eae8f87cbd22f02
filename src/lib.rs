//! mood-engine: market mood analysis and dispatch for token metadata
//!
//! This library provides the core components for:
//! - Market snapshots from CoinGecko
//! - Rolling price history with volatility and momentum
//! - Weighted sentiment fusion with trend tracking
//! - A priority-ordered mood decision list
//! - Change detection against the last dispatched mood
//! - Batched dispatch with retries and a delivery ledger
//! - Structured logging and Prometheus metrics

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod history;
pub mod market;
pub mod mood;
pub mod registry;
pub mod sentiment;
pub mod telemetry;
