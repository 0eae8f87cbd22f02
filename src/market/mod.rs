//! Market data module
//!
//! Per-symbol market snapshots from a remote price API

mod coingecko;
mod types;

pub use coingecko::{CoinGeckoClient, CoinGeckoConfig, COINGECKO_API_URL};
pub use types::MarketSnapshot;

use async_trait::async_trait;

/// Trait for market data source implementations
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch the freshest snapshot for a symbol
    async fn fetch_snapshot(&self, symbol: &str) -> anyhow::Result<MarketSnapshot>;
}
