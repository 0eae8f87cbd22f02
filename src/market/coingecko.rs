//! CoinGecko API client for market snapshots
//!
//! Queries the `/coins/markets` endpoint, which returns price, 24h volume,
//! 24h change, 24h range and market cap in a single record per coin.

use super::{MarketDataSource, MarketSnapshot};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// CoinGecko API base URL
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

/// Configuration for the CoinGecko client
#[derive(Debug, Clone)]
pub struct CoinGeckoConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Quote currency
    pub vs_currency: String,
    /// Asset symbol to CoinGecko coin id
    pub coin_ids: HashMap<String, String>,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: COINGECKO_API_URL.to_string(),
            timeout: Duration::from_secs(10),
            vs_currency: "usd".to_string(),
            coin_ids: HashMap::new(),
        }
    }
}

/// Client for CoinGecko market data
pub struct CoinGeckoClient {
    config: CoinGeckoConfig,
    client: Client,
}

impl CoinGeckoClient {
    /// Create a new client with custom configuration
    pub fn with_config(mut config: CoinGeckoConfig) -> anyhow::Result<Self> {
        // Symbols are matched case-insensitively, as the registry upper-cases them
        config.coin_ids = config
            .coin_ids
            .into_iter()
            .map(|(symbol, id)| (symbol.to_uppercase(), id))
            .collect();

        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    /// Provider coin id for a symbol, falling back to the lowercased symbol
    fn coin_id(&self, symbol: &str) -> String {
        self.config
            .coin_ids
            .get(&symbol.to_uppercase())
            .cloned()
            .unwrap_or_else(|| symbol.to_lowercase())
    }

    /// Convert a raw market record into a snapshot
    fn convert_to_snapshot(symbol: &str, raw: CoinGeckoMarket) -> anyhow::Result<MarketSnapshot> {
        let price = raw
            .current_price
            .ok_or_else(|| anyhow::anyhow!("Missing current_price for {}", symbol))?;

        let timestamp = raw
            .last_updated
            .as_ref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        Ok(MarketSnapshot {
            symbol: symbol.to_string(),
            price,
            volume_24h: raw.total_volume.unwrap_or_default(),
            price_change_24h: raw.price_change_24h.unwrap_or_default(),
            price_change_percent_24h: raw.price_change_percentage_24h.unwrap_or_default(),
            high_24h: raw.high_24h.unwrap_or(price),
            low_24h: raw.low_24h.unwrap_or(price),
            market_cap: raw.market_cap.unwrap_or_default(),
            timestamp,
        })
    }
}

#[async_trait]
impl MarketDataSource for CoinGeckoClient {
    async fn fetch_snapshot(&self, symbol: &str) -> anyhow::Result<MarketSnapshot> {
        let url = format!("{}/coins/markets", self.config.base_url);
        let coin_id = self.coin_id(symbol);

        tracing::debug!(url = %url, symbol, coin_id = %coin_id, "Fetching market snapshot");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("vs_currency", self.config.vs_currency.as_str()),
                ("ids", coin_id.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("CoinGecko API error: {} - {}", status, body);
        }

        let markets: Vec<CoinGeckoMarket> = response.json().await?;
        let raw = markets
            .into_iter()
            .find(|m| m.id == coin_id)
            .ok_or_else(|| anyhow::anyhow!("No market record for {} ({})", symbol, coin_id))?;

        Self::convert_to_snapshot(symbol, raw)
    }
}

/// Raw market record from CoinGecko. Every numeric field may be null.
#[derive(Debug, Deserialize)]
struct CoinGeckoMarket {
    id: String,
    current_price: Option<Decimal>,
    market_cap: Option<Decimal>,
    total_volume: Option<Decimal>,
    high_24h: Option<Decimal>,
    low_24h: Option<Decimal>,
    price_change_24h: Option<Decimal>,
    price_change_percentage_24h: Option<Decimal>,
    last_updated: Option<String>,
}
