//! Market data types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One cycle's read of an asset's market data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Asset symbol (e.g., "SOL")
    pub symbol: String,
    /// Current price in USD
    pub price: Decimal,
    /// Traded volume over the last 24 hours
    pub volume_24h: Decimal,
    /// Absolute price change over the last 24 hours
    pub price_change_24h: Decimal,
    /// Price change over the last 24 hours in percent
    pub price_change_percent_24h: Decimal,
    pub high_24h: Decimal,
    pub low_24h: Decimal,
    pub market_cap: Decimal,
    /// Time the provider last updated this record
    pub timestamp: DateTime<Utc>,
}

impl MarketSnapshot {
    /// Snapshot carrying only a price, other fields zeroed
    pub fn from_price(symbol: impl Into<String>, price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            volume_24h: Decimal::ZERO,
            price_change_24h: Decimal::ZERO,
            price_change_percent_24h: Decimal::ZERO,
            high_24h: price,
            low_24h: price,
            market_cap: Decimal::ZERO,
            timestamp: Utc::now(),
        }
    }

    pub fn price_change_percent_f64(&self) -> f64 {
        f64::try_from(self.price_change_percent_24h).unwrap_or(0.0)
    }

    pub fn volume_f64(&self) -> f64 {
        f64::try_from(self.volume_24h).unwrap_or(0.0)
    }
}
