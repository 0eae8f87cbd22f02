//! Price history types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single recorded price observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Observed price
    pub price: Decimal,
    /// Observation time
    pub timestamp: DateTime<Utc>,
}

impl PricePoint {
    pub fn new(price: Decimal, timestamp: DateTime<Utc>) -> Self {
        Self { price, timestamp }
    }

    /// Price as a float for statistics
    pub fn price_f64(&self) -> f64 {
        f64::try_from(self.price).unwrap_or(0.0)
    }
}
