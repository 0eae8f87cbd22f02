//! Per-symbol price history store
//!
//! Keeps the most recent samples per symbol in a FIFO ring and derives
//! annualized volatility and windowed momentum from them.

use super::PricePoint;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};

/// Value returned by every estimate that lacks the two samples it needs
pub const INSUFFICIENT_DATA: f64 = 0.0;

const MINUTES_PER_YEAR: f64 = 365.0 * 24.0 * 60.0;

/// Bounded price history for every tracked symbol
pub struct PriceHistoryStore {
    capacity: usize,
    series: HashMap<String, VecDeque<PricePoint>>,
}

impl PriceHistoryStore {
    /// Create a store keeping at most `capacity` samples per symbol
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            series: HashMap::new(),
        }
    }

    /// Append a sample, evicting the oldest one when the series is full
    pub fn record_sample(&mut self, symbol: &str, price: Decimal, timestamp: DateTime<Utc>) {
        let capacity = self.capacity;
        let series = self
            .series
            .entry(symbol.to_string())
            .or_insert_with(|| VecDeque::with_capacity(capacity));

        series.push_back(PricePoint::new(price, timestamp));
        while series.len() > capacity {
            series.pop_front();
        }
    }

    /// Annualized volatility (percent) over the trailing window ending now
    pub fn compute_volatility(&self, symbol: &str, window_minutes: u64) -> f64 {
        self.compute_volatility_at(symbol, window_minutes, Utc::now())
    }

    /// Annualized volatility (percent) over the trailing window ending at `now`
    ///
    /// Uses simple period-over-period returns and their population standard
    /// deviation, scaled by `sqrt(minutes_per_year / window_minutes)`.
    pub fn compute_volatility_at(
        &self,
        symbol: &str,
        window_minutes: u64,
        now: DateTime<Utc>,
    ) -> f64 {
        if window_minutes == 0 {
            return INSUFFICIENT_DATA;
        }

        let prices = self.window_prices(symbol, window_minutes, now);
        if prices.len() < 2 {
            return INSUFFICIENT_DATA;
        }

        let returns: Vec<f64> = prices
            .windows(2)
            .filter(|w| w[0] != 0.0)
            .map(|w| (w[1] - w[0]) / w[0])
            .collect();

        if returns.is_empty() {
            return INSUFFICIENT_DATA;
        }

        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();

        let periods_per_year = MINUTES_PER_YEAR / window_minutes as f64;
        std_dev * periods_per_year.sqrt() * 100.0
    }

    /// Percent change from the earliest to the latest sample in the window
    pub fn compute_momentum(&self, symbol: &str, window_minutes: u64) -> f64 {
        self.compute_momentum_at(symbol, window_minutes, Utc::now())
    }

    pub fn compute_momentum_at(
        &self,
        symbol: &str,
        window_minutes: u64,
        now: DateTime<Utc>,
    ) -> f64 {
        let prices = self.window_prices(symbol, window_minutes, now);
        if prices.len() < 2 {
            return INSUFFICIENT_DATA;
        }

        let first = prices[0];
        let last = prices[prices.len() - 1];
        if first == 0.0 {
            return INSUFFICIENT_DATA;
        }

        (last - first) / first * 100.0
    }

    /// Most recent sample for a symbol
    pub fn latest(&self, symbol: &str) -> Option<PricePoint> {
        self.series.get(symbol).and_then(|s| s.back().copied())
    }

    /// Number of samples held for a symbol
    pub fn len(&self, symbol: &str) -> usize {
        self.series.get(symbol).map_or(0, VecDeque::len)
    }

    /// All samples held for a symbol, oldest first
    pub fn samples(&self, symbol: &str) -> Vec<PricePoint> {
        self.series
            .get(symbol)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn window_prices(&self, symbol: &str, window_minutes: u64, now: DateTime<Utc>) -> Vec<f64> {
        let Some(series) = self.series.get(symbol) else {
            return Vec::new();
        };

        // A window reaching past the representable time range covers everything
        let cutoff = i64::try_from(window_minutes)
            .ok()
            .and_then(Duration::try_minutes)
            .and_then(|window| now.checked_sub_signed(window));

        series
            .iter()
            .filter(|p| cutoff.map_or(true, |cutoff| p.timestamp >= cutoff))
            .map(PricePoint::price_f64)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn store_with(prices: &[Decimal], step_minutes: i64, now: DateTime<Utc>) -> PriceHistoryStore {
        let mut store = PriceHistoryStore::new(100);
        let start = now - Duration::minutes(step_minutes * (prices.len() as i64 - 1));
        for (i, price) in prices.iter().enumerate() {
            store.record_sample("SOL", *price, start + Duration::minutes(step_minutes * i as i64));
        }
        store
    }

    #[test]
    fn test_empty_store_returns_insufficient_data() {
        let store = PriceHistoryStore::new(10);
        assert_eq!(store.compute_volatility("SOL", 60), INSUFFICIENT_DATA);
        assert_eq!(store.compute_momentum("SOL", 60), INSUFFICIENT_DATA);
        assert!(store.latest("SOL").is_none());
    }

    #[test]
    fn test_single_sample_returns_insufficient_data() {
        let now = Utc::now();
        let store = store_with(&[dec!(100)], 5, now);
        assert_eq!(store.compute_volatility_at("SOL", 60, now), 0.0);
        assert_eq!(store.compute_momentum_at("SOL", 60, now), 0.0);
    }

    #[test]
    fn test_samples_outside_window_ignored() {
        let now = Utc::now();
        let mut store = PriceHistoryStore::new(10);
        store.record_sample("SOL", dec!(100), now - Duration::minutes(120));
        store.record_sample("SOL", dec!(150), now - Duration::minutes(90));
        store.record_sample("SOL", dec!(110), now);

        // Only one sample within the last hour
        assert_eq!(store.compute_volatility_at("SOL", 60, now), 0.0);
        assert_eq!(store.compute_momentum_at("SOL", 60, now), 0.0);
        assert_eq!(store.len("SOL"), 3);
    }

    #[test]
    fn test_volatility_known_value() {
        let now = Utc::now();
        let store = store_with(&[dec!(100), dec!(110), dec!(99)], 5, now);

        // Returns +10% and -10%, std dev 0.1, annualized over 8760 hourly periods
        let expected = 0.1 * (8760.0_f64).sqrt() * 100.0;
        let vol = store.compute_volatility_at("SOL", 60, now);
        assert!((vol - expected).abs() < 1e-6, "vol = {vol}");
    }

    #[test]
    fn test_volatility_constant_price() {
        let now = Utc::now();
        let store = store_with(&[dec!(42); 6], 5, now);
        assert_eq!(store.compute_volatility_at("SOL", 60, now), 0.0);
    }

    #[test]
    fn test_volatility_skips_zero_price_returns() {
        let now = Utc::now();
        let store = store_with(&[dec!(0), dec!(0)], 5, now);
        assert_eq!(store.compute_volatility_at("SOL", 60, now), INSUFFICIENT_DATA);
    }

    #[test]
    fn test_momentum_up_and_down() {
        let now = Utc::now();
        let up = store_with(&[dec!(100), dec!(105), dec!(110)], 5, now);
        assert!((up.compute_momentum_at("SOL", 60, now) - 10.0).abs() < 1e-9);

        let down = store_with(&[dec!(200), dec!(150)], 5, now);
        assert!((down.compute_momentum_at("SOL", 60, now) + 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_capacity_fifo_eviction() {
        let now = Utc::now();
        let mut store = PriceHistoryStore::new(3);
        for i in 0..4 {
            store.record_sample("SOL", Decimal::from(100 + i), now + Duration::seconds(i));
        }

        assert_eq!(store.len("SOL"), 3);
        let samples = store.samples("SOL");
        assert_eq!(samples[0].price, dec!(101));
        assert_eq!(samples[2].price, dec!(103));
        assert_eq!(store.latest("SOL").unwrap().price, dec!(103));
    }

    #[test]
    fn test_symbols_are_independent() {
        let now = Utc::now();
        let mut store = PriceHistoryStore::new(5);
        store.record_sample("SOL", dec!(100), now);
        store.record_sample("BTC", dec!(60000), now);
        store.record_sample("BTC", dec!(61000), now);

        assert_eq!(store.len("SOL"), 1);
        assert_eq!(store.len("BTC"), 2);
    }

    #[test]
    fn test_zero_window() {
        let now = Utc::now();
        let store = store_with(&[dec!(100), dec!(110)], 1, now);
        assert_eq!(store.compute_volatility_at("SOL", 0, now), INSUFFICIENT_DATA);
    }

    #[test]
    fn test_window_beyond_time_range_covers_all_samples() {
        let now = Utc::now();
        let store = store_with(&[dec!(100), dec!(110), dec!(99)], 1, now);

        for window in [1_000_000_000_000, u64::MAX / 2, u64::MAX] {
            let volatility = store.compute_volatility_at("SOL", window, now);
            assert!(volatility.is_finite() && volatility > 0.0);

            let momentum = store.compute_momentum_at("SOL", window, now);
            assert!((momentum - -1.0).abs() < 1e-9);
        }
    }
}
