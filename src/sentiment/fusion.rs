//! Sentiment fusion
//!
//! Combines the three signals with configurable weights. Confidence is one
//! minus the standard deviation of the signals, so agreeing signals give
//! high confidence and disagreeing ones lower it.

use super::{SentimentSample, SentimentSignals, SentimentTrend, TrendDirection};
use crate::config::SentimentWeights;
use crate::market::MarketSnapshot;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};

/// Multiplier applied to the technical score when the asset traded at all
const VOLUME_AMPLIFIER: f64 = 1.2;

/// Score change across the trend window that counts as a direction
const TREND_THRESHOLD: f64 = 0.1;

/// Banded technical score from the 24h price change
///
/// `>10% → 0.5`, `>5% → 0.3`, `>0% → 0.1`, mirrored for declines, amplified
/// by 1.2 when there is any volume.
pub fn technical_score(price_change_pct: f64, volume: f64) -> f64 {
    let band = if price_change_pct > 10.0 {
        0.5
    } else if price_change_pct > 5.0 {
        0.3
    } else if price_change_pct > 0.0 {
        0.1
    } else if price_change_pct < -10.0 {
        -0.5
    } else if price_change_pct < -5.0 {
        -0.3
    } else if price_change_pct < 0.0 {
        -0.1
    } else {
        0.0
    };

    let score = if volume > 0.0 {
        band * VOLUME_AMPLIFIER
    } else {
        band
    };
    score.clamp(-1.0, 1.0)
}

/// Fuses signals and keeps the per-symbol sentiment history
pub struct SentimentFusion {
    weights: SentimentWeights,
    capacity: usize,
    history: HashMap<String, VecDeque<SentimentSample>>,
}

impl SentimentFusion {
    /// Create a fusion stage keeping at most `capacity` samples per symbol
    pub fn new(weights: SentimentWeights, capacity: usize) -> Self {
        Self {
            weights,
            capacity: capacity.max(1),
            history: HashMap::new(),
        }
    }

    /// Weighted score of the signals, clamped to [-1, 1]
    pub fn combine(&self, signals: &SentimentSignals) -> f64 {
        let score = self.weights.social * signals.social
            + self.weights.on_chain * signals.on_chain
            + self.weights.technical * signals.technical;
        score.clamp(-1.0, 1.0)
    }

    /// Agreement between the signals, clamped to [0, 1]
    pub fn confidence(signals: &SentimentSignals) -> f64 {
        let values = signals.as_array();
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        (1.0 - variance.sqrt()).clamp(0.0, 1.0)
    }

    /// Fuse a snapshot with the external social and on-chain reads and
    /// record the resulting sample
    pub fn fuse(&mut self, snapshot: &MarketSnapshot, social: f64, on_chain: f64) -> SentimentSample {
        let signals = SentimentSignals {
            social: social.clamp(-1.0, 1.0),
            on_chain: on_chain.clamp(-1.0, 1.0),
            technical: technical_score(snapshot.price_change_percent_f64(), snapshot.volume_f64()),
        };

        let sample = SentimentSample {
            symbol: snapshot.symbol.clone(),
            score: self.combine(&signals),
            confidence: Self::confidence(&signals),
            signals,
            timestamp: Utc::now(),
        };

        tracing::debug!(
            symbol = %sample.symbol,
            score = sample.score,
            confidence = sample.confidence,
            social = signals.social,
            on_chain = signals.on_chain,
            technical = signals.technical,
            "Sentiment fused"
        );

        self.record(sample.clone());
        sample
    }

    fn record(&mut self, sample: SentimentSample) {
        let capacity = self.capacity;
        let series = self
            .history
            .entry(sample.symbol.clone())
            .or_insert_with(|| VecDeque::with_capacity(capacity));

        series.push_back(sample);
        while series.len() > capacity {
            series.pop_front();
        }
    }

    /// Most recent sample for a symbol
    pub fn latest(&self, symbol: &str) -> Option<&SentimentSample> {
        self.history.get(symbol).and_then(|s| s.back())
    }

    /// Recorded samples for a symbol, oldest first
    pub fn history(&self, symbol: &str) -> Vec<&SentimentSample> {
        self.history
            .get(symbol)
            .map(|s| s.iter().collect())
            .unwrap_or_default()
    }

    /// Trend across the last `samples` readings; `None` without history
    pub fn trend(&self, symbol: &str, samples: usize) -> Option<SentimentTrend> {
        let series = self.history.get(symbol)?;
        if series.is_empty() || samples == 0 {
            return None;
        }

        let skip = series.len().saturating_sub(samples);
        let recent: Vec<f64> = series.iter().skip(skip).map(|s| s.score).collect();

        let n = recent.len();
        let average_score = recent.iter().sum::<f64>() / n as f64;
        let change = recent[n - 1] - recent[0];

        let direction = if change > TREND_THRESHOLD {
            TrendDirection::Improving
        } else if change < -TREND_THRESHOLD {
            TrendDirection::Declining
        } else {
            TrendDirection::Stable
        };

        Some(SentimentTrend {
            direction,
            average_score,
            change,
            samples: n,
        })
    }
}
