//! Sentiment types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The three independently obtained signals, each in [-1, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentSignals {
    pub social: f64,
    pub on_chain: f64,
    pub technical: f64,
}

impl SentimentSignals {
    pub fn as_array(&self) -> [f64; 3] {
        [self.social, self.on_chain, self.technical]
    }
}

/// A fused sentiment reading for one symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentSample {
    pub symbol: String,
    /// Weighted score in [-1, 1]
    pub score: f64,
    /// Signal agreement in [0, 1]
    pub confidence: f64,
    pub signals: SentimentSignals,
    pub timestamp: DateTime<Utc>,
}

/// Direction of the sentiment score over recent samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

/// Summary of recent sentiment for one symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentTrend {
    pub direction: TrendDirection,
    /// Mean score across the samples considered
    pub average_score: f64,
    /// Latest score minus earliest score
    pub change: f64,
    /// Number of samples considered
    pub samples: usize,
}
