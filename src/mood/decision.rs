//! Mood decision engine
//!
//! A priority-ordered decision list; the first matching rule wins:
//! 1. extreme volatility → Volatile
//! 2. strong, confident positive sentiment → PositiveSentiment
//! 3. strong, confident negative sentiment → NegativeSentiment
//! 4. price up with positive sentiment → Bullish
//! 5. price down with negative sentiment → Bearish
//! 6. price up against sentiment → Volatile or Neutral by volatility
//! 7. price down against sentiment → Volatile or Neutral by volatility
//! 8. otherwise → Neutral

use super::{MoodAnalysis, MoodFactors, MoodState};
use crate::config::MoodThresholds;
use crate::market::MarketSnapshot;
use crate::sentiment::SentimentSample;
use chrono::Utc;

/// Confidence assigned when price and sentiment disagree
const MIXED_SIGNAL_CONFIDENCE: f64 = 0.6;

/// Confidence of the fallback Neutral mood
const DEFAULT_CONFIDENCE: f64 = 0.7;

/// Price move (percent) that maps to full confidence
const FULL_CONFIDENCE_MOVE_PCT: f64 = 20.0;

/// Stateless mood classifier
#[derive(Debug, Clone, Default)]
pub struct MoodDecisionEngine {
    thresholds: MoodThresholds,
}

impl MoodDecisionEngine {
    pub fn new(thresholds: MoodThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &MoodThresholds {
        &self.thresholds
    }

    /// Classify a mood. Pure: equal inputs always give equal outputs.
    pub fn decide(
        &self,
        price_change_pct: f64,
        sentiment_score: f64,
        sentiment_confidence: f64,
        volatility_pct: f64,
    ) -> (MoodState, f64) {
        let t = &self.thresholds;

        if volatility_pct > t.volatile_pct {
            return (MoodState::Volatile, (volatility_pct / 100.0).min(1.0));
        }

        if sentiment_score > t.sentiment_strong && sentiment_confidence > t.sentiment_confidence {
            return (MoodState::PositiveSentiment, sentiment_confidence);
        }

        if sentiment_score < -t.sentiment_strong && sentiment_confidence > t.sentiment_confidence
        {
            return (MoodState::NegativeSentiment, sentiment_confidence);
        }

        if price_change_pct > t.price_move_pct && sentiment_score > 0.0 {
            return (
                MoodState::Bullish,
                (price_change_pct / FULL_CONFIDENCE_MOVE_PCT).min(1.0),
            );
        }

        if price_change_pct < -t.price_move_pct && sentiment_score < 0.0 {
            return (
                MoodState::Bearish,
                (price_change_pct.abs() / FULL_CONFIDENCE_MOVE_PCT).min(1.0),
            );
        }

        let mixed_signal_mood = || {
            if volatility_pct > t.mixed_signal_volatility_pct {
                MoodState::Volatile
            } else {
                MoodState::Neutral
            }
        };

        if price_change_pct > t.price_move_pct && sentiment_score <= 0.0 {
            return (mixed_signal_mood(), MIXED_SIGNAL_CONFIDENCE);
        }

        if price_change_pct < -t.price_move_pct && sentiment_score >= 0.0 {
            return (mixed_signal_mood(), MIXED_SIGNAL_CONFIDENCE);
        }

        (MoodState::Neutral, DEFAULT_CONFIDENCE)
    }

    /// Full analysis for one symbol from its snapshot, sentiment and volatility
    pub fn analyze(
        &self,
        snapshot: &MarketSnapshot,
        sentiment: &SentimentSample,
        volatility_pct: f64,
    ) -> MoodAnalysis {
        let price_change = snapshot.price_change_percent_f64();
        let (mood, confidence) = self.decide(
            price_change,
            sentiment.score,
            sentiment.confidence,
            volatility_pct,
        );

        MoodAnalysis {
            symbol: snapshot.symbol.clone(),
            mood,
            confidence,
            factors: MoodFactors {
                price_change,
                volatility: volatility_pct,
                sentiment: sentiment.score,
                volume: snapshot.volume_f64(),
            },
            timestamp: Utc::now(),
        }
    }
}
