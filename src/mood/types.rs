//! Mood types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete mood of an asset
///
/// Variant order matches the token contract's enum, see [`MoodState::code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoodState {
    Bullish,
    Bearish,
    Neutral,
    Volatile,
    PositiveSentiment,
    NegativeSentiment,
}

impl MoodState {
    /// All moods in contract order
    pub const ALL: [MoodState; 6] = [
        MoodState::Bullish,
        MoodState::Bearish,
        MoodState::Neutral,
        MoodState::Volatile,
        MoodState::PositiveSentiment,
        MoodState::NegativeSentiment,
    ];

    /// Contract discriminant
    pub fn code(&self) -> u8 {
        match self {
            MoodState::Bullish => 0,
            MoodState::Bearish => 1,
            MoodState::Neutral => 2,
            MoodState::Volatile => 3,
            MoodState::PositiveSentiment => 4,
            MoodState::NegativeSentiment => 5,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }
}

impl fmt::Display for MoodState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MoodState::Bullish => "Bullish",
            MoodState::Bearish => "Bearish",
            MoodState::Neutral => "Neutral",
            MoodState::Volatile => "Volatile",
            MoodState::PositiveSentiment => "PositiveSentiment",
            MoodState::NegativeSentiment => "NegativeSentiment",
        };
        f.write_str(name)
    }
}

/// Inputs that produced a mood
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoodFactors {
    /// 24h price change in percent
    pub price_change: f64,
    /// Annualized volatility in percent
    pub volatility: f64,
    /// Fused sentiment score
    pub sentiment: f64,
    /// 24h traded volume
    pub volume: f64,
}

/// A mood computed for one symbol in one cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodAnalysis {
    pub symbol: String,
    pub mood: MoodState,
    /// Confidence in [0, 1]
    pub confidence: f64,
    pub factors: MoodFactors,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mood_codes_round_trip_contract_order() {
        for (i, mood) in MoodState::ALL.iter().enumerate() {
            assert_eq!(mood.code() as usize, i);
            assert_eq!(MoodState::from_code(i as u8), Some(*mood));
        }
        assert_eq!(MoodState::from_code(6), None);
    }

    #[test]
    fn test_mood_serializes_as_name() {
        let json = serde_json::to_string(&MoodState::PositiveSentiment).unwrap();
        assert_eq!(json, "\"PositiveSentiment\"");
        assert_eq!(MoodState::Volatile.to_string(), "Volatile");
    }
}
