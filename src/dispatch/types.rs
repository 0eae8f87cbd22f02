//! Dispatch types

use crate::mood::{MoodAnalysis, MoodFactors, MoodState};
use crate::registry::TokenId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-token result of a dispatch attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DispatchOutcome {
    /// Delivered after `attempts` sends
    Sent { attempts: u32 },
    /// Still undelivered after `attempts` sends
    Failed { attempts: u32, reason: String },
    /// Not attempted
    Skipped { reason: String },
}

impl DispatchOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, DispatchOutcome::Sent { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, DispatchOutcome::Failed { .. })
    }
}

/// Wire payload for one mood update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodUpdate {
    pub token_id: TokenId,
    pub symbol: String,
    pub mood: MoodState,
    /// Contract discriminant of `mood`
    pub mood_code: u8,
    pub confidence: f64,
    pub factors: MoodFactors,
    pub timestamp: DateTime<Utc>,
}

impl MoodUpdate {
    pub fn new(token_id: TokenId, analysis: &MoodAnalysis) -> Self {
        Self {
            token_id,
            symbol: analysis.symbol.clone(),
            mood: analysis.mood,
            mood_code: analysis.mood.code(),
            confidence: analysis.confidence,
            factors: analysis.factors,
            timestamp: analysis.timestamp,
        }
    }
}
