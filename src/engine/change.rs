//! Mood change detection
//!
//! Owns the previous-mood table. A mood is worth dispatching when the token
//! has never been dispatched, or when it differs from the previous mood with
//! enough confidence. Repeated moods and low-confidence flips are suppressed.

use crate::mood::MoodState;
use crate::registry::TokenId;
use std::collections::HashMap;

/// Decides whether a freshly computed mood warrants an update
pub struct ChangeDetector {
    confidence_threshold: f64,
    previous: HashMap<TokenId, MoodState>,
}

impl ChangeDetector {
    pub fn new(confidence_threshold: f64) -> Self {
        Self {
            confidence_threshold,
            previous: HashMap::new(),
        }
    }

    /// True iff there is no previous mood, or the candidate differs from it
    /// with confidence above the threshold
    pub fn should_update(
        &self,
        previous: Option<MoodState>,
        candidate: MoodState,
        confidence: f64,
    ) -> bool {
        match previous {
            None => true,
            Some(prev) => candidate != prev && confidence > self.confidence_threshold,
        }
    }

    /// `should_update` against the table entry for `token_id`
    pub fn evaluate(&self, token_id: TokenId, candidate: MoodState, confidence: f64) -> bool {
        self.should_update(self.previous(token_id), candidate, confidence)
    }

    pub fn previous(&self, token_id: TokenId) -> Option<MoodState> {
        self.previous.get(&token_id).copied()
    }

    /// Remember the mood decided for a token
    pub fn record(&mut self, token_id: TokenId, mood: MoodState) {
        self.previous.insert(token_id, mood);
    }

    pub fn tracked(&self) -> usize {
        self.previous.len()
    }
}
