//! Delivery ledger
//!
//! Tracks, per token, whether the last decided mood actually reached the
//! sink. Failed deliveries are offered for retry on later cycles until they
//! exhaust their attempts and move to a bounded dead-letter queue.

use super::DispatchOutcome;
use crate::mood::{MoodAnalysis, MoodState};
use crate::registry::TokenId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};

/// Delivery state of a token's latest decided mood
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeliveryState {
    /// Queued for dispatch, no outcome yet
    Pending,
    /// Delivered to the sink
    Confirmed,
    /// Undelivered after `attempts` dispatch cycles
    Failed { attempts: u32 },
    /// Gave up; see the dead-letter queue
    DeadLettered,
}

/// Ledger entry for one token
#[derive(Debug, Clone)]
pub struct DeliveryRecord {
    pub analysis: MoodAnalysis,
    pub state: DeliveryState,
    pub updated_at: DateTime<Utc>,
}

impl DeliveryRecord {
    pub fn mood(&self) -> MoodState {
        self.analysis.mood
    }
}

/// An update that could not be delivered
#[derive(Debug, Clone, Serialize)]
pub struct DeadLetter {
    pub token_id: TokenId,
    pub analysis: MoodAnalysis,
    pub attempts: u32,
    pub reason: String,
    pub at: DateTime<Utc>,
}

/// Per-token delivery tracking
pub struct DispatchLedger {
    records: HashMap<TokenId, DeliveryRecord>,
    dead_letters: VecDeque<DeadLetter>,
    max_delivery_attempts: u32,
    dead_letter_capacity: usize,
}

impl DispatchLedger {
    pub fn new(max_delivery_attempts: u32, dead_letter_capacity: usize) -> Self {
        Self {
            records: HashMap::new(),
            dead_letters: VecDeque::new(),
            max_delivery_attempts: max_delivery_attempts.max(1),
            dead_letter_capacity: dead_letter_capacity.max(1),
        }
    }

    /// Mark an update as queued. Re-queuing the same mood after a failure
    /// keeps its failure count; a different mood starts fresh.
    pub fn mark_pending(&mut self, token_id: TokenId, analysis: &MoodAnalysis) {
        let state = match self.records.get(&token_id) {
            Some(rec) if rec.mood() == analysis.mood => match rec.state {
                DeliveryState::Failed { attempts } => DeliveryState::Failed { attempts },
                _ => DeliveryState::Pending,
            },
            _ => DeliveryState::Pending,
        };

        self.records.insert(
            token_id,
            DeliveryRecord {
                analysis: analysis.clone(),
                state,
                updated_at: Utc::now(),
            },
        );
    }

    /// Apply a dispatch outcome to a token's record
    pub fn record_outcome(&mut self, token_id: TokenId, outcome: &DispatchOutcome) {
        let Some(record) = self.records.get_mut(&token_id) else {
            return;
        };

        match outcome {
            DispatchOutcome::Sent { .. } => {
                record.state = DeliveryState::Confirmed;
            }
            DispatchOutcome::Failed { reason, .. } => {
                let attempts = match record.state {
                    DeliveryState::Failed { attempts } => attempts + 1,
                    _ => 1,
                };

                if attempts >= self.max_delivery_attempts {
                    record.state = DeliveryState::DeadLettered;
                    tracing::error!(
                        token_id,
                        mood = %record.mood(),
                        attempts,
                        reason = %reason,
                        "Mood update dead-lettered"
                    );

                    if self.dead_letters.len() >= self.dead_letter_capacity {
                        self.dead_letters.pop_front();
                    }
                    self.dead_letters.push_back(DeadLetter {
                        token_id,
                        analysis: record.analysis.clone(),
                        attempts,
                        reason: reason.clone(),
                        at: Utc::now(),
                    });
                } else {
                    record.state = DeliveryState::Failed { attempts };
                }
            }
            DispatchOutcome::Skipped { .. } => {}
        }

        record.updated_at = Utc::now();
    }

    /// Failed updates to offer again, ordered by token id
    pub fn retry_candidates(&self) -> Vec<(TokenId, MoodAnalysis)> {
        let mut candidates: Vec<_> = self
            .records
            .iter()
            .filter(|(_, rec)| matches!(rec.state, DeliveryState::Failed { .. }))
            .map(|(id, rec)| (*id, rec.analysis.clone()))
            .collect();
        candidates.sort_by_key(|(id, _)| *id);
        candidates
    }

    pub fn state(&self, token_id: TokenId) -> Option<DeliveryState> {
        self.records.get(&token_id).map(|r| r.state)
    }

    pub fn record(&self, token_id: TokenId) -> Option<&DeliveryRecord> {
        self.records.get(&token_id)
    }

    pub fn dead_letters(&self) -> &VecDeque<DeadLetter> {
        &self.dead_letters
    }
}
