//! Cycle report

use crate::dispatch::DispatchOutcome;
use crate::mood::MoodAnalysis;
use crate::registry::TokenId;
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Summary of one dispatch cycle
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub cycle_id: Uuid,
    /// Symbols whose snapshot was fetched
    pub symbols_fetched: Vec<String>,
    /// Symbols skipped this cycle because their snapshot fetch failed
    pub symbols_failed: Vec<String>,
    /// Mood computed per token
    pub analyses: BTreeMap<TokenId, MoodAnalysis>,
    /// Dispatch outcome per token in the batch
    pub outcomes: BTreeMap<TokenId, DispatchOutcome>,
    pub sink_ready: bool,
    pub duration_ms: u64,
}

impl CycleReport {
    pub fn batch_size(&self) -> usize {
        self.outcomes.len()
    }

    pub fn sent(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_sent()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_failed()).count()
    }
}
