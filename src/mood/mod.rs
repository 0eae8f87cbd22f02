//! Mood decision module
//!
//! Maps price change, volatility and fused sentiment to one of six moods

mod decision;
mod types;

pub use decision::MoodDecisionEngine;
pub use types::{MoodAnalysis, MoodFactors, MoodState};
