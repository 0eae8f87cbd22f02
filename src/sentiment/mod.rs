//! Sentiment fusion module
//!
//! Fuses social, on-chain and technical signals into one score with an
//! agreement-based confidence, and keeps a bounded per-symbol history.

mod fusion;
mod sources;
mod types;

pub use fusion::{technical_score, SentimentFusion};
pub use sources::{HttpSignalSource, NeutralSignals, SignalSource};
pub use types::{SentimentSample, SentimentSignals, SentimentTrend, TrendDirection};
