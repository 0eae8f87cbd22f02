//! Logging dispatch sink
//!
//! Paper mode: every update is logged and kept in memory instead of being
//! relayed anywhere.

use super::{DispatchSink, MoodUpdate};
use crate::mood::MoodAnalysis;
use crate::registry::TokenId;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Sink that records deliveries locally
#[derive(Default)]
pub struct LogSink {
    connected: AtomicBool,
    delivered: Arc<RwLock<Vec<MoodUpdate>>>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates delivered so far
    pub async fn delivered(&self) -> Vec<MoodUpdate> {
        self.delivered.read().await.clone()
    }
}

#[async_trait]
impl DispatchSink for LogSink {
    async fn connect(&self) -> anyhow::Result<()> {
        self.connected.store(true, Ordering::SeqCst);
        tracing::info!("Log sink connected");
        Ok(())
    }

    async fn disconnect(&self) -> anyhow::Result<()> {
        self.connected.store(false, Ordering::SeqCst);
        tracing::info!("Log sink disconnected");
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn send_one(&self, token_id: TokenId, analysis: &MoodAnalysis) -> anyhow::Result<()> {
        if !self.is_ready() {
            anyhow::bail!("Log sink not connected");
        }

        let update = MoodUpdate::new(token_id, analysis);
        tracing::info!(
            token_id,
            symbol = %update.symbol,
            mood = %update.mood,
            confidence = update.confidence,
            "Mood update delivered"
        );

        self.delivered.write().await.push(update);
        Ok(())
    }
}
