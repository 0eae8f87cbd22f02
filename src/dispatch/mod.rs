//! Dispatch module
//!
//! Delivers mood updates to a downstream sink (e.g. a cross-chain relay),
//! retries failures with backoff and tracks per-token delivery state.

mod dispatcher;
mod ledger;
mod log_sink;
mod relay;
mod types;

pub use dispatcher::{DispatchSettings, Dispatcher};
pub use ledger::{DeadLetter, DeliveryRecord, DeliveryState, DispatchLedger};
pub use log_sink::LogSink;
pub use relay::RelaySink;
pub use types::{DispatchOutcome, MoodUpdate};

use crate::mood::MoodAnalysis;
use crate::registry::TokenId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// Trait for dispatch sink implementations
#[async_trait]
pub trait DispatchSink: Send + Sync {
    /// Open the connection to the sink
    async fn connect(&self) -> anyhow::Result<()>;
    /// Close the connection to the sink
    async fn disconnect(&self) -> anyhow::Result<()>;
    /// Whether the sink currently accepts updates
    fn is_ready(&self) -> bool;
    /// Deliver a single update
    async fn send_one(&self, token_id: TokenId, analysis: &MoodAnalysis) -> anyhow::Result<()>;

    /// Deliver several updates, one after another with a fixed delay between
    /// items. Returns per-token success.
    async fn send_batch(
        &self,
        items: &[(TokenId, MoodAnalysis)],
        inter_item_delay: Duration,
    ) -> HashMap<TokenId, bool> {
        let mut results = HashMap::with_capacity(items.len());

        for (i, (token_id, analysis)) in items.iter().enumerate() {
            if i > 0 && !inter_item_delay.is_zero() {
                tokio::time::sleep(inter_item_delay).await;
            }

            let ok = match self.send_one(*token_id, analysis).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(token_id, error = %e, "Mood update send failed");
                    false
                }
            };
            results.insert(*token_id, ok);
        }

        results
    }
}
