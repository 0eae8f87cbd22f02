//! Batch dispatcher
//!
//! First pass goes through the sink's `send_batch`. Items that fail are then
//! retried individually by a bounded pool of workers with exponential
//! backoff.

use super::{DispatchOutcome, DispatchSink};
use crate::config::DispatchConfig;
use crate::mood::MoodAnalysis;
use crate::registry::TokenId;
use futures_util::future::join_all;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::sync::Mutex;

/// Dispatcher tuning
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// Delay between items of the first batch pass
    pub inter_item_delay: Duration,
    /// Workers retrying failed items
    pub max_concurrency: usize,
    /// Retries per failed item
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self::from(&DispatchConfig::default())
    }
}

impl From<&DispatchConfig> for DispatchSettings {
    fn from(config: &DispatchConfig) -> Self {
        Self {
            inter_item_delay: Duration::from_millis(config.inter_item_delay_ms),
            max_concurrency: config.max_concurrency.max(1),
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
        }
    }
}

/// Sends mood batches and retries failures
pub struct Dispatcher {
    settings: DispatchSettings,
}

impl Dispatcher {
    pub fn new(settings: DispatchSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Delay before retry number `attempt` (1-based): doubles each time,
    /// capped at the maximum backoff
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.settings
            .initial_backoff
            .saturating_mul(1 << exponent)
            .min(self.settings.max_backoff)
    }

    /// Dispatch a batch. Every input token gets exactly one outcome.
    pub async fn dispatch(
        &self,
        sink: &dyn DispatchSink,
        items: Vec<(TokenId, MoodAnalysis)>,
    ) -> HashMap<TokenId, DispatchOutcome> {
        let mut outcomes = HashMap::with_capacity(items.len());
        if items.is_empty() {
            return outcomes;
        }

        if !sink.is_ready() {
            for (token_id, _) in items {
                outcomes.insert(
                    token_id,
                    DispatchOutcome::Skipped {
                        reason: "sink not ready".to_string(),
                    },
                );
            }
            return outcomes;
        }

        let first_pass = sink.send_batch(&items, self.settings.inter_item_delay).await;

        let mut failed = VecDeque::new();
        for (token_id, analysis) in items {
            if first_pass.get(&token_id).copied().unwrap_or(false) {
                outcomes.insert(token_id, DispatchOutcome::Sent { attempts: 1 });
            } else {
                failed.push_back((token_id, analysis));
            }
        }

        if failed.is_empty() {
            return outcomes;
        }

        if self.settings.max_retries == 0 {
            for (token_id, _) in failed {
                outcomes.insert(
                    token_id,
                    DispatchOutcome::Failed {
                        attempts: 1,
                        reason: "batch send failed".to_string(),
                    },
                );
            }
            return outcomes;
        }

        tracing::info!(
            failed = failed.len(),
            workers = self.settings.max_concurrency.min(failed.len()),
            "Retrying failed mood updates"
        );

        let worker_count = self.settings.max_concurrency.min(failed.len());
        let queue = Mutex::new(failed);
        let retried = Mutex::new(Vec::new());

        let queue = &queue;
        let retried = &retried;
        let workers = (0..worker_count).map(|_| async move {
            loop {
                let next = queue.lock().await.pop_front();
                let Some((token_id, analysis)) = next else {
                    break;
                };
                let outcome = self.retry_item(sink, token_id, &analysis).await;
                retried.lock().await.push((token_id, outcome));
            }
        });
        join_all(workers).await;

        for (token_id, outcome) in retried.lock().await.drain(..) {
            outcomes.insert(token_id, outcome);
        }

        outcomes
    }

    async fn retry_item(
        &self,
        sink: &dyn DispatchSink,
        token_id: TokenId,
        analysis: &MoodAnalysis,
    ) -> DispatchOutcome {
        let mut reason = String::from("batch send failed");

        for attempt in 1..=self.settings.max_retries {
            tokio::time::sleep(self.backoff_delay(attempt)).await;

            match sink.send_one(token_id, analysis).await {
                Ok(()) => {
                    tracing::debug!(token_id, attempt, "Mood update delivered on retry");
                    return DispatchOutcome::Sent {
                        attempts: attempt + 1,
                    };
                }
                Err(e) => {
                    tracing::warn!(token_id, attempt, error = %e, "Mood update retry failed");
                    reason = e.to_string();
                }
            }
        }

        DispatchOutcome::Failed {
            attempts: self.settings.max_retries + 1,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mood::{MoodFactors, MoodState};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Sink that fails each token a configured number of times
    struct FlakySink {
        ready: AtomicBool,
        failures_left: std::sync::Mutex<HashMap<TokenId, u32>>,
        delivered: std::sync::Mutex<Vec<TokenId>>,
    }

    impl FlakySink {
        fn new(failures: &[(TokenId, u32)]) -> Self {
            Self {
                ready: AtomicBool::new(true),
                failures_left: std::sync::Mutex::new(failures.iter().copied().collect()),
                delivered: std::sync::Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl DispatchSink for FlakySink {
        async fn connect(&self) -> anyhow::Result<()> {
            self.ready.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn disconnect(&self) -> anyhow::Result<()> {
            self.ready.store(false, Ordering::SeqCst);
            Ok(())
        }

        fn is_ready(&self) -> bool {
            self.ready.load(Ordering::SeqCst)
        }

        async fn send_one(&self, token_id: TokenId, _analysis: &MoodAnalysis) -> anyhow::Result<()> {
            {
                let mut failures = self.failures_left.lock().unwrap();
                if let Some(left) = failures.get_mut(&token_id) {
                    if *left > 0 {
                        *left -= 1;
                        anyhow::bail!("relay rejected token {}", token_id);
                    }
                }
            }
            self.delivered.lock().unwrap().push(token_id);
            Ok(())
        }
    }

    fn analysis() -> MoodAnalysis {
        MoodAnalysis {
            symbol: "SOL".to_string(),
            mood: MoodState::Bullish,
            confidence: 0.8,
            factors: MoodFactors {
                price_change: 8.0,
                volatility: 10.0,
                sentiment: 0.3,
                volume: 100.0,
            },
            timestamp: Utc::now(),
        }
    }

    fn fast_settings(max_retries: u32) -> DispatchSettings {
        DispatchSettings {
            inter_item_delay: Duration::ZERO,
            max_concurrency: 2,
            max_retries,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(4),
        }
    }

    #[test]
    fn test_backoff_schedule() {
        let dispatcher = Dispatcher::new(DispatchSettings::default());
        assert_eq!(dispatcher.backoff_delay(1), Duration::from_millis(250));
        assert_eq!(dispatcher.backoff_delay(2), Duration::from_millis(500));
        assert_eq!(dispatcher.backoff_delay(3), Duration::from_millis(1000));
        assert_eq!(dispatcher.backoff_delay(6), Duration::from_millis(5000));
        assert_eq!(dispatcher.backoff_delay(40), Duration::from_millis(5000));
    }

    #[test]
    fn test_settings_from_config() {
        let settings = DispatchSettings::default();
        assert_eq!(settings.inter_item_delay, Duration::from_millis(100));
        assert_eq!(settings.max_concurrency, 4);
        assert_eq!(settings.max_retries, 3);
    }

    #[tokio::test]
    async fn test_dispatch_all_sent() {
        let sink = FlakySink::new(&[]);
        let dispatcher = Dispatcher::new(fast_settings(3));

        let outcomes = dispatcher
            .dispatch(&sink, vec![(1, analysis()), (2, analysis())])
            .await;

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.values().all(|o| *o == DispatchOutcome::Sent { attempts: 1 }));
    }

    #[tokio::test]
    async fn test_dispatch_retries_until_success() {
        let sink = FlakySink::new(&[(2, 2)]);
        let dispatcher = Dispatcher::new(fast_settings(3));

        let outcomes = dispatcher
            .dispatch(&sink, vec![(1, analysis()), (2, analysis())])
            .await;

        assert_eq!(outcomes[&1], DispatchOutcome::Sent { attempts: 1 });
        assert_eq!(outcomes[&2], DispatchOutcome::Sent { attempts: 3 });
        assert_eq!(sink.delivered.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_dispatch_gives_up_after_retries() {
        let sink = FlakySink::new(&[(3, 10)]);
        let dispatcher = Dispatcher::new(fast_settings(2));

        let outcomes = dispatcher.dispatch(&sink, vec![(3, analysis())]).await;

        match &outcomes[&3] {
            DispatchOutcome::Failed { attempts, reason } => {
                assert_eq!(*attempts, 3);
                assert!(reason.contains("relay rejected"));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dispatch_without_retries() {
        let sink = FlakySink::new(&[(1, 1)]);
        let dispatcher = Dispatcher::new(fast_settings(0));

        let outcomes = dispatcher.dispatch(&sink, vec![(1, analysis())]).await;
        assert!(outcomes[&1].is_failed());
    }

    #[tokio::test]
    async fn test_dispatch_sink_not_ready() {
        let sink = FlakySink::new(&[]);
        sink.disconnect().await.unwrap();
        let dispatcher = Dispatcher::new(fast_settings(3));

        let outcomes = dispatcher.dispatch(&sink, vec![(1, analysis())]).await;
        assert!(matches!(outcomes[&1], DispatchOutcome::Skipped { .. }));
        assert!(sink.delivered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_empty_batch() {
        let sink = FlakySink::new(&[]);
        let dispatcher = Dispatcher::new(fast_settings(3));
        assert!(dispatcher.dispatch(&sink, vec![]).await.is_empty());
    }
}
