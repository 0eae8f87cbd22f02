//! Mood orchestrator
//!
//! Runs the periodic cycle: fetch every registered symbol concurrently,
//! update price and sentiment history, decide a mood per token, keep only
//! changed moods and dispatch them as one batch. Each cycle runs under a
//! deadline and a panic boundary so one bad cycle never stops the loop.

use super::{ChangeDetector, CycleReport};
use crate::config::{Config, DispatchMode, SignalsMode};
use crate::dispatch::{
    DeliveryState, DispatchLedger, DispatchOutcome, DispatchSettings, DispatchSink, Dispatcher,
    LogSink, RelaySink,
};
use crate::error::{ConfigError, EngineError};
use crate::history::PriceHistoryStore;
use crate::market::{CoinGeckoClient, CoinGeckoConfig, MarketDataSource, MarketSnapshot};
use crate::mood::{MoodAnalysis, MoodDecisionEngine};
use crate::registry::{TokenId, TokenRegistry};
use crate::sentiment::{HttpSignalSource, NeutralSignals, SentimentFusion, SentimentSample, SignalSource};
use crate::telemetry::{
    increment_counter, record_latency, set_gauge, CounterMetric, GaugeMetric, LatencyMetric,
};
use futures_util::future::join_all;
use futures_util::FutureExt;
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time::error::Elapsed;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

/// Timing of the cycle loop
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub update_interval: Duration,
    /// Window for volatility and momentum
    pub lookback_minutes: u64,
    /// Deadline for each snapshot or signal read
    pub fetch_timeout: Duration,
    /// Deadline for a whole cycle
    pub cycle_timeout: Duration,
    /// Samples considered for the sentiment trend
    pub trend_samples: usize,
}

impl From<&Config> for OrchestratorSettings {
    fn from(config: &Config) -> Self {
        Self {
            update_interval: config.engine.update_interval(),
            lookback_minutes: config.engine.volatility_lookback_minutes,
            fetch_timeout: config.engine.fetch_timeout(),
            cycle_timeout: config.engine.cycle_timeout(),
            trend_samples: config.history.trend_samples,
        }
    }
}

/// Raw reads for one symbol
struct FetchedInputs {
    snapshot: MarketSnapshot,
    social: f64,
    on_chain: f64,
}

/// Derived per-symbol state for the current cycle
struct SymbolState {
    snapshot: MarketSnapshot,
    sentiment: SentimentSample,
    volatility: f64,
}

/// Drives mood analysis and dispatch for every registered token
pub struct MoodOrchestrator {
    settings: OrchestratorSettings,
    registry: TokenRegistry,
    market: Arc<dyn MarketDataSource>,
    signals: Arc<dyn SignalSource>,
    sink: Arc<dyn DispatchSink>,
    history: PriceHistoryStore,
    fusion: SentimentFusion,
    decision: MoodDecisionEngine,
    detector: ChangeDetector,
    dispatcher: Dispatcher,
    ledger: DispatchLedger,
}

impl MoodOrchestrator {
    /// Wire an orchestrator from configuration and explicit collaborators
    pub fn new(
        config: &Config,
        market: Arc<dyn MarketDataSource>,
        signals: Arc<dyn SignalSource>,
        sink: Arc<dyn DispatchSink>,
    ) -> Self {
        Self {
            settings: OrchestratorSettings::from(config),
            registry: TokenRegistry::from_entries(&config.registry.tokens),
            market,
            signals,
            sink,
            history: PriceHistoryStore::new(config.history.price_capacity),
            fusion: SentimentFusion::new(config.sentiment.weights, config.history.sentiment_capacity),
            decision: MoodDecisionEngine::new(config.thresholds.clone()),
            detector: ChangeDetector::new(config.change.confidence_threshold),
            dispatcher: Dispatcher::new(DispatchSettings::from(&config.dispatch)),
            ledger: DispatchLedger::new(
                config.dispatch.max_delivery_attempts,
                config.dispatch.dead_letter_capacity,
            ),
        }
    }

    /// Wire an orchestrator with the collaborators selected in configuration
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let timeout = config.engine.fetch_timeout();

        let market = CoinGeckoClient::with_config(CoinGeckoConfig {
            base_url: config.market.base_url.clone(),
            timeout,
            coin_ids: config.market.coin_ids.clone(),
            ..Default::default()
        })?;

        let signals: Arc<dyn SignalSource> = match config.signals.mode {
            SignalsMode::Neutral => Arc::new(NeutralSignals),
            SignalsMode::Http => {
                let base_url = config
                    .signals
                    .base_url
                    .as_deref()
                    .ok_or(ConfigError::Missing("signals.base_url"))?;
                Arc::new(HttpSignalSource::new(base_url, timeout)?)
            }
        };

        let sink: Arc<dyn DispatchSink> = match config.dispatch.mode {
            DispatchMode::Log => Arc::new(LogSink::new()),
            DispatchMode::Relay => Arc::new(RelaySink::new(
                config.dispatch.endpoint.as_deref(),
                config.dispatch.api_key.as_deref(),
                timeout,
            )?),
        };

        tracing::info!(
            tokens = config.registry.tokens.len(),
            signals = ?config.signals.mode,
            dispatch = ?config.dispatch.mode,
            "Mood orchestrator configured"
        );

        Ok(Self::new(config, Arc::new(market), signals, sink))
    }

    /// Replace the loop timing
    pub fn with_settings(mut self, settings: OrchestratorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    pub fn registry(&self) -> &TokenRegistry {
        &self.registry
    }

    pub fn detector(&self) -> &ChangeDetector {
        &self.detector
    }

    pub fn ledger(&self) -> &DispatchLedger {
        &self.ledger
    }

    pub fn history(&self) -> &PriceHistoryStore {
        &self.history
    }

    pub async fn connect_sink(&self) -> anyhow::Result<()> {
        self.sink.connect().await
    }

    pub async fn disconnect_sink(&self) -> anyhow::Result<()> {
        self.sink.disconnect().await
    }

    /// Run cycles on the update interval until `shutdown` flips or its
    /// sender is dropped. An in-flight cycle is abandoned on shutdown.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        if let Err(e) = self.sink.connect().await {
            tracing::warn!(error = %e, "Dispatch sink connect failed, will retry each cycle");
        }

        let mut interval = tokio::time::interval(self.settings.update_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            interval_secs = self.settings.update_interval.as_secs(),
            tokens = self.registry.len(),
            "Mood orchestrator started"
        );

        loop {
            tokio::select! {
                _ = shutdown.changed() => break,

                _ = interval.tick() => {
                    if !self.sink.is_ready() {
                        if let Err(e) = self.sink.connect().await {
                            tracing::debug!(error = %e, "Dispatch sink still unavailable");
                        }
                    }

                    tokio::select! {
                        result = self.run_guarded_cycle() => {
                            if let Err(e) = result {
                                tracing::error!(error = %e, "Cycle failed");
                            }
                        }
                        _ = shutdown.changed() => {
                            tracing::info!("Shutdown requested during cycle, abandoning in-flight work");
                            break;
                        }
                    }
                }
            }
        }

        if let Err(e) = self.sink.disconnect().await {
            tracing::warn!(error = %e, "Dispatch sink disconnect failed");
        }
        tracing::info!("Mood orchestrator stopped");
        Ok(())
    }

    /// One cycle behind the cycle deadline and a panic boundary
    pub async fn run_guarded_cycle(&mut self) -> Result<CycleReport, EngineError> {
        let deadline = self.settings.cycle_timeout;
        let guarded = AssertUnwindSafe(self.run_cycle()).catch_unwind();

        let result = match tokio::time::timeout(deadline, guarded).await {
            Ok(Ok(report)) => Ok(report),
            Ok(Err(payload)) => Err(EngineError::CyclePanicked(panic_message(payload))),
            Err(_) => Err(EngineError::CycleTimeout(deadline)),
        };

        match &result {
            Ok(_) => increment_counter(CounterMetric::CyclesCompleted, 1),
            Err(_) => increment_counter(CounterMetric::CyclesFailed, 1),
        }
        result
    }

    /// Fetch, analyze and dispatch once
    pub async fn run_cycle(&mut self) -> CycleReport {
        let cycle_id = Uuid::new_v4();
        let started = Instant::now();
        let symbols = self.registry.symbols();

        tracing::debug!(%cycle_id, symbols = symbols.len(), "Cycle started");

        let fetch_started = Instant::now();
        let fetched = join_all(symbols.iter().map(|s| self.fetch_symbol(s))).await;
        record_latency(LatencyMetric::MarketFetch, fetch_started.elapsed());

        let mut states = HashMap::with_capacity(symbols.len());
        let mut symbols_fetched = Vec::new();
        let mut symbols_failed = Vec::new();

        for (symbol, result) in symbols.into_iter().zip(fetched) {
            match result {
                Ok(inputs) => {
                    let state = self.observe(&symbol, inputs);
                    states.insert(symbol.clone(), state);
                    symbols_fetched.push(symbol);
                }
                Err(e) => {
                    tracing::warn!(%cycle_id, error = %e, "Skipping symbol this cycle");
                    increment_counter(CounterMetric::FetchFailures, 1);
                    symbols_failed.push(symbol);
                }
            }
        }

        let (analyses, batch) = self.detect_changes(&states);
        let sink_ready = self.sink.is_ready();
        let outcomes = self.dispatch_batch(cycle_id, batch, sink_ready).await;

        let report = CycleReport {
            cycle_id,
            symbols_fetched,
            symbols_failed,
            analyses,
            outcomes,
            sink_ready,
            duration_ms: started.elapsed().as_millis() as u64,
        };
        record_latency(LatencyMetric::Cycle, started.elapsed());

        tracing::info!(
            %cycle_id,
            fetched = report.symbols_fetched.len(),
            failed = report.symbols_failed.len(),
            batch = report.batch_size(),
            sent = report.sent(),
            duration_ms = report.duration_ms,
            "Cycle completed"
        );

        report
    }

    /// Snapshot plus both external signals for a symbol. A failed snapshot
    /// fails the symbol; a failed signal reads as neutral.
    async fn fetch_symbol(&self, symbol: &str) -> Result<FetchedInputs, EngineError> {
        let timeout = self.settings.fetch_timeout;

        let (snapshot, social, on_chain) = tokio::join!(
            tokio::time::timeout(timeout, self.market.fetch_snapshot(symbol)),
            tokio::time::timeout(timeout, self.signals.fetch_social(symbol)),
            tokio::time::timeout(timeout, self.signals.fetch_on_chain(symbol)),
        );

        let snapshot = match snapshot {
            Ok(Ok(snapshot)) => snapshot,
            Ok(Err(e)) => {
                return Err(EngineError::DataFetch {
                    symbol: symbol.to_string(),
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(EngineError::DataFetch {
                    symbol: symbol.to_string(),
                    reason: format!("timed out after {:?}", timeout),
                })
            }
        };

        Ok(FetchedInputs {
            snapshot,
            social: signal_or_neutral(symbol, "social", social),
            on_chain: signal_or_neutral(symbol, "on_chain", on_chain),
        })
    }

    /// Feed one symbol's reads into history and sentiment
    fn observe(&mut self, symbol: &str, inputs: FetchedInputs) -> SymbolState {
        let FetchedInputs {
            snapshot,
            social,
            on_chain,
        } = inputs;

        self.history
            .record_sample(symbol, snapshot.price, snapshot.timestamp);
        let volatility = self
            .history
            .compute_volatility(symbol, self.settings.lookback_minutes);
        let momentum = self
            .history
            .compute_momentum(symbol, self.settings.lookback_minutes);

        let sentiment = self.fusion.fuse(&snapshot, social, on_chain);
        if let Some(trend) = self.fusion.trend(symbol, self.settings.trend_samples) {
            tracing::debug!(
                symbol,
                direction = ?trend.direction,
                average = trend.average_score,
                change = trend.change,
                samples = trend.samples,
                "Sentiment trend"
            );
        }

        set_gauge(GaugeMetric::Volatility, symbol, volatility);
        set_gauge(GaugeMetric::Momentum, symbol, momentum);
        set_gauge(GaugeMetric::SentimentScore, symbol, sentiment.score);
        set_gauge(GaugeMetric::SentimentConfidence, symbol, sentiment.confidence);

        SymbolState {
            snapshot,
            sentiment,
            volatility,
        }
    }

    /// Decide a mood per token and collect the ones worth dispatching,
    /// followed by undelivered updates from earlier cycles
    fn detect_changes(
        &self,
        states: &HashMap<String, SymbolState>,
    ) -> (BTreeMap<TokenId, MoodAnalysis>, Vec<(TokenId, MoodAnalysis)>) {
        let mut analyses = BTreeMap::new();
        let mut batch = Vec::new();

        for (token_id, symbol) in self.registry.iter() {
            let Some(state) = states.get(symbol) else {
                continue;
            };

            let analysis = self
                .decision
                .analyze(&state.snapshot, &state.sentiment, state.volatility);
            set_gauge(GaugeMetric::MoodCode, symbol, analysis.mood.code() as f64);
            set_gauge(GaugeMetric::MoodConfidence, symbol, analysis.confidence);

            if self
                .detector
                .evaluate(token_id, analysis.mood, analysis.confidence)
            {
                tracing::info!(
                    token_id,
                    symbol,
                    previous = ?self.detector.previous(token_id),
                    mood = %analysis.mood,
                    confidence = analysis.confidence,
                    "Mood change detected"
                );
                batch.push((token_id, analysis.clone()));
            } else {
                tracing::debug!(
                    token_id,
                    symbol,
                    mood = %analysis.mood,
                    confidence = analysis.confidence,
                    "Mood unchanged"
                );
            }

            analyses.insert(token_id, analysis);
        }

        for (token_id, analysis) in self.ledger.retry_candidates() {
            if batch.iter().any(|(id, _)| *id == token_id) {
                continue;
            }
            tracing::info!(
                token_id,
                mood = %analysis.mood,
                "Re-queuing undelivered mood update"
            );
            batch.push((token_id, analysis));
        }

        (analyses, batch)
    }

    /// Send the batch and fold the outcomes into the mood table and ledger.
    /// With the sink down nothing is sent and no state changes.
    async fn dispatch_batch(
        &mut self,
        cycle_id: Uuid,
        batch: Vec<(TokenId, MoodAnalysis)>,
        sink_ready: bool,
    ) -> BTreeMap<TokenId, DispatchOutcome> {
        let mut outcomes = BTreeMap::new();

        if batch.is_empty() {
            tracing::debug!(%cycle_id, "No mood changes to dispatch");
            return outcomes;
        }

        if !sink_ready {
            tracing::warn!(
                %cycle_id,
                error = %EngineError::SinkUnavailable,
                batch = batch.len(),
                "Skipping dispatch"
            );
            increment_counter(CounterMetric::UpdatesSkipped, batch.len() as u64);
            for (token_id, _) in batch {
                outcomes.insert(
                    token_id,
                    DispatchOutcome::Skipped {
                        reason: "sink not ready".to_string(),
                    },
                );
            }
            return outcomes;
        }

        for (token_id, analysis) in &batch {
            self.ledger.mark_pending(*token_id, analysis);
        }
        let moods: Vec<_> = batch.iter().map(|(id, a)| (*id, a.mood)).collect();

        let dispatch_started = Instant::now();
        let results = self.dispatcher.dispatch(self.sink.as_ref(), batch).await;
        record_latency(LatencyMetric::Dispatch, dispatch_started.elapsed());

        // The table follows every batched item, delivered or not; the ledger
        // carries what still needs delivering.
        for (token_id, mood) in moods {
            self.detector.record(token_id, mood);
        }

        for (token_id, outcome) in results {
            self.ledger.record_outcome(token_id, &outcome);

            match &outcome {
                DispatchOutcome::Sent { .. } => increment_counter(CounterMetric::UpdatesSent, 1),
                DispatchOutcome::Failed { .. } => {
                    increment_counter(CounterMetric::UpdatesFailed, 1);
                    if self.ledger.state(token_id) == Some(DeliveryState::DeadLettered) {
                        increment_counter(CounterMetric::DeadLettered, 1);
                    }
                }
                DispatchOutcome::Skipped { .. } => {
                    increment_counter(CounterMetric::UpdatesSkipped, 1)
                }
            }

            outcomes.insert(token_id, outcome);
        }

        outcomes
    }
}

fn signal_or_neutral(
    symbol: &str,
    signal: &'static str,
    result: Result<anyhow::Result<f64>, Elapsed>,
) -> f64 {
    match result {
        Ok(Ok(value)) if value.is_finite() => value,
        Ok(Ok(value)) => {
            tracing::warn!(symbol, signal, value, "Non-finite signal, using neutral");
            0.0
        }
        Ok(Err(e)) => {
            tracing::warn!(symbol, signal, error = %e, "Signal fetch failed, using neutral");
            0.0
        }
        Err(_) => {
            tracing::warn!(symbol, signal, "Signal fetch timed out, using neutral");
            0.0
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
