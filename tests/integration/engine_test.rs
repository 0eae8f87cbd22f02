//! End-to-end cycle tests against the logging sink

use async_trait::async_trait;
use mood_engine::config::Config;
use mood_engine::dispatch::{DispatchSink, LogSink};
use mood_engine::engine::MoodOrchestrator;
use mood_engine::market::{MarketDataSource, MarketSnapshot};
use mood_engine::mood::MoodState;
use mood_engine::registry::TokenEntry;
use mood_engine::sentiment::SignalSource;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Market replaying a scripted change percent and price per symbol
struct ScriptedMarket {
    quotes: Mutex<HashMap<String, (Decimal, Decimal)>>,
}

impl ScriptedMarket {
    fn new() -> Self {
        Self {
            quotes: Mutex::new(HashMap::new()),
        }
    }

    fn quote(&self, symbol: &str, price: Decimal, change_pct: Decimal) {
        self.quotes
            .lock()
            .unwrap()
            .insert(symbol.to_string(), (price, change_pct));
    }
}

#[async_trait]
impl MarketDataSource for ScriptedMarket {
    async fn fetch_snapshot(&self, symbol: &str) -> anyhow::Result<MarketSnapshot> {
        let (price, change) = self
            .quotes
            .lock()
            .unwrap()
            .get(symbol)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("no quote for {}", symbol))?;

        let mut snapshot = MarketSnapshot::from_price(symbol, price);
        snapshot.price_change_percent_24h = change;
        snapshot.volume_24h = dec!(5000);
        Ok(snapshot)
    }
}

/// Signals with a fixed social read and a failing on-chain read
struct SocialOnly {
    social: f64,
}

#[async_trait]
impl SignalSource for SocialOnly {
    async fn fetch_social(&self, _symbol: &str) -> anyhow::Result<f64> {
        Ok(self.social)
    }

    async fn fetch_on_chain(&self, symbol: &str) -> anyhow::Result<f64> {
        anyhow::bail!("on-chain indexer offline for {}", symbol)
    }
}

fn config() -> Config {
    let mut config = Config::default();
    config.registry.tokens = vec![
        TokenEntry {
            id: 10,
            symbol: "sol".to_string(),
        },
        TokenEntry {
            id: 20,
            symbol: "ETH".to_string(),
        },
    ];
    config.dispatch.inter_item_delay_ms = 0;
    config
}

#[tokio::test]
async fn test_cycles_against_log_sink() {
    let market = Arc::new(ScriptedMarket::new());
    market.quote("SOL", dec!(150), dec!(0));
    market.quote("ETH", dec!(3000), dec!(0));

    let sink = Arc::new(LogSink::new());
    let mut orchestrator = MoodOrchestrator::new(
        &config(),
        market.clone(),
        Arc::new(SocialOnly { social: 0.0 }),
        sink.clone(),
    );
    orchestrator.connect_sink().await.unwrap();

    let report = orchestrator.run_guarded_cycle().await.unwrap();
    assert_eq!(report.sent(), 2);

    let delivered = sink.delivered().await;
    assert_eq!(delivered.len(), 2);
    assert_eq!(delivered[0].token_id, 10);
    assert_eq!(delivered[0].symbol, "SOL");
    assert_eq!(delivered[0].mood, MoodState::Neutral);

    // ETH rallies hard; SOL drifts within the neutral band
    market.quote("ETH", dec!(3000), dec!(25));
    market.quote("SOL", dec!(150), dec!(1));
    let report = orchestrator.run_guarded_cycle().await.unwrap();

    assert_eq!(report.batch_size(), 1);
    assert_eq!(report.analyses[&20].mood, MoodState::Bullish);
    assert_eq!(report.analyses[&20].confidence, 1.0);

    let delivered = sink.delivered().await;
    assert_eq!(delivered.len(), 3);
    assert_eq!(delivered[2].token_id, 20);
    assert_eq!(delivered[2].mood_code, MoodState::Bullish.code());
}

#[tokio::test]
async fn test_missing_quote_skips_symbol() {
    let market = Arc::new(ScriptedMarket::new());
    market.quote("SOL", dec!(150), dec!(0));

    let sink = Arc::new(LogSink::new());
    let mut orchestrator = MoodOrchestrator::new(
        &config(),
        market,
        Arc::new(SocialOnly { social: 0.0 }),
        sink.clone(),
    );
    orchestrator.connect_sink().await.unwrap();

    let report = orchestrator.run_guarded_cycle().await.unwrap();
    assert_eq!(report.symbols_failed, vec!["ETH".to_string()]);
    assert_eq!(report.analyses.len(), 1);
    assert_eq!(sink.delivered().await.len(), 1);
}

#[tokio::test]
async fn test_disconnected_sink_defers_dispatch() {
    let market = Arc::new(ScriptedMarket::new());
    market.quote("SOL", dec!(150), dec!(0));
    market.quote("ETH", dec!(3000), dec!(0));

    let sink = Arc::new(LogSink::new());
    let mut orchestrator = MoodOrchestrator::new(
        &config(),
        market,
        Arc::new(SocialOnly { social: 0.0 }),
        sink.clone(),
    );

    let report = orchestrator.run_guarded_cycle().await.unwrap();
    assert!(!report.sink_ready);
    assert_eq!(report.sent(), 0);
    assert!(orchestrator.detector().previous(10).is_none());

    sink.connect().await.unwrap();
    let report = orchestrator.run_guarded_cycle().await.unwrap();
    assert_eq!(report.sent(), 2);
    assert_eq!(sink.delivered().await.len(), 2);
}

#[tokio::test]
async fn test_strong_social_sentiment_ignored_when_signals_disagree() {
    let market = Arc::new(ScriptedMarket::new());
    market.quote("SOL", dec!(150), dec!(0));
    market.quote("ETH", dec!(3000), dec!(0));

    let sink = Arc::new(LogSink::new());
    let mut orchestrator = MoodOrchestrator::new(
        &config(),
        market,
        Arc::new(SocialOnly { social: 1.0 }),
        sink.clone(),
    );
    orchestrator.connect_sink().await.unwrap();

    // social 1.0, on-chain neutral after failure, technical 0: score 0.3
    let report = orchestrator.run_guarded_cycle().await.unwrap();
    assert_eq!(report.analyses[&10].mood, MoodState::Neutral);
    assert_eq!(report.analyses[&10].factors.sentiment, 0.3);
}
