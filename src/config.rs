//! Configuration types for mood-engine

use crate::error::ConfigError;
use crate::registry::TokenEntry;
use crate::telemetry::LogFormat;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Longest accepted cycle period: one week
pub const MAX_UPDATE_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

/// Longest accepted volatility look-back: one year
pub const MAX_LOOKBACK_MINUTES: u64 = 365 * 24 * 60;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub thresholds: MoodThresholds,
    #[serde(default)]
    pub change: ChangeConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub sentiment: SentimentConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub signals: SignalsConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Scheduling and look-back configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Cycle period in minutes
    #[serde(default = "default_update_interval_minutes")]
    pub update_interval_minutes: u64,

    /// Window for volatility and momentum in minutes
    #[serde(default = "default_volatility_lookback_minutes")]
    pub volatility_lookback_minutes: u64,

    /// Deadline for every external fetch
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Deadline for a whole cycle
    #[serde(default = "default_cycle_timeout_secs")]
    pub cycle_timeout_secs: u64,
}

fn default_update_interval_minutes() -> u64 {
    5
}
fn default_volatility_lookback_minutes() -> u64 {
    60
}
fn default_fetch_timeout_secs() -> u64 {
    10
}
fn default_cycle_timeout_secs() -> u64 {
    120
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            update_interval_minutes: default_update_interval_minutes(),
            volatility_lookback_minutes: default_volatility_lookback_minutes(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            cycle_timeout_secs: default_cycle_timeout_secs(),
        }
    }
}

impl EngineConfig {
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_minutes.saturating_mul(60))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn cycle_timeout(&self) -> Duration {
        Duration::from_secs(self.cycle_timeout_secs)
    }
}

/// Thresholds of the mood decision list
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MoodThresholds {
    /// Volatility above which the mood is Volatile regardless of anything else
    #[serde(default = "default_volatile_pct")]
    pub volatile_pct: f64,

    /// Absolute sentiment score for the sentiment-driven moods
    #[serde(default = "default_sentiment_strong")]
    pub sentiment_strong: f64,

    /// Fusion confidence required for the sentiment-driven moods
    #[serde(default = "default_sentiment_confidence")]
    pub sentiment_confidence: f64,

    /// 24h price move (percent) for the price-driven moods
    #[serde(default = "default_price_move_pct")]
    pub price_move_pct: f64,

    /// Volatility splitting Volatile from Neutral when price and sentiment disagree
    #[serde(default = "default_mixed_signal_volatility_pct")]
    pub mixed_signal_volatility_pct: f64,
}

fn default_volatile_pct() -> f64 {
    50.0
}
fn default_sentiment_strong() -> f64 {
    0.6
}
fn default_sentiment_confidence() -> f64 {
    0.7
}
fn default_price_move_pct() -> f64 {
    5.0
}
fn default_mixed_signal_volatility_pct() -> f64 {
    30.0
}

impl Default for MoodThresholds {
    fn default() -> Self {
        Self {
            volatile_pct: default_volatile_pct(),
            sentiment_strong: default_sentiment_strong(),
            sentiment_confidence: default_sentiment_confidence(),
            price_move_pct: default_price_move_pct(),
            mixed_signal_volatility_pct: default_mixed_signal_volatility_pct(),
        }
    }
}

/// Change detection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeConfig {
    /// Confidence a changed mood needs before it is dispatched
    #[serde(default = "default_change_confidence_threshold")]
    pub confidence_threshold: f64,
}

fn default_change_confidence_threshold() -> f64 {
    0.6
}

impl Default for ChangeConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_change_confidence_threshold(),
        }
    }
}

/// In-memory history bounds
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_price_capacity")]
    pub price_capacity: usize,
    #[serde(default = "default_sentiment_capacity")]
    pub sentiment_capacity: usize,
    /// Number of recent sentiment samples used for trend queries
    #[serde(default = "default_trend_samples")]
    pub trend_samples: usize,
}

fn default_price_capacity() -> usize {
    100
}
fn default_sentiment_capacity() -> usize {
    50
}
fn default_trend_samples() -> usize {
    10
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            price_capacity: default_price_capacity(),
            sentiment_capacity: default_sentiment_capacity(),
            trend_samples: default_trend_samples(),
        }
    }
}

/// Sentiment fusion configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SentimentConfig {
    #[serde(default)]
    pub weights: SentimentWeights,
}

/// Weights of the three fused signals
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct SentimentWeights {
    #[serde(default = "default_social_weight")]
    pub social: f64,
    #[serde(default = "default_on_chain_weight")]
    pub on_chain: f64,
    #[serde(default = "default_technical_weight")]
    pub technical: f64,
}

fn default_social_weight() -> f64 {
    0.3
}
fn default_on_chain_weight() -> f64 {
    0.4
}
fn default_technical_weight() -> f64 {
    0.3
}

impl Default for SentimentWeights {
    fn default() -> Self {
        Self {
            social: default_social_weight(),
            on_chain: default_on_chain_weight(),
            technical: default_technical_weight(),
        }
    }
}

/// Dispatch sink selection
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// Log and record deliveries in memory
    #[default]
    Log,
    /// Post to an HTTP cross-chain relay
    Relay,
}

/// Dispatch configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    #[serde(default)]
    pub mode: DispatchMode,

    /// Relay base URL (required in relay mode)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Relay bearer key (required in relay mode)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Delay between items of the first batch pass
    #[serde(default = "default_inter_item_delay_ms")]
    pub inter_item_delay_ms: u64,

    /// Workers retrying failed items
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// In-cycle retries per failed item
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Failed cycles before an item is dead-lettered
    #[serde(default = "default_max_delivery_attempts")]
    pub max_delivery_attempts: u32,

    #[serde(default = "default_dead_letter_capacity")]
    pub dead_letter_capacity: usize,
}

fn default_inter_item_delay_ms() -> u64 {
    100
}
fn default_max_concurrency() -> usize {
    4
}
fn default_max_retries() -> u32 {
    3
}
fn default_initial_backoff_ms() -> u64 {
    250
}
fn default_max_backoff_ms() -> u64 {
    5_000
}
fn default_max_delivery_attempts() -> u32 {
    5
}
fn default_dead_letter_capacity() -> usize {
    100
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            mode: DispatchMode::Log,
            endpoint: None,
            api_key: None,
            inter_item_delay_ms: default_inter_item_delay_ms(),
            max_concurrency: default_max_concurrency(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            max_delivery_attempts: default_max_delivery_attempts(),
            dead_letter_capacity: default_dead_letter_capacity(),
        }
    }
}

/// Market data provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    #[serde(default = "default_market_base_url")]
    pub base_url: String,

    /// Asset symbol to provider coin id (e.g. SOL -> solana)
    #[serde(default = "default_coin_ids")]
    pub coin_ids: HashMap<String, String>,
}

fn default_market_base_url() -> String {
    crate::market::COINGECKO_API_URL.to_string()
}

fn default_coin_ids() -> HashMap<String, String> {
    [
        ("BTC", "bitcoin"),
        ("ETH", "ethereum"),
        ("SOL", "solana"),
        ("DOT", "polkadot"),
    ]
    .into_iter()
    .map(|(s, id)| (s.to_string(), id.to_string()))
    .collect()
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            base_url: default_market_base_url(),
            coin_ids: default_coin_ids(),
        }
    }
}

/// Sentiment signal source selection
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SignalsMode {
    /// No external signals, social and on-chain read as 0
    #[default]
    Neutral,
    /// HTTP signal service
    Http,
}

/// Sentiment signal source configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignalsConfig {
    #[serde(default)]
    pub mode: SignalsMode,
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Token registry entries
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub tokens: Vec<TokenEntry>,
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Prometheus listener port; no exporter when unset
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Check the parameters the engine cannot start without
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.update_interval_minutes == 0 {
            return Err(invalid("engine.update_interval_minutes", "must be positive"));
        }
        if self.engine.update_interval_minutes > MAX_UPDATE_INTERVAL_MINUTES {
            return Err(ConfigError::Invalid {
                field: "engine.update_interval_minutes",
                reason: format!("must be at most {MAX_UPDATE_INTERVAL_MINUTES}"),
            });
        }
        if self.engine.volatility_lookback_minutes == 0 {
            return Err(invalid(
                "engine.volatility_lookback_minutes",
                "must be positive",
            ));
        }
        if self.engine.volatility_lookback_minutes > MAX_LOOKBACK_MINUTES {
            return Err(ConfigError::Invalid {
                field: "engine.volatility_lookback_minutes",
                reason: format!("must be at most {MAX_LOOKBACK_MINUTES}"),
            });
        }
        if self.engine.fetch_timeout_secs == 0 || self.engine.cycle_timeout_secs == 0 {
            return Err(invalid("engine timeouts", "must be positive"));
        }
        if self.history.price_capacity == 0 {
            return Err(invalid("history.price_capacity", "must be positive"));
        }
        if self.history.sentiment_capacity == 0 {
            return Err(invalid("history.sentiment_capacity", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.change.confidence_threshold) {
            return Err(invalid(
                "change.confidence_threshold",
                "must be within [0, 1]",
            ));
        }

        let w = self.sentiment.weights;
        if w.social < 0.0 || w.on_chain < 0.0 || w.technical < 0.0 {
            return Err(invalid("sentiment.weights", "must be non-negative"));
        }
        let sum = w.social + w.on_chain + w.technical;
        if (sum - 1.0).abs() > 1e-6 {
            return Err(ConfigError::Invalid {
                field: "sentiment.weights",
                reason: format!("must sum to 1, got {sum}"),
            });
        }

        if self.registry.tokens.is_empty() {
            return Err(ConfigError::Missing("registry.tokens"));
        }

        if self.dispatch.max_concurrency == 0 {
            return Err(invalid("dispatch.max_concurrency", "must be positive"));
        }
        if self.dispatch.mode == DispatchMode::Relay {
            if self.dispatch.endpoint.is_none() {
                return Err(ConfigError::Missing("dispatch.endpoint"));
            }
            if self.dispatch.api_key.is_none() {
                return Err(ConfigError::Missing("dispatch.api_key"));
            }
        }

        if self.signals.mode == SignalsMode::Http && self.signals.base_url.is_none() {
            return Err(ConfigError::Missing("signals.base_url"));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}
