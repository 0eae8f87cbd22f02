//! External sentiment signal sources
//!
//! Social and on-chain reads are pluggable numeric signals. Callers treat any
//! failure as a neutral 0.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Trait for sentiment signal providers
#[async_trait]
pub trait SignalSource: Send + Sync {
    /// Social sentiment in [-1, 1]
    async fn fetch_social(&self, symbol: &str) -> anyhow::Result<f64>;
    /// On-chain activity sentiment in [-1, 1]
    async fn fetch_on_chain(&self, symbol: &str) -> anyhow::Result<f64>;
}

/// Source that always reads neutral
#[derive(Debug, Clone, Copy, Default)]
pub struct NeutralSignals;

#[async_trait]
impl SignalSource for NeutralSignals {
    async fn fetch_social(&self, _symbol: &str) -> anyhow::Result<f64> {
        Ok(0.0)
    }

    async fn fetch_on_chain(&self, _symbol: &str) -> anyhow::Result<f64> {
        Ok(0.0)
    }
}

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    score: f64,
}

/// Signal service reachable over HTTP
///
/// Expects `GET {base}/social/{symbol}` and `GET {base}/onchain/{symbol}` to
/// answer `{"score": <f64>}`.
pub struct HttpSignalSource {
    base_url: String,
    client: Client,
}

impl HttpSignalSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn signal_url(&self, kind: &str, symbol: &str) -> String {
        format!("{}/{}/{}", self.base_url, kind, symbol)
    }

    async fn fetch_score(&self, kind: &str, symbol: &str) -> anyhow::Result<f64> {
        let url = self.signal_url(kind, symbol);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("Signal API error: {} for {}", response.status(), url);
        }

        let body: ScoreResponse = response.json().await?;
        if !body.score.is_finite() {
            anyhow::bail!("Signal API returned non-finite score for {}", url);
        }
        Ok(body.score.clamp(-1.0, 1.0))
    }
}

#[async_trait]
impl SignalSource for HttpSignalSource {
    async fn fetch_social(&self, symbol: &str) -> anyhow::Result<f64> {
        self.fetch_score("social", symbol).await
    }

    async fn fetch_on_chain(&self, symbol: &str) -> anyhow::Result<f64> {
        self.fetch_score("onchain", symbol).await
    }
}
