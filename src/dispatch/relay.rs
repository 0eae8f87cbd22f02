//! HTTP relay dispatch sink
//!
//! Posts mood updates to a cross-chain messaging relay. Message signing and
//! verification are the relay's job.

use super::{DispatchSink, MoodUpdate};
use crate::error::ConfigError;
use crate::mood::MoodAnalysis;
use crate::registry::TokenId;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Sink backed by an HTTP relay
pub struct RelaySink {
    endpoint: String,
    api_key: String,
    client: Client,
    ready: AtomicBool,
}

impl RelaySink {
    /// Create a relay sink; both endpoint and key are required
    pub fn new(
        endpoint: Option<&str>,
        api_key: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let endpoint = endpoint.ok_or(ConfigError::Missing("dispatch.endpoint"))?;
        let api_key = api_key.ok_or(ConfigError::Missing("dispatch.api_key"))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::Invalid {
                field: "dispatch",
                reason: e.to_string(),
            })?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
            ready: AtomicBool::new(false),
        })
    }

    fn health_url(&self) -> String {
        format!("{}/health", self.endpoint)
    }

    fn moods_url(&self) -> String {
        format!("{}/moods", self.endpoint)
    }
}

#[async_trait]
impl DispatchSink for RelaySink {
    async fn connect(&self) -> anyhow::Result<()> {
        tracing::info!(endpoint = %self.endpoint, "Connecting to relay");

        let response = self
            .client
            .get(self.health_url())
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            self.ready.store(false, Ordering::SeqCst);
            anyhow::bail!("Relay health check failed: {}", response.status());
        }

        self.ready.store(true, Ordering::SeqCst);
        tracing::info!("Relay connected");
        Ok(())
    }

    async fn disconnect(&self) -> anyhow::Result<()> {
        self.ready.store(false, Ordering::SeqCst);
        tracing::info!("Relay disconnected");
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn send_one(&self, token_id: TokenId, analysis: &MoodAnalysis) -> anyhow::Result<()> {
        let update = MoodUpdate::new(token_id, analysis);

        let response = self
            .client
            .post(self.moods_url())
            .bearer_auth(&self.api_key)
            .json(&update)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Relay rejected update: {} - {}", status, body);
        }

        tracing::debug!(token_id, mood = %update.mood, "Mood update relayed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mood::{MoodFactors, MoodState};
    use chrono::Utc;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn relay_for(server: &MockServer) -> RelaySink {
        RelaySink::new(Some(server.uri().as_str()), Some("secret"), Duration::from_secs(2)).unwrap()
    }

    fn analysis() -> MoodAnalysis {
        MoodAnalysis {
            symbol: "SOL".to_string(),
            mood: MoodState::Bullish,
            confidence: 0.75,
            factors: MoodFactors {
                price_change: 15.0,
                volatility: 12.0,
                sentiment: 0.18,
                volume: 1000.0,
            },
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_relay_requires_endpoint_and_key() {
        let timeout = Duration::from_secs(1);
        assert_eq!(
            RelaySink::new(None, Some("key"), timeout).err(),
            Some(ConfigError::Missing("dispatch.endpoint"))
        );
        assert_eq!(
            RelaySink::new(Some("https://relay.example.com"), None, timeout).err(),
            Some(ConfigError::Missing("dispatch.api_key"))
        );
    }

    #[test]
    fn test_relay_urls() {
        let sink = RelaySink::new(
            Some("https://relay.example.com/"),
            Some("key"),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(sink.health_url(), "https://relay.example.com/health");
        assert_eq!(sink.moods_url(), "https://relay.example.com/moods");
        assert!(!sink.is_ready());
    }

    #[tokio::test]
    async fn test_relay_connect_failure_not_ready() {
        let sink = RelaySink::new(
            Some("http://127.0.0.1:9"),
            Some("key"),
            Duration::from_millis(200),
        )
        .unwrap();
        assert!(sink.connect().await.is_err());
        assert!(!sink.is_ready());
    }

    #[tokio::test]
    async fn test_relay_connect_checks_health_with_key() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/health"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let sink = relay_for(&mock_server);
        sink.connect().await.unwrap();
        assert!(sink.is_ready());

        sink.disconnect().await.unwrap();
        assert!(!sink.is_ready());
    }

    #[tokio::test]
    async fn test_relay_unhealthy_not_ready() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let sink = relay_for(&mock_server);
        let err = sink.connect().await.unwrap_err();
        assert!(err.to_string().contains("503"));
        assert!(!sink.is_ready());
    }

    #[tokio::test]
    async fn test_relay_posts_mood_update() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/moods"))
            .and(header("authorization", "Bearer secret"))
            .and(body_partial_json(serde_json::json!({
                "token_id": 7,
                "symbol": "SOL",
                "mood_code": MoodState::Bullish.code(),
                "confidence": 0.75
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let sink = relay_for(&mock_server);
        sink.send_one(7, &analysis()).await.unwrap();
    }

    #[tokio::test]
    async fn test_relay_rejection_is_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/moods"))
            .respond_with(ResponseTemplate::new(500).set_body_string("queue full"))
            .mount(&mock_server)
            .await;

        let sink = relay_for(&mock_server);
        let err = sink.send_one(7, &analysis()).await.unwrap_err();
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("queue full"));
    }
}
