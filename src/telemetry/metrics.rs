//! Prometheus metrics

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// Whole fetch → dispatch cycle
    Cycle,
    /// Snapshot and signal fetch fan-out
    MarketFetch,
    /// Batch dispatch including retries
    Dispatch,
}

/// Per-symbol gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Annualized volatility percent
    Volatility,
    /// Momentum percent over the lookback window
    Momentum,
    /// Fused sentiment score
    SentimentScore,
    /// Fused sentiment confidence
    SentimentConfidence,
    /// Mood state code
    MoodCode,
    /// Mood confidence
    MoodConfidence,
}

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    CyclesCompleted,
    CyclesFailed,
    FetchFailures,
    UpdatesSent,
    UpdatesFailed,
    UpdatesSkipped,
    DeadLettered,
}

/// Start the Prometheus exporter on `0.0.0.0:port`
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;

    tracing::info!(%addr, "Prometheus exporter listening");
    Ok(())
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    let metric_name = match metric {
        LatencyMetric::Cycle => "mood_cycle_latency_ms",
        LatencyMetric::MarketFetch => "mood_market_fetch_latency_ms",
        LatencyMetric::Dispatch => "mood_dispatch_latency_ms",
    };

    metrics::histogram!(metric_name).record(duration.as_secs_f64() * 1000.0);
}

/// Set a per-symbol gauge value
pub fn set_gauge(metric: GaugeMetric, symbol: &str, value: f64) {
    let metric_name = match metric {
        GaugeMetric::Volatility => "mood_volatility_pct",
        GaugeMetric::Momentum => "mood_momentum_pct",
        GaugeMetric::SentimentScore => "mood_sentiment_score",
        GaugeMetric::SentimentConfidence => "mood_sentiment_confidence",
        GaugeMetric::MoodCode => "mood_state_code",
        GaugeMetric::MoodConfidence => "mood_confidence",
    };

    metrics::gauge!(metric_name, "symbol" => symbol.to_string()).set(value);
}

/// Increment a counter
pub fn increment_counter(metric: CounterMetric, value: u64) {
    let metric_name = match metric {
        CounterMetric::CyclesCompleted => "mood_cycles_completed_total",
        CounterMetric::CyclesFailed => "mood_cycles_failed_total",
        CounterMetric::FetchFailures => "mood_fetch_failures_total",
        CounterMetric::UpdatesSent => "mood_updates_sent_total",
        CounterMetric::UpdatesFailed => "mood_updates_failed_total",
        CounterMetric::UpdatesSkipped => "mood_updates_skipped_total",
        CounterMetric::DeadLettered => "mood_updates_dead_lettered_total",
    };

    metrics::counter!(metric_name).increment(value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_exporter_is_noop() {
        record_latency(LatencyMetric::Cycle, Duration::from_millis(12));
        set_gauge(GaugeMetric::Volatility, "SOL", 42.0);
        increment_counter(CounterMetric::UpdatesSent, 3);
    }
}
