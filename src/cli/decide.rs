//! Decide command implementation

use crate::config::Config;
use crate::mood::MoodDecisionEngine;
use clap::Args;

#[derive(Args, Debug)]
pub struct DecideArgs {
    /// 24h price change in percent
    #[arg(long, allow_hyphen_values = true)]
    pub price_change: f64,
    /// Fused sentiment score in [-1, 1]
    #[arg(long, allow_hyphen_values = true)]
    pub sentiment: f64,
    /// Sentiment confidence in [0, 1]
    #[arg(long)]
    pub confidence: f64,
    /// Annualized volatility in percent
    #[arg(long)]
    pub volatility: f64,
}

impl DecideArgs {
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let engine = MoodDecisionEngine::new(config.thresholds.clone());
        let (mood, confidence) = engine.decide(
            self.price_change,
            self.sentiment,
            self.confidence,
            self.volatility,
        );

        println!("{} (code {}) confidence {:.3}", mood, mood.code(), confidence);
        Ok(())
    }
}
