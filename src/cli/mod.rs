//! CLI interface for mood-engine
//!
//! Provides subcommands for:
//! - `run`: Run the periodic mood cycle until interrupted
//! - `once`: Run a single cycle and print its report
//! - `decide`: Classify a mood from explicit inputs
//! - `config`: Show the effective configuration

mod decide;
mod once;
mod run;

pub use decide::DecideArgs;
pub use once::OnceArgs;
pub use run::RunArgs;

use crate::config::Config;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "mood-engine")]
#[command(about = "Market mood analysis and dispatch for token metadata")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the mood cycle until Ctrl-C
    Run(RunArgs),
    /// Run a single cycle and print the report
    Once(OnceArgs),
    /// Classify a mood from explicit inputs
    Decide(DecideArgs),
    /// Show the effective configuration
    Config,
}

/// Print the effective configuration
pub fn show_config(config: &Config) {
    println!("Current configuration:");
    println!(
        "  Engine: every {}m, lookback {}m, fetch timeout {}s, cycle timeout {}s",
        config.engine.update_interval_minutes,
        config.engine.volatility_lookback_minutes,
        config.engine.fetch_timeout_secs,
        config.engine.cycle_timeout_secs
    );
    println!(
        "  Thresholds: volatile>{}%, sentiment>{} @ conf>{}, move>{}%, mixed volatile>{}%",
        config.thresholds.volatile_pct,
        config.thresholds.sentiment_strong,
        config.thresholds.sentiment_confidence,
        config.thresholds.price_move_pct,
        config.thresholds.mixed_signal_volatility_pct
    );
    println!(
        "  Change: confidence>{}",
        config.change.confidence_threshold
    );
    println!(
        "  Sentiment weights: social={}, on_chain={}, technical={}",
        config.sentiment.weights.social,
        config.sentiment.weights.on_chain,
        config.sentiment.weights.technical
    );
    println!(
        "  Dispatch: {:?}, retries={}, concurrency={}, max attempts={}",
        config.dispatch.mode,
        config.dispatch.max_retries,
        config.dispatch.max_concurrency,
        config.dispatch.max_delivery_attempts
    );
    println!("  Signals: {:?}", config.signals.mode);
    println!("  Market: {}", config.market.base_url);
    println!("  Tokens:");
    for entry in &config.registry.tokens {
        println!("    #{} -> {}", entry.id, entry.symbol.to_uppercase());
    }
    if let Err(e) = config.validate() {
        println!("  Invalid: {}", e);
    }
}
