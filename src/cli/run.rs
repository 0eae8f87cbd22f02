//! Run command implementation

use crate::config::Config;
use crate::engine::MoodOrchestrator;
use clap::Args;
use tokio::sync::watch;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Override the update interval in minutes
    #[arg(short, long)]
    pub interval: Option<u64>,
}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mut config = config.clone();
        if let Some(minutes) = self.interval {
            config.engine.update_interval_minutes = minutes;
        }
        config.validate()?;

        let mut orchestrator = MoodOrchestrator::from_config(&config)?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Ctrl-C received, shutting down");
                let _ = shutdown_tx.send(true);
            }
        });

        orchestrator.run(shutdown_rx).await
    }
}
