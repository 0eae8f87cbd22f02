//! Once command implementation

use crate::config::Config;
use crate::engine::MoodOrchestrator;
use clap::Args;

#[derive(Args, Debug)]
pub struct OnceArgs {
    /// Print the report as compact JSON
    #[arg(long)]
    pub compact: bool,
}

impl OnceArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        config.validate()?;

        let mut orchestrator = MoodOrchestrator::from_config(config)?;
        if let Err(e) = orchestrator.connect_sink().await {
            tracing::warn!(error = %e, "Dispatch sink connect failed, dispatch will be skipped");
        }

        let result = orchestrator.run_guarded_cycle().await;

        if let Err(e) = orchestrator.disconnect_sink().await {
            tracing::warn!(error = %e, "Dispatch sink disconnect failed");
        }

        let report = result?;
        let json = if self.compact {
            serde_json::to_string(&report)?
        } else {
            serde_json::to_string_pretty(&report)?
        };
        println!("{}", json);
        Ok(())
    }
}
