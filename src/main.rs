use clap::Parser;
use mood_engine::cli::{show_config, Cli, Commands};
use mood_engine::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        Config::default()
    });

    // Initialize telemetry
    let _telemetry = mood_engine::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!("Starting mood engine");
            args.execute(&config).await?;
        }
        Commands::Once(args) => {
            tracing::info!("Running a single mood cycle");
            args.execute(&config).await?;
        }
        Commands::Decide(args) => {
            args.execute(&config)?;
        }
        Commands::Config => {
            show_config(&config);
        }
    }

    Ok(())
}
