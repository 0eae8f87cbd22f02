//! Configuration integration tests

use mood_engine::config::{Config, DispatchMode, SignalsMode};
use mood_engine::error::ConfigError;
use mood_engine::telemetry::LogFormat;
use std::io::Write;

const EXAMPLE: &str = include_str!("../../config.toml.example");

#[test]
fn test_example_config_is_valid() {
    let config: Config = toml::from_str(EXAMPLE).unwrap();

    assert!(config.validate().is_ok());
    assert_eq!(config.engine.update_interval_minutes, 5);
    assert_eq!(config.dispatch.mode, DispatchMode::Log);
    assert_eq!(config.signals.mode, SignalsMode::Neutral);
    assert_eq!(config.telemetry.log_format, LogFormat::Pretty);
    assert_eq!(config.registry.tokens.len(), 3);
    assert_eq!(config.market.coin_ids["SOL"], "solana");
}

#[test]
fn test_example_config_loads_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(EXAMPLE.as_bytes()).unwrap();

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.history.trend_samples, 10);
}

#[test]
fn test_relay_mode_requires_credentials() {
    let toml = r#"
        [dispatch]
        mode = "relay"
        endpoint = "https://relay.example.com"

        [[registry.tokens]]
        id = 9
        symbol = "dot"
    "#;

    let config: Config = toml::from_str(toml).unwrap();
    assert_eq!(
        config.validate(),
        Err(ConfigError::Missing("dispatch.api_key"))
    );
}

#[test]
fn test_default_config_needs_tokens() {
    assert_eq!(
        Config::default().validate(),
        Err(ConfigError::Missing("registry.tokens"))
    );
}
