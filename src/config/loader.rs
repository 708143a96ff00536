//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

pub const PROJECT_ID_ENV_VAR: &str = "REDPACKET_WALLETCONNECT_PROJECT_ID";
pub const RPC_URL_ENV_VAR: &str = "REDPACKET_RPC_URL";
pub const CHAIN_ID_ENV_VAR: &str = "REDPACKET_CHAIN_ID";
pub const SUBGRAPH_MAINNET_ENV_VAR: &str = "REDPACKET_SUBGRAPH_URL_MAINNET";
pub const SUBGRAPH_SEPOLIA_ENV_VAR: &str = "REDPACKET_SUBGRAPH_URL_SEPOLIA";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid {var}: {value}")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply environment
/// overrides from the process environment, then validate.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// Same as [`load_config`] with an explicit environment lookup.
pub fn load_config_with<F>(path: Option<&Path>, env: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut config, env)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn apply_env_overrides<F>(config: &mut AppConfig, env: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(id) = env(PROJECT_ID_ENV_VAR) {
        config.wallet.project_id = id;
    }
    if let Some(url) = env(RPC_URL_ENV_VAR) {
        config.chain.rpc_url = url;
    }
    if let Some(raw) = env(CHAIN_ID_ENV_VAR) {
        config.chain.chain_id = raw.trim().parse().map_err(|_| ConfigError::Env {
            var: CHAIN_ID_ENV_VAR,
            value: raw.clone(),
        })?;
    }
    if let Some(url) = env(SUBGRAPH_MAINNET_ENV_VAR) {
        config.subgraph.mainnet_url = url;
    }
    if let Some(url) = env(SUBGRAPH_SEPOLIA_ENV_VAR) {
        config.subgraph.sepolia_url = url;
    }
    Ok(())
}
