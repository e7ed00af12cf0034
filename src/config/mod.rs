mod types;

pub use types::*;

use crate::{Error, Result};
use std::env;
use std::path::Path;
use tracing::debug;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

/// Loads configuration from `CONFIG_PATH` (default `config.yaml`).
///
/// A missing file yields the built-in defaults; a file that exists but does
/// not parse is an error.
pub async fn load() -> Result<Config> {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());
    let mut config = load_from(&config_path).await?;
    apply_env_overrides(&mut config);
    Ok(config)
}

pub async fn load_from(config_path: impl AsRef<Path>) -> Result<Config> {
    let config_path = config_path.as_ref();

    if !tokio::fs::try_exists(config_path).await? {
        debug!(
            "No configuration file at {}, using defaults",
            config_path.display()
        );
        return Ok(Config::default());
    }

    debug!("Loading configuration from: {}", config_path.display());

    let config_str = tokio::fs::read_to_string(config_path).await?;
    let config: Config = serde_yaml::from_str(&config_str)?;

    Ok(config)
}

/// API keys may come from the environment instead of the config file.
pub fn apply_env_overrides(config: &mut Config) {
    apply_overrides_from(config, |name| env::var(name).ok());
}

fn apply_overrides_from(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(key) = lookup("LLM_API_KEY") {
        config.llm.api_key = key;
    }
    if let Some(key) = lookup("IMAGE_API_KEY") {
        config.image.api_key = key;
    }
}

/// Validates that a log level string is valid
pub fn validate_log_level(level: &str) -> Result<()> {
    level.parse::<LevelFilter>().map_err(|_| {
        Error::config(format!(
            "Invalid log level: '{}'. Valid levels: error, warn, info, debug, trace",
            level
        ))
    })?;
    Ok(())
}

/// Picks the tracing filter directives for this process.
///
/// `RUST_LOG` wins when set and may hold full directives
/// (`pet_recipe=debug,reqwest=warn`); otherwise `logs.level` must be a bare
/// level.
pub fn log_directives(logs: &LogsConfig, rust_log: Option<String>) -> Result<String> {
    match rust_log {
        Some(directives) => {
            EnvFilter::try_new(&directives).map_err(|e| {
                Error::config(format!("Invalid RUST_LOG '{}': {}", directives, e))
            })?;
            Ok(directives)
        }
        None => {
            validate_log_level(&logs.level)?;
            Ok(logs.level.clone())
        }
    }
}
