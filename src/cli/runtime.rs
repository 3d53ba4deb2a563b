use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

pub fn init_logging(level: &str, debug: bool, format: LogFormat) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    // stdout carries command output only.
    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
    result.map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}

pub struct LoadedConfig {
    pub config: Config,
    pub path: PathBuf,
}

pub fn default_config_path() -> Result<PathBuf> {
    // Priority: ./config/replayscope.yaml > ~/.config/replayscope/config.yaml
    let local_config = PathBuf::from("config/replayscope.yaml");
    if local_config.exists() {
        return Ok(local_config);
    }
    let mut path = dirs::config_dir().context("Failed to get config directory")?;
    path.push("replayscope");
    path.push("config.yaml");
    Ok(path)
}

pub async fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    let config_path = match config_path {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };

    let config = read_config_file(&config_path).await?.unwrap_or_else(|| {
        warn!(
            "Config file not found, using defaults: {}",
            config_path.display()
        );
        Config::default()
    });
    Ok(LoadedConfig {
        config,
        path: config_path,
    })
}

/// Parses the YAML file at `path`; `None` when it does not exist.
pub async fn read_config_file(path: &PathBuf) -> Result<Option<Config>> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let config: Config =
        serde_yaml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
    info!("Loaded configuration from: {}", path.display());
    Ok(Some(config))
}
