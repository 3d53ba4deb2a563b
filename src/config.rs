//! Configuration model
//!
//! Loaded from YAML, then overridden by `REPLAYSCOPE_*` environment variables
//! and finally by command-line flags.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use replayscope_cluster_sampler::KMeansPolicy;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("sampler.clusters must be > 0")]
    ZeroClusters,
    #[error("sampler.max_iterations must be > 0")]
    ZeroIterations,
    #[error("sampler.session_sample_rate must be within [0, 1], got {0}")]
    SampleRate(f64),
    #[error("source.concurrency must be > 0")]
    ZeroConcurrency,
    #[error("invalid value for {key}: {value}")]
    InvalidOverride { key: &'static str, value: String },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sampler: SamplerConfig,
    pub source: SourceConfig,
    pub output: OutputConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    pub clusters: usize,
    pub max_iterations: usize,
    /// Fixed seed for reproducible runs; drawn from entropy when absent.
    pub seed: Option<u64>,
    pub session_sample_rate: f64,
    pub max_sessions: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            clusters: 5,
            max_iterations: 100,
            seed: None,
            session_sample_rate: 0.5,
            max_sessions: 5000,
        }
    }
}

impl SamplerConfig {
    pub fn kmeans_policy(&self) -> KMeansPolicy {
        KMeansPolicy {
            clusters: self.clusters,
            max_iterations: self.max_iterations,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub dir: PathBuf,
    pub concurrency: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./sessions"),
            concurrency: 20,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub viewer_base_url: String,
    pub write_summary: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./blobs"),
            viewer_base_url: "http://localhost:3000".to_string(),
            write_summary: true,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sampler.clusters == 0 {
            return Err(ConfigError::ZeroClusters);
        }
        if self.sampler.max_iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        let rate = self.sampler.session_sample_rate;
        if !(0.0..=1.0).contains(&rate) {
            return Err(ConfigError::SampleRate(rate));
        }
        if self.source.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(())
    }

    /// Applies `REPLAYSCOPE_*` variables from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("REPLAYSCOPE_CLUSTERS") {
            self.sampler.clusters =
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidOverride {
                        key: "REPLAYSCOPE_CLUSTERS",
                        value,
                    })?;
        }
        if let Some(value) = lookup("REPLAYSCOPE_SEED") {
            let seed = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidOverride {
                    key: "REPLAYSCOPE_SEED",
                    value,
                })?;
            self.sampler.seed = Some(seed);
        }
        if let Some(value) = lookup("REPLAYSCOPE_SESSIONS_DIR") {
            self.source.dir = PathBuf::from(value);
        }
        if let Some(value) = lookup("REPLAYSCOPE_OUTPUT_DIR") {
            self.output.dir = PathBuf::from(value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config: Config = serde_yaml::from_str("sampler:\n  clusters: 8\n  seed: 7\n").unwrap();
        assert_eq!(config.sampler.clusters, 8);
        assert_eq!(config.sampler.seed, Some(7));
        assert_eq!(config.sampler.max_iterations, 100);
        assert_eq!(config.source.concurrency, 20);
        assert_eq!(config.output.viewer_base_url, "http://localhost:3000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = Config::default();
        config.sampler.session_sample_rate = 1.5;
        assert_eq!(config.validate(), Err(ConfigError::SampleRate(1.5)));

        let mut config = Config::default();
        config.sampler.clusters = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroClusters));

        let mut config = Config::default();
        config.source.concurrency = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroConcurrency));
    }

    #[test]
    fn overrides_come_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("REPLAYSCOPE_CLUSTERS", "3"),
            ("REPLAYSCOPE_SEED", "42"),
            ("REPLAYSCOPE_OUTPUT_DIR", "/tmp/out"),
        ]
        .into_iter()
        .collect();
        let mut config = Config::default();
        config
            .apply_overrides_from(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.sampler.clusters, 3);
        assert_eq!(config.sampler.seed, Some(42));
        assert_eq!(config.output.dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.source.dir, PathBuf::from("./sessions"));
    }

    #[test]
    fn malformed_override_is_reported() {
        let mut config = Config::default();
        let err = config
            .apply_overrides_from(|key| (key == "REPLAYSCOPE_CLUSTERS").then(|| "many".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOverride { key: "REPLAYSCOPE_CLUSTERS", .. }));
    }
}
