//! Error handling module
//!
//! Wraps the failures of every pipeline stage into one error type.

use std::path::PathBuf;

use thiserror::Error;

use replayscope_backdrop_corpus::{CorpusError, SourceError};
use replayscope_cluster_sampler::ClusterError;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("session source: {0}")]
    Source(#[from] SourceError),
    #[error("corpus assembly: {0}")]
    Corpus(#[from] CorpusError),
    #[error("clustering: {0}")]
    Cluster(#[from] ClusterError),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("extraction worker: {0}")]
    Worker(#[source] std::io::Error),
    #[error("failed to encode {what}: {reason}")]
    Encode { what: &'static str, reason: String },
}

impl PipelineError {
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
